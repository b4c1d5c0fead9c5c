//! Bytecode chunk for a single method body.
//!
//! A `BytecodeChunk` is append-only during emission. The only mutations of
//! already written bytes are jump patches and rollback of a failed
//! operation.

use super::OpCode;

/// Placeholder written into a forward jump until its label is marked.
pub(crate) const UNPATCHED: u32 = u32::MAX;

/// Compiled instructions plus a parallel line table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BytecodeChunk {
    /// The instruction bytes.
    code: Vec<u8>,
    /// Line numbers for debugging, one per byte in `code`.
    lines: Vec<u32>,
}

impl BytecodeChunk {
    /// Create a new empty bytecode chunk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bytecode chunk with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            code: Vec::with_capacity(capacity),
            lines: Vec::with_capacity(capacity),
        }
    }

    /// Write an opcode.
    pub fn write_op(&mut self, op: OpCode, line: u32) {
        self.code.push(op.into());
        self.lines.push(line);
    }

    /// Write a byte operand.
    pub fn write_byte(&mut self, byte: u8, line: u32) {
        self.code.push(byte);
        self.lines.push(line);
    }

    /// Write a 16-bit operand (big-endian).
    pub fn write_u16(&mut self, value: u16, line: u32) {
        for byte in value.to_be_bytes() {
            self.write_byte(byte, line);
        }
    }

    /// Write a 32-bit operand (big-endian).
    pub fn write_u32(&mut self, value: u32, line: u32) {
        for byte in value.to_be_bytes() {
            self.write_byte(byte, line);
        }
    }

    /// Get current code offset.
    pub fn current_offset(&self) -> usize {
        self.code.len()
    }

    /// Emit a jump with a placeholder target and return the operand offset.
    pub fn emit_jump(&mut self, op: OpCode, line: u32) -> usize {
        self.write_op(op, line);
        let offset = self.code.len();
        self.write_u32(UNPATCHED, line);
        offset
    }

    /// Overwrite the 32-bit operand at `offset` with `target`.
    ///
    /// Returns `false` if the operand lies outside the chunk.
    pub fn patch_u32(&mut self, offset: usize, target: u32) -> bool {
        match self.code.get_mut(offset..offset + 4) {
            Some(bytes) => {
                bytes.copy_from_slice(&target.to_be_bytes());
                true
            }
            None => false,
        }
    }

    /// Discard everything from `offset` onwards.
    pub fn truncate(&mut self, offset: usize) {
        self.code.truncate(offset);
        self.lines.truncate(offset);
    }

    /// Get the bytecode.
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// Get the line numbers.
    pub fn lines(&self) -> &[u32] {
        &self.lines
    }

    /// Get the line number for a given offset.
    pub fn line_at(&self, offset: usize) -> Option<u32> {
        self.lines.get(offset).copied()
    }

    /// Get the length of the bytecode.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Check if the chunk is empty.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Read a byte at the given offset.
    pub fn read_byte(&self, offset: usize) -> Option<u8> {
        self.code.get(offset).copied()
    }

    /// Read a u16 at the given offset (big-endian).
    pub fn read_u16(&self, offset: usize) -> Option<u16> {
        let bytes = self.code.get(offset..offset + 2)?;
        Some(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Read a u32 at the given offset (big-endian).
    pub fn read_u32(&self, offset: usize) -> Option<u32> {
        let bytes = self.code.get(offset..offset + 4)?;
        Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read an opcode at the given offset.
    pub fn read_op(&self, offset: usize) -> Option<OpCode> {
        self.code.get(offset).and_then(|&b| OpCode::from_u8(b))
    }

    /// Iterate `(offset, opcode)` pairs, skipping operands.
    pub fn instructions(&self) -> impl Iterator<Item = (usize, OpCode)> + '_ {
        let mut offset = 0;
        std::iter::from_fn(move || {
            while offset < self.code.len() {
                let at = offset;
                match self.read_op(at) {
                    Some(op) => {
                        offset += 1 + op.operand_size();
                        return Some((at, op));
                    }
                    None => offset += 1,
                }
            }
            None
        })
    }

    /// Extract all opcodes from the chunk, skipping operands.
    ///
    /// This is useful for testing instruction sequences without worrying
    /// about specific operand values or offsets.
    pub fn opcodes(&self) -> Vec<OpCode> {
        self.instructions().map(|(_, op)| op).collect()
    }

    /// The last complete instruction, if any.
    pub fn last_op(&self) -> Option<OpCode> {
        self.instructions().last().map(|(_, op)| op)
    }

    /// Check if this chunk contains exactly the given opcode sequence.
    ///
    /// This ignores operand values, only checking the opcodes themselves.
    /// Panics with a descriptive message if the sequences don't match.
    #[track_caller]
    pub fn assert_opcodes(&self, expected: &[OpCode]) {
        let actual = self.opcodes();
        assert_eq!(
            actual,
            expected,
            "Bytecode mismatch.\nExpected: {:?}\nActual:   {:?}",
            expected.iter().map(|op| op.name()).collect::<Vec<_>>(),
            actual.iter().map(|op| op.name()).collect::<Vec<_>>(),
        );
    }

    /// Check if this chunk contains the given opcodes (in order, but not necessarily contiguous).
    #[track_caller]
    pub fn assert_contains_opcodes(&self, expected: &[OpCode]) {
        let actual = self.opcodes();
        let mut expected_iter = expected.iter().peekable();

        for op in &actual {
            if expected_iter.peek() == Some(&op) {
                expected_iter.next();
            }
        }

        if expected_iter.peek().is_some() {
            let remaining: Vec<_> = expected_iter.map(|op| op.name()).collect();
            panic!(
                "Missing opcodes in sequence.\nExpected to find: {:?}\nActual bytecode:  {:?}",
                remaining,
                actual.iter().map(|op| op.name()).collect::<Vec<_>>(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_chunk_is_empty() {
        let chunk = BytecodeChunk::new();
        assert!(chunk.is_empty());
        assert_eq!(chunk.len(), 0);
    }

    #[test]
    fn write_op() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::Constant, 1);
        chunk.write_byte(42, 1);

        assert_eq!(chunk.len(), 2);
        assert_eq!(chunk.read_op(0), Some(OpCode::Constant));
        assert_eq!(chunk.read_byte(1), Some(42));
        assert_eq!(chunk.line_at(1), Some(1));
    }

    #[test]
    fn wide_operands_are_big_endian() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_u16(0x1234, 5);
        chunk.write_u32(0xDEADBEEF, 6);

        assert_eq!(chunk.code()[..2], [0x12, 0x34]);
        assert_eq!(chunk.read_u16(0), Some(0x1234));
        assert_eq!(chunk.read_u32(2), Some(0xDEADBEEF));
        assert_eq!(chunk.line_at(5), Some(6));
        assert_eq!(chunk.read_u32(3), None);
    }

    #[test]
    fn emit_and_patch_jump() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::PushTrue, 1);
        let operand = chunk.emit_jump(OpCode::JumpIfFalse, 2);
        assert_eq!(chunk.read_u32(operand), Some(UNPATCHED));

        chunk.write_op(OpCode::Nop, 3);
        let target = chunk.current_offset() as u32;
        assert!(chunk.patch_u32(operand, target));
        assert_eq!(chunk.read_u32(operand), Some(target));
        assert!(!chunk.patch_u32(target as usize, 0));
    }

    #[test]
    fn truncate_drops_lines_too() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::Nop, 1);
        chunk.write_op(OpCode::Pop, 2);
        chunk.truncate(1);
        assert_eq!(chunk.len(), 1);
        assert_eq!(chunk.lines(), &[1]);
    }

    #[test]
    fn opcodes_skip_operands() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::Call, 1);
        chunk.write_u16(0x0001, 1);
        chunk.write_byte(2, 1);
        chunk.emit_jump(OpCode::Jump, 1);
        chunk.write_op(OpCode::Return, 1);

        assert_eq!(chunk.opcodes(), vec![OpCode::Call, OpCode::Jump, OpCode::Return]);
        assert_eq!(chunk.last_op(), Some(OpCode::Return));
        let offsets: Vec<_> = chunk.instructions().map(|(at, _)| at).collect();
        assert_eq!(offsets, vec![0, 4, 9]);
    }

    #[test]
    fn assert_opcodes_success() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::GetArg, 1);
        chunk.write_u16(0, 1);
        chunk.write_op(OpCode::SetLocal, 1);
        chunk.write_byte(0, 1);

        chunk.assert_opcodes(&[OpCode::GetArg, OpCode::SetLocal]);
    }

    #[test]
    #[should_panic(expected = "Bytecode mismatch")]
    fn assert_opcodes_failure() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::Constant, 1);
        chunk.write_byte(0, 1);

        chunk.assert_opcodes(&[OpCode::GetLocal]);
    }

    #[test]
    fn assert_contains_opcodes_success() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::GetLocal, 1);
        chunk.write_byte(0, 1);
        chunk.write_op(OpCode::Constant, 1);
        chunk.write_byte(0, 1);
        chunk.write_op(OpCode::Add, 1);
        chunk.write_op(OpCode::SetLocal, 1);
        chunk.write_byte(0, 1);

        chunk.assert_contains_opcodes(&[OpCode::GetLocal, OpCode::Add, OpCode::SetLocal]);
    }

    #[test]
    #[should_panic(expected = "Missing opcodes")]
    fn assert_contains_opcodes_failure() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::Pop, 1);
        chunk.assert_contains_opcodes(&[OpCode::Dup]);
    }
}
