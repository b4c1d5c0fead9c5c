//! Instruction emitter.
//!
//! The [`Emitter`] owns one method body's [`BytecodeChunk`], its
//! [`ConstantPool`] and its [`LabelTable`], and chooses narrow or wide
//! encodings for operands.
//!
//! # Example
//!
//! ```
//! use stacksym_codegen::bytecode::OpCode;
//! use stacksym_codegen::emit::Emitter;
//! use stacksym_core::{ContextId, Literal};
//!
//! let mut emitter = Emitter::new(ContextId::fresh(), 1);
//! emitter.emit_literal(&Literal::I32(42)).unwrap();
//! emitter.emit(OpCode::Pop);
//!
//! emitter.chunk().assert_opcodes(&[OpCode::Constant, OpCode::Pop]);
//! ```

mod labels;

pub use labels::{Label, LabelTable};

use stacksym_core::{ContextId, EmitError, EmitResult, Literal, TypeHash};

use crate::bytecode::{BytecodeChunk, ConstantPool, OpCode};

/// Position to return to when an operation fails half way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    offset: usize,
    marks: usize,
}

/// Emits instructions for a single method body.
#[derive(Debug)]
pub struct Emitter {
    /// The instruction stream being built.
    chunk: BytecodeChunk,

    /// Constants referenced by this body.
    constants: ConstantPool,

    /// Jump targets.
    labels: LabelTable,

    /// Current line for debug info.
    current_line: u32,
}

impl Emitter {
    pub fn new(context: ContextId, initial_line: u32) -> Self {
        Self {
            chunk: BytecodeChunk::new(),
            constants: ConstantPool::new(),
            labels: LabelTable::new(context),
            current_line: initial_line,
        }
    }

    /// Set current line for debug info.
    pub fn set_line(&mut self, line: u32) {
        self.current_line = line;
    }

    /// Get current line.
    pub fn current_line(&self) -> u32 {
        self.current_line
    }

    pub fn chunk(&self) -> &BytecodeChunk {
        &self.chunk
    }

    pub fn constants(&self) -> &ConstantPool {
        &self.constants
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Current end of the stream.
    pub fn offset(&self) -> usize {
        self.chunk.current_offset()
    }

    // ==========================================================================
    // Basic Emission
    // ==========================================================================

    /// Emit a single opcode with no operands.
    pub fn emit(&mut self, op: OpCode) {
        self.chunk.write_op(op, self.current_line);
    }

    /// Emit opcode with 8-bit operand.
    pub fn emit_byte(&mut self, op: OpCode, byte: u8) {
        self.chunk.write_op(op, self.current_line);
        self.chunk.write_byte(byte, self.current_line);
    }

    /// Emit opcode with 16-bit operand.
    pub fn emit_u16(&mut self, op: OpCode, value: u16) {
        self.chunk.write_op(op, self.current_line);
        self.chunk.write_u16(value, self.current_line);
    }

    /// Emit a literal, using the dedicated push opcodes where one exists.
    pub fn emit_literal(&mut self, literal: &Literal) -> EmitResult<()> {
        match literal {
            Literal::Null => self.emit(OpCode::PushNull),
            Literal::Bool(true) => self.emit(OpCode::PushTrue),
            Literal::Bool(false) => self.emit(OpCode::PushFalse),
            _ => {
                let index = self.constants.add_literal(literal.clone());
                if index < 256 {
                    self.emit_byte(OpCode::Constant, index as u8);
                } else {
                    self.emit_u16(OpCode::ConstantWide, pool_index(index)?);
                }
            }
        }
        Ok(())
    }

    /// Emit an opcode whose operand is a type, field or function hash.
    pub fn emit_hash_op(&mut self, op: OpCode, hash: TypeHash) -> EmitResult<()> {
        let index = pool_index(self.constants.add_type_hash(hash))?;
        self.emit_u16(op, index);
        Ok(())
    }

    /// Emit `Call`, `CallMethod` or `New`.
    pub fn emit_call(&mut self, op: OpCode, function: TypeHash, argc: usize) -> EmitResult<()> {
        let argc = u8::try_from(argc)
            .map_err(|_| EmitError::InvalidOperand(format!("{argc} arguments exceed 255")))?;
        let index = pool_index(self.constants.add_type_hash(function))?;
        self.emit_u16(op, index);
        self.chunk.write_byte(argc, self.current_line);
        Ok(())
    }

    /// Emit a local slot access using the narrow form when the slot fits.
    pub fn emit_local(&mut self, narrow: OpCode, wide: OpCode, slot: u16) {
        match u8::try_from(slot) {
            Ok(byte) => self.emit_byte(narrow, byte),
            Err(_) => self.emit_u16(wide, slot),
        }
    }

    // ==========================================================================
    // Labels
    // ==========================================================================

    /// Create a new unmarked label.
    pub fn define_label(&mut self) -> Label {
        self.labels.define()
    }

    /// Mark `label` at the current position.
    pub fn mark_label(&mut self, label: Label) -> EmitResult<()> {
        self.labels.mark(label, &mut self.chunk)
    }

    /// Emit a jump to `label`.
    pub fn emit_jump(&mut self, op: OpCode, label: Label) -> EmitResult<()> {
        self.labels
            .emit_jump(op, label, &mut self.chunk, self.current_line)
    }

    // ==========================================================================
    // Rollback
    // ==========================================================================

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            offset: self.chunk.current_offset(),
            marks: self.labels.mark_count(),
        }
    }

    /// Discard everything emitted since `checkpoint`.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.chunk.truncate(checkpoint.offset);
        self.labels.rollback(checkpoint.offset, checkpoint.marks);
    }

    /// Consume the emitter, returning the finished stream and constants.
    pub fn finish(self) -> (BytecodeChunk, ConstantPool) {
        (self.chunk, self.constants)
    }
}

fn pool_index(index: u32) -> EmitResult<u16> {
    u16::try_from(index)
        .map_err(|_| EmitError::InvalidOperand(format!("constant index {index} exceeds u16")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emitter() -> Emitter {
        Emitter::new(ContextId::fresh(), 1)
    }

    #[test]
    fn literal_push_forms() {
        let mut e = emitter();
        e.emit_literal(&Literal::Null).unwrap();
        e.emit_literal(&Literal::Bool(true)).unwrap();
        e.emit_literal(&Literal::Bool(false)).unwrap();
        e.emit_literal(&Literal::F64(2.5)).unwrap();

        e.chunk().assert_opcodes(&[
            OpCode::PushNull,
            OpCode::PushTrue,
            OpCode::PushFalse,
            OpCode::Constant,
        ]);
        assert_eq!(e.constants().len(), 1);
    }

    #[test]
    fn wide_constant_after_256_entries() {
        let mut e = emitter();
        for i in 0..300 {
            e.emit_literal(&Literal::I32(i)).unwrap();
        }
        let ops = e.chunk().opcodes();
        assert_eq!(ops[255], OpCode::Constant);
        assert_eq!(ops[256], OpCode::ConstantWide);
    }

    #[test]
    fn local_narrow_and_wide() {
        let mut e = emitter();
        e.emit_local(OpCode::GetLocal, OpCode::GetLocalWide, 3);
        e.emit_local(OpCode::GetLocal, OpCode::GetLocalWide, 300);

        e.chunk()
            .assert_opcodes(&[OpCode::GetLocal, OpCode::GetLocalWide]);
        assert_eq!(e.chunk().read_u16(3), Some(300));
    }

    #[test]
    fn call_operands() {
        let mut e = emitter();
        let f = TypeHash::from_name("f");
        e.emit_call(OpCode::Call, f, 2).unwrap();
        assert_eq!(e.chunk().read_byte(3), Some(2));
        assert_eq!(e.constants().type_hash(0), Some(f));

        let err = e.emit_call(OpCode::Call, f, 256).unwrap_err();
        assert!(matches!(err, EmitError::InvalidOperand(_)));
    }

    #[test]
    fn rollback_restores_stream() {
        let mut e = emitter();
        e.emit(OpCode::Nop);
        let checkpoint = e.checkpoint();
        let label = e.define_label();
        e.emit(OpCode::Dup);
        e.emit_jump(OpCode::Jump, label).unwrap();

        e.rollback(checkpoint);
        e.chunk().assert_opcodes(&[OpCode::Nop]);
        assert_eq!(e.labels().unresolved(), 0);
    }

    #[test]
    fn rollback_unmarks_labels() {
        let mut e = emitter();
        e.emit(OpCode::Nop);
        let label = e.define_label();
        let checkpoint = e.checkpoint();
        e.emit(OpCode::Dup);
        e.mark_label(label).unwrap();

        e.rollback(checkpoint);
        assert!(!e.labels().has_target_at(1));
        e.mark_label(label).unwrap();
        assert_eq!(e.labels().position(label).unwrap(), Some(1));
    }

    #[test]
    fn lines_follow_set_line() {
        let mut e = emitter();
        e.emit(OpCode::Nop);
        e.set_line(7);
        e.emit(OpCode::Pop);
        assert_eq!(e.chunk().lines(), &[1, 7]);
    }
}
