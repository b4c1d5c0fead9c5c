//! Sealed method bodies.

use std::fmt;

use stacksym_core::{DataType, FunctionEntry};

use crate::bytecode::{BytecodeChunk, Constant, ConstantPool, OpCode};

/// A finished method body, ready to be executed.
#[derive(Debug, Clone, PartialEq)]
pub struct SealedMethod {
    pub function: FunctionEntry,
    pub chunk: BytecodeChunk,
    pub constants: ConstantPool,
    /// Local slot types, temporaries included.
    pub locals: Vec<DataType>,
}

impl SealedMethod {
    pub fn local_count(&self) -> usize {
        self.locals.len()
    }

    fn write_operand(&self, f: &mut fmt::Formatter<'_>, offset: usize, op: OpCode) -> fmt::Result {
        let at = offset + 1;
        let operand = match op.operand_size() {
            0 => return Ok(()),
            1 => self.chunk.read_byte(at).map(u32::from),
            2 | 3 => self.chunk.read_u16(at).map(u32::from),
            _ => self.chunk.read_u32(at),
        };
        let Some(operand) = operand else {
            return write!(f, " <truncated>");
        };

        if op.uses_constant_pool() {
            match self.constants.get(operand) {
                Some(Constant::Literal(literal)) => write!(f, " #{operand} {literal}")?,
                Some(Constant::TypeHash(hash)) => write!(f, " #{operand} {hash}")?,
                None => write!(f, " #{operand} <missing>")?,
            }
        } else if matches!(op, OpCode::Jump | OpCode::JumpIfFalse | OpCode::JumpIfTrue) {
            write!(f, " -> {operand:04}")?;
        } else {
            write!(f, " {operand}")?;
        }

        if op.operand_size() == 3 {
            if let Some(argc) = self.chunk.read_byte(at + 2) {
                write!(f, " ({argc})")?;
            }
        }
        Ok(())
    }
}

/// Disassembly, one instruction per line: offset, source line, mnemonic and
/// decoded operands.
impl fmt::Display for SealedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "== {} ({} locals, {} bytes) ==",
            self.function.name,
            self.locals.len(),
            self.chunk.len()
        )?;
        let mut previous_line = None;
        for (offset, op) in self.chunk.instructions() {
            let line = self.chunk.line_at(offset);
            if line == previous_line {
                write!(f, "{offset:04}    | ")?;
            } else {
                write!(f, "{offset:04} {:>4} ", line.unwrap_or_default())?;
            }
            previous_line = line;
            write!(f, "{:<16}", op.name())?;
            self.write_operand(f, offset, op)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use stacksym_core::{Literal, Param, TypeEntry, primitives};
    use stacksym_registry::TypeRegistry;

    use crate::{BinaryOp, Context};

    use super::*;

    #[test]
    fn disassembly_lists_each_instruction() {
        let mut registry = TypeRegistry::with_primitives();
        let program = registry.register_type(TypeEntry::reference("Program")).unwrap();
        let function = FunctionEntry::static_method(
            program,
            "inc",
            vec![Param::new("x", DataType::simple(primitives::INT32))],
            DataType::simple(primitives::INT32),
        );
        registry.register_function(function.clone()).unwrap();

        let mut ctx = Context::new(&registry, &function);
        ctx.set_line(7);
        let x = ctx.argument(0).unwrap();
        let one = ctx.literal(Literal::I32(1));
        let sum = ctx.binary(BinaryOp::Add, x, one).unwrap();
        ctx.emit_return(Some(sum.as_ref())).unwrap();
        let sealed = ctx.seal().unwrap();

        let text = sealed.to_string();
        assert!(text.starts_with("== inc (0 locals, 7 bytes) =="));
        assert!(text.contains("0000    7 GET_ARG"));
        assert!(text.contains("#0 1"));
        assert!(text.contains("RETURN"));
        assert_eq!(text.lines().count(), 5);
    }
}
