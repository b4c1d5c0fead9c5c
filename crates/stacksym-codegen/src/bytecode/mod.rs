//! Instruction stream types.
//!
//! - [`OpCode`] - the stack machine's instruction set
//! - [`BytecodeChunk`] - an append-only instruction stream with line info
//! - [`Constant`] and [`ConstantPool`] - per-method constant storage

mod chunk;
mod constant;
mod opcode;

pub use chunk::BytecodeChunk;
pub use constant::{Constant, ConstantPool};
pub use opcode::OpCode;
