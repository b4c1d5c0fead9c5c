//! Symbolic code generation for the stacksym machine.
//!
//! Method bodies are built by composing symbols: small typed objects that
//! know how to push their value, their address, or store into themselves.
//! A [`Context`] owns the instruction stream of one method and checks that
//! every symbol handed to it was created by it.
//!
//! ## Modules
//!
//! - [`bytecode`]: Instruction set (OpCode, BytecodeChunk, ConstantPool)
//! - [`context`]: Per-method context, symbol factories and scoped blocks
//! - [`symbol`]: Capability traits and the concrete symbol kinds
//! - [`load`]: Load discipline for value, reference, receiver and argument use
//! - [`assign`]: Assignment and aggregate copy
//! - [`conversion`]: Ordered conversion resolution
//! - [`emit`]: Low-level emitter and labels
//! - [`builder`]: Type builder and captured-value arena

pub mod assign;
pub mod builder;
pub mod bytecode;
pub mod context;
pub mod conversion;
pub mod emit;
pub mod load;
mod options;
mod sealed;
pub mod symbol;

pub use assign::{CopyPath, assign, assign_stack_mediated};
pub use builder::{BuiltType, CapturedArena, CapturedId, TypeBuilder};
pub use bytecode::{BytecodeChunk, Constant, ConstantPool, OpCode};
pub use context::{Context, ScopeHandle, ScopeKind};
pub use conversion::{Conversion, ConversionKind, Converted, convert, resolve_conversion};
pub use emit::{Emitter, Label};
pub use load::{IndirectKind, LoadIntent, load};
pub use options::EmitOptions;
pub use sealed::SealedMethod;
pub use symbol::{
    Addressable, Assignable, BinaryOp, Symbol, SymbolRef, UnaryOp,
};

// Re-export the error types for convenience
pub use stacksym_core::{EmitError, EmitResult};
