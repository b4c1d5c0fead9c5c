//! Reference interpreter for sealed method bodies.
//!
//! The machine exists to check that emitted bytecode means what the
//! builder intended. It executes [`SealedMethod`](stacksym_codegen::SealedMethod)s
//! and [`BuiltType`](stacksym_codegen::BuiltType)s against the same
//! [`TypeRegistry`](stacksym_registry::TypeRegistry) they were emitted for.
//!
//! Addresses are managed: a [`Root`] plus a path of aggregate indexes. Width
//! checks on indirect loads and stores catch instructions whose width does
//! not match the stored value.

mod error;
mod heap;
mod machine;
mod ops;
mod value;

pub use error::{VmError, VmResult};
pub use heap::{Heap, HeapObject, ObjectId};
pub use machine::{DEFAULT_MAX_DEPTH, Machine, NativeFn};
pub use value::{Address, Root, Value};
