//! Symbolic bytecode emission for a typed stack machine.
//!
//! Code is built by composing small typed symbols (locals, arguments,
//! fields, elements, operations) inside a [`Context`]. Each symbol knows how
//! to emit the instructions that produce its value, its address, or a store
//! into it. The context checks that every participant belongs to it, picks
//! between in-place and stack-mediated copies, resolves conversions in a
//! fixed order and tracks scoped control flow.
//!
//! The member crates are re-exported whole:
//!
//! - [`core`]: type identity, metadata entries, literals and errors
//! - [`registry`]: the [`TypeRegistry`]
//! - [`codegen`]: contexts, symbols, emission and [`TypeBuilder`]
//! - [`vm`]: a reference [`Machine`] that executes sealed methods
//!
//! ```
//! use stacksym::{BinaryOp, Context, Machine, TypeRegistry, Value};
//! use stacksym::core::{DataType, FunctionEntry, Param, primitives};
//!
//! let mut registry = TypeRegistry::with_primitives();
//! let add_one = registry
//!     .register_function(FunctionEntry::function(
//!         "add_one",
//!         vec![Param::new("n", DataType::simple(primitives::INT32))],
//!         DataType::simple(primitives::INT32),
//!     ))
//!     .unwrap();
//!
//! let mut ctx = Context::for_function(&registry, add_one).unwrap();
//! let n = ctx.argument(0).unwrap();
//! let one = ctx.literal(1);
//! let sum = ctx.binary(BinaryOp::Add, n, one).unwrap();
//! ctx.emit_return(Some(sum.as_ref())).unwrap();
//!
//! let mut machine = Machine::new(&registry);
//! machine.load_method(ctx.seal().unwrap());
//! assert_eq!(machine.invoke(add_one, vec![Value::I32(41)]).unwrap(), Value::I32(42));
//! ```

pub use stacksym_codegen as codegen;
pub use stacksym_core as core;
pub use stacksym_registry as registry;
pub use stacksym_vm as vm;

pub use stacksym_codegen::{
    BinaryOp, BuiltType, Context, EmitOptions, LoadIntent, ScopeHandle, ScopeKind, SealedMethod,
    Symbol, SymbolRef, TypeBuilder, UnaryOp, assign, convert,
};
pub use stacksym_core::{DataType, EmitError, EmitResult, TypeHash};
pub use stacksym_registry::TypeRegistry;
pub use stacksym_vm::{Machine, Value, VmError};
