//! Core types shared by the stacksym crates.
//!
//! This crate holds the vocabulary every other layer speaks: type identity
//! ([`TypeHash`], [`DataType`]), type metadata entries, compile-time
//! [`Literal`]s, symbol [`Capabilities`], context identity and the error
//! taxonomy. It has no knowledge of instructions.

mod capability;
mod data_type;
pub mod entries;
mod error;
mod ids;
mod literal;
mod type_hash;
pub mod types;

pub use capability::Capabilities;
pub use data_type::{DataType, Indirection, RefModifier};
pub use entries::{ConversionOperator, FieldEntry, FunctionEntry, FunctionKind, Param, TypeEntry};
pub use error::{EmitError, EmitResult, RegistrationError};
pub use ids::ContextId;
pub use literal::Literal;
pub use type_hash::{TypeHash, hash_constants, primitives};
pub use types::{NumericCategory, PrimitiveKind, TypeKind};
