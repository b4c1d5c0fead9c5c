//! Registry entry types.
//!
//! - [`TypeEntry`] - a registered type with its members
//! - [`FieldEntry`] - instance or static storage declared on a type
//! - [`FunctionEntry`] - methods, constructors and conversion operators
//! - [`Param`] - a declared parameter with its passing mode

mod field;
mod function;
mod type_entry;

pub use field::FieldEntry;
pub use function::{ConversionOperator, FunctionEntry, FunctionKind, Param};
pub use type_entry::TypeEntry;
