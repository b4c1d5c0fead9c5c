//! Type metadata for the stacksym emission core.
//!
//! [`TypeRegistry`] stores types, fields and functions by [`TypeHash`] and
//! answers the questions emission asks: is this a value type, which field
//! does `name` resolve to, is there a conversion operator from `A` to `B`.
//!
//! [`TypeHash`]: stacksym_core::TypeHash

mod operator_index;
mod registry;

pub use operator_index::OperatorIndex;
pub use registry::TypeRegistry;
