//! Type classification.

mod primitive_kind;
mod type_kind;

pub use primitive_kind::{NumericCategory, PrimitiveKind};
pub use type_kind::TypeKind;
