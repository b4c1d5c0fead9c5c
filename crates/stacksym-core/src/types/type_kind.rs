//! Type kind determines memory semantics for types.

use crate::{PrimitiveKind, TypeHash};

/// Memory semantics of a registered type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// Built-in scalar, copied by single load/store instructions.
    Primitive(PrimitiveKind),

    /// Non-primitive value type (aggregate). Copied structurally.
    Value {
        /// Size in bytes.
        size: usize,
        /// Alignment requirement.
        align: usize,
    },

    /// Heap-allocated class with reference semantics.
    Reference,

    /// The universal reference type. Every reference type is assignable to
    /// it and every value type boxes into it.
    Object,

    /// One-dimensional array, a reference type.
    Array {
        /// Element type hash.
        element: TypeHash,
    },
}

impl TypeKind {
    /// Value types live in their slot: primitives and aggregates.
    pub const fn is_value_type(&self) -> bool {
        matches!(self, TypeKind::Primitive(_) | TypeKind::Value { .. })
    }

    /// Reference types are represented by a managed reference in their slot.
    pub const fn is_reference_type(&self) -> bool {
        !self.is_value_type()
    }

    /// Non-primitive value type.
    pub const fn is_aggregate(&self) -> bool {
        matches!(self, TypeKind::Value { .. })
    }

    pub const fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self {
            TypeKind::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_vs_reference() {
        assert!(TypeKind::Primitive(PrimitiveKind::Int32).is_value_type());
        assert!(TypeKind::Value { size: 8, align: 4 }.is_value_type());
        assert!(TypeKind::Reference.is_reference_type());
        assert!(TypeKind::Object.is_reference_type());
        assert!(
            TypeKind::Array {
                element: crate::primitives::INT32
            }
            .is_reference_type()
        );
    }

    #[test]
    fn aggregate_only_for_value_kind() {
        assert!(TypeKind::Value { size: 16, align: 8 }.is_aggregate());
        assert!(!TypeKind::Primitive(PrimitiveKind::Double).is_aggregate());
        assert!(!TypeKind::Reference.is_aggregate());
    }
}
