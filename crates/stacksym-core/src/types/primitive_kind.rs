//! Primitive type kinds and their storage widths.

use std::fmt;

use crate::TypeHash;

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Void,
    Bool,
    Char,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float,
    Double,
    NativeInt,
    NativeUint,
}

/// Coarse category of a primitive's storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericCategory {
    /// Two's complement signed integer.
    Signed,
    /// Unsigned integer (includes `bool` and `char`).
    Unsigned,
    /// IEEE 754 floating point.
    Float,
    /// Pointer-sized integer.
    Native,
}

impl PrimitiveKind {
    /// Every primitive, in registration order.
    pub const ALL: [PrimitiveKind; 15] = [
        PrimitiveKind::Void,
        PrimitiveKind::Bool,
        PrimitiveKind::Char,
        PrimitiveKind::Int8,
        PrimitiveKind::Int16,
        PrimitiveKind::Int32,
        PrimitiveKind::Int64,
        PrimitiveKind::Uint8,
        PrimitiveKind::Uint16,
        PrimitiveKind::Uint32,
        PrimitiveKind::Uint64,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::NativeInt,
        PrimitiveKind::NativeUint,
    ];

    /// Get the TypeHash for this primitive type.
    pub const fn type_hash(self) -> TypeHash {
        use crate::primitives;
        match self {
            PrimitiveKind::Void => primitives::VOID,
            PrimitiveKind::Bool => primitives::BOOL,
            PrimitiveKind::Char => primitives::CHAR,
            PrimitiveKind::Int8 => primitives::INT8,
            PrimitiveKind::Int16 => primitives::INT16,
            PrimitiveKind::Int32 => primitives::INT32,
            PrimitiveKind::Int64 => primitives::INT64,
            PrimitiveKind::Uint8 => primitives::UINT8,
            PrimitiveKind::Uint16 => primitives::UINT16,
            PrimitiveKind::Uint32 => primitives::UINT32,
            PrimitiveKind::Uint64 => primitives::UINT64,
            PrimitiveKind::Float => primitives::FLOAT,
            PrimitiveKind::Double => primitives::DOUBLE,
            PrimitiveKind::NativeInt => primitives::NATIVE_INT,
            PrimitiveKind::NativeUint => primitives::NATIVE_UINT,
        }
    }

    /// Get the name of this primitive type.
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Void => "void",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Int8 => "int8",
            PrimitiveKind::Int16 => "int16",
            PrimitiveKind::Int32 => "int32",
            PrimitiveKind::Int64 => "int64",
            PrimitiveKind::Uint8 => "uint8",
            PrimitiveKind::Uint16 => "uint16",
            PrimitiveKind::Uint32 => "uint32",
            PrimitiveKind::Uint64 => "uint64",
            PrimitiveKind::Float => "float32",
            PrimitiveKind::Double => "float64",
            PrimitiveKind::NativeInt => "nint",
            PrimitiveKind::NativeUint => "nuint",
        }
    }

    /// Storage size in bytes. `None` for `void`, which has no storage.
    pub const fn size_bytes(self) -> Option<usize> {
        match self {
            PrimitiveKind::Void => None,
            PrimitiveKind::Bool | PrimitiveKind::Int8 | PrimitiveKind::Uint8 => Some(1),
            PrimitiveKind::Char | PrimitiveKind::Int16 | PrimitiveKind::Uint16 => Some(2),
            PrimitiveKind::Int32 | PrimitiveKind::Uint32 | PrimitiveKind::Float => Some(4),
            PrimitiveKind::Int64 | PrimitiveKind::Uint64 | PrimitiveKind::Double => Some(8),
            PrimitiveKind::NativeInt | PrimitiveKind::NativeUint => {
                Some(std::mem::size_of::<usize>())
            }
        }
    }

    /// Storage category. `None` for `void`.
    pub const fn category(self) -> Option<NumericCategory> {
        match self {
            PrimitiveKind::Void => None,
            PrimitiveKind::Int8 | PrimitiveKind::Int16 | PrimitiveKind::Int32 | PrimitiveKind::Int64 => {
                Some(NumericCategory::Signed)
            }
            PrimitiveKind::Bool
            | PrimitiveKind::Char
            | PrimitiveKind::Uint8
            | PrimitiveKind::Uint16
            | PrimitiveKind::Uint32
            | PrimitiveKind::Uint64 => Some(NumericCategory::Unsigned),
            PrimitiveKind::Float | PrimitiveKind::Double => Some(NumericCategory::Float),
            PrimitiveKind::NativeInt | PrimitiveKind::NativeUint => Some(NumericCategory::Native),
        }
    }

    /// Look up the primitive whose hash is `hash`.
    pub fn from_hash(hash: TypeHash) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_hash() == hash)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_match_names() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(kind.type_hash(), TypeHash::from_name(kind.name()), "{kind}");
        }
    }

    #[test]
    fn void_has_no_width() {
        assert_eq!(PrimitiveKind::Void.size_bytes(), None);
        assert_eq!(PrimitiveKind::Void.category(), None);
    }

    #[test]
    fn widths() {
        assert_eq!(PrimitiveKind::Bool.size_bytes(), Some(1));
        assert_eq!(PrimitiveKind::Char.size_bytes(), Some(2));
        assert_eq!(PrimitiveKind::Float.size_bytes(), Some(4));
        assert_eq!(PrimitiveKind::Uint64.size_bytes(), Some(8));
        assert_eq!(PrimitiveKind::Int16.category(), Some(NumericCategory::Signed));
        assert_eq!(PrimitiveKind::Char.category(), Some(NumericCategory::Unsigned));
    }

    #[test]
    fn from_hash_round_trip() {
        assert_eq!(
            PrimitiveKind::from_hash(crate::primitives::UINT16),
            Some(PrimitiveKind::Uint16)
        );
        assert_eq!(PrimitiveKind::from_hash(crate::primitives::OBJECT), None);
    }
}
