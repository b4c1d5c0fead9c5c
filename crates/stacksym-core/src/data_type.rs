//! DataType - a type identity plus indirection.
//!
//! A symbol's content type is a [`TypeHash`] optionally decorated as
//! *by-reference* (the slot holds the address of a `T`) or *pointer* (the
//! slot holds an unmanaged pointer to a `T`). Parameter passing modes are a
//! separate concern, carried by [`RefModifier`] on a parameter.
//!
//! # Example
//!
//! ```
//! use stacksym_core::{DataType, Indirection, primitives};
//!
//! let plain = DataType::simple(primitives::INT32);
//! let by_ref = DataType::by_ref(primitives::INT32);
//!
//! assert!(by_ref.is_by_ref());
//! assert_eq!(by_ref.dereferenced(), plain);
//! assert_eq!(plain.indirection, Indirection::None);
//! ```

use std::fmt::{self, Display, Formatter};

use crate::TypeHash;

/// Parameter passing mode.
///
/// - `In`: read-only reference; any value is accepted (temporaries allowed)
/// - `Out`: write-only reference
/// - `InOut`: read-write reference (`ref`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RefModifier {
    /// Passed by value.
    #[default]
    None,
    /// `in` - read-only reference.
    In,
    /// `out` - write-only reference.
    Out,
    /// `ref` - read-write reference.
    InOut,
}

impl RefModifier {
    /// Whether the parameter receives an address rather than a value.
    #[inline]
    pub const fn is_reference(self) -> bool {
        !matches!(self, RefModifier::None)
    }
}

impl Display for RefModifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RefModifier::None => Ok(()),
            RefModifier::In => write!(f, "in"),
            RefModifier::Out => write!(f, "out"),
            RefModifier::InOut => write!(f, "ref"),
        }
    }
}

/// How the content type relates to the storage that holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Indirection {
    /// The slot holds the value itself.
    #[default]
    None,
    /// The slot holds a managed reference to a `T` slot (`T&`).
    ByRef,
    /// The slot holds an unmanaged pointer to a `T` (`T*`).
    Pointer,
}

/// A complete content type. `Copy`, so it is passed by value everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataType {
    /// The base type hash.
    pub type_hash: TypeHash,
    /// Indirection applied to the base type.
    pub indirection: Indirection,
}

impl DataType {
    /// A type with no indirection.
    #[inline]
    pub const fn simple(type_hash: TypeHash) -> Self {
        Self {
            type_hash,
            indirection: Indirection::None,
        }
    }

    /// A by-reference type (`T&`).
    #[inline]
    pub const fn by_ref(type_hash: TypeHash) -> Self {
        Self {
            type_hash,
            indirection: Indirection::ByRef,
        }
    }

    /// A pointer type (`T*`).
    #[inline]
    pub const fn pointer(type_hash: TypeHash) -> Self {
        Self {
            type_hash,
            indirection: Indirection::Pointer,
        }
    }

    /// The `void` type.
    #[inline]
    pub const fn void() -> Self {
        Self::simple(crate::primitives::VOID)
    }

    #[inline]
    pub const fn is_by_ref(&self) -> bool {
        matches!(self.indirection, Indirection::ByRef)
    }

    #[inline]
    pub const fn is_pointer(&self) -> bool {
        matches!(self.indirection, Indirection::Pointer)
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        self.type_hash == crate::primitives::VOID && self.indirection == Indirection::None
    }

    /// The element type a by-reference slot refers to.
    ///
    /// Pointers are values in their own right and are returned unchanged.
    #[inline]
    pub const fn dereferenced(&self) -> Self {
        match self.indirection {
            Indirection::ByRef => Self::simple(self.type_hash),
            _ => *self,
        }
    }

    /// The type with any indirection removed.
    #[inline]
    pub const fn element(&self) -> Self {
        Self::simple(self.type_hash)
    }

    /// This type made by-reference.
    #[inline]
    pub const fn make_by_ref(&self) -> Self {
        Self::by_ref(self.type_hash)
    }
}

impl From<TypeHash> for DataType {
    fn from(type_hash: TypeHash) -> Self {
        Self::simple(type_hash)
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_hash)?;
        match self.indirection {
            Indirection::None => Ok(()),
            Indirection::ByRef => write!(f, "&"),
            Indirection::Pointer => write!(f, "*"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;

    #[test]
    fn dereferenced_strips_only_by_ref() {
        let by_ref = DataType::by_ref(primitives::INT32);
        let pointer = DataType::pointer(primitives::INT32);

        assert_eq!(by_ref.dereferenced(), DataType::simple(primitives::INT32));
        assert_eq!(pointer.dereferenced(), pointer);
        assert_eq!(pointer.element(), DataType::simple(primitives::INT32));
    }

    #[test]
    fn make_by_ref_round_trip() {
        let plain = DataType::simple(primitives::DOUBLE);
        assert_eq!(plain.make_by_ref().dereferenced(), plain);
    }

    #[test]
    fn void_detection() {
        assert!(DataType::void().is_void());
        assert!(!DataType::pointer(primitives::VOID).is_void());
    }

    #[test]
    fn ref_modifier_is_reference() {
        assert!(!RefModifier::None.is_reference());
        assert!(RefModifier::In.is_reference());
        assert!(RefModifier::Out.is_reference());
        assert!(RefModifier::InOut.is_reference());
    }
}
