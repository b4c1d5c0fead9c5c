//! Deterministic hash-based identity for types and members.
//!
//! [`TypeHash`] is a 64-bit hash computed from names and signatures. Types,
//! fields, methods, constructors and conversion operators each hash under a
//! separate domain constant so that a field called `value` never collides
//! with a method called `value`.
//!
//! # Examples
//!
//! ```
//! use stacksym_core::{TypeHash, primitives};
//!
//! let point = TypeHash::from_name("Point");
//! assert_eq!(point, TypeHash::from_name("Point"));
//!
//! // Primitive constants are the same hashes `from_name` computes.
//! assert_eq!(primitives::INT32, TypeHash::from_name("int32"));
//! ```

use std::fmt;

use xxhash_rust::const_xxh64;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
pub mod hash_constants {
    /// Separator constant for chained components.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for type hashes.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for free function hashes.
    pub const FUNCTION: u64 = 0x5ea77ffbcdf5f302;

    /// Domain marker for method hashes.
    pub const METHOD: u64 = 0x7d3c8b4a92e15f6d;

    /// Domain marker for operator hashes.
    pub const OPERATOR: u64 = 0x3e9f5d2a8c7b1403;

    /// Domain marker for constructor hashes.
    pub const CONSTRUCTOR: u64 = 0x9a7f3d5e2b8c4601;

    /// Domain marker for field hashes.
    pub const FIELD: u64 = 0x1a095090689d4647;

    /// Domain marker for array type hashes.
    pub const ARRAY: u64 = 0x6c8e9cf570932bd5;

    /// Parameter position mixing constants. Position matters, so `(a, b)`
    /// and `(b, a)` hash differently.
    pub const PARAM_MARKERS: [u64; 16] = [
        0x9e3779b97f4a7c15,
        0xbf58476d1ce4e5b9,
        0x94d049bb133111eb,
        0xd6e8feb86659fd93,
        0xe7037ed1a0b428db,
        0xc6a4a7935bd1e995,
        0x8648dbbc94d49b8d,
        0xa2b48b2c69e0d657,
        0x7c3e9f2a5b8d1403,
        0x5d8c7b4a3e9f2106,
        0x3f1e9d8c7b5a4203,
        0x1a2b3c4d5e6f7089,
        0x9f8e7d6c5b4a3210,
        0x2468ace013579bdf,
        0xfdb97531eca86420,
        0x123456789abcdef0,
    ];
}

/// A deterministic 64-bit hash identifying a type, field or function.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a type hash from a qualified type name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Compile-time variant of [`TypeHash::from_name`]; yields identical hashes.
    #[inline]
    pub const fn from_name_const(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ const_xxh64::xxh64(name.as_bytes(), 0))
    }

    /// Create a free function hash from name and parameter types.
    #[inline]
    pub fn from_function(name: &str, params: &[TypeHash]) -> Self {
        let seed = hash_constants::FUNCTION ^ xxh64(name.as_bytes(), 0);
        TypeHash(mix_params(seed, params))
    }

    /// Create a method hash from owner, name and parameter types.
    #[inline]
    pub fn from_method(owner: TypeHash, name: &str, params: &[TypeHash]) -> Self {
        let seed = hash_constants::METHOD ^ owner.0 ^ xxh64(name.as_bytes(), 0);
        TypeHash(mix_params(seed, params))
    }

    /// Create a constructor hash from owner and parameter types.
    #[inline]
    pub fn from_constructor(owner: TypeHash, params: &[TypeHash]) -> Self {
        TypeHash(mix_params(hash_constants::CONSTRUCTOR ^ owner.0, params))
    }

    /// Create an operator hash.
    ///
    /// The return type takes part in the hash: conversion operators differ
    /// only by what they return.
    #[inline]
    pub fn from_operator(
        owner: TypeHash,
        operator_name: &str,
        params: &[TypeHash],
        returns: TypeHash,
    ) -> Self {
        let seed = hash_constants::OPERATOR ^ owner.0 ^ xxh64(operator_name.as_bytes(), 0);
        let hash = mix_params(seed, params);
        TypeHash(hash.wrapping_mul(hash_constants::SEP) ^ returns.0)
    }

    /// Create a field hash from owner and field name.
    #[inline]
    pub fn from_field(owner: TypeHash, name: &str) -> Self {
        TypeHash(hash_constants::FIELD ^ owner.0.rotate_left(17) ^ xxh64(name.as_bytes(), 0))
    }

    /// Create the hash of a one-dimensional array of `element`.
    #[inline]
    pub fn array_of(element: TypeHash) -> Self {
        TypeHash(mix_params(hash_constants::ARRAY, &[element]))
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

fn mix_params(mut hash: u64, params: &[TypeHash]) -> u64 {
    for (i, param) in params.iter().enumerate() {
        let marker = hash_constants::PARAM_MARKERS
            .get(i)
            .copied()
            .unwrap_or_else(|| hash_constants::PARAM_MARKERS[0].wrapping_add(i as u64));
        hash = hash
            .wrapping_mul(hash_constants::SEP)
            .wrapping_add(marker ^ param.0);
    }
    hash
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Well-known hashes for built-in types.
///
/// Each constant equals `TypeHash::from_name` of the name in its doc comment.
pub mod primitives {
    use super::TypeHash;

    /// `void`
    pub const VOID: TypeHash = TypeHash::from_name_const("void");
    /// `bool`
    pub const BOOL: TypeHash = TypeHash::from_name_const("bool");
    /// `char` (UTF-16 code unit)
    pub const CHAR: TypeHash = TypeHash::from_name_const("char");
    /// `int8`
    pub const INT8: TypeHash = TypeHash::from_name_const("int8");
    /// `int16`
    pub const INT16: TypeHash = TypeHash::from_name_const("int16");
    /// `int32`
    pub const INT32: TypeHash = TypeHash::from_name_const("int32");
    /// `int64`
    pub const INT64: TypeHash = TypeHash::from_name_const("int64");
    /// `uint8`
    pub const UINT8: TypeHash = TypeHash::from_name_const("uint8");
    /// `uint16`
    pub const UINT16: TypeHash = TypeHash::from_name_const("uint16");
    /// `uint32`
    pub const UINT32: TypeHash = TypeHash::from_name_const("uint32");
    /// `uint64`
    pub const UINT64: TypeHash = TypeHash::from_name_const("uint64");
    /// `float32`
    pub const FLOAT: TypeHash = TypeHash::from_name_const("float32");
    /// `float64`
    pub const DOUBLE: TypeHash = TypeHash::from_name_const("float64");
    /// `nint` (pointer-sized signed integer)
    pub const NATIVE_INT: TypeHash = TypeHash::from_name_const("nint");
    /// `nuint` (pointer-sized unsigned integer)
    pub const NATIVE_UINT: TypeHash = TypeHash::from_name_const("nuint");
    /// `object`, the universal reference type every value boxes into.
    pub const OBJECT: TypeHash = TypeHash::from_name_const("object");
    /// `string`
    pub const STRING: TypeHash = TypeHash::from_name_const("string");
}
