//! Constant pool for a method body.
//!
//! The constant pool stores literal values pushed by `Constant` and the
//! type, field and function hashes referenced by instruction operands.

use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;
use stacksym_core::{Literal, TypeHash};

/// Values stored in the constant pool.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// A value pushed by `Constant`/`ConstantWide`.
    Literal(Literal),
    /// Type, field or function identity used as an operand.
    TypeHash(TypeHash),
}

/// Constant pool with deduplication.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantPool {
    /// The actual constants.
    constants: Vec<Constant>,
    /// Deduplication index: maps constant to its index.
    index: FxHashMap<ConstantKey, u32>,
}

/// Hashable form of [`Constant`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ConstantKey {
    Null,
    Bool(bool),
    Char(u16),
    Signed(u8, i64),
    Unsigned(u8, u64),
    Float32(OrderedFloat<f32>),
    Float64(OrderedFloat<f64>),
    Str(String),
    TypeHash(TypeHash),
}

impl ConstantPool {
    /// Create a new empty constant pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or get existing constant, returns index.
    pub fn add(&mut self, constant: Constant) -> u32 {
        let key = Self::to_key(&constant);

        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }

        let idx = self.constants.len() as u32;
        self.constants.push(constant);
        self.index.insert(key, idx);
        idx
    }

    /// Add a literal value.
    pub fn add_literal(&mut self, literal: Literal) -> u32 {
        self.add(Constant::Literal(literal))
    }

    /// Add a type hash.
    pub fn add_type_hash(&mut self, hash: TypeHash) -> u32 {
        self.add(Constant::TypeHash(hash))
    }

    /// Get constant by index.
    pub fn get(&self, index: u32) -> Option<&Constant> {
        self.constants.get(index as usize)
    }

    /// Get a type hash constant by index.
    pub fn type_hash(&self, index: u32) -> Option<TypeHash> {
        match self.get(index) {
            Some(Constant::TypeHash(hash)) => Some(*hash),
            _ => None,
        }
    }

    /// Get all constants.
    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    /// Number of constants.
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    /// Check if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    fn to_key(constant: &Constant) -> ConstantKey {
        let literal = match constant {
            Constant::TypeHash(h) => return ConstantKey::TypeHash(*h),
            Constant::Literal(literal) => literal,
        };
        // Width tags keep equal numbers of different types apart.
        match literal {
            Literal::Null => ConstantKey::Null,
            Literal::Bool(v) => ConstantKey::Bool(*v),
            Literal::Char(v) => ConstantKey::Char(*v),
            Literal::I8(v) => ConstantKey::Signed(1, i64::from(*v)),
            Literal::I16(v) => ConstantKey::Signed(2, i64::from(*v)),
            Literal::I32(v) => ConstantKey::Signed(4, i64::from(*v)),
            Literal::I64(v) => ConstantKey::Signed(8, *v),
            Literal::NativeInt(v) => ConstantKey::Signed(0, *v),
            Literal::U8(v) => ConstantKey::Unsigned(1, u64::from(*v)),
            Literal::U16(v) => ConstantKey::Unsigned(2, u64::from(*v)),
            Literal::U32(v) => ConstantKey::Unsigned(4, u64::from(*v)),
            Literal::U64(v) => ConstantKey::Unsigned(8, *v),
            Literal::NativeUint(v) => ConstantKey::Unsigned(0, *v),
            Literal::F32(v) => ConstantKey::Float32(OrderedFloat(*v)),
            Literal::F64(v) => ConstantKey::Float64(OrderedFloat(*v)),
            Literal::Str(s) => ConstantKey::Str(s.clone()),
        }
    }
}
