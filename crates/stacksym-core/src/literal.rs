//! Compile-time constant values.

use std::fmt;

use crate::{DataType, TypeHash, primitives};

/// A constant that can be pushed by a single instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// The null reference; typed as `object`.
    Null,
    Bool(bool),
    /// UTF-16 code unit.
    Char(u16),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    NativeInt(i64),
    NativeUint(u64),
    Str(String),
}

impl Literal {
    /// Type of the pushed value.
    pub fn type_hash(&self) -> TypeHash {
        match self {
            Literal::Null => primitives::OBJECT,
            Literal::Bool(_) => primitives::BOOL,
            Literal::Char(_) => primitives::CHAR,
            Literal::I8(_) => primitives::INT8,
            Literal::I16(_) => primitives::INT16,
            Literal::I32(_) => primitives::INT32,
            Literal::I64(_) => primitives::INT64,
            Literal::U8(_) => primitives::UINT8,
            Literal::U16(_) => primitives::UINT16,
            Literal::U32(_) => primitives::UINT32,
            Literal::U64(_) => primitives::UINT64,
            Literal::F32(_) => primitives::FLOAT,
            Literal::F64(_) => primitives::DOUBLE,
            Literal::NativeInt(_) => primitives::NATIVE_INT,
            Literal::NativeUint(_) => primitives::NATIVE_UINT,
            Literal::Str(_) => primitives::STRING,
        }
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        DataType::simple(self.type_hash())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Bool(v) => write!(f, "{v}"),
            Literal::Char(v) => write!(f, "'\\u{{{v:04x}}}'"),
            Literal::I8(v) => write!(f, "{v}i8"),
            Literal::I16(v) => write!(f, "{v}i16"),
            Literal::I32(v) => write!(f, "{v}"),
            Literal::I64(v) => write!(f, "{v}i64"),
            Literal::U8(v) => write!(f, "{v}u8"),
            Literal::U16(v) => write!(f, "{v}u16"),
            Literal::U32(v) => write!(f, "{v}u32"),
            Literal::U64(v) => write!(f, "{v}u64"),
            Literal::F32(v) => write!(f, "{v}f"),
            Literal::F64(v) => write!(f, "{v}"),
            Literal::NativeInt(v) => write!(f, "{v}n"),
            Literal::NativeUint(v) => write!(f, "{v}un"),
            Literal::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Literal::Bool(v)
    }
}

impl From<i32> for Literal {
    fn from(v: i32) -> Self {
        Literal::I32(v)
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Literal::I64(v)
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Literal::F64(v)
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::Str(v.to_string())
    }
}
