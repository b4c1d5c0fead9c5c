//! Runtime values.

use std::fmt;
use std::rc::Rc;

use stacksym_core::{Literal, PrimitiveKind, TypeHash, TypeKind};
use stacksym_registry::TypeRegistry;

use crate::heap::ObjectId;

/// Where an addressed value lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Root {
    Local { frame: usize, slot: u16 },
    Arg { frame: usize, slot: u16 },
    /// Static field, by field hash.
    Static(TypeHash),
    Heap(ObjectId),
    Captured { owner: TypeHash, index: u16 },
}

/// A managed address: a root plus a path of aggregate indexes below it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    pub root: Root,
    pub path: Vec<u16>,
}

impl Address {
    pub fn new(root: Root) -> Self {
        Self {
            root,
            path: Vec::new(),
        }
    }

    /// The address of member `index` of the aggregate at this address.
    pub fn member(&self, index: u16) -> Self {
        let mut path = self.path.clone();
        path.push(index);
        Self {
            root: self.root.clone(),
            path,
        }
    }
}

/// A value on the operand stack or in a slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Void,
    Null,
    Bool(bool),
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
    Str(Rc<str>),
    /// Managed reference to a heap object.
    Ref(ObjectId),
    /// Fields of a value type, in field index order.
    Aggregate(Vec<Value>),
    Address(Address),
}

impl Value {
    /// Zero value for a slot of `hash`.
    pub fn default_for(registry: &TypeRegistry, hash: TypeHash) -> Value {
        match registry.kind(hash) {
            Some(TypeKind::Primitive(kind)) => Self::zero(*kind),
            Some(TypeKind::Value { .. }) => {
                let fields = registry
                    .get(hash)
                    .map(|entry| {
                        let mut fields: Vec<_> = entry.instance_fields().collect();
                        fields.sort_by_key(|f| f.index);
                        fields
                            .into_iter()
                            .map(|f| Self::default_for(registry, f.data_type.type_hash))
                            .collect()
                    })
                    .unwrap_or_default();
                Value::Aggregate(fields)
            }
            _ => Value::Null,
        }
    }

    fn zero(kind: PrimitiveKind) -> Value {
        match kind {
            PrimitiveKind::Void => Value::Void,
            PrimitiveKind::Bool => Value::Bool(false),
            PrimitiveKind::Char => Value::Char(0),
            PrimitiveKind::Int8 => Value::I8(0),
            PrimitiveKind::Int16 => Value::I16(0),
            PrimitiveKind::Int32 => Value::I32(0),
            PrimitiveKind::Int64 => Value::I64(0),
            PrimitiveKind::Uint8 => Value::U8(0),
            PrimitiveKind::Uint16 => Value::U16(0),
            PrimitiveKind::Uint32 => Value::U32(0),
            PrimitiveKind::Uint64 => Value::U64(0),
            PrimitiveKind::Float => Value::F32(0.0),
            PrimitiveKind::Double => Value::F64(0.0),
            PrimitiveKind::NativeInt => Value::NativeInt(0),
            PrimitiveKind::NativeUint => Value::NativeUint(0),
        }
    }

    /// Short name of the variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::I8(_) => "int8",
            Value::I16(_) => "int16",
            Value::I32(_) => "int32",
            Value::I64(_) => "int64",
            Value::U8(_) => "uint8",
            Value::U16(_) => "uint16",
            Value::U32(_) => "uint32",
            Value::U64(_) => "uint64",
            Value::F32(_) => "float32",
            Value::F64(_) => "float64",
            Value::NativeInt(_) => "nint",
            Value::NativeUint(_) => "nuint",
            Value::Str(_) => "string",
            Value::Ref(_) => "reference",
            Value::Aggregate(_) => "aggregate",
            Value::Address(_) => "address",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Null => Value::Null,
            Literal::Bool(v) => Value::Bool(*v),
            Literal::Char(v) => Value::Char(*v),
            Literal::I8(v) => Value::I8(*v),
            Literal::I16(v) => Value::I16(*v),
            Literal::I32(v) => Value::I32(*v),
            Literal::I64(v) => Value::I64(*v),
            Literal::U8(v) => Value::U8(*v),
            Literal::U16(v) => Value::U16(*v),
            Literal::U32(v) => Value::U32(*v),
            Literal::U64(v) => Value::U64(*v),
            Literal::F32(v) => Value::F32(*v),
            Literal::F64(v) => Value::F64(*v),
            Literal::NativeInt(v) => Value::NativeInt(*v),
            Literal::NativeUint(v) => Value::NativeUint(*v),
            Literal::Str(s) => Value::Str(Rc::from(s.as_str())),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(Rc::from(v))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => write!(f, "void"),
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "'\\u{{{v:04x}}}'"),
            Value::I8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::NativeInt(v) => write!(f, "{v}"),
            Value::NativeUint(v) => write!(f, "{v}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Ref(id) => write!(f, "{id}"),
            Value::Aggregate(fields) => {
                write!(f, "{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{field}")?;
                }
                write!(f, "}}")
            }
            Value::Address(address) => write!(f, "&{:?}{:?}", address.root, address.path),
        }
    }
}
