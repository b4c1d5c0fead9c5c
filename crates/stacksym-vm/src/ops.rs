//! Arithmetic, bitwise and comparison instructions.
//!
//! Both operands of a binary instruction have the same runtime type.
//! Integer arithmetic wraps.

use std::cmp::Ordering;
use std::rc::Rc;

use stacksym_codegen::OpCode;

use crate::error::{VmError, VmResult};
use crate::value::Value;

macro_rules! int_op {
    ($op:expr, $a:expr, $b:expr, $variant:ident) => {{
        let (a, b) = ($a, $b);
        Value::$variant(match $op {
            OpCode::Add => a.wrapping_add(b),
            OpCode::Sub => a.wrapping_sub(b),
            OpCode::Mul => a.wrapping_mul(b),
            OpCode::Div if b == 0 => return Err(VmError::DivideByZero),
            OpCode::Div => a.wrapping_div(b),
            OpCode::Rem if b == 0 => return Err(VmError::DivideByZero),
            OpCode::Rem => a.wrapping_rem(b),
            OpCode::BitAnd => a & b,
            OpCode::BitOr => a | b,
            OpCode::BitXor => a ^ b,
            _ => return Err(mismatch("integer instruction", &Value::$variant(a))),
        })
    }};
}

macro_rules! float_op {
    ($op:expr, $a:expr, $b:expr, $variant:ident) => {{
        let (a, b) = ($a, $b);
        Value::$variant(match $op {
            OpCode::Add => a + b,
            OpCode::Sub => a - b,
            OpCode::Mul => a * b,
            OpCode::Div => a / b,
            OpCode::Rem => a % b,
            _ => return Err(mismatch("float instruction", &Value::$variant(a))),
        })
    }};
}

fn mismatch(expected: &'static str, found: &Value) -> VmError {
    VmError::TypeMismatch {
        expected,
        found: found.kind_name(),
    }
}

/// `Add` through `BitXor`.
pub(crate) fn arithmetic(op: OpCode, lhs: Value, rhs: Value) -> VmResult<Value> {
    Ok(match (lhs, rhs) {
        (Value::I8(a), Value::I8(b)) => int_op!(op, a, b, I8),
        (Value::I16(a), Value::I16(b)) => int_op!(op, a, b, I16),
        (Value::I32(a), Value::I32(b)) => int_op!(op, a, b, I32),
        (Value::I64(a), Value::I64(b)) => int_op!(op, a, b, I64),
        (Value::U8(a), Value::U8(b)) => int_op!(op, a, b, U8),
        (Value::U16(a), Value::U16(b)) => int_op!(op, a, b, U16),
        (Value::U32(a), Value::U32(b)) => int_op!(op, a, b, U32),
        (Value::U64(a), Value::U64(b)) => int_op!(op, a, b, U64),
        (Value::NativeInt(a), Value::NativeInt(b)) => int_op!(op, a, b, NativeInt),
        (Value::NativeUint(a), Value::NativeUint(b)) => int_op!(op, a, b, NativeUint),
        (Value::Char(a), Value::Char(b)) => int_op!(op, a, b, Char),
        (Value::F32(a), Value::F32(b)) => float_op!(op, a, b, F32),
        (Value::F64(a), Value::F64(b)) => float_op!(op, a, b, F64),
        (Value::Bool(a), Value::Bool(b)) => Value::Bool(match op {
            OpCode::BitAnd => a & b,
            OpCode::BitOr => a | b,
            OpCode::BitXor => a ^ b,
            _ => return Err(mismatch("numeric operands", &Value::Bool(a))),
        }),
        (Value::Str(a), Value::Str(b)) if op == OpCode::Add => {
            Value::Str(Rc::from(format!("{a}{b}").as_str()))
        }
        (lhs, _) => return Err(mismatch("matching numeric operands", &lhs)),
    })
}

fn order(lhs: &Value, rhs: &Value) -> VmResult<Option<Ordering>> {
    Ok(match (lhs, rhs) {
        (Value::I8(a), Value::I8(b)) => a.partial_cmp(b),
        (Value::I16(a), Value::I16(b)) => a.partial_cmp(b),
        (Value::I32(a), Value::I32(b)) => a.partial_cmp(b),
        (Value::I64(a), Value::I64(b)) => a.partial_cmp(b),
        (Value::U8(a), Value::U8(b)) => a.partial_cmp(b),
        (Value::U16(a), Value::U16(b)) => a.partial_cmp(b),
        (Value::U32(a), Value::U32(b)) => a.partial_cmp(b),
        (Value::U64(a), Value::U64(b)) => a.partial_cmp(b),
        (Value::NativeInt(a), Value::NativeInt(b)) => a.partial_cmp(b),
        (Value::NativeUint(a), Value::NativeUint(b)) => a.partial_cmp(b),
        (Value::Char(a), Value::Char(b)) => a.partial_cmp(b),
        (Value::F32(a), Value::F32(b)) => a.partial_cmp(b),
        (Value::F64(a), Value::F64(b)) => a.partial_cmp(b),
        (lhs, _) => return Err(mismatch("ordered operands", lhs)),
    })
}

/// `Eq` through `Ge`. NaN compares unequal and unordered.
pub(crate) fn compare(op: OpCode, lhs: &Value, rhs: &Value) -> VmResult<bool> {
    Ok(match op {
        OpCode::Eq => lhs == rhs,
        OpCode::Ne => lhs != rhs,
        OpCode::Lt => order(lhs, rhs)? == Some(Ordering::Less),
        OpCode::Le => matches!(order(lhs, rhs)?, Some(Ordering::Less | Ordering::Equal)),
        OpCode::Gt => order(lhs, rhs)? == Some(Ordering::Greater),
        OpCode::Ge => matches!(
            order(lhs, rhs)?,
            Some(Ordering::Greater | Ordering::Equal)
        ),
        _ => return Err(mismatch("comparison instruction", lhs)),
    })
}

pub(crate) fn negate(value: Value) -> VmResult<Value> {
    Ok(match value {
        Value::I8(v) => Value::I8(v.wrapping_neg()),
        Value::I16(v) => Value::I16(v.wrapping_neg()),
        Value::I32(v) => Value::I32(v.wrapping_neg()),
        Value::I64(v) => Value::I64(v.wrapping_neg()),
        Value::NativeInt(v) => Value::NativeInt(v.wrapping_neg()),
        Value::NativeUint(v) => Value::NativeUint(v.wrapping_neg()),
        Value::F32(v) => Value::F32(-v),
        Value::F64(v) => Value::F64(-v),
        other => return Err(mismatch("signed operand", &other)),
    })
}

/// Logical not for `bool`, complement for integers.
pub(crate) fn not(value: Value) -> VmResult<Value> {
    Ok(match value {
        Value::Bool(v) => Value::Bool(!v),
        Value::I8(v) => Value::I8(!v),
        Value::I16(v) => Value::I16(!v),
        Value::I32(v) => Value::I32(!v),
        Value::I64(v) => Value::I64(!v),
        Value::U8(v) => Value::U8(!v),
        Value::U16(v) => Value::U16(!v),
        Value::U32(v) => Value::U32(!v),
        Value::U64(v) => Value::U64(!v),
        Value::Char(v) => Value::Char(!v),
        Value::NativeInt(v) => Value::NativeInt(!v),
        Value::NativeUint(v) => Value::NativeUint(!v),
        other => return Err(mismatch("integer or bool operand", &other)),
    })
}
