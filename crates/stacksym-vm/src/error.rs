//! Runtime errors.

use thiserror::Error;

use stacksym_core::TypeHash;

use crate::heap::ObjectId;

/// Errors raised while executing sealed methods.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VmError {
    #[error("no body or native registered for function {0}")]
    UnknownFunction(TypeHash),

    #[error("function {function} takes {expected} values but received {found}")]
    ArityMismatch {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("operand stack underflow at offset {offset}")]
    StackUnderflow { offset: usize },

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("null reference")]
    NullReference,

    #[error("{0} does not refer to a live object")]
    DanglingReference(ObjectId),

    #[error("cannot cast '{from}' to '{to}'")]
    InvalidCast { from: String, to: String },

    #[error("index {index} out of bounds for length {length}")]
    IndexOutOfBounds { index: i64, length: usize },

    #[error("division by zero")]
    DivideByZero,

    #[error("malformed bytecode at offset {offset}")]
    InvalidBytecode { offset: usize },

    #[error("call depth exceeded {limit}")]
    StackOverflow { limit: usize },

    #[error("native function failed: {0}")]
    Native(String),
}

pub type VmResult<T> = Result<T, VmError>;
