//! Error types for registration and emission.
//!
//! ```text
//! RegistrationError - building the type registry
//! EmitError         - composing symbols and emitting instructions
//! ```
//!
//! Every emission error is raised by the call that detects it, before any
//! instruction has been appended for that call.

use thiserror::Error;

use crate::ContextId;

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors raised while registering types and functions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// A type with this name or hash already exists.
    #[error("duplicate type: {0}")]
    DuplicateType(String),

    /// A function with this signature already exists.
    #[error("duplicate function: {0}")]
    DuplicateFunction(String),

    /// A member was declared on a type that is not registered.
    #[error("unknown owner type for '{member}'")]
    UnknownOwner {
        /// The member being registered.
        member: String,
    },

    /// The type is invalid or malformed.
    #[error("invalid type: {0}")]
    InvalidType(String),
}

// ============================================================================
// Emission Errors
// ============================================================================

/// Errors raised while building method bodies.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmitError {
    /// A symbol or label from one context was used in another.
    #[error("symbol belongs to {found} but was used in {expected}")]
    CrossContext {
        /// The context performing the operation.
        expected: ContextId,
        /// The context the offending participant belongs to.
        found: ContextId,
    },

    /// A symbol lacks a capability the operation needs.
    #[error("symbol of type '{symbol_type}' does not support {capability}")]
    MissingCapability {
        /// The missing capability.
        capability: &'static str,
        /// Type of the offending symbol.
        symbol_type: String,
    },

    /// No conversion rule applies.
    #[error("no conversion from '{from}' to '{to}'")]
    NoConversion {
        /// Source type name.
        from: String,
        /// Target type name.
        to: String,
    },

    /// Source and destination of an assignment are incompatible.
    #[error("cannot assign '{source_type}' to '{destination}'")]
    AssignmentMismatch {
        /// Destination type name.
        destination: String,
        /// Source type name.
        source_type: String,
    },

    /// A label or scope was used out of order.
    #[error("label misuse: {message}")]
    LabelMisuse {
        /// What went wrong.
        message: String,
    },

    /// The type is registered as primitive but has no storage width.
    #[error("primitive type '{type_name}' cannot be loaded or stored indirectly")]
    UnsupportedPrimitive {
        /// The primitive's name.
        type_name: String,
    },

    /// A type hash has no registry entry.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// A member lookup failed.
    #[error("type '{type_name}' has no member '{member}'")]
    UnknownMember {
        /// The type searched.
        type_name: String,
        /// The missing member.
        member: String,
    },

    /// The local slot ceiling was reached.
    #[error("too many locals: limit is {limit}")]
    TooManyLocals {
        /// Configured ceiling.
        limit: u16,
    },

    /// An operand does not fit the instruction encoding.
    #[error("invalid operand: {0}")]
    InvalidOperand(String),

    /// Propagated registration failure.
    #[error(transparent)]
    Registry(#[from] RegistrationError),
}

impl EmitError {
    /// Shorthand for [`EmitError::LabelMisuse`].
    pub fn label_misuse(message: impl Into<String>) -> Self {
        EmitError::LabelMisuse {
            message: message.into(),
        }
    }
}

/// Result alias for emission.
pub type EmitResult<T> = Result<T, EmitError>;
