//! The symbol capability protocol.
//!
//! A symbol is an immutable description of how to produce a value. It
//! belongs to exactly one [`Context`] and emits instructions only when asked;
//! asking twice emits twice.
//!
//! Every symbol implements [`Symbol`]. Storage-like symbols additionally
//! implement [`Addressable`] and/or [`Assignable`], exposed through
//! [`Symbol::as_addressable`] and [`Symbol::as_assignable`] so consumers can
//! probe capabilities on a `dyn Symbol`.
//!
//! | Kind | Value | Address | Assign |
//! |---|---|---|---|
//! | [`LiteralSymbol`] | yes | | |
//! | [`Local`] | yes | yes | yes |
//! | [`Argument`] | yes | yes | yes |
//! | [`Field`] | yes | yes | yes |
//! | [`Element`] | yes | yes | yes |
//! | [`Operation`] | yes | | |
//! | [`Captured`] | yes | yes | |

mod argument;
mod captured;
mod element;
mod field;
mod literal;
mod local;
mod operation;

pub use argument::Argument;
pub use captured::Captured;
pub use element::Element;
pub use field::Field;
pub use literal::LiteralSymbol;
pub use local::Local;
pub use operation::{BinaryOp, Operation, UnaryOp};
pub(crate) use operation::require_int32;

use std::fmt;
use std::rc::Rc;

use stacksym_core::{Capabilities, ContextId, DataType, EmitResult};
use stacksym_registry::TypeRegistry;

use crate::Context;

/// Shared handle to a symbol.
pub type SymbolRef = Rc<dyn Symbol>;

/// A value-producing builder object.
pub trait Symbol: fmt::Debug {
    /// The context this symbol was created in.
    fn context(&self) -> ContextId;

    /// Content type, including by-reference or pointer indirection.
    fn data_type(&self) -> DataType;

    /// Leave the symbol's value on the stack.
    ///
    /// For a by-reference symbol the value is the address it holds; use
    /// [`load`](crate::load) with [`LoadIntent::Value`](crate::LoadIntent) to
    /// dereference.
    fn emit_value(&self, ctx: &mut Context<'_>) -> EmitResult<()>;

    fn as_addressable(&self) -> Option<&dyn Addressable> {
        None
    }

    fn as_assignable(&self) -> Option<&dyn Assignable> {
        None
    }

    /// Whether an address can be pushed without spilling anything into a
    /// temporary.
    fn is_addressable_in_place(&self, _registry: &TypeRegistry) -> bool {
        self.data_type().is_by_ref() || self.as_addressable().is_some()
    }

    /// Capabilities derived from the probes above.
    fn capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::VALUE;
        if self.as_addressable().is_some() {
            caps |= Capabilities::ADDRESS;
        }
        if self.as_assignable().is_some() {
            caps |= Capabilities::ASSIGN;
        }
        caps
    }
}

/// A symbol backed by storage whose address can be taken.
pub trait Addressable: Symbol {
    /// Leave the address of the storage on the stack, without copying.
    fn emit_address(&self, ctx: &mut Context<'_>) -> EmitResult<()>;
}

/// A symbol that can be stored into.
pub trait Assignable: Symbol {
    /// Consume the value on top of the stack and store it.
    ///
    /// Located storage pushes its location after the value, so the store
    /// instruction sees `[value, location]`.
    fn emit_store(&self, ctx: &mut Context<'_>) -> EmitResult<()>;
}
