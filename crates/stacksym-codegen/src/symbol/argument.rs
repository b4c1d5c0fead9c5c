use stacksym_core::{ContextId, DataType, EmitResult};

use super::{Addressable, Assignable, Symbol};
use crate::Context;
use crate::bytecode::OpCode;

/// An argument slot of the method under construction.
///
/// In instance methods slot 0 is the receiver. Reference parameters have a
/// by-reference type: the slot holds the caller's address.
#[derive(Debug)]
pub struct Argument {
    context: ContextId,
    slot: u16,
    data_type: DataType,
}

impl Argument {
    pub(crate) fn new(context: ContextId, slot: u16, data_type: DataType) -> Self {
        Self {
            context,
            slot,
            data_type,
        }
    }

    pub fn slot(&self) -> u16 {
        self.slot
    }
}

impl Symbol for Argument {
    fn context(&self) -> ContextId {
        self.context
    }

    fn data_type(&self) -> DataType {
        self.data_type
    }

    fn emit_value(&self, ctx: &mut Context<'_>) -> EmitResult<()> {
        ctx.check_context(self.context)?;
        ctx.emitter().emit_u16(OpCode::GetArg, self.slot);
        Ok(())
    }

    fn as_addressable(&self) -> Option<&dyn Addressable> {
        Some(self)
    }

    fn as_assignable(&self) -> Option<&dyn Assignable> {
        Some(self)
    }
}

impl Addressable for Argument {
    fn emit_address(&self, ctx: &mut Context<'_>) -> EmitResult<()> {
        ctx.check_context(self.context)?;
        ctx.emitter().emit_u16(OpCode::ArgAddress, self.slot);
        Ok(())
    }
}

impl Assignable for Argument {
    fn emit_store(&self, ctx: &mut Context<'_>) -> EmitResult<()> {
        ctx.check_context(self.context)?;
        ctx.emitter().emit_u16(OpCode::SetArg, self.slot);
        Ok(())
    }
}
