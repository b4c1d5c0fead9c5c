use stacksym_core::{ContextId, DataType, EmitResult};

use super::{Addressable, Assignable, Symbol};
use crate::Context;
use crate::bytecode::OpCode;

/// A numbered local slot. Variables and temporaries are both locals.
#[derive(Debug)]
pub struct Local {
    context: ContextId,
    slot: u16,
    data_type: DataType,
}

impl Local {
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

impl Symbol for Local {
    fn context(&self) -> ContextId {
        self.context
    }

    fn data_type(&self) -> DataType {
        self.data_type
    }

    fn emit_value(&self, ctx: &mut Context<'_>) -> EmitResult<()> {
        ctx.check_context(self.context)?;
        ctx.emitter()
            .emit_local(OpCode::GetLocal, OpCode::GetLocalWide, self.slot);
        Ok(())
    }

    fn as_addressable(&self) -> Option<&dyn Addressable> {
        Some(self)
    }

    fn as_assignable(&self) -> Option<&dyn Assignable> {
        Some(self)
    }
}

impl Addressable for Local {
    fn emit_address(&self, ctx: &mut Context<'_>) -> EmitResult<()> {
        ctx.check_context(self.context)?;
        ctx.emitter()
            .emit_local(OpCode::LocalAddress, OpCode::LocalAddressWide, self.slot);
        Ok(())
    }
}

impl Assignable for Local {
    fn emit_store(&self, ctx: &mut Context<'_>) -> EmitResult<()> {
        ctx.check_context(self.context)?;
        ctx.emitter()
            .emit_local(OpCode::SetLocal, OpCode::SetLocalWide, self.slot);
        Ok(())
    }
}
