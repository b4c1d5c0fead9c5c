use stacksym_core::{ContextId, DataType, EmitResult};

use super::{Addressable, Symbol};
use crate::Context;
use crate::builder::CapturedId;
use crate::bytecode::OpCode;

/// A compile-time value interned in the captured arena of the type under
/// construction. Readable and addressable, never assignable.
#[derive(Debug)]
pub struct Captured {
    context: ContextId,
    id: CapturedId,
}

impl Captured {
    pub(crate) fn new(context: ContextId, id: CapturedId) -> Self {
        Self { context, id }
    }

    pub fn id(&self) -> CapturedId {
        self.id
    }
}

impl Symbol for Captured {
    fn context(&self) -> ContextId {
        self.context
    }

    fn data_type(&self) -> DataType {
        self.id.data_type()
    }

    fn emit_value(&self, ctx: &mut Context<'_>) -> EmitResult<()> {
        ctx.check_context(self.context)?;
        ctx.emitter().emit_u16(OpCode::LoadCaptured, self.id.index());
        Ok(())
    }

    fn as_addressable(&self) -> Option<&dyn Addressable> {
        Some(self)
    }
}

impl Addressable for Captured {
    fn emit_address(&self, ctx: &mut Context<'_>) -> EmitResult<()> {
        ctx.check_context(self.context)?;
        ctx.emitter().emit_u16(OpCode::CapturedAddress, self.id.index());
        Ok(())
    }
}
