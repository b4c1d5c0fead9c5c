use stacksym_core::{ContextId, DataType, EmitResult};

use super::{Addressable, Assignable, Symbol, SymbolRef};
use crate::bytecode::OpCode;
use crate::load::{LoadIntent, emit_load};
use crate::Context;

/// An array slot `array[index]`.
#[derive(Debug)]
pub struct Element {
    context: ContextId,
    array: SymbolRef,
    index: SymbolRef,
    data_type: DataType,
}

impl Element {
    pub(crate) fn new(
        context: ContextId,
        array: SymbolRef,
        index: SymbolRef,
        data_type: DataType,
    ) -> Self {
        Self {
            context,
            array,
            index,
            data_type,
        }
    }

    fn emit_location(&self, ctx: &mut Context<'_>, op: OpCode) -> EmitResult<()> {
        ctx.check_context(self.context)?;
        emit_load(ctx, self.array.as_ref(), LoadIntent::Value)?;
        emit_load(ctx, self.index.as_ref(), LoadIntent::Value)?;
        ctx.emitter().emit(op);
        Ok(())
    }
}

impl Symbol for Element {
    fn context(&self) -> ContextId {
        self.context
    }

    fn data_type(&self) -> DataType {
        self.data_type
    }

    fn emit_value(&self, ctx: &mut Context<'_>) -> EmitResult<()> {
        self.emit_location(ctx, OpCode::GetElement)
    }

    fn as_addressable(&self) -> Option<&dyn Addressable> {
        Some(self)
    }

    fn as_assignable(&self) -> Option<&dyn Assignable> {
        Some(self)
    }
}

impl Addressable for Element {
    fn emit_address(&self, ctx: &mut Context<'_>) -> EmitResult<()> {
        self.emit_location(ctx, OpCode::ElementAddress)
    }
}

impl Assignable for Element {
    fn emit_store(&self, ctx: &mut Context<'_>) -> EmitResult<()> {
        self.emit_location(ctx, OpCode::SetElement)
    }
}
