use stacksym_core::{Capabilities, ContextId, DataType, EmitError, EmitResult, FieldEntry};
use stacksym_registry::TypeRegistry;

use super::{Addressable, Assignable, Symbol, SymbolRef};
use crate::bytecode::OpCode;
use crate::load::{LoadIntent, emit_load};
use crate::Context;

/// Named storage on an instance, or a static field.
///
/// The instance is shared with whoever else holds it; it is loaded with
/// [`LoadIntent::CallTarget`] so value-type instances are accessed in place.
/// A field of a value-type rvalue lives in a temporary; it can be read but
/// not stored into.
#[derive(Debug)]
pub struct Field {
    context: ContextId,
    field: FieldEntry,
    instance: Option<SymbolRef>,
}

impl Field {
    pub(crate) fn instance(context: ContextId, field: FieldEntry, instance: SymbolRef) -> Self {
        Self {
            context,
            field,
            instance: Some(instance),
        }
    }

    pub(crate) fn static_field(context: ContextId, field: FieldEntry) -> Self {
        Self {
            context,
            field,
            instance: None,
        }
    }

    pub fn entry(&self) -> &FieldEntry {
        &self.field
    }

    pub fn is_static(&self) -> bool {
        self.instance.is_none()
    }

    fn emit_access(&self, ctx: &mut Context<'_>, instance_op: OpCode, static_op: OpCode) -> EmitResult<()> {
        ctx.check_context(self.context)?;
        match &self.instance {
            Some(instance) => {
                emit_load(ctx, instance.as_ref(), LoadIntent::CallTarget)?;
                ctx.emitter().emit_hash_op(instance_op, self.field.hash)
            }
            None => ctx.emitter().emit_hash_op(static_op, self.field.hash),
        }
    }
}

/// A reference-type instance pushes a handle, and a value-type instance is
/// only in place when its own storage is.
fn instance_in_place(registry: &TypeRegistry, instance: &dyn Symbol) -> bool {
    let owner = instance.data_type().dereferenced().type_hash;
    !registry.is_value_type(owner) || instance.is_addressable_in_place(registry)
}

impl Symbol for Field {
    fn context(&self) -> ContextId {
        self.context
    }

    fn data_type(&self) -> DataType {
        self.field.data_type
    }

    fn emit_value(&self, ctx: &mut Context<'_>) -> EmitResult<()> {
        self.emit_access(ctx, OpCode::GetField, OpCode::GetStatic)
    }

    fn as_addressable(&self) -> Option<&dyn Addressable> {
        Some(self)
    }

    fn as_assignable(&self) -> Option<&dyn Assignable> {
        Some(self)
    }

    fn is_addressable_in_place(&self, registry: &TypeRegistry) -> bool {
        self.instance
            .as_ref()
            .is_none_or(|instance| instance_in_place(registry, instance.as_ref()))
    }
}

impl Addressable for Field {
    fn emit_address(&self, ctx: &mut Context<'_>) -> EmitResult<()> {
        self.emit_access(ctx, OpCode::FieldAddress, OpCode::StaticAddress)
    }
}

impl Assignable for Field {
    fn emit_store(&self, ctx: &mut Context<'_>) -> EmitResult<()> {
        ctx.check_context(self.context)?;
        if !self.is_addressable_in_place(ctx.registry()) {
            return Err(EmitError::MissingCapability {
                capability: Capabilities::ASSIGN.describe(),
                symbol_type: ctx.describe(self.field.data_type),
            });
        }
        self.emit_access(ctx, OpCode::SetField, OpCode::SetStatic)
    }
}
