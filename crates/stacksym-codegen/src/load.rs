//! Load discipline.
//!
//! How a symbol is pushed depends on what the consumer needs:
//!
//! - [`LoadIntent::Value`]: the value itself. By-reference symbols are
//!   dereferenced with the indirect load matching the pointed-to type.
//! - [`LoadIntent::Reference`]: an address. Addressable storage yields its
//!   own address; otherwise the value is spilled into a temporary local when
//!   temporaries are allowed.
//! - [`LoadIntent::CallTarget`]: a receiver. Value types are accessed in
//!   place through their address, reference types by value.
//! - [`LoadIntent::Parameter`]: an argument, by address for reference
//!   parameters and by value otherwise.

use stacksym_core::{
    Capabilities, EmitError, EmitResult, PrimitiveKind, RefModifier, TypeHash, TypeKind,
};
use stacksym_registry::TypeRegistry;
use tracing::trace;

use crate::Context;
use crate::bytecode::OpCode;
use crate::symbol::Symbol;

/// What the consumer of a load needs on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadIntent {
    /// The value.
    Value,
    /// The address of the value.
    Reference {
        /// Spill non-addressable values into a temporary.
        allow_temporary: bool,
    },
    /// A method receiver.
    CallTarget,
    /// An argument for a parameter with this passing mode.
    Parameter(RefModifier),
}

/// Width class of an indirect load or store, chosen by the pointed-to type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndirectKind {
    I8,
    /// `uint8` and `bool`.
    U8,
    I16,
    /// `uint16` and `char`.
    U16,
    I32,
    U32,
    /// `int64` and `uint64`.
    I64,
    F32,
    F64,
    /// Pointer-sized integers.
    Native,
    /// Managed reference.
    Ref,
    /// Aggregate value type.
    Obj(TypeHash),
}

impl IndirectKind {
    /// Select the width for values of `hash`.
    pub fn for_type(registry: &TypeRegistry, hash: TypeHash) -> EmitResult<Self> {
        let kind = registry
            .kind(hash)
            .ok_or_else(|| EmitError::UnknownType(registry.type_name(hash)))?;
        Ok(match kind {
            TypeKind::Primitive(primitive) => match primitive {
                PrimitiveKind::Void => {
                    return Err(EmitError::UnsupportedPrimitive {
                        type_name: primitive.name().to_string(),
                    });
                }
                PrimitiveKind::Int8 => IndirectKind::I8,
                PrimitiveKind::Bool | PrimitiveKind::Uint8 => IndirectKind::U8,
                PrimitiveKind::Int16 => IndirectKind::I16,
                PrimitiveKind::Char | PrimitiveKind::Uint16 => IndirectKind::U16,
                PrimitiveKind::Int32 => IndirectKind::I32,
                PrimitiveKind::Uint32 => IndirectKind::U32,
                PrimitiveKind::Int64 | PrimitiveKind::Uint64 => IndirectKind::I64,
                PrimitiveKind::Float => IndirectKind::F32,
                PrimitiveKind::Double => IndirectKind::F64,
                PrimitiveKind::NativeInt | PrimitiveKind::NativeUint => IndirectKind::Native,
            },
            TypeKind::Value { .. } => IndirectKind::Obj(hash),
            TypeKind::Reference | TypeKind::Object | TypeKind::Array { .. } => IndirectKind::Ref,
        })
    }

    pub fn load_op(self) -> OpCode {
        match self {
            IndirectKind::I8 => OpCode::LoadIndI8,
            IndirectKind::U8 => OpCode::LoadIndU8,
            IndirectKind::I16 => OpCode::LoadIndI16,
            IndirectKind::U16 => OpCode::LoadIndU16,
            IndirectKind::I32 => OpCode::LoadIndI32,
            IndirectKind::U32 => OpCode::LoadIndU32,
            IndirectKind::I64 => OpCode::LoadIndI64,
            IndirectKind::F32 => OpCode::LoadIndF32,
            IndirectKind::F64 => OpCode::LoadIndF64,
            IndirectKind::Native => OpCode::LoadIndNative,
            IndirectKind::Ref => OpCode::LoadIndRef,
            IndirectKind::Obj(_) => OpCode::LoadObj,
        }
    }

    /// Stores do not distinguish signedness.
    pub fn store_op(self) -> OpCode {
        match self {
            IndirectKind::I8 | IndirectKind::U8 => OpCode::StoreIndI8,
            IndirectKind::I16 | IndirectKind::U16 => OpCode::StoreIndI16,
            IndirectKind::I32 | IndirectKind::U32 => OpCode::StoreIndI32,
            IndirectKind::I64 => OpCode::StoreIndI64,
            IndirectKind::F32 => OpCode::StoreIndF32,
            IndirectKind::F64 => OpCode::StoreIndF64,
            IndirectKind::Native => OpCode::StoreIndNative,
            IndirectKind::Ref => OpCode::StoreIndRef,
            IndirectKind::Obj(_) => OpCode::StoreObj,
        }
    }
}

/// `[address] -> [value]`
pub(crate) fn emit_load_indirect(ctx: &mut Context<'_>, kind: IndirectKind) -> EmitResult<()> {
    match kind {
        IndirectKind::Obj(hash) => ctx.emitter().emit_hash_op(kind.load_op(), hash),
        _ => {
            ctx.emitter().emit(kind.load_op());
            Ok(())
        }
    }
}

/// `[address, value] -> []`
pub(crate) fn emit_store_indirect(ctx: &mut Context<'_>, kind: IndirectKind) -> EmitResult<()> {
    match kind {
        IndirectKind::Obj(hash) => ctx.emitter().emit_hash_op(kind.store_op(), hash),
        _ => {
            ctx.emitter().emit(kind.store_op());
            Ok(())
        }
    }
}

/// Push `symbol` as `intent` requires.
///
/// On error nothing is left in the instruction stream. Temporaries
/// synthesized here stay reserved until the end of the statement, since the
/// pushed address still refers to them.
pub fn load(ctx: &mut Context<'_>, symbol: &dyn Symbol, intent: LoadIntent) -> EmitResult<()> {
    ctx.check_symbol(symbol)?;
    ctx.atomically(|ctx| emit_load(ctx, symbol, intent))
}

#[cfg_attr(feature = "profiling", profiling::function)]
pub(crate) fn emit_load(
    ctx: &mut Context<'_>,
    symbol: &dyn Symbol,
    intent: LoadIntent,
) -> EmitResult<()> {
    ctx.check_symbol(symbol)?;
    let data_type = symbol.data_type();

    match intent {
        LoadIntent::Value => {
            if data_type.is_by_ref() {
                let kind = IndirectKind::for_type(ctx.registry(), data_type.type_hash)?;
                symbol.emit_value(ctx)?;
                emit_load_indirect(ctx, kind)
            } else {
                symbol.emit_value(ctx)
            }
        }
        LoadIntent::Reference { allow_temporary } => {
            if data_type.is_by_ref() {
                return symbol.emit_value(ctx);
            }
            if let Some(addressable) = symbol.as_addressable() {
                if allow_temporary || symbol.is_addressable_in_place(ctx.registry()) {
                    return addressable.emit_address(ctx);
                }
            }
            if !allow_temporary {
                return Err(EmitError::MissingCapability {
                    capability: Capabilities::ADDRESS.describe(),
                    symbol_type: ctx.describe(data_type),
                });
            }
            let slot = ctx.acquire_temporary(data_type)?;
            trace!(slot, ty = %ctx.describe(data_type), "spilling value into temporary");
            symbol.emit_value(ctx)?;
            ctx.emit_set_local(slot);
            ctx.emit_local_address(slot);
            Ok(())
        }
        LoadIntent::CallTarget => {
            let target = data_type.dereferenced();
            let intent = if ctx.registry().is_value_type(target.type_hash) {
                LoadIntent::Reference {
                    allow_temporary: true,
                }
            } else {
                LoadIntent::Value
            };
            emit_load(ctx, symbol, intent)
        }
        LoadIntent::Parameter(modifier) => {
            let intent = if modifier.is_reference() {
                LoadIntent::Reference {
                    allow_temporary: true,
                }
            } else {
                LoadIntent::Value
            };
            emit_load(ctx, symbol, intent)
        }
    }
}
