//! Conversion resolution.
//!
//! Rules are tried in a fixed order and the first match wins:
//!
//! 1. identity, or a reference type assignable to the target
//! 2. boxing a value type into `object`
//! 3. unboxing `object` into a value type
//! 4. a conversion operator on the source type, explicit then implicit
//! 5. a conversion operator on the target type, explicit then implicit
//! 6. a one-argument constructor of the target taking the source type
//! 7. a checked cast between any two reference types
//!
//! [`resolve_conversion`] reports the decision without emitting anything;
//! [`convert`] wraps the source in a symbol that applies it when loaded.

mod user_defined;

use std::fmt;
use std::rc::Rc;

use stacksym_core::{
    ConversionOperator, ContextId, DataType, EmitError, EmitResult, TypeHash, primitives,
};
use stacksym_registry::TypeRegistry;
use tracing::debug;

use crate::Context;
use crate::bytecode::OpCode;
use crate::load::{LoadIntent, emit_load};
use crate::symbol::{Symbol, SymbolRef};

pub(crate) use user_defined::find_user_operator;

/// The rule a conversion resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionKind {
    /// No instructions.
    Identity,
    /// `Box type`
    Box(TypeHash),
    /// `UnboxAny type`
    Unbox(TypeHash),
    /// Static call of a conversion operator.
    Operator {
        function: TypeHash,
        declaring: TypeHash,
        operator: ConversionOperator,
    },
    /// `New ctor 1`
    Constructor { constructor: TypeHash },
    /// `Cast type`
    Cast(TypeHash),
}

impl fmt::Display for ConversionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionKind::Identity => write!(f, "identity"),
            ConversionKind::Box(_) => write!(f, "box"),
            ConversionKind::Unbox(_) => write!(f, "unbox"),
            ConversionKind::Operator { operator, .. } => write!(f, "{}", operator.method_name()),
            ConversionKind::Constructor { .. } => write!(f, "constructor"),
            ConversionKind::Cast(_) => write!(f, "cast"),
        }
    }
}

/// A resolved conversion between two element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    pub from: TypeHash,
    pub to: TypeHash,
    pub kind: ConversionKind,
}

impl Conversion {
    /// Whether applying the conversion emits nothing.
    pub fn is_identity(&self) -> bool {
        self.kind == ConversionKind::Identity
    }
}

/// Decide how a value of `from` becomes a value of `to`.
pub fn resolve_conversion(
    registry: &TypeRegistry,
    from: TypeHash,
    to: TypeHash,
) -> EmitResult<Conversion> {
    let kind = resolve_kind(registry, from, to).ok_or_else(|| EmitError::NoConversion {
        from: registry.type_name(from),
        to: registry.type_name(to),
    })?;
    Ok(Conversion { from, to, kind })
}

fn resolve_kind(registry: &TypeRegistry, from: TypeHash, to: TypeHash) -> Option<ConversionKind> {
    if from == primitives::VOID || to == primitives::VOID {
        return None;
    }
    if registry.is_assignable_to(from, to) {
        return Some(ConversionKind::Identity);
    }
    if to == primitives::OBJECT && registry.is_value_type(from) {
        return Some(ConversionKind::Box(from));
    }
    if from == primitives::OBJECT && registry.is_value_type(to) {
        return Some(ConversionKind::Unbox(to));
    }
    for declaring in [from, to] {
        if let Some((function, operator)) = find_user_operator(registry, declaring, from, to) {
            return Some(ConversionKind::Operator {
                function: function.hash,
                declaring,
                operator,
            });
        }
    }
    if let Some(constructor) = registry.find_constructor(to, &[from]) {
        return Some(ConversionKind::Constructor {
            constructor: constructor.hash,
        });
    }
    // Unrelated references still cast; the check happens at run time.
    (registry.is_reference_type(from) && registry.is_reference_type(to))
        .then_some(ConversionKind::Cast(to))
}

/// Value symbol that loads its source and applies a conversion.
#[derive(Debug)]
pub struct Converted {
    context: ContextId,
    source: SymbolRef,
    conversion: Conversion,
}

impl Converted {
    pub fn conversion(&self) -> &Conversion {
        &self.conversion
    }

    pub fn source(&self) -> &SymbolRef {
        &self.source
    }
}

impl Symbol for Converted {
    fn context(&self) -> ContextId {
        self.context
    }

    fn data_type(&self) -> DataType {
        DataType::simple(self.conversion.to)
    }

    fn emit_value(&self, ctx: &mut Context<'_>) -> EmitResult<()> {
        ctx.check_context(self.context)?;
        let intent = match self.conversion.kind {
            ConversionKind::Operator { function: callee, .. }
            | ConversionKind::Constructor {
                constructor: callee,
            } => source_intent(ctx.registry(), callee),
            _ => LoadIntent::Value,
        };
        emit_load(ctx, self.source.as_ref(), intent)?;
        let emitter = ctx.emitter();
        match self.conversion.kind {
            ConversionKind::Identity => Ok(()),
            ConversionKind::Box(hash) => emitter.emit_hash_op(OpCode::Box, hash),
            ConversionKind::Unbox(hash) => emitter.emit_hash_op(OpCode::UnboxAny, hash),
            ConversionKind::Operator { function, .. } => {
                emitter.emit_call(OpCode::Call, function, 1)
            }
            ConversionKind::Constructor { constructor } => {
                emitter.emit_call(OpCode::New, constructor, 1)
            }
            ConversionKind::Cast(hash) => emitter.emit_hash_op(OpCode::Cast, hash),
        }
    }
}

/// Operators and constructors receive the source as their first argument.
fn source_intent(registry: &TypeRegistry, callee: TypeHash) -> LoadIntent {
    registry
        .get_function(callee)
        .and_then(|function| function.params.first())
        .map_or(LoadIntent::Value, |param| {
            LoadIntent::Parameter(param.ref_modifier)
        })
}

/// Convert `source` to `target`, returning a value symbol.
///
/// Nothing is emitted until the returned symbol is loaded.
pub fn convert(ctx: &Context<'_>, source: &SymbolRef, target: DataType) -> EmitResult<SymbolRef> {
    ctx.check_symbol(source.as_ref())?;
    let from = source.data_type().dereferenced().type_hash;
    let to = target.dereferenced().type_hash;
    let conversion = resolve_conversion(ctx.registry(), from, to)?;
    debug!(
        context = %ctx.id(),
        from = %ctx.type_name(from),
        to = %ctx.type_name(to),
        rule = %conversion.kind,
        "resolved conversion"
    );
    Ok(Rc::new(Converted {
        context: ctx.id(),
        source: Rc::clone(source),
        conversion,
    }))
}
