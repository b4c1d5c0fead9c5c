//! Assignment and copy engine.
//!
//! ```text
//! aggregate        dest& source& CopyObj      (both addressable in place)
//! by-ref dest      ptr temp <- dest; val temp <- source; ptr val StoreInd*
//! otherwise        source; store
//! ```
//!
//! A by-reference destination already holds the address `CopyObj` needs, so
//! it takes the block copy whenever the source is addressable in place.
//!
//! Assignment never converts. The source must already have the destination's
//! element type, or be a reference type assignable to it.

use stacksym_core::{Capabilities, EmitError, EmitResult, TypeKind};
use tracing::debug;

use crate::Context;
use crate::load::{IndirectKind, LoadIntent, emit_load, emit_store_indirect};
use crate::bytecode::OpCode;
use crate::symbol::Symbol;

/// How an assignment moves its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyPath {
    /// Through a by-reference destination with an indirect store.
    Indirect,
    /// Load the source value, then store it.
    Stack,
    /// Block copy between two addresses.
    Direct,
}

/// Store `source` into `dest`.
///
/// Aggregates are block-copied between addresses when both sides are
/// addressable in place and go through the stack otherwise.
pub fn assign(ctx: &mut Context<'_>, dest: &dyn Symbol, source: &dyn Symbol) -> EmitResult<()> {
    assign_with(ctx, dest, source, false)
}

/// Like [`assign`], but never block-copies.
pub fn assign_stack_mediated(
    ctx: &mut Context<'_>,
    dest: &dyn Symbol,
    source: &dyn Symbol,
) -> EmitResult<()> {
    assign_with(ctx, dest, source, true)
}

fn assign_with(
    ctx: &mut Context<'_>,
    dest: &dyn Symbol,
    source: &dyn Symbol,
    force_stack: bool,
) -> EmitResult<()> {
    ctx.check_symbol(dest)?;
    ctx.check_symbol(source)?;
    let target = dest
        .as_assignable()
        .ok_or_else(|| EmitError::MissingCapability {
            capability: Capabilities::ASSIGN.describe(),
            symbol_type: ctx.describe(dest.data_type()),
        })?;
    check_compatible(ctx, dest, source)?;

    let path = choose_path(ctx, dest, source, force_stack);
    debug!(
        context = %ctx.id(),
        ?path,
        destination = %ctx.describe(dest.data_type()),
        "assignment"
    );

    let result = ctx.atomically(|ctx| match path {
        CopyPath::Indirect => store_through(ctx, dest, source),
        CopyPath::Stack => {
            emit_load(ctx, source, LoadIntent::Value)?;
            target.emit_store(ctx)
        }
        CopyPath::Direct => copy_direct(ctx, dest, source),
    });
    ctx.release_statement_temporaries();
    result
}

fn check_compatible(ctx: &Context<'_>, dest: &dyn Symbol, source: &dyn Symbol) -> EmitResult<()> {
    let to = dest.data_type().dereferenced();
    let from = source.data_type().dereferenced();
    if from == to || ctx.registry().is_assignable_to(from.type_hash, to.type_hash) {
        return Ok(());
    }
    Err(EmitError::AssignmentMismatch {
        destination: ctx.describe(to),
        source_type: ctx.describe(from),
    })
}

fn choose_path(
    ctx: &Context<'_>,
    dest: &dyn Symbol,
    source: &dyn Symbol,
    force_stack: bool,
) -> CopyPath {
    let registry = ctx.registry();
    let dest_type = dest.data_type();
    let pointee = dest_type.dereferenced();
    let aggregate = !pointee.is_pointer()
        && matches!(registry.kind(pointee.type_hash), Some(TypeKind::Value { .. }));
    if aggregate
        && !force_stack
        && dest.is_addressable_in_place(registry)
        && source.is_addressable_in_place(registry)
    {
        CopyPath::Direct
    } else if dest_type.is_by_ref() {
        CopyPath::Indirect
    } else {
        CopyPath::Stack
    }
}

/// `[dest&, source&] CopyObj`
///
/// Neither side may spill; [`choose_path`] only picks this path when both are
/// addressable in place.
fn copy_direct(ctx: &mut Context<'_>, dest: &dyn Symbol, source: &dyn Symbol) -> EmitResult<()> {
    let hash = dest.data_type().dereferenced().type_hash;
    emit_load(ctx, dest, LoadIntent::Reference { allow_temporary: false })?;
    emit_load(ctx, source, LoadIntent::Reference { allow_temporary: false })?;
    ctx.emitter().emit_hash_op(OpCode::CopyObj, hash)
}

/// Store through the address a by-reference destination holds.
///
/// The address and the value are parked in temporaries so the indirect
/// store sees `[address, value]` whatever the evaluation order of the two.
fn store_through(ctx: &mut Context<'_>, dest: &dyn Symbol, source: &dyn Symbol) -> EmitResult<()> {
    let pointer_type = dest.data_type();
    let value_type = pointer_type.dereferenced();
    let kind = IndirectKind::for_type(ctx.registry(), value_type.type_hash)?;

    let pointer = ctx.acquire_temporary(pointer_type)?;
    let value = ctx.acquire_temporary(value_type)?;
    dest.emit_value(ctx)?;
    ctx.emit_set_local(pointer);
    emit_load(ctx, source, LoadIntent::Value)?;
    ctx.emit_set_local(value);
    ctx.emit_get_local(pointer);
    ctx.emit_get_local(value);
    emit_store_indirect(ctx, kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stacksym_core::{DataType, FunctionEntry, Param, RefModifier, TypeEntry, TypeHash, primitives};
    use stacksym_registry::TypeRegistry;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::with_primitives();
        let program = registry
            .register_type(TypeEntry::reference("Program"))
            .unwrap();
        let animal = registry.register_type(TypeEntry::reference("Animal")).unwrap();
        registry
            .register_type(TypeEntry::reference("Dog").with_base(animal))
            .unwrap();
        let pair = registry
            .register_type(
                TypeEntry::value("Pair", 8, 4)
                    .with_field("a", DataType::simple(primitives::INT32))
                    .with_field("b", DataType::simple(primitives::INT32)),
            )
            .unwrap();
        let outer = registry
            .register_type(
                TypeEntry::value("Outer", 8, 4).with_field("inner", DataType::simple(pair)),
            )
            .unwrap();
        let int32 = DataType::simple(primitives::INT32);
        registry
            .register_function(FunctionEntry::constructor(
                pair,
                vec![Param::new("a", int32), Param::new("b", int32)],
            ))
            .unwrap();
        registry
            .register_function(FunctionEntry::constructor(outer, vec![]))
            .unwrap();
        registry
            .register_function(FunctionEntry::static_method(
                program,
                "main",
                vec![
                    Param::with_modifier("out_n", DataType::simple(primitives::INT32), RefModifier::Out),
                    Param::with_modifier("out_pair", DataType::simple(pair), RefModifier::Out),
                ],
                DataType::void(),
            ))
            .unwrap();
        registry
    }

    fn pair_ctor() -> TypeHash {
        TypeHash::from_constructor(
            TypeHash::from_name("Pair"),
            &[primitives::INT32, primitives::INT32],
        )
    }

    fn outer_ctor() -> TypeHash {
        TypeHash::from_constructor(TypeHash::from_name("Outer"), &[])
    }

    fn main_hash() -> TypeHash {
        let program = TypeHash::from_name("Program");
        let pair = TypeHash::from_name("Pair");
        TypeHash::from_method(program, "main", &[primitives::INT32, pair])
    }

    #[test]
    fn primitive_assignment_loads_then_stores() {
        let registry = registry();
        let mut ctx = Context::for_function(&registry, main_hash()).unwrap();
        let local = ctx.variable(DataType::simple(primitives::INT32)).unwrap();
        let seven = ctx.literal(7);
        assign(&mut ctx, local.as_ref(), seven.as_ref()).unwrap();
        ctx.chunk().assert_opcodes(&[OpCode::Constant, OpCode::SetLocal]);
    }

    #[test]
    fn aggregate_between_locals_uses_block_copy() {
        let registry = registry();
        let pair = DataType::simple(TypeHash::from_name("Pair"));
        let mut ctx = Context::for_function(&registry, main_hash()).unwrap();
        let a = ctx.variable(pair).unwrap();
        let b = ctx.variable(pair).unwrap();
        assign(&mut ctx, a.as_ref(), b.as_ref()).unwrap();
        ctx.chunk().assert_opcodes(&[
            OpCode::LocalAddress,
            OpCode::LocalAddress,
            OpCode::CopyObj,
        ]);
    }

    #[test]
    fn forced_stack_path_for_aggregates() {
        let registry = registry();
        let pair = DataType::simple(TypeHash::from_name("Pair"));
        let mut ctx = Context::for_function(&registry, main_hash()).unwrap();
        let a = ctx.variable(pair).unwrap();
        let b = ctx.variable(pair).unwrap();
        assign_stack_mediated(&mut ctx, a.as_ref(), b.as_ref()).unwrap();
        ctx.chunk().assert_opcodes(&[OpCode::GetLocal, OpCode::SetLocal]);
    }

    #[test]
    fn aggregate_from_by_ref_argument_copies_directly() {
        let registry = registry();
        let pair = DataType::simple(TypeHash::from_name("Pair"));
        let mut ctx = Context::for_function(&registry, main_hash()).unwrap();
        let local = ctx.variable(pair).unwrap();
        let out_pair = ctx.argument(1).unwrap();
        assign(&mut ctx, local.as_ref(), out_pair.as_ref()).unwrap();
        ctx.chunk()
            .assert_opcodes(&[OpCode::LocalAddress, OpCode::GetArg, OpCode::CopyObj]);
    }

    #[test]
    fn by_ref_destination_stores_through_pointer() {
        let registry = registry();
        let mut ctx = Context::for_function(&registry, main_hash()).unwrap();
        let out_n = ctx.argument(0).unwrap();
        let five = ctx.literal(5);
        assign(&mut ctx, out_n.as_ref(), five.as_ref()).unwrap();
        ctx.chunk().assert_opcodes(&[
            OpCode::GetArg,
            OpCode::SetLocal,
            OpCode::Constant,
            OpCode::SetLocal,
            OpCode::GetLocal,
            OpCode::GetLocal,
            OpCode::StoreIndI32,
        ]);
        assert_eq!(ctx.local_count(), 2);
    }

    #[test]
    fn aggregate_into_by_ref_destination_uses_block_copy() {
        let registry = registry();
        let pair = DataType::simple(TypeHash::from_name("Pair"));
        let mut ctx = Context::for_function(&registry, main_hash()).unwrap();
        let out_pair = ctx.argument(1).unwrap();
        let local = ctx.variable(pair).unwrap();
        assign(&mut ctx, out_pair.as_ref(), local.as_ref()).unwrap();
        ctx.chunk()
            .assert_opcodes(&[OpCode::GetArg, OpCode::LocalAddress, OpCode::CopyObj]);
        assert_eq!(ctx.local_count(), 1);
    }

    #[test]
    fn aggregate_rvalue_into_by_ref_destination_stores_through() {
        let registry = registry();
        let mut ctx = Context::for_function(&registry, main_hash()).unwrap();
        let out_pair = ctx.argument(1).unwrap();
        let (a, b) = (ctx.literal(1), ctx.literal(2));
        let made = ctx.construct(pair_ctor(), vec![a, b]).unwrap();
        assign(&mut ctx, out_pair.as_ref(), made.as_ref()).unwrap();
        assert!(!ctx.chunk().opcodes().contains(&OpCode::CopyObj));
        assert_eq!(ctx.chunk().last_op(), Some(OpCode::StoreObj));
    }

    #[test]
    fn constructed_aggregate_goes_through_stack() {
        let registry = registry();
        let pair = DataType::simple(TypeHash::from_name("Pair"));
        let mut ctx = Context::for_function(&registry, main_hash()).unwrap();
        let local = ctx.variable(pair).unwrap();
        let (a, b) = (ctx.literal(1), ctx.literal(2));
        let made = ctx.construct(pair_ctor(), vec![a, b]).unwrap();
        assign(&mut ctx, local.as_ref(), made.as_ref()).unwrap();
        ctx.chunk().assert_opcodes(&[
            OpCode::Constant,
            OpCode::Constant,
            OpCode::New,
            OpCode::SetLocal,
        ]);
        assert_eq!(ctx.local_count(), 1);
    }

    #[test]
    fn field_of_rvalue_is_read_not_block_copied() {
        let registry = registry();
        let pair = DataType::simple(TypeHash::from_name("Pair"));
        let mut ctx = Context::for_function(&registry, main_hash()).unwrap();
        let local = ctx.variable(pair).unwrap();
        let made = ctx.construct(outer_ctor(), vec![]).unwrap();
        let inner = ctx.field(made, "inner").unwrap();
        assert!(!inner.is_addressable_in_place(&registry));

        assign(&mut ctx, local.as_ref(), inner.as_ref()).unwrap();
        let opcodes = ctx.chunk().opcodes();
        assert!(!opcodes.contains(&OpCode::CopyObj));
        assert_eq!(opcodes.first(), Some(&OpCode::New));
        assert_eq!(opcodes.last(), Some(&OpCode::SetLocal));
    }

    #[test]
    fn field_of_local_aggregate_copies_in_place() {
        let registry = registry();
        let outer = DataType::simple(TypeHash::from_name("Outer"));
        let pair = DataType::simple(TypeHash::from_name("Pair"));
        let mut ctx = Context::for_function(&registry, main_hash()).unwrap();
        let holder = ctx.variable(outer).unwrap();
        let local = ctx.variable(pair).unwrap();
        let inner = ctx.field(holder, "inner").unwrap();
        assign(&mut ctx, inner.as_ref(), local.as_ref()).unwrap();
        ctx.chunk().assert_opcodes(&[
            OpCode::LocalAddress,
            OpCode::FieldAddress,
            OpCode::LocalAddress,
            OpCode::CopyObj,
        ]);
    }

    #[test]
    fn field_of_rvalue_is_not_a_store_target() {
        let registry = registry();
        let pair = DataType::simple(TypeHash::from_name("Pair"));
        let mut ctx = Context::for_function(&registry, main_hash()).unwrap();
        let local = ctx.variable(pair).unwrap();
        let made = ctx.construct(outer_ctor(), vec![]).unwrap();
        let inner = ctx.field(made, "inner").unwrap();

        let err = assign(&mut ctx, inner.as_ref(), local.as_ref()).unwrap_err();
        assert_eq!(
            err,
            EmitError::MissingCapability {
                capability: "assign",
                symbol_type: "Pair".to_string(),
            }
        );
        assert!(ctx.chunk().is_empty());
        assert_eq!(ctx.local_count(), 1);
    }

    #[test]
    fn assignment_never_converts() {
        let registry = registry();
        let mut ctx = Context::for_function(&registry, main_hash()).unwrap();
        let local = ctx.variable(DataType::simple(primitives::INT64)).unwrap();
        let small = ctx.literal(1);
        let err = assign(&mut ctx, local.as_ref(), small.as_ref()).unwrap_err();
        assert!(matches!(err, EmitError::AssignmentMismatch { .. }));
        assert!(ctx.chunk().is_empty());
    }

    #[test]
    fn derived_reference_assigns_to_base() {
        let registry = registry();
        let mut ctx = Context::for_function(&registry, main_hash()).unwrap();
        let animal = ctx
            .variable(DataType::simple(TypeHash::from_name("Animal")))
            .unwrap();
        let dog = ctx
            .variable(DataType::simple(TypeHash::from_name("Dog")))
            .unwrap();
        assign(&mut ctx, animal.as_ref(), dog.as_ref()).unwrap();
        assert!(assign(&mut ctx, dog.as_ref(), animal.as_ref()).is_err());
    }

    #[test]
    fn literal_is_not_assignable() {
        let registry = registry();
        let mut ctx = Context::for_function(&registry, main_hash()).unwrap();
        let one = ctx.literal(1);
        let two = ctx.literal(2);
        let err = assign(&mut ctx, one.as_ref(), two.as_ref()).unwrap_err();
        assert_eq!(
            err,
            EmitError::MissingCapability {
                capability: "assign",
                symbol_type: "int32".to_string(),
            }
        );
    }

    #[test]
    fn cross_context_source_rejected_before_emission() {
        let registry = registry();
        let mut ours = Context::for_function(&registry, main_hash()).unwrap();
        let theirs = Context::for_function(&registry, main_hash()).unwrap();
        let local = ours.variable(DataType::simple(primitives::INT32)).unwrap();
        let foreign = theirs.literal(1);
        let err = assign(&mut ours, local.as_ref(), foreign.as_ref()).unwrap_err();
        assert!(matches!(err, EmitError::CrossContext { .. }));
        assert!(ours.chunk().is_empty());
    }
}
