//! Code-generation context for one method body.
//!
//! A [`Context`] owns the instruction stream, constant pool, local slots,
//! label table and open-scope stack of a single method. Every symbol it
//! creates records the context's [`ContextId`]; handing a symbol to a
//! different context is rejected before anything is emitted.
//!
//! Public operations are atomic: when one fails, every instruction it had
//! already appended is discarded.
//!
//! # Example
//!
//! ```
//! use stacksym_codegen::{Context, LoadIntent};
//! use stacksym_core::{DataType, FunctionEntry, Literal, Param, TypeEntry, primitives};
//! use stacksym_registry::TypeRegistry;
//!
//! let mut registry = TypeRegistry::with_primitives();
//! let program = registry.register_type(TypeEntry::reference("Program")).unwrap();
//! let double = FunctionEntry::static_method(
//!     program,
//!     "double",
//!     vec![Param::new("x", DataType::simple(primitives::INT32))],
//!     DataType::simple(primitives::INT32),
//! );
//! registry.register_function(double.clone()).unwrap();
//!
//! let mut ctx = Context::new(&registry, &double);
//! let x = ctx.argument(0).unwrap();
//! let two = ctx.literal(Literal::I32(2));
//! let product = ctx.binary(stacksym_codegen::BinaryOp::Mul, x, two).unwrap();
//! ctx.emit_return(Some(product.as_ref())).unwrap();
//! let method = ctx.seal().unwrap();
//! assert_eq!(method.function.name, "double");
//! ```

mod scope;

pub use scope::{ScopeHandle, ScopeKind};

use rustc_hash::FxHashMap;
use stacksym_core::{
    ContextId, DataType, EmitError, EmitResult, FunctionEntry, Literal, TypeHash, primitives,
};
use stacksym_registry::TypeRegistry;
use tracing::debug;

use crate::assign;
use crate::builder::CapturedId;
use crate::bytecode::{BytecodeChunk, OpCode};
use crate::conversion;
use crate::emit::{Emitter, Label};
use crate::load::{self, LoadIntent};
use crate::options::EmitOptions;
use crate::sealed::SealedMethod;
use crate::symbol::{
    Argument, BinaryOp, Captured, Element, Field, LiteralSymbol, Local, Operation, Symbol,
    SymbolRef, UnaryOp,
};
use scope::ScopeStack;

use std::rc::Rc;

/// Builder state for one method body.
#[derive(Debug)]
pub struct Context<'r> {
    id: ContextId,
    registry: &'r TypeRegistry,
    options: EmitOptions,
    function: FunctionEntry,
    emitter: Emitter,
    /// Declared local slot types, temporaries included.
    locals: Vec<DataType>,
    /// Released temporaries by type.
    temp_pool: FxHashMap<DataType, Vec<u16>>,
    /// Temporaries handed out during the current statement.
    live_temporaries: Vec<(DataType, u16)>,
    scopes: ScopeStack,
}

impl<'r> Context<'r> {
    /// Start building the body of `function` with default options.
    pub fn new(registry: &'r TypeRegistry, function: &FunctionEntry) -> Self {
        Self::with_options(registry, function, EmitOptions::default())
    }

    pub fn with_options(
        registry: &'r TypeRegistry,
        function: &FunctionEntry,
        options: EmitOptions,
    ) -> Self {
        let id = ContextId::fresh();
        debug!(context = %id, function = %function.name, "opened context");
        Self {
            id,
            registry,
            options,
            function: function.clone(),
            emitter: Emitter::new(id, options.initial_line),
            locals: Vec::new(),
            temp_pool: FxHashMap::default(),
            live_temporaries: Vec::new(),
            scopes: ScopeStack::default(),
        }
    }

    /// Start building the registered function `hash`.
    pub fn for_function(registry: &'r TypeRegistry, hash: TypeHash) -> EmitResult<Self> {
        let function = registry
            .get_function(hash)
            .ok_or_else(|| EmitError::UnknownMember {
                type_name: "<functions>".to_string(),
                member: hash.to_string(),
            })?;
        Ok(Self::new(registry, function))
    }

    // ==========================================================================
    // Accessors
    // ==========================================================================

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    pub fn options(&self) -> &EmitOptions {
        &self.options
    }

    /// The function whose body is being built.
    pub fn function(&self) -> &FunctionEntry {
        &self.function
    }

    /// Instance methods receive the receiver in argument slot 0.
    pub fn is_instance(&self) -> bool {
        !self.function.is_static
    }

    /// Direct access to the emitter, for symbols defined outside this crate.
    pub fn emitter(&mut self) -> &mut Emitter {
        &mut self.emitter
    }

    /// The instruction stream emitted so far.
    pub fn chunk(&self) -> &BytecodeChunk {
        self.emitter.chunk()
    }

    /// Set the line recorded for subsequent instructions.
    pub fn set_line(&mut self, line: u32) {
        self.emitter.set_line(line);
    }

    pub fn local_count(&self) -> usize {
        self.locals.len()
    }

    pub fn type_name(&self, hash: TypeHash) -> String {
        self.registry.type_name(hash)
    }

    pub fn describe(&self, data_type: DataType) -> String {
        self.registry.describe(data_type)
    }

    // ==========================================================================
    // Context Binding
    // ==========================================================================

    /// Fail unless `other` is this context.
    pub fn check_context(&self, other: ContextId) -> EmitResult<()> {
        if other == self.id {
            Ok(())
        } else {
            Err(EmitError::CrossContext {
                expected: self.id,
                found: other,
            })
        }
    }

    /// Fail unless `symbol` was created by this context.
    pub fn check_symbol(&self, symbol: &dyn Symbol) -> EmitResult<()> {
        self.check_context(symbol.context())
    }

    /// Run `f`, discarding everything it emitted if it fails.
    ///
    /// Locals and temporaries it declared are given back as well.
    pub(crate) fn atomically<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> EmitResult<T>,
    ) -> EmitResult<T> {
        let checkpoint = self.emitter.checkpoint();
        let locals = self.locals.len();
        let live = self.live_temporaries.len();
        let pool = self.temp_pool.clone();
        let result = f(self);
        if result.is_err() {
            self.emitter.rollback(checkpoint);
            self.locals.truncate(locals);
            self.live_temporaries.truncate(live);
            self.temp_pool = pool;
        }
        result
    }

    // ==========================================================================
    // Locals and Temporaries
    // ==========================================================================

    fn declare_local(&mut self, data_type: DataType) -> EmitResult<u16> {
        let slot = self.locals.len();
        if slot >= usize::from(self.options.max_locals) {
            return Err(EmitError::TooManyLocals {
                limit: self.options.max_locals,
            });
        }
        self.locals.push(data_type);
        Ok(slot as u16)
    }

    /// Reserve a temporary slot of `data_type` until the end of the current
    /// statement.
    pub fn acquire_temporary(&mut self, data_type: DataType) -> EmitResult<u16> {
        let pooled = if self.options.reuse_temporaries {
            self.temp_pool.get_mut(&data_type).and_then(Vec::pop)
        } else {
            None
        };
        let slot = match pooled {
            Some(slot) => slot,
            None => self.declare_local(data_type)?,
        };
        self.live_temporaries.push((data_type, slot));
        Ok(slot)
    }

    /// End the current statement, returning its temporaries to the pool.
    pub fn release_statement_temporaries(&mut self) {
        let live = std::mem::take(&mut self.live_temporaries);
        if self.options.reuse_temporaries {
            for (data_type, slot) in live {
                self.temp_pool.entry(data_type).or_default().push(slot);
            }
        }
    }

    pub(crate) fn emit_get_local(&mut self, slot: u16) {
        self.emitter
            .emit_local(OpCode::GetLocal, OpCode::GetLocalWide, slot);
    }

    pub(crate) fn emit_set_local(&mut self, slot: u16) {
        self.emitter
            .emit_local(OpCode::SetLocal, OpCode::SetLocalWide, slot);
    }

    pub(crate) fn emit_local_address(&mut self, slot: u16) {
        self.emitter
            .emit_local(OpCode::LocalAddress, OpCode::LocalAddressWide, slot);
    }

    // ==========================================================================
    // Symbol Factories
    // ==========================================================================

    /// Declare a new local variable.
    pub fn variable(&mut self, data_type: DataType) -> EmitResult<SymbolRef> {
        if !self.registry.contains_type(data_type.type_hash) {
            return Err(EmitError::UnknownType(data_type.type_hash.to_string()));
        }
        let slot = self.declare_local(data_type)?;
        Ok(Rc::new(Local::new(self.id, slot, data_type)))
    }

    /// The `index`th declared parameter.
    pub fn argument(&self, index: u16) -> EmitResult<SymbolRef> {
        let param = self
            .function
            .params
            .get(usize::from(index))
            .ok_or_else(|| EmitError::UnknownMember {
                type_name: self.function.name.clone(),
                member: format!("argument {index}"),
            })?;
        let slot = index + u16::from(self.is_instance());
        Ok(Rc::new(Argument::new(self.id, slot, param.slot_type())))
    }

    /// The receiver of an instance method. Value-type receivers are by
    /// reference.
    pub fn this(&self) -> EmitResult<SymbolRef> {
        let owner = match (self.function.owner, self.is_instance()) {
            (Some(owner), true) => owner,
            _ => {
                return Err(EmitError::UnknownMember {
                    type_name: self.function.name.clone(),
                    member: "this".to_string(),
                });
            }
        };
        let data_type = if self.registry.is_value_type(owner) {
            DataType::by_ref(owner)
        } else {
            DataType::simple(owner)
        };
        Ok(Rc::new(Argument::new(self.id, 0, data_type)))
    }

    pub fn literal(&self, literal: impl Into<Literal>) -> SymbolRef {
        Rc::new(LiteralSymbol::new(self.id, literal.into()))
    }

    /// Instance field `name` of `instance`, searched through the base chain.
    pub fn field(&self, instance: SymbolRef, name: &str) -> EmitResult<SymbolRef> {
        self.check_symbol(instance.as_ref())?;
        let owner = instance.data_type().dereferenced().type_hash;
        let entry = self
            .registry
            .field(owner, name)
            .filter(|f| !f.is_static)
            .ok_or_else(|| EmitError::UnknownMember {
                type_name: self.type_name(owner),
                member: name.to_string(),
            })?;
        Ok(Rc::new(Field::instance(self.id, entry.clone(), instance)))
    }

    /// Static field `name` declared on `owner` or one of its bases.
    pub fn static_field(&self, owner: TypeHash, name: &str) -> EmitResult<SymbolRef> {
        let entry = self
            .registry
            .field(owner, name)
            .filter(|f| f.is_static)
            .ok_or_else(|| EmitError::UnknownMember {
                type_name: self.type_name(owner),
                member: name.to_string(),
            })?;
        Ok(Rc::new(Field::static_field(self.id, entry.clone())))
    }

    /// `array[index]`; `index` must be `int32`.
    pub fn element(&self, array: SymbolRef, index: SymbolRef) -> EmitResult<SymbolRef> {
        self.check_symbol(array.as_ref())?;
        self.check_symbol(index.as_ref())?;
        let array_type = array.data_type().dereferenced();
        let element = self
            .registry
            .array_element(array_type.type_hash)
            .ok_or_else(|| EmitError::UnknownMember {
                type_name: self.describe(array_type),
                member: "[]".to_string(),
            })?;
        crate::symbol::require_int32(self, index.as_ref())?;
        Ok(Rc::new(Element::new(
            self.id,
            array,
            index,
            DataType::simple(element),
        )))
    }

    /// A value captured by the type under construction.
    pub fn captured(&self, id: CapturedId) -> EmitResult<SymbolRef> {
        if self.function.owner != Some(id.owner()) {
            return Err(EmitError::UnknownMember {
                type_name: self.type_name(id.owner()),
                member: format!("captured value {}", id.index()),
            });
        }
        Ok(Rc::new(Captured::new(self.id, id)))
    }

    pub fn binary(&self, op: BinaryOp, lhs: SymbolRef, rhs: SymbolRef) -> EmitResult<SymbolRef> {
        Ok(Rc::new(Operation::binary(self, op, lhs, rhs)?))
    }

    pub fn unary(&self, op: UnaryOp, operand: SymbolRef) -> EmitResult<SymbolRef> {
        Ok(Rc::new(Operation::unary(self, op, operand)?))
    }

    /// Call a registered function. See [`Operation::call`].
    pub fn call(
        &self,
        function: TypeHash,
        receiver: Option<SymbolRef>,
        args: Vec<SymbolRef>,
    ) -> EmitResult<SymbolRef> {
        Ok(Rc::new(Operation::call(self, function, receiver, args)?))
    }

    /// Invoke a registered constructor.
    pub fn construct(&self, constructor: TypeHash, args: Vec<SymbolRef>) -> EmitResult<SymbolRef> {
        Ok(Rc::new(Operation::construct(self, constructor, args)?))
    }

    pub fn new_array(&self, element: TypeHash, length: SymbolRef) -> EmitResult<SymbolRef> {
        Ok(Rc::new(Operation::new_array(self, element, length)?))
    }

    pub fn array_length(&self, array: SymbolRef) -> EmitResult<SymbolRef> {
        Ok(Rc::new(Operation::array_length(self, array)?))
    }

    // ==========================================================================
    // Emission
    // ==========================================================================

    /// Push `symbol` as `intent` requires. See [`load::load`].
    pub fn load(&mut self, symbol: &dyn Symbol, intent: LoadIntent) -> EmitResult<()> {
        load::load(self, symbol, intent)
    }

    /// Store `source` into `dest`. See [`assign::assign`].
    pub fn assign(&mut self, dest: &dyn Symbol, source: &dyn Symbol) -> EmitResult<()> {
        assign::assign(self, dest, source)
    }

    /// Store `source` into `dest` through the stack, even for aggregates.
    pub fn assign_stack_mediated(
        &mut self,
        dest: &dyn Symbol,
        source: &dyn Symbol,
    ) -> EmitResult<()> {
        assign::assign_stack_mediated(self, dest, source)
    }

    /// Convert `source` to `target`. See [`conversion::convert`].
    pub fn convert(&self, source: &SymbolRef, target: DataType) -> EmitResult<SymbolRef> {
        conversion::convert(self, source, target)
    }

    /// Evaluate `symbol` for its side effects, discarding any result.
    pub fn emit_statement(&mut self, symbol: &dyn Symbol) -> EmitResult<()> {
        self.check_symbol(symbol)?;
        let result = self.atomically(|ctx| {
            load::emit_load(ctx, symbol, LoadIntent::Value)?;
            if !symbol.data_type().is_void() {
                ctx.emitter.emit(OpCode::Pop);
            }
            Ok(())
        });
        self.release_statement_temporaries();
        result
    }

    /// Return from the method, with a value unless it returns `void`.
    pub fn emit_return(&mut self, value: Option<&dyn Symbol>) -> EmitResult<()> {
        let return_type = self.function.return_type;
        let result = match value {
            None if return_type.is_void() => {
                self.emitter.emit(OpCode::ReturnVoid);
                Ok(())
            }
            None => Err(EmitError::AssignmentMismatch {
                destination: self.describe(return_type),
                source_type: self.type_name(primitives::VOID),
            }),
            Some(value) => {
                self.check_symbol(value)?;
                let value_type = value.data_type().dereferenced();
                if return_type.is_void()
                    || !self
                        .registry
                        .is_assignable_to(value_type.type_hash, return_type.type_hash)
                {
                    return Err(EmitError::AssignmentMismatch {
                        destination: self.describe(return_type),
                        source_type: self.describe(value_type),
                    });
                }
                self.atomically(|ctx| {
                    load::emit_load(ctx, value, LoadIntent::Value)?;
                    ctx.emitter.emit(OpCode::Return);
                    Ok(())
                })
            }
        };
        self.release_statement_temporaries();
        result
    }

    // ==========================================================================
    // Labels
    // ==========================================================================

    pub fn define_label(&mut self) -> Label {
        self.emitter.define_label()
    }

    pub fn mark_label(&mut self, label: Label) -> EmitResult<()> {
        self.emitter.mark_label(label)
    }

    /// Unconditional jump to `label`.
    pub fn jump(&mut self, label: Label) -> EmitResult<()> {
        self.emitter.emit_jump(OpCode::Jump, label)
    }

    // ==========================================================================
    // Sealing
    // ==========================================================================

    /// Finish the body.
    ///
    /// Fails if a scope is still open, a label has unpatched jumps, or a
    /// non-void method can reach its end. Void methods get a trailing
    /// `ReturnVoid` when execution could fall off the end.
    pub fn seal(mut self) -> EmitResult<SealedMethod> {
        if let Some(open) = self.scopes.innermost() {
            return Err(EmitError::label_misuse(format!(
                "{} scope(s) still open, innermost is a {:?}",
                self.scopes.depth(),
                open
            )));
        }
        let unresolved = self.emitter.labels().unresolved();
        if unresolved > 0 {
            return Err(EmitError::label_misuse(format!(
                "{unresolved} label(s) jumped to but never marked"
            )));
        }

        let end = self.emitter.offset();
        let falls_through = !self
            .emitter
            .chunk()
            .last_op()
            .is_some_and(|op| op.is_terminator())
            || self.emitter.labels().has_target_at(end);
        if falls_through {
            if !self.function.return_type.is_void() {
                return Err(EmitError::AssignmentMismatch {
                    destination: self.describe(self.function.return_type),
                    source_type: self.type_name(primitives::VOID),
                });
            }
            self.emitter.emit(OpCode::ReturnVoid);
        }

        let (chunk, constants) = self.emitter.finish();
        debug!(
            context = %self.id,
            function = %self.function.name,
            bytes = chunk.len(),
            locals = self.locals.len(),
            "sealed method"
        );
        Ok(SealedMethod {
            function: self.function,
            chunk,
            constants,
            locals: self.locals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stacksym_core::{Capabilities, Param, TypeEntry};

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::with_primitives();
        let program = registry
            .register_type(
                TypeEntry::reference("Program")
                    .with_field("count", DataType::simple(primitives::INT32))
                    .with_static_field("total", DataType::simple(primitives::INT64)),
            )
            .unwrap();
        registry.register_array(primitives::INT32).unwrap();
        registry
            .register_function(FunctionEntry::method(
                program,
                "run",
                vec![
                    Param::new("n", DataType::simple(primitives::INT32)),
                    Param::with_modifier(
                        "out_value",
                        DataType::simple(primitives::INT32),
                        stacksym_core::RefModifier::Out,
                    ),
                ],
                DataType::void(),
            ))
            .unwrap();
        registry
    }

    fn run(registry: &TypeRegistry) -> Context<'_> {
        let program = TypeHash::from_name("Program");
        let hash = TypeHash::from_method(program, "run", &[primitives::INT32, primitives::INT32]);
        Context::for_function(registry, hash).unwrap()
    }

    #[test]
    fn instance_arguments_start_after_receiver() {
        let registry = registry();
        let ctx = run(&registry);
        let this = ctx.this().unwrap();
        let n = ctx.argument(0).unwrap();
        let out = ctx.argument(1).unwrap();

        assert_eq!(this.data_type(), DataType::simple(TypeHash::from_name("Program")));
        assert_eq!(n.data_type(), DataType::simple(primitives::INT32));
        assert!(out.data_type().is_by_ref());
        assert!(ctx.argument(2).is_err());
    }

    #[test]
    fn storage_symbols_have_all_capabilities() {
        let registry = registry();
        let mut ctx = run(&registry);
        let local = ctx.variable(DataType::simple(primitives::INT32)).unwrap();
        let field = ctx.field(ctx.this().unwrap(), "count").unwrap();
        let literal = ctx.literal(1);

        assert_eq!(local.capabilities(), Capabilities::STORAGE);
        assert_eq!(field.capabilities(), Capabilities::STORAGE);
        assert_eq!(literal.capabilities(), Capabilities::VALUE);
    }

    #[test]
    fn static_and_instance_lookup_are_separate() {
        let registry = registry();
        let ctx = run(&registry);
        let program = TypeHash::from_name("Program");
        assert!(ctx.static_field(program, "total").is_ok());
        assert!(ctx.static_field(program, "count").is_err());
        assert!(ctx.field(ctx.this().unwrap(), "total").is_err());
    }

    #[test]
    fn element_requires_int32_index() {
        let registry = registry();
        let mut ctx = run(&registry);
        let array = ctx
            .variable(DataType::simple(TypeHash::array_of(primitives::INT32)))
            .unwrap();
        let good = ctx.literal(Literal::I32(0));
        let bad = ctx.literal(Literal::I64(0));

        let element = ctx.element(array.clone(), good).unwrap();
        assert_eq!(element.data_type(), DataType::simple(primitives::INT32));
        assert!(matches!(
            ctx.element(array, bad),
            Err(EmitError::NoConversion { .. })
        ));
    }

    #[test]
    fn symbols_from_another_context_are_rejected() {
        let registry = registry();
        let mut ours = run(&registry);
        let theirs = run(&registry);
        let foreign = theirs.literal(1);

        let err = ours.emit_statement(foreign.as_ref()).unwrap_err();
        assert!(matches!(err, EmitError::CrossContext { .. }));
        assert!(ours.chunk().is_empty());
    }

    #[test]
    fn temporaries_are_reused_between_statements() {
        let registry = registry();
        let mut ctx = run(&registry);
        let a = ctx.acquire_temporary(DataType::simple(primitives::INT32)).unwrap();
        ctx.release_statement_temporaries();
        let b = ctx.acquire_temporary(DataType::simple(primitives::INT32)).unwrap();
        let c = ctx.acquire_temporary(DataType::simple(primitives::INT32)).unwrap();

        assert_eq!(a, b);
        assert_ne!(b, c);
        assert_eq!(ctx.local_count(), 2);
    }

    #[test]
    fn temporaries_not_reused_when_disabled() {
        let registry = registry();
        let function = run(&registry).function().clone();
        let mut ctx = Context::with_options(
            &registry,
            &function,
            EmitOptions::default().reuse_temporaries(false),
        );
        let a = ctx.acquire_temporary(DataType::simple(primitives::INT32)).unwrap();
        ctx.release_statement_temporaries();
        let b = ctx.acquire_temporary(DataType::simple(primitives::INT32)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn local_ceiling() {
        let registry = registry();
        let function = run(&registry).function().clone();
        let mut ctx =
            Context::with_options(&registry, &function, EmitOptions::default().max_locals(1));
        ctx.variable(DataType::simple(primitives::INT32)).unwrap();
        let err = ctx.variable(DataType::simple(primitives::INT32)).unwrap_err();
        assert_eq!(err, EmitError::TooManyLocals { limit: 1 });
    }

    #[test]
    fn failed_operation_gives_back_its_locals() {
        let registry = registry();
        let function = run(&registry).function().clone();
        let mut ctx =
            Context::with_options(&registry, &function, EmitOptions::default().max_locals(1));
        let out_value = ctx.argument(1).unwrap();
        let five = ctx.literal(5);

        let err = ctx.assign(out_value.as_ref(), five.as_ref()).unwrap_err();
        assert_eq!(err, EmitError::TooManyLocals { limit: 1 });
        assert!(ctx.chunk().is_empty());
        assert_eq!(ctx.local_count(), 0);

        let local = ctx.variable(DataType::simple(primitives::INT32)).unwrap();
        ctx.assign(local.as_ref(), five.as_ref()).unwrap();
        assert_eq!(ctx.local_count(), 1);
    }

    #[test]
    fn statement_pops_result() {
        let registry = registry();
        let mut ctx = run(&registry);
        let n = ctx.argument(0).unwrap();
        ctx.emit_statement(n.as_ref()).unwrap();
        ctx.chunk().assert_opcodes(&[OpCode::GetArg, OpCode::Pop]);
    }

    #[test]
    fn seal_appends_return_void() {
        let registry = registry();
        let ctx = run(&registry);
        let sealed = ctx.seal().unwrap();
        sealed.chunk.assert_opcodes(&[OpCode::ReturnVoid]);
    }

    #[test]
    fn seal_rejects_unmarked_label() {
        let registry = registry();
        let mut ctx = run(&registry);
        let label = ctx.define_label();
        ctx.jump(label).unwrap();
        let err = ctx.seal().unwrap_err();
        assert!(matches!(err, EmitError::LabelMisuse { .. }));
    }

    #[test]
    fn return_type_checked() {
        let registry = registry();
        let mut ctx = run(&registry);
        let one = ctx.literal(1);
        let err = ctx.emit_return(Some(one.as_ref())).unwrap_err();
        assert!(matches!(err, EmitError::AssignmentMismatch { .. }));
        assert!(ctx.chunk().is_empty());
    }
}
