//! The interpreter.
//!
//! Each call gets a [`Frame`] with its own operand stack, argument slots and
//! local slots. Frames stay on the machine's call stack for the duration of
//! the call, so addresses of caller locals remain valid inside callees.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use stacksym_codegen::{BuiltType, Constant, OpCode, SealedMethod};
use stacksym_core::{DataType, TypeHash, TypeKind, primitives};
use stacksym_registry::TypeRegistry;
use tracing::trace;

use crate::error::{VmError, VmResult};
use crate::heap::{Heap, ObjectId};
use crate::ops;
use crate::value::{Address, Root, Value};

/// Host implementation of a function. Instance methods receive their
/// receiver as the first value; constructors receive only their arguments
/// and return the new instance.
pub type NativeFn = Rc<dyn Fn(&mut Heap, &[Value]) -> VmResult<Value>>;

/// Default call depth limit.
pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Debug)]
struct Frame {
    method: Rc<SealedMethod>,
    args: Vec<Value>,
    locals: Vec<Value>,
    stack: Vec<Value>,
}

/// Executes sealed method bodies against a type registry.
pub struct Machine<'r> {
    registry: &'r TypeRegistry,
    methods: FxHashMap<TypeHash, Rc<SealedMethod>>,
    natives: FxHashMap<TypeHash, NativeFn>,
    captured: FxHashMap<TypeHash, Vec<Value>>,
    statics: FxHashMap<TypeHash, Value>,
    heap: Heap,
    frames: Vec<Frame>,
    max_depth: usize,
}

impl std::fmt::Debug for Machine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("methods", &self.methods.len())
            .field("natives", &self.natives.len())
            .field("heap", &self.heap.len())
            .field("depth", &self.frames.len())
            .finish()
    }
}

impl<'r> Machine<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            methods: FxHashMap::default(),
            natives: FxHashMap::default(),
            captured: FxHashMap::default(),
            statics: FxHashMap::default(),
            heap: Heap::new(),
            frames: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, limit: usize) -> Self {
        self.max_depth = limit;
        self
    }

    /// Make the methods and captured values of `built` callable.
    pub fn load_type(&mut self, built: BuiltType) {
        let values = built.captured.iter().map(Value::from).collect();
        self.captured.insert(built.type_hash, values);
        for (hash, method) in built.methods {
            self.methods.insert(hash, Rc::new(method));
        }
    }

    /// Make a single sealed method callable.
    pub fn load_method(&mut self, method: SealedMethod) {
        self.methods.insert(method.function.hash, Rc::new(method));
    }

    pub fn register_native(
        &mut self,
        function: TypeHash,
        native: impl Fn(&mut Heap, &[Value]) -> VmResult<Value> + 'static,
    ) {
        self.natives.insert(function, Rc::new(native));
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    /// Allocate a standalone cell holding `value`, for passing by reference.
    pub fn alloc_cell(&mut self, type_hash: TypeHash, value: Value) -> Value {
        let id = self.heap.alloc(type_hash, value);
        Value::Address(Address::new(Root::Heap(id)))
    }

    /// Read the value stored at `address`.
    pub fn read(&mut self, address: &Address) -> VmResult<Value> {
        Ok(self.place_mut(address)?.clone())
    }

    /// Current value of a static field.
    pub fn static_value(&mut self, field: TypeHash) -> VmResult<Value> {
        self.read(&Address::new(Root::Static(field)))
    }

    /// A fresh instance of `hash` with every field defaulted. Reference types
    /// are allocated on the heap.
    pub fn instantiate(&mut self, hash: TypeHash) -> Value {
        match self.registry.kind(hash) {
            Some(TypeKind::Reference) => {
                let layout = self.object_layout(hash);
                Value::Ref(self.heap.alloc(hash, layout))
            }
            _ => Value::default_for(self.registry, hash),
        }
    }

    fn object_layout(&self, hash: TypeHash) -> Value {
        let mut fields: Vec<_> = self
            .registry
            .base_chain(hash)
            .flat_map(|entry| entry.instance_fields())
            .collect();
        fields.sort_by_key(|f| f.index);
        Value::Aggregate(
            fields
                .into_iter()
                .map(|f| Value::default_for(self.registry, f.data_type.type_hash))
                .collect(),
        )
    }

    // ==========================================================================
    // Calls
    // ==========================================================================

    /// Call `function` with `args`, receiver first for instance methods.
    pub fn invoke(&mut self, function: TypeHash, args: Vec<Value>) -> VmResult<Value> {
        if let Some(native) = self.natives.get(&function).cloned() {
            return native(&mut self.heap, &args);
        }
        let method = self
            .methods
            .get(&function)
            .cloned()
            .ok_or(VmError::UnknownFunction(function))?;

        let expected = method.function.stack_arity();
        if args.len() != expected {
            return Err(VmError::ArityMismatch {
                function: method.function.name.clone(),
                expected,
                found: args.len(),
            });
        }
        if self.frames.len() >= self.max_depth {
            return Err(VmError::StackOverflow {
                limit: self.max_depth,
            });
        }

        trace!(function = %method.function.name, depth = self.frames.len(), "invoke");
        let locals = method
            .locals
            .iter()
            .map(|dt| self.slot_default(*dt))
            .collect();
        self.frames.push(Frame {
            method,
            args,
            locals,
            stack: Vec::new(),
        });
        let frame = self.frames.len() - 1;
        let result = self.run(frame);
        self.frames.truncate(frame);
        result
    }

    fn slot_default(&self, data_type: DataType) -> Value {
        if data_type.is_by_ref() {
            Value::Void
        } else {
            Value::default_for(self.registry, data_type.type_hash)
        }
    }

    fn construct(&mut self, constructor: TypeHash, args: Vec<Value>) -> VmResult<Value> {
        if let Some(native) = self.natives.get(&constructor).cloned() {
            return native(&mut self.heap, &args);
        }
        let owner = self
            .registry
            .get_function(constructor)
            .and_then(|f| f.owner)
            .ok_or(VmError::UnknownFunction(constructor))?;

        let instance = self.instantiate(owner);
        let (receiver, cell) = match instance {
            Value::Ref(id) => (Value::Ref(id), None),
            value => {
                let id = self.heap.alloc(owner, value);
                (Value::Address(Address::new(Root::Heap(id))), Some(id))
            }
        };
        let mut call_args = Vec::with_capacity(args.len() + 1);
        call_args.push(receiver.clone());
        call_args.extend(args);
        self.invoke(constructor, call_args)?;
        match cell {
            Some(id) => Ok(self.heap.get(id)?.value.clone()),
            None => Ok(receiver),
        }
    }

    // ==========================================================================
    // Addresses
    // ==========================================================================

    fn root_mut(&mut self, root: &Root) -> VmResult<&mut Value> {
        let missing = || VmError::InvalidAddress(format!("{root:?}"));
        match root {
            Root::Local { frame, slot } => self
                .frames
                .get_mut(*frame)
                .and_then(|f| f.locals.get_mut(usize::from(*slot)))
                .ok_or_else(missing),
            Root::Arg { frame, slot } => self
                .frames
                .get_mut(*frame)
                .and_then(|f| f.args.get_mut(usize::from(*slot)))
                .ok_or_else(missing),
            Root::Static(field) => {
                let registry = self.registry;
                let data_type = registry
                    .field_by_hash(*field)
                    .map(|f| f.data_type)
                    .ok_or_else(missing)?;
                Ok(self
                    .statics
                    .entry(*field)
                    .or_insert_with(|| Value::default_for(registry, data_type.type_hash)))
            }
            Root::Heap(id) => Ok(&mut self.heap.get_mut(*id)?.value),
            Root::Captured { owner, index } => self
                .captured
                .get_mut(owner)
                .and_then(|values| values.get_mut(usize::from(*index)))
                .ok_or_else(missing),
        }
    }

    fn place_mut(&mut self, address: &Address) -> VmResult<&mut Value> {
        let mut place = self.root_mut(&address.root)?;
        for &index in &address.path {
            place = match place {
                Value::Aggregate(items) => {
                    let length = items.len();
                    items
                        .get_mut(usize::from(index))
                        .ok_or(VmError::IndexOutOfBounds {
                            index: i64::from(index),
                            length,
                        })?
                }
                Value::Null => return Err(VmError::NullReference),
                other => {
                    return Err(VmError::TypeMismatch {
                        expected: "aggregate",
                        found: other.kind_name(),
                    });
                }
            };
        }
        Ok(place)
    }

    fn write(&mut self, address: &Address, value: Value) -> VmResult<()> {
        *self.place_mut(address)? = value;
        Ok(())
    }

    /// Address of member `index` of an instance on the stack.
    fn member_address(instance: Value, index: u16) -> VmResult<Address> {
        match instance {
            Value::Ref(id) => Ok(Address::new(Root::Heap(id)).member(index)),
            Value::Address(address) => Ok(address.member(index)),
            Value::Null => Err(VmError::NullReference),
            other => Err(VmError::TypeMismatch {
                expected: "reference or address",
                found: other.kind_name(),
            }),
        }
    }

    fn element_address(&self, array: Value, index: Value) -> VmResult<Address> {
        let id = expect_ref(array)?;
        let index = index.as_i32().ok_or(VmError::TypeMismatch {
            expected: "int32",
            found: index.kind_name(),
        })?;
        let length = match &self.heap.get(id)?.value {
            Value::Aggregate(items) => items.len(),
            other => {
                return Err(VmError::TypeMismatch {
                    expected: "array",
                    found: other.kind_name(),
                });
            }
        };
        match u16::try_from(index) {
            Ok(slot) if usize::from(slot) < length => {
                Ok(Address::new(Root::Heap(id)).member(slot))
            }
            _ => Err(VmError::IndexOutOfBounds {
                index: i64::from(index),
                length,
            }),
        }
    }

    fn field_index(&self, field: TypeHash) -> VmResult<u16> {
        self.registry
            .field_by_hash(field)
            .map(|f| f.index)
            .ok_or_else(|| VmError::InvalidAddress(format!("unknown field {field}")))
    }

    fn runtime_type(&self, value: &Value) -> VmResult<TypeHash> {
        match value {
            Value::Ref(id) => Ok(self.heap.get(*id)?.type_hash),
            Value::Str(_) => Ok(primitives::STRING),
            other => Err(VmError::TypeMismatch {
                expected: "reference",
                found: other.kind_name(),
            }),
        }
    }

    // ==========================================================================
    // Execution
    // ==========================================================================

    fn push(&mut self, frame: usize, value: Value) {
        self.frames[frame].stack.push(value);
    }

    fn pop(&mut self, frame: usize, offset: usize) -> VmResult<Value> {
        self.frames[frame]
            .stack
            .pop()
            .ok_or(VmError::StackUnderflow { offset })
    }

    fn pop_address(&mut self, frame: usize, offset: usize) -> VmResult<Address> {
        match self.pop(frame, offset)? {
            Value::Address(address) => Ok(address),
            other => Err(VmError::TypeMismatch {
                expected: "address",
                found: other.kind_name(),
            }),
        }
    }

    fn pop_args(&mut self, frame: usize, offset: usize, argc: u8) -> VmResult<Vec<Value>> {
        let stack = &mut self.frames[frame].stack;
        let argc = usize::from(argc);
        if stack.len() < argc {
            return Err(VmError::StackUnderflow { offset });
        }
        Ok(stack.split_off(stack.len() - argc))
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    fn run(&mut self, frame: usize) -> VmResult<Value> {
        let method = Rc::clone(&self.frames[frame].method);
        let chunk = &method.chunk;
        let constants = &method.constants;
        let invalid = |offset| VmError::InvalidBytecode { offset };
        let mut ip = 0;

        loop {
            let offset = ip;
            let op = chunk.read_op(offset).ok_or(invalid(offset))?;
            let size = op.operand_size();
            let operand = match size {
                0 => 0,
                1 => chunk.read_byte(offset + 1).map(u32::from).ok_or(invalid(offset))?,
                2 | 3 => chunk.read_u16(offset + 1).map(u32::from).ok_or(invalid(offset))?,
                _ => chunk.read_u32(offset + 1).ok_or(invalid(offset))?,
            };
            let argc = if size == 3 {
                chunk.read_byte(offset + 3).ok_or(invalid(offset))?
            } else {
                0
            };
            let hash = || constants.type_hash(operand).ok_or(invalid(offset));
            let slot = operand as u16;
            ip = offset + 1 + size;

            match op {
                OpCode::Constant | OpCode::ConstantWide => match constants.get(operand) {
                    Some(Constant::Literal(literal)) => self.push(frame, Value::from(literal)),
                    _ => return Err(invalid(offset)),
                },
                OpCode::PushNull => self.push(frame, Value::Null),
                OpCode::PushTrue => self.push(frame, Value::Bool(true)),
                OpCode::PushFalse => self.push(frame, Value::Bool(false)),
                OpCode::Nop => {}
                OpCode::Pop => {
                    self.pop(frame, offset)?;
                }
                OpCode::Dup => {
                    let top = self.pop(frame, offset)?;
                    self.push(frame, top.clone());
                    self.push(frame, top);
                }
                OpCode::Swap => {
                    let b = self.pop(frame, offset)?;
                    let a = self.pop(frame, offset)?;
                    self.push(frame, b);
                    self.push(frame, a);
                }

                OpCode::GetLocal | OpCode::GetLocalWide => {
                    let value = self.read(&Address::new(Root::Local { frame, slot }))?;
                    self.push(frame, value);
                }
                OpCode::SetLocal | OpCode::SetLocalWide => {
                    let value = self.pop(frame, offset)?;
                    self.write(&Address::new(Root::Local { frame, slot }), value)?;
                }
                OpCode::LocalAddress | OpCode::LocalAddressWide => {
                    self.push(frame, Value::Address(Address::new(Root::Local { frame, slot })));
                }
                OpCode::GetArg => {
                    let value = self.read(&Address::new(Root::Arg { frame, slot }))?;
                    self.push(frame, value);
                }
                OpCode::SetArg => {
                    let value = self.pop(frame, offset)?;
                    self.write(&Address::new(Root::Arg { frame, slot }), value)?;
                }
                OpCode::ArgAddress => {
                    self.push(frame, Value::Address(Address::new(Root::Arg { frame, slot })));
                }

                OpCode::GetField => {
                    let index = self.field_index(hash()?)?;
                    let value = match self.pop(frame, offset)? {
                        Value::Aggregate(mut fields) if usize::from(index) < fields.len() => {
                            fields.swap_remove(usize::from(index))
                        }
                        instance => self.read(&Self::member_address(instance, index)?)?,
                    };
                    self.push(frame, value);
                }
                OpCode::SetField => {
                    let index = self.field_index(hash()?)?;
                    let instance = self.pop(frame, offset)?;
                    let value = self.pop(frame, offset)?;
                    self.write(&Self::member_address(instance, index)?, value)?;
                }
                OpCode::FieldAddress => {
                    let index = self.field_index(hash()?)?;
                    let instance = self.pop(frame, offset)?;
                    self.push(frame, Value::Address(Self::member_address(instance, index)?));
                }
                OpCode::GetStatic => {
                    let value = self.read(&Address::new(Root::Static(hash()?)))?;
                    self.push(frame, value);
                }
                OpCode::SetStatic => {
                    let value = self.pop(frame, offset)?;
                    self.write(&Address::new(Root::Static(hash()?)), value)?;
                }
                OpCode::StaticAddress => {
                    self.push(frame, Value::Address(Address::new(Root::Static(hash()?))));
                }

                OpCode::GetElement => {
                    let index = self.pop(frame, offset)?;
                    let array = self.pop(frame, offset)?;
                    let address = self.element_address(array, index)?;
                    let value = self.read(&address)?;
                    self.push(frame, value);
                }
                OpCode::SetElement => {
                    let index = self.pop(frame, offset)?;
                    let array = self.pop(frame, offset)?;
                    let value = self.pop(frame, offset)?;
                    let address = self.element_address(array, index)?;
                    self.write(&address, value)?;
                }
                OpCode::ElementAddress => {
                    let index = self.pop(frame, offset)?;
                    let array = self.pop(frame, offset)?;
                    let address = self.element_address(array, index)?;
                    self.push(frame, Value::Address(address));
                }
                OpCode::NewArray => {
                    let element = hash()?;
                    let length = self.pop(frame, offset)?;
                    let count = length
                        .as_i32()
                        .and_then(|n| usize::try_from(n).ok())
                        .ok_or(VmError::IndexOutOfBounds {
                            index: length.as_i32().map_or(-1, i64::from),
                            length: 0,
                        })?;
                    let default = Value::default_for(self.registry, element);
                    let id = self
                        .heap
                        .alloc(TypeHash::array_of(element), Value::Aggregate(vec![default; count]));
                    self.push(frame, Value::Ref(id));
                }
                OpCode::ArrayLength => {
                    let id = expect_ref(self.pop(frame, offset)?)?;
                    let length = match &self.heap.get(id)?.value {
                        Value::Aggregate(items) => items.len(),
                        other => {
                            return Err(VmError::TypeMismatch {
                                expected: "array",
                                found: other.kind_name(),
                            });
                        }
                    };
                    self.push(frame, Value::I32(length as i32));
                }
                OpCode::LoadCaptured | OpCode::CapturedAddress => {
                    let owner = method.function.owner.ok_or(invalid(offset))?;
                    let address = Address::new(Root::Captured { owner, index: slot });
                    let value = if op == OpCode::LoadCaptured {
                        self.read(&address)?
                    } else {
                        Value::Address(address)
                    };
                    self.push(frame, value);
                }

                OpCode::LoadIndI8
                | OpCode::LoadIndU8
                | OpCode::LoadIndI16
                | OpCode::LoadIndU16
                | OpCode::LoadIndI32
                | OpCode::LoadIndU32
                | OpCode::LoadIndI64
                | OpCode::LoadIndF32
                | OpCode::LoadIndF64
                | OpCode::LoadIndNative
                | OpCode::LoadIndRef
                | OpCode::LoadObj => {
                    let address = self.pop_address(frame, offset)?;
                    let value = self.read(&address)?;
                    check_width(op, &value)?;
                    self.push(frame, value);
                }
                OpCode::StoreIndI8
                | OpCode::StoreIndI16
                | OpCode::StoreIndI32
                | OpCode::StoreIndI64
                | OpCode::StoreIndF32
                | OpCode::StoreIndF64
                | OpCode::StoreIndNative
                | OpCode::StoreIndRef
                | OpCode::StoreObj => {
                    let value = self.pop(frame, offset)?;
                    let address = self.pop_address(frame, offset)?;
                    check_width(op, &value)?;
                    self.write(&address, value)?;
                }
                OpCode::CopyObj => {
                    let source = self.pop_address(frame, offset)?;
                    let dest = self.pop_address(frame, offset)?;
                    let value = self.read(&source)?;
                    check_width(op, &value)?;
                    self.write(&dest, value)?;
                }

                OpCode::Box => {
                    let value = self.pop(frame, offset)?;
                    let id = self.heap.alloc(hash()?, value);
                    self.push(frame, Value::Ref(id));
                }
                OpCode::UnboxAny => {
                    let target = hash()?;
                    let id = expect_ref(self.pop(frame, offset)?)?;
                    let object = self.heap.get(id)?;
                    if object.type_hash != target {
                        return Err(VmError::InvalidCast {
                            from: self.registry.type_name(object.type_hash),
                            to: self.registry.type_name(target),
                        });
                    }
                    let value = object.value.clone();
                    self.push(frame, value);
                }
                OpCode::Cast => {
                    let target = hash()?;
                    let value = self.pop(frame, offset)?;
                    if value != Value::Null {
                        let actual = self.runtime_type(&value)?;
                        if !self.registry.is_assignable_to(actual, target) {
                            return Err(VmError::InvalidCast {
                                from: self.registry.type_name(actual),
                                to: self.registry.type_name(target),
                            });
                        }
                    }
                    self.push(frame, value);
                }

                OpCode::New => {
                    let args = self.pop_args(frame, offset, argc)?;
                    let value = self.construct(hash()?, args)?;
                    self.push(frame, value);
                }
                OpCode::Call | OpCode::CallMethod => {
                    let mut args = self.pop_args(frame, offset, argc)?;
                    if op == OpCode::CallMethod {
                        let receiver = self.pop(frame, offset)?;
                        if receiver == Value::Null {
                            return Err(VmError::NullReference);
                        }
                        args.insert(0, receiver);
                    }
                    let result = self.invoke(hash()?, args)?;
                    if result != Value::Void {
                        self.push(frame, result);
                    }
                }
                OpCode::Return => return self.pop(frame, offset),
                OpCode::ReturnVoid => return Ok(Value::Void),

                OpCode::Add
                | OpCode::Sub
                | OpCode::Mul
                | OpCode::Div
                | OpCode::Rem
                | OpCode::BitAnd
                | OpCode::BitOr
                | OpCode::BitXor => {
                    let rhs = self.pop(frame, offset)?;
                    let lhs = self.pop(frame, offset)?;
                    self.push(frame, ops::arithmetic(op, lhs, rhs)?);
                }
                OpCode::Neg => {
                    let value = self.pop(frame, offset)?;
                    self.push(frame, ops::negate(value)?);
                }
                OpCode::Not => {
                    let value = self.pop(frame, offset)?;
                    self.push(frame, ops::not(value)?);
                }
                OpCode::Eq | OpCode::Ne | OpCode::Lt | OpCode::Le | OpCode::Gt | OpCode::Ge => {
                    let rhs = self.pop(frame, offset)?;
                    let lhs = self.pop(frame, offset)?;
                    self.push(frame, Value::Bool(ops::compare(op, &lhs, &rhs)?));
                }

                OpCode::Jump => ip = operand as usize,
                OpCode::JumpIfFalse | OpCode::JumpIfTrue => {
                    let condition = self.pop(frame, offset)?;
                    let condition = condition.as_bool().ok_or(VmError::TypeMismatch {
                        expected: "bool",
                        found: condition.kind_name(),
                    })?;
                    if condition == (op == OpCode::JumpIfTrue) {
                        ip = operand as usize;
                    }
                }
            }
        }
    }
}

fn expect_ref(value: Value) -> VmResult<ObjectId> {
    match value {
        Value::Ref(id) => Ok(id),
        Value::Null => Err(VmError::NullReference),
        other => Err(VmError::TypeMismatch {
            expected: "reference",
            found: other.kind_name(),
        }),
    }
}

/// Indirect loads and stores must match the width of the stored value.
fn check_width(op: OpCode, value: &Value) -> VmResult<()> {
    let (expected, ok) = match op {
        OpCode::LoadIndI8 => ("int8", matches!(value, Value::I8(_))),
        OpCode::LoadIndU8 => ("uint8", matches!(value, Value::U8(_) | Value::Bool(_))),
        OpCode::LoadIndI16 => ("int16", matches!(value, Value::I16(_))),
        OpCode::LoadIndU16 => ("uint16", matches!(value, Value::U16(_) | Value::Char(_))),
        OpCode::LoadIndI32 => ("int32", matches!(value, Value::I32(_))),
        OpCode::LoadIndU32 => ("uint32", matches!(value, Value::U32(_))),
        OpCode::LoadIndI64 | OpCode::StoreIndI64 => {
            ("64-bit integer", matches!(value, Value::I64(_) | Value::U64(_)))
        }
        OpCode::StoreIndI8 => (
            "8-bit value",
            matches!(value, Value::I8(_) | Value::U8(_) | Value::Bool(_)),
        ),
        OpCode::StoreIndI16 => (
            "16-bit value",
            matches!(value, Value::I16(_) | Value::U16(_) | Value::Char(_)),
        ),
        OpCode::StoreIndI32 => ("32-bit integer", matches!(value, Value::I32(_) | Value::U32(_))),
        OpCode::LoadIndF32 | OpCode::StoreIndF32 => ("float32", matches!(value, Value::F32(_))),
        OpCode::LoadIndF64 | OpCode::StoreIndF64 => ("float64", matches!(value, Value::F64(_))),
        OpCode::LoadIndNative | OpCode::StoreIndNative => (
            "native integer",
            matches!(value, Value::NativeInt(_) | Value::NativeUint(_)),
        ),
        OpCode::LoadIndRef | OpCode::StoreIndRef => (
            "reference",
            matches!(value, Value::Null | Value::Ref(_) | Value::Str(_)),
        ),
        _ => ("aggregate", matches!(value, Value::Aggregate(_))),
    };
    if ok {
        Ok(())
    } else {
        Err(VmError::TypeMismatch {
            expected,
            found: value.kind_name(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stacksym_codegen::{BinaryOp, Context, TypeBuilder};
    use stacksym_core::{FunctionEntry, Literal, Param, RefModifier, TypeEntry};

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::with_primitives();
        let math = registry.register_type(TypeEntry::reference("Math")).unwrap();
        registry
            .register_function(FunctionEntry::static_method(
                math,
                "sum_to",
                vec![Param::new("n", DataType::simple(primitives::INT32))],
                DataType::simple(primitives::INT32),
            ))
            .unwrap();
        registry
            .register_function(FunctionEntry::static_method(
                math,
                "set",
                vec![Param::with_modifier(
                    "target",
                    DataType::simple(primitives::INT32),
                    RefModifier::Out,
                )],
                DataType::void(),
            ))
            .unwrap();
        registry
            .register_function(FunctionEntry::static_method(
                math,
                "forever",
                vec![],
                DataType::void(),
            ))
            .unwrap();
        registry
    }

    fn math(name: &str, params: &[TypeHash]) -> TypeHash {
        TypeHash::from_method(TypeHash::from_name("Math"), name, params)
    }

    #[test]
    fn loop_with_break_sums() {
        let registry = registry();
        let sum_to = math("sum_to", &[primitives::INT32]);
        let mut ctx = Context::for_function(&registry, sum_to).unwrap();
        let n = ctx.argument(0).unwrap();
        let i = ctx.variable(DataType::simple(primitives::INT32)).unwrap();
        let total = ctx.variable(DataType::simple(primitives::INT32)).unwrap();

        let scope = ctx.open_loop(None).unwrap();
        let keep_going = ctx.binary(BinaryOp::Lt, i.clone(), n).unwrap();
        ctx.break_if_false(&scope, keep_going.as_ref()).unwrap();
        let one = ctx.literal(1);
        let next = ctx.binary(BinaryOp::Add, i.clone(), one).unwrap();
        ctx.assign(i.as_ref(), next.as_ref()).unwrap();
        let added = ctx.binary(BinaryOp::Add, total.clone(), i.clone()).unwrap();
        ctx.assign(total.as_ref(), added.as_ref()).unwrap();
        ctx.close_scope(scope).unwrap();
        ctx.emit_return(Some(total.as_ref())).unwrap();

        let mut machine = Machine::new(&registry);
        machine.load_method(ctx.seal().unwrap());
        let result = machine.invoke(sum_to, vec![Value::I32(4)]).unwrap();
        assert_eq!(result, Value::I32(10));
    }

    #[test]
    fn out_parameter_writes_through() {
        let registry = registry();
        let set = math("set", &[primitives::INT32]);
        let mut ctx = Context::for_function(&registry, set).unwrap();
        let target = ctx.argument(0).unwrap();
        let value = ctx.literal(Literal::I32(42));
        ctx.assign(target.as_ref(), value.as_ref()).unwrap();

        let mut machine = Machine::new(&registry);
        machine.load_method(ctx.seal().unwrap());
        let cell = machine.alloc_cell(primitives::INT32, Value::I32(0));
        machine.invoke(set, vec![cell.clone()]).unwrap();
        let Value::Address(address) = cell else {
            panic!("cell is an address");
        };
        assert_eq!(machine.read(&address).unwrap(), Value::I32(42));
    }

    #[test]
    fn width_mismatch_detected() {
        assert!(check_width(OpCode::LoadIndI32, &Value::I64(1)).is_err());
        assert!(check_width(OpCode::StoreIndI32, &Value::U32(1)).is_ok());
        assert!(check_width(OpCode::LoadIndU8, &Value::Bool(true)).is_ok());
        assert!(check_width(OpCode::CopyObj, &Value::I32(1)).is_err());
    }

    #[test]
    fn recursion_limit() {
        let registry = registry();
        let forever = math("forever", &[]);
        let mut ctx = Context::for_function(&registry, forever).unwrap();
        let call = ctx.call(forever, None, vec![]).unwrap();
        ctx.emit_statement(call.as_ref()).unwrap();

        let mut machine = Machine::new(&registry).with_max_depth(8);
        machine.load_method(ctx.seal().unwrap());
        assert_eq!(
            machine.invoke(forever, vec![]),
            Err(VmError::StackOverflow { limit: 8 })
        );
    }

    #[test]
    fn arity_checked() {
        let registry = registry();
        let sum_to = math("sum_to", &[primitives::INT32]);
        let mut ctx = Context::for_function(&registry, sum_to).unwrap();
        let n = ctx.argument(0).unwrap();
        ctx.emit_return(Some(n.as_ref())).unwrap();
        let mut machine = Machine::new(&registry);
        machine.load_method(ctx.seal().unwrap());
        assert!(matches!(
            machine.invoke(sum_to, vec![]),
            Err(VmError::ArityMismatch { expected: 1, found: 0, .. })
        ));
    }

    #[test]
    fn captured_values_loaded_with_type() {
        let mut registry = registry();
        let holder = registry.register_type(TypeEntry::reference("Holder")).unwrap();
        let get = FunctionEntry::static_method(
            holder,
            "get",
            vec![],
            DataType::simple(primitives::STRING),
        );
        registry.register_function(get.clone()).unwrap();

        let mut builder = TypeBuilder::new(&registry, holder).unwrap();
        let text = builder.capture("captured").unwrap();
        let mut ctx = builder.method(get.hash).unwrap();
        let symbol = ctx.captured(text).unwrap();
        ctx.emit_return(Some(symbol.as_ref())).unwrap();
        builder.add_method(ctx.seal().unwrap()).unwrap();

        let mut machine = Machine::new(&registry);
        machine.load_type(builder.build());
        assert_eq!(machine.invoke(get.hash, vec![]).unwrap(), Value::from("captured"));
    }
}
