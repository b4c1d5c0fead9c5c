//! Value-only symbols composed from other symbols.

use std::fmt;

use stacksym_core::{
    ContextId, DataType, EmitError, EmitResult, FunctionEntry, FunctionKind, NumericCategory,
    RefModifier, TypeHash, primitives,
};

use super::{Symbol, SymbolRef};
use crate::Context;
use crate::bytecode::OpCode;
use crate::load::{LoadIntent, emit_load};

/// Binary operators with a direct instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn opcode(self) -> OpCode {
        match self {
            BinaryOp::Add => OpCode::Add,
            BinaryOp::Sub => OpCode::Sub,
            BinaryOp::Mul => OpCode::Mul,
            BinaryOp::Div => OpCode::Div,
            BinaryOp::Rem => OpCode::Rem,
            BinaryOp::BitAnd => OpCode::BitAnd,
            BinaryOp::BitOr => OpCode::BitOr,
            BinaryOp::BitXor => OpCode::BitXor,
            BinaryOp::Eq => OpCode::Eq,
            BinaryOp::Ne => OpCode::Ne,
            BinaryOp::Lt => OpCode::Lt,
            BinaryOp::Le => OpCode::Le,
            BinaryOp::Gt => OpCode::Gt,
            BinaryOp::Ge => OpCode::Ge,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }

    /// Produces `bool` regardless of operand type.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unary operators with a direct instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Arithmetic negation.
    Neg,
    /// Logical not for `bool`, bitwise complement for integers.
    Not,
}

#[derive(Debug)]
enum OperationKind {
    Binary {
        op: BinaryOp,
        lhs: SymbolRef,
        rhs: SymbolRef,
    },
    Unary {
        op: UnaryOp,
        operand: SymbolRef,
    },
    Call {
        function: TypeHash,
        receiver: Option<SymbolRef>,
        args: Vec<(SymbolRef, RefModifier)>,
    },
    New {
        constructor: TypeHash,
        args: Vec<(SymbolRef, RefModifier)>,
    },
    NewArray {
        element: TypeHash,
        length: SymbolRef,
    },
    ArrayLength {
        array: SymbolRef,
    },
}

/// A computed value. Emitting it re-emits every operand.
#[derive(Debug)]
pub struct Operation {
    context: ContextId,
    data_type: DataType,
    kind: OperationKind,
}

impl Operation {
    /// `lhs op rhs`. Both operands must have the same type; no implicit
    /// conversion is applied.
    pub fn binary(
        ctx: &Context<'_>,
        op: BinaryOp,
        lhs: SymbolRef,
        rhs: SymbolRef,
    ) -> EmitResult<Self> {
        ctx.check_symbol(lhs.as_ref())?;
        ctx.check_symbol(rhs.as_ref())?;

        let lhs_type = lhs.data_type().dereferenced();
        let rhs_type = rhs.data_type().dereferenced();
        if lhs_type != rhs_type {
            return Err(EmitError::NoConversion {
                from: ctx.describe(rhs_type),
                to: ctx.describe(lhs_type),
            });
        }

        let category = ctx
            .registry()
            .primitive_kind(lhs_type.type_hash)
            .and_then(|p| p.category());
        let supported = match op {
            BinaryOp::Eq | BinaryOp::Ne => {
                category.is_some() || ctx.registry().is_reference_type(lhs_type.type_hash)
            }
            BinaryOp::Add => {
                (category.is_some() && lhs_type.type_hash != primitives::BOOL)
                    || lhs_type.type_hash == primitives::STRING
            }
            BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => {
                matches!(category, Some(c) if c != NumericCategory::Float)
            }
            _ => category.is_some() && lhs_type.type_hash != primitives::BOOL,
        };
        if !supported {
            return Err(EmitError::UnknownMember {
                type_name: ctx.describe(lhs_type),
                member: format!("operator {op}"),
            });
        }

        let data_type = if op.is_comparison() {
            DataType::simple(primitives::BOOL)
        } else {
            lhs_type
        };
        Ok(Self {
            context: ctx.id(),
            data_type,
            kind: OperationKind::Binary { op, lhs, rhs },
        })
    }

    pub fn unary(ctx: &Context<'_>, op: UnaryOp, operand: SymbolRef) -> EmitResult<Self> {
        ctx.check_symbol(operand.as_ref())?;
        let data_type = operand.data_type().dereferenced();
        let primitive = ctx.registry().primitive_kind(data_type.type_hash);
        let category = primitive.and_then(|p| p.category());
        let supported = match op {
            UnaryOp::Neg => matches!(
                category,
                Some(NumericCategory::Signed | NumericCategory::Float | NumericCategory::Native)
            ),
            UnaryOp::Not => matches!(category, Some(c) if c != NumericCategory::Float),
        };
        if !supported {
            return Err(EmitError::UnknownMember {
                type_name: ctx.describe(data_type),
                member: format!("operator {op:?}"),
            });
        }
        Ok(Self {
            context: ctx.id(),
            data_type,
            kind: OperationKind::Unary { op, operand },
        })
    }

    /// Call a method or static function. `receiver` is required exactly when
    /// the function is an instance method.
    pub fn call(
        ctx: &Context<'_>,
        function: TypeHash,
        receiver: Option<SymbolRef>,
        args: Vec<SymbolRef>,
    ) -> EmitResult<Self> {
        let entry = lookup_function(ctx, function)?;
        if entry.kind == FunctionKind::Constructor {
            return Err(EmitError::InvalidOperand(format!(
                "constructor of '{}' must be invoked with construct",
                ctx.type_name(entry.owner.unwrap_or(TypeHash::EMPTY))
            )));
        }

        match (&receiver, entry.is_static) {
            (Some(receiver), false) => {
                ctx.check_symbol(receiver.as_ref())?;
                let owner = entry.owner.unwrap_or(TypeHash::EMPTY);
                let receiver_type = receiver.data_type().dereferenced();
                if !ctx.registry().is_assignable_to(receiver_type.type_hash, owner) {
                    return Err(EmitError::NoConversion {
                        from: ctx.describe(receiver_type),
                        to: ctx.type_name(owner),
                    });
                }
            }
            (None, true) => {}
            (None, false) => {
                return Err(EmitError::InvalidOperand(format!(
                    "instance method '{}' called without a receiver",
                    entry.name
                )));
            }
            (Some(_), true) => {
                return Err(EmitError::InvalidOperand(format!(
                    "static function '{}' called with a receiver",
                    entry.name
                )));
            }
        }

        let args = bind_arguments(ctx, entry, args)?;
        Ok(Self {
            context: ctx.id(),
            data_type: entry.return_type,
            kind: OperationKind::Call {
                function,
                receiver,
                args,
            },
        })
    }

    /// Construct an instance with the given constructor.
    pub fn construct(
        ctx: &Context<'_>,
        constructor: TypeHash,
        args: Vec<SymbolRef>,
    ) -> EmitResult<Self> {
        let entry = lookup_function(ctx, constructor)?;
        let owner = match (entry.kind, entry.owner) {
            (FunctionKind::Constructor, Some(owner)) => owner,
            _ => {
                return Err(EmitError::InvalidOperand(format!(
                    "'{}' is not a constructor",
                    entry.name
                )));
            }
        };
        let args = bind_arguments(ctx, entry, args)?;
        Ok(Self {
            context: ctx.id(),
            data_type: DataType::simple(owner),
            kind: OperationKind::New { constructor, args },
        })
    }

    /// Allocate an array of `length` default elements.
    pub fn new_array(ctx: &Context<'_>, element: TypeHash, length: SymbolRef) -> EmitResult<Self> {
        ctx.check_symbol(length.as_ref())?;
        let array = TypeHash::array_of(element);
        if !ctx.registry().contains_type(array) {
            return Err(EmitError::UnknownType(format!("{}[]", ctx.type_name(element))));
        }
        require_int32(ctx, length.as_ref())?;
        Ok(Self {
            context: ctx.id(),
            data_type: DataType::simple(array),
            kind: OperationKind::NewArray { element, length },
        })
    }

    /// Number of elements of an array.
    pub fn array_length(ctx: &Context<'_>, array: SymbolRef) -> EmitResult<Self> {
        ctx.check_symbol(array.as_ref())?;
        let array_type = array.data_type().dereferenced();
        if ctx.registry().array_element(array_type.type_hash).is_none() {
            return Err(EmitError::UnknownMember {
                type_name: ctx.describe(array_type),
                member: "length".to_string(),
            });
        }
        Ok(Self {
            context: ctx.id(),
            data_type: DataType::simple(primitives::INT32),
            kind: OperationKind::ArrayLength { array },
        })
    }
}

fn lookup_function<'r>(ctx: &Context<'r>, hash: TypeHash) -> EmitResult<&'r FunctionEntry> {
    ctx.registry()
        .get_function(hash)
        .ok_or_else(|| EmitError::UnknownMember {
            type_name: "<functions>".to_string(),
            member: hash.to_string(),
        })
}

/// Check argument count, context and types against the declared parameters.
fn bind_arguments(
    ctx: &Context<'_>,
    entry: &FunctionEntry,
    args: Vec<SymbolRef>,
) -> EmitResult<Vec<(SymbolRef, RefModifier)>> {
    if args.len() != entry.params.len() {
        return Err(EmitError::InvalidOperand(format!(
            "'{}' takes {} arguments but {} were supplied",
            entry.name,
            entry.params.len(),
            args.len()
        )));
    }
    for arg in &args {
        ctx.check_symbol(arg.as_ref())?;
    }
    args.into_iter()
        .zip(&entry.params)
        .map(|(arg, param)| {
            let arg_type = arg.data_type().dereferenced();
            let param_type = param.data_type.dereferenced();
            if !ctx
                .registry()
                .is_assignable_to(arg_type.type_hash, param_type.type_hash)
            {
                return Err(EmitError::NoConversion {
                    from: ctx.describe(arg_type),
                    to: ctx.describe(param_type),
                });
            }
            Ok((arg, param.ref_modifier))
        })
        .collect()
}

pub(crate) fn require_int32(ctx: &Context<'_>, symbol: &dyn Symbol) -> EmitResult<()> {
    let data_type = symbol.data_type().dereferenced();
    if data_type.type_hash != primitives::INT32 {
        return Err(EmitError::NoConversion {
            from: ctx.describe(data_type),
            to: ctx.type_name(primitives::INT32),
        });
    }
    Ok(())
}

fn emit_arguments(ctx: &mut Context<'_>, args: &[(SymbolRef, RefModifier)]) -> EmitResult<()> {
    for (arg, modifier) in args {
        emit_load(ctx, arg.as_ref(), LoadIntent::Parameter(*modifier))?;
    }
    Ok(())
}

impl Symbol for Operation {
    fn context(&self) -> ContextId {
        self.context
    }

    fn data_type(&self) -> DataType {
        self.data_type
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    fn emit_value(&self, ctx: &mut Context<'_>) -> EmitResult<()> {
        ctx.check_context(self.context)?;
        match &self.kind {
            OperationKind::Binary { op, lhs, rhs } => {
                emit_load(ctx, lhs.as_ref(), LoadIntent::Value)?;
                emit_load(ctx, rhs.as_ref(), LoadIntent::Value)?;
                ctx.emitter().emit(op.opcode());
            }
            OperationKind::Unary { op, operand } => {
                emit_load(ctx, operand.as_ref(), LoadIntent::Value)?;
                ctx.emitter().emit(match op {
                    UnaryOp::Neg => OpCode::Neg,
                    UnaryOp::Not => OpCode::Not,
                });
            }
            OperationKind::Call {
                function,
                receiver,
                args,
            } => {
                let op = match receiver {
                    Some(receiver) => {
                        emit_load(ctx, receiver.as_ref(), LoadIntent::CallTarget)?;
                        OpCode::CallMethod
                    }
                    None => OpCode::Call,
                };
                emit_arguments(ctx, args)?;
                ctx.emitter().emit_call(op, *function, args.len())?;
            }
            OperationKind::New { constructor, args } => {
                emit_arguments(ctx, args)?;
                ctx.emitter()
                    .emit_call(OpCode::New, *constructor, args.len())?;
            }
            OperationKind::NewArray { element, length } => {
                emit_load(ctx, length.as_ref(), LoadIntent::Value)?;
                ctx.emitter().emit_hash_op(OpCode::NewArray, *element)?;
            }
            OperationKind::ArrayLength { array } => {
                emit_load(ctx, array.as_ref(), LoadIntent::Value)?;
                ctx.emitter().emit(OpCode::ArrayLength);
            }
        }
        Ok(())
    }
}
