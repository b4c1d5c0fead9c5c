//! Operation codes.
//!
//! Each opcode is a single byte, with operands following inline in
//! big-endian order. Type, field and function operands are `u16` indexes
//! into the method's constant pool.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Instruction set of the stack machine.
///
/// Stack effects are written `[before] -> [after]` with the top of stack on
/// the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum OpCode {
    // =========================================================================
    // Constants
    // =========================================================================
    /// Push constant from pool (8-bit index).
    /// Operand: u8 constant index
    Constant = 0,
    /// Push constant from pool (16-bit index).
    /// Operand: u16 constant index
    ConstantWide,
    /// Push the null reference.
    PushNull,
    /// Push boolean true.
    PushTrue,
    /// Push boolean false.
    PushFalse,

    // =========================================================================
    // Stack Operations
    // =========================================================================
    /// No operation.
    Nop,
    /// Pop top of stack.
    Pop,
    /// Duplicate top of stack.
    Dup,
    /// Swap the top two values.
    Swap,

    // =========================================================================
    // Locals and Arguments
    // =========================================================================
    /// `[] -> [value]`. Operand: u8 slot
    GetLocal,
    /// `[value] -> []`. Operand: u8 slot
    SetLocal,
    /// `[] -> [address]`. Operand: u8 slot
    LocalAddress,
    /// Operand: u16 slot
    GetLocalWide,
    /// Operand: u16 slot
    SetLocalWide,
    /// Operand: u16 slot
    LocalAddressWide,
    /// `[] -> [value]`. Operand: u16 argument index
    GetArg,
    /// `[value] -> []`. Operand: u16 argument index
    SetArg,
    /// `[] -> [address]`. Operand: u16 argument index
    ArgAddress,

    // =========================================================================
    // Fields
    // =========================================================================
    /// `[instance] -> [value]`. Operand: u16 field constant
    GetField,
    /// `[value, instance] -> []`. Operand: u16 field constant
    SetField,
    /// `[instance] -> [address]`. Operand: u16 field constant
    FieldAddress,
    /// `[] -> [value]`. Operand: u16 field constant
    GetStatic,
    /// `[value] -> []`. Operand: u16 field constant
    SetStatic,
    /// `[] -> [address]`. Operand: u16 field constant
    StaticAddress,

    // =========================================================================
    // Arrays
    // =========================================================================
    /// `[array, index] -> [value]`
    GetElement,
    /// `[value, array, index] -> []`
    SetElement,
    /// `[array, index] -> [address]`
    ElementAddress,
    /// `[length] -> [array]`. Operand: u16 element type constant
    NewArray,
    /// `[array] -> [length]`
    ArrayLength,

    // =========================================================================
    // Captured Objects
    // =========================================================================
    /// `[] -> [value]`. Operand: u16 captured index
    LoadCaptured,
    /// `[] -> [address]`. Operand: u16 captured index
    CapturedAddress,

    // =========================================================================
    // Indirect Access
    // =========================================================================
    /// `[address] -> [value]` for each width.
    LoadIndI8,
    LoadIndU8,
    LoadIndI16,
    LoadIndU16,
    LoadIndI32,
    LoadIndU32,
    LoadIndI64,
    LoadIndF32,
    LoadIndF64,
    LoadIndNative,
    LoadIndRef,
    /// `[address] -> [value]`. Operand: u16 type constant
    LoadObj,
    /// `[address, value] -> []` for each width.
    StoreIndI8,
    StoreIndI16,
    StoreIndI32,
    StoreIndI64,
    StoreIndF32,
    StoreIndF64,
    StoreIndNative,
    StoreIndRef,
    /// `[address, value] -> []`. Operand: u16 type constant
    StoreObj,
    /// `[destination, source] -> []`. Operand: u16 type constant
    CopyObj,

    // =========================================================================
    // Objects and Calls
    // =========================================================================
    /// `[value] -> [object]`. Operand: u16 type constant
    Box,
    /// `[object] -> [value]`. Operand: u16 type constant
    UnboxAny,
    /// `[reference] -> [reference]`, checked. Operand: u16 type constant
    Cast,
    /// `[args..] -> [instance]`. Operands: u16 constructor constant, u8 argc
    New,
    /// `[args..] -> [result?]`. Operands: u16 function constant, u8 argc
    Call,
    /// `[receiver, args..] -> [result?]`. Operands: u16 function constant, u8 argc
    CallMethod,
    /// `[value] -> []`, leaves the method.
    Return,
    /// Leaves a void method.
    ReturnVoid,

    // =========================================================================
    // Arithmetic and Logic
    // =========================================================================
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Neg,
    Not,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    BitAnd,
    BitOr,
    BitXor,

    // =========================================================================
    // Control Flow
    // =========================================================================
    /// Operand: u32 absolute target
    Jump,
    /// `[bool] -> []`. Operand: u32 absolute target
    JumpIfFalse,
    /// `[bool] -> []`. Operand: u32 absolute target
    JumpIfTrue,
}

impl OpCode {
    /// Decode a byte.
    #[inline]
    pub fn from_u8(byte: u8) -> Option<Self> {
        Self::try_from(byte).ok()
    }

    /// Number of operand bytes following the opcode.
    pub fn operand_size(&self) -> usize {
        match self {
            OpCode::Constant | OpCode::GetLocal | OpCode::SetLocal | OpCode::LocalAddress => 1,

            OpCode::ConstantWide
            | OpCode::GetLocalWide
            | OpCode::SetLocalWide
            | OpCode::LocalAddressWide
            | OpCode::GetArg
            | OpCode::SetArg
            | OpCode::ArgAddress
            | OpCode::GetField
            | OpCode::SetField
            | OpCode::FieldAddress
            | OpCode::GetStatic
            | OpCode::SetStatic
            | OpCode::StaticAddress
            | OpCode::NewArray
            | OpCode::LoadCaptured
            | OpCode::CapturedAddress
            | OpCode::LoadObj
            | OpCode::StoreObj
            | OpCode::CopyObj
            | OpCode::Box
            | OpCode::UnboxAny
            | OpCode::Cast => 2,

            OpCode::New | OpCode::Call | OpCode::CallMethod => 3,

            OpCode::Jump | OpCode::JumpIfFalse | OpCode::JumpIfTrue => 4,

            _ => 0,
        }
    }

    /// Whether the first operand is a constant pool index.
    pub fn uses_constant_pool(&self) -> bool {
        match self {
            OpCode::Constant | OpCode::ConstantWide | OpCode::New | OpCode::Call | OpCode::CallMethod => true,
            OpCode::GetLocalWide
            | OpCode::SetLocalWide
            | OpCode::LocalAddressWide
            | OpCode::GetArg
            | OpCode::SetArg
            | OpCode::ArgAddress
            | OpCode::LoadCaptured
            | OpCode::CapturedAddress => false,
            _ => self.operand_size() == 2,
        }
    }

    /// Whether execution never falls through to the next instruction.
    pub fn is_terminator(&self) -> bool {
        matches!(self, OpCode::Return | OpCode::ReturnVoid | OpCode::Jump)
    }

    /// Mnemonic used in disassembly.
    pub fn name(&self) -> &'static str {
        match self {
            OpCode::Constant => "CONSTANT",
            OpCode::ConstantWide => "CONSTANT_WIDE",
            OpCode::PushNull => "PUSH_NULL",
            OpCode::PushTrue => "PUSH_TRUE",
            OpCode::PushFalse => "PUSH_FALSE",
            OpCode::Nop => "NOP",
            OpCode::Pop => "POP",
            OpCode::Dup => "DUP",
            OpCode::Swap => "SWAP",
            OpCode::GetLocal => "GET_LOCAL",
            OpCode::SetLocal => "SET_LOCAL",
            OpCode::LocalAddress => "LOCAL_ADDRESS",
            OpCode::GetLocalWide => "GET_LOCAL_WIDE",
            OpCode::SetLocalWide => "SET_LOCAL_WIDE",
            OpCode::LocalAddressWide => "LOCAL_ADDRESS_WIDE",
            OpCode::GetArg => "GET_ARG",
            OpCode::SetArg => "SET_ARG",
            OpCode::ArgAddress => "ARG_ADDRESS",
            OpCode::GetField => "GET_FIELD",
            OpCode::SetField => "SET_FIELD",
            OpCode::FieldAddress => "FIELD_ADDRESS",
            OpCode::GetStatic => "GET_STATIC",
            OpCode::SetStatic => "SET_STATIC",
            OpCode::StaticAddress => "STATIC_ADDRESS",
            OpCode::GetElement => "GET_ELEMENT",
            OpCode::SetElement => "SET_ELEMENT",
            OpCode::ElementAddress => "ELEMENT_ADDRESS",
            OpCode::NewArray => "NEW_ARRAY",
            OpCode::ArrayLength => "ARRAY_LENGTH",
            OpCode::LoadCaptured => "LOAD_CAPTURED",
            OpCode::CapturedAddress => "CAPTURED_ADDRESS",
            OpCode::LoadIndI8 => "LOAD_IND_I8",
            OpCode::LoadIndU8 => "LOAD_IND_U8",
            OpCode::LoadIndI16 => "LOAD_IND_I16",
            OpCode::LoadIndU16 => "LOAD_IND_U16",
            OpCode::LoadIndI32 => "LOAD_IND_I32",
            OpCode::LoadIndU32 => "LOAD_IND_U32",
            OpCode::LoadIndI64 => "LOAD_IND_I64",
            OpCode::LoadIndF32 => "LOAD_IND_F32",
            OpCode::LoadIndF64 => "LOAD_IND_F64",
            OpCode::LoadIndNative => "LOAD_IND_NATIVE",
            OpCode::LoadIndRef => "LOAD_IND_REF",
            OpCode::LoadObj => "LOAD_OBJ",
            OpCode::StoreIndI8 => "STORE_IND_I8",
            OpCode::StoreIndI16 => "STORE_IND_I16",
            OpCode::StoreIndI32 => "STORE_IND_I32",
            OpCode::StoreIndI64 => "STORE_IND_I64",
            OpCode::StoreIndF32 => "STORE_IND_F32",
            OpCode::StoreIndF64 => "STORE_IND_F64",
            OpCode::StoreIndNative => "STORE_IND_NATIVE",
            OpCode::StoreIndRef => "STORE_IND_REF",
            OpCode::StoreObj => "STORE_OBJ",
            OpCode::CopyObj => "COPY_OBJ",
            OpCode::Box => "BOX",
            OpCode::UnboxAny => "UNBOX_ANY",
            OpCode::Cast => "CAST",
            OpCode::New => "NEW",
            OpCode::Call => "CALL",
            OpCode::CallMethod => "CALL_METHOD",
            OpCode::Return => "RETURN",
            OpCode::ReturnVoid => "RETURN_VOID",
            OpCode::Add => "ADD",
            OpCode::Sub => "SUB",
            OpCode::Mul => "MUL",
            OpCode::Div => "DIV",
            OpCode::Rem => "REM",
            OpCode::Neg => "NEG",
            OpCode::Not => "NOT",
            OpCode::Eq => "EQ",
            OpCode::Ne => "NE",
            OpCode::Lt => "LT",
            OpCode::Le => "LE",
            OpCode::Gt => "GT",
            OpCode::Ge => "GE",
            OpCode::BitAnd => "BIT_AND",
            OpCode::BitOr => "BIT_OR",
            OpCode::BitXor => "BIT_XOR",
            OpCode::Jump => "JUMP",
            OpCode::JumpIfFalse => "JUMP_IF_FALSE",
            OpCode::JumpIfTrue => "JUMP_IF_TRUE",
        }
    }
}
