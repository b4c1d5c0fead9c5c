//! Shared fixtures for the integration tests.
//!
//! One registry covers every scenario: a `Program` type holding the static
//! methods under test, a `Vec2` aggregate, and `Meters`/`Feet` value types
//! with both an operator and a constructor between them.

#![allow(dead_code)]

use stacksym::codegen::{BytecodeChunk, OpCode};
use stacksym::core::{
    ConversionOperator, DataType, FunctionEntry, Param, RefModifier, TypeEntry, TypeHash,
    primitives,
};
use stacksym::registry::TypeRegistry;

pub fn program() -> TypeHash {
    TypeHash::from_name("Program")
}

pub fn vec2() -> TypeHash {
    TypeHash::from_name("Vec2")
}

pub fn meters() -> TypeHash {
    TypeHash::from_name("Meters")
}

pub fn feet() -> TypeHash {
    TypeHash::from_name("Feet")
}

/// Hash of a static method declared on `Program`.
pub fn program_method(name: &str, params: &[TypeHash]) -> TypeHash {
    TypeHash::from_method(program(), name, params)
}

pub fn vec2_constructor() -> TypeHash {
    TypeHash::from_constructor(vec2(), &[primitives::DOUBLE, primitives::DOUBLE])
}

pub fn feet_operator() -> TypeHash {
    TypeHash::from_operator(
        feet(),
        ConversionOperator::Implicit.method_name(),
        &[meters()],
        feet(),
    )
}

pub fn feet_constructor() -> TypeHash {
    TypeHash::from_constructor(feet(), &[meters()])
}

fn simple(hash: TypeHash) -> DataType {
    DataType::simple(hash)
}

fn static_method(
    registry: &mut TypeRegistry,
    name: &str,
    params: Vec<Param>,
    return_type: DataType,
) {
    registry
        .register_function(FunctionEntry::static_method(
            program(),
            name,
            params,
            return_type,
        ))
        .unwrap();
}

pub fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::with_primitives();
    registry.register_type(TypeEntry::reference("Program")).unwrap();
    let vec2 = registry
        .register_type(
            TypeEntry::value("Vec2", 16, 8)
                .with_field("x", simple(primitives::DOUBLE))
                .with_field("y", simple(primitives::DOUBLE)),
        )
        .unwrap();
    registry
        .register_function(FunctionEntry::constructor(
            vec2,
            vec![
                Param::new("x", simple(primitives::DOUBLE)),
                Param::new("y", simple(primitives::DOUBLE)),
            ],
        ))
        .unwrap();

    let meters = registry
        .register_type(
            TypeEntry::value("Meters", 8, 8).with_field("value", simple(primitives::DOUBLE)),
        )
        .unwrap();
    let feet = registry
        .register_type(
            TypeEntry::value("Feet", 8, 8).with_field("value", simple(primitives::DOUBLE)),
        )
        .unwrap();
    registry
        .register_function(FunctionEntry::conversion(
            feet,
            ConversionOperator::Implicit,
            Param::new("m", simple(meters)),
            simple(feet),
        ))
        .unwrap();
    registry
        .register_function(FunctionEntry::constructor(
            feet,
            vec![Param::new("m", simple(meters))],
        ))
        .unwrap();

    static_method(
        &mut registry,
        "copy_direct",
        vec![Param::new("v", simple(vec2))],
        simple(vec2),
    );
    static_method(
        &mut registry,
        "copy_stack",
        vec![Param::new("v", simple(vec2))],
        simple(vec2),
    );
    static_method(
        &mut registry,
        "round_trip",
        vec![Param::new("n", simple(primitives::INT32))],
        simple(primitives::INT32),
    );
    static_method(
        &mut registry,
        "count_to",
        vec![Param::new("limit", simple(primitives::INT32))],
        simple(primitives::INT32),
    );
    static_method(
        &mut registry,
        "to_feet",
        vec![Param::new("m", simple(meters))],
        simple(feet),
    );
    static_method(
        &mut registry,
        "make_x",
        vec![
            Param::new("x", simple(primitives::DOUBLE)),
            Param::new("y", simple(primitives::DOUBLE)),
        ],
        simple(primitives::DOUBLE),
    );
    static_method(
        &mut registry,
        "build",
        vec![
            Param::new("x", simple(primitives::DOUBLE)),
            Param::new("y", simple(primitives::DOUBLE)),
        ],
        simple(vec2),
    );
    static_method(
        &mut registry,
        "scale",
        vec![
            Param::with_modifier("target", simple(vec2), RefModifier::InOut),
            Param::with_modifier("factor", simple(primitives::DOUBLE), RefModifier::In),
        ],
        DataType::void(),
    );
    static_method(&mut registry, "main", vec![], DataType::void());
    registry
}

/// Absolute target of the jump instruction at `offset`.
pub fn jump_target(chunk: &BytecodeChunk, offset: usize) -> u32 {
    chunk.read_u32(offset + 1).unwrap()
}

/// Offsets of every instruction with opcode `op`.
pub fn offsets_of(chunk: &BytecodeChunk, op: OpCode) -> Vec<usize> {
    chunk
        .instructions()
        .filter(|(_, candidate)| *candidate == op)
        .map(|(offset, _)| offset)
        .collect()
}
