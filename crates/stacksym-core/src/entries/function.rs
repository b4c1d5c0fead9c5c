//! Function entries: methods, constructors and conversion operators.

use std::fmt;

use crate::{DataType, RefModifier, TypeHash};

/// A declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Parameter name (diagnostics only).
    pub name: String,
    /// Declared type, without indirection.
    pub data_type: DataType,
    /// Passing mode.
    pub ref_modifier: RefModifier,
}

impl Param {
    /// A by-value parameter.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            ref_modifier: RefModifier::None,
        }
    }

    /// A parameter with an explicit passing mode.
    pub fn with_modifier(
        name: impl Into<String>,
        data_type: DataType,
        ref_modifier: RefModifier,
    ) -> Self {
        Self {
            name: name.into(),
            data_type,
            ref_modifier,
        }
    }

    /// The type of the argument slot as seen from inside the callee.
    ///
    /// Reference parameters hold an address, so their slot is by-reference.
    pub fn slot_type(&self) -> DataType {
        if self.ref_modifier.is_reference() {
            self.data_type.make_by_ref()
        } else {
            self.data_type
        }
    }
}

/// Which user-defined conversion operator a function implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionOperator {
    /// `op_Explicit`
    Explicit,
    /// `op_Implicit`
    Implicit,
}

impl ConversionOperator {
    /// Operator method name as declared on the type.
    pub const fn method_name(self) -> &'static str {
        match self {
            ConversionOperator::Explicit => "op_Explicit",
            ConversionOperator::Implicit => "op_Implicit",
        }
    }
}

impl fmt::Display for ConversionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

/// What a function entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    /// Ordinary method or free function.
    Method,
    /// Instance constructor.
    Constructor,
    /// Static conversion operator taking one argument.
    Conversion(ConversionOperator),
}

/// Registry entry for a function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionEntry {
    /// Function identity.
    pub hash: TypeHash,
    /// Unqualified name.
    pub name: String,
    /// Declaring type, `None` for free functions.
    pub owner: Option<TypeHash>,
    /// Declared parameters, excluding the receiver.
    pub params: Vec<Param>,
    /// Return type.
    pub return_type: DataType,
    /// Static functions take no receiver.
    pub is_static: bool,
    /// Method, constructor or operator.
    pub kind: FunctionKind,
}

impl FunctionEntry {
    /// An instance method.
    pub fn method(
        owner: TypeHash,
        name: impl Into<String>,
        params: Vec<Param>,
        return_type: DataType,
    ) -> Self {
        let name = name.into();
        let param_hashes: Vec<_> = params.iter().map(|p| p.data_type.type_hash).collect();
        Self {
            hash: TypeHash::from_method(owner, &name, &param_hashes),
            name,
            owner: Some(owner),
            params,
            return_type,
            is_static: false,
            kind: FunctionKind::Method,
        }
    }

    /// A static method declared on `owner`.
    pub fn static_method(
        owner: TypeHash,
        name: impl Into<String>,
        params: Vec<Param>,
        return_type: DataType,
    ) -> Self {
        Self {
            is_static: true,
            ..Self::method(owner, name, params, return_type)
        }
    }

    /// A free function.
    pub fn function(name: impl Into<String>, params: Vec<Param>, return_type: DataType) -> Self {
        let name = name.into();
        let param_hashes: Vec<_> = params.iter().map(|p| p.data_type.type_hash).collect();
        Self {
            hash: TypeHash::from_function(&name, &param_hashes),
            name,
            owner: None,
            params,
            return_type,
            is_static: true,
            kind: FunctionKind::Method,
        }
    }

    /// An instance constructor of `owner`.
    pub fn constructor(owner: TypeHash, params: Vec<Param>) -> Self {
        let param_hashes: Vec<_> = params.iter().map(|p| p.data_type.type_hash).collect();
        Self {
            hash: TypeHash::from_constructor(owner, &param_hashes),
            name: ".ctor".to_string(),
            owner: Some(owner),
            params,
            return_type: DataType::void(),
            is_static: false,
            kind: FunctionKind::Constructor,
        }
    }

    /// A static conversion operator declared on `owner`, converting `from`
    /// into `to`.
    pub fn conversion(
        owner: TypeHash,
        operator: ConversionOperator,
        from: Param,
        to: DataType,
    ) -> Self {
        let name = operator.method_name();
        Self {
            hash: TypeHash::from_operator(owner, name, &[from.data_type.type_hash], to.type_hash),
            name: name.to_string(),
            owner: Some(owner),
            params: vec![from],
            return_type: to,
            is_static: true,
            kind: FunctionKind::Conversion(operator),
        }
    }

    /// Parameter type hashes, in order.
    pub fn param_hashes(&self) -> Vec<TypeHash> {
        self.params.iter().map(|p| p.data_type.type_hash).collect()
    }

    /// Number of values the call consumes, including the receiver.
    pub fn stack_arity(&self) -> usize {
        self.params.len() + usize::from(!self.is_static)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;

    #[test]
    fn conversion_operator_hash_depends_on_direction() {
        let celsius = TypeHash::from_name("Celsius");
        let to_double = FunctionEntry::conversion(
            celsius,
            ConversionOperator::Explicit,
            Param::new("value", DataType::simple(celsius)),
            DataType::simple(primitives::DOUBLE),
        );
        let from_double = FunctionEntry::conversion(
            celsius,
            ConversionOperator::Explicit,
            Param::new("value", DataType::simple(primitives::DOUBLE)),
            DataType::simple(celsius),
        );
        assert_ne!(to_double.hash, from_double.hash);
        assert!(to_double.is_static);
    }

    #[test]
    fn explicit_and_implicit_are_distinct() {
        let owner = TypeHash::from_name("Meters");
        let param = Param::new("value", DataType::simple(owner));
        let explicit = FunctionEntry::conversion(
            owner,
            ConversionOperator::Explicit,
            param.clone(),
            DataType::simple(primitives::DOUBLE),
        );
        let implicit = FunctionEntry::conversion(
            owner,
            ConversionOperator::Implicit,
            param,
            DataType::simple(primitives::DOUBLE),
        );
        assert_ne!(explicit.hash, implicit.hash);
    }

    #[test]
    fn reference_param_slot_is_by_ref() {
        let param = Param::with_modifier(
            "out_value",
            DataType::simple(primitives::INT32),
            RefModifier::Out,
        );
        assert!(param.slot_type().is_by_ref());
        assert!(!Param::new("v", DataType::simple(primitives::INT32))
            .slot_type()
            .is_by_ref());
    }

    #[test]
    fn stack_arity_counts_receiver() {
        let owner = TypeHash::from_name("Counter");
        let method = FunctionEntry::method(
            owner,
            "add",
            vec![Param::new("amount", DataType::simple(primitives::INT32))],
            DataType::void(),
        );
        assert_eq!(method.stack_arity(), 2);
        let ctor = FunctionEntry::constructor(owner, vec![]);
        assert_eq!(ctor.kind, FunctionKind::Constructor);
    }
}
