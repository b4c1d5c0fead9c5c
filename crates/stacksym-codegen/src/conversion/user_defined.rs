//! User-defined conversion operator lookup.

use stacksym_core::{ConversionOperator, FunctionEntry, TypeHash};
use stacksym_registry::TypeRegistry;

/// Search order within one declaring type.
const OPERATOR_ORDER: [ConversionOperator; 2] =
    [ConversionOperator::Explicit, ConversionOperator::Implicit];

/// Find an operator declared on `declaring` taking exactly `from` and
/// returning exactly `to`. Explicit operators win over implicit ones.
pub(crate) fn find_user_operator(
    registry: &TypeRegistry,
    declaring: TypeHash,
    from: TypeHash,
    to: TypeHash,
) -> Option<(&FunctionEntry, ConversionOperator)> {
    OPERATOR_ORDER.into_iter().find_map(|operator| {
        registry
            .find_conversion_operator(declaring, operator, from, to)
            .map(|function| (function, operator))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stacksym_core::{DataType, Param, TypeEntry, primitives};

    fn celsius_registry(with_explicit: bool) -> TypeRegistry {
        let mut registry = TypeRegistry::with_primitives();
        let celsius = registry
            .register_type(TypeEntry::value("Celsius", 8, 8))
            .unwrap();
        let from = || Param::new("value", DataType::simple(celsius));
        registry
            .register_function(FunctionEntry::conversion(
                celsius,
                ConversionOperator::Implicit,
                from(),
                DataType::simple(primitives::DOUBLE),
            ))
            .unwrap();
        if with_explicit {
            registry
                .register_function(FunctionEntry::conversion(
                    celsius,
                    ConversionOperator::Explicit,
                    from(),
                    DataType::simple(primitives::DOUBLE),
                ))
                .unwrap();
        }
        registry
    }

    #[test]
    fn explicit_preferred() {
        let registry = celsius_registry(true);
        let celsius = TypeHash::from_name("Celsius");
        let (_, operator) =
            find_user_operator(&registry, celsius, celsius, primitives::DOUBLE).unwrap();
        assert_eq!(operator, ConversionOperator::Explicit);
    }

    #[test]
    fn implicit_used_when_alone() {
        let registry = celsius_registry(false);
        let celsius = TypeHash::from_name("Celsius");
        let (function, operator) =
            find_user_operator(&registry, celsius, celsius, primitives::DOUBLE).unwrap();
        assert_eq!(operator, ConversionOperator::Implicit);
        assert_eq!(function.name, "op_Implicit");
    }

    #[test]
    fn return_type_must_match_exactly() {
        let registry = celsius_registry(true);
        let celsius = TypeHash::from_name("Celsius");
        assert!(find_user_operator(&registry, celsius, celsius, primitives::FLOAT).is_none());
    }
}
