//! Per-type index of conversion operators and constructors.

use rustc_hash::FxHashMap;
use stacksym_core::{ConversionOperator, FunctionEntry, FunctionKind, TypeHash};

/// Operators and constructors declared on one type, keyed by signature.
///
/// Built on first request by [`TypeRegistry::operator_index`] and cached
/// until a function is registered on the type.
///
/// [`TypeRegistry::operator_index`]: crate::TypeRegistry::operator_index
#[derive(Debug, Default)]
pub struct OperatorIndex {
    /// `(operator, parameter, return)` -> function hash.
    conversions: FxHashMap<(ConversionOperator, TypeHash, TypeHash), TypeHash>,
    /// Parameter hashes -> constructor hash.
    constructors: FxHashMap<Vec<TypeHash>, TypeHash>,
}

impl OperatorIndex {
    /// Index the given functions of a single type.
    pub fn build<'a>(functions: impl IntoIterator<Item = &'a FunctionEntry>) -> Self {
        let mut index = Self::default();
        for func in functions {
            match func.kind {
                FunctionKind::Conversion(op) => {
                    if let [param] = func.params.as_slice() {
                        index.conversions.insert(
                            (op, param.data_type.type_hash, func.return_type.type_hash),
                            func.hash,
                        );
                    }
                }
                FunctionKind::Constructor => {
                    index.constructors.insert(func.param_hashes(), func.hash);
                }
                FunctionKind::Method => {}
            }
        }
        index
    }

    /// Conversion operator with exactly this parameter and return type.
    pub fn conversion(
        &self,
        operator: ConversionOperator,
        from: TypeHash,
        to: TypeHash,
    ) -> Option<TypeHash> {
        self.conversions.get(&(operator, from, to)).copied()
    }

    /// Constructor with exactly these parameter types.
    pub fn constructor(&self, params: &[TypeHash]) -> Option<TypeHash> {
        self.constructors.get(params).copied()
    }

    pub fn conversion_count(&self) -> usize {
        self.conversions.len()
    }

    pub fn constructor_count(&self) -> usize {
        self.constructors.len()
    }
}
