//! TypeRegistry - types, fields and functions by hash.
//!
//! # Storage Model
//!
//! - **Types**: every [`TypeEntry`] in one map keyed by `TypeHash`, plus a
//!   name index.
//! - **Fields**: every declared field keyed by its field hash, with layout
//!   indexes assigned at registration.
//! - **Functions**: methods, constructors and conversion operators in one
//!   map. Types reference their members by hash.
//! - **Operator indexes**: built lazily per type on first lookup and dropped
//!   whenever a function is registered on that type.
//!
//! # Thread Safety
//!
//! `TypeRegistry` is not thread-safe. It is populated up front and then
//! shared by reference with every code-generation context.
//!
//! # Example
//!
//! ```
//! use stacksym_registry::TypeRegistry;
//! use stacksym_core::primitives;
//!
//! let registry = TypeRegistry::with_primitives();
//! assert!(registry.is_value_type(primitives::INT32));
//! assert!(registry.is_reference_type(primitives::OBJECT));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use stacksym_core::{
    ConversionOperator, DataType, FieldEntry, FunctionEntry, FunctionKind, Indirection,
    PrimitiveKind, RegistrationError, TypeEntry, TypeHash, TypeKind, primitives,
};
use tracing::trace;

use crate::OperatorIndex;

/// Type and function registry consumed by code generation.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    /// Types by hash.
    types: FxHashMap<TypeHash, TypeEntry>,

    /// Name -> hash.
    type_names: FxHashMap<String, TypeHash>,

    /// Fields by field hash.
    fields: FxHashMap<TypeHash, FieldEntry>,

    /// Functions by hash.
    functions: FxHashMap<TypeHash, FunctionEntry>,

    /// Lazily built operator/constructor indexes.
    operator_indexes: RefCell<FxHashMap<TypeHash, Rc<OperatorIndex>>>,
}

impl TypeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all primitives, `object` and `string`
    /// pre-registered.
    pub fn with_primitives() -> Self {
        let mut registry = Self::new();
        registry.register_all_primitives();
        registry
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register every built-in type. Already registered built-ins are skipped.
    pub fn register_all_primitives(&mut self) {
        for kind in PrimitiveKind::ALL {
            self.insert_builtin(TypeEntry::primitive(kind));
        }
        self.insert_builtin(TypeEntry::new("object", TypeKind::Object));
        self.insert_builtin(TypeEntry::reference("string"));
    }

    fn insert_builtin(&mut self, entry: TypeEntry) {
        if !self.types.contains_key(&entry.type_hash) {
            self.type_names.insert(entry.name.clone(), entry.type_hash);
            self.types.insert(entry.type_hash, entry);
        }
    }

    /// Register a type together with its declared fields.
    ///
    /// Instance fields are numbered after every instance field inherited
    /// from the base chain.
    pub fn register_type(&mut self, mut entry: TypeEntry) -> Result<TypeHash, RegistrationError> {
        let hash = entry.type_hash;
        if self.types.contains_key(&hash) || self.type_names.contains_key(&entry.name) {
            return Err(RegistrationError::DuplicateType(entry.name));
        }

        if let Some(base) = entry.base {
            if !entry.is_reference_type() {
                return Err(RegistrationError::InvalidType(format!(
                    "value type '{}' cannot have a base type",
                    entry.name
                )));
            }
            if !self.types.contains_key(&base) {
                return Err(RegistrationError::InvalidType(format!(
                    "base type of '{}' is not registered",
                    entry.name
                )));
            }
        }

        for (i, field) in entry.fields.iter().enumerate() {
            if entry.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(RegistrationError::InvalidType(format!(
                    "field '{}' declared twice on '{}'",
                    field.name, entry.name
                )));
            }
        }

        let mut next_index = entry.base.map_or(0, |base| self.instance_field_count(base));
        for field in entry.fields.iter_mut() {
            field.owner = hash;
            field.hash = TypeHash::from_field(hash, &field.name);
            if !field.is_static {
                field.index = next_index;
                next_index += 1;
            }
            self.fields.insert(field.hash, field.clone());
        }

        trace!(name = %entry.name, fields = entry.fields.len(), "registered type");
        self.type_names.insert(entry.name.clone(), hash);
        self.types.insert(hash, entry);
        Ok(hash)
    }

    /// Register a method, constructor or conversion operator.
    pub fn register_function(&mut self, entry: FunctionEntry) -> Result<TypeHash, RegistrationError> {
        let hash = entry.hash;
        if self.functions.contains_key(&hash) {
            return Err(RegistrationError::DuplicateFunction(entry.name));
        }

        if let Some(owner_hash) = entry.owner {
            let owner = self
                .types
                .get_mut(&owner_hash)
                .ok_or_else(|| RegistrationError::UnknownOwner {
                    member: entry.name.clone(),
                })?;
            match entry.kind {
                FunctionKind::Method => owner.methods.push(hash),
                FunctionKind::Constructor => owner.constructors.push(hash),
                FunctionKind::Conversion(_) => owner.operators.push(hash),
            }
            self.operator_indexes.borrow_mut().remove(&owner_hash);
        }

        self.functions.insert(hash, entry);
        Ok(hash)
    }

    /// Register the array type of `element`, returning its hash.
    ///
    /// Registering the same array twice returns the existing hash.
    pub fn register_array(&mut self, element: TypeHash) -> Result<TypeHash, RegistrationError> {
        let hash = TypeHash::array_of(element);
        if self.types.contains_key(&hash) {
            return Ok(hash);
        }
        let element_name = self
            .types
            .get(&element)
            .map(|e| e.name.clone())
            .ok_or_else(|| RegistrationError::InvalidType(format!("array of unknown {element}")))?;
        self.register_type(TypeEntry::array(&element_name, element))
    }

    // ==========================================================================
    // Type Lookup
    // ==========================================================================

    /// Get a type by hash.
    pub fn get(&self, hash: TypeHash) -> Option<&TypeEntry> {
        self.types.get(&hash)
    }

    /// Get a type by name.
    pub fn get_by_name(&self, name: &str) -> Option<&TypeEntry> {
        self.type_names.get(name).and_then(|h| self.types.get(h))
    }

    pub fn contains_type(&self, hash: TypeHash) -> bool {
        self.types.contains_key(&hash)
    }

    /// Memory semantics of a type.
    pub fn kind(&self, hash: TypeHash) -> Option<&TypeKind> {
        self.types.get(&hash).map(|e| &e.kind)
    }

    /// Name of a type, or its hash when unregistered.
    pub fn type_name(&self, hash: TypeHash) -> String {
        self.types
            .get(&hash)
            .map_or_else(|| hash.to_string(), |e| e.name.clone())
    }

    /// Human readable form of a data type, e.g. `Point&`.
    pub fn describe(&self, data_type: DataType) -> String {
        let name = self.type_name(data_type.type_hash);
        match data_type.indirection {
            Indirection::None => name,
            Indirection::ByRef => format!("{name}&"),
            Indirection::Pointer => format!("{name}*"),
        }
    }

    pub fn is_value_type(&self, hash: TypeHash) -> bool {
        self.kind(hash).is_some_and(TypeKind::is_value_type)
    }

    pub fn is_reference_type(&self, hash: TypeHash) -> bool {
        self.kind(hash).is_some_and(TypeKind::is_reference_type)
    }

    /// Non-primitive value type.
    pub fn is_aggregate(&self, hash: TypeHash) -> bool {
        self.kind(hash).is_some_and(TypeKind::is_aggregate)
    }

    pub fn primitive_kind(&self, hash: TypeHash) -> Option<PrimitiveKind> {
        self.kind(hash).and_then(TypeKind::as_primitive)
    }

    /// Element type of an array type.
    pub fn array_element(&self, hash: TypeHash) -> Option<TypeHash> {
        match self.kind(hash) {
            Some(TypeKind::Array { element }) => Some(*element),
            _ => None,
        }
    }

    /// Iterate `hash` and its ancestors, nearest first.
    pub fn base_chain(&self, hash: TypeHash) -> impl Iterator<Item = &TypeEntry> {
        std::iter::successors(self.types.get(&hash), |entry| {
            entry.base.and_then(|base| self.types.get(&base))
        })
    }

    /// Whether a value of `from` may be stored into a slot of `to` without
    /// conversion: identical types, or reference types where `to` is
    /// `object` or an ancestor of `from`.
    pub fn is_assignable_to(&self, from: TypeHash, to: TypeHash) -> bool {
        if from == to {
            return true;
        }
        if !self.is_reference_type(from) || !self.is_reference_type(to) {
            return false;
        }
        to == primitives::OBJECT || self.base_chain(from).any(|e| e.type_hash == to)
    }

    fn instance_field_count(&self, hash: TypeHash) -> u16 {
        self.base_chain(hash)
            .map(|e| e.instance_fields().count() as u16)
            .sum()
    }

    // ==========================================================================
    // Member Lookup
    // ==========================================================================

    /// Find a field by name on `owner` or any of its ancestors.
    pub fn field(&self, owner: TypeHash, name: &str) -> Option<&FieldEntry> {
        self.base_chain(owner)
            .find_map(|e| self.fields.get(&TypeHash::from_field(e.type_hash, name)))
    }

    /// Get a field by its field hash.
    pub fn field_by_hash(&self, hash: TypeHash) -> Option<&FieldEntry> {
        self.fields.get(&hash)
    }

    /// Get a function by hash.
    pub fn get_function(&self, hash: TypeHash) -> Option<&FunctionEntry> {
        self.functions.get(&hash)
    }

    /// Find a method by exact signature on `owner` or its ancestors.
    pub fn find_method(
        &self,
        owner: TypeHash,
        name: &str,
        params: &[TypeHash],
    ) -> Option<&FunctionEntry> {
        self.base_chain(owner).find_map(|e| {
            self.functions
                .get(&TypeHash::from_method(e.type_hash, name, params))
        })
    }

    /// Operator/constructor index of `owner`, built on first request.
    pub fn operator_index(&self, owner: TypeHash) -> Rc<OperatorIndex> {
        if let Some(index) = self.operator_indexes.borrow().get(&owner) {
            return Rc::clone(index);
        }

        let functions = self.types.get(&owner).into_iter().flat_map(|e| {
            e.operators
                .iter()
                .chain(e.constructors.iter())
                .filter_map(|h| self.functions.get(h))
        });
        let index = Rc::new(OperatorIndex::build(functions));
        trace!(
            owner = %self.type_name(owner),
            conversions = index.conversion_count(),
            constructors = index.constructor_count(),
            "built operator index"
        );
        self.operator_indexes
            .borrow_mut()
            .insert(owner, Rc::clone(&index));
        index
    }

    /// Conversion operator declared on `declaring` with exactly parameter
    /// `from` and return `to`.
    pub fn find_conversion_operator(
        &self,
        declaring: TypeHash,
        operator: ConversionOperator,
        from: TypeHash,
        to: TypeHash,
    ) -> Option<&FunctionEntry> {
        self.operator_index(declaring)
            .conversion(operator, from, to)
            .and_then(|h| self.functions.get(&h))
    }

    /// Constructor of `owner` with exactly these parameter types.
    pub fn find_constructor(&self, owner: TypeHash, params: &[TypeHash]) -> Option<&FunctionEntry> {
        self.operator_index(owner)
            .constructor(params)
            .and_then(|h| self.functions.get(&h))
    }

    // ==========================================================================
    // Statistics
    // ==========================================================================

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    #[cfg(test)]
    fn cached_index_count(&self) -> usize {
        self.operator_indexes.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stacksym_core::Param;

    fn shapes() -> TypeRegistry {
        let mut registry = TypeRegistry::with_primitives();
        registry
            .register_type(
                TypeEntry::reference("Shape").with_field("id", DataType::simple(primitives::INT32)),
            )
            .unwrap();
        registry
            .register_type(
                TypeEntry::reference("Circle")
                    .with_base(TypeHash::from_name("Shape"))
                    .with_field("radius", DataType::simple(primitives::DOUBLE))
                    .with_static_field("count", DataType::simple(primitives::INT32)),
            )
            .unwrap();
        registry
    }

    #[test]
    fn register_all_primitives() {
        let registry = TypeRegistry::with_primitives();
        // 15 primitives + object + string
        assert_eq!(registry.type_count(), 17);
        assert!(registry.get(primitives::VOID).is_some());
        assert_eq!(
            registry.primitive_kind(primitives::UINT16),
            Some(PrimitiveKind::Uint16)
        );
        assert!(registry.get_by_name("float64").is_some());
    }

    #[test]
    fn duplicate_type_rejected() {
        let mut registry = TypeRegistry::new();
        registry.register_type(TypeEntry::reference("Player")).unwrap();
        let err = registry.register_type(TypeEntry::reference("Player")).unwrap_err();
        assert_eq!(err, RegistrationError::DuplicateType("Player".into()));
    }

    #[test]
    fn field_indexes_follow_base_chain() {
        let registry = shapes();
        let circle = TypeHash::from_name("Circle");

        let id = registry.field(circle, "id").unwrap();
        let radius = registry.field(circle, "radius").unwrap();
        assert_eq!(id.index, 0);
        assert_eq!(radius.index, 1);
        assert_eq!(id.owner, TypeHash::from_name("Shape"));
        assert!(registry.field(circle, "count").unwrap().is_static);
        assert!(registry.field(circle, "missing").is_none());
    }

    #[test]
    fn reference_assignability() {
        let registry = shapes();
        let circle = TypeHash::from_name("Circle");
        let shape = TypeHash::from_name("Shape");

        assert!(registry.is_assignable_to(circle, shape));
        assert!(registry.is_assignable_to(circle, primitives::OBJECT));
        assert!(!registry.is_assignable_to(shape, circle));
        assert!(!registry.is_assignable_to(primitives::INT32, primitives::OBJECT));
        assert!(registry.is_assignable_to(primitives::INT32, primitives::INT32));
    }

    #[test]
    fn value_type_cannot_have_base() {
        let mut registry = shapes();
        let err = registry
            .register_type(TypeEntry::value("Bad", 4, 4).with_base(TypeHash::from_name("Shape")))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidType(_)));
    }

    #[test]
    fn function_requires_owner() {
        let mut registry = TypeRegistry::with_primitives();
        let method = FunctionEntry::method(
            TypeHash::from_name("Ghost"),
            "haunt",
            vec![],
            DataType::void(),
        );
        let err = registry.register_function(method).unwrap_err();
        assert!(matches!(err, RegistrationError::UnknownOwner { .. }));
    }

    #[test]
    fn operator_index_is_cached_and_invalidated() {
        let mut registry = TypeRegistry::with_primitives();
        let meters = registry.register_type(TypeEntry::value("Meters", 8, 8)).unwrap();

        let explicit = FunctionEntry::conversion(
            meters,
            ConversionOperator::Explicit,
            Param::new("m", DataType::simple(meters)),
            DataType::simple(primitives::DOUBLE),
        );
        registry.register_function(explicit.clone()).unwrap();

        let found = registry
            .find_conversion_operator(
                meters,
                ConversionOperator::Explicit,
                meters,
                primitives::DOUBLE,
            )
            .unwrap();
        assert_eq!(found.hash, explicit.hash);
        assert_eq!(registry.cached_index_count(), 1);

        let ctor = FunctionEntry::constructor(
            meters,
            vec![Param::new("value", DataType::simple(primitives::DOUBLE))],
        );
        registry.register_function(ctor.clone()).unwrap();
        assert_eq!(registry.cached_index_count(), 0);

        assert_eq!(
            registry
                .find_constructor(meters, &[primitives::DOUBLE])
                .map(|f| f.hash),
            Some(ctor.hash)
        );
    }

    #[test]
    fn register_array_is_idempotent() {
        let mut registry = TypeRegistry::with_primitives();
        let first = registry.register_array(primitives::INT32).unwrap();
        let second = registry.register_array(primitives::INT32).unwrap();
        assert_eq!(first, second);
        assert_eq!(registry.array_element(first), Some(primitives::INT32));
        assert_eq!(registry.type_name(first), "int32[]");
    }

    #[test]
    fn describe_indirection() {
        let registry = TypeRegistry::with_primitives();
        assert_eq!(registry.describe(DataType::by_ref(primitives::INT32)), "int32&");
        assert_eq!(registry.describe(DataType::pointer(primitives::UINT8)), "uint8*");
    }

    #[test]
    fn find_method_searches_bases() {
        let mut registry = shapes();
        let shape = TypeHash::from_name("Shape");
        let area = FunctionEntry::method(shape, "area", vec![], DataType::simple(primitives::DOUBLE));
        registry.register_function(area.clone()).unwrap();

        let found = registry
            .find_method(TypeHash::from_name("Circle"), "area", &[])
            .unwrap();
        assert_eq!(found.hash, area.hash);
    }
}
