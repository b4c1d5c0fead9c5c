//! Type entry.

use crate::{DataType, FieldEntry, PrimitiveKind, TypeHash, TypeKind};

/// Registry entry for a type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeEntry {
    /// Qualified name.
    pub name: String,
    /// Type identity.
    pub type_hash: TypeHash,
    /// Memory semantics.
    pub kind: TypeKind,
    /// Base class (reference types only).
    pub base: Option<TypeHash>,
    /// Declared fields, instance and static.
    pub fields: Vec<FieldEntry>,
    /// Method hashes.
    pub methods: Vec<TypeHash>,
    /// Constructor hashes.
    pub constructors: Vec<TypeHash>,
    /// Conversion operator hashes.
    pub operators: Vec<TypeHash>,
}

impl TypeEntry {
    /// Create an entry with no members.
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        let name = name.into();
        Self {
            type_hash: TypeHash::from_name(&name),
            name,
            kind,
            base: None,
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            operators: Vec::new(),
        }
    }

    /// Entry for a built-in primitive.
    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self::new(kind.name(), TypeKind::Primitive(kind))
    }

    /// A reference (class) type.
    pub fn reference(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Reference)
    }

    /// An aggregate value type.
    pub fn value(name: impl Into<String>, size: usize, align: usize) -> Self {
        Self::new(name, TypeKind::Value { size, align })
    }

    /// A one-dimensional array of `element`, named `<element>[]`.
    pub fn array(element_name: &str, element: TypeHash) -> Self {
        let mut entry = Self::new(format!("{element_name}[]"), TypeKind::Array { element });
        entry.type_hash = TypeHash::array_of(element);
        entry
    }

    /// Set the base class.
    pub fn with_base(mut self, base: TypeHash) -> Self {
        self.base = Some(base);
        self
    }

    /// Add an instance field.
    pub fn with_field(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.fields
            .push(FieldEntry::instance(self.type_hash, name, data_type));
        self
    }

    /// Add a static field.
    pub fn with_static_field(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.fields
            .push(FieldEntry::static_field(self.type_hash, name, data_type));
        self
    }

    /// Instance fields declared directly on this type.
    pub fn instance_fields(&self) -> impl Iterator<Item = &FieldEntry> {
        self.fields.iter().filter(|f| !f.is_static)
    }

    pub fn is_value_type(&self) -> bool {
        self.kind.is_value_type()
    }

    pub fn is_reference_type(&self) -> bool {
        self.kind.is_reference_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;

    #[test]
    fn fields_are_owned_by_entry() {
        let point = TypeEntry::value("Point", 8, 4)
            .with_field("x", DataType::simple(primitives::INT32))
            .with_field("y", DataType::simple(primitives::INT32))
            .with_static_field("origin_count", DataType::simple(primitives::INT32));

        assert_eq!(point.fields.len(), 3);
        assert_eq!(point.instance_fields().count(), 2);
        assert!(point.fields.iter().all(|f| f.owner == point.type_hash));
    }

    #[test]
    fn array_entry_uses_array_hash() {
        let entry = TypeEntry::array("int32", primitives::INT32);
        assert_eq!(entry.type_hash, TypeHash::array_of(primitives::INT32));
        assert_eq!(entry.name, "int32[]");
        assert!(entry.is_reference_type());
    }

    #[test]
    fn primitive_entry_hash_matches_constant() {
        let entry = TypeEntry::primitive(PrimitiveKind::Double);
        assert_eq!(entry.type_hash, primitives::DOUBLE);
    }
}
