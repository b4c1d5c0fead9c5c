//! Field entry.

use crate::{DataType, TypeHash};

/// Named storage declared on a type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEntry {
    /// Unqualified name.
    pub name: String,
    /// Field identity, `TypeHash::from_field(owner, name)`.
    pub hash: TypeHash,
    /// Declaring type.
    pub owner: TypeHash,
    /// Field type.
    pub data_type: DataType,
    /// Static fields have one slot per type rather than per instance.
    pub is_static: bool,
    /// Layout index among the instance fields of the owner, including
    /// inherited fields. Assigned at registration; meaningless for statics.
    pub index: u16,
}

impl FieldEntry {
    /// Create an instance field. The layout index is assigned on registration.
    pub fn instance(owner: TypeHash, name: impl Into<String>, data_type: DataType) -> Self {
        let name = name.into();
        Self {
            hash: TypeHash::from_field(owner, &name),
            name,
            owner,
            data_type,
            is_static: false,
            index: 0,
        }
    }

    /// Create a static field.
    pub fn static_field(owner: TypeHash, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            is_static: true,
            ..Self::instance(owner, name, data_type)
        }
    }
}
