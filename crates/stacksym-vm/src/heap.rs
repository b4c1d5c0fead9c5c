//! Object heap.
//!
//! Reference-type instances, arrays and boxed values all live here. Objects
//! are never freed; a machine's heap lives as long as the machine.

use std::fmt;

use stacksym_core::TypeHash;

use crate::error::VmError;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj#{}", self.0)
    }
}

/// A heap object. Reference types and arrays hold an aggregate of their
/// fields or elements; boxed values hold the value itself.
#[derive(Debug, Clone, PartialEq)]
pub struct HeapObject {
    pub type_hash: TypeHash,
    pub value: Value,
}

#[derive(Debug, Default)]
pub struct Heap {
    objects: Vec<HeapObject>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, type_hash: TypeHash, value: Value) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(HeapObject { type_hash, value });
        id
    }

    pub fn get(&self, id: ObjectId) -> Result<&HeapObject, VmError> {
        self.objects
            .get(id.0 as usize)
            .ok_or(VmError::DanglingReference(id))
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Result<&mut HeapObject, VmError> {
        self.objects
            .get_mut(id.0 as usize)
            .ok_or(VmError::DanglingReference(id))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
