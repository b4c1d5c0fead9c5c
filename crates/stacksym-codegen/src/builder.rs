//! Type under construction.
//!
//! A [`TypeBuilder`] owns the captured-value arena for one registered type
//! and collects its sealed method bodies. Captured values live exactly as
//! long as the type being built: they move into the [`BuiltType`] and are
//! addressed by the stable [`CapturedId`] handed out at capture time.

use rustc_hash::FxHashMap;
use stacksym_core::{
    DataType, EmitError, EmitResult, Literal, RegistrationError, TypeHash,
};
use stacksym_registry::TypeRegistry;
use tracing::debug;

use crate::Context;
use crate::options::EmitOptions;
use crate::sealed::SealedMethod;

/// Stable handle to a captured value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapturedId {
    owner: TypeHash,
    index: u16,
    data_type: DataType,
}

impl CapturedId {
    /// The type whose arena holds the value.
    pub fn owner(&self) -> TypeHash {
        self.owner
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }
}

/// Captured values of one type, in capture order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapturedArena {
    values: Vec<Literal>,
}

impl CapturedArena {
    pub fn get(&self, index: u16) -> Option<&Literal> {
        self.values.get(usize::from(index))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.values.iter()
    }
}

/// Builds the method bodies of one registered type.
#[derive(Debug)]
pub struct TypeBuilder<'r> {
    registry: &'r TypeRegistry,
    type_hash: TypeHash,
    options: EmitOptions,
    captured: CapturedArena,
    methods: FxHashMap<TypeHash, SealedMethod>,
}

impl<'r> TypeBuilder<'r> {
    /// Start building `type_hash`, which must already be registered.
    pub fn new(registry: &'r TypeRegistry, type_hash: TypeHash) -> EmitResult<Self> {
        if !registry.contains_type(type_hash) {
            return Err(EmitError::UnknownType(type_hash.to_string()));
        }
        Ok(Self {
            registry,
            type_hash,
            options: EmitOptions::default(),
            captured: CapturedArena::default(),
            methods: FxHashMap::default(),
        })
    }

    /// Options for every context opened through [`TypeBuilder::method`].
    pub fn with_options(mut self, options: EmitOptions) -> Self {
        self.options = options;
        self
    }

    pub fn type_hash(&self) -> TypeHash {
        self.type_hash
    }

    /// Intern a compile-time value so method bodies can load it.
    pub fn capture(&mut self, value: impl Into<Literal>) -> EmitResult<CapturedId> {
        let value = value.into();
        let index = u16::try_from(self.captured.values.len()).map_err(|_| {
            EmitError::InvalidOperand(format!(
                "more than {} captured values on {}",
                u16::MAX,
                self.registry.type_name(self.type_hash)
            ))
        })?;
        let id = CapturedId {
            owner: self.type_hash,
            index,
            data_type: value.data_type(),
        };
        self.captured.values.push(value);
        Ok(id)
    }

    pub fn captured(&self) -> &CapturedArena {
        &self.captured
    }

    /// Open a context for the body of `function`, declared on this type.
    pub fn method(&self, function: TypeHash) -> EmitResult<Context<'r>> {
        let entry = self
            .registry
            .get_function(function)
            .filter(|f| f.owner == Some(self.type_hash))
            .ok_or_else(|| EmitError::UnknownMember {
                type_name: self.registry.type_name(self.type_hash),
                member: function.to_string(),
            })?;
        Ok(Context::with_options(self.registry, entry, self.options))
    }

    /// Add a sealed body. Each function gets at most one.
    pub fn add_method(&mut self, method: SealedMethod) -> EmitResult<()> {
        if method.function.owner != Some(self.type_hash) {
            return Err(EmitError::UnknownMember {
                type_name: self.registry.type_name(self.type_hash),
                member: method.function.name.clone(),
            });
        }
        if self.methods.contains_key(&method.function.hash) {
            return Err(RegistrationError::DuplicateFunction(method.function.name.clone()).into());
        }
        self.methods.insert(method.function.hash, method);
        Ok(())
    }

    pub fn build(self) -> BuiltType {
        let name = self.registry.type_name(self.type_hash);
        debug!(
            r#type = %name,
            methods = self.methods.len(),
            captured = self.captured.len(),
            "built type"
        );
        BuiltType {
            type_hash: self.type_hash,
            name,
            methods: self.methods,
            captured: self.captured,
        }
    }
}

/// A finished type: its method bodies and captured values.
#[derive(Debug)]
pub struct BuiltType {
    pub type_hash: TypeHash,
    pub name: String,
    pub methods: FxHashMap<TypeHash, SealedMethod>,
    pub captured: CapturedArena,
}

impl BuiltType {
    pub fn method(&self, function: TypeHash) -> Option<&SealedMethod> {
        self.methods.get(&function)
    }
}
