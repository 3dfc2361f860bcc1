use crate::{accessor::Slot, FieldConfig, HostType, HostValue, Method};

use heck::ToSnakeCase;
use std::{
    any::{Any, TypeId},
    fmt,
    sync::Arc,
};

/// A shared, type-erased handle to a materialized entity instance.
pub type EntityRef = Arc<dyn Any + Send + Sync>;

/// A host type whose properties are mapped to columns.
///
/// Implementations register their accessor table in [`Entity::schema`]; the
/// registry compiles it into field descriptors once, at mapping
/// initialization.
pub trait Entity: Any + Send + Sync + Default {
    /// Name of the type, used in diagnostics and to derive the table name.
    const NAME: &'static str;

    /// The registered accessor table for this type.
    fn schema() -> EntityDef;
}

/// A reference to a mapped entity type that can be resolved lazily.
///
/// Holding a function pointer rather than the definition itself lets a type
/// refer to itself (or to a type that refers back to it) without recursion
/// at definition time.
#[derive(Clone, Copy)]
pub struct EntityType {
    type_id: TypeId,
    name: &'static str,
    schema: fn() -> EntityDef,
    construct: fn() -> Box<dyn Any + Send + Sync>,
}

/// The compile-time-registered accessor table of one entity type.
#[derive(Debug)]
pub struct EntityDef {
    /// Name of the entity type
    pub name: &'static str,

    /// Table name, if it differs from the snake_case entity name
    pub table_name: Option<String>,

    /// Properties in declaration order
    pub properties: Vec<Property>,

    /// Accessor methods available for `use_accessor_methods` fields
    pub methods: Vec<Method>,
}

/// One property of an entity type.
#[derive(Debug, Clone)]
pub struct Property {
    /// The field name
    pub name: &'static str,

    /// The declared host type
    pub ty: HostType,

    /// Mapping configuration. `None` means the property is not persisted.
    pub config: Option<FieldConfig>,

    /// Direct access to the property's storage
    pub(crate) slot: Slot,
}

impl EntityType {
    pub fn of<E: Entity>() -> Self {
        Self {
            type_id: TypeId::of::<E>(),
            name: E::NAME,
            schema: E::schema,
            construct: construct::<E>,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn schema(&self) -> EntityDef {
        (self.schema)()
    }

    /// Constructs an empty instance, used for foreign stubs.
    pub fn construct(&self) -> Box<dyn Any + Send + Sync> {
        (self.construct)()
    }
}

fn construct<E: Entity>() -> Box<dyn Any + Send + Sync> {
    Box::new(E::default())
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "EntityType({})", self.name)
    }
}

impl EntityDef {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            table_name: None,
            properties: vec![],
            methods: vec![],
        }
    }

    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// The table name, defaulting to the snake_case entity name.
    pub fn resolved_table_name(&self) -> String {
        match &self.table_name {
            Some(table_name) => table_name.clone(),
            None => self.name.to_snake_case(),
        }
    }

    pub fn find_property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.name == name)
    }

    pub fn find_method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|method| method.name() == name)
    }
}

impl Property {
    /// Registers a property backed by a struct field.
    ///
    /// Most callers use the [`property!`](crate::property) macro instead.
    pub fn new<E: Entity, V: HostValue>(
        name: &'static str,
        get: fn(&E) -> &V,
        get_mut: fn(&mut E) -> &mut V,
    ) -> Self {
        Self {
            name,
            ty: V::host_type(),
            config: None,
            slot: Slot::new::<E, V>(get, get_mut),
        }
    }

    /// Marks the property as mapped with the given configuration.
    pub fn config(mut self, config: FieldConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn is_mapped(&self) -> bool {
        self.config.is_some()
    }
}
