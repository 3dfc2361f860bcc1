use crate::{Dialect, Entity, EntityType, Error, FieldConfig, FieldDescriptor, Result};

use indexmap::IndexMap;
use std::{any::TypeId, collections::HashSet, sync::Arc};

/// Owns the compiled tables of every mapped entity type.
///
/// Tables are built on first registration. Every table built during one
/// top-level registration, including those of referenced types, is staged
/// and published together once all of them compiled; a configuration error
/// anywhere leaves the registry unchanged.
#[derive(Debug)]
pub struct Registry {
    dialect: Arc<Dialect>,

    /// Published tables
    tables: IndexMap<TypeId, Arc<Table>>,

    /// Tables compiled during the current registration, not yet published
    pending: IndexMap<TypeId, Arc<Table>>,

    /// Types whose tables are currently being built
    building: HashSet<TypeId>,
}

/// The compiled field descriptors of one entity type.
#[derive(Debug)]
pub struct Table {
    entity: EntityType,
    name: String,
    fields: Vec<Arc<FieldDescriptor>>,
    id: Option<usize>,
}

impl Registry {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect: Arc::new(dialect),
            tables: IndexMap::new(),
            pending: IndexMap::new(),
            building: HashSet::new(),
        }
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub(crate) fn dialect_handle(&self) -> Arc<Dialect> {
        self.dialect.clone()
    }

    /// Builds and publishes the table for `E`, or returns the already
    /// published one.
    pub fn register<E: Entity>(&mut self) -> Result<Arc<Table>> {
        self.register_type(&EntityType::of::<E>())
    }

    fn register_type(&mut self, entity: &EntityType) -> Result<Arc<Table>> {
        let res = self.build_table(entity);

        match res {
            Ok(table) => {
                self.commit();
                Ok(table)
            }
            Err(err) => {
                for table in self.pending.values() {
                    log::debug!(
                        "discarding table `{}` for {}",
                        table.name,
                        table.entity.name()
                    );
                }
                self.pending.clear();
                Err(err)
            }
        }
    }

    /// The published table for `E`, if any.
    pub fn table<E: Entity>(&self) -> Option<&Arc<Table>> {
        self.tables.get(&TypeId::of::<E>())
    }

    pub fn tables(&self) -> impl Iterator<Item = &Arc<Table>> {
        self.tables.values()
    }

    /// The descriptor of the field `name` of `E`, registering `E` first if
    /// needed. Unmapped or unknown fields yield `None`.
    pub fn field<E: Entity>(&mut self, name: &str) -> Result<Option<Arc<FieldDescriptor>>> {
        Ok(self.register::<E>()?.field(name).cloned())
    }

    fn lookup(&self, type_id: &TypeId) -> Option<&Arc<Table>> {
        self.tables.get(type_id).or_else(|| self.pending.get(type_id))
    }

    fn build_table(&mut self, entity: &EntityType) -> Result<Arc<Table>> {
        let type_id = entity.type_id();

        if let Some(table) = self.lookup(&type_id) {
            return Ok(table.clone());
        }

        self.building.insert(type_id);
        let res = self.compile_table(entity);
        self.building.remove(&type_id);

        let table = Arc::new(res?);
        self.pending.insert(type_id, table.clone());
        Ok(table)
    }

    fn commit(&mut self) {
        for (type_id, table) in self.pending.drain(..) {
            log::debug!(
                "published table `{}` for {} with {} fields",
                table.name,
                table.entity.name(),
                table.fields.len()
            );
            self.tables.insert(type_id, table);
        }
    }

    fn compile_table(&mut self, entity: &EntityType) -> Result<Table> {
        let def = entity.schema();
        let mut fields = Vec::with_capacity(def.properties.len());
        let mut id = None;

        for property in &def.properties {
            let Some(field) = FieldDescriptor::build(self, &def, property)? else {
                continue;
            };

            if field.is_id() {
                if id.is_some() {
                    return Err(Error::invalid_configuration(
                        def.name,
                        property.name,
                        format!("`{}` declares more than one id field", def.name),
                    ));
                }
                id = Some(fields.len());
            }

            fields.push(Arc::new(field));
        }

        Ok(Table {
            entity: *entity,
            name: def.resolved_table_name(),
            fields,
            id,
        })
    }

    /// Resolves the id field of a foreign reference target.
    ///
    /// A target that is still being built (a self or mutual reference) gets
    /// its id field compiled directly from its definition instead of
    /// recursing into the whole table.
    pub(crate) fn foreign_id(
        &mut self,
        target: &EntityType,
    ) -> Result<Option<Arc<FieldDescriptor>>> {
        let type_id = target.type_id();

        if let Some(table) = self.lookup(&type_id) {
            return Ok(table.id_field().cloned());
        }

        if self.building.contains(&type_id) {
            log::trace!("{} is being built; compiling its id field only", target.name());

            let def = target.schema();
            for property in &def.properties {
                if !property.config.as_ref().is_some_and(FieldConfig::declares_id) {
                    continue;
                }

                if let Some(field) = FieldDescriptor::build(self, &def, property)? {
                    return Ok(Some(Arc::new(field)));
                }
            }

            return Ok(None);
        }

        // Outside a registration (a descriptor compiled on its own), the
        // referenced type is registered as a unit of its own.
        let table = if self.building.is_empty() {
            self.register_type(target)?
        } else {
            self.build_table(target)?
        };

        Ok(table.id_field().cloned())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Dialect::default())
    }
}

impl Table {
    pub fn entity(&self) -> &EntityType {
        &self.entity
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mapped fields in declaration order.
    pub fn fields(&self) -> &[Arc<FieldDescriptor>] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Arc<FieldDescriptor>> {
        self.fields.iter().find(|field| field.field_name() == name)
    }

    pub fn id_field(&self) -> Option<&Arc<FieldDescriptor>> {
        self.id.map(|index| &self.fields[index])
    }
}
