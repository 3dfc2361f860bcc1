//! Lazy resolution of foreign references.
//!
//! A foreign field persists the id of another entity. When an id is assigned
//! to such a field, the owner gets either its existing cached reference (if
//! that reference already has the same id) or a fresh stub of the referenced
//! type with only the id populated. Fetching the full referenced row is a
//! separate, fallible step ([`Foreign::refresh`]) that goes through a
//! [`ConnectionSource`].

use crate::{
    driver::{GetById, PooledConnection},
    ConnectionSource, EntityRef, EntityType, Error, FieldDescriptor, Result, Value,
};

use std::sync::Arc;

/// The foreign half of a field descriptor.
#[derive(Debug, Clone)]
pub struct Foreign {
    /// The referenced entity type
    entity: EntityType,

    /// Table of the referenced entity
    table_name: String,

    /// The referenced entity's id field
    id: Arc<FieldDescriptor>,

    /// Fetch the full row on assignment
    auto_refresh: bool,
}

/// Outcome of resolving an assigned foreign id.
#[derive(Debug)]
pub enum Resolution {
    /// The owner's cached reference already has this id; nothing to do.
    Cached,

    /// A new stub holding only the id.
    Stub(EntityRef),
}

impl Foreign {
    pub(crate) fn new(
        entity: EntityType,
        table_name: String,
        id: Arc<FieldDescriptor>,
        auto_refresh: bool,
    ) -> Self {
        Self {
            entity,
            table_name,
            id,
            auto_refresh,
        }
    }

    pub fn entity(&self) -> &EntityType {
        &self.entity
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// The referenced entity's id field.
    pub fn id_field(&self) -> &Arc<FieldDescriptor> {
        &self.id
    }

    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    /// Reads the id out of a referenced entity.
    pub fn id_of(&self, entity: &EntityRef) -> Result<Value> {
        self.id.get(&**entity)
    }

    /// Resolves an assigned id against the owner's current reference.
    ///
    /// Ids are compared in their storage representation, so an `i32` host id
    /// matches the same number held as `i64`.
    pub fn resolve(&self, current: &Value, id: &Value) -> Result<Resolution> {
        if let Value::Entity(entity) = current {
            let current_id = self.id_of(entity)?;
            if self.id.to_storage(current_id)? == self.id.to_storage(id.clone())? {
                log::trace!("{} id {id:?} already cached", self.entity.name());
                return Ok(Resolution::Cached);
            }
        }

        Ok(Resolution::Stub(self.stub(id)?))
    }

    /// Builds an empty instance of the referenced type with only its id set.
    pub fn stub(&self, id: &Value) -> Result<EntityRef> {
        let mut stub = self.entity.construct();
        self.id.set(&mut *stub, id.clone())?;
        log::trace!("created {} stub for id {id:?}", self.entity.name());
        Ok(Arc::from(stub))
    }

    /// Fetches the referenced row by id.
    ///
    /// A read connection is held for the duration of the lookup and released
    /// on every exit path. A missing row is reported as record not found.
    pub async fn refresh(&self, source: &dyn ConnectionSource, id: &Value) -> Result<EntityRef> {
        let op = GetById {
            table: self.table_name.clone(),
            id_column: self.id.column_name().to_string(),
            id: self.id.to_storage(id.clone())?,
            entity: self.entity,
        };

        log::trace!("refreshing {} id {id:?}", self.entity.name());

        let mut connection = PooledConnection::acquire(source, &self.table_name).await?;
        let entity = connection.get_by_id(op).await?;
        drop(connection);

        entity.ok_or_else(|| {
            Error::record_not_found(format!("table={} id={id:?}", self.table_name))
        })
    }
}
