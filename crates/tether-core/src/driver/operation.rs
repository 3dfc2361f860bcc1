use crate::{EntityType, Value};

/// Fetch a single row by its id.
#[derive(Debug, Clone)]
pub struct GetById {
    /// Which table to read from
    pub table: String,

    /// Name of the id column
    pub id_column: String,

    /// The id, in its storage representation
    pub id: Value,

    /// The entity type to materialize
    pub entity: EntityType,
}
