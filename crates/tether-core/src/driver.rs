//! The connection abstraction used to refresh foreign references.

pub mod operation;
pub use operation::GetById;

use crate::{async_trait, EntityRef, Result};

use std::{
    fmt,
    ops::{Deref, DerefMut},
};

/// Hands out pooled connections.
#[async_trait]
pub trait ConnectionSource: Send + Sync {
    /// Acquires a connection suitable for reads against `table`.
    async fn read_connection(&self, table: &str) -> Result<Box<dyn Connection>>;

    /// Returns a connection previously handed out by `read_connection`.
    fn release_connection(&self, connection: Box<dyn Connection>) -> Result<()>;
}

/// A single database connection.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Fetches the row with the given id and materializes it as an entity.
    /// Returns `Ok(None)` when no row matches.
    async fn get_by_id(&mut self, op: GetById) -> Result<Option<EntityRef>>;
}

/// A connection that is released back to its source when dropped.
pub struct PooledConnection<'a> {
    source: &'a dyn ConnectionSource,
    connection: Option<Box<dyn Connection>>,
}

impl<'a> PooledConnection<'a> {
    pub async fn acquire(source: &'a dyn ConnectionSource, table: &str) -> Result<Self> {
        let connection = source.read_connection(table).await?;

        Ok(Self {
            source,
            connection: Some(connection),
        })
    }
}

impl Deref for PooledConnection<'_> {
    type Target = dyn Connection;

    fn deref(&self) -> &Self::Target {
        // Only `drop` takes the connection out.
        match &self.connection {
            Some(connection) => &**connection,
            None => unreachable!("pooled connection used after release"),
        }
    }
}

impl DerefMut for PooledConnection<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match &mut self.connection {
            Some(connection) => &mut **connection,
            None => unreachable!("pooled connection used after release"),
        }
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            if let Err(err) = self.source.release_connection(connection) {
                log::warn!("failed to release connection: {err}");
            }
        }
    }
}

impl fmt::Debug for PooledConnection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledConnection")
            .field("held", &self.connection.is_some())
            .finish()
    }
}
