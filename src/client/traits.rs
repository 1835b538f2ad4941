//! Document client trait
//!
//! The remote document database is a black box to the store: a handful of
//! point operations against a named collection, plus existence reads and
//! create-if-absent for the database/collection themselves. Connection
//! management, retries and request signing all live behind this trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ClientError;

/// TTL configuration of a collection, reported by `read_collection`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionInfo {
    /// Default TTL in seconds
    ///
    /// `None` means TTL is disabled on the collection; `Some(-1)` means TTL is
    /// enabled but records only expire if they carry their own `ttl` value;
    /// `Some(n)` with n > 0 is a default applied to records without one.
    pub default_ttl: Option<i32>,
}

/// Trait for document database backends
///
/// Not-found on `read_document` is `Ok(None)`, never an error. Create-if-absent
/// operations succeed when the target already exists. `delete_document` on a
/// missing document is an error, matching provider not-found semantics.
#[async_trait]
pub trait DocumentClient: Send + Sync + 'static {
    /// Create the database if it does not exist; succeed either way
    async fn create_database_if_not_exists(&self, database: &str) -> Result<(), ClientError>;

    /// Read the database to confirm it exists and is reachable
    async fn read_database(&self, database: &str) -> Result<(), ClientError>;

    /// Create the collection if it does not exist; succeed either way
    ///
    /// Collections created this way have no TTL configuration.
    async fn create_collection_if_not_exists(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<(), ClientError>;

    /// Read the collection to confirm it exists, returning its TTL configuration
    async fn read_collection(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<CollectionInfo, ClientError>;

    /// Point read of a document by id and partition key
    async fn read_document(
        &self,
        database: &str,
        collection: &str,
        id: &str,
        partition_key: &str,
    ) -> Result<Option<Value>, ClientError>;

    /// Insert or replace a document; the document's `id` field is the document id
    async fn upsert_document(
        &self,
        database: &str,
        collection: &str,
        partition_key: &str,
        document: Value,
    ) -> Result<(), ClientError>;

    /// Delete a document by id and partition key
    async fn delete_document(
        &self,
        database: &str,
        collection: &str,
        id: &str,
        partition_key: &str,
    ) -> Result<(), ClientError>;
}
