//! In-memory document client
//!
//! This is primarily for development and testing.
//! For production, implement `DocumentClient` over a real service client.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use super::{CollectionInfo, DocumentClient};
use crate::error::ClientError;

#[derive(Default)]
struct Collection {
    default_ttl: Option<i32>,
    documents: HashMap<String, Value>,
}

#[derive(Default)]
struct Database {
    collections: HashMap<String, Collection>,
}

/// Per-operation call counters
///
/// Lets tests assert interaction patterns, e.g. that initialization verifies
/// the database exactly once across any number of store operations.
#[derive(Debug, Default)]
pub struct CallCounts {
    create_database: AtomicUsize,
    read_database: AtomicUsize,
    create_collection: AtomicUsize,
    read_collection: AtomicUsize,
    read_document: AtomicUsize,
    upsert_document: AtomicUsize,
    delete_document: AtomicUsize,
}

impl CallCounts {
    pub fn create_database(&self) -> usize {
        self.create_database.load(Ordering::SeqCst)
    }

    pub fn read_database(&self) -> usize {
        self.read_database.load(Ordering::SeqCst)
    }

    pub fn create_collection(&self) -> usize {
        self.create_collection.load(Ordering::SeqCst)
    }

    pub fn read_collection(&self) -> usize {
        self.read_collection.load(Ordering::SeqCst)
    }

    pub fn read_document(&self) -> usize {
        self.read_document.load(Ordering::SeqCst)
    }

    pub fn upsert_document(&self) -> usize {
        self.upsert_document.load(Ordering::SeqCst)
    }

    pub fn delete_document(&self) -> usize {
        self.delete_document.load(Ordering::SeqCst)
    }

    /// Total calls across every operation
    pub fn total(&self) -> usize {
        self.create_database()
            + self.read_database()
            + self.create_collection()
            + self.read_collection()
            + self.read_document()
            + self.upsert_document()
            + self.delete_document()
    }
}

/// In-memory document client
///
/// Emulates provider behavior closely enough for store tests: documents are
/// keyed by id, upserts attach `_rid`/`_self`/`_etag`/`_attachments`/`_ts`
/// metadata the way the service does, and deleting a missing document fails.
/// Clones share the same state.
pub struct MemoryDocumentClient {
    databases: Arc<RwLock<HashMap<String, Database>>>,
    calls: Arc<CallCounts>,
    resource_seq: Arc<AtomicU64>,
}

impl MemoryDocumentClient {
    /// Create an empty client with no databases
    pub fn new() -> Self {
        Self {
            databases: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(CallCounts::default()),
            resource_seq: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Pre-create a database
    pub fn with_database<S: Into<String>>(self, database: S) -> Self {
        self.databases
            .write()
            .entry(database.into())
            .or_default();
        self
    }

    /// Pre-create a database and collection with the given default TTL
    pub fn with_collection<S: Into<String>>(
        self,
        database: S,
        collection: S,
        default_ttl: Option<i32>,
    ) -> Self {
        let mut databases = self.databases.write();
        let db = databases.entry(database.into()).or_default();
        db.collections.insert(
            collection.into(),
            Collection {
                default_ttl,
                documents: HashMap::new(),
            },
        );
        drop(databases);
        self
    }

    /// Call counters recorded so far
    pub fn calls(&self) -> &CallCounts {
        &self.calls
    }

    fn next_resource_id(&self) -> u64 {
        self.resource_seq.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for MemoryDocumentClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryDocumentClient {
    fn clone(&self) -> Self {
        Self {
            databases: Arc::clone(&self.databases),
            calls: Arc::clone(&self.calls),
            resource_seq: Arc::clone(&self.resource_seq),
        }
    }
}

fn not_found(what: &str, name: &str) -> ClientError {
    format!("{} not found: {}", what, name).into()
}

#[async_trait]
impl DocumentClient for MemoryDocumentClient {
    async fn create_database_if_not_exists(&self, database: &str) -> Result<(), ClientError> {
        self.calls.create_database.fetch_add(1, Ordering::SeqCst);
        self.databases
            .write()
            .entry(database.to_string())
            .or_default();
        Ok(())
    }

    async fn read_database(&self, database: &str) -> Result<(), ClientError> {
        self.calls.read_database.fetch_add(1, Ordering::SeqCst);
        if self.databases.read().contains_key(database) {
            Ok(())
        } else {
            Err(not_found("database", database))
        }
    }

    async fn create_collection_if_not_exists(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<(), ClientError> {
        self.calls.create_collection.fetch_add(1, Ordering::SeqCst);
        let mut databases = self.databases.write();
        let db = databases
            .get_mut(database)
            .ok_or_else(|| not_found("database", database))?;
        db.collections.entry(collection.to_string()).or_default();
        Ok(())
    }

    async fn read_collection(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<CollectionInfo, ClientError> {
        self.calls.read_collection.fetch_add(1, Ordering::SeqCst);
        let databases = self.databases.read();
        let db = databases
            .get(database)
            .ok_or_else(|| not_found("database", database))?;
        let coll = db
            .collections
            .get(collection)
            .ok_or_else(|| not_found("collection", collection))?;
        Ok(CollectionInfo {
            default_ttl: coll.default_ttl,
        })
    }

    async fn read_document(
        &self,
        database: &str,
        collection: &str,
        id: &str,
        _partition_key: &str,
    ) -> Result<Option<Value>, ClientError> {
        self.calls.read_document.fetch_add(1, Ordering::SeqCst);
        let databases = self.databases.read();
        let db = databases
            .get(database)
            .ok_or_else(|| not_found("database", database))?;
        let coll = db
            .collections
            .get(collection)
            .ok_or_else(|| not_found("collection", collection))?;
        Ok(coll.documents.get(id).cloned())
    }

    async fn upsert_document(
        &self,
        database: &str,
        collection: &str,
        _partition_key: &str,
        mut document: Value,
    ) -> Result<(), ClientError> {
        self.calls.upsert_document.fetch_add(1, Ordering::SeqCst);
        let id = document
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| ClientError::from("document has no string `id` field"))?
            .to_string();

        let rid = self.next_resource_id();
        if let Some(map) = document.as_object_mut() {
            // Mimic the metadata the service attaches to every stored document
            map.insert("_rid".to_string(), Value::from(format!("rid{:08x}", rid)));
            map.insert(
                "_self".to_string(),
                Value::from(format!(
                    "dbs/{}/colls/{}/docs/{}/",
                    database, collection, id
                )),
            );
            map.insert("_etag".to_string(), Value::from(format!("\"{:08x}\"", rid)));
            map.insert("_attachments".to_string(), Value::from("attachments/"));
            map.insert(
                "_ts".to_string(),
                Value::from(chrono::Utc::now().timestamp()),
            );
        }

        let mut databases = self.databases.write();
        let db = databases
            .get_mut(database)
            .ok_or_else(|| not_found("database", database))?;
        let coll = db
            .collections
            .get_mut(collection)
            .ok_or_else(|| not_found("collection", collection))?;
        coll.documents.insert(id, document);
        Ok(())
    }

    async fn delete_document(
        &self,
        database: &str,
        collection: &str,
        id: &str,
        _partition_key: &str,
    ) -> Result<(), ClientError> {
        self.calls.delete_document.fetch_add(1, Ordering::SeqCst);
        let mut databases = self.databases.write();
        let db = databases
            .get_mut(database)
            .ok_or_else(|| not_found("database", database))?;
        let coll = db
            .collections
            .get_mut(collection)
            .ok_or_else(|| not_found("collection", collection))?;
        coll.documents
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("document", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn upsert_attaches_provider_metadata() {
        let client = MemoryDocumentClient::new().with_collection("db", "sessions", None);

        client
            .upsert_document("db", "sessions", "sid-1", json!({"id": "sid-1", "user": "alice"}))
            .await
            .unwrap();

        let doc = client
            .read_document("db", "sessions", "sid-1", "sid-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc["user"], "alice");
        assert!(doc.get("_rid").is_some());
        assert!(doc.get("_etag").is_some());
        assert!(doc.get("_ts").is_some());
    }

    #[tokio::test]
    async fn delete_missing_document_is_an_error() {
        let client = MemoryDocumentClient::new().with_collection("db", "sessions", None);
        assert!(client
            .delete_document("db", "sessions", "absent", "absent")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn clones_share_state_and_counters() {
        let client = MemoryDocumentClient::new().with_database("db");
        let clone = client.clone();

        clone.read_database("db").await.unwrap();
        assert_eq!(client.calls().read_database(), 1);
    }
}
