//! Cosmos-backed session store
//!
//! Sessions are stored one document per session id, with the id doubling as
//! the partition key. The backing database and collection are resolved lazily:
//! the first operation runs a one-shot initialization (create or verify the
//! database, then the collection) and every later operation skips straight to
//! its point read/write. Initialization failures are not cached; a later
//! operation retries.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::SessionStore;
use crate::client::DocumentClient;
use crate::config::CosmosStoreConfig;
use crate::error::{ClientError, StoreError};
use crate::record::{self, SessionRecord};

/// Session store backed by a Cosmos-style document database
///
/// Generic over the [`DocumentClient`] transport; use
/// [`MemoryDocumentClient`](crate::MemoryDocumentClient) for development and
/// tests. Construction validates configuration but never touches the network.
///
/// # Example
///
/// ```rust,ignore
/// use cosmos_session_store::{CosmosStore, CosmosStoreConfig, MemoryDocumentClient};
///
/// let config = CosmosStoreConfig::new("https://localhost:8081", key, "app", "sessions")
///     .with_ttl(86400)
///     .with_create_collection_if_not_exists(true);
/// let store = CosmosStore::new(config, client)?;
/// ```
pub struct CosmosStore<C: DocumentClient> {
    client: Arc<C>,
    config: CosmosStoreConfig,
    init: Arc<OnceCell<()>>,
}

impl<C: DocumentClient> CosmosStore<C> {
    /// Create a new store over the given client
    ///
    /// Fails synchronously if endpoint, key, database or collection is empty.
    pub fn new(config: CosmosStoreConfig, client: C) -> Result<Self, StoreError> {
        config.validate()?;
        Ok(Self {
            client: Arc::new(client),
            config,
            init: Arc::new(OnceCell::new()),
        })
    }

    /// The store's configuration
    pub fn config(&self) -> &CosmosStoreConfig {
        &self.config
    }

    /// Run initialization at most once; concurrent callers await the in-flight
    /// attempt. A failed attempt leaves the store uninitialized so the next
    /// operation retries.
    async fn ensure_initialized(&self) -> Result<(), StoreError> {
        self.init.get_or_try_init(|| self.initialize()).await?;
        Ok(())
    }

    async fn initialize(&self) -> Result<(), StoreError> {
        let database = &self.config.database;
        let collection = &self.config.collection;

        if self.config.create_database_if_not_exists {
            self.client
                .create_database_if_not_exists(database)
                .await
                .map_err(|source| self.unreachable(source, None))?;
        } else if !self.config.skip_verify_database_exists {
            self.client
                .read_database(database)
                .await
                .map_err(|source| self.unreachable(source, None))?;
        }

        if self.config.create_collection_if_not_exists {
            self.client
                .create_collection_if_not_exists(database, collection)
                .await
                .map_err(|source| self.unreachable(source, Some(collection.clone())))?;
        } else if !self.config.skip_verify_collection_exists {
            let info = self
                .client
                .read_collection(database, collection)
                .await
                .map_err(|source| self.unreachable(source, Some(collection.clone())))?;

            match info.default_ttl {
                None => tracing::warn!(
                    collection = %collection,
                    "collection has no TTL configured; expired sessions will never be garbage collected"
                ),
                Some(-1) if self.config.ttl.is_none() => tracing::warn!(
                    collection = %collection,
                    "collection has no default TTL and no ttl option is set; sessions will never expire"
                ),
                default_ttl => tracing::info!(
                    collection = %collection,
                    collection_default_ttl = ?default_ttl,
                    session_ttl = ?self.config.ttl,
                    "collection TTL configuration"
                ),
            }
        }

        tracing::debug!(
            database = %database,
            collection = %collection,
            "session store initialized"
        );
        Ok(())
    }

    fn unreachable(&self, source: ClientError, collection: Option<String>) -> StoreError {
        StoreError::StorageUnreachable {
            endpoint: self.config.endpoint.clone(),
            database: self.config.database.clone(),
            collection,
            source,
        }
    }

    async fn delete_record(&self, sid: &str) -> Result<(), StoreError> {
        self.ensure_initialized().await?;
        self.client
            .delete_document(&self.config.database, &self.config.collection, sid, sid)
            .await
            .map_err(|source| StoreError::DeleteFailed {
                session_id: sid.to_string(),
                source,
            })
    }
}

impl<C: DocumentClient> Clone for CosmosStore<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            config: self.config.clone(),
            init: Arc::clone(&self.init),
        }
    }
}

#[async_trait]
impl<C: DocumentClient> SessionStore for CosmosStore<C> {
    async fn get(&self, sid: &str) -> Result<Option<SessionRecord>, StoreError> {
        self.ensure_initialized().await?;

        let document = self
            .client
            .read_document(&self.config.database, &self.config.collection, sid, sid)
            .await
            .map_err(|source| StoreError::ReadFailed {
                session_id: sid.to_string(),
                source,
            })?;

        match document {
            Some(document) => Ok(Some(record::from_document(document)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, sid: &str, record: &SessionRecord) -> Result<(), StoreError> {
        // Checked before initialization so a mismatch never reaches storage
        if record.id != sid {
            return Err(StoreError::SessionIdMismatch {
                session_id: sid.to_string(),
                record_id: record.id.clone(),
            });
        }
        self.ensure_initialized().await?;

        let document =
            record::to_document(sid, record, self.config.ttl, Utc::now().timestamp_millis())?;
        self.client
            .upsert_document(&self.config.database, &self.config.collection, sid, document)
            .await
            .map_err(|source| StoreError::UpsertFailed {
                session_id: sid.to_string(),
                source,
            })
    }

    async fn destroy(&self, sid: &str) -> Result<(), StoreError> {
        // Session teardown must not fail the surrounding request; suppressed
        // failures still go to the diagnostic channel.
        if let Err(e) = self.delete_record(sid).await {
            tracing::warn!(session_id = %sid, error = %e, "suppressed error while destroying session");
        }
        Ok(())
    }

    async fn touch(&self, sid: &str, record: &SessionRecord) -> Result<(), StoreError> {
        self.set(sid, record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MemoryDocumentClient;

    fn config() -> CosmosStoreConfig {
        CosmosStoreConfig::new("https://localhost:8081", "key", "app", "sessions")
    }

    fn seeded_client() -> MemoryDocumentClient {
        MemoryDocumentClient::new().with_collection("app", "sessions", Some(86400))
    }

    fn record_with(sid: &str, key: &str, value: &str) -> SessionRecord {
        let mut record = SessionRecord::new(sid);
        record.set(key, value);
        record
    }

    #[test]
    fn construction_validates_required_fields() {
        let cases = [
            (CosmosStoreConfig::new("", "key", "app", "sessions"), "endpoint"),
            (CosmosStoreConfig::new("https://e", "", "app", "sessions"), "key"),
            (CosmosStoreConfig::new("https://e", "key", "", "sessions"), "database"),
            (CosmosStoreConfig::new("https://e", "key", "app", ""), "collection"),
        ];
        for (config, field) in cases {
            match CosmosStore::new(config, MemoryDocumentClient::new()) {
                Err(StoreError::Configuration(f)) => assert_eq!(f, field),
                _ => panic!("expected Configuration({}) error", field),
            }
        }
    }

    #[test]
    fn construction_performs_no_network_calls() {
        let client = seeded_client();
        let _store = CosmosStore::new(config(), client.clone()).unwrap();
        assert_eq!(client.calls().total(), 0);
    }

    #[tokio::test]
    async fn initialization_runs_at_most_once() {
        let client = seeded_client();
        let store = CosmosStore::new(config(), client.clone()).unwrap();

        store.get("a").await.unwrap();
        store.get("b").await.unwrap();
        store.destroy("c").await.unwrap();

        assert_eq!(client.calls().read_database(), 1);
        assert_eq!(client.calls().read_collection(), 1);
        assert_eq!(client.calls().create_database(), 0);
        assert_eq!(client.calls().create_collection(), 0);
    }

    #[tokio::test]
    async fn concurrent_first_calls_share_one_initialization() {
        let client = seeded_client();
        let store = CosmosStore::new(config(), client.clone()).unwrap();

        let (a, b) = tokio::join!(store.get("a"), store.get("b"));
        a.unwrap();
        b.unwrap();

        assert_eq!(client.calls().read_database(), 1);
        assert_eq!(client.calls().read_collection(), 1);
    }

    #[tokio::test]
    async fn failed_initialization_is_retried() {
        let client = MemoryDocumentClient::new();
        let store = CosmosStore::new(config(), client.clone()).unwrap();

        match store.get("a").await {
            Err(StoreError::StorageUnreachable {
                database,
                collection,
                ..
            }) => {
                assert_eq!(database, "app");
                assert_eq!(collection, None);
            }
            other => panic!("expected StorageUnreachable, got {:?}", other),
        }

        // The backing store comes up; the next operation initializes again
        client
            .clone()
            .with_collection("app", "sessions", Some(86400));
        store.get("a").await.unwrap();
        assert_eq!(client.calls().read_database(), 2);
    }

    #[tokio::test]
    async fn collection_verification_failure_names_the_collection() {
        let client = MemoryDocumentClient::new().with_database("app");
        let store = CosmosStore::new(config(), client).unwrap();

        match store.get("a").await {
            Err(StoreError::StorageUnreachable { collection, .. }) => {
                assert_eq!(collection.as_deref(), Some("sessions"));
            }
            other => panic!("expected StorageUnreachable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn create_flags_create_missing_database_and_collection() {
        let client = MemoryDocumentClient::new();
        let store = CosmosStore::new(
            config()
                .with_create_database_if_not_exists(true)
                .with_create_collection_if_not_exists(true),
            client.clone(),
        )
        .unwrap();

        store.set("sid-1", &record_with("sid-1", "user", "alice")).await.unwrap();

        assert_eq!(client.calls().create_database(), 1);
        assert_eq!(client.calls().create_collection(), 1);
        assert_eq!(client.calls().read_database(), 0);
        assert_eq!(client.calls().read_collection(), 0);
    }

    #[tokio::test]
    async fn skip_verify_flags_skip_existence_reads() {
        let client = seeded_client();
        let store = CosmosStore::new(
            config()
                .with_skip_verify_database_exists(true)
                .with_skip_verify_collection_exists(true),
            client.clone(),
        )
        .unwrap();

        assert!(store.get("absent").await.unwrap().is_none());
        assert_eq!(client.calls().read_database(), 0);
        assert_eq!(client.calls().read_collection(), 0);
    }

    #[tokio::test]
    async fn ttl_disabled_collection_still_initializes() {
        let client = MemoryDocumentClient::new().with_collection("app", "sessions", None);
        let store = CosmosStore::new(config(), client).unwrap();
        assert!(store.get("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_missing_session_is_none_not_an_error() {
        let store = CosmosStore::new(config(), seeded_client()).unwrap();
        assert!(store.get("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_then_get_round_trips_without_provider_fields() {
        let client = seeded_client();
        let store = CosmosStore::new(config().with_ttl(1200), client.clone()).unwrap();

        let before = Utc::now().timestamp_millis();
        store.set("sid-1", &record_with("sid-1", "user", "alice")).await.unwrap();

        let loaded = store.get("sid-1").await.unwrap().unwrap();
        assert_eq!(loaded.id, "sid-1");
        assert_eq!(loaded.get::<String>("user"), Some("alice".to_string()));
        assert!(loaded.seen.unwrap() >= before);
        for field in crate::record::PROVIDER_METADATA_FIELDS {
            assert!(!loaded.contains(field), "{} should be stripped", field);
        }

        // The stored document itself carries the configured ttl
        let raw = client
            .read_document("app", "sessions", "sid-1", "sid-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(raw["ttl"], 1200);
    }

    #[tokio::test]
    async fn unconfigured_ttl_is_omitted_from_stored_documents() {
        let client = seeded_client();
        let store = CosmosStore::new(config(), client.clone()).unwrap();

        store.set("sid-1", &record_with("sid-1", "user", "alice")).await.unwrap();

        let raw = client
            .read_document("app", "sessions", "sid-1", "sid-1")
            .await
            .unwrap()
            .unwrap();
        assert!(raw.get("ttl").is_none());
    }

    #[tokio::test]
    async fn set_rejects_mismatched_record_id_without_network_calls() {
        let client = seeded_client();
        let store = CosmosStore::new(config(), client.clone()).unwrap();

        let result = store.set("sid-1", &record_with("other", "user", "alice")).await;
        match result {
            Err(StoreError::SessionIdMismatch {
                session_id,
                record_id,
            }) => {
                assert_eq!(session_id, "sid-1");
                assert_eq!(record_id, "other");
            }
            other => panic!("expected SessionIdMismatch, got {:?}", other),
        }
        assert_eq!(client.calls().total(), 0);
    }

    #[tokio::test]
    async fn set_overwrites_existing_records() {
        let store = CosmosStore::new(config(), seeded_client()).unwrap();

        store.set("sid-1", &record_with("sid-1", "user", "alice")).await.unwrap();
        store.set("sid-1", &record_with("sid-1", "user", "bob")).await.unwrap();

        let loaded = store.get("sid-1").await.unwrap().unwrap();
        assert_eq!(loaded.get::<String>("user"), Some("bob".to_string()));
    }

    #[tokio::test]
    async fn touch_behaves_like_set() {
        let store = CosmosStore::new(config(), seeded_client()).unwrap();

        store.set("sid-1", &record_with("sid-1", "user", "alice")).await.unwrap();
        let first = store.get("sid-1").await.unwrap().unwrap();

        store.touch("sid-1", &record_with("sid-1", "user", "alice")).await.unwrap();
        let second = store.get("sid-1").await.unwrap().unwrap();

        assert_eq!(second.data, first.data);
        assert!(second.seen.unwrap() >= first.seen.unwrap());
    }

    #[tokio::test]
    async fn touch_rejects_mismatched_record_id() {
        let store = CosmosStore::new(config(), seeded_client()).unwrap();
        assert!(matches!(
            store.touch("sid-1", &SessionRecord::new("other")).await,
            Err(StoreError::SessionIdMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn destroy_removes_the_record() {
        let store = CosmosStore::new(config(), seeded_client()).unwrap();

        store.set("sid-1", &record_with("sid-1", "user", "alice")).await.unwrap();
        store.destroy("sid-1").await.unwrap();
        assert!(store.get("sid-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn destroy_swallows_missing_record_errors() {
        let client = seeded_client();
        let store = CosmosStore::new(config(), client.clone()).unwrap();

        store.destroy("absent").await.unwrap();
        // The delete was attempted and failed inside the client
        assert_eq!(client.calls().delete_document(), 1);
    }

    #[tokio::test]
    async fn destroy_swallows_initialization_errors() {
        let client = MemoryDocumentClient::new();
        let store = CosmosStore::new(config(), client).unwrap();
        store.destroy("sid-1").await.unwrap();
    }
}
