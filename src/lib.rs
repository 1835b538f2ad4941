//! # cosmos-session-store
//!
//! Express-session compatible session store backed by a Cosmos-style document
//! database, for registering with session middleware that delegates persistence
//! through the conventional `get`/`set`/`destroy`/`touch` contract.
//!
//! ## Features
//!
//! - **Lazy one-shot initialization**: the backing database and collection are
//!   resolved (created or verified, per policy flags) on the first operation,
//!   with concurrent callers sharing a single in-flight attempt
//! - **Provider TTL integration**: an optional per-record `ttl` lets the
//!   database expire idle sessions itself; the store never runs its own sweep
//! - **Clean records**: provider metadata fields are stripped on read, so the
//!   middleware only ever sees its own fields plus `id` and `seen`
//! - **Pluggable transport**: the database is reached through the
//!   [`DocumentClient`] trait; [`MemoryDocumentClient`] ships for development
//!   and testing
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cosmos_session_store::{
//!     CosmosStore, CosmosStoreConfig, MemoryDocumentClient, SessionRecord, SessionStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CosmosStoreConfig::new("https://localhost:8081", "key", "app", "sessions")
//!         .with_ttl(86400)
//!         .with_create_database_if_not_exists(true)
//!         .with_create_collection_if_not_exists(true);
//!
//!     let store = CosmosStore::new(config, MemoryDocumentClient::new())?;
//!
//!     let mut record = SessionRecord::new("sid-1");
//!     record.set("user", "alice");
//!     store.set("sid-1", &record).await?;
//!
//!     let loaded = store.get("sid-1").await?.unwrap();
//!     assert_eq!(loaded.get::<String>("user"), Some("alice".to_string()));
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod record;
pub mod store;

pub use client::{CallCounts, CollectionInfo, DocumentClient, MemoryDocumentClient};
pub use config::CosmosStoreConfig;
pub use error::{ClientError, StoreError};
pub use record::SessionRecord;
pub use store::{CosmosStore, SessionStore};
