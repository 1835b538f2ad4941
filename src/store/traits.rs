//! Session store trait

use async_trait::async_trait;

use crate::error::StoreError;
use crate::record::SessionRecord;

/// Trait for session storage backends
///
/// This trait matches the express-session store interface: one record per
/// session id, loaded, overwritten, refreshed or deleted as a whole. A missing
/// session is `Ok(None)`, never an error.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Load a session by id
    ///
    /// Returns None if the session doesn't exist
    async fn get(&self, sid: &str) -> Result<Option<SessionRecord>, StoreError>;

    /// Insert or overwrite a session
    ///
    /// The record's `id` must equal `sid`; a mismatch fails before any
    /// storage interaction.
    async fn set(&self, sid: &str, record: &SessionRecord) -> Result<(), StoreError>;

    /// Delete a session
    ///
    /// Deletion failures must not fail the surrounding request lifecycle;
    /// implementations report success even when the record was already gone.
    async fn destroy(&self, sid: &str) -> Result<(), StoreError>;

    /// Refresh a session's liveness
    ///
    /// Rewrites the record in full with a fresh `seen` timestamp and TTL.
    async fn touch(&self, sid: &str, record: &SessionRecord) -> Result<(), StoreError>;
}
