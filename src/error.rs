//! Session store error types

use std::fmt;

/// Errors raised by the underlying document client.
///
/// The transport is a black box to this crate, so its failures are carried
/// as boxed errors and wrapped with store-level context.
pub type ClientError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during session store operations
#[derive(Debug)]
pub enum StoreError {
    /// A required configuration field was missing or empty
    Configuration(&'static str),
    /// The record passed to `set`/`touch` carries an id different from the session id
    SessionIdMismatch {
        session_id: String,
        record_id: String,
    },
    /// Database or collection verification failed during initialization
    StorageUnreachable {
        endpoint: String,
        database: String,
        /// Present only when the collection phase failed
        collection: Option<String>,
        source: ClientError,
    },
    /// Writing a session record failed
    UpsertFailed {
        session_id: String,
        source: ClientError,
    },
    /// Reading a session record failed (a missing record is not an error)
    ReadFailed {
        session_id: String,
        source: ClientError,
    },
    /// Deleting a session record failed; `destroy` suppresses this variant
    DeleteFailed {
        session_id: String,
        source: ClientError,
    },
    /// Error during serialization/deserialization of a record
    Serialization(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Configuration(field) => {
                write!(f, "missing required configuration field: {}", field)
            }
            StoreError::SessionIdMismatch {
                session_id,
                record_id,
            } => write!(
                f,
                "session id mismatch: operation is for \"{}\" but record has id \"{}\"",
                session_id, record_id
            ),
            StoreError::StorageUnreachable {
                endpoint,
                database,
                collection,
                source,
            } => match collection {
                Some(coll) => write!(
                    f,
                    "unable to reach collection \"{}\" in database \"{}\" at {}: {}",
                    coll, database, endpoint, source
                ),
                None => write!(
                    f,
                    "unable to reach database \"{}\" at {}: {}",
                    database, endpoint, source
                ),
            },
            StoreError::UpsertFailed { session_id, source } => {
                write!(f, "failed to upsert session \"{}\": {}", session_id, source)
            }
            StoreError::ReadFailed { session_id, source } => {
                write!(f, "failed to read session \"{}\": {}", session_id, source)
            }
            StoreError::DeleteFailed { session_id, source } => {
                write!(f, "failed to delete session \"{}\": {}", session_id, source)
            }
            StoreError::Serialization(e) => write!(f, "serialization error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::StorageUnreachable { source, .. }
            | StoreError::UpsertFailed { source, .. }
            | StoreError::ReadFailed { source, .. }
            | StoreError::DeleteFailed { source, .. } => Some(source.as_ref()),
            StoreError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err)
    }
}
