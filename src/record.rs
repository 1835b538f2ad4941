//! Session record shape and document shaping
//!
//! Stored documents carry the caller's session fields plus three adapter-managed
//! fields: `id` (session id, doubling as the partition key), `ttl` (only when
//! configured) and `seen` (last write time, epoch milliseconds). The provider
//! attaches its own metadata on write; reads strip it before the record is
//! handed back.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::StoreError;

/// Metadata fields the provider attaches to stored documents, removed on read.
/// `ttl` is adapter-written but is store plumbing, not session state, so it is
/// stripped as well.
pub const PROVIDER_METADATA_FIELDS: &[&str] =
    &["_attachments", "_etag", "_rid", "_self", "_ts", "ttl"];

/// A session record as seen by the host middleware
///
/// The record's `id` must equal the session id it is stored under; `set` and
/// `touch` reject a mismatch. Arbitrary session fields live in the flattened
/// map alongside `id` and `seen`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session id; also the document id and partition key
    pub id: String,

    /// Last write time in epoch milliseconds; set by the store on every write
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seen: Option<i64>,

    /// Caller-supplied session fields (flattened at the same level as `id`)
    #[serde(flatten)]
    pub data: HashMap<String, Value>,
}

impl SessionRecord {
    /// Create an empty record for the given session id
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self {
            id: id.into(),
            seen: None,
            data: HashMap::new(),
        }
    }

    /// Get a session field
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Set a session field
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) {
        if let Ok(v) = serde_json::to_value(value) {
            self.data.insert(key.to_string(), v);
        }
    }

    /// Remove a session field
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Check if a session field exists
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }
}

/// Build the storage document for a write.
///
/// Forces `id` to the session id, stamps `seen` with the current write time and
/// adds `ttl` only when one is configured; an unconfigured TTL leaves the field
/// out of the document entirely.
pub(crate) fn to_document(
    sid: &str,
    record: &SessionRecord,
    ttl: Option<i32>,
    seen_ms: i64,
) -> Result<Value, StoreError> {
    let mut value = serde_json::to_value(record)?;
    let map = value
        .as_object_mut()
        .ok_or_else(|| StoreError::Serialization(invalid_document_error()))?;
    map.insert("id".to_string(), Value::String(sid.to_string()));
    map.insert("seen".to_string(), Value::from(seen_ms));
    if let Some(ttl) = ttl {
        map.insert("ttl".to_string(), Value::from(ttl));
    }
    Ok(value)
}

/// Rebuild a session record from a stored document, stripping provider metadata.
pub(crate) fn from_document(mut document: Value) -> Result<SessionRecord, StoreError> {
    if let Some(map) = document.as_object_mut() {
        for field in PROVIDER_METADATA_FIELDS {
            map.remove(*field);
        }
    }
    serde_json::from_value(document).map_err(StoreError::Serialization)
}

fn invalid_document_error() -> serde_json::Error {
    <serde_json::Error as serde::de::Error>::custom(
        "session record did not serialize to a JSON object",
    )
}
