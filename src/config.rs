//! Store configuration

use crate::error::StoreError;

/// Configuration for the Cosmos session store
///
/// Endpoint, key, database and collection are required and must be non-empty;
/// `CosmosStore::new` rejects a configuration missing any of them. Everything
/// else is optional policy.
#[derive(Clone, Debug)]
pub struct CosmosStoreConfig {
    /// Service endpoint URI
    pub endpoint: String,

    /// Access key credential
    pub key: String,

    /// Database name
    pub database: String,

    /// Collection name
    pub collection: String,

    /// Per-record TTL in seconds, written into every stored record
    /// (default: None - the field is omitted from stored documents)
    pub ttl: Option<i32>,

    /// Create the database on first use if it does not exist (default: false)
    pub create_database_if_not_exists: bool,

    /// Create the collection on first use if it does not exist (default: false)
    /// A collection created this way has no TTL support configured.
    pub create_collection_if_not_exists: bool,

    /// Skip the database existence check during initialization (default: false)
    pub skip_verify_database_exists: bool,

    /// Skip the collection existence check during initialization (default: false)
    pub skip_verify_collection_exists: bool,
}

impl CosmosStoreConfig {
    /// Create a configuration with the required fields
    pub fn new<S: Into<String>>(endpoint: S, key: S, database: S, collection: S) -> Self {
        Self {
            endpoint: endpoint.into(),
            key: key.into(),
            database: database.into(),
            collection: collection.into(),
            ttl: None,
            create_database_if_not_exists: false,
            create_collection_if_not_exists: false,
            skip_verify_database_exists: false,
            skip_verify_collection_exists: false,
        }
    }

    /// Set the per-record TTL in seconds
    /// Pass None to store records without a `ttl` field.
    pub fn with_ttl(mut self, ttl: impl Into<Option<i32>>) -> Self {
        self.ttl = ttl.into();
        self
    }

    /// Create the database on first use if missing (default: false)
    pub fn with_create_database_if_not_exists(mut self, create: bool) -> Self {
        self.create_database_if_not_exists = create;
        self
    }

    /// Create the collection on first use if missing (default: false)
    pub fn with_create_collection_if_not_exists(mut self, create: bool) -> Self {
        self.create_collection_if_not_exists = create;
        self
    }

    /// Skip the database existence check (default: false)
    pub fn with_skip_verify_database_exists(mut self, skip: bool) -> Self {
        self.skip_verify_database_exists = skip;
        self
    }

    /// Skip the collection existence check (default: false)
    pub fn with_skip_verify_collection_exists(mut self, skip: bool) -> Self {
        self.skip_verify_collection_exists = skip;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), StoreError> {
        if self.endpoint.is_empty() {
            return Err(StoreError::Configuration("endpoint"));
        }
        if self.key.is_empty() {
            return Err(StoreError::Configuration("key"));
        }
        if self.database.is_empty() {
            return Err(StoreError::Configuration("database"));
        }
        if self.collection.is_empty() {
            return Err(StoreError::Configuration("collection"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let config = CosmosStoreConfig::new("https://localhost:8081", "key", "db", "sessions");
        assert_eq!(config.ttl, None);
        assert!(!config.create_database_if_not_exists);
        assert!(!config.create_collection_if_not_exists);
        assert!(!config.skip_verify_database_exists);
        assert!(!config.skip_verify_collection_exists);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_options() {
        let config = CosmosStoreConfig::new("https://localhost:8081", "key", "db", "sessions")
            .with_ttl(3600)
            .with_create_database_if_not_exists(true)
            .with_create_collection_if_not_exists(true)
            .with_skip_verify_database_exists(true)
            .with_skip_verify_collection_exists(true);
        assert_eq!(config.ttl, Some(3600));
        assert!(config.create_database_if_not_exists);
        assert!(config.create_collection_if_not_exists);
        assert!(config.skip_verify_database_exists);
        assert!(config.skip_verify_collection_exists);
    }

    #[test]
    fn validate_rejects_each_missing_field() {
        let cases = [
            (CosmosStoreConfig::new("", "key", "db", "sessions"), "endpoint"),
            (CosmosStoreConfig::new("https://e", "", "db", "sessions"), "key"),
            (CosmosStoreConfig::new("https://e", "key", "", "sessions"), "database"),
            (CosmosStoreConfig::new("https://e", "key", "db", ""), "collection"),
        ];
        for (config, field) in cases {
            match config.validate() {
                Err(StoreError::Configuration(f)) => assert_eq!(f, field),
                other => panic!("expected Configuration({}), got {:?}", field, other.err()),
            }
        }
    }
}
