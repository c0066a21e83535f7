//! Named consumer store implementations, selected by configuration.
//!
//! The registry maps a configuration string (`CONSUMER_STORE`) to a factory.
//! It is consulted once at startup; the resolved store is held for the life of
//! the process.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;
use wsauth_core::{ConfigError, ConfigResult, ConsumerStoreConfig};

use crate::store::{
    ApplicationDirectory, ConsumerStore, DirectoryConsumerStore, StaticConsumerStore,
};

/// Builds a consumer store from its configuration section.
pub type StoreFactory = fn(&ConsumerStoreConfig) -> ConfigResult<Arc<dyn ConsumerStore>>;

/// Name of the in-memory store built from configured `key:secret` pairs.
pub const STATIC_STORE: &str = "static";

/// Name of the store backed by a JSON applications file.
pub const JSON_FILE_STORE: &str = "json-file";

/// Registry of consumer store implementations.
///
/// # Examples
///
/// ```
/// use wsauth_auth::registry::ConsumerStoreRegistry;
/// use wsauth_core::{ConsumerEntry, ConsumerStoreConfig};
///
/// let config = ConsumerStoreConfig::builder()
///     .kind("static")
///     .consumers(vec![ConsumerEntry::new("app1", "s3cr3t")])
///     .build();
///
/// let store = ConsumerStoreRegistry::with_builtins().resolve(&config).unwrap();
/// assert!(store.lookup("app1").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConsumerStoreRegistry {
    factories: BTreeMap<String, StoreFactory>,
}

impl ConsumerStoreRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the bundled `static` and `json-file` stores.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(STATIC_STORE, build_static_store);
        registry.register(JSON_FILE_STORE, build_json_file_store);
        registry
    }

    /// Register (or replace) a named implementation.
    pub fn register(&mut self, name: impl Into<String>, factory: StoreFactory) -> &mut Self {
        self.factories.insert(name.into(), factory);
        self
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Resolve the store selected by `config.kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingConsumerStore`] when no store is selected,
    /// [`ConfigError::UnknownConsumerStore`] when the name is not registered, or
    /// whatever the factory reports for unusable settings.
    pub fn resolve(&self, config: &ConsumerStoreConfig) -> ConfigResult<Arc<dyn ConsumerStore>> {
        let name = config
            .kind
            .as_deref()
            .ok_or(ConfigError::MissingConsumerStore)?;
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ConfigError::UnknownConsumerStore(name.to_owned()))?;

        let store = factory(config)?;
        info!(consumer_store = name, "resolved consumer store");
        Ok(store)
    }
}

fn build_static_store(config: &ConsumerStoreConfig) -> ConfigResult<Arc<dyn ConsumerStore>> {
    if config.consumers.is_empty() {
        return Err(ConfigError::InvalidConsumerStore {
            name: STATIC_STORE.to_owned(),
            reason: "no consumers configured (set CONSUMERS)".to_owned(),
        });
    }
    Ok(Arc::new(StaticConsumerStore::from_entries(&config.consumers)))
}

fn build_json_file_store(config: &ConsumerStoreConfig) -> ConfigResult<Arc<dyn ConsumerStore>> {
    let path = config
        .file
        .as_deref()
        .ok_or_else(|| ConfigError::InvalidConsumerStore {
            name: JSON_FILE_STORE.to_owned(),
            reason: "no applications file configured (set CONSUMER_FILE)".to_owned(),
        })?;
    let directory = ApplicationDirectory::from_json_file(path)?;
    Ok(Arc::new(DirectoryConsumerStore::new(directory)))
}
