//! Consumer store trait and implementations.
//!
//! This module defines the [`ConsumerStore`] trait for resolving consumers from
//! their public key, along with:
//!
//! - [`StaticConsumerStore`], an in-memory map for tests and small deployments;
//! - [`DirectoryConsumerStore`], which adapts any [`ConsumerDirectory`] of
//!   domain objects into consumer records;
//! - [`ApplicationDirectory`], a table of [`Application`]s loaded from a JSON file.
//!
//! A missing key is a normal outcome (`None`), never an error.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use wsauth_core::{ConfigError, ConfigResult, ConsumerEntry};

use crate::consumer::{Application, ConsumerModel, ConsumerRecord};

/// Trait for looking up consumers by key.
///
/// Implementations must be safe to query concurrently and must not share
/// mutable state between lookups. Each call returns a freshly built record.
pub trait ConsumerStore: Send + Sync {
    /// Retrieve the consumer registered under `key`, or `None` if there is none.
    fn lookup(&self, key: &str) -> Option<ConsumerRecord>;
}

impl<T: ConsumerStore + ?Sized> ConsumerStore for Arc<T> {
    fn lookup(&self, key: &str) -> Option<ConsumerRecord> {
        (**self).lookup(key)
    }
}

/// A simple in-memory consumer store backed by a `HashMap`.
///
/// # Examples
///
/// ```
/// use wsauth_auth::store::{ConsumerStore, StaticConsumerStore};
///
/// let store = StaticConsumerStore::new(vec![
///     ("app1".to_owned(), "s3cr3t".to_owned()),
/// ]);
///
/// let consumer = store.lookup("app1").unwrap();
/// assert_eq!(consumer.secret(), "s3cr3t");
/// assert!(store.lookup("app2").is_none());
/// ```
#[derive(Clone)]
pub struct StaticConsumerStore {
    consumers: HashMap<String, String>,
}

impl StaticConsumerStore {
    /// Create a store from an iterable of `(key, secret)` pairs.
    pub fn new(consumers: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            consumers: consumers.into_iter().collect(),
        }
    }

    /// Create a store from configured entries.
    #[must_use]
    pub fn from_entries(entries: &[ConsumerEntry]) -> Self {
        Self::new(
            entries
                .iter()
                .map(|entry| (entry.key.clone(), entry.secret.clone())),
        )
    }

    /// Number of registered consumers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    /// Whether the store has no consumers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }
}

impl std::fmt::Debug for StaticConsumerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticConsumerStore")
            .field("consumers", &self.consumers.len())
            .finish()
    }
}

impl ConsumerStore for StaticConsumerStore {
    fn lookup(&self, key: &str) -> Option<ConsumerRecord> {
        self.consumers
            .get(key)
            .map(|secret| ConsumerRecord::new(key, secret.clone()))
    }
}

/// An external table of domain objects that can be found by consumer key.
pub trait ConsumerDirectory: Send + Sync {
    /// The stored domain object.
    type Model: ConsumerModel;

    /// Find the object registered under `key`.
    fn find(&self, key: &str) -> Option<Arc<Self::Model>>;
}

/// Adapts a [`ConsumerDirectory`] into a [`ConsumerStore`].
///
/// Every lookup builds a new [`ConsumerRecord`] from the directory object and
/// keeps the object as the record's backing.
#[derive(Debug, Clone)]
pub struct DirectoryConsumerStore<D> {
    directory: D,
}

impl<D: ConsumerDirectory> DirectoryConsumerStore<D> {
    /// Wrap a directory.
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    /// The wrapped directory.
    pub fn directory(&self) -> &D {
        &self.directory
    }
}

impl<D: ConsumerDirectory> ConsumerStore for DirectoryConsumerStore<D> {
    fn lookup(&self, key: &str) -> Option<ConsumerRecord> {
        self.directory.find(key).map(ConsumerRecord::from_model)
    }
}

/// Registered applications, keyed by consumer key.
#[derive(Debug, Clone, Default)]
pub struct ApplicationDirectory {
    applications: HashMap<String, Arc<Application>>,
}

impl ApplicationDirectory {
    /// Build a directory from applications. Later duplicates of a key win.
    pub fn new(applications: impl IntoIterator<Item = Application>) -> Self {
        Self {
            applications: applications
                .into_iter()
                .map(|app| (app.key.clone(), Arc::new(app)))
                .collect(),
        }
    }

    /// Load applications from a JSON array file.
    ///
    /// ```text
    /// [{"key": "app1", "secret": "s3cr3t", "name": "Widgets"}]
    /// ```
    pub fn from_json_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let applications: Vec<Application> =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_owned(),
                source,
            })?;

        debug!(path = %path.display(), count = applications.len(), "loaded applications");
        Ok(Self::new(applications))
    }

    /// Number of registered applications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.applications.len()
    }

    /// Whether the directory has no applications.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }
}

impl ConsumerDirectory for ApplicationDirectory {
    type Model = Application;

    fn find(&self, key: &str) -> Option<Arc<Application>> {
        self.applications.get(key).cloned()
    }
}
