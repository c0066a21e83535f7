//! Consumer records and the adapter from domain objects.
//!
//! A [`ConsumerRecord`] is built fresh on every store lookup and dropped at the
//! end of the request. When it comes from a table of domain objects (see
//! [`ConsumerModel`]), the object it was adapted from travels with it as the
//! record's backing reference.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

/// A domain object that can act as a consumer.
///
/// Implement this for whatever type the external directory stores (an
/// application row, a service account) so [`ConsumerRecord::from_model`] can
/// adapt it.
pub trait ConsumerModel: Send + Sync + 'static {
    /// The public consumer key.
    fn consumer_key(&self) -> &str;

    /// The shared secret.
    fn consumer_secret(&self) -> &str;
}

/// A registered consumer as seen by the authenticator.
///
/// The secret is never printed by `Debug`.
#[derive(Clone)]
pub struct ConsumerRecord {
    key: String,
    secret: String,
    backing: Option<Arc<dyn Any + Send + Sync>>,
}

impl ConsumerRecord {
    /// Create a record with no backing object.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
            backing: None,
        }
    }

    /// Adapt a domain object into a record, keeping the object as backing.
    pub fn from_model<M: ConsumerModel>(model: Arc<M>) -> Self {
        Self {
            key: model.consumer_key().to_owned(),
            secret: model.consumer_secret().to_owned(),
            backing: Some(model),
        }
    }

    /// The public consumer key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The shared secret.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// The backing object, if it is of type `T`.
    #[must_use]
    pub fn backing<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.backing.as_deref().and_then(|b| b.downcast_ref::<T>())
    }

    /// Whether this record was adapted from a domain object.
    #[must_use]
    pub fn has_backing(&self) -> bool {
        self.backing.is_some()
    }
}

impl fmt::Debug for ConsumerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumerRecord")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .field("backing", &self.backing.is_some())
            .finish()
    }
}

/// A registered client application, as stored in an applications file.
#[derive(Clone, Deserialize)]
pub struct Application {
    /// Public consumer key.
    pub key: String,
    /// Shared secret.
    pub secret: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: Option<String>,
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("key", &self.key)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl ConsumerModel for Application {
    fn consumer_key(&self) -> &str {
        &self.key
    }

    fn consumer_secret(&self) -> &str {
        &self.secret
    }
}
