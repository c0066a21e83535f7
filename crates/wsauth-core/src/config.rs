//! Process configuration.
//!
//! Configuration is driven by environment variables. The consumer store is
//! selected by name (`CONSUMER_STORE`) and resolved once at startup; the other
//! store settings are only read by the store implementation that needs them.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::{ConfigError, ConfigResult};

/// A registered consumer given directly in configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerEntry {
    /// Public consumer key.
    pub key: String,
    /// Shared secret.
    pub secret: String,
}

impl ConsumerEntry {
    /// Create a new entry.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for ConsumerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumerEntry")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Settings for the consumer store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerStoreConfig {
    /// Registered name of the store implementation (e.g. `static`, `json-file`).
    #[builder(default, setter(strip_option, into))]
    pub kind: Option<String>,

    /// Consumers for the `static` store.
    #[builder(default)]
    pub consumers: Vec<ConsumerEntry>,

    /// Path of the applications file for the `json-file` store.
    #[builder(default, setter(strip_option, into))]
    pub file: Option<PathBuf>,
}

/// Global configuration for wsauth.
///
/// # Examples
///
/// ```
/// use wsauth_core::WsAuthConfig;
///
/// let config = WsAuthConfig::default();
/// assert_eq!(config.listen, "0.0.0.0:8000");
/// assert_eq!(config.url_scheme, "http");
/// assert!(config.store.kind.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct WsAuthConfig {
    /// Bind address for the server.
    #[builder(default = String::from("0.0.0.0:8000"))]
    pub listen: String,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    #[builder(default)]
    pub json_logs: bool,

    /// Scheme used to turn origin-form request targets into absolute URLs.
    #[builder(default = String::from("http"))]
    pub url_scheme: String,

    /// Consumer store settings.
    #[builder(default)]
    pub store: ConsumerStoreConfig,
}

impl Default for WsAuthConfig {
    fn default() -> Self {
        Self {
            listen: String::from("0.0.0.0:8000"),
            log_level: String::from("info"),
            json_logs: false,
            url_scheme: String::from("http"),
            store: ConsumerStoreConfig::default(),
        }
    }
}

impl WsAuthConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `WSAUTH_LISTEN` | `0.0.0.0:8000` |
    /// | `LOG_LEVEL` | `info` |
    /// | `LOG_FORMAT` | `text` (`json` for JSON lines) |
    /// | `WSAUTH_URL_SCHEME` | `http` |
    /// | `CONSUMER_STORE` | *(unset)* |
    /// | `CONSUMERS` | *(empty)* |
    /// | `CONSUMER_FILE` | *(unset)* |
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConsumerEntry`] if `CONSUMERS` contains an
    /// entry that is not `key:secret`.
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("WSAUTH_LISTEN") {
            config.listen = v;
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Ok(v) = std::env::var("LOG_FORMAT") {
            config.json_logs = v.eq_ignore_ascii_case("json");
        }
        if let Ok(v) = std::env::var("WSAUTH_URL_SCHEME") {
            config.url_scheme = v.to_ascii_lowercase();
        }
        if let Ok(v) = std::env::var("CONSUMER_STORE") {
            let v = v.trim();
            if !v.is_empty() {
                config.store.kind = Some(v.to_owned());
            }
        }
        if let Ok(v) = std::env::var("CONSUMERS") {
            config.store.consumers = parse_consumers(&v)?;
        }
        if let Ok(v) = std::env::var("CONSUMER_FILE") {
            config.store.file = Some(PathBuf::from(v));
        }

        Ok(config)
    }
}

/// Parse a comma-separated list of `key:secret` pairs.
///
/// The secret is everything after the first `:`, so it may itself contain `:`.
/// Blank entries are skipped.
///
/// # Examples
///
/// ```
/// use wsauth_core::parse_consumers;
///
/// let entries = parse_consumers("app1:s3cr3t, app2:a:b").unwrap();
/// assert_eq!(entries[0].key, "app1");
/// assert_eq!(entries[1].secret, "a:b");
/// ```
pub fn parse_consumers(value: &str) -> ConfigResult<Vec<ConsumerEntry>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .enumerate()
        .map(|(position, entry)| match entry.split_once(':') {
            Some((key, secret)) if !key.is_empty() && !secret.is_empty() => {
                Ok(ConsumerEntry::new(key, secret))
            }
            _ => Err(ConfigError::InvalidConsumerEntry(position)),
        })
        .collect()
}
