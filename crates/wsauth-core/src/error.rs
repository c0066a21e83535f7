//! Error types for wsauth configuration.

use std::path::PathBuf;

/// Errors raised while configuring the process.
///
/// Every variant is fatal at startup: a process without a valid consumer store
/// must not serve requests.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No consumer store name was configured.
    #[error("a consumer store is required: set CONSUMER_STORE")]
    MissingConsumerStore,

    /// The configured consumer store name is not registered.
    #[error("unknown consumer store: {0}")]
    UnknownConsumerStore(String),

    /// The consumer store exists but its settings are unusable.
    #[error("invalid configuration for consumer store {name}: {reason}")]
    InvalidConsumerStore {
        /// Registered name of the store.
        name: String,
        /// What is wrong with the settings.
        reason: String,
    },

    /// A `key:secret` consumer entry could not be parsed.
    ///
    /// Only the position of the entry is reported so secrets never reach the logs.
    #[error("invalid consumer entry at position {0}: expected key:secret")]
    InvalidConsumerEntry(usize),

    /// A configuration file could not be read.
    #[error("failed to read {path}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid JSON for its expected shape.
    #[error("failed to parse {path}")]
    Parse {
        /// The file that failed.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;
