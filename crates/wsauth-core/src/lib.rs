//! Configuration and shared error types for wsauth.
//!
//! This crate holds the pieces every other wsauth crate needs at startup:
//! the environment-driven [`WsAuthConfig`], the consumer store section of it,
//! and the [`ConfigError`] raised when the process cannot be configured.

mod config;
mod error;

pub use config::{ConsumerEntry, ConsumerStoreConfig, WsAuthConfig, parse_consumers};
pub use error::{ConfigError, ConfigResult};
