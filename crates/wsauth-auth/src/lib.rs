//! Signed-request authentication for service-to-service HTTP calls.
//!
//! A service that exposes an API to other services holds a table of registered
//! consumers, each with a public key and a shared secret. Callers prove who they
//! are with one of two `Authorization` schemes:
//!
//! - `Basic`: the key and secret themselves, base64-encoded;
//! - `OAuth`: a two-legged OAuth 1.0 style `HMAC-SHA1` signature over the
//!   request method, URL, and (for GET) query parameters.
//!
//! This crate implements both sides: verifying inbound requests and signing
//! outbound ones.
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use wsauth_auth::authenticator::{InboundRequest, RequestAuthenticator};
//! use wsauth_auth::scheme::AuthScheme;
//! use wsauth_auth::signer::{RequestSigner, SigningRequest};
//! use wsauth_auth::store::StaticConsumerStore;
//!
//! let store = StaticConsumerStore::new(vec![("app1".to_owned(), "s3cr3t".to_owned())]);
//! let authenticator = RequestAuthenticator::new(Arc::new(store));
//!
//! let url = "http://api.example.com/widgets/?id=7";
//! let header = RequestSigner::default()
//!     .sign(
//!         AuthScheme::OAuth,
//!         &SigningRequest::new(&http::Method::GET, url, "app1", "s3cr3t"),
//!     )
//!     .unwrap();
//!
//! let consumer = authenticator
//!     .authenticate(&InboundRequest::new(&http::Method::GET, url, Some(header.as_str())))
//!     .unwrap();
//! assert_eq!(consumer.key(), "app1");
//! ```
//!
//! # Modules
//!
//! - [`authenticator`] - Resolve the consumer behind an inbound request
//! - [`canonical`] - Canonical payload construction and URL normalization
//! - [`compare`] - Constant-time secret comparison
//! - [`consumer`] - Consumer records and the domain-object adapter
//! - [`error`] - Signing error types
//! - [`primitive`] - Signature primitives (`HMAC-SHA1`)
//! - [`registry`] - Consumer store selection by name
//! - [`scheme`] - `Basic` and `OAuth` header codecs and the scheme table
//! - [`signer`] - Client-side request signing
//! - [`store`] - Consumer store trait and implementations

pub mod authenticator;
pub mod canonical;
pub mod compare;
pub mod consumer;
pub mod error;
pub mod primitive;
pub mod registry;
pub mod scheme;
pub mod signer;
pub mod store;

pub use authenticator::{AuthenticatedConsumer, InboundRequest, RequestAuthenticator};
pub use consumer::{Application, ConsumerModel, ConsumerRecord};
pub use error::{AuthError, AuthResult};
pub use registry::ConsumerStoreRegistry;
pub use scheme::AuthScheme;
pub use signer::{ConsumerSigner, RequestSigner, SigningRequest};
pub use store::{ConsumerStore, StaticConsumerStore};
