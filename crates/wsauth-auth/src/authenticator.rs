//! Request authentication.
//!
//! [`RequestAuthenticator::authenticate`] walks [`SCHEMES`] in priority order
//! and returns the first consumer a scheme resolves. Every failure (missing
//! header, malformed credentials, unknown key, wrong secret, bad signature)
//! produces the same outcome: `None`. Why a scheme declined is only visible in
//! debug logs, and those never carry secrets, signatures, or raw headers.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use tracing::debug;

use crate::canonical::{canonicalize, url_query_pairs};
use crate::compare::secrets_match;
use crate::consumer::ConsumerRecord;
use crate::primitive::{HmacSha1Primitive, SignaturePrimitive};
use crate::scheme::{Credentials, OAuthParams, SCHEMES};
use crate::store::ConsumerStore;

/// A consumer resolved for the current request.
#[derive(Debug, Clone)]
pub struct AuthenticatedConsumer(ConsumerRecord);

impl AuthenticatedConsumer {
    /// The consumer record.
    #[must_use]
    pub fn record(&self) -> &ConsumerRecord {
        &self.0
    }

    /// Take the consumer record.
    #[must_use]
    pub fn into_record(self) -> ConsumerRecord {
        self.0
    }
}

impl Deref for AuthenticatedConsumer {
    type Target = ConsumerRecord;

    fn deref(&self) -> &ConsumerRecord {
        &self.0
    }
}

/// The parts of an inbound request that authentication looks at.
#[derive(Debug, Clone, Copy)]
pub struct InboundRequest<'a> {
    /// HTTP method.
    pub method: &'a http::Method,
    /// Absolute URL as received, query included.
    pub url: &'a str,
    /// Raw `Authorization` header value, if any.
    pub authorization: Option<&'a str>,
}

impl<'a> InboundRequest<'a> {
    /// Describe an inbound request.
    #[must_use]
    pub fn new(method: &'a http::Method, url: &'a str, authorization: Option<&'a str>) -> Self {
        Self {
            method,
            url,
            authorization,
        }
    }
}

#[derive(Debug)]
enum SchemeOutcome {
    NotApplicable(&'static str),
    UnknownConsumer,
    Rejected,
    Resolved(ConsumerRecord),
}

impl SchemeOutcome {
    fn name(&self) -> &'static str {
        match self {
            Self::NotApplicable(_) => "not_applicable",
            Self::UnknownConsumer => "unknown_consumer",
            Self::Rejected => "rejected",
            Self::Resolved(_) => "resolved",
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Self::NotApplicable(reason) => *reason,
            _ => "",
        }
    }
}

/// Resolves the consumer behind a signed request.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use wsauth_auth::authenticator::{InboundRequest, RequestAuthenticator};
/// use wsauth_auth::store::StaticConsumerStore;
///
/// let store = StaticConsumerStore::new(vec![("app1".to_owned(), "s3cr3t".to_owned())]);
/// let authenticator = RequestAuthenticator::new(Arc::new(store));
///
/// let request = InboundRequest::new(
///     &http::Method::GET,
///     "http://host/widgets/?id=7",
///     Some("Basic YXBwMTpzM2NyM3Q="),
/// );
/// let consumer = authenticator.authenticate(&request).unwrap();
/// assert_eq!(consumer.key(), "app1");
/// ```
#[derive(Clone)]
pub struct RequestAuthenticator {
    store: Arc<dyn ConsumerStore>,
    primitive: Arc<dyn SignaturePrimitive>,
}

impl fmt::Debug for RequestAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestAuthenticator")
            .field("method", &self.primitive.method())
            .finish_non_exhaustive()
    }
}

impl RequestAuthenticator {
    /// Create an authenticator verifying OAuth signatures with `HMAC-SHA1`.
    #[must_use]
    pub fn new(store: Arc<dyn ConsumerStore>) -> Self {
        Self::with_primitive(store, Arc::new(HmacSha1Primitive))
    }

    /// Create an authenticator with a specific signature primitive.
    #[must_use]
    pub fn with_primitive(
        store: Arc<dyn ConsumerStore>,
        primitive: Arc<dyn SignaturePrimitive>,
    ) -> Self {
        Self { store, primitive }
    }

    /// The consumer store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ConsumerStore> {
        &self.store
    }

    /// Resolve the consumer that signed `request`, or `None`.
    pub fn authenticate(&self, request: &InboundRequest<'_>) -> Option<AuthenticatedConsumer> {
        let Some(header) = request.authorization else {
            debug!(method = %request.method, "no Authorization header");
            return None;
        };

        for entry in &SCHEMES {
            let outcome = match (entry.extract)(header) {
                Some(credentials) => self.verify(request, credentials),
                None => SchemeOutcome::NotApplicable("no credentials for scheme"),
            };
            debug!(
                scheme = entry.scheme.name(),
                outcome = outcome.name(),
                reason = outcome.reason(),
                "authentication scheme evaluated"
            );
            if let SchemeOutcome::Resolved(record) = outcome {
                return Some(AuthenticatedConsumer(record));
            }
        }

        None
    }

    fn verify(&self, request: &InboundRequest<'_>, credentials: Credentials) -> SchemeOutcome {
        match credentials {
            Credentials::Basic { key, secret } => self.verify_basic(&key, &secret),
            Credentials::OAuth(params) => self.verify_oauth(request, &params),
        }
    }

    fn verify_basic(&self, key: &str, secret: &str) -> SchemeOutcome {
        if key.is_empty() {
            return SchemeOutcome::NotApplicable("empty consumer key");
        }
        debug!(consumer_key = key, "verifying basic credentials");
        let Some(consumer) = self.store.lookup(key) else {
            return SchemeOutcome::UnknownConsumer;
        };

        if secrets_match(secret, consumer.secret()) {
            SchemeOutcome::Resolved(consumer)
        } else {
            SchemeOutcome::Rejected
        }
    }

    fn verify_oauth(&self, request: &InboundRequest<'_>, params: &OAuthParams) -> SchemeOutcome {
        if !self.primitive.accepts(params) {
            return SchemeOutcome::NotApplicable("unsupported signature method or version");
        }
        let Some(key) = self.primitive.extract_claimed_key(params) else {
            return SchemeOutcome::NotApplicable("no consumer key");
        };
        let Some(claimed) = self.primitive.extract_claimed_signature(params) else {
            return SchemeOutcome::NotApplicable("no signature");
        };
        let query = url_query_pairs(request.url);
        let Ok(payload) = canonicalize(request.method, request.url, &query) else {
            return SchemeOutcome::NotApplicable("request URL cannot be canonicalized");
        };
        debug!(consumer_key = key, url = %payload.url(), "verifying oauth signature");
        let Some(consumer) = self.store.lookup(key) else {
            return SchemeOutcome::UnknownConsumer;
        };

        let expected = self.primitive.sign(consumer.secret(), &payload, params);
        if secrets_match(claimed, &expected) {
            SchemeOutcome::Resolved(consumer)
        } else {
            SchemeOutcome::Rejected
        }
    }
}
