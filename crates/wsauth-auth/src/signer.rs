//! Client-side request signing.
//!
//! [`RequestSigner`] produces `Authorization` header values that
//! [`RequestAuthenticator`](crate::authenticator::RequestAuthenticator)
//! accepts. OAuth headers get a fresh UUID nonce and the current Unix time.
//!
//! # Examples
//!
//! ```
//! use wsauth_auth::scheme::AuthScheme;
//! use wsauth_auth::signer::{RequestSigner, SigningRequest};
//!
//! let signer = RequestSigner::default();
//! let header = signer
//!     .sign(
//!         AuthScheme::OAuth,
//!         &SigningRequest::new(&http::Method::GET, "http://host/widgets/?id=7", "app1", "s3cr3t"),
//!     )
//!     .unwrap();
//! assert!(header.starts_with("OAuth "));
//! assert!(header.contains("oauth_signature="));
//! ```

use std::fmt;
use std::sync::Arc;

use http::HeaderValue;
use http::header::AUTHORIZATION;

use crate::canonical::{canonicalize, url_query_pairs};
use crate::consumer::ConsumerRecord;
use crate::error::AuthResult;
use crate::primitive::{HmacSha1Primitive, OAUTH_VERSION_1_0, SignaturePrimitive};
use crate::scheme::{
    AuthScheme, OAUTH_CONSUMER_KEY, OAUTH_NONCE, OAUTH_SIGNATURE, OAUTH_SIGNATURE_METHOD,
    OAUTH_TIMESTAMP, OAUTH_VERSION, OAuthParams, encode_basic, serialize_oauth,
};
use crate::store::ConsumerStore;

/// A request to be signed on behalf of a consumer.
///
/// `url` must be absolute. For GET its query becomes part of the signed
/// payload; for every other method the query is not covered.
#[derive(Clone, Copy)]
pub struct SigningRequest<'a> {
    /// HTTP method.
    pub method: &'a http::Method,
    /// Absolute URL, query included.
    pub url: &'a str,
    /// Consumer key.
    pub consumer_key: &'a str,
    /// Consumer secret.
    pub consumer_secret: &'a str,
}

impl<'a> SigningRequest<'a> {
    /// Create a signing request.
    #[must_use]
    pub fn new(
        method: &'a http::Method,
        url: &'a str,
        consumer_key: &'a str,
        consumer_secret: &'a str,
    ) -> Self {
        Self {
            method,
            url,
            consumer_key,
            consumer_secret,
        }
    }
}

impl fmt::Debug for SigningRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningRequest")
            .field("method", self.method)
            .field("url", &self.url)
            .field("consumer_key", &self.consumer_key)
            .finish_non_exhaustive()
    }
}

/// Nonce and timestamp bound into an OAuth signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Freshness {
    /// Single-use random string.
    pub nonce: String,
    /// Unix time in seconds.
    pub timestamp: i64,
}

impl Freshness {
    /// A new UUID v4 nonce stamped with the current time.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            nonce: uuid::Uuid::new_v4().simple().to_string(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// Produces `Authorization` header values.
#[derive(Clone)]
pub struct RequestSigner {
    primitive: Arc<dyn SignaturePrimitive>,
}

impl Default for RequestSigner {
    fn default() -> Self {
        Self::with_primitive(Arc::new(HmacSha1Primitive))
    }
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("method", &self.primitive.method())
            .finish()
    }
}

impl RequestSigner {
    /// Create a signer using a specific signature primitive.
    #[must_use]
    pub fn with_primitive(primitive: Arc<dyn SignaturePrimitive>) -> Self {
        Self { primitive }
    }

    /// Produce the header value for `scheme`.
    ///
    /// # Errors
    ///
    /// Returns an error if an OAuth request URL is not absolute.
    pub fn sign(&self, scheme: AuthScheme, request: &SigningRequest<'_>) -> AuthResult<String> {
        (scheme.entry().sign)(request, self.primitive.as_ref(), &Freshness::generate())
    }

    /// Produce an OAuth header value with a caller-chosen nonce and timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the request URL is not absolute.
    pub fn sign_oauth_with(
        &self,
        request: &SigningRequest<'_>,
        freshness: &Freshness,
    ) -> AuthResult<String> {
        sign_oauth(request, self.primitive.as_ref(), freshness)
    }

    /// Sign an outgoing `http::Request` in place.
    ///
    /// The request URI must be absolute. The header is marked sensitive.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI is not absolute or the produced value is
    /// not a valid header.
    pub fn sign_http_request<B>(
        &self,
        request: &mut http::Request<B>,
        scheme: AuthScheme,
        consumer_key: &str,
        consumer_secret: &str,
    ) -> AuthResult<()> {
        let url = request.uri().to_string();
        let header = self.sign(
            scheme,
            &SigningRequest::new(request.method(), &url, consumer_key, consumer_secret),
        )?;

        let mut value = HeaderValue::try_from(header)?;
        value.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, value);
        Ok(())
    }
}

/// Signs requests as one registered consumer.
#[derive(Debug, Clone)]
pub struct ConsumerSigner {
    consumer: ConsumerRecord,
    scheme: AuthScheme,
    signer: RequestSigner,
}

impl ConsumerSigner {
    /// Create a signer for a known consumer.
    #[must_use]
    pub fn new(consumer: ConsumerRecord, scheme: AuthScheme) -> Self {
        Self {
            consumer,
            scheme,
            signer: RequestSigner::default(),
        }
    }

    /// Look up `key` in `store` and sign as that consumer.
    ///
    /// Returns `None` if the store does not know the key.
    pub fn for_consumer(store: &dyn ConsumerStore, key: &str, scheme: AuthScheme) -> Option<Self> {
        store.lookup(key).map(|consumer| Self::new(consumer, scheme))
    }

    /// The consumer key requests are signed as.
    #[must_use]
    pub fn key(&self) -> &str {
        self.consumer.key()
    }

    /// The scheme requests are signed with.
    #[must_use]
    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }

    /// Produce the `Authorization` header value for a request.
    ///
    /// # Errors
    ///
    /// Returns an error if an OAuth request URL is not absolute.
    pub fn authorization(&self, method: &http::Method, url: &str) -> AuthResult<String> {
        self.signer.sign(
            self.scheme,
            &SigningRequest::new(method, url, self.consumer.key(), self.consumer.secret()),
        )
    }

    /// Sign an outgoing `http::Request` in place.
    ///
    /// # Errors
    ///
    /// See [`RequestSigner::sign_http_request`].
    pub fn sign_http_request<B>(&self, request: &mut http::Request<B>) -> AuthResult<()> {
        self.signer.sign_http_request(
            request,
            self.scheme,
            self.consumer.key(),
            self.consumer.secret(),
        )
    }
}

pub(crate) fn sign_basic(
    request: &SigningRequest<'_>,
    _primitive: &dyn SignaturePrimitive,
    _freshness: &Freshness,
) -> AuthResult<String> {
    Ok(encode_basic(request.consumer_key, request.consumer_secret))
}

pub(crate) fn sign_oauth(
    request: &SigningRequest<'_>,
    primitive: &dyn SignaturePrimitive,
    freshness: &Freshness,
) -> AuthResult<String> {
    let query = url_query_pairs(request.url);
    let payload = canonicalize(request.method, request.url, &query)?;

    let mut params = OAuthParams::new();
    params.insert(OAUTH_CONSUMER_KEY, request.consumer_key);
    params.insert(OAUTH_NONCE, freshness.nonce.as_str());
    params.insert(OAUTH_SIGNATURE_METHOD, primitive.method());
    params.insert(OAUTH_TIMESTAMP, freshness.timestamp.to_string());
    params.insert(OAUTH_VERSION, OAUTH_VERSION_1_0);

    let signature = primitive.sign(request.consumer_secret, &payload, &params);
    params.insert(OAUTH_SIGNATURE, signature);
    Ok(serialize_oauth(&params))
}
