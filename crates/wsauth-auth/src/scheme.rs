//! Authentication schemes and `Authorization` header codecs.
//!
//! Two schemes are supported:
//!
//! ```text
//! Authorization: Basic base64(key:secret)
//! Authorization: OAuth oauth_consumer_key="app1", oauth_nonce="...", ..., oauth_signature="..."
//! ```
//!
//! The scheme set is closed. [`SCHEMES`] lists one [`SchemeEntry`] per scheme,
//! in the order the authenticator tries them, each holding the plain functions
//! that extract and produce that scheme's header.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use percent_encoding::percent_decode_str;

use crate::canonical::percent_encode;
use crate::error::{AuthError, AuthResult};
use crate::primitive::SignaturePrimitive;
use crate::signer::{Freshness, SigningRequest, sign_basic, sign_oauth};

/// OAuth parameter carrying the claimed consumer key.
pub const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
/// OAuth parameter carrying the signature.
pub const OAUTH_SIGNATURE: &str = "oauth_signature";
/// OAuth parameter naming the signature method.
pub const OAUTH_SIGNATURE_METHOD: &str = "oauth_signature_method";
/// OAuth parameter carrying the request timestamp (Unix seconds).
pub const OAUTH_TIMESTAMP: &str = "oauth_timestamp";
/// OAuth parameter carrying the request nonce.
pub const OAUTH_NONCE: &str = "oauth_nonce";
/// OAuth parameter carrying the protocol version.
pub const OAUTH_VERSION: &str = "oauth_version";
/// Header parameter that is never signed.
pub const REALM: &str = "realm";

/// A supported authentication scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthScheme {
    /// HTTP Basic: the secret itself, base64-encoded with the key.
    Basic,
    /// OAuth-style signed request: an HMAC over the canonical payload.
    OAuth,
}

impl AuthScheme {
    /// The header token for this scheme.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::OAuth => "OAuth",
        }
    }

    /// The dispatch table entry for this scheme.
    #[must_use]
    pub fn entry(self) -> &'static SchemeEntry {
        match self {
            Self::Basic => &SCHEMES[0],
            Self::OAuth => &SCHEMES[1],
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AuthScheme {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("basic") {
            Ok(Self::Basic)
        } else if s.eq_ignore_ascii_case("oauth") {
            Ok(Self::OAuth)
        } else {
            Err(AuthError::UnknownScheme(s.to_owned()))
        }
    }
}

/// OAuth parameters parsed from, or destined for, an `Authorization` header.
///
/// Names are unique; iteration is sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OAuthParams {
    params: BTreeMap<String, String>,
}

impl OAuthParams {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a parameter value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Set a parameter, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.params.insert(name.into(), value.into())
    }

    /// Remove a parameter, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.params.remove(name)
    }

    /// Iterate over `(name, value)` pairs, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for OAuthParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Credential material extracted from an `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Basic `key:secret`.
    Basic {
        /// Claimed consumer key (the user-name field).
        key: String,
        /// Supplied secret (the password field).
        secret: String,
    },
    /// OAuth header parameters.
    OAuth(OAuthParams),
}

impl Credentials {
    /// The scheme these credentials belong to.
    #[must_use]
    pub fn scheme(&self) -> AuthScheme {
        match self {
            Self::Basic { .. } => AuthScheme::Basic,
            Self::OAuth(_) => AuthScheme::OAuth,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { key, .. } => f
                .debug_struct("Basic")
                .field("key", key)
                .field("secret", &"<redacted>")
                .finish(),
            Self::OAuth(params) => f.debug_tuple("OAuth").field(params).finish(),
        }
    }
}

/// Produces an `Authorization` header value for one scheme.
pub type SignFn =
    fn(&SigningRequest<'_>, &dyn SignaturePrimitive, &Freshness) -> AuthResult<String>;

/// One scheme's extractor and signer.
pub struct SchemeEntry {
    /// The scheme.
    pub scheme: AuthScheme,
    /// Parse a header value; `None` when the header is not for this scheme or is malformed.
    pub extract: fn(&str) -> Option<Credentials>,
    /// Produce a header value for a request.
    pub sign: SignFn,
}

impl fmt::Debug for SchemeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemeEntry")
            .field("scheme", &self.scheme)
            .finish_non_exhaustive()
    }
}

/// Supported schemes, in the order the authenticator tries them.
///
/// Basic comes first so explicit Basic credentials never pay for an OAuth
/// signature computation.
pub static SCHEMES: [SchemeEntry; 2] = [
    SchemeEntry {
        scheme: AuthScheme::Basic,
        extract: extract_basic_credentials,
        sign: sign_basic,
    },
    SchemeEntry {
        scheme: AuthScheme::OAuth,
        extract: extract_oauth_credentials,
        sign: sign_oauth,
    },
];

/// Parse `Basic base64(key:secret)`.
///
/// The scheme token is matched case-insensitively. The decoded text is split
/// on its first `:`. Bad base64, non-UTF-8 text, or a missing `:` yield `None`.
///
/// # Examples
///
/// ```
/// use wsauth_auth::scheme::parse_basic;
///
/// assert_eq!(
///     parse_basic("basic YXBwMTpzM2NyM3Q="),
///     Some(("app1".to_owned(), "s3cr3t".to_owned()))
/// );
/// assert_eq!(parse_basic("Basic !!!"), None);
/// ```
#[must_use]
pub fn parse_basic(header: &str) -> Option<(String, String)> {
    let (scheme, data) = header.trim().split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = BASE64.decode(data.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (key, secret) = decoded.split_once(':')?;
    Some((key.to_owned(), secret.to_owned()))
}

/// Encode `Basic base64(key:secret)`.
///
/// A key containing `:` cannot be recovered by [`parse_basic`].
#[must_use]
pub fn encode_basic(key: &str, secret: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{key}:{secret}")))
}

/// Parse `OAuth name="value", ...`.
///
/// The scheme token must be exactly `OAuth`. Names and values are
/// percent-decoded; every value must be double-quoted. Any structural problem
/// (missing `=`, unquoted value, bad escape, repeated name) yields `None`.
///
/// # Examples
///
/// ```
/// use wsauth_auth::scheme::parse_oauth;
///
/// let header = r#"OAuth oauth_consumer_key="app1", oauth_signature="a%2Bb%3D""#;
/// let params = parse_oauth(header).unwrap();
/// assert_eq!(params.get("oauth_consumer_key"), Some("app1"));
/// assert_eq!(params.get("oauth_signature"), Some("a+b="));
/// assert!(parse_oauth(r#"oauth oauth_consumer_key="app1""#).is_none());
/// ```
#[must_use]
pub fn parse_oauth(header: &str) -> Option<OAuthParams> {
    let header = header.trim();
    let (scheme, rest) = header
        .split_once(char::is_whitespace)
        .unwrap_or((header, ""));
    if scheme != AuthScheme::OAuth.name() {
        return None;
    }

    let mut params = OAuthParams::new();
    for part in rest.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let (name, quoted) = part.split_once('=')?;
        let name = name.trim();
        let value = quoted.trim().strip_prefix('"')?.strip_suffix('"')?;
        if name.is_empty() {
            return None;
        }

        let name = percent_decode(name)?;
        let value = percent_decode(value)?;
        if params.insert(name, value).is_some() {
            return None;
        }
    }

    Some(params)
}

/// Serialize OAuth parameters as an `Authorization` header value.
///
/// The exact inverse of [`parse_oauth`]: names and values are percent-encoded
/// with the unreserved set, quoted, and joined with `, `.
#[must_use]
pub fn serialize_oauth(params: &OAuthParams) -> String {
    let body = params
        .iter()
        .map(|(name, value)| format!("{}=\"{}\"", percent_encode(name), percent_encode(value)))
        .collect::<Vec<_>>()
        .join(", ");

    if body.is_empty() {
        AuthScheme::OAuth.name().to_owned()
    } else {
        format!("{} {body}", AuthScheme::OAuth.name())
    }
}

fn extract_basic_credentials(header: &str) -> Option<Credentials> {
    parse_basic(header).map(|(key, secret)| Credentials::Basic { key, secret })
}

fn extract_oauth_credentials(header: &str) -> Option<Credentials> {
    parse_oauth(header).map(Credentials::OAuth)
}

fn percent_decode(input: &str) -> Option<String> {
    percent_decode_str(input)
        .decode_utf8()
        .ok()
        .map(std::borrow::Cow::into_owned)
}
