//! Signature primitives.
//!
//! A [`SignaturePrimitive`] knows how to compute a signature over a
//! [`CanonicalPayload`] plus the OAuth protocol parameters, and where in an
//! OAuth parameter set the claimed key and signature live.
//!
//! [`HmacSha1Primitive`] implements the OAuth 1.0 `HMAC-SHA1` method:
//!
//! ```text
//! BaseString = METHOD & enc(url) & enc(sorted(enc(name)=enc(value) joined by "&"))
//! Key        = enc(consumer_secret) & ""
//! Signature  = Base64( HMAC-SHA1( Key, BaseString ) )
//! ```
//!
//! The parameter list is the canonical query parameters plus every OAuth
//! parameter except `oauth_signature` and `realm`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, KeyInit, Mac};
use sha1::Sha1;

use crate::canonical::{CanonicalPayload, percent_encode};
use crate::scheme::{
    OAUTH_CONSUMER_KEY, OAUTH_SIGNATURE, OAUTH_SIGNATURE_METHOD, OAUTH_VERSION, OAuthParams, REALM,
};

type HmacSha1 = Hmac<Sha1>;

/// The only OAuth protocol version accepted.
pub const OAUTH_VERSION_1_0: &str = "1.0";

/// A signature algorithm usable by the OAuth scheme.
///
/// Signing must be deterministic: the same secret, payload, and protocol
/// parameters always produce the same signature.
pub trait SignaturePrimitive: Send + Sync {
    /// The `oauth_signature_method` value this primitive implements.
    fn method(&self) -> &'static str;

    /// Sign a canonical payload together with the OAuth protocol parameters.
    ///
    /// `oauth_signature` and `realm` in `protocol_params` must be ignored.
    fn sign(
        &self,
        secret: &str,
        payload: &CanonicalPayload,
        protocol_params: &OAuthParams,
    ) -> String;

    /// Whether this primitive can verify the given parameters.
    ///
    /// A missing `oauth_signature_method` is tolerated; a present one must
    /// name this primitive. A present `oauth_version` must be `1.0`.
    fn accepts(&self, credentials: &OAuthParams) -> bool {
        let method_ok = credentials
            .get(OAUTH_SIGNATURE_METHOD)
            .is_none_or(|m| m == self.method());
        let version_ok = credentials
            .get(OAUTH_VERSION)
            .is_none_or(|v| v == OAUTH_VERSION_1_0);
        method_ok && version_ok
    }

    /// The claimed consumer key, if present and non-empty.
    fn extract_claimed_key<'a>(&self, credentials: &'a OAuthParams) -> Option<&'a str> {
        credentials
            .get(OAUTH_CONSUMER_KEY)
            .filter(|key| !key.is_empty())
    }

    /// The claimed signature, if present and non-empty.
    fn extract_claimed_signature<'a>(&self, credentials: &'a OAuthParams) -> Option<&'a str> {
        credentials
            .get(OAUTH_SIGNATURE)
            .filter(|signature| !signature.is_empty())
    }
}

/// OAuth 1.0 `HMAC-SHA1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha1Primitive;

impl HmacSha1Primitive {
    /// The signature method name.
    pub const METHOD: &'static str = "HMAC-SHA1";

    /// Build the signature base string.
    ///
    /// # Examples
    ///
    /// ```
    /// use wsauth_auth::canonical::canonicalize;
    /// use wsauth_auth::primitive::HmacSha1Primitive;
    /// use wsauth_auth::scheme::OAuthParams;
    ///
    /// let payload = canonicalize(
    ///     &http::Method::GET,
    ///     "http://host/widgets/",
    ///     &[("id".into(), "7".into())],
    /// )
    /// .unwrap();
    /// let params: OAuthParams = [("oauth_consumer_key", "app1")].into_iter().collect();
    ///
    /// assert_eq!(
    ///     HmacSha1Primitive::base_string(&payload, &params),
    ///     "GET&http%3A%2F%2Fhost%2Fwidgets%2F&id%3D7%26oauth_consumer_key%3Dapp1"
    /// );
    /// ```
    #[must_use]
    pub fn base_string(payload: &CanonicalPayload, protocol_params: &OAuthParams) -> String {
        let mut encoded: Vec<(String, String)> = payload
            .params()
            .iter()
            .map(|(k, v)| (percent_encode(k), percent_encode(v)))
            .chain(
                protocol_params
                    .iter()
                    .filter(|(name, _)| *name != OAUTH_SIGNATURE && *name != REALM)
                    .map(|(k, v)| (percent_encode(k), percent_encode(v))),
            )
            .collect();
        encoded.sort();

        let normalized = encoded
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        format!(
            "{}&{}&{}",
            payload.method().as_str().to_ascii_uppercase(),
            percent_encode(payload.url()),
            percent_encode(&normalized)
        )
    }
}

impl SignaturePrimitive for HmacSha1Primitive {
    fn method(&self) -> &'static str {
        Self::METHOD
    }

    fn sign(
        &self,
        secret: &str,
        payload: &CanonicalPayload,
        protocol_params: &OAuthParams,
    ) -> String {
        let key = format!("{}&", percent_encode(secret));
        let base_string = Self::base_string(payload, protocol_params);

        let mut mac =
            HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC can accept any key length");
        mac.update(base_string.as_bytes());
        BASE64.encode(mac.finalize().into_bytes())
    }
}
