//! Canonical request payloads.
//!
//! Signer and verifier both reduce a request to a [`CanonicalPayload`]:
//!
//! ```text
//! method   GET
//! url      http://host/widgets/          (scheme + host + path, no query)
//! params   [("id", "7")]                 (GET only, sorted after encoding)
//! ```
//!
//! Only GET requests carry their query parameters into the payload; for every
//! other method the parameter set is empty and the body is not covered.

use std::borrow::Cow;

use percent_encoding::{
    AsciiSet, NON_ALPHANUMERIC, percent_decode_str, percent_encode as encode_bytes,
    utf8_percent_encode,
};

use crate::error::{AuthError, AuthResult};

/// Characters that must be percent-encoded in signature material.
///
/// Everything except the RFC 3986 unreserved characters
/// (A-Z, a-z, 0-9, `-`, `_`, `.`, `~`).
const UNRESERVED_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Characters percent-encoded inside a path segment.
///
/// Unreserved characters, sub-delims, `:` and `@` stay literal.
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &UNRESERVED_ENCODE_SET
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b':')
    .remove(b'@');

/// The normalized form of a request that a signature covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPayload {
    method: http::Method,
    url: String,
    params: Vec<(String, String)>,
}

impl CanonicalPayload {
    /// The request method.
    #[must_use]
    pub fn method(&self) -> &http::Method {
        &self.method
    }

    /// The normalized absolute URL, without query.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The covered parameters, sorted by encoded name then encoded value.
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Build the canonical payload for a request.
///
/// `absolute_url` must already be absolute; any query it carries is ignored in
/// favor of `query_params`. Parameter order does not matter.
///
/// # Errors
///
/// Returns [`AuthError::RelativeUrl`] or [`AuthError::InvalidUrl`] if the URL
/// cannot be normalized.
///
/// # Examples
///
/// ```
/// use wsauth_auth::canonical::canonicalize;
///
/// let a = canonicalize(
///     &http::Method::GET,
///     "HTTP://Host:80/widgets/?ignored=1",
///     &[("b".into(), "2".into()), ("a".into(), "1".into())],
/// )
/// .unwrap();
/// assert_eq!(a.url(), "http://host/widgets/");
/// assert_eq!(a.params()[0].0, "a");
/// ```
pub fn canonicalize(
    method: &http::Method,
    absolute_url: &str,
    query_params: &[(String, String)],
) -> AuthResult<CanonicalPayload> {
    let url = normalize_url(absolute_url)?;

    let params = if *method == http::Method::GET {
        let mut params = query_params.to_vec();
        params.sort_by(|(ak, av), (bk, bv)| {
            (percent_encode(ak), percent_encode(av)).cmp(&(percent_encode(bk), percent_encode(bv)))
        });
        params
    } else {
        Vec::new()
    };

    Ok(CanonicalPayload {
        method: method.clone(),
        url,
        params,
    })
}

/// Normalize an absolute URL for signing.
///
/// Scheme and host are lowercased, user-info and default ports (80 for http,
/// 443 for https) are dropped, and query and fragment are removed. The path
/// goes through [`normalize_path`].
///
/// # Errors
///
/// Returns [`AuthError::RelativeUrl`] if the URL has no scheme or host, and
/// [`AuthError::InvalidUrl`] if it cannot be parsed.
///
/// # Examples
///
/// ```
/// use wsauth_auth::canonical::normalize_url;
///
/// assert_eq!(normalize_url("https://API.example.com:443").unwrap(), "https://api.example.com/");
/// assert_eq!(normalize_url("http://host:8080/a/b?c=d#e").unwrap(), "http://host:8080/a/b");
/// assert_eq!(normalize_url("http://host/a/./{x}").unwrap(), "http://host/a/%7Bx%7D");
/// assert!(normalize_url("/widgets/").is_err());
/// ```
pub fn normalize_url(absolute_url: &str) -> AuthResult<String> {
    // Fragments are never sent to servers and `http::Uri` rejects them.
    let without_fragment = absolute_url
        .split_once('#')
        .map_or(absolute_url, |(before, _)| before);

    let uri: http::Uri = without_fragment
        .parse()
        .map_err(|_| AuthError::InvalidUrl(absolute_url.to_owned()))?;

    let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) else {
        return Err(AuthError::RelativeUrl(absolute_url.to_owned()));
    };

    let scheme = scheme.to_ascii_lowercase();
    let host = authority.host().to_ascii_lowercase();
    let port = match (scheme.as_str(), authority.port_u16()) {
        ("http", Some(80)) | ("https", Some(443)) | (_, None) => String::new(),
        (_, Some(port)) => format!(":{port}"),
    };
    let path = normalize_path(uri.path());

    Ok(format!("{scheme}://{host}{port}{path}"))
}

/// Normalize a URL path so that every equivalent spelling signs the same.
///
/// Each segment is percent-decoded and re-encoded with uppercase hex, keeping
/// only unreserved characters, sub-delims, `:` and `@` literal. `.` and `..`
/// segments are removed (RFC 3986 section 5.2.4). An empty path becomes `/`.
///
/// HTTP clients rewrite paths the same way before sending, so a URL signed
/// as written still matches what the server receives.
///
/// # Examples
///
/// ```
/// use wsauth_auth::canonical::normalize_path;
///
/// assert_eq!(normalize_path(""), "/");
/// assert_eq!(normalize_path("/a/b/../c/./d"), "/a/c/d");
/// assert_eq!(normalize_path("/%7ex/%7b%7d|"), "/~x/%7B%7D%7C");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let mut segments: Vec<String> = Vec::new();
    let raw: Vec<&str> = path.strip_prefix('/').unwrap_or(path).split('/').collect();
    let last = raw.len() - 1;

    for (index, segment) in raw.iter().enumerate() {
        let decoded: Cow<'_, [u8]> = percent_decode_str(segment).into();
        match decoded.as_ref() {
            b"." => {}
            b".." => {
                segments.pop();
            }
            bytes => {
                segments.push(encode_bytes(bytes, PATH_SEGMENT_ENCODE_SET).to_string());
                continue;
            }
        }
        // A trailing dot segment still names a directory.
        if index == last {
            segments.push(String::new());
        }
    }

    format!("/{}", segments.join("/"))
}

/// Decode a raw query string into name/value pairs.
///
/// Uses `application/x-www-form-urlencoded` rules; repeated names are kept.
///
/// # Examples
///
/// ```
/// use wsauth_auth::canonical::query_pairs;
///
/// assert_eq!(
///     query_pairs("id=7&tag=a+b&tag=c"),
///     vec![
///         ("id".to_owned(), "7".to_owned()),
///         ("tag".to_owned(), "a b".to_owned()),
///         ("tag".to_owned(), "c".to_owned()),
///     ]
/// );
/// ```
#[must_use]
pub fn query_pairs(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Split the query component off an absolute URL and decode it.
#[must_use]
pub fn url_query_pairs(absolute_url: &str) -> Vec<(String, String)> {
    let without_fragment = absolute_url
        .split_once('#')
        .map_or(absolute_url, |(before, _)| before);
    without_fragment
        .split_once('?')
        .map(|(_, query)| query_pairs(query))
        .unwrap_or_default()
}

/// Percent-encode a value with the RFC 3986 unreserved set.
#[must_use]
pub fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, UNRESERVED_ENCODE_SET).to_string()
}
