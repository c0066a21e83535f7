//! Error types for request signing and canonicalization.
//!
//! Verification never surfaces these: every per-scheme failure inside the
//! authenticator collapses to "no consumer resolved". [`AuthError`] is only
//! returned to callers that build or sign requests.

/// Errors that can occur while canonicalizing or signing a request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The URL has no scheme or host; resolve it against the server base first.
    #[error("URL is not absolute: {0}")]
    RelativeUrl(String),

    /// The URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The produced `Authorization` value is not a valid HTTP header value.
    #[error("invalid Authorization header value")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// The scheme name is not one of the supported schemes.
    #[error("unknown authentication scheme: {0}")]
    UnknownScheme(String),
}

/// Convenience result type for signing operations.
pub type AuthResult<T> = Result<T, AuthError>;
