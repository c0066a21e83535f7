//! Request-context helpers.
//!
//! [`AuthenticationService`](crate::service::AuthenticationService) records its
//! outcome in the request extensions; handlers read it back from there.

use std::net::{IpAddr, SocketAddr};

use http::header::HOST;
use wsauth_auth::AuthenticatedConsumer;

/// Peer address of the connection a request arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteAddr(pub SocketAddr);

/// The consumer resolved for this request, if any.
///
/// # Examples
///
/// ```
/// use wsauth_http::context::authenticated_consumer;
///
/// let request = http::Request::get("/widgets/").body(()).unwrap();
/// assert!(authenticated_consumer(&request).is_none());
/// ```
#[must_use]
pub fn authenticated_consumer<B>(request: &http::Request<B>) -> Option<&AuthenticatedConsumer> {
    request.extensions().get::<AuthenticatedConsumer>()
}

/// The connection peer address, if the server recorded one.
#[must_use]
pub fn remote_addr<B>(request: &http::Request<B>) -> Option<SocketAddr> {
    request.extensions().get::<RemoteAddr>().map(|addr| addr.0)
}

/// Rebuild the absolute URL a client addressed.
///
/// Absolute-form targets are used as-is. Origin-form targets (`/path?query`)
/// are resolved against the `Host` header and `default_scheme`. Returns `None`
/// when there is no usable host.
///
/// # Examples
///
/// ```
/// use wsauth_http::context::request_url;
///
/// let request = http::Request::get("/widgets/?id=7")
///     .header("host", "api.example.com:8000")
///     .body(())
///     .unwrap();
/// assert_eq!(
///     request_url(&request, "http").as_deref(),
///     Some("http://api.example.com:8000/widgets/?id=7")
/// );
/// ```
#[must_use]
pub fn request_url<B>(request: &http::Request<B>, default_scheme: &str) -> Option<String> {
    let uri = request.uri();
    if uri.scheme().is_some() && uri.authority().is_some() {
        return Some(uri.to_string());
    }

    let host = request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .filter(|host| !host.is_empty())
        .or_else(|| uri.authority().map(http::uri::Authority::as_str))?;
    let path_and_query = uri
        .path_and_query()
        .map_or("/", http::uri::PathAndQuery::as_str);

    Some(format!("{default_scheme}://{host}{path_and_query}"))
}

/// Identifier for throttling per consumer and origin.
///
/// Formats as `{consumer_key}_{remote_addr}_{remote_host}`; a missing address
/// or host becomes `noaddr` or `nohost`. The secret is never included.
///
/// # Examples
///
/// ```
/// use wsauth_http::context::rate_limit_identifier;
/// # use std::sync::Arc;
/// # use wsauth_auth::{InboundRequest, RequestAuthenticator, StaticConsumerStore};
/// # let store = StaticConsumerStore::new(vec![("app1".to_owned(), "s3cr3t".to_owned())]);
/// # let consumer = RequestAuthenticator::new(Arc::new(store))
/// #     .authenticate(&InboundRequest::new(
/// #         &http::Method::GET,
/// #         "http://h/",
/// #         Some("Basic YXBwMTpzM2NyM3Q="),
/// #     ))
/// #     .unwrap();
///
/// let id = rate_limit_identifier(&consumer, Some("10.0.0.1".parse().unwrap()), None);
/// assert_eq!(id, "app1_10.0.0.1_nohost");
/// ```
#[must_use]
pub fn rate_limit_identifier(
    consumer: &AuthenticatedConsumer,
    remote_addr: Option<IpAddr>,
    remote_host: Option<&str>,
) -> String {
    let addr = remote_addr.map_or_else(|| "noaddr".to_owned(), |addr| addr.to_string());
    let host = remote_host.filter(|h| !h.is_empty()).unwrap_or("nohost");
    format!("{}_{addr}_{host}", consumer.key())
}
