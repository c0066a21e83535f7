//! Authentication layer as a hyper `Service`.
//!
//! [`AuthenticationService`] runs the [`RequestAuthenticator`] on every request
//! and records the outcome in the request extensions before calling the inner
//! service. It never rejects anything itself; that is the job of
//! [`ConsumerRequired`](crate::gate::ConsumerRequired).

use std::net::SocketAddr;
use std::sync::Arc;

use http::header::AUTHORIZATION;
use hyper::service::Service;
use tracing::debug;
use wsauth_auth::{AuthenticatedConsumer, InboundRequest, RequestAuthenticator};

use crate::context::{RemoteAddr, request_url};

/// Annotates each request with the consumer that signed it.
///
/// Any [`AuthenticatedConsumer`] already present in the extensions is removed
/// first, so only this layer can set it.
#[derive(Debug, Clone)]
pub struct AuthenticationService<S> {
    inner: S,
    authenticator: Arc<RequestAuthenticator>,
    url_scheme: Arc<str>,
    remote_addr: Option<SocketAddr>,
}

impl<S> AuthenticationService<S> {
    /// Wrap `inner`, resolving origin-form request targets as `http`.
    pub fn new(inner: S, authenticator: Arc<RequestAuthenticator>) -> Self {
        Self {
            inner,
            authenticator,
            url_scheme: Arc::from("http"),
            remote_addr: None,
        }
    }

    /// Set the scheme used to rebuild absolute URLs from origin-form targets.
    #[must_use]
    pub fn with_url_scheme(mut self, scheme: &str) -> Self {
        self.url_scheme = Arc::from(scheme);
        self
    }

    /// Record `addr` as the peer of every request served by this instance.
    ///
    /// The accept loop calls this on a per-connection clone.
    #[must_use]
    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    /// The wrapped service.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn authenticate<B>(&self, request: &http::Request<B>) -> Option<AuthenticatedConsumer> {
        let authorization = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        // Without a host, OAuth cannot canonicalize; Basic still applies.
        let url =
            request_url(request, &self.url_scheme).unwrap_or_else(|| request.uri().to_string());

        self.authenticator
            .authenticate(&InboundRequest::new(request.method(), &url, authorization))
    }
}

impl<S, B> Service<http::Request<B>> for AuthenticationService<S>
where
    S: Service<http::Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn call(&self, mut req: http::Request<B>) -> Self::Future {
        req.extensions_mut().remove::<AuthenticatedConsumer>();
        if let Some(addr) = self.remote_addr {
            req.extensions_mut().insert(RemoteAddr(addr));
        }

        match self.authenticate(&req) {
            Some(consumer) => {
                debug!(
                    consumer_key = consumer.key(),
                    method = %req.method(),
                    path = req.uri().path(),
                    "request authenticated"
                );
                req.extensions_mut().insert(consumer);
            }
            None => {
                debug!(
                    method = %req.method(),
                    path = req.uri().path(),
                    "request not authenticated"
                );
            }
        }

        self.inner.call(req)
    }
}
