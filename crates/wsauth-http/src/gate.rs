//! Authorization gate for protected handlers.
//!
//! [`ConsumerRequired`] wraps a handler so it only runs for requests that
//! [`AuthenticationService`](crate::service::AuthenticationService) annotated
//! with a consumer. Every other request gets a bare `403 Forbidden`.

use std::future::Future;
use std::pin::Pin;

use hyper::service::Service;
use tracing::debug;
use wsauth_auth::AuthenticatedConsumer;

use crate::body::ResponseBody;

/// Gate that admits only authenticated requests.
#[derive(Debug, Clone)]
pub struct ConsumerRequired<S> {
    inner: S,
}

impl<S> ConsumerRequired<S> {
    /// Protect `inner`.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// The protected service.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S, B> Service<http::Request<B>> for ConsumerRequired<S>
where
    S: Service<http::Request<B>, Response = http::Response<ResponseBody>>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = http::Response<ResponseBody>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        if req.extensions().get::<AuthenticatedConsumer>().is_some() {
            return Box::pin(self.inner.call(req));
        }

        debug!(
            method = %req.method(),
            path = req.uri().path(),
            "rejecting unauthenticated request"
        );
        Box::pin(std::future::ready(Ok(forbidden())))
    }
}

/// `403 Forbidden` with an empty body and no detail.
#[must_use]
pub fn forbidden() -> http::Response<ResponseBody> {
    http::Response::builder()
        .status(http::StatusCode::FORBIDDEN)
        .body(ResponseBody::empty())
        .expect("static forbidden response should be valid")
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::future::{Ready, ready};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use http::header::AUTHORIZATION;
    use http_body::Body;
    use wsauth_auth::scheme::encode_basic;
    use wsauth_auth::{RequestAuthenticator, StaticConsumerStore};

    use super::*;
    use crate::service::AuthenticationService;

    /// Counts how often the protected operation runs.
    #[derive(Clone)]
    struct Protected {
        calls: Arc<AtomicUsize>,
    }

    impl<B> Service<http::Request<B>> for Protected {
        type Response = http::Response<ResponseBody>;
        type Error = Infallible;
        type Future = Ready<Result<Self::Response, Infallible>>;

        fn call(&self, _req: http::Request<B>) -> Self::Future {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ready(Ok(http::Response::new(ResponseBody::from_string("ok"))))
        }
    }

    fn pipeline(calls: &Arc<AtomicUsize>) -> AuthenticationService<ConsumerRequired<Protected>> {
        let authenticator = Arc::new(RequestAuthenticator::new(Arc::new(StaticConsumerStore::new(
            vec![("app1".to_owned(), "s3cr3t".to_owned())],
        ))));
        let protected = Protected {
            calls: Arc::clone(calls),
        };
        AuthenticationService::new(ConsumerRequired::new(protected), authenticator)
    }

    #[tokio::test]
    async fn test_should_forbid_without_consumer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = ConsumerRequired::new(Protected {
            calls: Arc::clone(&calls),
        });

        let response = gate
            .call(http::Request::get("/widgets/").body(()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), http::StatusCode::FORBIDDEN);
        assert!(response.body().is_end_stream());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_should_admit_authenticated_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = pipeline(&calls);

        let request = http::Request::get("/widgets/?id=7")
            .header("host", "host")
            .header(AUTHORIZATION, encode_basic("app1", "s3cr3t"))
            .body(())
            .unwrap();
        let response = service.call(request).await.unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_should_give_identical_rejections_for_every_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = pipeline(&calls);

        let headers = [
            None,
            Some(encode_basic("app1", "wrong")),
            Some(encode_basic("UNKNOWN", "s3cr3t")),
            Some("Basic ***".to_owned()),
            Some(r#"OAuth oauth_consumer_key="app1""#.to_owned()),
        ];
        for header in headers {
            let mut builder = http::Request::get("/widgets/").header("host", "host");
            if let Some(header) = header {
                builder = builder.header(AUTHORIZATION, header);
            }
            let response = service.call(builder.body(()).unwrap()).await.unwrap();

            assert_eq!(response.status(), http::StatusCode::FORBIDDEN);
            assert!(response.headers().is_empty());
            assert_eq!(response.body().size_hint().exact(), Some(0));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
