//! Routes served behind the authentication layer.
//!
//! | Route | Access |
//! |-------|--------|
//! | `GET /_health` | open |
//! | `/widgets/...` | consumer required |
//! | anything else | `404` |

use std::convert::Infallible;
use std::future::{Future, Ready, ready};
use std::pin::Pin;

use hyper::service::Service;
use serde_json::json;
use wsauth_http::context::remote_addr;
use wsauth_http::{ConsumerRequired, ResponseBody, authenticated_consumer, rate_limit_identifier};

/// Health check path.
pub const HEALTH_PATH: &str = "/_health";

/// Protected resource prefix.
pub const WIDGETS_PREFIX: &str = "/widgets";

/// Top-level router.
#[derive(Debug, Clone)]
pub struct ApiRouter {
    widgets: ConsumerRequired<WidgetsHandler>,
}

impl ApiRouter {
    /// Create the router with its protected handlers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            widgets: ConsumerRequired::new(WidgetsHandler),
        }
    }
}

impl Default for ApiRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> Service<http::Request<B>> for ApiRouter {
    type Response = http::Response<ResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let path = req.uri().path();
        if path == HEALTH_PATH && *req.method() == http::Method::GET {
            return Box::pin(ready(Ok(health_check_response())));
        }
        if path == WIDGETS_PREFIX || path.starts_with("/widgets/") {
            return self.widgets.call(req);
        }
        Box::pin(ready(Ok(not_found_response())))
    }
}

/// The protected demo resource.
///
/// Reports which consumer the request was authenticated as.
#[derive(Debug, Clone, Copy)]
pub struct WidgetsHandler;

impl<B> Service<http::Request<B>> for WidgetsHandler {
    type Response = http::Response<ResponseBody>;
    type Error = Infallible;
    type Future = Ready<Result<Self::Response, Self::Error>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        // The gate only admits requests that carry a consumer.
        let Some(consumer) = authenticated_consumer(&req) else {
            return ready(Ok(wsauth_http::forbidden()));
        };

        let body = json!({
            "consumer": consumer.key(),
            "method": req.method().as_str(),
            "path": req.uri().path(),
            "throttleId": rate_limit_identifier(
                consumer,
                remote_addr(&req).map(|addr| addr.ip()),
                None,
            ),
        });

        ready(Ok(json_response(http::StatusCode::OK, &body)))
    }
}

fn json_response(
    status: http::StatusCode,
    body: &serde_json::Value,
) -> http::Response<ResponseBody> {
    http::Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(ResponseBody::from_string(body.to_string()))
        .expect("static json response should be valid")
}

fn health_check_response() -> http::Response<ResponseBody> {
    json_response(
        http::StatusCode::OK,
        &json!({ "status": "running", "version": crate::VERSION }),
    )
}

fn not_found_response() -> http::Response<ResponseBody> {
    http::Response::builder()
        .status(http::StatusCode::NOT_FOUND)
        .body(ResponseBody::empty())
        .expect("static not found response should be valid")
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use http_body_util::BodyExt;
    use wsauth_auth::scheme::encode_basic;
    use wsauth_auth::{RequestAuthenticator, StaticConsumerStore};
    use wsauth_http::AuthenticationService;

    use super::*;

    fn service() -> AuthenticationService<ApiRouter> {
        let store = StaticConsumerStore::new(vec![("app1".to_owned(), "s3cr3t".to_owned())]);
        let peer: SocketAddr = "10.1.2.3:4000".parse().unwrap();
        let authenticator = Arc::new(RequestAuthenticator::new(Arc::new(store)));
        AuthenticationService::new(ApiRouter::new(), authenticator).with_remote_addr(peer)
    }

    async fn body_json(response: http::Response<ResponseBody>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_should_serve_health_without_credentials() {
        let response = service()
            .call(http::Request::get(HEALTH_PATH).body(()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "running");
    }

    #[tokio::test]
    async fn test_should_forbid_widgets_without_credentials() {
        let response = service()
            .call(http::Request::get("/widgets/?id=7").header("host", "host").body(()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_should_serve_widgets_to_consumer() {
        let request = http::Request::get("/widgets/?id=7")
            .header("host", "host")
            .header(http::header::AUTHORIZATION, encode_basic("app1", "s3cr3t"))
            .body(())
            .unwrap();
        let response = service().call(request).await.unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["consumer"], "app1");
        assert_eq!(body["path"], "/widgets/");
        assert_eq!(body["throttleId"], "app1_10.1.2.3_nohost");
    }

    #[tokio::test]
    async fn test_should_return_not_found_for_unknown_route() {
        let response = service()
            .call(http::Request::get("/gadgets/").body(()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), http::StatusCode::NOT_FOUND);
    }
}
