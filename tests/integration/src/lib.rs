//! End-to-end tests for the wsauth authentication pipeline.
//!
//! Each test spawns the service stack on `127.0.0.1:0` inside the test
//! process and talks to it over real TCP with `reqwest`:
//!
//! ```text
//! AuthenticationService -> ConsumerRequired -> widgets handler
//! ```
//!
//! Run them with:
//! ```text
//! cargo test -p wsauth-integration
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Once};

use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::debug;
use wsauth_auth::{ConsumerStore, RequestAuthenticator, StaticConsumerStore};
use wsauth_http::context::remote_addr;
use wsauth_http::{
    AuthenticationService, ConsumerRequired, ResponseBody, authenticated_consumer,
    rate_limit_identifier,
};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A running server bound to an ephemeral port.
#[derive(Debug)]
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Absolute URL for `path_and_query` on this server.
    #[must_use]
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{path_and_query}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// The protected handler: reports the consumer the request was signed by.
async fn widgets(req: http::Request<Incoming>) -> Result<http::Response<ResponseBody>, Infallible> {
    let Some(consumer) = authenticated_consumer(&req) else {
        return Ok(wsauth_http::forbidden());
    };

    let body = json!({
        "consumer": consumer.key(),
        "method": req.method().as_str(),
        "throttleId": rate_limit_identifier(consumer, remote_addr(&req).map(|a| a.ip()), None),
    });
    Ok(http::Response::builder()
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(ResponseBody::from_string(body.to_string()))
        .expect("static json response should be valid"))
}

/// Spawn the pipeline over `store`.
pub async fn spawn_server(store: Arc<dyn ConsumerStore>) -> TestServer {
    init_tracing();

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let authenticator = Arc::new(RequestAuthenticator::new(store));
    let service =
        AuthenticationService::new(ConsumerRequired::new(service_fn(widgets)), authenticator);

    let handle = tokio::spawn(async move {
        loop {
            let Ok((stream, peer_addr)) = listener.accept().await else {
                continue;
            };
            let svc = service.clone().with_remote_addr(peer_addr);
            tokio::spawn(async move {
                let builder = HttpConnBuilder::new(TokioExecutor::new());
                if let Err(e) = builder.serve_connection(TokioIo::new(stream), svc).await {
                    debug!(error = %e, "test connection closed");
                }
            });
        }
    });

    TestServer { addr, handle }
}

/// Spawn the pipeline with consumers `app1:s3cr3t` and `app2:other`.
pub async fn spawn_default_server() -> TestServer {
    spawn_server(Arc::new(StaticConsumerStore::new(vec![
        ("app1".to_owned(), "s3cr3t".to_owned()),
        ("app2".to_owned(), "other".to_owned()),
    ])))
    .await
}

/// Send `method url` with an optional `Authorization` header.
pub async fn send(
    method: reqwest::Method,
    url: &str,
    authorization: Option<&str>,
) -> reqwest::Response {
    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("build client");
    let mut request = client.request(method, url);
    if let Some(value) = authorization {
        request = request.header(reqwest::header::AUTHORIZATION, value);
    }
    request.send().await.expect("request sent")
}

mod test_basic;
mod test_gate;
mod test_oauth;
mod test_store;
