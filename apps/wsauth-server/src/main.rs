//! wsauth server - authenticates signed service-to-service requests.
//!
//! Every request passes through the authentication layer. `GET /_health` is
//! open; `/widgets/` answers only requests signed by a registered consumer.
//!
//! # Usage
//!
//! ```text
//! CONSUMER_STORE=static CONSUMERS=app1:s3cr3t wsauth-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `WSAUTH_LISTEN` | `0.0.0.0:8000` | Bind address |
//! | `WSAUTH_URL_SCHEME` | `http` | Scheme for rebuilding absolute request URLs |
//! | `CONSUMER_STORE` | *(required)* | `static` or `json-file` |
//! | `CONSUMERS` | *(empty)* | `key:secret` pairs for the `static` store |
//! | `CONSUMER_FILE` | *(unset)* | Applications file for the `json-file` store |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `LOG_FORMAT` | `text` | `json` for JSON-lines logs |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod handler;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use wsauth_auth::{ConsumerStoreRegistry, RequestAuthenticator};
use wsauth_core::WsAuthConfig;
use wsauth_http::AuthenticationService;

use crate::handler::{ApiRouter, HEALTH_PATH};

/// Server version reported in health check responses.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `LOG_LEVEL`; `LOG_FORMAT=json` switches
/// to JSON lines.
fn init_tracing(config: &WsAuthConfig) -> Result<()> {
    let directives = std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone());
    let filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("invalid log filter: {directives}"))?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if config.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}

/// Resolve the consumer store and assemble the service stack.
///
/// A missing or unusable consumer store is fatal.
fn build_service(config: &WsAuthConfig) -> Result<AuthenticationService<ApiRouter>> {
    let store = ConsumerStoreRegistry::with_builtins()
        .resolve(&config.store)
        .context("failed to initialise consumer store")?;
    let authenticator = Arc::new(RequestAuthenticator::new(store));

    Ok(AuthenticationService::new(ApiRouter::new(), authenticator)
        .with_url_scheme(&config.url_scheme))
}

/// Resolves on Ctrl-C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {}
        () = terminate => {}
    }
    info!("received shutdown signal");
}

/// Accept connections until `shutdown` resolves, then drain in-flight requests.
async fn serve<F>(
    listener: TcpListener,
    service: AuthenticationService<ApiRouter>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    let graceful = GracefulShutdown::new();
    let builder = HttpConnBuilder::new(TokioExecutor::new());
    let mut accepted: u64 = 0;
    tokio::pin!(shutdown);

    loop {
        let (stream, peer_addr) = tokio::select! {
            () = &mut shutdown => break,
            result = listener.accept() => match result {
                Ok(conn) => conn,
                Err(e) => {
                    warn!(error = %e, "failed to accept connection");
                    continue;
                }
            },
        };
        accepted += 1;
        debug!(%peer_addr, "accepted connection");

        let peer_service = service.clone().with_remote_addr(peer_addr);
        let conn = builder
            .serve_connection(TokioIo::new(stream), peer_service)
            .into_owned();
        let conn = graceful.watch(conn);
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                error!(%peer_addr, error = %e, "connection error");
            }
        });
    }

    info!(connections = accepted, "stopped accepting, draining in-flight requests");
    graceful.shutdown().await;
    info!("all connections drained");

    Ok(())
}

/// Probe `GET /_health` on `addr`.
///
/// Succeeds only for a `200` whose JSON body reports `"status": "running"`.
async fn check_health(addr: &str) -> Result<()> {
    let mut stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let request =
        format!("GET {HEALTH_PATH} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await?;

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await?;
    let response = String::from_utf8_lossy(&raw);

    let (head, body) = response
        .split_once("\r\n\r\n")
        .with_context(|| format!("truncated response from {addr}"))?;
    let status_line = head.lines().next().unwrap_or_default();
    if status_line.split_whitespace().nth(1) != Some("200") {
        bail!("unhealthy response from {addr}: {status_line}");
    }

    let health: serde_json::Value =
        serde_json::from_str(body).with_context(|| format!("non-json health body from {addr}"))?;
    if health["status"] != "running" {
        bail!("{addr} reports status {}", health["status"]);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = WsAuthConfig::from_env().context("invalid configuration")?;

    // Container health probes run the binary with --health-check.
    if std::env::args().any(|a| a == "--health-check") {
        let addr = config.listen.replace("0.0.0.0", "127.0.0.1");
        let healthy = check_health(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    init_tracing(&config)?;

    info!(
        listen = %config.listen,
        url_scheme = %config.url_scheme,
        consumer_store = config.store.kind.as_deref().unwrap_or("<unset>"),
        version = VERSION,
        "starting wsauth server",
    );

    let service = build_service(&config)?;

    let addr: SocketAddr = config
        .listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.listen))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening for connections");

    serve(listener, service, shutdown_signal()).await
}
