//! QueryAuth Server - demo provider for signed query-string requests.
//!
//! Every path except the health probe is a protected echo endpoint: it
//! requires a request signed with the configured API key and secret, accepts
//! each signature once, and answers with the caller's key and parameters.
//!
//! # Usage
//!
//! ```text
//! API_KEY=k1 API_SECRET=s1 QUERYAUTH_LISTEN=0.0.0.0:8080 queryauth-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `QUERYAUTH_LISTEN` | `0.0.0.0:8080` | Bind address |
//! | `QUERYAUTH_SKEW_WINDOW_SECS` | `300` | Accepted clock skew and ledger retention |
//! | `QUERYAUTH_PURGE_INTERVAL_SECS` | `60` | Period of the ledger purge task |
//! | `QUERYAUTH_PURGE_ON_SAVE` | `false` | Purge expired signatures before every save |
//! | `API_KEY` / `API_SECRET` | *(unset)* | Credentials accepted by the server |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod gateway;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use queryauth_auth::{CredentialProvider, StaticCredentialProvider};
use queryauth_core::QueryAuthConfig;
use queryauth_guard::ReplayGuard;
use queryauth_http::{EchoHandler, QueryAuthHttpService};
use queryauth_ledger::InMemoryLedger;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::gateway::GatewayService;

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Build the credential provider from the configured key pair.
///
/// Without credentials the provider is empty and every signed request is
/// rejected.
fn build_credential_provider(config: &QueryAuthConfig) -> Arc<dyn CredentialProvider> {
    match config.credentials() {
        Some(credentials) => {
            info!(api_key = %credentials.key(), "configured API credentials");
            Arc::new(StaticCredentialProvider::single(&credentials))
        }
        None => {
            warn!("API_KEY / API_SECRET not set, all protected requests will be rejected");
            Arc::new(StaticCredentialProvider::new(Vec::new()))
        }
    }
}

/// Periodically delete expired signatures from the ledger.
fn spawn_purge_task(guard: ReplayGuard, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match guard.purge_expired(chrono::Utc::now().timestamp()).await {
                Ok(0) => debug!("no expired signatures to purge"),
                Ok(removed) => info!(removed, "purged expired signatures"),
                Err(e) => warn!(error = %e, "signature purge failed"),
            }
        }
    })
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve(listener: TcpListener, service: GatewayService<EchoHandler>) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

/// Probe the running server's health endpoint.
///
/// Succeeds if the response is 200 OK and reports the service as running.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = format!("GET /health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.contains("200 OK") && response.contains("\"running\"") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

/// Address the health probe connects to.
fn health_check_addr(listen: &str) -> String {
    listen.replace("0.0.0.0", "127.0.0.1")
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = QueryAuthConfig::from_env();

    // Handle --health-check flag for Docker HEALTHCHECK.
    if std::env::args().any(|a| a == "--health-check") {
        let healthy = run_health_check(&health_check_addr(&config.listen))
            .await
            .is_ok();
        std::process::exit(i32::from(!healthy));
    }

    init_tracing(&config.log_level)?;
    config.validate().context("invalid configuration")?;

    let credentials = build_credential_provider(&config);
    let ledger = Arc::new(InMemoryLedger::new());
    let guard = ReplayGuard::from_config(&config, ledger, credentials);
    let service = QueryAuthHttpService::new(Arc::new(EchoHandler), guard);

    let purge = spawn_purge_task(
        service.guard().clone(),
        Duration::from_secs(config.purge_interval_secs),
    );

    let addr: SocketAddr = config
        .listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(
        %addr,
        skew_window_secs = config.skew_window_secs,
        purge_interval_secs = config.purge_interval_secs,
        purge_on_save = config.purge_on_save,
        version = VERSION,
        "starting QueryAuth Server",
    );

    let result = serve(listener, GatewayService::new(service)).await;
    purge.abort();
    result
}
