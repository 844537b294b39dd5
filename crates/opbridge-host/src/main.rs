//! opbridge host binary.
//!
//! - Loads the bridge config (first argument, default `opbridge.yaml`)
//! - Starts one host session backed by the demo host
//! - Serves the WebSocket bridge relay at /v1/bridge?locator=...&origin=...

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use opbridge_core::error::{BridgeError, Result};
use opbridge_host::demo::{DemoBalance, DemoHost};
use opbridge_host::transport::MessageBus;
use opbridge_host::{app_state, config, router, HostSession};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(code = e.kind().as_str(), error = %e, "opbridge-host failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "opbridge.yaml".to_string());
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg
        .bridge
        .listen
        .parse()
        .map_err(|_| BridgeError::Config(format!("bridge.listen: {}", cfg.bridge.listen)))?;

    let bus = Arc::new(MessageBus::new());
    let session = HostSession::new(cfg.session, Arc::clone(&bus))?;
    let balance = session
        .demo()
        .unwrap_or_else(|| Arc::new(DemoBalance::new(0)));
    let starting = tokio::spawn(session.start(Arc::new(DemoHost::new(balance))));

    let state = app_state::AppState::new(bus);
    let app = router::build_router(state);

    tracing::info!(%listen, "opbridge-host starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| BridgeError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| BridgeError::Internal(format!("server failed: {e}")))?;

    match starting.await {
        Ok(handle) => handle.teardown().await,
        Err(e) => tracing::error!(error = %e, "session start task failed"),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "ctrl-c handler failed");
    }
    tracing::info!("shutdown requested");
}
