//! Axum router wiring (HTTP -> WS upgrade).
//!
//! Exposes `/v1/bridge` for relay connections and `/healthz`.

use axum::{routing::get, Router};

use crate::{app_state::AppState, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/bridge", get(transport::ws::bridge_upgrade))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}
