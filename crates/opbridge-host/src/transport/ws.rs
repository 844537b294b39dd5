//! WebSocket bridge relay.
//!
//! A native wrapper (webview host, browser extension) connects once per
//! embedded surface:
//! - `GET /v1/bridge?locator=<id>&origin=<surface origin>` upgrades to WS
//! - the connection is attached to the bus as that surface, unless a live
//!   surface already holds the locator
//! - inbound text frames must declare the origin the connection attached
//!   with; matching frames are emitted to the session listener
//! - host posts for the surface are written back as outbound frames

use std::sync::Arc;

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, Query, State},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;

use opbridge_core::error::{BridgeError, Result};

use crate::app_state::AppState;
use crate::transport::bus::{MessageBus, Posted, SurfaceHandle};
use crate::transport::codec::{decode_frame, encode_frame};

#[derive(Debug, Deserialize)]
pub struct BridgeQuery {
    pub locator: String,
    pub origin: String,
}

/// Inbound half of one relay connection. The outbound half is the
/// `SurfaceHandle` returned alongside it.
pub struct Relay {
    bus: Arc<MessageBus>,
    locator: String,
    origin: String,
}

impl Relay {
    pub fn attach(bus: Arc<MessageBus>, q: &BridgeQuery) -> Result<(Self, SurfaceHandle)> {
        if q.locator.trim().is_empty() {
            return Err(BridgeError::Config("bridge locator must not be empty".into()));
        }
        let surface = bus.attach_surface(q.locator.clone(), q.origin.clone())?;
        let relay = Self {
            bus,
            locator: q.locator.clone(),
            origin: q.origin.clone(),
        };
        Ok((relay, surface))
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// Relay one inbound text frame. Returns how many listeners took it.
    pub fn inbound(&self, text: &str) -> Result<usize> {
        let event = decode_frame(text)?;
        if event.origin != self.origin {
            return Err(BridgeError::OriginMismatch {
                expected: self.origin.clone(),
                actual: event.origin,
            });
        }
        Ok(self.bus.emit(event))
    }
}

/// Next host post for the surface, framed for the wire.
pub async fn outbound(surface: &mut SurfaceHandle) -> Option<Result<String>> {
    let posted: Posted = surface.recv().await?;
    Some(encode_frame(&posted))
}

pub async fn bridge_upgrade(
    State(app): State<AppState>,
    ws: WebSocketUpgrade,
    Query(q): Query<BridgeQuery>,
) -> Response {
    ws.on_upgrade(move |socket| async move {
        let locator = q.locator.clone();
        if let Err(e) = run_relay(app, q, socket).await {
            tracing::warn!(%locator, code = e.kind().as_str(), error = %e, "bridge relay ended");
        }
    })
}

async fn run_relay(app: AppState, q: BridgeQuery, socket: WebSocket) -> Result<()> {
    let (relay, mut surface) = Relay::attach(app.bus(), &q)?;
    let (mut ws_tx, mut ws_rx) = socket.split();
    tracing::info!(locator = %q.locator, origin = %q.origin, "bridge relay attached");

    loop {
        tokio::select! {
            // host -> surface
            frame = outbound(&mut surface) => {
                let Some(frame) = frame else { break; };
                if ws_tx.send(Message::Text(frame?)).await.is_err() {
                    break;
                }
            }

            // surface -> host
            incoming = ws_rx.next() => {
                let Some(incoming) = incoming else { break; };
                let Ok(msg) = incoming else { break; };

                match msg {
                    Message::Text(s) => match relay.inbound(&s) {
                        Ok(delivered) => {
                            tracing::trace!(
                                locator = relay.locator(),
                                delivered,
                                "relayed surface event"
                            );
                        }
                        Err(e) => {
                            tracing::debug!(
                                locator = relay.locator(),
                                code = e.kind().as_str(),
                                error = %e,
                                "relay frame dropped"
                            );
                        }
                    },
                    Message::Binary(_) => {
                        tracing::debug!(locator = relay.locator(), "binary relay frame dropped");
                    }
                    Message::Ping(payload) => {
                        if ws_tx.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Message::Pong(_) => {}
                    Message::Close(_) => break,
                }
            }
        }
    }

    tracing::info!(locator = %q.locator, "bridge relay detached");
    Ok(())
}
