//! Transport layer.
//!
//! `SurfaceTransport` is the one seam the executor posts through. The
//! in-process `MessageBus` implements it; the WebSocket relay bridges a
//! native wrapper onto the same bus.

pub mod bus;
pub mod codec;
pub mod ws;

use async_trait::async_trait;

use opbridge_core::error::Result;

pub use bus::{MessageBus, Posted, SurfaceHandle};

/// Addressed delivery to an embedded surface.
#[async_trait]
pub trait SurfaceTransport: Send + Sync {
    /// Post a serialized envelope to the surface at `locator`, restricted to
    /// `target_origin`. Fails when the surface is missing or its origin does
    /// not match.
    async fn post(&self, locator: &str, payload: String, target_origin: &str) -> Result<()>;
}
