//! Action executor: turns a `Command` into its side effect.

use std::sync::Arc;

use opbridge_core::error::{BridgeError, Result};
use opbridge_core::protocol::{Encoder, Message};

use crate::dispatch::{Command, HostCallbacks};
use crate::transport::SurfaceTransport;

pub struct ActionExecutor {
    transport: Arc<dyn SurfaceTransport>,
    encoder: Encoder,
    locator: String,
    callbacks: Arc<dyn HostCallbacks>,
}

impl ActionExecutor {
    pub fn new(
        transport: Arc<dyn SurfaceTransport>,
        encoder: Encoder,
        locator: impl Into<String>,
        callbacks: Arc<dyn HostCallbacks>,
    ) -> Self {
        Self {
            transport,
            encoder,
            locator: locator.into(),
            callbacks,
        }
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    pub async fn execute(&self, cmd: Command) -> Result<()> {
        match cmd {
            Command::Reply {
                payload,
                target_origin,
            } => self.send(payload, &target_origin).await,
            Command::Terminate => self
                .callbacks
                .close()
                .await
                .map_err(|e| BridgeError::callback("close", e)),
            Command::NoOp => Ok(()),
        }
    }

    /// Stamp, encode and post one message to the surface. Not retried.
    pub async fn send(&self, message: Message, target_origin: &str) -> Result<()> {
        let tag = message.tag();
        let payload = self.encoder.encode(message)?;
        self.transport
            .post(&self.locator, payload, target_origin)
            .await?;
        tracing::trace!(tag = tag.as_str(), locator = %self.locator, "posted to surface");
        Ok(())
    }
}
