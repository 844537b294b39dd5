//! In-process message bus (the host window analogue).
//!
//! - listeners: `id -> inbound queue`, every emitted event goes to all of them
//! - surfaces: `locator -> (origin, outbound queue)`, one per locator
//!
//! Queues are bounded. A full listener queue drops the event for that
//! listener only.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::{mpsc, Notify};

use opbridge_core::error::{BridgeError, Result};
use opbridge_core::protocol::RawEvent;

use super::SurfaceTransport;

const QUEUE_DEPTH: usize = 1024;

/// A payload delivered to a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posted {
    pub payload: String,
    pub target_origin: String,
}

struct SurfaceEntry {
    id: u64,
    origin: String,
    tx: mpsc::Sender<Posted>,
}

pub struct MessageBus {
    listeners: DashMap<u64, mpsc::Sender<RawEvent>>,
    surfaces: DashMap<String, SurfaceEntry>,
    seq: AtomicU64,
    surface_added: Notify,
    loopback: bool,
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBus {
    pub fn new() -> Self {
        Self {
            listeners: DashMap::new(),
            surfaces: DashMap::new(),
            seq: AtomicU64::new(1),
            surface_added: Notify::new(),
            loopback: false,
        }
    }

    /// Bus that also re-emits every post to its own listeners, the way a
    /// shared window sees its own `postMessage` traffic.
    pub fn with_loopback() -> Self {
        Self {
            loopback: true,
            ..Self::new()
        }
    }

    fn next_id(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    pub fn subscribe(&self) -> (u64, mpsc::Receiver<RawEvent>) {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        let id = self.next_id();
        self.listeners.insert(id, tx);
        (id, rx)
    }

    pub fn unsubscribe(&self, id: u64) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Broadcast an inbound event. Returns how many listeners accepted it.
    pub fn emit(&self, event: RawEvent) -> usize {
        let mut delivered = 0;
        for entry in self.listeners.iter() {
            match entry.value().try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    let listener = *entry.key();
                    tracing::warn!(listener, "listener queue full, event dropped");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {}
            }
        }
        delivered
    }

    /// Attach a surface under `locator`.
    ///
    /// Fails while another live surface holds the locator; an entry whose
    /// receiver is gone is replaced.
    pub fn attach_surface(
        self: &Arc<Self>,
        locator: impl Into<String>,
        origin: impl Into<String>,
    ) -> Result<SurfaceHandle> {
        let locator = locator.into();
        let origin = origin.into();
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        let id = self.next_id();
        let entry = SurfaceEntry {
            id,
            origin: origin.clone(),
            tx,
        };

        match self.surfaces.entry(locator.clone()) {
            Entry::Occupied(mut held) => {
                if !held.get().tx.is_closed() {
                    return Err(BridgeError::Delivery(format!(
                        "surface {locator} is already attached"
                    )));
                }
                held.insert(entry);
            }
            Entry::Vacant(slot) => {
                slot.insert(entry);
            }
        }

        self.surface_added.notify_waiters();
        tracing::debug!(%locator, %origin, "surface attached");
        Ok(SurfaceHandle {
            bus: Arc::clone(self),
            locator,
            origin,
            id,
            rx,
        })
    }

    pub fn has_surface(&self, locator: &str) -> bool {
        self.surfaces.contains_key(locator)
    }

    /// Wait until a surface is attached under `locator`.
    pub async fn wait_for_surface(&self, locator: &str, timeout: Duration) -> Result<()> {
        let wait = async {
            loop {
                let added = self.surface_added.notified();
                if self.has_surface(locator) {
                    return;
                }
                added.await;
            }
        };
        tokio::time::timeout(timeout, wait).await.map_err(|_| {
            BridgeError::Delivery(format!(
                "surface {locator} not found after {}ms",
                timeout.as_millis()
            ))
        })
    }
}

#[async_trait]
impl SurfaceTransport for MessageBus {
    async fn post(&self, locator: &str, payload: String, target_origin: &str) -> Result<()> {
        // Clone out of the map before awaiting.
        let (tx, origin) = {
            let entry = self
                .surfaces
                .get(locator)
                .ok_or_else(|| BridgeError::Delivery(format!("no surface at {locator}")))?;
            if entry.origin != target_origin {
                return Err(BridgeError::Delivery(format!(
                    "surface {locator} has origin {}, target was {target_origin}",
                    entry.origin
                )));
            }
            (entry.tx.clone(), entry.origin.clone())
        };

        let posted = Posted {
            payload,
            target_origin: target_origin.to_string(),
        };
        let echo = self.loopback.then(|| posted.payload.clone());
        tx.send(posted)
            .await
            .map_err(|_| BridgeError::Delivery(format!("surface {locator} is gone")))?;

        if let Some(payload) = echo {
            self.emit(RawEvent::text(origin, payload));
        }
        Ok(())
    }
}

/// The surface side of an attachment. Detaches on drop.
pub struct SurfaceHandle {
    bus: Arc<MessageBus>,
    locator: String,
    origin: String,
    id: u64,
    rx: mpsc::Receiver<Posted>,
}

impl SurfaceHandle {
    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Next payload posted by the host. `None` once detached.
    pub async fn recv(&mut self) -> Option<Posted> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Posted> {
        self.rx.try_recv().ok()
    }

    /// Post a structured envelope to the host, from this surface's origin.
    pub fn post_to_host(&self, data: Value) -> usize {
        self.bus.emit(RawEvent::new(self.origin.clone(), data))
    }

    /// Post a serialized envelope to the host.
    pub fn post_text(&self, text: impl Into<String>) -> usize {
        self.bus.emit(RawEvent::text(self.origin.clone(), text))
    }
}

impl Drop for SurfaceHandle {
    fn drop(&mut self) {
        let id = self.id;
        self.bus.surfaces.remove_if(&self.locator, |_, e| e.id == id);
    }
}
