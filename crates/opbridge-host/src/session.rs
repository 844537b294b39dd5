//! Session lifecycle.
//!
//! `HostSession::start` registers exactly one listener on the bus and spawns
//! one task that handles inbound events strictly in order. Every handler runs
//! to completion (callbacks included) before the next event is taken.
//! Failures are logged per error kind and never stop the listener.
//! `SessionHandle::teardown` deregisters it and abandons whatever is still
//! pending.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use opbridge_core::error::{BridgeError, Result};
use opbridge_core::protocol::{decode, Encoder, Message, ProtocolVersion, RawEvent};

use crate::config::SessionConfig;
use crate::demo::DemoBalance;
use crate::dispatch::{Dispatcher, HostCallbacks};
use crate::executor::ActionExecutor;
use crate::policy::OriginPolicy;
use crate::transport::{MessageBus, SurfaceTransport};

/// A validated, not yet listening session.
pub struct HostSession {
    cfg: SessionConfig,
    bus: Arc<MessageBus>,
    demo: Option<Arc<DemoBalance>>,
}

impl HostSession {
    pub fn new(cfg: SessionConfig, bus: Arc<MessageBus>) -> Result<Self> {
        cfg.validate()?;
        let demo = cfg
            .demo
            .as_ref()
            .map(|d| Arc::new(DemoBalance::new(d.initial_balance)));
        Ok(Self { cfg, bus, demo })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.cfg
    }

    /// The session's demo counter, when the config enables demo mode.
    pub fn demo(&self) -> Option<Arc<DemoBalance>> {
        self.demo.clone()
    }

    pub async fn start(self, callbacks: Arc<dyn HostCallbacks>) -> SessionHandle {
        let cfg = self.cfg;

        if cfg.surface_wait_ms > 0 {
            let wait = Duration::from_millis(cfg.surface_wait_ms);
            if let Err(e) = self.bus.wait_for_surface(&cfg.surface_locator, wait).await {
                let locator = &cfg.surface_locator;
                tracing::warn!(%locator, error = %e, "starting without surface");
            }
        }

        // Listen before the first post so an immediate answer is not missed.
        let (listener_id, rx) = self.bus.subscribe();

        let transport: Arc<dyn SurfaceTransport> = self.bus.clone();
        let executor = Arc::new(ActionExecutor::new(
            transport,
            Encoder::new(cfg.source.clone()),
            cfg.surface_locator.clone(),
            Arc::clone(&callbacks),
        ));

        if cfg.protocol == ProtocolVersion::V1 {
            let push = Message::SetConfig {
                config: cfg.config_payload(),
            };
            if let Err(e) = executor.send(push, &cfg.target_origin).await {
                report(&e);
            }
        }

        let listener = Listener {
            policy: OriginPolicy::new(cfg.target_origin.clone(), cfg.protocol),
            dispatcher: Dispatcher::new(&cfg, callbacks, self.demo.clone()),
            executor: Arc::clone(&executor),
            logging: cfg.logging,
        };
        let task = tokio::spawn(listener.run(rx));

        tracing::info!(
            operator = %cfg.operator_id,
            origin = %cfg.target_origin,
            locator = %cfg.surface_locator,
            protocol = cfg.protocol.as_str(),
            listener_id,
            "host session started"
        );

        SessionHandle {
            listener_id,
            bus: self.bus,
            task: Some(task),
            executor,
            target_origin: cfg.target_origin,
            demo: self.demo,
        }
    }
}

/// Validate `cfg`, then start a session on `bus`.
pub async fn initialize(
    cfg: SessionConfig,
    callbacks: Arc<dyn HostCallbacks>,
    bus: Arc<MessageBus>,
) -> Result<SessionHandle> {
    let session = HostSession::new(cfg, bus)?;
    Ok(session.start(callbacks).await)
}

struct Listener {
    policy: OriginPolicy,
    dispatcher: Dispatcher,
    executor: Arc<ActionExecutor>,
    logging: bool,
}

impl Listener {
    async fn run(self, mut rx: mpsc::Receiver<RawEvent>) {
        while let Some(event) = rx.recv().await {
            if let Err(e) = self.handle(event).await {
                report(&e);
            }
        }
        tracing::debug!("session listener stopped");
    }

    async fn handle(&self, event: RawEvent) -> Result<()> {
        let tag = self.policy.check(&event)?;
        if self.logging {
            tracing::debug!(tag = tag.as_str(), origin = %event.origin, "received");
        }

        let env = decode(&event, self.policy.version())?;
        if self.executor.encoder().is_own(&env) {
            return Err(BridgeError::SelfSource(
                self.executor.encoder().source().to_string(),
            ));
        }

        let cmd = self.dispatcher.dispatch(&env.message).await?;
        if self.logging {
            tracing::debug!(tag = tag.as_str(), command = cmd.label(), "handled");
        }
        self.executor.execute(cmd).await
    }
}

fn report(e: &BridgeError) {
    let code = e.kind().as_str();
    if e.is_silent() {
        tracing::trace!(code, error = %e, "event dropped");
        return;
    }
    match e {
        BridgeError::Decode(_) => {
            tracing::debug!(code, error = %e, "event dropped");
        }
        BridgeError::Schema(schema) => {
            for issue in &schema.issues {
                tracing::warn!(
                    path = %issue.path,
                    reason = %issue.message,
                    "schema validation failed"
                );
            }
        }
        _ => {
            tracing::error!(code, error = %e, "message handling failed");
        }
    }
}

/// A running session. Dropping it deregisters and aborts the listener
/// without waiting.
pub struct SessionHandle {
    listener_id: u64,
    bus: Arc<MessageBus>,
    task: Option<JoinHandle<()>>,
    executor: Arc<ActionExecutor>,
    target_origin: String,
    demo: Option<Arc<DemoBalance>>,
}

impl SessionHandle {
    pub fn listener_id(&self) -> u64 {
        self.listener_id
    }

    pub fn is_listening(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn demo_balance(&self) -> Option<i64> {
        self.demo.as_ref().map(|d| d.get())
    }

    /// Tell the surface that `invoice` will not be paid.
    pub async fn cancel_invoice(&self, invoice: impl Into<String>) -> Result<()> {
        let msg = Message::CancelInvoice {
            invoice: Some(invoice.into()),
        };
        self.executor.send(msg, &self.target_origin).await
    }

    /// Deregister the listener and stop it. The in-flight event and anything
    /// still queued are abandoned, pending callbacks included.
    pub async fn teardown(mut self) {
        self.bus.unsubscribe(self.listener_id);
        if let Some(task) = self.task.take() {
            task.abort();
            match task.await {
                Err(e) if !e.is_cancelled() => {
                    tracing::error!(error = %e, "session listener task failed");
                }
                _ => {}
            }
        }
        tracing::info!(listener_id = self.listener_id, "host session torn down");
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.listener_id);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
