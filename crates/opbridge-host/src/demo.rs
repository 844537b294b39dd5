//! Demo/sandbox support: a session-scoped balance counter and a callbacks
//! implementation backed by it.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use opbridge_core::protocol::Balance;

use crate::dispatch::{CallbackResult, ErrorResolution, HostCallbacks};

/// Single-writer, last-write-wins balance in minor units.
#[derive(Debug)]
pub struct DemoBalance {
    value: AtomicI64,
}

impl DemoBalance {
    pub fn new(initial: i64) -> Self {
        Self {
            value: AtomicI64::new(initial),
        }
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::SeqCst)
    }

    /// Apply a signed delta and return the new balance. Saturates instead of
    /// wrapping.
    pub fn apply(&self, delta: i64) -> i64 {
        let prev = self
            .value
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| Some(v.saturating_add(delta)))
            .unwrap_or_else(|v| v);
        prev.saturating_add(delta)
    }
}

/// Stand-in host for sandbox sessions: fixed token, balance from the counter.
pub struct DemoHost {
    balance: Arc<DemoBalance>,
    token: String,
    currency: String,
}

impl DemoHost {
    pub fn new(balance: Arc<DemoBalance>) -> Self {
        Self {
            balance,
            token: "demo".into(),
            currency: "cents".into(),
        }
    }
}

#[async_trait]
impl HostCallbacks for DemoHost {
    async fn get_token(&self) -> CallbackResult<String> {
        Ok(self.token.clone())
    }

    async fn get_balance(&self) -> CallbackResult<Balance> {
        Ok(Balance::new(self.balance.get(), self.currency.clone()))
    }

    async fn close(&self) -> CallbackResult<()> {
        tracing::info!("demo surface closed");
        Ok(())
    }

    fn on_pay_invoice(&self, invoice: &str) -> CallbackResult<()> {
        tracing::info!(%invoice, "demo invoice received (not settled)");
        Ok(())
    }

    async fn handle_payment_error(
        &self,
        error: &Value,
    ) -> CallbackResult<Option<ErrorResolution>> {
        tracing::warn!(%error, "demo payment error");
        Ok(Some(ErrorResolution::new("IGNORE")))
    }

    fn analytics_event(&self, event_name: &str) -> CallbackResult<()> {
        tracing::info!(%event_name, "analytics event");
        Ok(())
    }
}
