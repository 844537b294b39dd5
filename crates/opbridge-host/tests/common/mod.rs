//! Shared fixtures for host integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use opbridge_core::protocol::Balance;
use opbridge_host::config::SessionConfig;
use opbridge_host::dispatch::{CallbackResult, ErrorResolution, HostCallbacks};

pub const ORIGIN: &str = "https://game.example";
pub const LOCATOR: &str = "games_iframe";

pub fn session_config() -> SessionConfig {
    let mut cfg = SessionConfig::new("thndr", ORIGIN, LOCATOR);
    cfg.game_id = Some("solitaire".into());
    cfg.surface_wait_ms = 0;
    cfg
}

/// Callbacks that record every call.
pub struct RecordingHost {
    pub token: String,
    pub balance: Balance,
    /// `None` means no error handler installed.
    pub action: Option<String>,
    pub fail_token: bool,
    /// `get_token` never resolves.
    pub stall_token: bool,
    pub invoices: Mutex<Vec<String>>,
    pub events: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<Value>>,
    pub token_calls: AtomicUsize,
    pub closes: AtomicUsize,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self {
            token: "tok-1".into(),
            balance: Balance::new(500, "cents"),
            action: None,
            fail_token: false,
            stall_token: false,
            invoices: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
            token_calls: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
        }
    }
}

impl RecordingHost {
    pub fn with_action(action: &str) -> Self {
        Self {
            action: Some(action.into()),
            ..Self::default()
        }
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostCallbacks for RecordingHost {
    async fn get_token(&self) -> CallbackResult<String> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        if self.stall_token {
            std::future::pending::<()>().await;
        }
        if self.fail_token {
            return Err("token service unavailable".into());
        }
        Ok(self.token.clone())
    }

    async fn get_balance(&self) -> CallbackResult<Balance> {
        Ok(self.balance.clone())
    }

    async fn close(&self) -> CallbackResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_pay_invoice(&self, invoice: &str) -> CallbackResult<()> {
        self.invoices.lock().unwrap().push(invoice.to_string());
        Ok(())
    }

    async fn handle_payment_error(&self, error: &Value) -> CallbackResult<Option<ErrorResolution>> {
        self.errors.lock().unwrap().push(error.clone());
        Ok(self.action.as_deref().map(ErrorResolution::new))
    }

    fn analytics_event(&self, event_name: &str) -> CallbackResult<()> {
        self.events.lock().unwrap().push(event_name.to_string());
        Ok(())
    }
}
