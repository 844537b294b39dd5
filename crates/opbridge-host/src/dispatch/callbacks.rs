use async_trait::async_trait;
use serde_json::Value;

use opbridge_core::protocol::Balance;

/// Error type host callbacks may fail with.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

pub type CallbackResult<T> = std::result::Result<T, CallbackError>;

/// What the host decided to do about a reported payment error.
///
/// `action` stays a raw string: it is checked against the protocol's fixed
/// set by the dispatcher, not trusted as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResolution {
    pub action: String,
}

impl ErrorResolution {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
        }
    }
}

/// Capabilities the host injects into a session.
///
/// Token, balance and close are required. The rest default to "not
/// supported", which the dispatcher treats as a silent no-op.
#[async_trait]
pub trait HostCallbacks: Send + Sync {
    async fn get_token(&self) -> CallbackResult<String>;

    async fn get_balance(&self) -> CallbackResult<Balance>;

    /// Tear down or navigate away from the surface.
    async fn close(&self) -> CallbackResult<()>;

    /// Fire-and-forget invoice hand-off.
    fn on_pay_invoice(&self, _invoice: &str) -> CallbackResult<()> {
        Ok(())
    }

    /// `Ok(None)` means the host does not take part in the error handshake.
    async fn handle_payment_error(
        &self,
        _error: &Value,
    ) -> CallbackResult<Option<ErrorResolution>> {
        Ok(None)
    }

    fn analytics_event(&self, _event_name: &str) -> CallbackResult<()> {
        Ok(())
    }
}
