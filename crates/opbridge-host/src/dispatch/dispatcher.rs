use std::sync::Arc;

use serde_json::Value;

use opbridge_core::error::{BridgeError, Result};
use opbridge_core::protocol::{decode_value, ErrorAction, Message, MessageTag, ProtocolVersion};

use crate::config::SessionConfig;
use crate::demo::DemoBalance;

use super::callbacks::HostCallbacks;

/// Outbound action chosen for one inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Send `payload` back to the surface.
    Reply {
        payload: Message,
        target_origin: String,
    },
    /// Close / navigate away from the surface.
    Terminate,
    NoOp,
}

impl Command {
    pub fn label(&self) -> &'static str {
        match self {
            Command::Reply { payload, .. } => payload.tag().as_str(),
            Command::Terminate => "terminate",
            Command::NoOp => "noop",
        }
    }
}

/// Maps one inbound message to exactly one `Command`.
///
/// Holds configuration and injected capabilities only; nothing is carried
/// from one call to the next apart from the optional demo counter.
pub struct Dispatcher {
    protocol: ProtocolVersion,
    target_origin: String,
    sdk_version: String,
    config_payload: Value,
    callbacks: Arc<dyn HostCallbacks>,
    demo: Option<Arc<DemoBalance>>,
}

impl Dispatcher {
    pub fn new(
        cfg: &SessionConfig,
        callbacks: Arc<dyn HostCallbacks>,
        demo: Option<Arc<DemoBalance>>,
    ) -> Self {
        Self {
            protocol: cfg.protocol,
            target_origin: cfg.target_origin.clone(),
            sdk_version: cfg.sdk_version.clone(),
            config_payload: cfg.config_payload(),
            callbacks,
            demo,
        }
    }

    fn reply(&self, payload: Message) -> Command {
        Command::Reply {
            payload,
            target_origin: self.target_origin.clone(),
        }
    }

    /// Dispatch an untyped envelope value (structured or stringified).
    ///
    /// Tags outside the vocabulary are a no-op here rather than an error.
    /// Known tags with a bad body still fail with the schema error.
    pub async fn dispatch_value(&self, data: &Value) -> Result<Command> {
        match decode_value(data, self.protocol) {
            Ok(env) => self.dispatch(&env.message).await,
            Err(BridgeError::Decode(reason)) => {
                tracing::debug!(%reason, "unknown message ignored");
                Ok(Command::NoOp)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn dispatch(&self, message: &Message) -> Result<Command> {
        let tag = message.tag();
        if !self.protocol.contains(tag) {
            tracing::debug!(
                tag = tag.as_str(),
                protocol = self.protocol.as_str(),
                "tag outside vocabulary ignored"
            );
            return Ok(Command::NoOp);
        }

        let cmd = match message {
            Message::GetSdkVersion => self.reply(Message::SetSdkVersion {
                version: self.sdk_version.clone(),
            }),
            Message::GetConfig => self.reply(Message::SetConfig {
                config: self.config_payload.clone(),
            }),
            Message::GetToken => {
                let token = self
                    .callbacks
                    .get_token()
                    .await
                    .map_err(|e| BridgeError::callback("get_token", e))?;
                self.reply(Message::SetToken { token })
            }
            Message::GetBalance => {
                let balance = self
                    .callbacks
                    .get_balance()
                    .await
                    .map_err(|e| BridgeError::callback("get_balance", e))?;
                self.reply(Message::SetBalance(balance))
            }
            Message::PayInvoice { invoice } => {
                tracing::debug!(%invoice, "invoice received");
                self.callbacks
                    .on_pay_invoice(invoice)
                    .map_err(|e| BridgeError::callback("on_pay_invoice", e))?;
                Command::NoOp
            }
            Message::CancelInvoice { invoice } => {
                let invoice = invoice.as_deref().unwrap_or("");
                tracing::debug!(invoice, "invoice cancelled by surface");
                Command::NoOp
            }
            Message::Redirect | Message::Close => Command::Terminate,
            Message::DemoBalanceUpdate { balance_inc } => {
                match &self.demo {
                    Some(demo) => {
                        let balance = demo.apply(*balance_inc);
                        tracing::debug!(delta = *balance_inc, balance, "demo balance updated");
                    }
                    None => tracing::debug!("demo balance update outside demo mode ignored"),
                }
                Command::NoOp
            }
            Message::HandleError { error } | Message::HandlePaymentError { error } => {
                tracing::debug!(tag = tag.as_str(), %error, "error reported by surface");
                self.error_handshake(error).await?
            }
            Message::AnalyticsEvent { event_name } => {
                self.callbacks
                    .analytics_event(event_name)
                    .map_err(|e| BridgeError::callback("analytics_event", e))?;
                Command::NoOp
            }
            // Our own vocabulary echoed back without a source stamp.
            Message::SetConfig { .. }
            | Message::SetSdkVersion { .. }
            | Message::SetToken { .. }
            | Message::SetBalance(_)
            | Message::ErrorHandled { .. }
            | Message::PaymentErrorHandled { .. } => {
                tracing::debug!(tag = tag.as_str(), "host-bound tag from surface ignored");
                Command::NoOp
            }
        };
        Ok(cmd)
    }

    async fn error_handshake(&self, error: &Value) -> Result<Command> {
        let resolution = self
            .callbacks
            .handle_payment_error(error)
            .await
            .map_err(|e| BridgeError::callback("handle_payment_error", e))?;

        let Some(resolution) = resolution else {
            tracing::debug!("no error handler installed");
            return Ok(Command::NoOp);
        };

        let action = ErrorAction::from_wire(&resolution.action).ok_or_else(|| {
            BridgeError::Protocol(format!(
                "handle_payment_error returned action {:?}, expected {}",
                resolution.action,
                ErrorAction::EXPECTED
            ))
        })?;

        let ack = match self.protocol.error_ack_tag() {
            MessageTag::ErrorHandled => Message::ErrorHandled { action },
            _ => Message::PaymentErrorHandled { action },
        };
        Ok(self.reply(ack))
    }
}
