//! Envelope codec.
//!
//! Inbound events arrive as `{ origin, data }`, where `data` is either the
//! envelope object itself or a JSON string carrying it. Strings get exactly
//! one nested parse; when that fails the original string is handed to the
//! schema layer unchanged, which then reports a precise `root` issue instead
//! of a silent drop.

use std::borrow::Cow;

use serde_json::{json, Map, Value};

use crate::error::{BridgeError, Result};

use super::envelope::{Envelope, Message};
use super::schema;
use super::tag::{MessageTag, ProtocolVersion};

/// An inbound event as delivered by a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    /// Origin declared by the transport (scheme+host+port).
    pub origin: String,
    /// Envelope, either structured or stringified.
    pub data: Value,
}

impl RawEvent {
    pub fn new(origin: impl Into<String>, data: Value) -> Self {
        Self {
            origin: origin.into(),
            data,
        }
    }

    /// Event whose payload is a serialized envelope string.
    pub fn text(origin: impl Into<String>, payload: impl Into<String>) -> Self {
        Self::new(origin, Value::String(payload.into()))
    }

    /// Payload length in bytes, as seen on the wire.
    pub fn payload_len(&self) -> usize {
        match &self.data {
            Value::String(s) => s.len(),
            other => other.to_string().len(),
        }
    }
}

/// Second-pass parse for stringified payloads.
fn preprocess(data: &Value) -> Cow<'_, Value> {
    match data {
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(v) => Cow::Owned(v),
            Err(_) => Cow::Borrowed(data),
        },
        other => Cow::Borrowed(other),
    }
}

/// Cheap header peek: the tag, if the payload looks like an envelope of this
/// vocabulary. Never fails; anything else is `None`.
pub fn peek_tag(event: &RawEvent, version: ProtocolVersion) -> Option<MessageTag> {
    let data = preprocess(&event.data);
    let tag = data.as_object()?.get("message")?.as_str()?;
    version.lookup(tag)
}

/// Decode an inbound event's payload. The origin is not checked here.
pub fn decode(event: &RawEvent, version: ProtocolVersion) -> Result<Envelope> {
    decode_value(&event.data, version)
}

/// Decode a structured or stringified envelope value.
pub fn decode_value(data: &Value, version: ProtocolVersion) -> Result<Envelope> {
    let data = preprocess(data);
    schema::validate(&data, version)
}

/// Decode a serialized envelope string.
pub fn decode_envelope(raw: &str, version: ProtocolVersion) -> Result<Envelope> {
    let v: Value = serde_json::from_str(raw)
        .map_err(|e| BridgeError::Decode(format!("invalid envelope json: {e}")))?;
    schema::validate(&v, version)
}

/// Serialize an envelope as-is.
pub fn encode_envelope(env: &Envelope) -> Result<String> {
    serde_json::to_string(&to_wire(env))
        .map_err(|e| BridgeError::Internal(format!("json encode failed: {e}")))
}

/// Encoder bound to this peer's identity.
#[derive(Debug, Clone)]
pub struct Encoder {
    source: String,
}

impl Encoder {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Wrap `message` in an envelope stamped with our source.
    pub fn stamp(&self, message: Message) -> Envelope {
        Envelope::with_source(message, self.source.clone())
    }

    /// Stamp and serialize. Any source already on the envelope is replaced.
    pub fn encode(&self, message: Message) -> Result<String> {
        encode_envelope(&self.stamp(message))
    }

    /// True when `env` was produced by this encoder's peer.
    pub fn is_own(&self, env: &Envelope) -> bool {
        env.source.as_deref() == Some(self.source.as_str())
    }
}

fn to_wire(env: &Envelope) -> Value {
    let mut obj = Map::new();
    obj.insert("message".into(), Value::from(env.tag().as_str()));

    match &env.message {
        Message::GetConfig
        | Message::GetSdkVersion
        | Message::GetToken
        | Message::GetBalance
        | Message::Redirect
        | Message::Close => {}
        Message::SetConfig { config } => {
            obj.insert("config".into(), config.clone());
        }
        Message::SetSdkVersion { version } => {
            obj.insert("version".into(), Value::from(version.as_str()));
        }
        Message::SetToken { token } => {
            obj.insert("token".into(), Value::from(token.as_str()));
        }
        Message::SetBalance(b) => {
            obj.insert("balance".into(), Value::Number(b.balance.clone()));
            obj.insert("currency".into(), Value::from(b.currency.as_str()));
        }
        Message::DemoBalanceUpdate { balance_inc } => {
            obj.insert("balanceInc".into(), Value::from(*balance_inc));
        }
        Message::PayInvoice { invoice } => {
            obj.insert("data".into(), json!({ "invoice": invoice }));
        }
        Message::CancelInvoice { invoice } => {
            if let Some(invoice) = invoice {
                obj.insert("invoice".into(), Value::from(invoice.as_str()));
            }
        }
        Message::HandleError { error } | Message::HandlePaymentError { error } => {
            obj.insert("data".into(), json!({ "error": error }));
        }
        Message::ErrorHandled { action } => {
            obj.insert("action".into(), Value::from(action.as_str()));
            // Legacy surfaces read `handled` rather than `action`.
            obj.insert("handled".into(), Value::Bool(true));
        }
        Message::PaymentErrorHandled { action } => {
            obj.insert("action".into(), Value::from(action.as_str()));
        }
        Message::AnalyticsEvent { event_name } => {
            obj.insert("data".into(), json!({ "eventName": event_name }));
        }
    }

    if let Some(source) = &env.source {
        obj.insert("source".into(), Value::from(source.as_str()));
    }
    Value::Object(obj)
}
