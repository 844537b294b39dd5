//! Relay frame codec.
//!
//! The native wrapper forwards surface events as text frames shaped like a DOM
//! `MessageEvent`:
//!
//! - inbound: `{"detail":{"data":<envelope|string>,"origin":"<origin>"}}`
//! - outbound: `{"detail":{"payload":"<envelope>","origin":"<target origin>"}}`

use serde::{Deserialize, Serialize};
use serde_json::Value;

use opbridge_core::error::{BridgeError, Result};
use opbridge_core::protocol::RawEvent;

use super::bus::Posted;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InboundFrame {
    detail: InboundDetail,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InboundDetail {
    data: Value,
    origin: String,
}

#[derive(Debug, Serialize)]
struct OutboundFrame<'a> {
    detail: OutboundDetail<'a>,
}

#[derive(Debug, Serialize)]
struct OutboundDetail<'a> {
    payload: &'a str,
    origin: &'a str,
}

pub fn decode_frame(text: &str) -> Result<RawEvent> {
    let frame: InboundFrame = serde_json::from_str(text)
        .map_err(|e| BridgeError::Decode(format!("invalid relay frame: {e}")))?;
    Ok(RawEvent::new(frame.detail.origin, frame.detail.data))
}

pub fn encode_frame(posted: &Posted) -> Result<String> {
    let frame = OutboundFrame {
        detail: OutboundDetail {
            payload: &posted.payload,
            origin: &posted.target_origin,
        },
    };
    serde_json::to_string(&frame)
        .map_err(|e| BridgeError::Internal(format!("json encode failed: {e}")))
}
