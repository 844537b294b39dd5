//! Inbound origin + vocabulary check.
//!
//! This is the only gate in front of handler logic. The origin comparison is
//! exact and runs before the payload is touched, so a hostile frame cannot
//! get a single byte parsed by sending a well-formed envelope.

use opbridge_core::error::{BridgeError, Result};
use opbridge_core::protocol::{peek_tag, MessageTag, ProtocolVersion, RawEvent};

/// Why an event was not let through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    OriginMismatch,
    /// Not JSON, not an object, no string `message`, or a tag outside the
    /// session vocabulary.
    NotAnEnvelope,
}

/// Decision from policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Pass(MessageTag),
    Drop(DropReason),
}

/// Trusted origin + vocabulary, fixed for the session.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    trusted: String,
    version: ProtocolVersion,
}

impl OriginPolicy {
    pub fn new(trusted: impl Into<String>, version: ProtocolVersion) -> Self {
        Self {
            trusted: trusted.into(),
            version,
        }
    }

    pub fn trusted_origin(&self) -> &str {
        &self.trusted
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn evaluate(&self, event: &RawEvent) -> PolicyDecision {
        if event.origin != self.trusted {
            return PolicyDecision::Drop(DropReason::OriginMismatch);
        }
        match peek_tag(event, self.version) {
            Some(tag) => PolicyDecision::Pass(tag),
            None => PolicyDecision::Drop(DropReason::NotAnEnvelope),
        }
    }

    /// Pure predicate form.
    pub fn validate(&self, event: &RawEvent) -> bool {
        matches!(self.evaluate(event), PolicyDecision::Pass(_))
    }

    /// Error-carrying form used by the listener.
    pub fn check(&self, event: &RawEvent) -> Result<MessageTag> {
        match self.evaluate(event) {
            PolicyDecision::Pass(tag) => Ok(tag),
            PolicyDecision::Drop(DropReason::OriginMismatch) => Err(BridgeError::OriginMismatch {
                expected: self.trusted.clone(),
                actual: event.origin.clone(),
            }),
            PolicyDecision::Drop(DropReason::NotAnEnvelope) => Err(BridgeError::Decode(format!(
                "not a {} envelope ({} bytes)",
                self.version.as_str(),
                event.payload_len()
            ))),
        }
    }
}
