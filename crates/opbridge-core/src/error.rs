//! Shared error type across opbridge crates.

use std::fmt;

use thiserror::Error;

/// Stable error codes (used in logs and test vectors).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Inbound origin differs from the trusted origin.
    OriginMismatch,
    /// Payload is not JSON, or its tag is unknown.
    Decode,
    /// Known tag, malformed body.
    Schema,
    /// Message authored by this peer, looped back.
    SelfSource,
    /// A host callback failed.
    Callback,
    /// Target surface could not be addressed.
    Delivery,
    /// A callback returned something the protocol does not allow.
    Protocol,
    /// Invalid configuration.
    Config,
    /// Unsupported config/protocol version.
    UnsupportedVersion,
    /// Internal error.
    Internal,
}

impl ErrorKind {
    /// String representation used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::OriginMismatch => "ORIGIN_MISMATCH",
            ErrorKind::Decode => "DECODE_FAILURE",
            ErrorKind::Schema => "SCHEMA_VALIDATION_FAILURE",
            ErrorKind::SelfSource => "SELF_SOURCE",
            ErrorKind::Callback => "CALLBACK_FAILURE",
            ErrorKind::Delivery => "DELIVERY_FAILURE",
            ErrorKind::Protocol => "PROTOCOL_ERROR",
            ErrorKind::Config => "CONFIG",
            ErrorKind::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// One offending field found during schema validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    /// Dotted field path (`data.invoice`), or `root`.
    pub path: String,
    /// Human readable reason.
    pub message: String,
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.path, self.message)
    }
}

/// Every issue found in one envelope, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    pub issues: Vec<SchemaIssue>,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for issue in &self.issues {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
            first = false;
        }
        Ok(())
    }
}

/// Unified error type used by core and host.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("origin mismatch: expected {expected}, got {actual}")]
    OriginMismatch { expected: String, actual: String },
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("schema validation failed: {0}")]
    Schema(SchemaError),
    #[error("self-source echo from {0}")]
    SelfSource(String),
    #[error("callback {callback} failed: {reason}")]
    Callback {
        callback: &'static str,
        reason: String,
    },
    #[error("delivery failed: {0}")]
    Delivery(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("unsupported version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Map to a stable code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::OriginMismatch { .. } => ErrorKind::OriginMismatch,
            BridgeError::Decode(_) => ErrorKind::Decode,
            BridgeError::Schema(_) => ErrorKind::Schema,
            BridgeError::SelfSource(_) => ErrorKind::SelfSource,
            BridgeError::Callback { .. } => ErrorKind::Callback,
            BridgeError::Delivery(_) => ErrorKind::Delivery,
            BridgeError::Protocol(_) => ErrorKind::Protocol,
            BridgeError::Config(_) => ErrorKind::Config,
            BridgeError::UnsupportedVersion => ErrorKind::UnsupportedVersion,
            BridgeError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Conditions that are expected background noise on a shared bus and are
    /// dropped without an error log.
    pub fn is_silent(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::OriginMismatch | ErrorKind::SelfSource
        )
    }

    /// Shorthand for wrapping a callback failure.
    pub fn callback(callback: &'static str, reason: impl fmt::Display) -> Self {
        BridgeError::Callback {
            callback,
            reason: reason.to_string(),
        }
    }
}

impl From<SchemaError> for BridgeError {
    fn from(e: SchemaError) -> Self {
        BridgeError::Schema(e)
    }
}
