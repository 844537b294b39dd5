//! opbridge core: transport-agnostic protocol primitives for the host/surface
//! message bridge.
//!
//! This crate defines the wire vocabulary, the typed envelope, schema
//! validation, and the codec shared by the host runtime and by tooling. It
//! carries no transport or runtime dependencies so it can be reused in
//! multiple contexts (in-process bus, native bridge relay, tests).
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Every malformed
//! inbound payload surfaces as `BridgeError`, never as a crash of the caller.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{BridgeError, ErrorKind, Result, SchemaError, SchemaIssue};
