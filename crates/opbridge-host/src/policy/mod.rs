//! Policy layer (inbound origin validation).
//!
//! Compiles the session's trusted origin and vocabulary into a predicate the
//! listener runs before decode.

pub mod origin;

pub use origin::{DropReason, OriginPolicy, PolicyDecision};
