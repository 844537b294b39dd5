//! opbridge host runtime.
//!
//! Wires the origin policy, dispatcher, executor and transports into a host
//! session. Consumed by the binary (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod app_state;
pub mod config;
pub mod demo;
pub mod dispatch;
pub mod executor;
pub mod policy;
pub mod router;
pub mod session;
pub mod transport;

pub use session::{initialize, HostSession, SessionHandle};
