//! Dispatcher module exports.
//!
//! Re-exports the dispatcher and the host capability trait so downstream
//! consumers can depend on this module directly.

pub mod callbacks;
pub mod dispatcher;

pub use callbacks::{CallbackError, CallbackResult, ErrorResolution, HostCallbacks};
pub use dispatcher::{Command, Dispatcher};
