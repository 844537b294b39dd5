//! Top-level facade crate for opbridge.
//!
//! Re-exports the protocol core and the host runtime so users can depend on a single crate.

pub mod core {
    pub use opbridge_core::*;
}

pub mod host {
    pub use opbridge_host::*;
}
