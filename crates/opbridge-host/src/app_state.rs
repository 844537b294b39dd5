//! Shared application state for the bridge server (the bus relays attach to).

use std::sync::Arc;

use crate::transport::MessageBus;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    bus: Arc<MessageBus>,
}

impl AppState {
    pub fn new(bus: Arc<MessageBus>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { bus }),
        }
    }

    pub fn bus(&self) -> Arc<MessageBus> {
        Arc::clone(&self.inner.bus)
    }
}
