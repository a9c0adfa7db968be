//! Backend selection for the connection-accept path.

use std::sync::Arc;

use crate::load_balancer::registry::BackendRegistry;

/// Round-robin selector over a shared [`BackendRegistry`].
/// Holds no state of its own; rotation lives in the registry.
#[derive(Debug, Clone)]
pub struct BackendSelector {
    registry: Arc<BackendRegistry>,
}

impl BackendSelector {
    pub fn new(registry: Arc<BackendRegistry>) -> Self {
        Self { registry }
    }

    /// Next candidate host, or `None` when no backend is known.
    pub fn select(&self) -> Option<String> {
        self.registry.next()
    }
}
