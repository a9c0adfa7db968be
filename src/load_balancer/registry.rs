//! Backend registry: the current host list plus a round-robin cursor.
//!
//! # Responsibilities
//! - Hold the most recent discovery result
//! - Rotate through hosts, one position per selection
//! - Serialize every read and write behind a single lock
//!
//! The list is replaced wholesale on each refresh. The cursor is never reset
//! by a replace; a list that shrank below the cursor is handled by wrapping
//! back to the start on the next selection.

use parking_lot::Mutex;

use crate::config::DEFAULT_MAX_REGISTRY_WRAPS;

#[derive(Debug, Default)]
struct RegistryState {
    hosts: Vec<String>,
    cursor: usize,
}

/// Lock-protected snapshot of known backend hosts.
#[derive(Debug)]
pub struct BackendRegistry {
    state: Mutex<RegistryState>,
    max_wraps: u32,
}

impl BackendRegistry {
    /// Create an empty registry with the default wrap budget.
    pub fn new() -> Self {
        Self::with_max_wraps(DEFAULT_MAX_REGISTRY_WRAPS)
    }

    /// Create an empty registry allowing `max_wraps` cursor resets per selection.
    pub fn with_max_wraps(max_wraps: u32) -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            max_wraps,
        }
    }

    /// Swap in a new host list. The cursor is left untouched.
    pub fn replace(&self, hosts: Vec<String>) {
        let mut state = self.state.lock();
        state.hosts = hosts;
        crate::observability::metrics::set_registry_backends(state.hosts.len());
    }

    /// Pick the host under the cursor and advance it.
    ///
    /// Returns `None` once the cursor has wrapped `max_wraps` times without
    /// finding a host, which only happens when the list is empty.
    pub fn next(&self) -> Option<String> {
        let mut state = self.state.lock();
        let mut wraps_left = self.max_wraps;

        while wraps_left > 0 {
            if let Some(host) = state.hosts.get(state.cursor).cloned() {
                state.cursor = (state.cursor + 1) % state.hosts.len();
                return Some(host);
            }
            state.cursor = 0;
            wraps_left -= 1;
        }
        None
    }

    /// Copy of the current host list.
    pub fn hosts(&self) -> Vec<String> {
        self.state.lock().hosts.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().hosts.is_empty()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn hosts(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rotates_in_order() {
        let registry = BackendRegistry::new();
        registry.replace(hosts(&["A", "B", "C"]));

        let picked: Vec<_> = (0..4).map(|_| registry.next().unwrap()).collect();
        assert_eq!(picked, vec!["A", "B", "C", "A"]);
    }

    #[test]
    fn empty_registry_yields_none() {
        let registry = BackendRegistry::new();
        assert_eq!(registry.next(), None);
        assert_eq!(registry.next(), None);
    }

    #[test]
    fn shrinking_list_wraps_to_start() {
        let registry = BackendRegistry::new();
        registry.replace(hosts(&["A", "B", "C"]));
        registry.next();
        registry.next();
        // cursor now points at index 2
        registry.replace(hosts(&["X", "Y"]));

        assert_eq!(registry.next().as_deref(), Some("X"));
        assert_eq!(registry.next().as_deref(), Some("Y"));
        assert_eq!(registry.next().as_deref(), Some("X"));
    }

    #[test]
    fn replace_keeps_cursor_position() {
        let registry = BackendRegistry::new();
        registry.replace(hosts(&["A", "B", "C"]));
        registry.next();

        registry.replace(hosts(&["D", "E", "F"]));
        assert_eq!(registry.next().as_deref(), Some("E"));
    }

    #[test]
    fn emptied_registry_recovers_after_refill() {
        let registry = BackendRegistry::new();
        registry.replace(hosts(&["A", "B"]));
        registry.next();
        registry.replace(Vec::new());
        assert_eq!(registry.next(), None);

        registry.replace(hosts(&["C"]));
        assert_eq!(registry.next().as_deref(), Some("C"));
    }

    #[test]
    fn concurrent_selection_is_balanced() {
        let registry = Arc::new(BackendRegistry::new());
        registry.replace(hosts(&["A", "B"]));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    (0..250)
                        .filter(|_| registry.next().as_deref() == Some("A"))
                        .count()
                })
            })
            .collect();

        let a_hits: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(a_hits, 500);
    }
}
