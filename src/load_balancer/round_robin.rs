//! Round-robin load balancing strategy.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use crate::load_balancer::{LoadBalancer, backend::Backend};

/// Round-robin selector.
/// Stores an internal cursor, pre-incremented on every call.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for RoundRobin {
    fn next_server<S>(&self, backends: &[Arc<Backend<S>>]) -> Option<Arc<Backend<S>>> {
        if backends.is_empty() {
            return None;
        }

        // fetch_add returns the previous value; the slot used is the incremented one
        let cursor = self.cursor.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        Some(backends[cursor % backends.len()].clone())
    }
}
