//! Pass-through strategy: all traffic goes to the default pool.

use std::sync::Arc;
use crate::load_balancer::{LoadBalancer, backend::Backend};

/// Always selects the first backend, which the registry keeps as the default pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl LoadBalancer for PassThrough {
    fn next_server<S>(&self, backends: &[Arc<Backend<S>>]) -> Option<Arc<Backend<S>>> {
        backends.first().cloned()
    }
}
