//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Connection request for a traffic class
//!     → registry (ordered backend list, default pool at index 0)
//!     → Policy chosen by the caller via catalog.rs:
//!         - pass_through.rs (always the default pool)
//!         - round_robin.rs (rotate through pools)
//!         - weighted.rs (smooth weighted rotation by pool capacity)
//!         - key_sticky.rs (same key, same pool)
//!     → backend.rs (open a connection from the chosen pool)
//! ```
//!
//! # Design Decisions
//! - Policies never own backends; they pick from a borrowed slice
//! - Rotating state lives in atomics shared by a single catalog instance
//! - The policy set is closed, so dispatch is an enum rather than `dyn`

pub mod backend;
pub mod catalog;
pub mod key_sticky;
pub mod pass_through;
pub mod round_robin;
pub mod weighted;

use std::sync::Arc;

pub use backend::{Backend, DEFAULT_WEIGHT};
pub use catalog::PolicyCatalog;
pub use key_sticky::{KeyParseError, KeySticky};
pub use pass_through::PassThrough;
pub use round_robin::RoundRobin;
pub use weighted::WeightedRoundRobin;

/// Selects one backend from an ordered list.
///
/// Returns `None` only when `backends` is empty.
pub trait LoadBalancer {
    fn next_server<S>(&self, backends: &[Arc<Backend<S>>]) -> Option<Arc<Backend<S>>>;
}

/// A load balancing policy handed to the registry with each request.
#[derive(Debug, Clone)]
pub enum Policy {
    PassThrough,
    RoundRobin(Arc<RoundRobin>),
    WeightedRoundRobin(Arc<WeightedRoundRobin>),
    KeySticky(KeySticky),
}

impl Policy {
    /// Short label used in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Policy::PassThrough => "pass_through",
            Policy::RoundRobin(_) => "round_robin",
            Policy::WeightedRoundRobin(_) => "weighted_round_robin",
            Policy::KeySticky(_) => "key_sticky",
        }
    }
}

impl LoadBalancer for Policy {
    fn next_server<S>(&self, backends: &[Arc<Backend<S>>]) -> Option<Arc<Backend<S>>> {
        match self {
            Policy::PassThrough => PassThrough.next_server(backends),
            Policy::RoundRobin(lb) => lb.next_server(backends),
            Policy::WeightedRoundRobin(lb) => lb.next_server(backends),
            Policy::KeySticky(lb) => lb.next_server(backends),
        }
    }
}
