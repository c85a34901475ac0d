//! Smooth weighted round-robin strategy.
//!
//! Each pass over the list lowers a weight threshold by the gcd of all
//! weights; a backend is eligible while its weight meets the threshold. Over
//! `sum(weights) / gcd` calls every backend is chosen in proportion to its
//! weight, and heavy backends are interleaved with light ones instead of
//! being served in bursts.
//!
//! The cursor and the threshold are packed into one `AtomicU64` so that each
//! selection is a single compare-and-swap over both values.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use crate::load_balancer::{LoadBalancer, backend::Backend};

/// Cursor value meaning "before the first backend".
const NO_INDEX: u32 = u32::MAX;

fn pack(index: u32, current_weight: u32) -> u64 {
    ((index as u64) << 32) | current_weight as u64
}

fn unpack(state: u64) -> (u32, u32) {
    ((state >> 32) as u32, state as u32)
}

/// Weighted round-robin selector.
#[derive(Debug)]
pub struct WeightedRoundRobin {
    /// High half: last index used. Low half: current weight threshold.
    state: AtomicU64,
}

impl Default for WeightedRoundRobin {
    fn default() -> Self {
        Self {
            state: AtomicU64::new(pack(NO_INDEX, 0)),
        }
    }
}

impl WeightedRoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for WeightedRoundRobin {
    fn next_server<S>(&self, backends: &[Arc<Backend<S>>]) -> Option<Arc<Backend<S>>> {
        if backends.is_empty() {
            return None;
        }

        let gcd = greatest_common_divisor(backends).max(1) as i64;
        let max_weight = maximum_weight(backends);
        let len = backends.len();
        let mut chosen = 0;

        // The closure always yields a new state, so the update cannot fail.
        let _ = self.state.fetch_update(Ordering::AcqRel, Ordering::Acquire, |state| {
            let (last, current) = unpack(state);
            let mut index = if last == NO_INDEX { 0 } else { (last as usize + 1) % len };
            let mut current = current as i64;
            loop {
                if index == 0 {
                    current -= gcd;
                    if current <= 0 {
                        current = max_weight as i64;
                    }
                }
                if backends[index].weight() as i64 >= current {
                    chosen = index;
                    return Some(pack(index as u32, current as u32));
                }
                index = (index + 1) % len;
            }
        });

        Some(backends[chosen].clone())
    }
}

/// Greatest common divisor of all backend weights (0 for an empty list).
pub fn greatest_common_divisor<S>(backends: &[Arc<Backend<S>>]) -> u32 {
    backends.iter().fold(0, |acc, b| gcd(acc, b.weight()))
}

/// Largest backend weight (0 for an empty list).
pub fn maximum_weight<S>(backends: &[Arc<Backend<S>>]) -> u32 {
    backends.iter().map(|b| b.weight()).max().unwrap_or(0)
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 { a } else { gcd(b, a % b) }
}
