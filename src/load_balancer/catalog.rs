//! Policy catalog.
//!
//! # Responsibilities
//! - Own the single rotating and weighted selectors for the process
//! - Hand out [`Policy`] values that share those selectors
//! - Build a fresh key-sticky policy per request
//!
//! Construct one catalog at startup and clone it wherever policies are
//! needed; clones share the same counters.

use std::sync::Arc;
use crate::load_balancer::{KeyParseError, KeySticky, Policy, RoundRobin, WeightedRoundRobin};

#[derive(Debug, Clone, Default)]
pub struct PolicyCatalog {
    round_robin: Arc<RoundRobin>,
    weighted: Arc<WeightedRoundRobin>,
}

impl PolicyCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The policy used when a caller has no preference (round-robin).
    pub fn default_policy(&self) -> Policy {
        self.round_robin()
    }

    pub fn round_robin(&self) -> Policy {
        Policy::RoundRobin(self.round_robin.clone())
    }

    pub fn weighted_round_robin(&self) -> Policy {
        Policy::WeightedRoundRobin(self.weighted.clone())
    }

    pub fn pass_through(&self) -> Policy {
        Policy::PassThrough
    }

    /// Build a key-sticky policy for one request.
    pub fn key_sticky(&self, key: &str) -> Result<Policy, KeyParseError> {
        KeySticky::parse(key).map(Policy::KeySticky)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balancer::LoadBalancer;
    use crate::load_balancer::test_support::pools;

    #[test]
    fn test_default_policy_is_round_robin() {
        let catalog = PolicyCatalog::new();
        assert!(matches!(catalog.default_policy(), Policy::RoundRobin(_)));
    }

    #[test]
    fn test_policies_share_counters() {
        let catalog = PolicyCatalog::new();
        let clone = catalog.clone();
        let backends = pools(3);

        let first = catalog.round_robin().next_server(&backends).unwrap();
        let second = clone.default_policy().next_server(&backends).unwrap();
        let third = catalog.round_robin().next_server(&backends).unwrap();
        assert_eq!(
            [first.name(), second.name(), third.name()],
            ["pool1", "pool2", "pool0"]
        );

        match (catalog.weighted_round_robin(), clone.weighted_round_robin()) {
            (Policy::WeightedRoundRobin(a), Policy::WeightedRoundRobin(b)) => {
                assert!(Arc::ptr_eq(&a, &b))
            }
            other => panic!("unexpected policies: {:?}", other),
        }
    }

    #[test]
    fn test_key_sticky_factory_propagates_parse_errors() {
        let catalog = PolicyCatalog::new();
        assert!(catalog.key_sticky("not-a-number").is_err());
        assert!(matches!(catalog.key_sticky("42"), Ok(Policy::KeySticky(k)) if k.key() == 42));
    }
}
