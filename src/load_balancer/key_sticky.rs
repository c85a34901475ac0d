//! Key-sticky strategy: a numeric routing key always maps to the same pool.
//!
//! Built per request from a caller-supplied token such as a subscriber
//! identity. Keys are reduced with Euclidean modulo, so a negative key still
//! lands on a valid index and the mapping only depends on the list length.

use std::num::ParseIntError;
use std::sync::Arc;
use thiserror::Error;
use crate::load_balancer::{LoadBalancer, backend::Backend};

/// The routing token is not a valid signed 64-bit integer.
#[derive(Debug, Error)]
#[error("invalid routing key {key:?}: {source}")]
pub struct KeyParseError {
    pub key: String,
    #[source]
    pub source: ParseIntError,
}

/// Key-sticky selector. Holds no shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySticky {
    key: i64,
}

impl KeySticky {
    /// Parse a routing key. Surrounding whitespace is not accepted.
    pub fn parse(token: &str) -> Result<Self, KeyParseError> {
        token
            .parse::<i64>()
            .map(Self::from_key)
            .map_err(|source| KeyParseError {
                key: token.to_string(),
                source,
            })
    }

    pub fn from_key(key: i64) -> Self {
        Self { key }
    }

    pub fn key(&self) -> i64 {
        self.key
    }

    /// Index this key maps to in a list of `len` backends.
    pub fn index_for(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let len = i64::try_from(len).ok()?;
        Some(self.key.rem_euclid(len) as usize)
    }
}

impl LoadBalancer for KeySticky {
    fn next_server<S>(&self, backends: &[Arc<Backend<S>>]) -> Option<Arc<Backend<S>>> {
        self.index_for(backends.len())
            .map(|index| backends[index].clone())
    }
}
