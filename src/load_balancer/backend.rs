//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single named connection pool
//! - Carry the weight used by weighted selection
//! - Delegate connection opening to the underlying source

use std::fmt;

use crate::registry::{ConnectionError, ConnectionSource};

/// Weight assigned when a pool's capacity attribute is unavailable.
pub const DEFAULT_WEIGHT: u32 = 3;

/// A single named, weighted connection pool.
///
/// Backends are built once while a traffic class initializes and are
/// immutable afterwards; they are shared as `Arc<Backend<S>>`.
pub struct Backend<S> {
    name: String,
    weight: u32,
    source: S,
}

impl<S> Backend<S> {
    /// Create a new backend. A zero weight is replaced by [`DEFAULT_WEIGHT`].
    pub fn new(name: impl Into<String>, weight: u32, source: S) -> Self {
        let weight = if weight == 0 { DEFAULT_WEIGHT } else { weight };
        Self {
            name: name.into(),
            weight,
            source,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Selection weight, always at least 1.
    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: ConnectionSource> Backend<S> {
    /// Open a connection from the underlying pool.
    pub fn open(&self) -> Result<S::Connection, ConnectionError> {
        self.source.connect()
    }
}

impl<S> fmt::Debug for Backend<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .finish_non_exhaustive()
    }
}
