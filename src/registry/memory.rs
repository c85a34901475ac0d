//! In-memory directory of connection pools.
//!
//! Backs the CLI and the test suite. Pools can be bound, unbound and made to
//! refuse connections at runtime, which is enough to drive every registry
//! transition without a real naming service.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use dashmap::DashMap;
use uuid::Uuid;

use crate::config::PoolConfig;
use crate::registry::{
    AttributeReadError, AttributeReader, ConnectionError, ConnectionSource, Directory, LookupError,
};

/// A connection handed out by an [`InMemoryPool`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryConnection {
    pub id: Uuid,
    pub pool: String,
}

/// A pool that counts the connections it opened.
#[derive(Debug)]
pub struct InMemoryPool {
    name: String,
    opened: AtomicU64,
    failing: AtomicBool,
}

impl InMemoryPool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            opened: AtomicU64::new(0),
            failing: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of connections opened so far.
    pub fn opened(&self) -> u64 {
        self.opened.load(Ordering::Relaxed)
    }

    /// Make the pool refuse (or accept again) new connections.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }
}

impl ConnectionSource for InMemoryPool {
    type Connection = InMemoryConnection;

    fn connect(&self) -> Result<InMemoryConnection, ConnectionError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(ConnectionError::new(&self.name, "pool refused the connection"));
        }
        self.opened.fetch_add(1, Ordering::Relaxed);
        Ok(InMemoryConnection {
            id: Uuid::new_v4(),
            pool: self.name.clone(),
        })
    }
}

#[derive(Debug)]
struct Entry {
    pool: Arc<InMemoryPool>,
    max_pool_size: Option<String>,
}

/// Name → pool map shared by all clones.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    entries: Arc<DashMap<String, Entry>>,
    lookups: Arc<AtomicUsize>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a directory from `[[pools]]` configuration.
    pub fn from_config(pools: &[PoolConfig]) -> Self {
        let directory = Self::new();
        for config in pools {
            let pool = directory.bind(&config.name, config.max_pool_size.as_ref().map(|raw| raw.to_string()));
            pool.set_failing(config.fail_connections);
        }
        directory
    }

    /// Bind a pool under `name`, replacing any previous binding.
    pub fn bind(&self, name: &str, max_pool_size: Option<String>) -> Arc<InMemoryPool> {
        let pool = Arc::new(InMemoryPool::new(name));
        self.entries.insert(
            name.to_string(),
            Entry {
                pool: pool.clone(),
                max_pool_size,
            },
        );
        pool
    }

    pub fn unbind(&self, name: &str) -> Option<Arc<InMemoryPool>> {
        self.entries.remove(name).map(|(_, entry)| entry.pool)
    }

    pub fn pool(&self, name: &str) -> Option<Arc<InMemoryPool>> {
        self.entries.get(name).map(|entry| entry.pool.clone())
    }

    /// Number of `resolve` calls served, successful or not.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

impl Directory for InMemoryDirectory {
    type Source = Arc<InMemoryPool>;

    fn resolve(&self, name: &str) -> Result<Arc<InMemoryPool>, LookupError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.pool(name).ok_or_else(|| LookupError::NotFound {
            name: name.to_string(),
        })
    }
}

impl AttributeReader for InMemoryDirectory {
    fn pool_max_size(&self, name: &str) -> Result<String, AttributeReadError> {
        let entry = self.entries.get(name).ok_or_else(|| AttributeReadError {
            name: name.to_string(),
            reason: "no such pool".to_string(),
        })?;
        entry.max_pool_size.clone().ok_or_else(|| AttributeReadError {
            name: name.to_string(),
            reason: "MaxPoolSize attribute is not set".to_string(),
        })
    }
}
