//! Data source registry subsystem.
//!
//! # Data Flow
//! ```text
//! connection(policy)
//!     → slot.rs (first request builds the class's backend list, once)
//!         → settings.rs (default + additional pool names)
//!         → Directory::resolve (pool handle; default failure is fatal)
//!         → AttributeReader::pool_max_size (weight; failure → 3)
//!     → Policy selects a backend when more than one exists
//!     → Backend::open → RoutedConnection
//! ```
//!
//! # Design Decisions
//! - Traffic classes (primary, export, repository) are fully independent
//! - A failed default lookup is not cached; the next request retries
//! - Once ready, a backend list is never rebuilt
//! - The directory, attribute reader and settings are collaborators behind traits

pub mod error;
pub mod manager;
pub mod memory;
pub mod settings;
pub mod slot;

use std::fmt;
use std::sync::Arc;

pub use error::{AttributeReadError, ConfigurationError, ConnectionError, LookupError, RegistryError};
pub use manager::{DataSourceRegistry, RoutedConnection};
pub use memory::{InMemoryConnection, InMemoryDirectory, InMemoryPool};
pub use settings::{parse_name_list, DataSourceSettings};
pub use slot::ClassState;

/// An independent backend list and its selection context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrafficClass {
    /// Query traffic, balanced across the default and additional pools.
    Primary,
    /// Bulk export traffic.
    Export,
    /// Repository metadata traffic, always served by a single pool.
    Repository,
}

impl TrafficClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficClass::Primary => "primary",
            TrafficClass::Export => "export",
            TrafficClass::Repository => "repository",
        }
    }
}

impl fmt::Display for TrafficClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something that can open connections, typically a connection pool.
pub trait ConnectionSource: Send + Sync {
    type Connection;

    fn connect(&self) -> Result<Self::Connection, ConnectionError>;
}

impl<T: ConnectionSource + ?Sized> ConnectionSource for Arc<T> {
    type Connection = T::Connection;

    fn connect(&self) -> Result<Self::Connection, ConnectionError> {
        (**self).connect()
    }
}

/// Resolves a pool name to a live pool handle.
pub trait Directory: Send + Sync {
    type Source: ConnectionSource;

    fn resolve(&self, name: &str) -> Result<Self::Source, LookupError>;
}

/// Reads the declared capacity of a pool.
pub trait AttributeReader: Send + Sync {
    /// Raw maximum pool size attribute, parsed by the registry.
    fn pool_max_size(&self, name: &str) -> Result<String, AttributeReadError>;
}
