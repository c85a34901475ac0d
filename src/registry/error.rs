//! Registry error taxonomy.
//!
//! Only [`RegistryError`] reaches callers. Lookup failures of additional
//! pools and attribute read failures are absorbed by the registry and logged.

use thiserror::Error;
use crate::registry::TrafficClass;

/// A directory lookup did not produce a pool handle.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error("{name} was not found in the directory")]
    NotFound { name: String },

    #[error("directory lookup of {name} failed: {reason}")]
    Unavailable { name: String, reason: String },
}

/// The capacity attribute of a pool could not be read.
#[derive(Debug, Error)]
#[error("cannot read attributes of {name}: {reason}")]
pub struct AttributeReadError {
    pub name: String,
    pub reason: String,
}

/// The underlying pool could not open a connection.
#[derive(Debug, Error)]
#[error("cannot open connection from {backend}: {message}")]
pub struct ConnectionError {
    pub backend: String,
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ConnectionError {
    pub fn new(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        backend: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            backend: backend.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }
}

/// The required pool of a traffic class is missing or cannot be resolved.
#[derive(Debug, Clone, Error)]
pub enum ConfigurationError {
    #[error("no {class} data source is configured")]
    Missing { class: TrafficClass },

    #[error("the {class} data source {name} could not be found")]
    Unresolvable {
        class: TrafficClass,
        name: String,
        #[source]
        source: LookupError,
    },
}

/// Errors surfaced by connection requests.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// A policy was handed an empty backend list.
    #[error("no {0} backends available for selection")]
    NoBackends(TrafficClass),
}
