//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::fmt;
use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Names of the pools each traffic class is built from.
    pub data_sources: DataSourceConfig,

    /// Pools registered in the in-memory directory.
    pub pools: Vec<PoolConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Data source names.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DataSourceConfig {
    /// Default pool; always first in the primary list.
    pub default: String,

    /// Comma-delimited additional pools for primary traffic.
    pub additional: String,

    /// Pool used for export traffic.
    pub export: String,

    /// Pool used for repository metadata.
    pub repository: String,
}

/// A pool known to the in-memory directory.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PoolConfig {
    /// Directory name of the pool.
    pub name: String,

    /// Declared maximum pool size. Written as a number or a string; anything
    /// that is not a positive integer yields the default weight.
    #[serde(default)]
    pub max_pool_size: Option<RawAttribute>,

    /// Refuse every connection (simulates a broken pool).
    #[serde(default)]
    pub fail_connections: bool,
}

/// Attribute value kept in its raw form.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RawAttribute {
    Number(i64),
    Text(String),
}

impl fmt::Display for RawAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawAttribute::Number(n) => write!(f, "{}", n),
            RawAttribute::Text(s) => f.write_str(s),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
