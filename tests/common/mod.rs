//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use arc_swap::ArcSwap;
use pool_router::config::DataSourceConfig;
use pool_router::registry::InMemoryDirectory;
use pool_router::DataSourceRegistry;

pub const DEFAULT_POOL: &str = "dwhrep/jdbc/eniqPool";
pub const EXPORT_POOL: &str = "csv/jdbc/exportPool";

pub type Registry = DataSourceRegistry<InMemoryDirectory>;

/// Data source names with the given additional list.
pub fn data_sources(additional: &[&str]) -> DataSourceConfig {
    DataSourceConfig {
        default: DEFAULT_POOL.to_string(),
        additional: additional.join(","),
        export: EXPORT_POOL.to_string(),
        repository: String::new(),
    }
}

/// A registry whose settings can be swapped while it runs.
pub fn swappable_registry(
    directory: &InMemoryDirectory,
    config: DataSourceConfig,
) -> (Registry, Arc<ArcSwap<DataSourceConfig>>) {
    let settings = Arc::new(ArcSwap::from_pointee(config));
    let registry = Registry::new(directory.clone(), Arc::new(directory.clone()), settings.clone());
    (registry, settings)
}

/// A directory with the default pool and the named extra pools bound.
pub fn directory_with(extra: &[(&str, u32)]) -> InMemoryDirectory {
    let directory = InMemoryDirectory::new();
    directory.bind(DEFAULT_POOL, Some("3".to_string()));
    for (name, size) in extra {
        directory.bind(name, Some(size.to_string()));
    }
    directory
}
