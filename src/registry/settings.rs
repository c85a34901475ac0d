//! Data source names supplied by configuration.

use arc_swap::ArcSwap;
use crate::config::DataSourceConfig;

/// Separator of the additional data source list.
pub const NAME_LIST_DELIMITER: char = ',';

/// Supplies the pool names each traffic class is built from.
///
/// Read on every initialization attempt, so a corrected configuration is
/// picked up by the next request after a failure.
pub trait DataSourceSettings: Send + Sync {
    fn default_backend_name(&self) -> Option<String>;

    /// Additional primary pools, in configured order. May be empty.
    fn extra_backend_names(&self) -> Vec<String>;

    fn export_backend_name(&self) -> Option<String>;

    fn repository_backend_name(&self) -> Option<String>;
}

/// Split a comma-delimited list of names, dropping blank entries.
pub fn parse_name_list(raw: &str) -> Vec<String> {
    raw.split(NAME_LIST_DELIMITER)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

fn non_empty(name: &str) -> Option<String> {
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

impl DataSourceSettings for DataSourceConfig {
    fn default_backend_name(&self) -> Option<String> {
        non_empty(&self.default)
    }

    fn extra_backend_names(&self) -> Vec<String> {
        parse_name_list(&self.additional)
    }

    fn export_backend_name(&self) -> Option<String> {
        non_empty(&self.export)
    }

    fn repository_backend_name(&self) -> Option<String> {
        non_empty(&self.repository)
    }
}

/// Hot-swappable settings: `store` a new config and the next initialization
/// attempt sees it.
impl<T: DataSourceSettings> DataSourceSettings for ArcSwap<T> {
    fn default_backend_name(&self) -> Option<String> {
        self.load().default_backend_name()
    }

    fn extra_backend_names(&self) -> Vec<String> {
        self.load().extra_backend_names()
    }

    fn export_backend_name(&self) -> Option<String> {
        self.load().export_backend_name()
    }

    fn repository_backend_name(&self) -> Option<String> {
        self.load().repository_backend_name()
    }
}
