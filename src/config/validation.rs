//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject duplicate data source and pool names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - An empty default data source is allowed here; the registry reports it

use std::collections::HashSet;
use std::fmt;
use crate::config::schema::RouterConfig;
use crate::registry::parse_name_list;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Additional data sources are configured without a default one.
    AdditionalWithoutDefault,
    /// A name appears more than once in the additional list.
    DuplicateDataSource(String),
    /// A pool is declared twice in `[[pools]]`.
    DuplicatePool(String),
    /// A pool entry has an empty name.
    EmptyPoolName(usize),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::AdditionalWithoutDefault => {
                write!(f, "additional data sources require a default data source")
            }
            ValidationError::DuplicateDataSource(name) => {
                write!(f, "data source '{}' is listed more than once", name)
            }
            ValidationError::DuplicatePool(name) => write!(f, "pool '{}' is declared more than once", name),
            ValidationError::EmptyPoolName(index) => write!(f, "pool #{} has an empty name", index),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let sources = &config.data_sources;

    let additional = parse_name_list(&sources.additional);
    if !additional.is_empty() && sources.default.trim().is_empty() {
        errors.push(ValidationError::AdditionalWithoutDefault);
    }

    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(sources.default.trim());
    for name in &additional {
        if !seen.insert(name.as_str()) {
            errors.push(ValidationError::DuplicateDataSource(name.clone()));
        }
    }

    let mut pools: HashSet<&str> = HashSet::new();
    for (index, pool) in config.pools.iter().enumerate() {
        if pool.name.trim().is_empty() {
            errors.push(ValidationError::EmptyPoolName(index));
        } else if !pools.insert(pool.name.as_str()) {
            errors.push(ValidationError::DuplicatePool(pool.name.clone()));
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DataSourceConfig, PoolConfig};

    fn pool(name: &str) -> PoolConfig {
        PoolConfig { name: name.into(), max_pool_size: None, fail_connections: false }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RouterConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let config = RouterConfig {
            data_sources: DataSourceConfig {
                default: "eniqPool".into(),
                additional: "eniqPool1,eniqPool,eniqPool1".into(),
                ..Default::default()
            },
            pools: vec![pool("eniqPool"), pool("eniqPool"), pool(" ")],
            ..Default::default()
        };

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::DuplicateDataSource("eniqPool".into()),
                ValidationError::DuplicateDataSource("eniqPool1".into()),
                ValidationError::DuplicatePool("eniqPool".into()),
                ValidationError::EmptyPoolName(2),
            ]
        );
    }

    #[test]
    fn test_additional_without_default() {
        let config = RouterConfig {
            data_sources: DataSourceConfig { additional: "eniqPool1".into(), ..Default::default() },
            ..Default::default()
        };
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::AdditionalWithoutDefault]
        );
    }
}
