//! Configuration loading from disk.

use std::path::Path;
use std::fs;
use crate::config::schema::RouterConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RouterConfig, ConfigError> {
    let config: RouterConfig = toml::from_str(content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawAttribute;
    use crate::registry::DataSourceSettings;

    const SAMPLE: &str = r#"
[data_sources]
default = "dwhrep/jdbc/eniqPool"
additional = "eniqPool1, eniqPool2"
export = "csv/jdbc/exportPool"

[[pools]]
name = "dwhrep/jdbc/eniqPool"
max_pool_size = 4

[[pools]]
name = "eniqPool1"
max_pool_size = "3"

[[pools]]
name = "eniqPool2"
fail_connections = true

[observability]
log_level = "debug"
"#;

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.data_sources.default_backend_name().as_deref(), Some("dwhrep/jdbc/eniqPool"));
        assert_eq!(config.data_sources.extra_backend_names(), ["eniqPool1", "eniqPool2"]);
        assert_eq!(config.pools.len(), 3);
        assert_eq!(config.pools[0].max_pool_size, Some(RawAttribute::Number(4)));
        assert_eq!(config.pools[1].max_pool_size, Some(RawAttribute::Text("3".into())));
        assert!(config.pools[2].fail_connections);
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        assert!(matches!(parse_config("[data_sources"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let path = std::env::temp_dir().join(format!("pool-router-{}.toml", uuid::Uuid::new_v4()));
        assert!(matches!(load_config(&path), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("pool-router-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, SAMPLE).unwrap();
        let config = load_config(&path);
        let _ = fs::remove_file(&path);
        assert_eq!(config.unwrap().data_sources.export, "csv/jdbc/exportPool");
    }
}
