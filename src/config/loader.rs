//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServerConfig, ConfigError> {
    let config: ServerConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Applies a `--bind` override and re-validates the result.
pub fn override_bind_address(
    mut config: ServerConfig,
    bind_address: impl Into<String>,
) -> Result<ServerConfig, ConfigError> {
    config.listener.bind_address = bind_address.into();
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let config = parse_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:8081"
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:8081");
    }

    #[test]
    fn test_validation_errors_joined() {
        let err = parse_config(
            r#"
            [endpoint]
            path = "soap"
            max_body_bytes = 0
            "#,
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Validation failed: endpoint.path `soap` must start with `/`, endpoint.max_body_bytes must be greater than zero"
        );
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(
            parse_config("[listener"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_bind_override_validated() {
        let config = override_bind_address(ServerConfig::default(), "127.0.0.1:9000").unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");

        let err = override_bind_address(ServerConfig::default(), "localhost").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(errors)
                if errors == vec![ValidationError::BindAddress("localhost".into())]
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/soap-service.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
