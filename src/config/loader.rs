//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding a comma-separated service list.
pub const SERVICES_ENV: &str = "SERVICES";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse configuration from a TOML file. Validation happens in [`resolve_config`].
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Effective configuration: file (or defaults), then `SERVICES`, then
/// `cli_services`, validated once at the end.
pub fn resolve_config(
    path: Option<&Path>,
    cli_services: Option<&str>,
) -> Result<ServerConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    apply_env_overrides(&mut config);
    if let Some(raw) = cli_services {
        config.services = parse_service_list(raw);
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Split a comma-separated service list, trimming entries and dropping empty ones.
pub fn parse_service_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Apply `SERVICES` from the environment, if set.
pub fn apply_env_overrides(config: &mut ServerConfig) {
    if let Ok(raw) = std::env::var(SERVICES_ENV) {
        config.services = parse_service_list(&raw);
        tracing::debug!(services = ?config.services, "Service list overridden from environment");
    }
}
