//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check that requested services can be configured
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Unknown service names are left to the resolver, which owns the alias table
//! - An empty service list is valid (a host that mounts nothing)

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::services::{AliasTable, ServiceId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: {value:?} is not a socket address")]
    InvalidAddress { field: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("services[{0}] is blank")]
    BlankService(usize),
    #[error("admin.api_key must be set when the admin service is enabled")]
    MissingAdminKey,
}

pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    let positive = [
        ("timeouts.request_secs", config.timeouts.request_secs as usize),
        ("timeouts.shutdown_secs", config.timeouts.shutdown_secs as usize),
        ("security.max_body_size", config.security.max_body_size),
        ("worker.poll_interval_ms", config.worker.poll_interval_ms as usize),
        ("collaboration.max_message_bytes", config.collaboration.max_message_bytes),
        ("collaboration.channel_capacity", config.collaboration.channel_capacity),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    for (i, name) in config.services.iter().enumerate() {
        if name.trim().is_empty() {
            errors.push(ValidationError::BlankService(i));
        }
    }

    let aliases = AliasTable::standard();
    let wants_admin = config
        .services
        .iter()
        .any(|name| aliases.resolve(name) == Ok(ServiceId::Admin));
    if wants_admin && config.admin.api_key.is_empty() {
        errors.push(ValidationError::MissingAdminKey);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_service_list_is_valid() {
        let config = ServerConfig {
            services: Vec::new(),
            ..ServerConfig::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "localhost".to_string();
        config.timeouts.request_secs = 0;
        config.worker.poll_interval_ms = 0;
        config.services = vec!["web".to_string(), "  ".to_string()];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::Zero("timeouts.request_secs")));
        assert!(errors.contains(&ValidationError::BlankService(1)));
    }

    #[test]
    fn test_admin_requires_key() {
        let mut config = ServerConfig::default();
        config.services.push("admin".to_string());
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::MissingAdminKey]
        );

        config.admin.api_key = "secret".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_admin_check_ignores_unknown_names() {
        let config = ServerConfig {
            services: vec!["web".to_string(), "Admin".to_string(), "bogus".to_string()],
            ..ServerConfig::default()
        };
        // Unknown names are the resolver's to reject.
        assert!(validate_config(&config).is_ok());
    }
}
