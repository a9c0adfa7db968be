//! Configuration validation.
//!
//! Serde handles the syntactic side; this module checks value ranges and
//! reports every problem it finds rather than stopping at the first one.

use std::net::SocketAddr;

use tokio::sync::Semaphore;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("not a socket address: {:?}", config.listener.bind_address),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::new("listener.max_connections", "must be at least 1"));
    } else if config.listener.max_connections > Semaphore::MAX_PERMITS {
        errors.push(ValidationError::new(
            "listener.max_connections",
            format!("must be at most {}", Semaphore::MAX_PERMITS),
        ));
    }

    if config.discovery.service.trim().is_empty() {
        errors.push(ValidationError::new("discovery.service", "must not be empty"));
    }
    if config.discovery.resolver.trim().is_empty() {
        errors.push(ValidationError::new("discovery.resolver", "must not be empty"));
    }
    if config.discovery.command.trim().is_empty() {
        errors.push(ValidationError::new("discovery.command", "must not be empty"));
    }
    if config.discovery.refresh_interval_ms == 0 {
        errors.push(ValidationError::new("discovery.refresh_interval_ms", "must be greater than 0"));
    }
    if config.discovery.query_timeout_ms == 0 {
        errors.push(ValidationError::new("discovery.query_timeout_ms", "must be greater than 0"));
    }

    if config.backend.port == 0 {
        errors.push(ValidationError::new("backend.port", "must be a non-zero port"));
    }
    if config.backend.connect_timeout_ms == 0 {
        errors.push(ValidationError::new("backend.connect_timeout_ms", "must be greater than 0"));
    }
    if config.backend.max_connect_attempts == 0 {
        errors.push(ValidationError::new("backend.max_connect_attempts", "must be at least 1"));
    }
    if config.backend.max_registry_wraps == 0 {
        errors.push(ValidationError::new("backend.max_registry_wraps", "must be at least 1"));
    }

    if config.relay.idle_timeout_ms == 0 {
        errors.push(ValidationError::new("relay.idle_timeout_ms", "must be greater than 0"));
    }
    if config.relay.buffer_size == 0 {
        errors.push(ValidationError::new("relay.buffer_size", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("not a socket address: {:?}", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
