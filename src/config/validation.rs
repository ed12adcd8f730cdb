//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and URLs before anything binds or connects
//! - Validate value ranges (intervals > 0, names non-empty)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ManagerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ManagerConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
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

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ManagerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new("listener.request_timeout_secs", "must be greater than 0"));
    }

    if config.admin.api_key.is_empty() {
        errors.push(ValidationError::new("admin.api_key", "must not be empty"));
    }
    if config.admin.key_header.is_empty() {
        errors.push(ValidationError::new("admin.key_header", "must not be empty"));
    }

    match url::Url::parse(&config.control_plane.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "control_plane.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "control_plane.base_url",
            format!("'{}' is not a valid URL: {}", config.control_plane.base_url, e),
        )),
    }
    if config.control_plane.server_name.is_empty() {
        errors.push(ValidationError::new("control_plane.server_name", "must not be empty"));
    }
    if config.control_plane.request_timeout_secs == 0 {
        errors.push(ValidationError::new("control_plane.request_timeout_secs", "must be greater than 0"));
    }

    if config.discovery.enabled {
        if config.discovery.domain.is_empty() {
            errors.push(ValidationError::new("discovery.domain", "required when discovery is enabled"));
        }
        if config.discovery.label_prefix.is_empty() {
            errors.push(ValidationError::new("discovery.label_prefix", "must not be empty"));
        }
    }

    if config.reconcile.interval_secs == 0 {
        errors.push(ValidationError::new("reconcile.interval_secs", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
