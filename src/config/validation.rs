//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ApiConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use crate::config::schema::ApiConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_config(config: &ApiConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address",
            message: format!("`{}` is not a socket address", config.listener.bind_address),
        });
    }

    if config.storage.data_file.as_os_str().is_empty() {
        errors.push(ValidationError {
            field: "storage.data_file",
            message: "must not be empty".to_string(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError {
            field: "timeouts.request_secs",
            message: "must be greater than 0".to_string(),
        });
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError {
            field: "limits.max_body_bytes",
            message: "must be greater than 0".to_string(),
        });
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError {
            field: "observability.metrics_address",
            message: format!(
                "`{}` is not a socket address",
                config.observability.metrics_address
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
