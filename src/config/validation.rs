//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate header names, log levels and addresses
//! - Reject routes that cannot possibly be registered
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Pattern and method syntax is left to the router, which logs rather
//!   than rejects, so one bad route never blocks the whole table

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::schema::RouterConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A semantic problem in a configuration file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("route #{route}: method list is empty")]
    EmptyMethod { route: usize },

    #[error("route #{route}: no pattern given")]
    EmptyPatternList { route: usize },

    #[error("route #{route}: handler name is empty")]
    EmptyHandler { route: usize },

    #[error("invalid async header name `{name}`")]
    InvalidAsyncHeader { name: String },

    #[error("script name `{name}` must not contain `/`")]
    InvalidScriptName { name: String },

    #[error("unknown log level `{level}`")]
    InvalidLogLevel { level: String },

    #[error("invalid metrics address `{address}`")]
    InvalidMetricsAddress { address: String },
}

/// Check a parsed configuration.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let request = &config.request;
    if HeaderName::from_bytes(request.async_header.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidAsyncHeader {
            name: request.async_header.clone(),
        });
    }
    if request.script_name.contains('/') {
        errors.push(ValidationError::InvalidScriptName {
            name: request.script_name.clone(),
        });
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::InvalidLogLevel {
            level: observability.log_level.clone(),
        });
    }
    if let Some(address) = &observability.metrics_address {
        if address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidMetricsAddress {
                address: address.clone(),
            });
        }
    }

    for (route, entry) in config.routes.iter().enumerate() {
        if entry.method.trim().is_empty() {
            errors.push(ValidationError::EmptyMethod { route });
        }
        if entry.pattern.patterns().is_empty() {
            errors.push(ValidationError::EmptyPatternList { route });
        }
        if entry.handler.trim().is_empty() {
            errors.push(ValidationError::EmptyHandler { route });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
