//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;

use crate::config::schema::ServiceConfig;
use crate::negotiation::negotiator::is_valid_callback;

/// A single semantic problem in a loaded config.
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

pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.is_empty() {
            errors.push(ValidationError::new("listener.tls.cert_path", "must not be empty"));
        }
        if tls.key_path.is_empty() {
            errors.push(ValidationError::new("listener.tls.key_path", "must not be empty"));
        }
    }

    let negotiation = &config.negotiation;
    if negotiation.query_parameter.is_empty() {
        errors.push(ValidationError::new("negotiation.query_parameter", "must not be empty"));
    }
    if negotiation.callback_parameter.is_empty() {
        errors.push(ValidationError::new("negotiation.callback_parameter", "must not be empty"));
    }
    if !is_valid_callback(&negotiation.default_callback) {
        errors.push(ValidationError::new(
            "negotiation.default_callback",
            format!("'{}' is not a JavaScript identifier", negotiation.default_callback),
        ));
    }

    let response = &config.response;
    if response.charset.is_empty() || HeaderValue::from_str(&response.charset).is_err() {
        errors.push(ValidationError::new("response.charset", "must be a non-empty header value"));
    }
    if HeaderValue::from_str(&response.robots_tag).is_err() {
        errors.push(ValidationError::new("response.robots_tag", "must be a valid header value"));
    }
    if response.max_body_size == 0 {
        errors.push(ValidationError::new("response.max_body_size", "must be greater than 0"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
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
