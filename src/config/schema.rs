//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the negotiation service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// How the representation is picked from a request.
    pub negotiation: NegotiationConfig,

    /// Headers and limits applied to serialized responses.
    pub response: ResponseConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Representation negotiation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NegotiationConfig {
    /// Query parameter carrying an explicit override (e.g. `?format=json`).
    pub query_parameter: String,

    /// Honor a format extension on the last path segment (`/items.csv`).
    pub path_extension: bool,

    /// Fall back to the `Accept` header when no explicit override is present.
    pub accept_header: bool,

    /// Query parameter naming the JavaScript callback function.
    pub callback_parameter: String,

    /// Callback used when the request names none, or an invalid one.
    pub default_callback: String,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            query_parameter: "format".to_string(),
            path_extension: true,
            accept_header: true,
            callback_parameter: "callback".to_string(),
            default_callback: "callback".to_string(),
        }
    }
}

/// Serialized response settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Character set appended to every serialized content type.
    pub charset: String,

    /// Value of the `X-Robots-Tag` header.
    pub robots_tag: String,

    /// Treat `X-Forwarded-Proto: https` as a secure connection.
    /// Only enable behind a proxy that overwrites the header.
    pub trust_forwarded_proto: bool,

    /// Maximum request body size handed to actions, in bytes.
    pub max_body_size: usize,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            charset: "utf-8".to_string(),
            robots_tag: "noindex, follow, noarchive, nosnippet".to_string(),
            trust_forwarded_proto: false,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Grace period for in-flight requests on shutdown, in seconds.
    pub shutdown_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            shutdown_secs: 10,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Pretty output for development, JSON for log aggregation.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
