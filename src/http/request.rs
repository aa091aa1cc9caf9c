//! Request-side helpers.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for tracing
//! - Decide whether the connection is transport-secure
//! - Carry the per-request values the response writer needs
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - `X-Forwarded-Proto` is only believed when configured

use axum::http::{request::Parts, uri::Scheme, HeaderName, HeaderValue, Request};
use chrono::{DateTime, Utc};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::config::ResponseConfig;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Generates `x-request-id` values for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Read the request ID set by the request-id layer.
pub fn request_id(parts: &Parts) -> &str {
    parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Whether the request arrived over a transport-secure connection.
pub fn is_secure(parts: &Parts, tls_enabled: bool, trust_forwarded_proto: bool) -> bool {
    if tls_enabled || parts.uri.scheme() == Some(&Scheme::HTTPS) {
        return true;
    }

    trust_forwarded_proto
        && parts
            .headers
            .get(X_FORWARDED_PROTO)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"))
}

/// Everything a serialized result needs from the request it answers.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Action name, used as the download filename stem.
    pub action: String,
    pub secure: bool,
    /// JavaScript function for callback responses.
    pub callback: String,
    pub charset: String,
    pub robots_tag: String,
    pub now: DateTime<Utc>,
}

impl RenderContext {
    pub fn new(action: impl Into<String>, secure: bool, response: &ResponseConfig) -> Self {
        Self {
            action: action.into(),
            secure,
            callback: "callback".to_string(),
            charset: response.charset.clone(),
            robots_tag: response.robots_tag.clone(),
            now: Utc::now(),
        }
    }

    pub fn with_callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = callback.into();
        self
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}
