//! Serialized response writer.
//!
//! # Responsibilities
//! - Build a fresh response for a serialized model
//! - Add content type, expiry, robots and content-disposition headers
//! - Force no-cache directives on plaintext connections
//! - Serialize the envelope and set the exact content length
//!
//! # Design Decisions
//! - `render` consumes the result: a second render of the same result,
//!   or a write after the body is finalized, cannot be expressed
//! - A missing (or null) model produces a headers-only response

use std::time::SystemTime;

use axum::body::Body;
use axum::http::header::{self, HeaderName, HeaderValue, InvalidHeaderValue};
use axum::http::StatusCode;
use axum::response::Response;
use chrono::{DateTime, Utc};
use hyper::ext::ReasonPhrase;

use crate::http::request::RenderContext;
use crate::negotiation::Format;
use crate::serialization::{self, Model, ResponseEnvelope, SerializationConfig, SerializeError};

pub const X_ROBOTS_TAG: HeaderName = HeaderName::from_static("x-robots-tag");

/// Cache directives forced on every response sent over plaintext.
pub const NO_CACHE_DIRECTIVES: &str =
    "private, no-cache, must-revalidate, no-store, pre-check=0, post-check=0, max-stale=0";

/// Error raised while rendering a serialized result.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error("invalid header value: {0}")]
    Header(#[from] InvalidHeaderValue),
}

/// A model bound to a concrete format, ready to be written.
#[derive(Debug, Clone)]
pub struct SerializedResult {
    format: Format,
    model: Option<Model>,
    config: SerializationConfig,
    content_type: Option<String>,
    status: StatusCode,
    status_description: Option<String>,
}

impl SerializedResult {
    pub fn new(format: Format) -> Self {
        Self {
            format,
            model: None,
            config: SerializationConfig::default(),
            content_type: None,
            status: StatusCode::OK,
            status_description: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<Option<Model>>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_config(mut self, config: SerializationConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the format's default content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_status(mut self, status: StatusCode, description: Option<String>) -> Self {
        self.status = status;
        self.status_description = description;
        self
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn config(&self) -> &SerializationConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SerializationConfig {
        &mut self.config
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_description(&self) -> Option<&str> {
        self.status_description.as_deref()
    }

    pub fn content_type(&self) -> &str {
        self.content_type
            .as_deref()
            .unwrap_or_else(|| self.format.content_type())
    }

    /// Write headers and body into a new response.
    pub fn render(self, ctx: &RenderContext) -> Result<Response, RenderError> {
        let body = match self.model.as_ref().filter(|m| !m.is_null()) {
            Some(model) => {
                let envelope = ResponseEnvelope::build_at(ctx.now, model, &self.config);
                Some(serialization::serialize(self.format, &envelope, &ctx.callback)?)
            }
            None => None,
        };

        let mut response = Response::new(Body::empty());
        *response.status_mut() = self.status;
        if let Some(description) = self.status_description.as_deref() {
            match ReasonPhrase::try_from(description.as_bytes()) {
                Ok(reason) => {
                    response.extensions_mut().insert(reason);
                }
                Err(_) => {
                    tracing::debug!(description = %description, "Status description is not a valid reason phrase");
                }
            }
        }

        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_str(&format!("{}; charset={}", self.content_type(), ctx.charset))?,
        );
        headers.insert(header::EXPIRES, HeaderValue::from_str(&http_date(expired_at(ctx.now)))?);
        headers.insert(X_ROBOTS_TAG, HeaderValue::from_str(&ctx.robots_tag)?);
        headers.insert(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_str(&format!(
                "inline; filename={}.{}; creation-date={}",
                ctx.action,
                self.format.extension(),
                http_date(ctx.now)
            ))?,
        );

        if !ctx.secure {
            headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_CACHE_DIRECTIVES));
        }

        if let Some(body) = body {
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
            *response.body_mut() = Body::from(body);
        }

        Ok(response)
    }
}

/// Midnight UTC of the previous day.
fn expired_at(now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    today
        .pred_opt()
        .unwrap_or(today)
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now)
}

/// RFC 1123 date, e.g. `Fri, 01 Mar 2024 12:30:00 GMT`.
pub(crate) fn http_date(at: DateTime<Utc>) -> String {
    httpdate::fmt_http_date(SystemTime::from(at))
}
