//! Actions, their results and their faults.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::future::Future;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use futures_util::future::BoxFuture;

use crate::http::request::RenderContext;
use crate::http::response::SerializedResult;
use crate::negotiation::{Format, RepresentationKind};
use crate::observability::metrics;
use crate::serialization::{Model, SerializationConfig, SerializeError};

/// What an action sees of the request.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    /// Representation negotiated before the action ran.
    pub kind: RepresentationKind,
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    /// Path parameters captured by the route.
    pub params: HashMap<String, String>,
    pub body: Bytes,
}

impl ActionRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

pub type ActionFuture = BoxFuture<'static, Result<ActionResult, ActionFault>>;

/// A named unit of work mounted by the service router.
pub trait Action: Send + Sync + 'static {
    fn call(&self, request: ActionRequest) -> ActionFuture;
}

impl<F, Fut> Action for F
where
    F: Fn(ActionRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ActionResult, ActionFault>> + Send + 'static,
{
    fn call(&self, request: ActionRequest) -> ActionFuture {
        Box::pin(self(request))
    }
}

/// The outcome of an action.
#[derive(Debug)]
pub enum ActionResult {
    /// A model rendered through a view.
    View(ViewResult),
    /// A model that may be re-serialized in the negotiated format.
    Serializable(SerializableResult),
    /// Already bound to a format; never substituted.
    Serialized(SerializedResult),
    /// Any other response, passed through as-is.
    Response(Response),
}

impl ActionResult {
    pub fn view(model: impl Into<Option<Model>>, view: View) -> Self {
        ActionResult::View(ViewResult::new(model, view))
    }

    pub fn serializable(model: impl Into<Option<Model>>) -> Self {
        ActionResult::Serializable(SerializableResult::new(model))
    }

    /// Turn the (filtered) result into an HTTP response.
    pub fn render(self, ctx: &RenderContext) -> Response {
        let serialized = match self {
            ActionResult::View(ViewResult { model, view: View::Serialized(view), status }) => {
                SerializedResult::new(view.format)
                    .with_model(model)
                    .with_config(view.config)
                    .with_status(status, None)
            }
            ActionResult::View(ViewResult { view: View::Page(html), status, .. }) => {
                return (status, Html(html)).into_response();
            }
            ActionResult::Serializable(result) => {
                let format = result.default_format;
                result.into_serialized(format)
            }
            ActionResult::Serialized(result) => result,
            ActionResult::Response(response) => return response,
        };

        let format = serialized.format();
        match serialized.render(ctx) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(action = %ctx.action, format = format.as_str(), error = %e, "Failed to render serialized result");
                metrics::record_render_failure(format);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render response").into_response()
            }
        }
    }
}

impl From<Response> for ActionResult {
    fn from(response: Response) -> Self {
        ActionResult::Response(response)
    }
}

impl From<SerializedResult> for ActionResult {
    fn from(result: SerializedResult) -> Self {
        ActionResult::Serialized(result)
    }
}

/// A model plus the view that presents it.
#[derive(Debug)]
pub struct ViewResult {
    pub model: Option<Model>,
    pub view: View,
    pub status: StatusCode,
}

impl ViewResult {
    pub fn new(model: impl Into<Option<Model>>, view: View) -> Self {
        Self {
            model: model.into(),
            view,
            status: StatusCode::OK,
        }
    }
}

#[derive(Debug)]
pub enum View {
    /// Pre-rendered HTML.
    Page(String),
    /// A serialized writer with its settings.
    Serialized(SerializedView),
}

impl View {
    pub fn page(html: impl Into<String>) -> Self {
        View::Page(html.into())
    }

    pub fn serialized(format: Format, config: SerializationConfig) -> Self {
        View::Serialized(SerializedView { format, config })
    }
}

#[derive(Debug, Clone)]
pub struct SerializedView {
    pub format: Format,
    pub config: SerializationConfig,
}

/// A result exposing its model, status code and status description.
#[derive(Debug, Clone)]
pub struct SerializableResult {
    pub model: Option<Model>,
    pub status: StatusCode,
    pub status_description: Option<String>,
    pub config: SerializationConfig,
    /// Format used when the result is passed through for Html.
    pub default_format: Format,
}

impl SerializableResult {
    pub fn new(model: impl Into<Option<Model>>) -> Self {
        Self {
            model: model.into(),
            status: StatusCode::OK,
            status_description: None,
            config: SerializationConfig::default(),
            default_format: Format::Xml,
        }
    }

    pub fn with_status(mut self, status: StatusCode, description: impl Into<Option<String>>) -> Self {
        self.status = status;
        self.status_description = description.into();
        self
    }

    pub fn with_config(mut self, config: SerializationConfig) -> Self {
        self.config = config;
        self
    }

    /// Bind the model to a concrete format, keeping status and description.
    pub fn into_serialized(self, format: Format) -> SerializedResult {
        SerializedResult::new(format)
            .with_model(self.model)
            .with_config(self.config)
            .with_status(self.status, self.status_description)
    }
}

type BoxError = Box<dyn StdError + Send + Sync>;

/// A fault raised by an action.
#[derive(Debug, thiserror::Error)]
pub enum ActionFault {
    /// Carries an HTTP status code.
    #[error("{message}")]
    Http { status: StatusCode, message: String },

    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl ActionFault {
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        ActionFault::Http {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::http(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ActionFault::Internal {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        ActionFault::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ActionFault::Http { status, .. } => Some(*status),
            ActionFault::Internal { .. } => None,
        }
    }

    /// Message, kind and the whole source chain.
    pub fn description(&self) -> String {
        let mut text = match self {
            ActionFault::Http { status, message } => format!("HttpFault ({status}): {message}"),
            ActionFault::Internal { message, .. } => format!("InternalFault: {message}"),
        };
        let mut source = self.source();
        while let Some(cause) = source {
            text.push_str("\n  caused by: ");
            text.push_str(&cause.to_string());
            source = cause.source();
        }
        text
    }
}

impl From<SerializeError> for ActionFault {
    fn from(e: SerializeError) -> Self {
        ActionFault::with_source("Model could not be serialized", e)
    }
}

/// A fault nobody translated: plain text with the fault's status, or 500.
impl IntoResponse for ActionFault {
    fn into_response(self) -> Response {
        let status = self.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(fault = %self.description(), "Unhandled action fault");
        } else {
            tracing::debug!(fault = %self, status = %status, "Action fault");
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResponseConfig;
    use axum::http::header;
    use serde_json::json;

    fn ctx() -> RenderContext {
        RenderContext::new("items", true, &ResponseConfig::default())
    }

    #[test]
    fn test_fault_description_includes_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk offline");
        let fault = ActionFault::with_source("Could not load catalog", io);

        let description = fault.description();
        assert!(description.starts_with("InternalFault: Could not load catalog"));
        assert!(description.contains("caused by: disk offline"));
        assert_eq!(fault.status(), None);
    }

    #[test]
    fn test_http_fault_status() {
        let fault = ActionFault::not_found("no such item");
        assert_eq!(fault.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(fault.to_string(), "no such item");
        assert!(fault.description().contains("404 Not Found"));
    }

    #[test]
    fn test_unhandled_fault_response() {
        let response = ActionFault::internal("boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = ActionFault::not_found("gone").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_page_view_renders_html() {
        let result = ActionResult::view(None, View::page("<p>hi</p>"));
        let response = result.render(&ctx());
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
    }

    #[test]
    fn test_serializable_passthrough_uses_default_format() {
        let result = ActionResult::serializable(Model::from_value(json!({"id": 1})));
        let response = result.render(&ctx());
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/xml; charset=utf-8"
        );
    }
}
