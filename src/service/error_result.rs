//! Error payloads substituted for unhandled action faults.

use std::sync::Arc;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::service::action::SerializableResult;
use crate::serialization::Model;

/// A payload shape that can report a fault.
pub trait SerializableErrorResult: Send {
    fn set_error(&mut self, error: String);

    fn set_status(&mut self, status: StatusCode, description: String);

    /// The result rendered in place of the fault.
    fn into_result(self: Box<Self>) -> SerializableResult;
}

/// Builds a fresh error payload per fault; registered once at startup.
pub type ErrorResultFactory = Arc<dyn Fn() -> Box<dyn SerializableErrorResult> + Send + Sync>;

/// Factory for any default-constructible error payload.
pub fn error_result_factory<T>() -> ErrorResultFactory
where
    T: SerializableErrorResult + Default + 'static,
{
    Arc::new(|| Box::new(T::default()) as Box<dyn SerializableErrorResult>)
}

/// The stock error payload: `{"error", "statusCode", "statusDescription"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResult {
    pub error: String,
    pub status_code: u16,
    pub status_description: String,
}

impl Default for ErrorResult {
    fn default() -> Self {
        Self {
            error: String::new(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            status_description: describe_status(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

impl ErrorResult {
    pub fn factory() -> ErrorResultFactory {
        error_result_factory::<ErrorResult>()
    }
}

impl SerializableErrorResult for ErrorResult {
    fn set_error(&mut self, error: String) {
        self.error = error;
    }

    fn set_status(&mut self, status: StatusCode, description: String) {
        self.status_code = status.as_u16();
        self.status_description = description;
    }

    fn into_result(self: Box<Self>) -> SerializableResult {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let model = match Model::new(&*self) {
            Ok(model) => Some(model),
            Err(e) => {
                tracing::error!(error = %e, "Error payload could not be serialized");
                None
            }
        };
        SerializableResult::new(model).with_status(status, Some(self.status_description.clone()))
    }
}

/// Human-readable form of a status, e.g. "Not Found" for 404.
pub fn describe_status(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_u16().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_describe_status() {
        assert_eq!(describe_status(StatusCode::NOT_FOUND), "Not Found");
        assert_eq!(describe_status(StatusCode::from_u16(599).unwrap()), "599");
    }

    #[test]
    fn test_factory_builds_fresh_payloads() {
        let factory = ErrorResult::factory();
        let mut first = factory();
        first.set_error("boom".into());
        first.set_status(StatusCode::NOT_FOUND, "Not Found".into());

        let result = first.into_result();
        assert_eq!(result.status, StatusCode::NOT_FOUND);
        assert_eq!(result.status_description.as_deref(), Some("Not Found"));
        assert_eq!(
            result.model.unwrap().value(),
            &json!({"error": "boom", "statusCode": 404, "statusDescription": "Not Found"})
        );

        let second = factory().into_result();
        assert_eq!(second.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
