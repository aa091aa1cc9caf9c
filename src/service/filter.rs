//! The result filter wrapped around every action.
//!
//! ```text
//! on_action_executing:  request parts → RepresentationKind
//! on_action_executed:   (kind, Ok(result) | Err(fault))
//!     fault + factory   → error payload, then treated as a Serializable result
//!     fault, no factory → fault propagates
//!     View              → view swapped for the negotiated writer (Html keeps it)
//!     Serializable      → bound to the negotiated format (Html passes through)
//!     anything else     → unchanged
//! ```

use axum::http::request::Parts;

use crate::negotiation::{Negotiator, RepresentationKind};
use crate::observability::metrics;
use crate::serialization::SerializationConfig;
use crate::service::action::{ActionFault, ActionResult, SerializedView, View, ViewResult};
use crate::service::error_result::{describe_status, ErrorResultFactory};

#[derive(Clone)]
pub struct ResultFilter {
    negotiator: Negotiator,
    error_result: Option<ErrorResultFactory>,
}

impl ResultFilter {
    pub fn new(negotiator: Negotiator) -> Self {
        Self {
            negotiator,
            error_result: None,
        }
    }

    /// Translate faults into this payload instead of letting them propagate.
    pub fn with_error_result(mut self, factory: ErrorResultFactory) -> Self {
        self.error_result = Some(factory);
        self
    }

    pub fn negotiator(&self) -> &Negotiator {
        &self.negotiator
    }

    pub fn translates_faults(&self) -> bool {
        self.error_result.is_some()
    }

    /// Runs before the action body.
    pub fn on_action_executing(&self, parts: &Parts) -> RepresentationKind {
        self.negotiator.negotiate(parts)
    }

    /// Runs after the action body, once per request.
    pub fn on_action_executed(
        &self,
        kind: RepresentationKind,
        outcome: Result<ActionResult, ActionFault>,
    ) -> Result<ActionResult, ActionFault> {
        let result = match (outcome, &self.error_result) {
            (Ok(result), _) => result,
            (Err(fault), Some(factory)) => {
                tracing::warn!(fault = %fault.description(), kind = %kind, "Action fault translated to error result");
                metrics::record_fault(true);
                let mut payload = factory();
                payload.set_error(fault.description());
                if let Some(status) = fault.status() {
                    payload.set_status(status, describe_status(status));
                }
                ActionResult::Serializable(payload.into_result())
            }
            (Err(fault), None) => {
                metrics::record_fault(false);
                return Err(fault);
            }
        };

        Ok(match result {
            ActionResult::View(view) => ActionResult::View(substitute_view(view, kind)),
            ActionResult::Serializable(result) => match kind.format() {
                Some(format) => ActionResult::Serialized(result.into_serialized(format)),
                None => ActionResult::Serializable(result),
            },
            other => other,
        })
    }
}

/// Swap the view for the negotiated writer, carrying serialized settings over.
fn substitute_view(mut result: ViewResult, kind: RepresentationKind) -> ViewResult {
    let Some(format) = kind.format() else {
        return result;
    };

    let mut config = SerializationConfig::default();
    if let View::Serialized(previous) = &result.view {
        config.inherit(&previous.config);
    }
    result.view = View::Serialized(SerializedView { format, config });
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NegotiationConfig;
    use crate::negotiation::Format;
    use crate::serialization::Model;
    use crate::service::action::SerializableResult;
    use crate::service::error_result::ErrorResult;
    use axum::http::StatusCode;
    use serde_json::json;

    fn filter() -> ResultFilter {
        ResultFilter::new(Negotiator::new(NegotiationConfig::default()))
    }

    fn page() -> ActionResult {
        ActionResult::view(Model::from_value(json!({"id": 1})), View::page("<p>1</p>"))
    }

    #[test]
    fn test_view_swapped_per_kind() {
        let cases = [
            (RepresentationKind::Json, Format::Json),
            (RepresentationKind::Xml, Format::Xml),
            (RepresentationKind::Csv, Format::Csv),
            (RepresentationKind::JavaScriptCallback, Format::JavaScript),
        ];
        for (kind, expected) in cases {
            match filter().on_action_executed(kind, Ok(page())).unwrap() {
                ActionResult::View(ViewResult { view: View::Serialized(view), .. }) => {
                    assert_eq!(view.format, expected)
                }
                other => panic!("unexpected result {other:?}"),
            }
        }
    }

    #[test]
    fn test_html_keeps_original_view() {
        let result = filter().on_action_executed(RepresentationKind::Html, Ok(page())).unwrap();
        assert!(matches!(result, ActionResult::View(ViewResult { view: View::Page(_), .. })));
    }

    #[test]
    fn test_substitution_inherits_serialized_config() {
        let config = SerializationConfig::new()
            .include_non_public_members(true)
            .honor_ignore_markers(false)
            .header("service", "catalog");
        let original = ActionResult::view(None, View::serialized(Format::Xml, config.clone()));

        match filter().on_action_executed(RepresentationKind::Csv, Ok(original)).unwrap() {
            ActionResult::View(ViewResult { view: View::Serialized(view), .. }) => {
                assert_eq!(view.format, Format::Csv);
                assert_eq!(view.config, config);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_serializable_bound_to_format() {
        let original = SerializableResult::new(Model::from_value(json!([1, 2])))
            .with_status(StatusCode::ACCEPTED, Some("Queued".to_string()));

        match filter()
            .on_action_executed(RepresentationKind::Json, Ok(ActionResult::Serializable(original)))
            .unwrap()
        {
            ActionResult::Serialized(result) => {
                assert_eq!(result.format(), Format::Json);
                assert_eq!(result.status(), StatusCode::ACCEPTED);
                assert_eq!(result.status_description(), Some("Queued"));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_serializable_passes_through_for_html() {
        let original = ActionResult::serializable(Model::from_value(json!({"a": 1})));
        let result = filter().on_action_executed(RepresentationKind::Html, Ok(original)).unwrap();
        assert!(matches!(result, ActionResult::Serializable(_)));
    }

    #[test]
    fn test_fault_propagates_without_factory() {
        let outcome = Err(ActionFault::not_found("missing"));
        let fault = filter().on_action_executed(RepresentationKind::Json, outcome).unwrap_err();
        assert_eq!(fault.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_fault_translated_with_factory() {
        let filter = filter().with_error_result(ErrorResult::factory());
        assert!(filter.translates_faults());

        let outcome = Err(ActionFault::not_found("missing"));
        match filter.on_action_executed(RepresentationKind::Json, outcome).unwrap() {
            ActionResult::Serialized(result) => {
                assert_eq!(result.status(), StatusCode::NOT_FOUND);
                let value = result.model().unwrap().value();
                assert_eq!(value["statusCode"], 404);
                assert_eq!(value["statusDescription"], "Not Found");
                assert!(value["error"].as_str().unwrap().contains("missing"));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_uncoded_fault_keeps_default_status() {
        let filter = filter().with_error_result(ErrorResult::factory());
        let outcome = Err(ActionFault::internal("boom"));
        match filter.on_action_executed(RepresentationKind::Html, outcome).unwrap() {
            ActionResult::Serializable(result) => {
                assert_eq!(result.status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(result.model.unwrap().value()["statusCode"], 500);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_concrete_results_untouched() {
        let original = ActionResult::Serialized(crate::http::response::SerializedResult::new(Format::Csv));
        match filter().on_action_executed(RepresentationKind::Json, Ok(original)).unwrap() {
            ActionResult::Serialized(result) => assert_eq!(result.format(), Format::Csv),
            other => panic!("unexpected result {other:?}"),
        }
    }
}
