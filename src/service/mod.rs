//! Action hosting: the result filter and the router that applies it.
//!
//! # Data Flow
//! ```text
//! request
//!     → router.rs (mounted route, body read, dispatch)
//!     → filter.rs  on_action_executing → RepresentationKind
//!     → action.rs  user action → Result<ActionResult, ActionFault>
//!     → filter.rs  on_action_executed → fault translation, view / format substitution
//!     → ActionResult::render → response
//! ```
//!
//! # Design Decisions
//! - The negotiated kind is passed along explicitly, never stashed in request state
//! - Fault translation is opt-in: without an error-result factory faults propagate

pub mod action;
pub mod error_result;
pub mod filter;
pub mod router;

pub use action::{
    Action, ActionFault, ActionRequest, ActionResult, SerializableResult, SerializedView, View,
    ViewResult,
};
pub use error_result::{error_result_factory, ErrorResult, ErrorResultFactory, SerializableErrorResult};
pub use filter::ResultFilter;
pub use router::{ServiceRouter, ServiceState};
