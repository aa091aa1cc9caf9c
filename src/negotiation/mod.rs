//! Representation negotiation subsystem.
//!
//! # Data Flow
//! ```text
//! Request parts (URI, headers)
//!     → negotiator.rs (query override → path extension → Accept → Html)
//!     → RepresentationKind, passed explicitly to the result filter
//! ```
//!
//! # Design Decisions
//! - Negotiation is a pure function of the request; nothing is stored on it
//! - Unknown overrides are not errors, they resolve to Html

pub mod kind;
pub mod negotiator;

pub use kind::{Format, RepresentationKind};
pub use negotiator::Negotiator;
