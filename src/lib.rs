//! Content negotiation and serialized responses for axum actions.

pub mod config;
pub mod demo;
pub mod http;
pub mod lifecycle;
pub mod negotiation;
pub mod net;
pub mod observability;
pub mod serialization;
pub mod service;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use negotiation::{Format, Negotiator, RepresentationKind};
pub use service::{ActionResult, ResultFilter, ServiceRouter};
