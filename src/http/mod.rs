//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware, graceful shutdown)
//!     → request.rs (request ID, transport security, render context)
//!     → [service layer negotiates and runs the action]
//!     → response.rs (serialized body, cache and disposition headers)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RenderContext, UuidRequestId, X_REQUEST_ID};
pub use response::{RenderError, SerializedResult};
pub use server::{HttpServer, ServerError};
