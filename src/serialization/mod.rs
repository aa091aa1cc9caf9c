//! Envelope construction and per-format serializers.
//!
//! # Data Flow
//! ```text
//! Model + SerializationConfig
//!     → model.rs (drop non-public / ignored members)
//!     → envelope.rs (timestamp, headers, count, flatten or nest)
//!     → json.rs | javascript.rs | xml.rs | tabular.rs
//!     → body text
//! ```
//!
//! # Design Decisions
//! - Member flags are applied once, before any format sees the data, so every
//!   format produces the same set of members
//! - Envelope key order is preserved in every format

pub mod config;
pub mod envelope;
pub mod javascript;
pub mod json;
pub mod model;
pub mod tabular;
pub mod xml;

pub use config::SerializationConfig;
pub use envelope::ResponseEnvelope;
pub use model::{Model, SerializedContent};

use crate::negotiation::Format;

/// Error raised while turning an envelope into text.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML serialization failed: {0}")]
    Xml(String),

    #[error("CSV serialization failed: {0}")]
    Csv(String),

    #[error("serialized output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Serialize an envelope in the given format.
///
/// `callback` is only used by [`Format::JavaScript`].
pub fn serialize(
    format: Format,
    envelope: &ResponseEnvelope,
    callback: &str,
) -> Result<String, SerializeError> {
    match format {
        Format::Json => json::to_string(envelope),
        Format::JavaScript => javascript::to_string(envelope, callback),
        Format::Xml => xml::to_string(envelope),
        Format::Csv => tabular::to_string(envelope),
    }
}
