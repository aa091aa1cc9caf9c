//! Representation kinds and the serialized formats behind them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The representation a caller asked for.
///
/// Negotiated once per request and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepresentationKind {
    /// Leave the action's own view in charge.
    #[default]
    Html,
    Json,
    Xml,
    Csv,
    /// JSON wrapped in a JavaScript function call.
    JavaScriptCallback,
}

impl RepresentationKind {
    /// Parse an explicit override value (query parameter).
    ///
    /// Returns `None` for values that name no known representation.
    pub fn from_override(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "html" | "htm" => Some(Self::Html),
            "json" => Some(Self::Json),
            "xml" => Some(Self::Xml),
            "csv" => Some(Self::Csv),
            "js" | "javascript" | "jsonp" | "callback" => Some(Self::JavaScriptCallback),
            _ => None,
        }
    }

    /// Map a file extension (without the dot) to a representation.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "html" | "htm" => Some(Self::Html),
            "json" => Some(Self::Json),
            "xml" => Some(Self::Xml),
            "csv" => Some(Self::Csv),
            "js" => Some(Self::JavaScriptCallback),
            _ => None,
        }
    }

    /// Map a media type from an `Accept` header to a representation.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type.to_ascii_lowercase().as_str() {
            "*/*" | "text/*" | "text/html" | "application/xhtml+xml" => Some(Self::Html),
            "application/json" | "text/json" => Some(Self::Json),
            "application/javascript" | "text/javascript" | "application/x-javascript" => {
                Some(Self::JavaScriptCallback)
            }
            "application/xml" | "text/xml" => Some(Self::Xml),
            "text/csv" | "application/csv" => Some(Self::Csv),
            _ => None,
        }
    }

    /// The serialized format for this kind; `None` for Html.
    pub fn format(self) -> Option<Format> {
        match self {
            Self::Html => None,
            Self::Json => Some(Format::Json),
            Self::Xml => Some(Format::Xml),
            Self::Csv => Some(Format::Csv),
            Self::JavaScriptCallback => Some(Format::JavaScript),
        }
    }

    /// Stable lowercase label, used for logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Csv => "csv",
            Self::JavaScriptCallback => "javascript",
        }
    }
}

impl fmt::Display for RepresentationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete serialized format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    JavaScript,
    Xml,
    Csv,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Json, Format::JavaScript, Format::Xml, Format::Csv];

    /// Content type written when the result does not override it.
    pub fn content_type(self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::JavaScript => "application/javascript",
            Format::Xml => "text/xml",
            Format::Csv => "text/csv",
        }
    }

    /// Extension used in the `Content-Disposition` filename.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::JavaScript => "js",
            Format::Xml => "xml",
            Format::Csv => "csv",
        }
    }

    pub fn as_str(self) -> &'static str {
        self.extension()
    }
}
