//! Per-result serialization settings.

use indexmap::IndexMap;
use serde_json::Value;

/// Flags and custom envelope headers attached to a serialized result.
#[derive(Debug, Clone, PartialEq)]
pub struct SerializationConfig {
    /// Serialize members whose name starts with `_`.
    pub include_non_public_members: bool,

    /// Skip members the model marked as ignored.
    pub honor_ignore_markers: bool,

    /// Extra envelope entries written right after `timestamp`, in order.
    pub headers: IndexMap<String, Value>,
}

impl Default for SerializationConfig {
    fn default() -> Self {
        Self {
            include_non_public_members: false,
            honor_ignore_markers: true,
            headers: IndexMap::new(),
        }
    }
}

impl SerializationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a custom envelope header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn include_non_public_members(mut self, include: bool) -> Self {
        self.include_non_public_members = include;
        self
    }

    pub fn honor_ignore_markers(mut self, honor: bool) -> Self {
        self.honor_ignore_markers = honor;
        self
    }

    /// Copy flags and headers from the config of a replaced view.
    ///
    /// Headers already present on `self` keep their values.
    pub fn inherit(&mut self, previous: &SerializationConfig) {
        self.include_non_public_members = previous.include_non_public_members;
        self.honor_ignore_markers = previous.honor_ignore_markers;
        for (key, value) in &previous.headers {
            self.headers
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }
}
