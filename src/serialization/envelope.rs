//! The uniform wrapper placed around every serialized model.
//!
//! ```text
//! timestamp            always first
//! <custom headers>     from SerializationConfig, in insertion order
//! count                collections only
//! collection | object  when the content has more than one entry
//! <flattened entry>    otherwise
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::serialization::config::SerializationConfig;
use crate::serialization::model::{Model, SerializedContent};

pub const TIMESTAMP_KEY: &str = "timestamp";
pub const COUNT_KEY: &str = "count";
pub const COLLECTION_KEY: &str = "collection";
pub const OBJECT_KEY: &str = "object";

/// Ordered envelope entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResponseEnvelope {
    entries: IndexMap<String, Value>,
}

impl ResponseEnvelope {
    pub fn build(model: &Model, config: &SerializationConfig) -> Self {
        Self::build_at(Utc::now(), model, config)
    }

    /// Build with an explicit timestamp.
    pub fn build_at(timestamp: DateTime<Utc>, model: &Model, config: &SerializationConfig) -> Self {
        let mut entries = IndexMap::with_capacity(config.headers.len() + 3);
        entries.insert(
            TIMESTAMP_KEY.to_string(),
            Value::String(timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );

        for (key, value) in &config.headers {
            entries.entry(key.clone()).or_insert_with(|| value.clone());
        }

        let mut envelope = Self { entries };
        match model.content(config) {
            SerializedContent::Items(items) => {
                envelope.reserve_entry(COUNT_KEY, Value::from(items.len()));
                if items.len() > 1 {
                    envelope.reserve_entry(COLLECTION_KEY, Value::Array(items));
                } else if let Some(item) = items.into_iter().next() {
                    match item {
                        Value::Object(members) => envelope.flatten(members),
                        other => envelope.flatten([("item".to_string(), other)]),
                    }
                }
            }
            SerializedContent::Members(members) => {
                if members.len() > 1 {
                    let object = members.into_iter().collect::<serde_json::Map<_, _>>();
                    envelope.reserve_entry(OBJECT_KEY, Value::Object(object));
                } else {
                    envelope.flatten(members);
                }
            }
        }
        envelope
    }

    /// Envelope-owned keys replace anything a header put there.
    fn reserve_entry(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    /// Flattened members never displace envelope or header entries.
    fn flatten(&mut self, members: impl IntoIterator<Item = (String, Value)>) {
        for (key, value) in members {
            if self.entries.contains_key(&key) {
                tracing::debug!(member = %key, "Flattened member shadowed by envelope entry");
                continue;
            }
            self.entries.insert(key, value);
        }
    }

    pub fn entries(&self) -> &IndexMap<String, Value> {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
