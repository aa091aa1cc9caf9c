//! Action models and member filtering.
//!
//! A model is captured as a `serde_json::Value` when the action returns it.
//! Two member rules are applied at every nesting level when it is serialized:
//! - members named `_something` are non-public
//! - members registered with [`Model::ignoring`] carry an ignore marker

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::serialization::config::SerializationConfig;
use crate::serialization::SerializeError;

/// The value an action hands to the response layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    value: Value,
    ignored: BTreeSet<String>,
}

impl Model {
    /// Capture any serializable value.
    pub fn new<T: Serialize + ?Sized>(value: &T) -> Result<Self, SerializeError> {
        Ok(Self::from_value(serde_json::to_value(value)?))
    }

    pub fn from_value(value: Value) -> Self {
        Self {
            value,
            ignored: BTreeSet::new(),
        }
    }

    /// Mark members that are skipped while ignore markers are honored.
    pub fn ignoring<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored.extend(members.into_iter().map(Into::into));
        self
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    pub fn is_collection(&self) -> bool {
        self.value.is_array()
    }

    /// Number of items when the model is a collection.
    pub fn count(&self) -> Option<usize> {
        self.value.as_array().map(Vec::len)
    }

    /// Reduce the model to the entries the envelope is built from.
    pub fn content(&self, config: &SerializationConfig) -> SerializedContent {
        match self.filter(&self.value, config) {
            Value::Array(items) => SerializedContent::Items(items),
            Value::Object(members) => SerializedContent::Members(members.into_iter().collect()),
            Value::Null => SerializedContent::Members(IndexMap::new()),
            scalar => SerializedContent::Members(IndexMap::from([("value".to_string(), scalar)])),
        }
    }

    fn filter(&self, value: &Value, config: &SerializationConfig) -> Value {
        match value {
            Value::Object(members) => Value::Object(
                members
                    .iter()
                    .filter(|(name, _)| self.keeps(name, config))
                    .map(|(name, v)| (name.clone(), self.filter(v, config)))
                    .collect::<Map<String, Value>>(),
            ),
            Value::Array(items) => {
                Value::Array(items.iter().map(|v| self.filter(v, config)).collect())
            }
            other => other.clone(),
        }
    }

    fn keeps(&self, name: &str, config: &SerializationConfig) -> bool {
        if !config.include_non_public_members && name.starts_with('_') {
            return false;
        }
        !(config.honor_ignore_markers && self.ignored.contains(name))
    }
}

impl From<Value> for Model {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

/// Filtered model content, before it is placed in an envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum SerializedContent {
    /// A single entity (or a scalar under `value`).
    Members(IndexMap<String, Value>),
    /// The items of a collection.
    Items(Vec<Value>),
}

impl SerializedContent {
    pub fn len(&self) -> usize {
        match self {
            SerializedContent::Members(m) => m.len(),
            SerializedContent::Items(i) => i.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
