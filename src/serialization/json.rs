//! JSON output.

use crate::serialization::{ResponseEnvelope, SerializeError};

pub fn to_string(envelope: &ResponseEnvelope) -> Result<String, SerializeError> {
    Ok(serde_json::to_string(envelope)?)
}
