//! JSON wrapped in a JavaScript function call.

use crate::serialization::{json, ResponseEnvelope, SerializeError};

/// `callback({...});`
///
/// The callback name is validated by the negotiator before it gets here.
pub fn to_string(envelope: &ResponseEnvelope, callback: &str) -> Result<String, SerializeError> {
    let payload = json::to_string(envelope)?;
    Ok(format!("{callback}({payload});"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::{Model, SerializationConfig};
    use serde_json::json;

    #[test]
    fn test_wraps_json_payload() {
        let model = Model::from_value(json!({"ok": true}));
        let envelope = ResponseEnvelope::build(&model, &SerializationConfig::default());

        let text = to_string(&envelope, "app.onData").unwrap();
        assert!(text.starts_with("app.onData({\"timestamp\":"));
        assert!(text.ends_with(",\"ok\":true});"));
    }
}
