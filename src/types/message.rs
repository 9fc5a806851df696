use crate::types::constants::{PAYLOAD_FIELD, TYPE_FIELD};
use crate::types::error::{ChannelError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A decoded inbound frame.
///
/// The connector only checks that the frame is a JSON object carrying a string
/// `type` discriminant; everything else is left to the consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMessage {
    kind: String,
    value: Value,
}

impl ChannelMessage {
    /// Decode one text frame.
    pub fn decode(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| ChannelError::decode(format!("invalid JSON: {}", e), text))?;

        let kind = match &value {
            Value::Object(map) => match map.get(TYPE_FIELD) {
                Some(Value::String(kind)) => kind.clone(),
                Some(_) => {
                    return Err(ChannelError::decode(
                        format!("'{}' field is not a string", TYPE_FIELD),
                        text,
                    ));
                }
                None => {
                    return Err(ChannelError::decode(
                        format!("missing '{}' field", TYPE_FIELD),
                        text,
                    ));
                }
            },
            _ => return Err(ChannelError::decode("frame is not a JSON object", text)),
        };

        Ok(Self { kind, value })
    }

    /// The message discriminant (`type` field)
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Top-level field lookup
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.value.get(field)
    }

    /// The conventional `payload` field, if present and not null
    pub fn payload(&self) -> Option<&Value> {
        self.get(PAYLOAD_FIELD).filter(|payload| !payload.is_null())
    }

    /// Deserialize a top-level field into `T`. Absent or null fields yield `None`.
    pub fn field_as<T: DeserializeOwned>(&self, field: &str) -> Result<Option<T>> {
        match self.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| {
                    ChannelError::decode(
                        format!("invalid '{}' for '{}': {}", field, self.kind, e),
                        self.value.to_string(),
                    )
                }),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Encode an outbound message to its wire text.
pub fn encode(message: &Value) -> Result<String> {
    Ok(serde_json::to_string(message)?)
}
