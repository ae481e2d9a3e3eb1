use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// The type of change observed on the record store. Anything other than
/// `INSERT` or `MODIFY` is ignored by the propagator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeEventType {
    Insert,
    Modify,
    Remove,
}

impl ChangeEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeEventType::Insert => "INSERT",
            ChangeEventType::Modify => "MODIFY",
            ChangeEventType::Remove => "REMOVE",
        }
    }
}

#[derive(Error, Debug)]
pub enum AttributeError {
    #[error("{0} is not a valid number attribute")]
    InvalidNumber(String),
}

/// A type-tagged single-value wrapper, as delivered in record store change
/// images. Decoding is explicit per tag; an unrecognized tag fails loudly
/// at deserialization instead of silently taking the first value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    #[serde(rename = "S")]
    String(String),
    #[serde(rename = "N")]
    Number(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    #[serde(rename = "L")]
    List(Vec<AttributeValue>),
    #[serde(rename = "M")]
    Map(HashMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Unwrap the tagged value into a plain JSON value. Number attributes
    /// arrive as strings on the wire and must parse as JSON numbers.
    pub fn into_plain(self) -> Result<Value, AttributeError> {
        match self {
            AttributeValue::String(value) => Ok(Value::String(value)),
            AttributeValue::Number(value) => value
                .parse::<serde_json::Number>()
                .map(Value::Number)
                .map_err(|_| AttributeError::InvalidNumber(value)),
            AttributeValue::Bool(value) => Ok(Value::Bool(value)),
            AttributeValue::Null(_) => Ok(Value::Null),
            AttributeValue::List(items) => items
                .into_iter()
                .map(AttributeValue::into_plain)
                .collect::<Result<Vec<Value>, AttributeError>>()
                .map(Value::Array),
            AttributeValue::Map(entries) => {
                let mut plain = Map::new();
                for (name, value) in entries {
                    plain.insert(name, value.into_plain()?);
                }
                Ok(Value::Object(plain))
            }
        }
    }
}

/// One insert/modify/remove observed on the record store, with the latest
/// field values as a tagged image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub event_type: ChangeEventType,
    pub new_image: HashMap<String, AttributeValue>,
}

impl ChangeEvent {
    /// Unwrap every field of the new image into a plain JSON object.
    pub fn plain_image(&self) -> Result<Map<String, Value>, AttributeError> {
        let mut plain = Map::new();
        for (name, value) in &self.new_image {
            plain.insert(name.clone(), value.clone().into_plain()?);
        }
        Ok(plain)
    }
}

/// An object-created notification from a blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectCreatedEvent {
    pub bucket: String,
    pub key: String,
}

/// One message received from the dead-letter queue. The receipt is the
/// acknowledgment handle for `Queue::delete_message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    pub body: String,
    pub receipt: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwraps_tagged_values_to_plain_json() {
        let image: HashMap<String, AttributeValue> = serde_json::from_value(json!({
            "id": {"S": "abc"},
            "count": {"N": "42"},
            "active": {"BOOL": true},
            "note": {"NULL": true},
            "tags": {"L": [{"S": "a"}, {"N": "1.5"}]},
            "nested": {"M": {"inner": {"S": "x"}}},
        }))
        .unwrap();

        let event = ChangeEvent {
            event_type: ChangeEventType::Insert,
            new_image: image,
        };
        let plain = event.plain_image().unwrap();

        assert_eq!(plain["id"], json!("abc"));
        assert_eq!(plain["count"], json!(42));
        assert_eq!(plain["active"], json!(true));
        assert_eq!(plain["note"], json!(null));
        assert_eq!(plain["tags"], json!(["a", 1.5]));
        assert_eq!(plain["nested"], json!({"inner": "x"}));
    }

    #[test]
    fn unrecognized_tag_fails_at_decode() {
        let result: Result<AttributeValue, _> = serde_json::from_value(json!({"B": "binary"}));
        assert!(result.is_err());
    }

    #[test]
    fn non_numeric_number_attribute_fails_loudly() {
        let attribute = AttributeValue::Number("not-a-number".to_string());
        assert!(attribute.into_plain().is_err());
    }

    #[test]
    fn event_types_deserialize_from_upper_case() {
        let event_type: ChangeEventType = serde_json::from_value(json!("MODIFY")).unwrap();
        assert_eq!(event_type, ChangeEventType::Modify);
        assert_eq!(event_type.as_str(), "MODIFY");
    }
}
