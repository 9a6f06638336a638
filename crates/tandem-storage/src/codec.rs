//! Value codec: normalizes values into a JSON envelope and back.
//!
//! Storage areas only hold text, so every value goes through [`encode`] on
//! the way in and [`decode`] on the way out. Records are stored as-is;
//! everything else is wrapped as `{"data": value}` so that primitives such
//! as `0`, `""` and `false` remain distinguishable from an absent key.
//!
//! | Input | Stored text |
//! |-------|-------------|
//! | `null` | `{"data":[]}` |
//! | `0` | `{"data":0}` |
//! | `[1,2]` | `{"data":[1,2]}` |
//! | `{"name":"a"}` | `{"name":"a"}` |
//! | `{"length":3}` | `{"data":{"length":3}}` |
//! | `{"data":5}` | `{"data":{"data":5}}` |

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{StorageError, StorageResult};

/// Field name of the envelope wrapper.
pub const ENVELOPE_FIELD: &str = "data";

/// Records carrying this key are treated like sequences and get wrapped.
const LENGTH_FIELD: &str = "length";

/// A value classified for storage.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    /// No value. Normalized to an empty enveloped array.
    Absent,
    /// A string, number or boolean.
    Primitive(Value),
    /// A JSON array.
    Array(Vec<Value>),
    /// A JSON object.
    Record(Map<String, Value>),
}

impl StoredValue {
    /// Classify a JSON value by its discriminant.
    #[must_use]
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Null => Self::Absent,
            Value::Array(items) => Self::Array(items),
            Value::Object(fields) => Self::Record(fields),
            primitive => Self::Primitive(primitive),
        }
    }

    /// Whether this value is stored without an envelope.
    ///
    /// Records are, unless they carry a `length` key or would themselves
    /// read back as an envelope.
    #[must_use]
    pub fn is_bare(&self) -> bool {
        matches!(self, Self::Record(fields) if is_bare_record(fields))
    }

    /// Convert into the object that gets serialized.
    #[must_use]
    pub fn into_object(self) -> Value {
        match self {
            Self::Absent => envelope(Value::Array(Vec::new())),
            Self::Record(fields) if is_bare_record(&fields) => Value::Object(fields),
            Self::Record(fields) => envelope(Value::Object(fields)),
            Self::Array(items) => envelope(Value::Array(items)),
            Self::Primitive(value) => envelope(value),
        }
    }
}

fn is_bare_record(fields: &Map<String, Value>) -> bool {
    !fields.contains_key(LENGTH_FIELD) && !is_envelope_shaped(fields)
}

fn is_envelope_shaped(fields: &Map<String, Value>) -> bool {
    fields.len() == 1 && fields.contains_key(ENVELOPE_FIELD)
}

fn envelope(value: Value) -> Value {
    let mut fields = Map::with_capacity(1);
    fields.insert(ENVELOPE_FIELD.to_owned(), value);
    Value::Object(fields)
}

/// Normalize a value into its storable object form.
#[must_use]
pub fn to_object(value: Value) -> Value {
    StoredValue::classify(value).into_object()
}

/// Serialize a value into the text written to a storage area.
#[must_use]
pub fn encode(value: Value) -> String {
    to_object(value).to_string()
}

/// Serialize any `Serialize` value into storage text.
///
/// # Errors
///
/// Returns [`StorageError::Serialization`] if the value cannot be
/// represented as JSON (for example a map with non-string keys).
pub fn encode_serializable<T: Serialize + ?Sized>(value: &T) -> StorageResult<String> {
    let value =
        serde_json::to_value(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
    Ok(encode(value))
}

/// Parse storage text back into a value.
///
/// Text that is not valid JSON is returned unchanged as a string.
/// A parsed object whose only field is the envelope is unwrapped.
#[must_use]
pub fn decode(text: &str) -> Value {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => unwrap_envelope(value),
        Err(_) => Value::String(text.to_owned()),
    }
}

fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut fields) if is_envelope_shaped(&fields) => {
            fields.remove(ENVELOPE_FIELD).unwrap_or_default()
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_primitives_round_trip() {
        for value in [
            json!(0),
            json!(""),
            json!("0"),
            json!(false),
            json!(true),
            json!(42),
            json!(-1.5),
            json!("hello"),
        ] {
            assert_eq!(decode(&encode(value.clone())), value, "value {value}");
        }
    }

    #[test]
    fn test_zero_is_enveloped() {
        assert_eq!(encode(json!(0)), r#"{"data":0}"#);
    }

    #[test]
    fn test_record_stored_bare() {
        let record = json!({"name": "a"});
        assert_eq!(encode(record.clone()), r#"{"name":"a"}"#);
        assert_eq!(decode(&encode(record.clone())), record);
    }

    #[test]
    fn test_array_enveloped() {
        let items = json!([1, "two", {"three": 3}]);
        assert_eq!(encode(items.clone()), r#"{"data":[1,"two",{"three":3}]}"#);
        assert_eq!(decode(&encode(items.clone())), items);
    }

    #[test]
    fn test_null_normalizes_to_empty_array() {
        assert_eq!(encode(Value::Null), r#"{"data":[]}"#);
        assert_eq!(decode(&encode(Value::Null)), json!([]));
    }

    #[test]
    fn test_record_with_length_is_enveloped() {
        let record = json!({"length": 3});
        assert_eq!(encode(record.clone()), r#"{"data":{"length":3}}"#);
        assert_eq!(decode(&encode(record.clone())), record);
    }

    #[test]
    fn test_envelope_shaped_record_round_trips() {
        let record = json!({"data": 5});
        assert_eq!(encode(record.clone()), r#"{"data":{"data":5}}"#);
        assert_eq!(decode(&encode(record.clone())), record);

        let nested = json!({"data": {"data": []}});
        assert_eq!(decode(&encode(nested.clone())), nested);
    }

    #[test]
    fn test_classify() {
        assert_eq!(StoredValue::classify(Value::Null), StoredValue::Absent);
        assert!(matches!(
            StoredValue::classify(json!(false)),
            StoredValue::Primitive(Value::Bool(false))
        ));
        assert!(matches!(
            StoredValue::classify(json!([])),
            StoredValue::Array(_)
        ));
        assert!(StoredValue::classify(json!({"a": 1})).is_bare());
        assert!(!StoredValue::classify(json!({"length": 1})).is_bare());
        assert!(!StoredValue::classify(json!({"data": 1})).is_bare());
        assert!(StoredValue::classify(json!({"data": 1, "extra": 2})).is_bare());
        assert!(!StoredValue::classify(json!("text")).is_bare());
    }

    #[test]
    fn test_decode_invalid_json_returns_raw_text() {
        assert_eq!(decode("not json {"), json!("not json {"));
    }

    #[test]
    fn test_decode_plain_json_without_envelope() {
        assert_eq!(decode("42"), json!(42));
        assert_eq!(decode(r#"{"data":1,"extra":2}"#), json!({"data": 1, "extra": 2}));
    }

    #[test]
    fn test_encode_serializable_struct() {
        #[derive(Serialize)]
        struct Profile {
            name: String,
            visits: u32,
        }

        let text = encode_serializable(&Profile {
            name: "a".into(),
            visits: 2,
        })
        .unwrap();
        assert_eq!(decode(&text), json!({"name": "a", "visits": 2}));
    }

    #[test]
    fn test_encode_serializable_rejects_non_string_keys() {
        let mut map = std::collections::HashMap::new();
        map.insert(vec![1u8], 1);
        assert!(matches!(
            encode_serializable(&map),
            Err(StorageError::Serialization(_))
        ));
    }
}
