use bindery::{Map, Number, Value};
use serde_json::Value as JsonValue;

use crate::error::JsonError;

/// Converts a JSON value into a generic value. Object key order is kept.
pub fn from_json(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => Value::Number(number_from_json(n)),
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Array(items) => Value::Array(items.iter().map(from_json).collect()),
        JsonValue::Object(object) => Value::Map(
            object
                .iter()
                .map(|(key, value)| (key.clone(), from_json(value)))
                .collect::<Map>(),
        ),
    }
}

fn number_from_json(n: &serde_json::Number) -> Number {
    if let Some(i) = n.as_i64() {
        Number::Int(i)
    } else if let Some(u) = n.as_u64() {
        Number::UInt(u)
    } else {
        // Without arbitrary precision every JSON number fits one of the three.
        Number::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Converts a generic value into JSON. Fails on NaN and infinities.
pub fn to_json(value: &Value) -> Result<JsonValue, JsonError> {
    match value {
        Value::Null => Ok(JsonValue::Null),
        Value::Bool(b) => Ok(JsonValue::Bool(*b)),
        Value::Number(Number::Int(i)) => Ok(JsonValue::from(*i)),
        Value::Number(Number::UInt(u)) => Ok(JsonValue::from(*u)),
        Value::Number(Number::Float(f)) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .ok_or(JsonError::InvalidNumber(*f)),
        Value::String(s) => Ok(JsonValue::String(s.clone())),
        Value::Array(items) => items
            .iter()
            .map(to_json)
            .collect::<Result<Vec<_>, _>>()
            .map(JsonValue::Array),
        Value::Map(map) => {
            let mut object = serde_json::Map::with_capacity(map.len());
            for (key, value) in map {
                object.insert(key.clone(), to_json(value)?);
            }
            Ok(JsonValue::Object(object))
        }
    }
}
