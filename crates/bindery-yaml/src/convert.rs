use bindery::{Map, Number, Value};
use serde_yaml::Value as YamlValue;

use crate::error::YamlError;

/// Converts a YAML value into a generic value.
pub fn from_yaml(yaml: &YamlValue) -> Result<Value, YamlError> {
    match yaml {
        YamlValue::Null => Ok(Value::Null),
        YamlValue::Bool(b) => Ok(Value::Bool(*b)),
        YamlValue::Number(n) => Ok(Value::Number(number_from_yaml(n))),
        YamlValue::String(s) => Ok(Value::String(s.clone())),
        YamlValue::Sequence(items) => items
            .iter()
            .map(from_yaml)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        YamlValue::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                map.insert(key_to_string(key)?, from_yaml(value)?);
            }
            Ok(Value::Map(map))
        }
        YamlValue::Tagged(tagged) => Err(YamlError::UnsupportedTag(tagged.tag.to_string())),
    }
}

fn number_from_yaml(n: &serde_yaml::Number) -> Number {
    if let Some(i) = n.as_i64() {
        Number::Int(i)
    } else if let Some(u) = n.as_u64() {
        Number::UInt(u)
    } else {
        Number::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn key_to_string(key: &YamlValue) -> Result<String, YamlError> {
    match key {
        YamlValue::String(s) => Ok(s.clone()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Null => Ok("null".to_string()),
        other => Err(YamlError::UnsupportedKey(format!("{other:?}"))),
    }
}

/// Converts a generic value into YAML.
pub fn to_yaml(value: &Value) -> YamlValue {
    match value {
        Value::Null => YamlValue::Null,
        Value::Bool(b) => YamlValue::Bool(*b),
        Value::Number(Number::Int(i)) => YamlValue::Number((*i).into()),
        Value::Number(Number::UInt(u)) => YamlValue::Number((*u).into()),
        Value::Number(Number::Float(f)) => YamlValue::Number((*f).into()),
        Value::String(s) => YamlValue::String(s.clone()),
        Value::Array(items) => YamlValue::Sequence(items.iter().map(to_yaml).collect()),
        Value::Map(map) => YamlValue::Mapping(
            map.iter()
                .map(|(key, value)| (YamlValue::String(key.clone()), to_yaml(value)))
                .collect(),
        ),
    }
}
