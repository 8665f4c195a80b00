//! YAML front end for `bindery`.
//!
//! Mapping keys must be scalars; booleans and numbers used as keys are
//! turned into their text form. YAML tags are not supported.

mod convert;
mod error;

pub use convert::{from_yaml, to_yaml};
pub use error::YamlError;

use bindery::{Bind, Options, Unbind, Value};

/// Parses YAML text into a generic value.
pub fn from_str(input: &str) -> Result<Value, YamlError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(input)?;
    tracing::trace!(bytes = input.len(), "parsed YAML");
    from_yaml(&yaml)
}

/// Renders a generic value as YAML text.
pub fn to_string(value: &Value) -> Result<String, YamlError> {
    Ok(serde_yaml::to_string(&to_yaml(value))?)
}

/// Parses YAML text and binds it into a fresh `T`.
pub fn bind_str<T: Bind + Default + 'static>(input: &str, options: &Options) -> Result<T, YamlError> {
    let value = from_str(input)?;
    Ok(bindery::bind(&value, options)?)
}

/// Unbinds `value` and renders it as YAML text.
pub fn unbind_string<T: Unbind + 'static>(value: &T, options: &Options) -> Result<String, YamlError> {
    let map = bindery::unbind(value, options)?;
    to_string(&Value::Map(map))
}
