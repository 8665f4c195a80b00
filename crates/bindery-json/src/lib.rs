//! JSON front end for `bindery`.
//!
//! Converts between [`serde_json::Value`] and [`bindery::Value`], and offers
//! string-level helpers that parse, bind and unbind in one call.

mod config;
mod convert;
mod error;

pub use config::Config;
pub use convert::{from_json, to_json};
pub use error::JsonError;

use bindery::{Bind, Options, Unbind, Value};

/// Parses JSON text into a generic value.
pub fn from_str(input: &str) -> Result<Value, JsonError> {
    let json: serde_json::Value = serde_json::from_str(input)?;
    tracing::trace!(bytes = input.len(), "parsed JSON");
    Ok(from_json(&json))
}

/// Renders a generic value as JSON text.
pub fn to_string(value: &Value, config: &Config) -> Result<String, JsonError> {
    let json = to_json(value)?;
    let text = if config.pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    };
    Ok(text)
}

/// Renders a generic value as indented JSON text.
pub fn to_string_pretty(value: &Value) -> Result<String, JsonError> {
    to_string(value, &Config { pretty: true })
}

/// Parses JSON text and binds it into a fresh `T`.
pub fn bind_str<T: Bind + Default + 'static>(input: &str, options: &Options) -> Result<T, JsonError> {
    let value = from_str(input)?;
    Ok(bindery::bind(&value, options)?)
}

/// Unbinds `value` and renders it as JSON text.
pub fn unbind_string<T: Unbind + 'static>(
    value: &T,
    options: &Options,
    config: &Config,
) -> Result<String, JsonError> {
    let map = bindery::unbind(value, options)?;
    to_string(&Value::Map(map), config)
}
