//! Scalar coercion rules.
//!
//! Strings bind only from strings. Booleans accept `true`/`false` strings in
//! any case. Integers accept any number (floats truncate toward zero) and
//! numeric strings; values that do not fit the target type are rejected.
//! Floats accept any number and float strings.

use crate::bind::{Bind, BindContext};
use crate::error::BindError;
use crate::link::Link;
use crate::path::FieldPath;
use crate::record::FieldKind;
use crate::unbind::{Unbind, UnbindContext};
use crate::value::{Number, Value};

pub fn to_bool(value: &Value, path: &FieldPath) -> Result<bool, BindError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => parse_bool(s)
            .ok_or_else(|| BindError::type_mismatch(path, "bool", value.describe())),
        other => Err(BindError::type_mismatch(path, "bool", other.describe())),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Integer view of a scalar, before range checking against the target type.
fn integer_of(value: &Value) -> Option<i128> {
    match value {
        Value::Number(n) => match n.as_i128() {
            Some(i) => Some(i),
            None => truncate(n.as_f64()),
        },
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i128>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(truncate))
        }
        _ => None,
    }
}

fn truncate(f: f64) -> Option<i128> {
    // i128 bounds as f64; anything outside cannot fit a 64-bit target anyway.
    if f.is_finite() && f.abs() < 1.7e38 {
        Some(f.trunc() as i128)
    } else {
        None
    }
}

pub fn to_int<T: TryFrom<i128>>(
    value: &Value,
    path: &FieldPath,
    expected: &str,
) -> Result<T, BindError> {
    let Some(wide) = integer_of(value) else {
        return Err(BindError::type_mismatch(path, expected, value.describe()));
    };
    T::try_from(wide).map_err(|_| {
        BindError::type_mismatch(path, expected, format!("{} (out of range)", value.describe()))
    })
}

pub fn to_float(value: &Value, path: &FieldPath, expected: &str) -> Result<f64, BindError> {
    match value {
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| BindError::type_mismatch(path, expected, value.describe())),
        other => Err(BindError::type_mismatch(path, expected, other.describe())),
    }
}

pub fn to_string(value: &Value, path: &FieldPath) -> Result<String, BindError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(BindError::type_mismatch(path, "string", other.describe())),
    }
}

/// Compares a raw source value against a `match` literal.
///
/// Strings compare by equality, booleans and numbers against the literal
/// parsed into the same kind. Other kinds never match.
pub fn literal_matches(expected: &str, value: &Value) -> bool {
    match value {
        Value::String(s) => s == expected,
        Value::Bool(b) => parse_bool(expected) == Some(*b),
        Value::Number(n) => literal_number(expected).is_some_and(|lit| lit == *n),
        _ => false,
    }
}

fn literal_number(s: &str) -> Option<Number> {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::Int(i));
    }
    if let Ok(u) = s.parse::<u64>() {
        return Some(Number::UInt(u));
    }
    s.parse::<f64>().ok().map(Number::Float)
}

impl Bind for String {
    const KIND: FieldKind = FieldKind::Primitive;

    fn bind(value: &Value, cx: &mut BindContext<'_>) -> Result<Self, BindError> {
        to_string(value, cx.path())
    }
}

impl Unbind for String {
    fn unbind(&self, _cx: &mut UnbindContext<'_>) -> Result<Value, BindError> {
        Ok(Value::String(self.clone()))
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl Link for String {}

impl Bind for bool {
    const KIND: FieldKind = FieldKind::Primitive;

    fn bind(value: &Value, cx: &mut BindContext<'_>) -> Result<Self, BindError> {
        to_bool(value, cx.path())
    }
}

impl Unbind for bool {
    fn unbind(&self, _cx: &mut UnbindContext<'_>) -> Result<Value, BindError> {
        Ok(Value::Bool(*self))
    }

    fn is_zero(&self) -> bool {
        !*self
    }
}

impl Link for bool {}

macro_rules! impl_integer {
    ($($ty:ident),*) => {
        $(
            impl Bind for $ty {
                const KIND: FieldKind = FieldKind::Primitive;

                fn bind(value: &Value, cx: &mut BindContext<'_>) -> Result<Self, BindError> {
                    to_int(value, cx.path(), stringify!($ty))
                }
            }

            impl Unbind for $ty {
                fn unbind(&self, _cx: &mut UnbindContext<'_>) -> Result<Value, BindError> {
                    Ok(Value::from(*self))
                }

                fn is_zero(&self) -> bool {
                    *self == 0
                }
            }

            impl Link for $ty {}
        )*
    };
}

impl_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_float {
    ($($ty:ident),*) => {
        $(
            impl Bind for $ty {
                const KIND: FieldKind = FieldKind::Primitive;

                fn bind(value: &Value, cx: &mut BindContext<'_>) -> Result<Self, BindError> {
                    to_float(value, cx.path(), stringify!($ty)).map(|f| f as $ty)
                }
            }

            impl Unbind for $ty {
                fn unbind(&self, _cx: &mut UnbindContext<'_>) -> Result<Value, BindError> {
                    Ok(Value::from(*self))
                }

                fn is_zero(&self) -> bool {
                    *self == 0.0
                }
            }

            impl Link for $ty {}
        )*
    };
}

impl_float!(f32, f64);

/// Types usable as keys of bound maps.
///
/// Source map keys are always strings; integer and boolean keys are parsed
/// from them with the scalar rules above.
pub trait MapKey: Sized {
    fn from_key(key: &str, path: &FieldPath) -> Result<Self, BindError>;

    fn to_key(&self) -> String;
}

impl MapKey for String {
    fn from_key(key: &str, _path: &FieldPath) -> Result<Self, BindError> {
        Ok(key.to_string())
    }

    fn to_key(&self) -> String {
        self.clone()
    }
}

impl MapKey for bool {
    fn from_key(key: &str, path: &FieldPath) -> Result<Self, BindError> {
        to_bool(&Value::from(key), path)
    }

    fn to_key(&self) -> String {
        self.to_string()
    }
}

macro_rules! impl_integer_key {
    ($($ty:ident),*) => {
        $(
            impl MapKey for $ty {
                fn from_key(key: &str, path: &FieldPath) -> Result<Self, BindError> {
                    to_int(&Value::from(key), path, stringify!($ty))
                }

                fn to_key(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_integer_key!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
