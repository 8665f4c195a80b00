use std::time::Duration;

use crate::bind::{Bind, BindContext};
use crate::error::BindError;
use crate::link::Link;
use crate::record::FieldKind;
use crate::unbind::{Unbind, UnbindContext};
use crate::value::{Number, Value};

const NANOS_PER_SEC: u128 = 1_000_000_000;

fn unit_nanos(unit: &str) -> Option<u128> {
    Some(match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => NANOS_PER_SEC,
        "m" => 60 * NANOS_PER_SEC,
        "h" => 3_600 * NANOS_PER_SEC,
        _ => return None,
    })
}

/// Parse a duration literal like "1h30m", "300ms" or "1.5s".
///
/// A literal is a sequence of decimal numbers, each with an optional fraction
/// and a unit suffix (`ns`, `us`, `µs`, `ms`, `s`, `m`, `h`). A bare `0` is
/// accepted. Negative durations are rejected.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    let s = s.strip_prefix('+').unwrap_or(s);
    if s.is_empty() {
        return None;
    }
    if s == "0" {
        return Some(Duration::ZERO);
    }

    let mut total: u128 = 0;
    let mut rest = s;
    while !rest.is_empty() {
        let int_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let int_part = &rest[..int_end];
        rest = &rest[int_end..];

        let frac_part = match rest.strip_prefix('.') {
            Some(after) => {
                let end = after.find(|c: char| !c.is_ascii_digit()).unwrap_or(after.len());
                rest = &after[end..];
                &after[..end]
            }
            None => "",
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = unit_nanos(&rest[..unit_end])?;
        rest = &rest[unit_end..];

        let int: u128 = if int_part.is_empty() { 0 } else { int_part.parse().ok()? };
        let mut nanos = int.checked_mul(scale)?;
        if !frac_part.is_empty() {
            // Digits beyond nanosecond precision cannot contribute.
            let frac_digits = &frac_part[..frac_part.len().min(18)];
            let frac: u128 = frac_digits.parse().ok()?;
            let divisor = 10u128.pow(frac_digits.len() as u32);
            nanos = nanos.checked_add(frac.checked_mul(scale)? / divisor)?;
        }
        total = total.checked_add(nanos)?;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).ok()?;
    Some(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}

/// Formats a duration in canonical form: `"0s"`, `"300ms"`, `"1.5s"`, `"1m30s"`, `"1h0m0s"`.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < NANOS_PER_SEC {
        let (scale, unit) = if nanos < 1_000 {
            (1, "ns")
        } else if nanos < 1_000_000 {
            (1_000, "µs")
        } else {
            (1_000_000, "ms")
        };
        return format!("{}{unit}", decimal(nanos, scale));
    }

    let secs = d.as_secs();
    let hours = secs / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = u128::from(secs % 60) * NANOS_PER_SEC + u128::from(d.subsec_nanos());

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&decimal(seconds, NANOS_PER_SEC));
    out.push('s');
    out
}

fn decimal(value: u128, scale: u128) -> String {
    let int = value / scale;
    let frac = value % scale;
    if frac == 0 {
        return int.to_string();
    }
    let width = scale.ilog10() as usize;
    let digits = format!("{frac:0width$}");
    format!("{int}.{}", digits.trim_end_matches('0'))
}

impl Bind for Duration {
    const KIND: FieldKind = FieldKind::Primitive;

    fn bind(value: &Value, cx: &mut BindContext<'_>) -> Result<Self, BindError> {
        match value {
            Value::String(s) => parse_duration(s)
                .ok_or_else(|| BindError::type_mismatch(cx.path(), "duration", value.describe())),
            Value::Number(n) => duration_from_nanos(*n)
                .ok_or_else(|| BindError::type_mismatch(cx.path(), "duration", value.describe())),
            other => Err(BindError::type_mismatch(cx.path(), "duration", other.describe())),
        }
    }
}

/// Numbers are taken as nanoseconds; floats are truncated.
fn duration_from_nanos(n: Number) -> Option<Duration> {
    let nanos: u128 = match n {
        Number::Int(i) => u128::try_from(i).ok()?,
        Number::UInt(u) => u128::from(u),
        Number::Float(f) if f.is_finite() && f >= 0.0 => f.trunc() as u128,
        Number::Float(_) => return None,
    };
    let secs = u64::try_from(nanos / NANOS_PER_SEC).ok()?;
    Some(Duration::new(secs, (nanos % NANOS_PER_SEC) as u32))
}

impl Unbind for Duration {
    fn unbind(&self, _cx: &mut UnbindContext<'_>) -> Result<Value, BindError> {
        Ok(Value::String(format_duration(*self)))
    }

    fn is_zero(&self) -> bool {
        Duration::is_zero(self)
    }
}

impl Link for Duration {}
