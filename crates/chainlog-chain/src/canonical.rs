//! Deterministic payload normalization.
//!
//! Two producers that send semantically equal payloads (different key order,
//! extra empty strings or nulls) must end up hashing the same bytes. The
//! rules, applied recursively:
//!
//! - `null` and `""` are absent.
//! - Numbers with no fractional part render as integers (`1.0` becomes `1`).
//! - Other scalars pass through unchanged.
//! - Arrays keep their order, drop absent elements, and are absent when empty.
//! - Objects drop absent values, sort keys by byte order, and are absent when
//!   empty.

use serde_json::{Map, Number, Value};

/// Normalize `value`, returning `None` when it carries no information.
pub fn normalize(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) => Some(Value::Number(integral(n).unwrap_or_else(|| n.clone()))),
        Value::String(_) | Value::Bool(_) => Some(value.clone()),
        Value::Array(items) => {
            let kept: Vec<Value> = items.iter().filter_map(normalize).collect();
            (!kept.is_empty()).then_some(Value::Array(kept))
        }
        Value::Object(fields) => {
            let mut kept: Vec<(&String, Value)> = fields
                .iter()
                .filter_map(|(k, v)| normalize(v).map(|v| (k, v)))
                .collect();
            if kept.is_empty() {
                return None;
            }

            // String's Ord is byte-wise, which for UTF-8 is code-point order.
            kept.sort_by(|(a, _), (b, _)| a.cmp(b));

            let mut out = Map::new();
            for (k, v) in kept {
                out.insert(k.clone(), v);
            }
            Some(Value::Object(out))
        }
    }
}

/// The integer form of a float that has no fractional part and fits in
/// `i64` or `u64`. Integers and other floats return `None`.
fn integral(n: &Number) -> Option<Number> {
    if n.is_i64() || n.is_u64() {
        return None;
    }
    let f = n.as_f64()?;
    if !f.is_finite() || f.fract() != 0.0 {
        return None;
    }
    // i64::MAX as f64 rounds up to 2^63, so both upper bounds are exclusive.
    if f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(Number::from(f as i64))
    } else if f >= 0.0 && f < u64::MAX as f64 {
        Some(Number::from(f as u64))
    } else {
        None
    }
}

/// Normalize `value`, substituting an empty object when nothing is left.
pub fn canonical_payload(value: &Value) -> Value {
    normalize(value).unwrap_or_else(|| Value::Object(Map::new()))
}

/// Compact JSON text of the canonical form of `value`.
///
/// This is the exact byte sequence fed to the hasher. Object keys come out in
/// the order `normalize` established.
pub fn canonical_json(value: &Value) -> String {
    canonical_payload(value).to_string()
}
