//! Null-safe access to the provider's array-like fields.
//!
//! The provider encodes the same concept as a JSON array, a bare scalar, a numeric
//! string, or omits it entirely; `-1` stands for "no data". Nothing in here fails:
//! unexpected shapes degrade to empty sequences or `None`.

use crate::time::NULL_SENTINEL;
use serde_json::Value;

pub fn to_sequence(value: &Value) -> Vec<&Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

pub fn has_elements(value: &Value) -> bool {
    !to_sequence(value).is_empty()
}

/// Reads a number out of a JSON value, accepting numeric strings.
pub fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

pub fn is_valid(value: &Value, null_sentinel: i64) -> bool {
    match as_number(value) {
        Some(n) => n != null_sentinel as f64,
        None => false,
    }
}

/// Last usable element of `map[key]`, scanning backwards. Prices arrive in minor
/// currency units and are converted when `is_price` is set.
pub fn latest_valid(map: &Value, key: &str, is_price: bool) -> Option<f64> {
    let Some(field) = map.get(key) else {
        if !map.is_object() && !map.is_null() {
            tracing::debug!(key, "latest_valid called on a non-object value");
        }
        return None;
    };

    let n = to_sequence(field)
        .into_iter()
        .rev()
        .filter(|v| is_valid(v, NULL_SENTINEL))
        .filter_map(as_number)
        .find(|n| *n >= 0.0)?;

    Some(if is_price { n / 100.0 } else { n })
}

/// Element `index` of a fixed-layout array, if present and valid.
pub fn valid_at(value: &Value, index: usize) -> Option<f64> {
    let seq = to_sequence(value);
    let item = seq.get(index)?;
    if !is_valid(item, NULL_SENTINEL) {
        return None;
    }
    as_number(item).filter(|n| *n >= 0.0)
}

/// Decodes a flat `[t, v, t, v, ...]` array into `(t, v)` pairs.
///
/// Pairs whose timestamp or value is missing are dropped; an odd trailing element
/// is ignored.
pub fn interleaved_pairs(value: &Value) -> Vec<(i64, f64)> {
    interleaved(value, 2)
        .into_iter()
        .map(|chunk| (chunk[0] as i64, chunk[1]))
        .collect()
}

/// Decodes a flat `[t, a, b, t, a, b, ...]` array into triples.
pub fn interleaved_triples(value: &Value) -> Vec<(i64, f64, f64)> {
    interleaved(value, 3)
        .into_iter()
        .map(|chunk| (chunk[0] as i64, chunk[1], chunk[2]))
        .collect()
}

// Only the timestamp and the first value slot have to be valid: trailing slots
// (shipping, for instance) keep their raw number, sentinel included.
fn interleaved(value: &Value, stride: usize) -> Vec<Vec<f64>> {
    let seq = to_sequence(value);
    if seq.len() % stride != 0 {
        tracing::debug!(
            len = seq.len(),
            stride,
            "interleaved array length is not a multiple of its stride"
        );
    }

    seq.chunks_exact(stride)
        .filter(|chunk| is_valid(chunk[0], NULL_SENTINEL) && is_valid(chunk[1], NULL_SENTINEL))
        .filter_map(|chunk| chunk.iter().map(|v| as_number(v)).collect::<Option<Vec<f64>>>())
        .collect()
}
