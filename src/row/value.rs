//! Cell value helpers
//!
//! Cells are `serde_json::Value`. This module supplies what the engine needs
//! on top of it: a structural hash consistent with `==`, the canonical string
//! form used by column ordering, and a numeric-aware comparison for the
//! built-in aggregators.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde_json::Value;

/// Hashes a value so that `a == b` implies equal hashes.
///
/// Numbers use `serde_json::Number`'s own hash, which folds `0.0` and `-0.0`
/// together the same way its equality does.
pub fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
    match value {
        Value::Null => 0u8.hash(state),
        Value::Bool(b) => {
            1u8.hash(state);
            b.hash(state);
        }
        Value::Number(n) => {
            2u8.hash(state);
            n.hash(state);
        }
        Value::String(s) => {
            3u8.hash(state);
            s.hash(state);
        }
        Value::Array(items) => {
            4u8.hash(state);
            items.len().hash(state);
            for item in items {
                hash_value(item, state);
            }
        }
        Value::Object(map) => {
            5u8.hash(state);
            map.len().hash(state);
            // Map equality ignores key order
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            for (key, item) in entries {
                key.hash(state);
                hash_value(item, state);
            }
        }
    }
}

/// Canonical string form of a cell.
///
/// Strings render without quotes; everything else renders as JSON text.
pub fn canonical_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Compares numbers numerically, anything else by canonical string
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(xi), Some(yi)) = (x.as_i64(), y.as_i64()) {
                return xi.cmp(&yi);
            }
            let xf = x.as_f64().unwrap_or(0.0);
            let yf = y.as_f64().unwrap_or(0.0);
            xf.partial_cmp(&yf).unwrap_or(Ordering::Equal)
        }
        _ => canonical_string(a).cmp(&canonical_string(b)),
    }
}
