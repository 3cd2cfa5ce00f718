//! JSON equality.
//!
//! `serde_json::Value`'s own `PartialEq` distinguishes `1` from `1.0`. A
//! settings document round-tripped through an editor must not report a change
//! for that, so comparisons go through [`json_equal`] instead.

use serde_json::{Map, Value};

/// Deep JSON equality: object key order is ignored, numbers compare by value.
#[must_use]
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => {
            if x == y {
                return true;
            }
            match (x.as_i64(), y.as_i64()) {
                (Some(i), Some(j)) => i == j,
                _ => match (x.as_f64(), y.as_f64()) {
                    #[allow(clippy::float_cmp)]
                    (Some(f), Some(g)) => f == g,
                    _ => false,
                },
            }
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => json_map_equal(xs, ys),
        _ => false,
    }
}

/// [`json_equal`] for two objects held as bare maps.
#[must_use]
pub fn json_map_equal(a: &Map<String, Value>, b: &Map<String, Value>) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(key, x)| b.get(key).is_some_and(|y| json_equal(x, y)))
}
