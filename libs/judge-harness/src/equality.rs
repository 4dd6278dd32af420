// Structural equality between an actual and an expected value.
//
// Strict on types: a boolean never equals a number and null only equals null.
// Integers and floats compare by exact numeric value since JSON does not
// tell them apart.
// Total: no pair of values can make the comparison fail.

use serde_json::{Number, Value};

pub fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => false,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    match (float_of(a), float_of(b)) {
        (Some(x), Some(y)) => x == y,
        (None, None) => integers_equal(a, b),
        (None, Some(y)) => integer_equals_float(a, y),
        (Some(x), None) => integer_equals_float(b, x),
    }
}

fn float_of(n: &Number) -> Option<f64> {
    if n.is_f64() {
        n.as_f64()
    } else {
        None
    }
}

fn integers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    matches!((a.as_u64(), b.as_u64()), (Some(x), Some(y)) if x == y)
}

// Exact: the float must be integral and in range of the integer's type,
// otherwise large integers would round onto neighbouring floats.
fn integer_equals_float(int: &Number, float: f64) -> bool {
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0; // 2^63
    const U64_BOUND: f64 = 18_446_744_073_709_551_616.0; // 2^64

    if !float.is_finite() || float.fract() != 0.0 {
        return false;
    }
    if let Some(i) = int.as_i64() {
        return (-I64_BOUND..I64_BOUND).contains(&float) && float as i64 == i;
    }
    match int.as_u64() {
        Some(u) => (0.0..U64_BOUND).contains(&float) && float as u64 == u,
        None => false,
    }
}
