//! Node identities and loose ID equality.
//!
//! IDs are kept as the [Value] they were supplied as, but linking and lookup
//! compare their *loose key*, a string form under which `5`, `5.0` and `"5"`
//! all denote the same node:
//! - `null` and `false` -> `""`, `true` -> `"1"`
//! - integers in decimal, floats without fraction like integers, `-0.0` as `"0"`
//! - other floats via their display form
//! - strings verbatim
//!
//! Arrays and objects have no loose key and cannot serve as IDs.

use serde_json::{Number, Value};

/// Returns the loose key of a scalar `value`, or `None` for arrays and objects.
pub fn loose_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some(String::new()),
        Value::Number(number) => Some(number_key(number)),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Returns `true` if both values are scalars with the same loose key.
pub fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (loose_key(a), loose_key(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Returns `true` for values usable as node or root ID (anything but arrays and objects).
pub fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

/// String form of an ID as used in messages and for display.
pub fn display_id(value: &Value) -> String {
    loose_key(value).unwrap_or_else(|| value.to_string())
}

fn number_key(number: &Number) -> String {
    if let Some(i) = number.as_i64() {
        return i.to_string();
    }
    if let Some(u) = number.as_u64() {
        return u.to_string();
    }
    // Display prints integral floats without fraction or exponent
    match number.as_f64() {
        // -0.0 is the same ID as 0
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) => f.to_string(),
        None => number.to_string(),
    }
}

// =#========================================================================#=
// TESTS - LOOSE KEYS
// =#========================================================================#=
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_loose_key_scalars() {
        assert_eq!(loose_key(&json!(null)).unwrap(), "");
        assert_eq!(loose_key(&json!(true)).unwrap(), "1");
        assert_eq!(loose_key(&json!(false)).unwrap(), "");
        assert_eq!(loose_key(&json!(42)).unwrap(), "42");
        assert_eq!(loose_key(&json!(-7)).unwrap(), "-7");
        assert_eq!(loose_key(&json!(3.0)).unwrap(), "3");
        assert_eq!(loose_key(&json!(1.5)).unwrap(), "1.5");
        assert_eq!(loose_key(&json!(-0.0)).unwrap(), "0");
        assert_eq!(loose_key(&json!(1e15)).unwrap(), "1000000000000000");
        assert_eq!(loose_key(&json!(1e20)).unwrap(), "100000000000000000000");
        assert_eq!(loose_key(&json!("vehicle")).unwrap(), "vehicle");
    }

    #[test]
    fn test_loose_key_rejects_compound_values() {
        assert_eq!(loose_key(&json!([1, 2])), None);
        assert_eq!(loose_key(&json!({"a": 1})), None);
        assert!(!is_scalar(&json!([])));
        assert!(is_scalar(&json!(null)));
    }

    #[test]
    fn test_mixed_types_are_loosely_equal() {
        assert!(loosely_equal(&json!("5"), &json!(5)));
        assert!(loosely_equal(&json!(5.0), &json!(5)));
        assert!(loosely_equal(&json!(-0.0), &json!(0)));
        assert!(loosely_equal(&json!(null), &json!("")));
        assert!(!loosely_equal(&json!("05"), &json!(5)));
        assert!(!loosely_equal(&json!(0), &json!("")));
    }
}
