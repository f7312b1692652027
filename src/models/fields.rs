//! Lenient accessors for JSON object fields.
//!
//! Project feeds are loosely typed: ids arrive as numbers or strings, flags as
//! booleans or 0/1. Every accessor falls back to the caller's default instead
//! of failing.

use serde_json::{Map, Value};

pub(crate) fn string(obj: &Map<String, Value>, key: &str) -> String {
    opt_string(obj, key).unwrap_or_default()
}

pub(crate) fn opt_string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn int(obj: &Map<String, Value>, key: &str, default: i64) -> i64 {
    opt_int(obj, key).unwrap_or(default)
}

pub(crate) fn opt_int(obj: &Map<String, Value>, key: &str) -> Option<i64> {
    match obj.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn float(obj: &Map<String, Value>, key: &str, default: f64) -> f64 {
    match obj.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

pub(crate) fn flag(obj: &Map<String, Value>, key: &str, default: bool) -> bool {
    match obj.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().map_or(default, |v| v != 0),
        Some(Value::String(s)) => match s.as_str() {
            "true" | "1" => true,
            "false" | "0" => false,
            _ => default,
        },
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn numeric_and_string_ids_are_both_read() {
        let o = obj(json!({ "a": 12, "b": "34", "c": 5.0 }));
        assert_eq!(int(&o, "a", -1), 12);
        assert_eq!(int(&o, "b", -1), 34);
        assert_eq!(int(&o, "c", -1), 5);
        assert_eq!(int(&o, "missing", -1), -1);
    }

    #[test]
    fn flags_accept_numbers_and_strings() {
        let o = obj(json!({ "a": 1, "b": "false", "c": null }));
        assert!(flag(&o, "a", false));
        assert!(!flag(&o, "b", true));
        assert!(flag(&o, "c", true));
    }

    #[test]
    fn null_string_falls_back_to_empty() {
        let o = obj(json!({ "description": null, "id": 7 }));
        assert_eq!(string(&o, "description"), "");
        assert_eq!(string(&o, "id"), "7");
    }
}
