//! Flat key-value records shared by the parsers, stores and reconciler.

use serde_json::{Map, Number, Value};

/// One row / object from an uploaded file, field order preserved.
pub type Record = Map<String, Value>;

/// Caller-supplied business key.
pub const BUSINESS_KEY: &str = "id";

/// Storage-assigned key. Never accepted from input.
pub const STORAGE_KEY: &str = "_id";

/// The record's business key, if it is a non-empty string.
pub fn business_key(record: &Record) -> Option<&str> {
    match record.get(BUSINESS_KEY) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
        _ => None,
    }
}

/// Remove any client-supplied `_id`. Returns true if one was present.
pub fn strip_storage_key(record: &mut Record) -> bool {
    record.shift_remove(STORAGE_KEY).is_some()
}

/// Canonical text form of a value, used for change detection.
///
/// Scalars from different parsers compare equal when they print the same:
/// `25`, `25.0` and `"25"` all become `25`. Strings are taken verbatim,
/// containers become compact JSON with object keys sorted.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => number_text(n),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => {
            let mut out = String::new();
            write_canonical(value, &mut out);
            out
        }
    }
}

fn number_text(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Number(n) => out.push_str(&number_text(n)),
        other => out.push_str(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn business_key_requires_non_empty_string() {
        assert_eq!(business_key(&record(json!({"id": "pkg1"}))), Some("pkg1"));
        assert_eq!(business_key(&record(json!({"id": ""}))), None);
        assert_eq!(business_key(&record(json!({"id": 42}))), None);
        assert_eq!(business_key(&record(json!({"name": "Basic"}))), None);
    }

    #[test]
    fn strip_storage_key_keeps_field_order() {
        let mut r = record(json!({"_id": "abc", "id": "pkg1", "name": "Basic"}));
        assert!(strip_storage_key(&mut r));
        assert!(!strip_storage_key(&mut r));
        let keys: Vec<&str> = r.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["id", "name"]);
    }

    #[test]
    fn numbers_and_strings_compare_by_text() {
        assert_eq!(value_text(&json!(25)), value_text(&json!("25")));
        assert_eq!(value_text(&json!(25.0)), "25");
        assert_eq!(value_text(&json!(2.5)), "2.5");
        assert_ne!(value_text(&json!(25)), value_text(&json!("25.0")));
    }

    #[test]
    fn scalars_render_plainly() {
        assert_eq!(value_text(&json!(true)), "true");
        assert_eq!(value_text(&json!(null)), "null");
        assert_eq!(value_text(&json!("Basic")), "Basic");
    }

    #[test]
    fn object_key_order_is_ignored() {
        let a = json!({"ageFrom": 1, "ageTo": 5, "male": 100.0});
        let b = json!({"male": 100, "ageTo": 5, "ageFrom": 1});
        assert_eq!(value_text(&a), value_text(&b));
        assert_eq!(value_text(&a), r#"{"ageFrom":1,"ageTo":5,"male":100}"#);
    }

    #[test]
    fn array_order_matters() {
        assert_ne!(value_text(&json!(["a", "b"])), value_text(&json!(["b", "a"])));
        assert_eq!(value_text(&json!(["a", 1.0])), r#"["a",1]"#);
    }
}
