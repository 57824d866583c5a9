use serde_json::Value;

use coverdesk_core::{value_text, Record, STORAGE_KEY};

use crate::types::FieldDiff;

/// Field-level differences between a stored document and an incoming record.
///
/// Walks the incoming record's fields in its own order. A field differs when
/// the stored document lacks it or when the two values have different
/// canonical text (see [`value_text`]). Fields only present in `existing`
/// are not reported, and `_id` is never compared.
pub fn compare_documents(existing: &Record, incoming: &Record) -> Vec<FieldDiff> {
    incoming
        .iter()
        .filter(|(field, _)| field.as_str() != STORAGE_KEY)
        .filter_map(|(field, new)| match existing.get(field) {
            Some(old) if value_text(old) == value_text(new) => None,
            old => Some(FieldDiff {
                field: field.clone(),
                old: old.cloned().unwrap_or(Value::Null),
                new: new.clone(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn identical_documents_have_no_diffs() {
        let doc = record(json!({"id": "pkg1", "name": "Basic"}));
        assert!(compare_documents(&doc, &doc).is_empty());
    }

    #[test]
    fn changed_and_new_fields_in_incoming_order() {
        let existing = record(json!({"id": "pkg1", "name": "Basic", "price": 100}));
        let incoming = record(json!({"tier": "gold", "id": "pkg1", "name": "Premium"}));

        let diffs = compare_documents(&existing, &incoming);
        assert_eq!(
            diffs,
            vec![
                FieldDiff { field: "tier".into(), old: Value::Null, new: json!("gold") },
                FieldDiff { field: "name".into(), old: json!("Basic"), new: json!("Premium") },
            ]
        );
    }

    #[test]
    fn storage_key_and_stored_only_fields_ignored() {
        let existing = record(json!({"_id": "abc", "id": "pkg1", "extra": true}));
        let incoming = record(json!({"_id": "xyz", "id": "pkg1"}));
        assert!(compare_documents(&existing, &incoming).is_empty());
    }

    #[test]
    fn representational_drift_is_not_a_change() {
        let existing = record(json!({"id": "pkg1", "minAge": 25, "rate": 1.0, "meta": {"a": 1, "b": 2}}));
        let incoming = record(json!({"id": "pkg1", "minAge": "25", "rate": 1, "meta": {"b": 2, "a": 1}}));
        assert!(compare_documents(&existing, &incoming).is_empty());
    }

    #[test]
    fn null_matches_only_null_text() {
        let existing = record(json!({"id": "pkg1", "note": null}));
        assert!(compare_documents(&existing, &record(json!({"note": null}))).is_empty());

        let diffs = compare_documents(&existing, &record(json!({"note": ""})));
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].old, Value::Null);
    }
}
