//! Document export and import.
//!
//! A document is the portable serialized form of a form instance's full
//! state: the main record's fields at the top level, the subform list under
//! [`RELS_KEY`], and identifying metadata (`exportTime`, `formKey`,
//! `formTitle`). Documents are schema-specific; importing one produced for a
//! different form is rejected outright, because silently loading it would
//! corrupt unrelated fields.

use chrono::{SecondsFormat, Utc};

use formwork_core::error::{FieldApplyError, FormworkError, FormworkResult};
use formwork_schema::catalog::SchemaCatalog;
use formwork_schema::value::FieldValue;

use crate::store::FormStore;

/// Document key holding the subform list.
pub const RELS_KEY: &str = "rels";

const EXPORT_TIME_KEY: &str = "exportTime";
const FORM_KEY_KEY: &str = "formKey";
const FORM_TITLE_KEY: &str = "formTitle";

/// Outcome of a completed import.
///
/// The import itself succeeded (the full replace ran); `warnings` lists the
/// document keys that could not be applied individually, for one summary
/// notice to the user.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Per-key apply failures, in document order.
    pub warnings: Vec<FieldApplyError>,
}

impl ImportReport {
    /// Returns `true` when every key applied cleanly.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Serializes the store's full state as a self-describing document.
pub fn export_document(store: &FormStore) -> serde_json::Value {
    let schema = store.schema();
    let mut document = match store.submission_payload() {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    document.insert(
        EXPORT_TIME_KEY.to_string(),
        serde_json::Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    document.insert(
        FORM_KEY_KEY.to_string(),
        serde_json::Value::String(schema.form_key.clone()),
    );
    document.insert(
        FORM_TITLE_KEY.to_string(),
        serde_json::Value::String(schema.form_title.clone()),
    );
    serde_json::Value::Object(document)
}

/// Imports a document, replacing the store's state.
///
/// 1. Parse failure aborts with [`FormworkError::Parse`] and no state
///    change.
/// 2. A `formKey` differing from the active schema's aborts with
///    [`FormworkError::SchemaMismatch`], naming both the active form's title
///    and the title of the form the document belongs to (resolved through
///    the catalog, "unknown" otherwise); state is left untouched.
/// 3. On a key match, each top-level key is validated individually and
///    failures collected, then the full load-from-document replace runs.
///    Per-key failures are cosmetic warnings in the returned
///    [`ImportReport`]; they never abort the import.
pub fn import_document(
    store: &mut FormStore,
    catalog: &SchemaCatalog,
    content: &str,
) -> FormworkResult<ImportReport> {
    let parsed: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| FormworkError::Parse(format!("invalid document: {e}")))?;
    let Some(document) = parsed.as_object() else {
        return Err(FormworkError::Parse(
            "document root must be a JSON object".to_string(),
        ));
    };

    let document_key = document
        .get(FORM_KEY_KEY)
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default();
    if document_key != store.schema().form_key {
        let document_title = catalog
            .title_for_key(document_key)
            .unwrap_or("unknown")
            .to_string();
        return Err(FormworkError::SchemaMismatch {
            active_title: store.schema().form_title.clone(),
            document_title,
        });
    }

    let mut report = ImportReport::default();
    for (key, value) in document {
        match key.as_str() {
            EXPORT_TIME_KEY | FORM_KEY_KEY | FORM_TITLE_KEY => {}
            RELS_KEY => {
                if !value.is_array() {
                    report.warnings.push(FieldApplyError::new(
                        key,
                        "expected an array of subform records",
                    ));
                }
            }
            name => {
                if store.schema().main_field(name).is_none() {
                    report
                        .warnings
                        .push(FieldApplyError::new(name, "no such field in the active form"));
                } else if let Err(reason) = FieldValue::from_json(value) {
                    report.warnings.push(FieldApplyError::new(name, reason));
                }
            }
        }
    }

    store.load_document(document);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwork_schema::descriptor::{BaseType, FieldDescriptor, FormSchema};
    use std::sync::Arc;

    fn schema() -> FormSchema {
        FormSchema::new("relationship_populator", "Relationship Set")
            .main_fields(vec![
                FieldDescriptor::new("base_name", BaseType::Text),
                FieldDescriptor::new("version", BaseType::Text).default_value("001"),
            ])
            .subform_fields(vec![FieldDescriptor::new("rel", BaseType::Text)])
    }

    fn catalog() -> SchemaCatalog {
        let mut catalog = SchemaCatalog::new();
        catalog.register(schema());
        catalog.register(FormSchema::new("code_set_populator", "Code Set Populator"));
        catalog
    }

    fn store() -> FormStore {
        FormStore::new(Arc::new(schema()))
    }

    #[test]
    fn test_export_shape() {
        let mut store = store();
        store.update_main("base_name", "X");
        store.add_subform();
        store.update_subform(0, "rel", "has color");

        let document = export_document(&store);
        assert_eq!(document["base_name"], serde_json::json!("X"));
        assert_eq!(document["rels"], serde_json::json!([{"rel": "has color"}]));
        assert_eq!(document["formKey"], serde_json::json!("relationship_populator"));
        assert_eq!(document["formTitle"], serde_json::json!("Relationship Set"));
        let stamp = document["exportTime"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
    }

    #[test]
    fn test_round_trip() {
        let mut original = store();
        original.update_main("base_name", "X");
        original.update_main("version", "007");
        original.add_subform();
        original.update_subform(0, "rel", "has color");
        original.add_subform();
        original.update_subform(1, "rel", "is part of");

        let exported = serde_json::to_string(&export_document(&original)).unwrap();

        let mut restored = store();
        let report = import_document(&mut restored, &catalog(), &exported).unwrap();
        assert!(report.is_clean());
        assert_eq!(restored.main(), original.main());
        assert_eq!(restored.subforms(), original.subforms());
    }

    #[test]
    fn test_parse_failure_leaves_state_unchanged() {
        let mut store = store();
        store.update_main("base_name", "keep");
        let before = store.main().clone();

        let err = import_document(&mut store, &catalog(), "{not json").unwrap_err();
        assert!(matches!(err, FormworkError::Parse(_)));
        assert_eq!(store.main(), &before);

        let err = import_document(&mut store, &catalog(), "[1, 2]").unwrap_err();
        assert!(matches!(err, FormworkError::Parse(_)));
        assert_eq!(store.main(), &before);
    }

    #[test]
    fn test_mismatched_key_rejected_with_both_titles() {
        let mut store = store();
        store.update_main("base_name", "keep");
        store.add_subform();
        let main_before = store.main().clone();
        let subforms_before = store.subforms().to_vec();

        let foreign = r#"{"formKey": "code_set_populator", "base_name": "intruder"}"#;
        let err = import_document(&mut store, &catalog(), foreign).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Relationship Set"));
        assert!(message.contains("Code Set Populator"));
        assert_eq!(store.main(), &main_before);
        assert_eq!(store.subforms(), subforms_before.as_slice());
    }

    #[test]
    fn test_unresolvable_key_reported_as_unknown() {
        let mut store = store();
        let foreign = r#"{"formKey": "never_heard_of_it"}"#;
        let err = import_document(&mut store, &catalog(), foreign).unwrap_err();
        assert!(err.to_string().contains("\"unknown\""));
    }

    #[test]
    fn test_per_key_failures_are_warnings_not_aborts() {
        let mut store = store();
        let document = r#"{
            "formKey": "relationship_populator",
            "base_name": "X",
            "stray_field": "dropped",
            "version": {"bad": "shape"},
            "rels": "not an array"
        }"#;
        let report = import_document(&mut store, &catalog(), document).unwrap();
        let failed_keys: Vec<_> = report.warnings.iter().map(|w| w.key.as_str()).collect();
        assert!(failed_keys.contains(&"stray_field"));
        assert!(failed_keys.contains(&"version"));
        assert!(failed_keys.contains(&"rels"));
        // The replace still ran: valid keys applied, invalid ones emptied.
        assert_eq!(
            store.main().get("base_name"),
            Some(&FieldValue::Text("X".into()))
        );
        assert_eq!(store.main().get("version"), Some(&FieldValue::empty()));
        assert_eq!(store.subform_count(), 0);
    }

    #[test]
    fn test_metadata_keys_never_warn() {
        let mut store = store();
        let document = r#"{
            "formKey": "relationship_populator",
            "formTitle": "Relationship Set",
            "exportTime": "2026-08-04T00:00:00.000Z",
            "rels": []
        }"#;
        let report = import_document(&mut store, &catalog(), document).unwrap();
        assert!(report.is_clean());
    }

    #[test]
    fn test_missing_main_fields_become_empty_after_import() {
        let mut store = store();
        store.update_main("version", "stale");
        let document = r#"{"formKey": "relationship_populator", "base_name": "X"}"#;
        import_document(&mut store, &catalog(), document).unwrap();
        assert_eq!(store.main().get("version"), Some(&FieldValue::empty()));
    }
}
