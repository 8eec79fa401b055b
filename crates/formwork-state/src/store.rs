//! The form state store.
//!
//! A [`FormStore`] owns everything a form instance's data amounts to: the
//! main record, the ordered subform list, and the presentation-only collapse
//! state. All mutations go through its operations, which keep the
//! dependency-consistency invariant: a dependent field's stored value is
//! cleared whenever its controlling field's value changes.

use std::collections::BTreeSet;
use std::sync::Arc;

use formwork_schema::descriptor::FormSchema;
use formwork_schema::value::FieldValue;

use crate::record::Record;

/// Live state of one form instance.
#[derive(Debug, Clone)]
pub struct FormStore {
    schema: Arc<FormSchema>,
    main: Record,
    subforms: Vec<Record>,
    collapsed: BTreeSet<usize>,
    main_collapsed: bool,
}

impl FormStore {
    /// Creates a store for the given schema, with the main record
    /// initialized from the schema's declared defaults and no subforms.
    pub fn new(schema: Arc<FormSchema>) -> Self {
        let main = Record::from_defaults(&schema.main_fields);
        Self {
            schema,
            main,
            subforms: Vec::new(),
            collapsed: BTreeSet::new(),
            main_collapsed: false,
        }
    }

    /// The schema this store was built from.
    pub fn schema(&self) -> &Arc<FormSchema> {
        &self.schema
    }

    /// The main record.
    pub fn main(&self) -> &Record {
        &self.main
    }

    /// The ordered subform list.
    pub fn subforms(&self) -> &[Record] {
        &self.subforms
    }

    /// Number of subform records.
    pub fn subform_count(&self) -> usize {
        self.subforms.len()
    }

    /// Sets a main field's value and clears every field whose options
    /// depend on it.
    ///
    /// Undeclared names are ignored. Fields unrelated to the dependency
    /// chain are never touched.
    pub fn update_main(&mut self, name: &str, value: impl Into<FieldValue>) {
        if !self.main.set(name, value.into()) {
            return;
        }
        let dependents: Vec<String> = self
            .schema
            .main_fields
            .iter()
            .filter(|field| field.depends_on() == Some(name) && field.name != name)
            .map(|field| field.name.clone())
            .collect();
        for dependent in dependents {
            self.main.clear(&dependent);
        }
    }

    /// Sets one subform record's field value. No-op when `index` is out of
    /// range or the name is undeclared.
    pub fn update_subform(&mut self, index: usize, name: &str, value: impl Into<FieldValue>) {
        if let Some(record) = self.subforms.get_mut(index) {
            record.set(name, value.into());
        }
    }

    /// Appends a fresh subform record built from the declared defaults.
    ///
    /// All pre-existing subforms and the main record are collapsed, leaving
    /// only the new entry expanded.
    pub fn add_subform(&mut self) {
        let existing = self.subforms.len();
        self.subforms
            .push(Record::from_defaults(&self.schema.subform_fields));
        self.collapsed = (0..existing).collect();
        self.main_collapsed = true;
    }

    /// Removes the subform at `index`. Silent no-op when out of range.
    ///
    /// The collapsed set is re-indexed: the deleted index is dropped and
    /// indices above it shift down by one.
    pub fn delete_subform(&mut self, index: usize) {
        if index >= self.subforms.len() {
            return;
        }
        self.subforms.remove(index);
        self.collapsed = self
            .collapsed
            .iter()
            .filter(|&&collapsed| collapsed != index)
            .map(|&collapsed| if collapsed > index { collapsed - 1 } else { collapsed })
            .collect();
    }

    /// Swaps the subform at `index` with its neighbor at `index + direction`
    /// (`direction` is `-1` or `+1`).
    ///
    /// The operation does not bounds-check; callers must keep both indices
    /// in range (the UI disables the move controls at the boundaries).
    ///
    /// # Panics
    ///
    /// Panics when `index` or `index + direction` is out of range.
    pub fn move_subform(&mut self, index: usize, direction: isize) {
        #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
        let target = (index as isize + direction) as usize;
        self.subforms.swap(index, target);
    }

    /// Toggles one subform's collapsed state.
    pub fn toggle_collapse(&mut self, index: usize) {
        if !self.collapsed.remove(&index) {
            self.collapsed.insert(index);
        }
    }

    /// Collapses every subform.
    pub fn collapse_all(&mut self) {
        self.collapsed = (0..self.subforms.len()).collect();
    }

    /// Expands every subform.
    pub fn expand_all(&mut self) {
        self.collapsed.clear();
    }

    /// Toggles the main record's collapsed state.
    pub fn toggle_main_collapse(&mut self) {
        self.main_collapsed = !self.main_collapsed;
    }

    /// Returns `true` when the subform at `index` is collapsed.
    pub fn is_collapsed(&self, index: usize) -> bool {
        self.collapsed.contains(&index)
    }

    /// The set of collapsed subform indices.
    pub fn collapsed(&self) -> &BTreeSet<usize> {
        &self.collapsed
    }

    /// Returns `true` when the main record is collapsed.
    pub const fn main_collapsed(&self) -> bool {
        self.main_collapsed
    }

    /// Replaces the whole form state from a parsed document.
    ///
    /// This is a full replace, not a merge: the main record is rebuilt from
    /// the document (declared fields missing from it become empty), the
    /// subform list is rebuilt from the document's `rels` array (each entry
    /// containing exactly the declared subform names), the collapsed set is
    /// cleared, and the main record is expanded.
    pub fn load_document(&mut self, document: &serde_json::Map<String, serde_json::Value>) {
        self.main = Record::from_document(&self.schema.main_fields, document);

        let empty = serde_json::Map::new();
        self.subforms = document
            .get(crate::document::RELS_KEY)
            .and_then(serde_json::Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| {
                        let object = entry.as_object().unwrap_or(&empty);
                        Record::from_document(&self.schema.subform_fields, object)
                    })
                    .collect()
            })
            .unwrap_or_default();

        self.collapsed.clear();
        self.main_collapsed = false;
    }

    /// Packages the current state as a submission payload:
    /// `{ ...main, rels: [subforms] }`.
    pub fn submission_payload(&self) -> serde_json::Value {
        let mut payload = self.main.to_json(&self.schema.main_fields);
        payload.insert(
            crate::document::RELS_KEY.to_string(),
            serde_json::Value::Array(
                self.subforms
                    .iter()
                    .map(|record| {
                        serde_json::Value::Object(record.to_json(&self.schema.subform_fields))
                    })
                    .collect(),
            ),
        );
        serde_json::Value::Object(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwork_schema::descriptor::{BaseType, DynamicOptions, FieldDescriptor, SourceVariant};
    use std::collections::HashMap;

    fn selector_schema() -> Arc<FormSchema> {
        let mut sources = HashMap::new();
        sources.insert(
            "terminology".to_string(),
            SourceVariant {
                base_type: Some(BaseType::Dropdown),
                options_url: Some("/terms".to_string()),
                options: None,
            },
        );
        sources.insert(
            "query".to_string(),
            SourceVariant {
                base_type: Some(BaseType::Textarea),
                options_url: None,
                options: None,
            },
        );
        Arc::new(
            FormSchema::new("relationship_populator", "Relationship Set")
                .main_fields(vec![
                    FieldDescriptor::new("base_name", BaseType::Text),
                    FieldDescriptor::new("code_selector_type", BaseType::Dropdown)
                        .options(vec!["code_set".into(), "terminology".into(), "query".into()])
                        .default_value("code_set"),
                    FieldDescriptor::new("code_selector", BaseType::Text).dynamic_options(
                        DynamicOptions {
                            depends_on: "code_selector_type".to_string(),
                            sources,
                            options_url_template: None,
                        },
                    ),
                ])
                .subform_fields(vec![
                    FieldDescriptor::new("rel", BaseType::Text),
                    FieldDescriptor::new("rel_prompt", BaseType::Textarea),
                ]),
        )
    }

    #[test]
    fn test_new_initializes_defaults() {
        let store = FormStore::new(selector_schema());
        assert_eq!(
            store.main().get("code_selector_type"),
            Some(&FieldValue::Text("code_set".into()))
        );
        assert_eq!(store.main().get("base_name"), Some(&FieldValue::empty()));
        assert_eq!(store.subform_count(), 0);
        assert!(!store.main_collapsed());
    }

    #[test]
    fn test_update_main_clears_dependents() {
        let mut store = FormStore::new(selector_schema());
        store.update_main("code_selector", "snomed");
        store.update_main("base_name", "my set");
        // Changing an unrelated field leaves the dependent alone.
        assert_eq!(
            store.main().get("code_selector"),
            Some(&FieldValue::Text("snomed".into()))
        );
        // Changing the controller clears the dependent, whatever it held.
        store.update_main("code_selector_type", "terminology");
        assert_eq!(store.main().get("code_selector"), Some(&FieldValue::empty()));
        assert_eq!(
            store.main().get("base_name"),
            Some(&FieldValue::Text("my set".into()))
        );
    }

    #[test]
    fn test_update_main_ignores_undeclared_names() {
        let mut store = FormStore::new(selector_schema());
        store.update_main("nonexistent", "x");
        assert!(!store.main().contains("nonexistent"));
    }

    #[test]
    fn test_add_subform_collapses_existing() {
        let mut store = FormStore::new(selector_schema());
        store.add_subform();
        assert_eq!(store.subform_count(), 1);
        assert!(store.main_collapsed());
        assert!(!store.is_collapsed(0));

        store.add_subform();
        assert_eq!(store.subform_count(), 2);
        // The first entry collapsed, the new one expanded.
        assert!(store.is_collapsed(0));
        assert!(!store.is_collapsed(1));
    }

    #[test]
    fn test_update_subform() {
        let mut store = FormStore::new(selector_schema());
        store.add_subform();
        store.update_subform(0, "rel", "has color");
        assert_eq!(
            store.subforms()[0].get("rel"),
            Some(&FieldValue::Text("has color".into()))
        );
        // Out-of-range and undeclared mutations are no-ops.
        store.update_subform(5, "rel", "ignored");
        store.update_subform(0, "undeclared", "ignored");
        assert_eq!(store.subform_count(), 1);
    }

    #[test]
    fn test_delete_subform_reindexes_collapsed() {
        let mut store = FormStore::new(selector_schema());
        for _ in 0..4 {
            store.add_subform();
        }
        store.expand_all();
        store.toggle_collapse(1);
        store.toggle_collapse(3);

        store.delete_subform(1);
        assert_eq!(store.subform_count(), 3);
        // Index 1 dropped; index 3 shifted down to 2.
        assert!(!store.is_collapsed(1));
        assert!(store.is_collapsed(2));
        assert!(store.collapsed().iter().all(|&i| i < store.subform_count()));
    }

    #[test]
    fn test_delete_subform_out_of_range_is_noop() {
        let mut store = FormStore::new(selector_schema());
        store.add_subform();
        store.delete_subform(7);
        assert_eq!(store.subform_count(), 1);
    }

    #[test]
    fn test_move_subform_preserves_order_meaning() {
        let mut store = FormStore::new(selector_schema());
        for name in ["first", "second", "third"] {
            store.add_subform();
            let index = store.subform_count() - 1;
            store.update_subform(index, "rel", name);
        }
        store.move_subform(2, -1);
        store.move_subform(0, 1);
        let order: Vec<_> = store
            .subforms()
            .iter()
            .map(|record| record.get("rel").unwrap().to_string())
            .collect();
        assert_eq!(order, vec!["third", "first", "second"]);
    }

    #[test]
    fn test_collapse_operations() {
        let mut store = FormStore::new(selector_schema());
        store.add_subform();
        store.add_subform();
        store.collapse_all();
        assert!(store.is_collapsed(0) && store.is_collapsed(1));
        store.expand_all();
        assert!(!store.is_collapsed(0) && !store.is_collapsed(1));
        store.toggle_collapse(0);
        assert!(store.is_collapsed(0));
        store.toggle_collapse(0);
        assert!(!store.is_collapsed(0));
        let was = store.main_collapsed();
        store.toggle_main_collapse();
        assert_eq!(store.main_collapsed(), !was);
    }

    #[test]
    fn test_load_document_full_replace() {
        let mut store = FormStore::new(selector_schema());
        store.update_main("base_name", "stale");
        store.add_subform();
        store.toggle_collapse(0);

        let document = serde_json::json!({
            "base_name": "fresh",
            "rels": [
                {"rel": "has color", "stray": "dropped"},
                {"rel_prompt": "What color is it?"}
            ]
        });
        store.load_document(document.as_object().unwrap());

        assert_eq!(
            store.main().get("base_name"),
            Some(&FieldValue::Text("fresh".into()))
        );
        // Declared fields missing from the document become empty.
        assert_eq!(
            store.main().get("code_selector_type"),
            Some(&FieldValue::empty())
        );
        assert_eq!(store.subform_count(), 2);
        assert_eq!(
            store.subforms()[0].get("rel"),
            Some(&FieldValue::Text("has color".into()))
        );
        assert!(!store.subforms()[0].contains("stray"));
        assert_eq!(store.subforms()[1].get("rel"), Some(&FieldValue::empty()));
        assert!(store.collapsed().is_empty());
        assert!(!store.main_collapsed());
    }

    #[test]
    fn test_submission_payload_shape() {
        let mut store = FormStore::new(selector_schema());
        store.update_main("base_name", "X");
        store.add_subform();
        store.update_subform(0, "rel", "has color");

        let payload = store.submission_payload();
        assert_eq!(payload["base_name"], serde_json::json!("X"));
        assert_eq!(payload["rels"][0]["rel"], serde_json::json!("has color"));
        assert_eq!(payload["rels"][0]["rel_prompt"], serde_json::json!(""));
        assert_eq!(payload["rels"].as_array().unwrap().len(), 1);
    }
}
