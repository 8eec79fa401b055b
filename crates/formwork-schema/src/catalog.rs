//! The schema catalog.
//!
//! A [`SchemaCatalog`] holds every form schema a client knows about, keyed
//! by form key. Besides plain lookup, it resolves which form a foreign
//! document belongs to when an import is rejected for a key mismatch.

use std::collections::HashMap;
use std::sync::Arc;

use formwork_core::FormworkResult;

use crate::descriptor::FormSchema;

/// The registry of all known form schemas.
///
/// Registration order is preserved (it mirrors the order forms appear in a
/// client's navigation).
#[derive(Debug, Default)]
pub struct SchemaCatalog {
    schemas: Vec<Arc<FormSchema>>,
    by_key: HashMap<String, usize>,
}

impl SchemaCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema and returns a shared handle to it.
    ///
    /// # Panics
    ///
    /// Panics if a schema with the same form key is already registered.
    pub fn register(&mut self, schema: FormSchema) -> Arc<FormSchema> {
        assert!(
            !self.by_key.contains_key(&schema.form_key),
            "duplicate form key: {}",
            schema.form_key
        );
        let schema = Arc::new(schema);
        self.by_key
            .insert(schema.form_key.clone(), self.schemas.len());
        self.schemas.push(Arc::clone(&schema));
        schema
    }

    /// Looks up a schema by form key.
    pub fn get(&self, form_key: &str) -> Option<&Arc<FormSchema>> {
        self.by_key.get(form_key).map(|&index| &self.schemas[index])
    }

    /// Resolves the title of the form a key belongs to.
    pub fn title_for_key(&self, form_key: &str) -> Option<&str> {
        self.get(form_key).map(|schema| schema.form_title.as_str())
    }

    /// All registered schemas, in registration order.
    pub fn schemas(&self) -> &[Arc<FormSchema>] {
        &self.schemas
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns `true` when no schema is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Parses a catalog from a JSON array of schemas.
    pub fn from_json_str(content: &str) -> FormworkResult<Self> {
        let schemas: Vec<FormSchema> = serde_json::from_str(content)?;
        let mut catalog = Self::new();
        for schema in schemas {
            catalog.register(schema);
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut catalog = SchemaCatalog::new();
        catalog.register(FormSchema::new("terminology_populator", "Terminology Populator"));
        catalog.register(FormSchema::new("relationship_populator", "Relationship Set"));
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.get("relationship_populator").unwrap().form_title,
            "Relationship Set"
        );
        assert_eq!(
            catalog.title_for_key("terminology_populator"),
            Some("Terminology Populator")
        );
        assert_eq!(catalog.title_for_key("nope"), None);
    }

    #[test]
    #[should_panic(expected = "duplicate form key")]
    fn test_duplicate_key_panics() {
        let mut catalog = SchemaCatalog::new();
        catalog.register(FormSchema::new("k", "First"));
        catalog.register(FormSchema::new("k", "Second"));
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut catalog = SchemaCatalog::new();
        catalog.register(FormSchema::new("b", "B"));
        catalog.register(FormSchema::new("a", "A"));
        let titles: Vec<_> = catalog
            .schemas()
            .iter()
            .map(|schema| schema.form_title.as_str())
            .collect();
        assert_eq!(titles, vec!["B", "A"]);
    }

    #[test]
    fn test_from_json_str() {
        let catalog = SchemaCatalog::from_json_str(
            r#"[
                {"formKey": "a", "formTitle": "A"},
                {"formKey": "b", "formTitle": "B", "mainFields": [{"name": "x"}]}
            ]"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("b").unwrap().main_fields.len(), 1);
    }

    #[test]
    fn test_from_json_str_invalid() {
        assert!(SchemaCatalog::from_json_str("{}").is_err());
    }
}
