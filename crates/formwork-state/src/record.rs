//! One record of field values.
//!
//! A [`Record`] is the live value set for one field list: the main record of
//! a form, or one entry of the repeatable subform list. Its key set is
//! always exactly the declaring field list's name set; undeclared keys
//! cannot enter a record and declared keys cannot leave it.

use std::collections::HashMap;

use formwork_schema::descriptor::FieldDescriptor;
use formwork_schema::value::FieldValue;

/// A mapping from declared field names to their current values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    values: HashMap<String, FieldValue>,
}

impl Record {
    /// Builds a record with every declared field set to its default.
    pub fn from_defaults(fields: &[FieldDescriptor]) -> Self {
        Self {
            values: fields
                .iter()
                .map(|field| (field.name.clone(), field.default.clone()))
                .collect(),
        }
    }

    /// Rebuilds a record from a document object.
    ///
    /// Every declared field takes the document's value if present (coerced
    /// permissively), else the empty value. Undeclared document keys are
    /// ignored; uncoercible values fall back to empty.
    pub fn from_document(
        fields: &[FieldDescriptor],
        document: &serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            values: fields
                .iter()
                .map(|field| {
                    let value = document
                        .get(&field.name)
                        .map(|raw| FieldValue::from_json(raw).unwrap_or_else(|_| FieldValue::empty()))
                        .unwrap_or_else(FieldValue::empty);
                    (field.name.clone(), value)
                })
                .collect(),
        }
    }

    /// Returns a field's current value.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Sets a declared field's value.
    ///
    /// Returns `false` (and changes nothing) for an undeclared name, keeping
    /// the record's key set fixed.
    pub fn set(&mut self, name: &str, value: FieldValue) -> bool {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Resets a declared field to the empty value.
    pub fn clear(&mut self, name: &str) {
        self.set(name, FieldValue::empty());
    }

    /// Returns `true` when the record declares the field.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` for a record with no declared fields.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The underlying name-to-value map (the resolver's view of a record).
    pub fn values(&self) -> &HashMap<String, FieldValue> {
        &self.values
    }

    /// Serializes the record to a JSON object, iterating the declaring
    /// field list.
    pub fn to_json(&self, fields: &[FieldDescriptor]) -> serde_json::Map<String, serde_json::Value> {
        fields
            .iter()
            .map(|field| {
                let value = self
                    .values
                    .get(&field.name)
                    .map_or(serde_json::Value::String(String::new()), FieldValue::to_json);
                (field.name.clone(), value)
            })
            .collect()
    }
}
