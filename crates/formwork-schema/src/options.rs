//! Option lists and the dynamic option cache.
//!
//! Servers answer option requests in more than one shape: a plain array of
//! strings, an array of `{label, value}` objects, or a key-value map whose
//! values are the options. [`OptionsPayload`] decodes whatever arrives once,
//! at the network boundary, so the rest of the engine only ever sees a flat
//! `Vec<OptionItem>`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One entry of an option list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionItem {
    /// An option with distinct display label and stored value.
    Labeled {
        /// Display label.
        label: String,
        /// Stored value.
        value: String,
    },
    /// An option whose label and value are the same string.
    Plain(String),
}

impl OptionItem {
    /// Creates a labeled option.
    pub fn labeled(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Labeled {
            label: label.into(),
            value: value.into(),
        }
    }

    /// The stored value of this option.
    pub fn value(&self) -> &str {
        match self {
            Self::Labeled { value, .. } => value,
            Self::Plain(value) => value,
        }
    }

    /// The display label of this option.
    pub fn label(&self) -> &str {
        match self {
            Self::Labeled { label, .. } => label,
            Self::Plain(value) => value,
        }
    }

    /// Normalizes one raw JSON entry into an option.
    ///
    /// Strings and numbers become plain options; objects with string or
    /// numeric `label` and `value` become labeled options. Anything else is
    /// dropped (`None`).
    fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;
        match value {
            Value::String(text) => Some(Self::Plain(text.clone())),
            Value::Number(number) => Some(Self::Plain(number.to_string())),
            Value::Object(object) => {
                let label = scalar_string(object.get("label")?)?;
                let value = scalar_string(object.get("value")?)?;
                Some(Self::Labeled { label, value })
            }
            _ => None,
        }
    }
}

impl From<&str> for OptionItem {
    fn from(value: &str) -> Self {
        Self::Plain(value.to_string())
    }
}

fn scalar_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// The raw shape of a server option payload, decoded once at the network
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsPayload {
    /// The server answered with an option array; order is preserved.
    List(Vec<OptionItem>),
    /// The server answered with a key-value map; only the values are
    /// options, in the map's own (unspecified) order.
    Map(Vec<(String, OptionItem)>),
}

impl OptionsPayload {
    /// Decodes a server payload permissively.
    ///
    /// Invalid entries are dropped rather than failing the whole payload;
    /// a scalar payload decodes to an empty list.
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Array(entries) => {
                Self::List(entries.iter().filter_map(OptionItem::from_json).collect())
            }
            Value::Object(object) => Self::Map(
                object
                    .iter()
                    .filter_map(|(key, entry)| {
                        OptionItem::from_json(entry).map(|option| (key.clone(), option))
                    })
                    .collect(),
            ),
            _ => Self::List(Vec::new()),
        }
    }

    /// Collapses the payload to a flat option list.
    pub fn into_options(self) -> Vec<OptionItem> {
        match self {
            Self::List(options) => options,
            Self::Map(entries) => entries.into_iter().map(|(_, option)| option).collect(),
        }
    }
}

/// Cache of remotely-fetched option lists.
///
/// Keyed by field name, then by the controlling field's value at fetch time
/// (the empty string for fields whose `optionsUrl` does not depend on a
/// controller). Slots are written once and never invalidated for the life
/// of the form instance.
#[derive(Debug, Default)]
pub struct OptionCache {
    entries: HashMap<String, HashMap<String, Vec<OptionItem>>>,
}

impl OptionCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached options for a `(field, controller value)` slot.
    pub fn get(&self, field: &str, controller: &str) -> Option<&[OptionItem]> {
        self.entries
            .get(field)
            .and_then(|slots| slots.get(controller))
            .map(Vec::as_slice)
    }

    /// Returns `true` when the slot has been filled.
    pub fn contains(&self, field: &str, controller: &str) -> bool {
        self.get(field, controller).is_some()
    }

    /// Fills a slot. The first write wins; a filled slot is never replaced.
    pub fn insert(&mut self, field: &str, controller: &str, options: Vec<OptionItem>) {
        self.entries
            .entry(field.to_string())
            .or_default()
            .entry(controller.to_string())
            .or_insert(options);
    }
}
