//! The value type stored in live form records.
//!
//! [`FieldValue`] is the universal representation of one field's current
//! value: a plain string for most field kinds, a boolean for checkboxes, or
//! an ordered list of strings for accumulator and multi-checkbox fields. It
//! serializes untagged, so documents read as plain JSON scalars and arrays.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The current value of a single form field.
///
/// The universal empty value is `Text("")`: fields are initialized to it
/// when they declare no default, dependent fields are cleared to it when
/// their controller changes, and document fields missing on import become it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A boolean value (checkbox fields).
    Flag(bool),
    /// An ordered list of strings (accumulator and multi-checkbox fields).
    Items(Vec<String>),
    /// A plain string (every other field kind).
    Text(String),
}

impl FieldValue {
    /// The universal empty value.
    pub const fn empty() -> Self {
        Self::Text(String::new())
    }

    /// Returns `true` for the empty string, `false`, and the empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Flag(flag) => !flag,
            Self::Items(items) => items.is_empty(),
            Self::Text(text) => text.is_empty(),
        }
    }

    /// Returns the string content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the boolean content, if this is a flag value.
    pub const fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Returns the list content, if this is an items value.
    pub fn as_items(&self) -> Option<&[String]> {
        match self {
            Self::Items(items) => Some(items),
            _ => None,
        }
    }

    /// The string key used when this value controls a dependent field.
    ///
    /// Dependent-field variant maps are keyed by strings, so non-text
    /// controller values are stringified.
    pub fn controller_key(&self) -> String {
        match self {
            Self::Flag(flag) => flag.to_string(),
            Self::Items(items) => items.join(","),
            Self::Text(text) => text.clone(),
        }
    }

    /// Coerces an arbitrary document value into a `FieldValue`.
    ///
    /// Scalars are accepted permissively (numbers become their string form,
    /// `null` becomes the empty value); arrays must contain scalars. Objects
    /// and nested arrays are rejected with a reason string.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, String> {
        use serde_json::Value;
        match value {
            Value::Null => Ok(Self::empty()),
            Value::Bool(flag) => Ok(Self::Flag(*flag)),
            Value::Number(number) => Ok(Self::Text(number.to_string())),
            Value::String(text) => Ok(Self::Text(text.clone())),
            Value::Array(entries) => {
                let mut items = Vec::with_capacity(entries.len());
                for entry in entries {
                    match entry {
                        Value::String(text) => items.push(text.clone()),
                        Value::Number(number) => items.push(number.to_string()),
                        Value::Bool(flag) => items.push(flag.to_string()),
                        _ => return Err("list entries must be scalars".to_string()),
                    }
                }
                Ok(Self::Items(items))
            }
            Value::Object(_) => Err("unsupported value shape".to_string()),
        }
    }

    /// Converts this value into its document JSON form.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Flag(flag) => serde_json::Value::Bool(*flag),
            Self::Items(items) => {
                serde_json::Value::Array(items.iter().cloned().map(Into::into).collect())
            }
            Self::Text(text) => serde_json::Value::String(text.clone()),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(flag) => write!(f, "{flag}"),
            Self::Items(items) => write!(f, "{}", items.join(", ")),
            Self::Text(text) => write!(f, "{text}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<bool> for FieldValue {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        Self::Items(items)
    }
}
