//! Field descriptors and form schemas.
//!
//! A [`FieldDescriptor`] describes a single form field as loaded from the
//! declarative configuration: its base type, default, help text, static or
//! remote option sources, and the rules that make its type, options, or
//! visibility depend on another field's current value. A [`FormSchema`]
//! groups the descriptors of one form (main fields plus an optional
//! repeatable subform group) together with its identity and endpoints.
//!
//! Descriptors are immutable once a schema is loaded. The wire names match
//! the original declarative configuration (camelCase, with `type` for the
//! base type).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use formwork_core::FormworkResult;

use crate::options::OptionItem;
use crate::value::FieldValue;

/// Name of the synthetic saved-configuration selector pseudo-field.
///
/// It is rendered above the main fields when a form declares a
/// `configListUrl`, but it is never part of the main record, the submission
/// payload, or an exported document.
pub const CONFIG_SELECTOR_FIELD: &str = "__config_selector__";

/// The closed set of field kinds.
///
/// A field's *declared* base type may be overridden per render by a
/// [`TypeWhen`] rule or a dependent-options variant; see
/// [`resolver::effective_type`](crate::resolver::effective_type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseType {
    /// Single-line text input.
    Text,
    /// Multi-line text input.
    Textarea,
    /// Single-choice dropdown.
    Dropdown,
    /// Boolean checkbox.
    Checkbox,
    /// Single-choice radio group.
    Radio,
    /// Multiple-choice checkbox group.
    Multicheckbox,
    /// Dual-list accumulator (ordered multi-select).
    Accumulator,
    /// Static display text, not editable.
    Plaintext,
}

impl BaseType {
    /// Returns `true` for kinds whose value is an ordered list of strings.
    pub const fn is_list_valued(self) -> bool {
        matches!(self, Self::Multicheckbox | Self::Accumulator)
    }
}

/// One variant of a dependent-options rule, selected by the controlling
/// field's current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceVariant {
    /// Overrides the field's base type while this variant is selected.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<BaseType>,
    /// Endpoint the variant's option list is fetched from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options_url: Option<String>,
    /// Statically declared option list for this variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<OptionItem>>,
}

/// Makes a field's options (and possibly its type) depend on another
/// field's current value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicOptions {
    /// Name of the controlling field (always looked up in the main record).
    pub depends_on: String,
    /// Variants keyed by the controller's value.
    #[serde(default)]
    pub sources: HashMap<String, SourceVariant>,
    /// Endpoint template with a `{value}` placeholder for the controller's
    /// value, used when the matched variant declares no `optionsUrl`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options_url_template: Option<String>,
}

/// Overrides a field's base type by another field's value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeWhen {
    /// Name of the controlling field.
    pub field: String,
    /// Controller value to base type; unmatched values fall back to the
    /// field's declared base type.
    #[serde(default)]
    pub cases: HashMap<String, BaseType>,
}

/// Shows a field only when another field holds a given value (or one of a
/// given set of values).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowWhen {
    /// Name of the controlling field.
    pub field: String,
    /// Show when the controller equals exactly this value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Show when the controller's value is a member of this set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

/// Complete declarative description of a single form field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Unique field name (the record key).
    pub name: String,
    /// Human-readable label.
    #[serde(default)]
    pub label: String,
    /// Declared base type. Defaults to [`BaseType::Text`].
    #[serde(rename = "type", default = "default_base_type")]
    pub base_type: BaseType,
    /// Default value a fresh record starts with.
    #[serde(default)]
    pub default: FieldValue,
    /// Help text displayed alongside the field.
    #[serde(default)]
    pub help: String,
    /// Statically declared option list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<OptionItem>>,
    /// Endpoint the option list is fetched from (lazily, cached forever).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options_url: Option<String>,
    /// Dependent-options rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_options: Option<DynamicOptions>,
    /// Type-override rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_when: Option<TypeWhen>,
    /// Visibility rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_when: Option<ShowWhen>,
}

const fn default_base_type() -> BaseType {
    BaseType::Text
}

impl FieldDescriptor {
    /// Creates a descriptor with the given name and base type.
    ///
    /// The label defaults to the name with underscores replaced by spaces.
    pub fn new(name: impl Into<String>, base_type: BaseType) -> Self {
        let name = name.into();
        let label = name.replace('_', " ");
        Self {
            name,
            label,
            base_type,
            default: FieldValue::empty(),
            help: String::new(),
            options: None,
            options_url: None,
            dynamic_options: None,
            type_when: None,
            show_when: None,
        }
    }

    /// Sets the label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the default value.
    pub fn default_value(mut self, default: impl Into<FieldValue>) -> Self {
        self.default = default.into();
        self
    }

    /// Sets the help text.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Sets a static option list.
    pub fn options(mut self, options: Vec<OptionItem>) -> Self {
        self.options = Some(options);
        self
    }

    /// Sets the endpoint the option list is fetched from.
    pub fn options_url(mut self, url: impl Into<String>) -> Self {
        self.options_url = Some(url.into());
        self
    }

    /// Sets a dependent-options rule.
    pub fn dynamic_options(mut self, dynamic: DynamicOptions) -> Self {
        self.dynamic_options = Some(dynamic);
        self
    }

    /// Sets a type-override rule.
    pub fn type_when(mut self, rule: TypeWhen) -> Self {
        self.type_when = Some(rule);
        self
    }

    /// Sets a visibility rule.
    pub fn show_when(mut self, rule: ShowWhen) -> Self {
        self.show_when = Some(rule);
        self
    }

    /// Returns the name of the field this one's options depend on, if any.
    pub fn depends_on(&self) -> Option<&str> {
        self.dynamic_options
            .as_ref()
            .map(|dynamic| dynamic.depends_on.as_str())
    }
}

/// The declarative description of one whole form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    /// Identity used to reject mismatched document imports.
    pub form_key: String,
    /// Human-readable form title; also names exported documents.
    pub form_title: String,
    /// Ordered main-record fields.
    #[serde(default)]
    pub main_fields: Vec<FieldDescriptor>,
    /// Ordered subform-record fields; empty when the form has no
    /// repeatable group.
    #[serde(default)]
    pub subform_fields: Vec<FieldDescriptor>,
    /// Endpoint listing saved configurations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_list_url: Option<String>,
    /// Endpoint loading one saved configuration's document by id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_load_url: Option<String>,
    /// Endpoint the filled form is submitted to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_url: Option<String>,
}

impl FormSchema {
    /// Creates an empty schema with the given identity.
    pub fn new(form_key: impl Into<String>, form_title: impl Into<String>) -> Self {
        Self {
            form_key: form_key.into(),
            form_title: form_title.into(),
            main_fields: Vec::new(),
            subform_fields: Vec::new(),
            config_list_url: None,
            config_load_url: None,
            submit_url: None,
        }
    }

    /// Sets the main fields.
    pub fn main_fields(mut self, fields: Vec<FieldDescriptor>) -> Self {
        self.main_fields = fields;
        self
    }

    /// Sets the subform fields.
    pub fn subform_fields(mut self, fields: Vec<FieldDescriptor>) -> Self {
        self.subform_fields = fields;
        self
    }

    /// Sets the saved-configuration list endpoint.
    pub fn config_list_url(mut self, url: impl Into<String>) -> Self {
        self.config_list_url = Some(url.into());
        self
    }

    /// Sets the saved-configuration load endpoint.
    pub fn config_load_url(mut self, url: impl Into<String>) -> Self {
        self.config_load_url = Some(url.into());
        self
    }

    /// Sets the submit endpoint.
    pub fn submit_url(mut self, url: impl Into<String>) -> Self {
        self.submit_url = Some(url.into());
        self
    }

    /// Looks up a main field by name.
    pub fn main_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.main_fields.iter().find(|field| field.name == name)
    }

    /// Looks up a subform field by name.
    pub fn subform_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.subform_fields.iter().find(|field| field.name == name)
    }

    /// Returns `true` when the form declares a repeatable subform group.
    pub fn has_subforms(&self) -> bool {
        !self.subform_fields.is_empty()
    }

    /// The suggested filename for an exported document.
    pub fn export_file_name(&self) -> String {
        if self.form_title.is_empty() {
            "form.json".to_string()
        } else {
            format!("{}.json", self.form_title)
        }
    }

    /// Parses a schema from its JSON configuration form.
    pub fn from_json_str(content: &str) -> FormworkResult<Self> {
        Ok(serde_json::from_str(content)?)
    }
}
