//! Dependent-field resolution.
//!
//! A field's effective type, option list, and visibility can all depend on
//! another field's current value. This module resolves a [`FieldDescriptor`]
//! against the main record's values into one concrete [`ResolvedField`] per
//! render, so callers never re-derive type or options ad hoc.
//!
//! Controller lookups are always against the *main* record, including for
//! subform fields.

use std::collections::HashMap;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::descriptor::{BaseType, FieldDescriptor};
use crate::options::{OptionCache, OptionItem};
use crate::value::FieldValue;

/// The main record's current values, as the resolver sees them.
pub type MainValues = HashMap<String, FieldValue>;

/// A field resolved against the current main-record values: the concrete
/// variant one render pass works from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    /// The effective field kind for this render.
    pub base_type: BaseType,
    /// The effective option list for this render.
    pub options: Vec<OptionItem>,
    /// Whether the field is visible for this render.
    pub visible: bool,
}

/// A pending remote option fetch: the endpoint to read and the cache slot
/// the decoded options belong in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsRequest {
    /// Endpoint to fetch the option list from.
    pub url: String,
    /// Controller value the fetched options are cached under (empty for
    /// non-dependent fields).
    pub slot: String,
}

fn controller_value(main: &MainValues, name: &str) -> String {
    main.get(name).map(FieldValue::controller_key).unwrap_or_default()
}

/// Resolves the field's effective type.
///
/// A `typeWhen` rule wins, falling back to the declared type on an unmatched
/// controller value; otherwise a dependent-options variant may override the
/// type; otherwise the declared type stands.
pub fn effective_type(field: &FieldDescriptor, main: &MainValues) -> BaseType {
    if let Some(rule) = &field.type_when {
        let controller = controller_value(main, &rule.field);
        return rule.cases.get(&controller).copied().unwrap_or(field.base_type);
    }
    if let Some(dynamic) = &field.dynamic_options {
        let controller = controller_value(main, &dynamic.depends_on);
        if let Some(kind) = dynamic
            .sources
            .get(&controller)
            .and_then(|variant| variant.base_type)
        {
            return kind;
        }
    }
    field.base_type
}

/// Resolves the field's effective option list.
///
/// A filled cache slot is returned verbatim; otherwise the matched variant's
/// static options, then the field's own static options, then empty.
pub fn effective_options(
    field: &FieldDescriptor,
    main: &MainValues,
    cache: &OptionCache,
) -> Vec<OptionItem> {
    let controller = field
        .dynamic_options
        .as_ref()
        .map(|dynamic| controller_value(main, &dynamic.depends_on))
        .unwrap_or_default();

    if let Some(cached) = cache.get(&field.name, &controller) {
        return cached.to_vec();
    }

    if let Some(variant) = field
        .dynamic_options
        .as_ref()
        .and_then(|dynamic| dynamic.sources.get(&controller))
    {
        if let Some(options) = &variant.options {
            return options.clone();
        }
    }

    field.options.clone().unwrap_or_default()
}

/// Resolves the remote fetch (if any) the field's options come from right
/// now.
///
/// For a dependent field the matched variant's `optionsUrl` wins, then the
/// `optionsUrlTemplate` with `{value}` replaced by the percent-encoded
/// controller value; a dependent field with neither needs no fetch. A
/// non-dependent field uses its own `optionsUrl`, cached under the empty
/// controller slot.
pub fn options_request(field: &FieldDescriptor, main: &MainValues) -> Option<OptionsRequest> {
    if let Some(dynamic) = &field.dynamic_options {
        let controller = controller_value(main, &dynamic.depends_on);
        if let Some(url) = dynamic
            .sources
            .get(&controller)
            .and_then(|variant| variant.options_url.clone())
        {
            return Some(OptionsRequest {
                url,
                slot: controller,
            });
        }
        if let Some(template) = &dynamic.options_url_template {
            let encoded = utf8_percent_encode(&controller, NON_ALPHANUMERIC).to_string();
            return Some(OptionsRequest {
                url: template.replace("{value}", &encoded),
                slot: controller,
            });
        }
        return None;
    }
    field.options_url.as_ref().map(|url| OptionsRequest {
        url: url.clone(),
        slot: String::new(),
    })
}

/// Resolves the field's visibility.
///
/// No `showWhen` means always visible; `value` means equality with the
/// controller's value; `values` means membership.
pub fn is_visible(field: &FieldDescriptor, main: &MainValues) -> bool {
    let Some(rule) = &field.show_when else {
        return true;
    };
    let actual = controller_value(main, &rule.field);
    if let Some(value) = &rule.value {
        return actual == *value;
    }
    if let Some(values) = &rule.values {
        return values.contains(&actual);
    }
    true
}

/// Resolves the field completely for one render pass.
pub fn resolve(field: &FieldDescriptor, main: &MainValues, cache: &OptionCache) -> ResolvedField {
    ResolvedField {
        base_type: effective_type(field, main),
        options: effective_options(field, main, cache),
        visible: is_visible(field, main),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DynamicOptions, ShowWhen, SourceVariant, TypeWhen};

    fn selector_field() -> FieldDescriptor {
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
            "code_set".to_string(),
            SourceVariant {
                base_type: Some(BaseType::Dropdown),
                options_url: Some("/sets".to_string()),
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
        FieldDescriptor::new("code_selector", BaseType::Text).dynamic_options(DynamicOptions {
            depends_on: "code_selector_type".to_string(),
            sources,
            options_url_template: None,
        })
    }

    fn main_with(name: &str, value: &str) -> MainValues {
        let mut main = MainValues::new();
        main.insert(name.to_string(), FieldValue::Text(value.to_string()));
        main
    }

    #[test]
    fn test_effective_type_follows_controller() {
        let field = selector_field();
        let main = main_with("code_selector_type", "query");
        assert_eq!(effective_type(&field, &main), BaseType::Textarea);
        let main = main_with("code_selector_type", "terminology");
        assert_eq!(effective_type(&field, &main), BaseType::Dropdown);
    }

    #[test]
    fn test_effective_type_falls_back_on_unmatched_controller() {
        let field = selector_field();
        let main = main_with("code_selector_type", "something_else");
        assert_eq!(effective_type(&field, &main), BaseType::Text);
        assert_eq!(effective_type(&field, &MainValues::new()), BaseType::Text);
    }

    #[test]
    fn test_type_when_wins_over_dynamic_variant() {
        let mut cases = HashMap::new();
        cases.insert("advanced".to_string(), BaseType::Textarea);
        let field = selector_field().type_when(TypeWhen {
            field: "mode".to_string(),
            cases,
        });
        let mut main = main_with("code_selector_type", "terminology");
        main.insert("mode".to_string(), FieldValue::Text("advanced".into()));
        assert_eq!(effective_type(&field, &main), BaseType::Textarea);
        // Unmatched typeWhen controller falls back to the declared type,
        // not to the dynamic variant's override.
        main.insert("mode".to_string(), FieldValue::Text("simple".into()));
        assert_eq!(effective_type(&field, &main), BaseType::Text);
    }

    #[test]
    fn test_effective_options_prefers_cache() {
        let field = selector_field();
        let main = main_with("code_selector_type", "terminology");
        let mut cache = OptionCache::new();
        assert!(effective_options(&field, &main, &cache).is_empty());

        cache.insert("code_selector", "terminology", vec!["snomed".into()]);
        assert_eq!(
            effective_options(&field, &main, &cache),
            vec![OptionItem::Plain("snomed".into())]
        );
        // A different controller value has its own slot.
        let main = main_with("code_selector_type", "code_set");
        assert!(effective_options(&field, &main, &cache).is_empty());
    }

    #[test]
    fn test_effective_options_variant_statics_then_field_statics() {
        let mut sources = HashMap::new();
        sources.insert(
            "fancy".to_string(),
            SourceVariant {
                base_type: None,
                options_url: None,
                options: Some(vec!["v1".into(), "v2".into()]),
            },
        );
        let field = FieldDescriptor::new("style", BaseType::Dropdown)
            .options(vec!["plain".into()])
            .dynamic_options(DynamicOptions {
                depends_on: "mode".to_string(),
                sources,
                options_url_template: None,
            });
        let cache = OptionCache::new();
        let main = main_with("mode", "fancy");
        assert_eq!(
            effective_options(&field, &main, &cache),
            vec![OptionItem::Plain("v1".into()), OptionItem::Plain("v2".into())]
        );
        let main = main_with("mode", "other");
        assert_eq!(
            effective_options(&field, &main, &cache),
            vec![OptionItem::Plain("plain".into())]
        );
    }

    #[test]
    fn test_options_request_variant_url() {
        let field = selector_field();
        let main = main_with("code_selector_type", "code_set");
        let request = options_request(&field, &main).unwrap();
        assert_eq!(request.url, "/sets");
        assert_eq!(request.slot, "code_set");
        // The query variant declares no url: nothing to fetch.
        let main = main_with("code_selector_type", "query");
        assert!(options_request(&field, &main).is_none());
    }

    #[test]
    fn test_options_request_template_substitution() {
        let field = FieldDescriptor::new("match_from_rel", BaseType::Dropdown).dynamic_options(
            DynamicOptions {
                depends_on: "match_from_rel_populator_id".to_string(),
                sources: HashMap::new(),
                options_url_template: Some("/get_rels_of_rel_populator/{value}".to_string()),
            },
        );
        let main = main_with("match_from_rel_populator_id", "pop 7/a");
        let request = options_request(&field, &main).unwrap();
        assert_eq!(request.url, "/get_rels_of_rel_populator/pop%207%2Fa");
        assert_eq!(request.slot, "pop 7/a");
    }

    #[test]
    fn test_options_request_static_url_uses_empty_slot() {
        let field =
            FieldDescriptor::new("expansion_str_style", BaseType::Dropdown).options_url("/styles");
        let request = options_request(&field, &MainValues::new()).unwrap();
        assert_eq!(request.url, "/styles");
        assert_eq!(request.slot, "");
    }

    #[test]
    fn test_visibility_single_value() {
        let field = FieldDescriptor::new("test_term", BaseType::Textarea).show_when(ShowWhen {
            field: "mode".to_string(),
            value: Some("see_obj_and_resp".to_string()),
            values: None,
        });
        assert!(is_visible(&field, &main_with("mode", "see_obj_and_resp")));
        assert!(!is_visible(&field, &main_with("mode", "full_run")));
        assert!(!is_visible(&field, &MainValues::new()));
    }

    #[test]
    fn test_visibility_value_set() {
        let field = FieldDescriptor::new("test_term", BaseType::Textarea).show_when(ShowWhen {
            field: "mode".to_string(),
            value: None,
            values: Some(vec!["see_obj_only".to_string(), "see_obj_and_resp".to_string()]),
        });
        assert!(is_visible(&field, &main_with("mode", "see_obj_only")));
        assert!(!is_visible(&field, &main_with("mode", "full_run")));
    }

    #[test]
    fn test_visibility_without_rule() {
        let field = FieldDescriptor::new("notes", BaseType::Textarea);
        assert!(is_visible(&field, &MainValues::new()));
    }

    #[test]
    fn test_resolve_produces_one_concrete_variant() {
        let field = selector_field();
        let mut cache = OptionCache::new();
        cache.insert("code_selector", "terminology", vec!["snomed".into()]);
        let main = main_with("code_selector_type", "terminology");
        let resolved = resolve(&field, &main, &cache);
        assert_eq!(resolved.base_type, BaseType::Dropdown);
        assert_eq!(resolved.options, vec![OptionItem::Plain("snomed".into())]);
        assert!(resolved.visible);
    }
}
