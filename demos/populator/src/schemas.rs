//! The demo form catalog.
//!
//! Two schemas in the shape a real deployment would load from its
//! declarative configuration: a relationship populator with dependent
//! fields and a repeatable group, and a smaller code-set populator that
//! exists mainly so a foreign-document import has something to be
//! rejected against.

use formwork_schema::catalog::SchemaCatalog;
use formwork_schema::descriptor::FormSchema;

const RELATIONSHIP_POPULATOR: &str = r#"{
    "formKey": "relationship_populator",
    "formTitle": "Relationship Set",
    "configListUrl": "/get_rels_populator_orchestration_names",
    "configLoadUrl": "/get_rels_populator_orchestration_json",
    "submitUrl": "/populate_rels",
    "mainFields": [
        {
            "name": "base_name",
            "label": "Base Name",
            "type": "text",
            "help": "Prefix for the generated relationship sets"
        },
        {
            "name": "code_selector_type",
            "label": "Code Selector Type",
            "type": "dropdown",
            "options": ["code_set", "terminology", "query"],
            "default": "code_set"
        },
        {
            "name": "code_selector",
            "label": "Code Selector",
            "dynamicOptions": {
                "dependsOn": "code_selector_type",
                "sources": {
                    "code_set": { "type": "dropdown", "optionsUrl": "/get_code_set_names" },
                    "terminology": { "type": "dropdown", "optionsUrl": "/get_terminology_names" },
                    "query": { "type": "textarea" }
                }
            }
        },
        {
            "name": "expansion_str_style",
            "label": "Expansion Style",
            "type": "dropdown",
            "optionsUrl": "/get_expansion_styles"
        },
        {
            "name": "mode",
            "label": "Mode",
            "type": "radio",
            "options": ["full_run", "see_obj_only", "see_obj_and_resp"],
            "default": "full_run"
        },
        {
            "name": "test_term",
            "label": "Test Term",
            "type": "textarea",
            "help": "Term to dry-run against before a full run",
            "showWhen": { "field": "mode", "values": ["see_obj_only", "see_obj_and_resp"] }
        }
    ],
    "subformFields": [
        { "name": "rel", "label": "Relationship", "type": "text" },
        { "name": "rel_prompt", "label": "Prompt", "type": "textarea" },
        { "name": "required", "label": "Required", "type": "checkbox" }
    ]
}"#;

const CODE_SET_POPULATOR: &str = r#"{
    "formKey": "code_set_populator",
    "formTitle": "Code Set Populator",
    "submitUrl": "/populate_code_set",
    "mainFields": [
        { "name": "code_set_name", "label": "Code Set Name", "type": "text" },
        { "name": "seed_codes", "label": "Seed Codes", "type": "accumulator" }
    ]
}"#;

/// Builds the catalog of every form the demo client knows about.
pub fn demo_catalog() -> SchemaCatalog {
    let mut catalog = SchemaCatalog::new();
    catalog.register(FormSchema::from_json_str(RELATIONSHIP_POPULATOR).unwrap());
    catalog.register(FormSchema::from_json_str(CODE_SET_POPULATOR).unwrap());
    catalog
}
