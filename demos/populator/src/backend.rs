//! An in-memory backend for the demo.
//!
//! Plays the part of the real job server: option lists, saved
//! configurations, and a submit endpoint that hands back a task id whose
//! status progresses to done over a few polls. Every response wears the
//! standard `{status, data}` envelope.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::json;

use formwork_client::remote::Transport;
use formwork_core::error::{FormworkError, FormworkResult};

pub struct DemoBackend {
    polls_until_done: Mutex<u32>,
}

impl DemoBackend {
    /// Creates a backend whose submitted task reports `done` after the
    /// given number of in-progress polls.
    pub fn new(polls_until_done: u32) -> Self {
        Self {
            polls_until_done: Mutex::new(polls_until_done),
        }
    }

    fn envelope(data: serde_json::Value) -> String {
        json!({ "status": "ok", "data": data }).to_string()
    }

    fn task_status(&self) -> String {
        let mut remaining = self
            .polls_until_done
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *remaining == 0 {
            Self::envelope(json!({ "done": true, "status": "finished" }))
        } else {
            *remaining -= 1;
            Self::envelope(json!({
                "done": false,
                "status": format!("running, {} step(s) left", *remaining + 1)
            }))
        }
    }

    fn saved_configuration() -> serde_json::Value {
        json!({
            "base_name": "colors_of_things",
            "code_selector_type": "code_set",
            "code_selector": "icd10_subset",
            "expansion_str_style": "clinical",
            "mode": "full_run",
            "test_term": "",
            "rels": [
                {
                    "rel": "has color",
                    "rel_prompt": "What color is the object?",
                    "required": true
                },
                {
                    "rel": "is made of",
                    "rel_prompt": "What material is the object made of?",
                    "required": false
                }
            ]
        })
    }
}

#[async_trait]
impl Transport for DemoBackend {
    async fn get(&self, url: &str) -> FormworkResult<String> {
        let path = url.split('?').next().unwrap_or(url);
        match path {
            "/get_code_set_names" => Ok(Self::envelope(json!(["icd10_subset", "labs_panel"]))),
            "/get_terminology_names" => Ok(Self::envelope(json!(["snomed", "loinc"]))),
            "/get_expansion_styles" => Ok(Self::envelope(json!({
                "a": { "label": "Clinical", "value": "clinical" },
                "b": { "label": "Casual", "value": "casual" }
            }))),
            "/get_rels_populator_orchestration_names" => Ok(Self::envelope(json!([
                { "id": "daily", "label": "Daily run" },
                "adhoc"
            ]))),
            "/get_rels_populator_orchestration_json" => {
                Ok(Self::envelope(Self::saved_configuration()))
            }
            "/get_task_status" => Ok(self.task_status()),
            _ => Err(FormworkError::Transport(format!("no such endpoint: {path}"))),
        }
    }

    async fn post(&self, url: &str, _body: String) -> FormworkResult<String> {
        match url {
            "/populate_rels" => Ok(Self::envelope(json!({ "task_id": "demo-task-1" }))),
            "/cancel_task" => Ok(Self::envelope(json!({ "cancelled": true }))),
            _ => Err(FormworkError::Transport(format!("no such endpoint: {url}"))),
        }
    }
}
