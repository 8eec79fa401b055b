//! # formwork Relationship Populator Demo
//!
//! A working client demonstrating the formwork engine pipeline:
//!
//! - **Schemas**: a catalog of declarative form configurations
//! - **Dependent fields**: a selector whose kind and options follow another
//!   field's value, with lazy option fetching
//! - **Subforms**: the ordered repeatable relationship group
//! - **Documents**: export, re-import, and foreign-document rejection
//! - **Saved configurations**: listing and loading from the backend
//! - **Submission**: a background task polled to completion, with the
//!   session event stream the embedding UI would subscribe to
//!
//! ## Running
//!
//! ```bash
//! cargo run --package populator-demo
//! ```
//!
//! The backend is played by an in-memory transport; everything else is the
//! real engine.

mod backend;
mod schemas;

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use formwork_client::events::SessionEvent;
use formwork_client::session::{FormSession, SubmitOutcome};
use formwork_core::logging::setup_logging;
use formwork_core::settings::{Settings, SETTINGS};
use formwork_core::settings_loader;

#[tokio::main]
async fn main() {
    // Load settings - try TOML first, fall back to demo-friendly defaults
    // (a one-second poll interval instead of the production fifteen).
    let settings = if std::path::Path::new("populator.toml").exists() {
        settings_loader::from_toml_file_with_env("populator.toml").unwrap()
    } else {
        Settings {
            debug: true,
            poll_interval_secs: 1,
            ..Settings::default()
        }
    };
    setup_logging(&settings);
    SETTINGS.configure(settings).ok();

    let catalog = Arc::new(schemas::demo_catalog());
    let schema = Arc::clone(catalog.get("relationship_populator").unwrap());
    let transport = Arc::new(backend::DemoBackend::new(2));
    let (mut session, mut events) = FormSession::new(schema, catalog, transport);

    demonstrate_dependent_fields(&mut session).await;
    demonstrate_subforms(&mut session);
    demonstrate_documents(&mut session);
    demonstrate_saved_configs(&mut session).await;
    demonstrate_submission(&mut session).await;

    drain_events(&mut events);
    tracing::info!("Relationship populator demo complete!");
}

/// Edits the selector pair and watches the dependent field follow.
async fn demonstrate_dependent_fields(session: &mut FormSession) {
    tracing::info!("--- Dependent fields ---");

    session.refresh_options().await;
    session.store_mut().update_main("base_name", "colors_of_things");

    let resolved = session.resolve_field("code_selector").unwrap();
    tracing::info!(
        "code_selector under 'code_set': {:?} with {} option(s)",
        resolved.base_type,
        resolved.options.len()
    );

    // Switching the controller clears the dependent value and targets a
    // different option source.
    session.store_mut().update_main("code_selector", "icd10_subset");
    session
        .store_mut()
        .update_main("code_selector_type", "terminology");
    session.refresh_options().await;
    let resolved = session.resolve_field("code_selector").unwrap();
    tracing::info!(
        "code_selector under 'terminology': {:?} with {} option(s)",
        resolved.base_type,
        resolved.options.len()
    );
    session.store_mut().update_main("code_selector", "snomed");

    // The test_term field only shows for the dry-run modes.
    let hidden = session.resolve_field("test_term").unwrap();
    session.store_mut().update_main("mode", "see_obj_and_resp");
    let shown = session.resolve_field("test_term").unwrap();
    tracing::info!(
        "test_term visible: {} under 'full_run', {} under 'see_obj_and_resp'",
        hidden.visible,
        shown.visible
    );
    session.store_mut().update_main("mode", "full_run");
}

/// Builds the ordered relationship group.
fn demonstrate_subforms(session: &mut FormSession) {
    tracing::info!("--- Subforms ---");

    for (rel, prompt) in [
        ("is made of", "What material is the object made of?"),
        ("has color", "What color is the object?"),
    ] {
        session.store_mut().add_subform();
        let index = session.store().subform_count() - 1;
        session.store_mut().update_subform(index, "rel", rel);
        session.store_mut().update_subform(index, "rel_prompt", prompt);
    }
    // Order is significant to the backend; promote "has color" to the front.
    session.store_mut().move_subform(1, -1);
    session.store_mut().expand_all();

    let order: Vec<String> = session
        .store()
        .subforms()
        .iter()
        .map(|record| record.get("rel").unwrap().to_string())
        .collect();
    tracing::info!("{} subform(s), in order: {:?}", order.len(), order);
}

/// Exports the form, re-imports it, and shows a foreign document bounce.
fn demonstrate_documents(session: &mut FormSession) {
    tracing::info!("--- Documents ---");

    let (file_name, content) = session.export_document().unwrap();
    tracing::info!("Exported {} ({} bytes)", file_name, content.len());

    session.store_mut().update_main("base_name", "scratch");
    let report = session.import_document(&content).unwrap();
    tracing::info!(
        "Re-imported cleanly: {}, base_name restored to {}",
        report.is_clean(),
        session.store().main().get("base_name").unwrap()
    );

    let foreign = r#"{"formKey": "code_set_populator", "code_set_name": "intruder"}"#;
    if let Err(err) = session.import_document(foreign) {
        tracing::warn!("Foreign document rejected: {err}");
    }
}

/// Lists and loads a saved configuration.
async fn demonstrate_saved_configs(session: &mut FormSession) {
    tracing::info!("--- Saved configurations ---");

    let entries = session.load_config_list().await.unwrap();
    for entry in &entries {
        tracing::info!("  {} ({})", entry.label, entry.id);
    }
    session.load_config(&entries[0].id).await.unwrap();
    tracing::info!(
        "Loaded {:?}: {} subform(s)",
        session.selected_config(),
        session.store().subform_count()
    );
}

/// Submits the form and polls the resulting task to completion.
async fn demonstrate_submission(session: &mut FormSession) {
    tracing::info!("--- Submission ---");

    match session.submit().await.unwrap() {
        SubmitOutcome::TaskStarted { task_id } => {
            tracing::info!("Task {task_id} accepted, polling...");
            let state = session.run_task_to_completion().await;
            tracing::info!("Final task state: {state:?}");
        }
        SubmitOutcome::Completed(result) => {
            tracing::info!("Completed synchronously: {result}");
        }
    }
}

/// Replays the event stream an embedding UI would have rendered live.
fn drain_events(events: &mut UnboundedReceiver<SessionEvent>) {
    tracing::info!("--- Event stream ---");
    while let Ok(event) = events.try_recv() {
        match event {
            SessionEvent::Waiting(on) => tracing::info!("  waiting indicator: {on}"),
            SessionEvent::Status { message, is_error } => {
                if is_error {
                    tracing::warn!("  status: {message}");
                } else {
                    tracing::info!("  status: {message}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwork_client::remote::Transport;

    #[test]
    fn test_demo_catalog() {
        let catalog = schemas::demo_catalog();
        assert_eq!(catalog.len(), 2);
        let schema = catalog.get("relationship_populator").unwrap();
        assert!(schema.has_subforms());
        assert!(schema.main_field("code_selector").is_some());
        assert!(catalog.get("code_set_populator").is_some());
    }

    #[tokio::test]
    async fn test_backend_speaks_the_envelope() {
        let backend = backend::DemoBackend::new(1);
        let body = backend.get("/get_code_set_names?data=%7B%7D").await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert!(parsed["data"].is_array());
        assert!(backend.get("/nowhere").await.is_err());
    }

    #[tokio::test]
    async fn test_backend_task_progresses_to_done() {
        let backend = backend::DemoBackend::new(1);
        let first: serde_json::Value =
            serde_json::from_str(&backend.get("/get_task_status").await.unwrap()).unwrap();
        assert_eq!(first["data"]["done"], false);
        let second: serde_json::Value =
            serde_json::from_str(&backend.get("/get_task_status").await.unwrap()).unwrap();
        assert_eq!(second["data"]["done"], true);
        assert_eq!(second["data"]["status"], "finished");
    }
}
