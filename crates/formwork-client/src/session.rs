//! The form session.
//!
//! A [`FormSession`] is the live context of one rendered form instance. It
//! owns the form store, the dynamic option cache, the remote adapter, and
//! the task poller, and orchestrates everything that crosses the network:
//! submission (synchronous result or background task), saved-configuration
//! listing and loading, lazy option fetching, and document import/export.
//! Progress is surfaced through the session's event stream.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::Instrument;
use uuid::Uuid;

use formwork_core::error::{FormworkError, FormworkResult};
use formwork_core::logging::session_span;
use formwork_core::settings::SETTINGS;
use formwork_schema::catalog::SchemaCatalog;
use formwork_schema::descriptor::FormSchema;
use formwork_schema::options::{OptionCache, OptionsPayload};
use formwork_schema::resolver::{self, ResolvedField};
use formwork_state::document::{self, ImportReport};
use formwork_state::store::FormStore;

use crate::events::{EventSender, SessionEvent};
use crate::remote::{RemoteClient, Transport};
use crate::task::{TaskEndpoints, TaskPoller, TaskState};

/// What a submission produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The backend completed synchronously; here is its result.
    Completed(Value),
    /// The backend accepted the work as a background task.
    TaskStarted {
        /// The backend's opaque task identifier.
        task_id: String,
    },
}

/// One entry of the saved-configuration selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    /// Identifier handed back to the load endpoint.
    pub id: String,
    /// Display label.
    pub label: String,
}

impl ConfigEntry {
    /// Decodes one saved-configuration list entry.
    ///
    /// Plain strings are both id and label; objects need an `id` (scalar)
    /// and may carry a `label` (falling back to the id). Anything else is
    /// dropped.
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(Self {
                id: text.clone(),
                label: text.clone(),
            }),
            Value::Object(object) => {
                let id = match object.get("id")? {
                    Value::String(text) => text.clone(),
                    Value::Number(number) => number.to_string(),
                    _ => return None,
                };
                let label = match object.get("label") {
                    Some(Value::String(text)) => text.clone(),
                    _ => id.clone(),
                };
                Some(Self { id, label })
            }
            _ => None,
        }
    }
}

/// The live context of one rendered form instance.
pub struct FormSession {
    id: Uuid,
    catalog: Arc<SchemaCatalog>,
    store: FormStore,
    options: OptionCache,
    remote: RemoteClient,
    poller: Arc<TaskPoller>,
    selected_config: String,
    events: EventSender,
}

impl FormSession {
    /// Creates a session for one schema, returning it together with the
    /// receiving half of its event stream.
    pub fn new(
        schema: Arc<FormSchema>,
        catalog: Arc<SchemaCatalog>,
        transport: Arc<dyn Transport>,
    ) -> (Self, UnboundedReceiver<SessionEvent>) {
        let settings = SETTINGS.get();
        let (events, receiver) = EventSender::channel();
        let remote = RemoteClient::new(transport);
        let poller = Arc::new(TaskPoller::new(
            remote.clone(),
            TaskEndpoints::default(),
            Duration::from_secs(settings.poll_interval_secs),
            settings.max_poll_secs.map(Duration::from_secs),
            events.clone(),
        ));
        let session = Self {
            id: Uuid::new_v4(),
            catalog,
            store: FormStore::new(schema),
            options: OptionCache::new(),
            remote,
            poller,
            selected_config: String::new(),
            events,
        };
        (session, receiver)
    }

    /// This session's identifier.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// The schema this session renders.
    pub fn schema(&self) -> &Arc<FormSchema> {
        self.store.schema()
    }

    /// The form store (read access).
    pub const fn store(&self) -> &FormStore {
        &self.store
    }

    /// The form store (mutation access for field edits and subform
    /// operations).
    pub fn store_mut(&mut self) -> &mut FormStore {
        &mut self.store
    }

    /// The dynamic option cache.
    pub const fn options(&self) -> &OptionCache {
        &self.options
    }

    /// A handle to the task poller, for driving it from a spawned task
    /// while the session stays usable.
    pub fn task_poller(&self) -> Arc<TaskPoller> {
        Arc::clone(&self.poller)
    }

    /// The current task state.
    pub fn task_state(&self) -> TaskState {
        self.poller.state()
    }

    /// Returns `true` when this form offers the saved-configuration
    /// selector pseudo-field.
    pub fn has_config_selector(&self) -> bool {
        self.schema().config_list_url.is_some()
    }

    /// The currently selected saved-configuration id (empty when none).
    pub fn selected_config(&self) -> &str {
        &self.selected_config
    }

    /// Resolves a field (main or subform) against the current main-record
    /// values for one render pass.
    pub fn resolve_field(&self, name: &str) -> Option<ResolvedField> {
        let schema = self.store.schema();
        let field = schema.main_field(name).or_else(|| schema.subform_field(name))?;
        Some(resolver::resolve(field, self.store.main().values(), &self.options))
    }

    /// Fetches every option list a field currently needs and does not have.
    ///
    /// Endpoints are resolved against the current controller values; each
    /// fetched list is cached under its `(field, controller value)` slot
    /// permanently. A failed fetch is logged and skipped, leaving its slot
    /// empty; nothing is retried within one pass.
    pub async fn refresh_options(&mut self) {
        let schema = Arc::clone(self.store.schema());
        let mut pending = Vec::new();
        for field in schema.main_fields.iter().chain(schema.subform_fields.iter()) {
            if let Some(request) = resolver::options_request(field, self.store.main().values()) {
                if !self.options.contains(&field.name, &request.slot) {
                    pending.push((field.name.clone(), request));
                }
            }
        }
        for (field, request) in pending {
            match self.remote.read(&request.url, &serde_json::json!({})).await {
                Ok(data) => {
                    let options = OptionsPayload::from_json(&data).into_options();
                    self.options.insert(&field, &request.slot, options);
                }
                Err(err) => {
                    tracing::warn!(session = %self.id, field = %field, %err, "option fetch failed");
                }
            }
        }
    }

    /// Submits the current form state.
    ///
    /// Packages `{ ...main, rels: [subforms] }` and dispatches it to the
    /// schema's submit endpoint. A response carrying a `task_id` hands the
    /// task to the poller and reports the submission accepted; a response
    /// without one completes immediately. A transport or protocol failure
    /// clears the waiting indicator, surfaces the error, and is never
    /// retried automatically. Submitting while a task is still active is
    /// rejected.
    pub async fn submit(&mut self) -> FormworkResult<SubmitOutcome> {
        let span = session_span(&self.id.to_string());
        async {
            let Some(submit_url) = self.store.schema().submit_url.clone() else {
                return Err(FormworkError::Configuration(
                    "form has no submit endpoint".to_string(),
                ));
            };
            if self.poller.state().is_active() {
                return Err(FormworkError::Configuration(
                    "a task is already running".to_string(),
                ));
            }

            self.events.waiting(true);
            self.events.status("Working...");
            let payload = self.store.submission_payload();

            match self.remote.write(&submit_url, &payload).await {
                Ok(data) => {
                    if let Some(task_id) = data.get("task_id").and_then(Value::as_str) {
                        self.poller.track(task_id);
                        self.events.status("Submission accepted, task running.");
                        tracing::info!(task_id, "submission accepted as background task");
                        Ok(SubmitOutcome::TaskStarted {
                            task_id: task_id.to_string(),
                        })
                    } else {
                        self.events.status("Done!");
                        self.events.waiting(false);
                        Ok(SubmitOutcome::Completed(data))
                    }
                }
                Err(err) => {
                    self.events.waiting(false);
                    self.events.error(format!("Submit failed: {err}"));
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Drives the tracked task to a terminal state (see
    /// [`TaskPoller::run`]).
    pub async fn run_task_to_completion(&self) -> TaskState {
        self.poller.run().await
    }

    /// Requests cancellation of the tracked task (see
    /// [`TaskPoller::cancel`]).
    pub async fn cancel_task(&self) -> FormworkResult<bool> {
        self.poller.cancel().await
    }

    /// Reads the saved-configuration list for this form.
    pub async fn load_config_list(&mut self) -> FormworkResult<Vec<ConfigEntry>> {
        let Some(url) = self.store.schema().config_list_url.clone() else {
            return Err(FormworkError::Configuration(
                "form has no saved-configuration list endpoint".to_string(),
            ));
        };
        let data = self.remote.read(&url, &serde_json::json!({})).await?;
        let Some(entries) = data.as_array() else {
            return Err(FormworkError::Protocol(
                "configuration list is not an array".to_string(),
            ));
        };
        Ok(entries.iter().filter_map(ConfigEntry::from_json).collect())
    }

    /// Loads one saved configuration's document by id and replaces the
    /// form state with it.
    pub async fn load_config(&mut self, id: &str) -> FormworkResult<()> {
        let Some(url) = self.store.schema().config_load_url.clone() else {
            return Err(FormworkError::Configuration(
                "form has no saved-configuration load endpoint".to_string(),
            ));
        };
        let data = self.remote.read(&url, &serde_json::json!({ "id": id })).await?;
        let Some(configuration) = data.as_object() else {
            return Err(FormworkError::Protocol(
                "configuration document is not an object".to_string(),
            ));
        };
        self.store.load_document(configuration);
        self.selected_config = id.to_string();
        tracing::debug!(session = %self.id, id, "loaded saved configuration");
        Ok(())
    }

    /// Serializes the form state as a downloadable document, returning the
    /// suggested filename and the document text.
    pub fn export_document(&self) -> FormworkResult<(String, String)> {
        let exported = document::export_document(&self.store);
        let content = serde_json::to_string_pretty(&exported)?;
        Ok((self.store.schema().export_file_name(), content))
    }

    /// Imports a document, replacing the form state on success (see
    /// [`document::import_document`]).
    pub fn import_document(&mut self, content: &str) -> FormworkResult<ImportReport> {
        document::import_document(&mut self.store, &self.catalog, content)
    }
}
