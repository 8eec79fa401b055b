//! Task tracking and polling.
//!
//! A submission may come back with a task id instead of a result; the
//! [`TaskPoller`] then observes that one task by polling its status on a
//! fixed interval until the backend reports it done, the user cancels it,
//! or a poll fails. Task state is owned per session, behind a lock, so a
//! cancel request can arrive while the poll loop is sleeping.
//!
//! The state machine is strictly one-way:
//! `Idle → Submitted → Polling → {Done, Cancelled, Failed}`; once polling
//! starts it always runs to one of the terminal outcomes.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Deserialize;
use tokio::time::Instant;

use formwork_core::error::{FormworkError, FormworkResult};

use crate::events::EventSender;
use crate::remote::RemoteClient;

/// Endpoints used to observe and cancel a backend task.
#[derive(Debug, Clone)]
pub struct TaskEndpoints {
    /// Status-by-task-id endpoint.
    pub status_url: String,
    /// Cancel-by-task-id endpoint.
    pub cancel_url: String,
}

impl Default for TaskEndpoints {
    fn default() -> Self {
        Self {
            status_url: "/get_task_status".to_string(),
            cancel_url: "/cancel_task".to_string(),
        }
    }
}

/// Lifecycle of the at-most-one backend task a session tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    /// No task has been tracked yet.
    Idle,
    /// A submission returned this task id; polling has not started.
    Submitted {
        /// The backend's opaque task identifier.
        task_id: String,
    },
    /// The task is being polled.
    Polling {
        /// The backend's opaque task identifier.
        task_id: String,
    },
    /// The backend reported the task done; the tracked id is cleared.
    Done,
    /// The backend confirmed cancellation.
    Cancelled,
    /// A poll failed. The id (when still known) stays tracked so the
    /// caller may still cancel.
    Failed {
        /// The tracked id at failure time.
        task_id: Option<String>,
        /// What went wrong.
        message: String,
    },
}

impl TaskState {
    /// The tracked task id, if one is known.
    pub fn task_id(&self) -> Option<&str> {
        match self {
            Self::Submitted { task_id } | Self::Polling { task_id } => Some(task_id),
            Self::Failed { task_id, .. } => task_id.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` while a task is submitted or being polled.
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Submitted { .. } | Self::Polling { .. })
    }

    /// Returns `true` for `Done`, `Cancelled`, and `Failed`.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Cancelled | Self::Failed { .. })
    }
}

#[derive(Debug, Clone, Deserialize)]
struct TaskStatus {
    #[serde(default)]
    done: bool,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Default, Deserialize)]
struct CancelReply {
    #[serde(default)]
    cancelled: bool,
}

/// Polls one tracked backend task to a terminal state.
pub struct TaskPoller {
    remote: RemoteClient,
    endpoints: TaskEndpoints,
    interval: Duration,
    max_duration: Option<Duration>,
    state: Mutex<TaskState>,
    events: EventSender,
}

impl TaskPoller {
    /// Creates a poller in the `Idle` state.
    ///
    /// `interval` is the delay between status polls; `max_duration`
    /// optionally caps the total polling time for one task (`None` polls
    /// until the backend reports done).
    pub fn new(
        remote: RemoteClient,
        endpoints: TaskEndpoints,
        interval: Duration,
        max_duration: Option<Duration>,
        events: EventSender,
    ) -> Self {
        Self {
            remote,
            endpoints,
            interval,
            max_duration,
            state: Mutex::new(TaskState::Idle),
            events,
        }
    }

    fn state_guard(&self) -> MutexGuard<'_, TaskState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The current task state.
    pub fn state(&self) -> TaskState {
        self.state_guard().clone()
    }

    /// The tracked task id, if one is known.
    pub fn task_id(&self) -> Option<String> {
        self.state_guard().task_id().map(String::from)
    }

    /// Starts tracking a freshly submitted task.
    pub fn track(&self, task_id: impl Into<String>) {
        *self.state_guard() = TaskState::Submitted {
            task_id: task_id.into(),
        };
    }

    /// Drives the tracked task to a terminal state.
    ///
    /// Status is polled immediately, then on the configured interval while
    /// the backend reports `done = false`. A `done = true` response ends
    /// polling as `Done`, clears the tracked id, and surfaces
    /// `"Done with status : <status>"`. A poll failure ends polling as
    /// `Failed` with the error surfaced and the waiting indicator cleared;
    /// the id stays tracked for the caller. A cancel observed between polls
    /// ends the loop as `Cancelled`. With no task tracked this returns the
    /// current state unchanged.
    pub async fn run(&self) -> TaskState {
        let Some(task_id) = self.task_id() else {
            return self.state();
        };
        let started = Instant::now();
        loop {
            {
                let mut state = self.state_guard();
                match state.clone() {
                    TaskState::Submitted { task_id } | TaskState::Polling { task_id } => {
                        *state = TaskState::Polling { task_id };
                    }
                    other => return other,
                }
            }

            if let Some(max) = self.max_duration {
                if started.elapsed() >= max {
                    let message = format!("task polling exceeded {} seconds", max.as_secs());
                    let state = self.fail(&task_id, message.clone());
                    self.events.waiting(false);
                    self.events.error(message);
                    return state;
                }
            }

            match self.poll_once(&task_id).await {
                Ok(status) => {
                    self.events.status(status.status.clone());
                    if status.done {
                        *self.state_guard() = TaskState::Done;
                        self.events.waiting(false);
                        self.events
                            .status(format!("Done with status : {}", status.status));
                        return TaskState::Done;
                    }
                    tokio::time::sleep(self.interval).await;
                }
                Err(err) => {
                    let message = err.to_string();
                    let state = self.fail(&task_id, message.clone());
                    self.events.waiting(false);
                    self.events.error(format!("Error occurred: {message}"));
                    return state;
                }
            }
        }
    }

    /// Requests cancellation of the tracked task.
    ///
    /// Valid only while a task id is tracked (a no-op `Ok(false)`
    /// otherwise). A response confirming cancellation moves the task to
    /// `Cancelled` and surfaces `"Cancelled!"`; an unconfirmed response
    /// leaves the prior state standing; a failed call surfaces the error
    /// and leaves the prior state standing, since the backend may or may
    /// not have acted on it.
    pub async fn cancel(&self) -> FormworkResult<bool> {
        let Some(task_id) = self.task_id() else {
            return Ok(false);
        };
        let payload = serde_json::json!({ "task_id": task_id });
        match self.remote.write(&self.endpoints.cancel_url, &payload).await {
            Ok(data) => {
                let reply: CancelReply = serde_json::from_value(data).unwrap_or_default();
                if reply.cancelled {
                    *self.state_guard() = TaskState::Cancelled;
                    self.events.waiting(false);
                    self.events.status("Cancelled!");
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Err(err) => {
                let message = err.to_string();
                self.events.waiting(false);
                self.events.error(format!("Cancel failed: {message}"));
                Err(FormworkError::TaskFailure(message))
            }
        }
    }

    async fn poll_once(&self, task_id: &str) -> FormworkResult<TaskStatus> {
        let payload = serde_json::json!({ "task_id": task_id });
        let data = self
            .remote
            .read(&self.endpoints.status_url, &payload)
            .await
            .map_err(|e| FormworkError::TaskFailure(e.to_string()))?;
        serde_json::from_value(data)
            .map_err(|e| FormworkError::TaskFailure(format!("malformed task status: {e}")))
    }

    fn fail(&self, task_id: &str, message: String) -> TaskState {
        let state = TaskState::Failed {
            task_id: Some(task_id.to_string()),
            message,
        };
        *self.state_guard() = state.clone();
        state
    }
}
