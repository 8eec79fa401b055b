//! # formwork-client
//!
//! The remote half of the formwork engine: the uniform request/response
//! envelope spoken with the backend, the transport seam it travels over,
//! the poller that tracks one long-running backend task per form session,
//! and the [`FormSession`](session::FormSession) that orchestrates
//! submission, saved-configuration loading, lazy option fetching, and
//! document import/export around a form store.
//!
//! ## Modules
//!
//! - [`wire`] - Envelope encoding and decoding
//! - [`remote`] - [`Transport`](remote::Transport) seam and the remote call adapter
//! - [`events`] - The session event stream the UI subscribes to
//! - [`task`] - Task state machine and poller
//! - [`session`] - The form session

pub mod events;
pub mod remote;
pub mod session;
pub mod task;
pub mod wire;

pub use events::{EventSender, SessionEvent};
pub use remote::{HttpTransport, RemoteClient, Transport};
pub use session::{ConfigEntry, FormSession, SubmitOutcome};
pub use task::{TaskEndpoints, TaskPoller, TaskState};
