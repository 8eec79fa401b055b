//! Core error types for the formwork engine.
//!
//! This module provides the [`FormworkError`] enum covering every failure
//! class the engine produces: rejected document imports, malformed documents
//! and server envelopes, backend-reported errors, transport failures, task
//! polling failures, and misconfiguration. Nothing here is fatal to the
//! process; every error path returns the caller to a re-triable state.

use std::fmt;

use thiserror::Error;

/// A single document key that could not be applied during an import.
///
/// Apply failures are collected per key and reported together after the
/// import attempt completes; they do not abort the rest of the import.
///
/// # Examples
///
/// ```
/// use formwork_core::error::FieldApplyError;
///
/// let err = FieldApplyError::new("rels", "expected an array of subform records");
/// assert_eq!(err.to_string(), "rels: expected an array of subform records");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldApplyError {
    /// The top-level document key that failed to apply.
    pub key: String,
    /// Why the key could not be applied.
    pub reason: String,
}

impl FieldApplyError {
    /// Creates a new `FieldApplyError` for the given key.
    pub fn new(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.reason)
    }
}

impl std::error::Error for FieldApplyError {}

/// The primary error type for the formwork engine.
///
/// Variants map one-to-one onto the engine's failure taxonomy:
///
/// - [`SchemaMismatch`](Self::SchemaMismatch): an imported document belongs
///   to a different form; the user must switch forms and retry.
/// - [`Parse`](Self::Parse): a document could not be parsed; the operation
///   aborts with no partial effect.
/// - [`Protocol`](Self::Protocol): a server response did not match the
///   expected envelope shape.
/// - [`Backend`](Self::Backend): the backend reported an error through the
///   envelope status field.
/// - [`Transport`](Self::Transport): a network-level failure on an outbound
///   call; surfaced to the user, never retried automatically.
/// - [`TaskFailure`](Self::TaskFailure): a task status or cancel call
///   failed; handled like a transport failure.
/// - [`Configuration`](Self::Configuration): the engine or schema is
///   misconfigured (missing endpoint, duplicate submission, ...).
#[derive(Error, Debug)]
pub enum FormworkError {
    /// An imported document was produced for a different form.
    ///
    /// The message names both the currently active form and the form the
    /// document was exported for ("unknown" when the source form cannot be
    /// resolved from the catalog).
    #[error(
        "cannot import: the active form is \"{active_title}\" but the document was exported for \"{document_title}\""
    )]
    SchemaMismatch {
        /// Title of the currently active form.
        active_title: String,
        /// Title of the form the document belongs to, or "unknown".
        document_title: String,
    },

    /// A document body could not be parsed as JSON.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A server response did not match the expected envelope shape.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The backend signalled an error through the envelope status field.
    #[error("Backend error: {0}")]
    Backend(String),

    /// A network-level failure on an outbound call.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A task status or cancel call failed.
    #[error("Task failure: {0}")]
    TaskFailure(String),

    /// The engine or schema is misconfigured.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<serde_json::Error> for FormworkError {
    fn from(error: serde_json::Error) -> Self {
        Self::Parse(error.to_string())
    }
}

/// A convenience type alias for `Result<T, FormworkError>`.
pub type FormworkResult<T> = Result<T, FormworkError>;
