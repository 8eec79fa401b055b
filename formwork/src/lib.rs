//! # formwork
//!
//! A schema-driven dynamic form engine: declarative field schemas become
//! live editable state, dependent fields resolve their type, options, and
//! visibility from other fields' values, an ordered repeatable subform list
//! is managed alongside the main record, filled forms round-trip through
//! portable JSON documents, and submission talks to a backend job system
//! that may answer synchronously or with a pollable, cancellable task.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient
//! access. Depend on `formwork` to get the whole engine, or on individual
//! crates for finer-grained control.

/// Error taxonomy, settings, and logging setup.
pub use formwork_core as core;

/// Field descriptors, values, options, and the schema resolver.
pub use formwork_schema as schema;

/// The form state store and document import/export.
pub use formwork_state as state;

/// Wire envelope, transport, task poller, and the form session.
#[cfg(feature = "client")]
pub use formwork_client as client;
