//! # formwork-core
//!
//! Error taxonomy, client settings, and logging setup for the formwork
//! engine. This crate has no engine dependencies and underpins all other
//! crates in the workspace.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Engine settings and global configuration
//! - [`settings_loader`] - Loading settings from files and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{FieldApplyError, FormworkError, FormworkResult};
pub use settings::{Settings, SETTINGS};
