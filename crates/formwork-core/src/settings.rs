//! Settings for the formwork engine.
//!
//! This module provides the [`Settings`] struct, which holds all engine
//! configuration, and [`LazySettings`], a globally-accessible, lazily
//! initialized settings instance with sensible defaults.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{FormworkError, FormworkResult};

/// Seconds between task status polls when not configured otherwise.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;

/// Engine configuration.
///
/// All fields have defaults, so a `Settings::default()` instance is fully
/// usable. Polling is unbounded by default; set [`max_poll_secs`](Self::max_poll_secs)
/// to cap the total time one task may be polled for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Enables pretty, human-readable log output.
    pub debug: bool,
    /// Log filter directive (e.g. `"info"`, `"formwork=debug"`).
    pub log_level: String,
    /// Seconds between task status polls.
    pub poll_interval_secs: u64,
    /// Optional cap on the total time one task may be polled for, in
    /// seconds. `None` polls until the backend reports the task done.
    pub max_poll_secs: Option<u64>,
    /// Optional timeout for individual network calls, in seconds.
    /// `None` leaves calls unbounded.
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            log_level: "info".to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            max_poll_secs: None,
            request_timeout_secs: None,
        }
    }
}

/// A globally-accessible, lazily-initialized [`Settings`] instance.
///
/// Call [`configure`](Self::configure) once at startup to install explicit
/// settings; any read before that returns the defaults.
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl LazySettings {
    /// Creates an unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Installs the given settings.
    ///
    /// Returns a [`FormworkError::Configuration`] if settings were already
    /// configured (or already read, freezing the defaults).
    pub fn configure(&self, settings: Settings) -> FormworkResult<()> {
        self.inner.set(settings).map_err(|_| {
            FormworkError::Configuration("settings are already configured".to_string())
        })
    }

    /// Returns the configured settings, falling back to defaults.
    pub fn get(&self) -> &Settings {
        self.inner.get_or_init(Settings::default)
    }
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

/// The global settings instance.
pub static SETTINGS: LazySettings = LazySettings::new();
