//! Settings loading from configuration files.
//!
//! Provides functions to load [`Settings`] from TOML or JSON files and to
//! apply environment variable overrides.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `FORMWORK_DEBUG` | `debug` |
//! | `FORMWORK_LOG_LEVEL` | `log_level` |
//! | `FORMWORK_POLL_INTERVAL_SECS` | `poll_interval_secs` |
//! | `FORMWORK_MAX_POLL_SECS` | `max_poll_secs` |
//! | `FORMWORK_REQUEST_TIMEOUT_SECS` | `request_timeout_secs` |

use std::path::Path;

use crate::error::{FormworkError, FormworkResult};
use crate::settings::Settings;

/// Loads settings from a TOML string.
pub fn from_toml_str(content: &str) -> FormworkResult<Settings> {
    toml::from_str(content)
        .map_err(|e| FormworkError::Configuration(format!("invalid TOML settings: {e}")))
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> FormworkResult<Settings> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        FormworkError::Configuration(format!("cannot read settings file {}: {e}", path.display()))
    })?;
    from_toml_str(&content)
}

/// Loads settings from a JSON string.
pub fn from_json_str(content: &str) -> FormworkResult<Settings> {
    serde_json::from_str(content)
        .map_err(|e| FormworkError::Configuration(format!("invalid JSON settings: {e}")))
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> FormworkResult<Settings> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        FormworkError::Configuration(format!("cannot read settings file {}: {e}", path.display()))
    })?;
    from_json_str(&content)
}

/// Applies `FORMWORK_*` environment variable overrides to the given settings.
pub fn apply_env_overrides(mut settings: Settings) -> FormworkResult<Settings> {
    if let Ok(value) = std::env::var("FORMWORK_DEBUG") {
        settings.debug = parse_bool("FORMWORK_DEBUG", &value)?;
    }
    if let Ok(value) = std::env::var("FORMWORK_LOG_LEVEL") {
        settings.log_level = value;
    }
    if let Ok(value) = std::env::var("FORMWORK_POLL_INTERVAL_SECS") {
        settings.poll_interval_secs = parse_secs("FORMWORK_POLL_INTERVAL_SECS", &value)?;
    }
    if let Ok(value) = std::env::var("FORMWORK_MAX_POLL_SECS") {
        settings.max_poll_secs = Some(parse_secs("FORMWORK_MAX_POLL_SECS", &value)?);
    }
    if let Ok(value) = std::env::var("FORMWORK_REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = Some(parse_secs("FORMWORK_REQUEST_TIMEOUT_SECS", &value)?);
    }
    Ok(settings)
}

/// Loads settings from a TOML file and applies environment overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> FormworkResult<Settings> {
    apply_env_overrides(from_toml_file(path)?)
}

fn parse_bool(name: &str, value: &str) -> FormworkResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(FormworkError::Configuration(format!(
            "{name} must be a boolean, got {value:?}"
        ))),
    }
}

fn parse_secs(name: &str, value: &str) -> FormworkResult<u64> {
    value.parse().map_err(|_| {
        FormworkError::Configuration(format!("{name} must be a number of seconds, got {value:?}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_str() {
        let settings = from_toml_str(
            r#"
            debug = true
            log_level = "formwork=debug"
            poll_interval_secs = 30
            max_poll_secs = 600
            "#,
        )
        .unwrap();
        assert!(settings.debug);
        assert_eq!(settings.log_level, "formwork=debug");
        assert_eq!(settings.poll_interval_secs, 30);
        assert_eq!(settings.max_poll_secs, Some(600));
        assert_eq!(settings.request_timeout_secs, None);
    }

    #[test]
    fn test_from_toml_str_empty_uses_defaults() {
        let settings = from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_from_toml_str_invalid() {
        assert!(from_toml_str("debug = \"maybe\"").is_err());
    }

    #[test]
    fn test_from_json_str() {
        let settings = from_json_str(r#"{"poll_interval_secs": 5}"#).unwrap();
        assert_eq!(settings.poll_interval_secs, 5);
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("FORMWORK_POLL_INTERVAL_SECS", "9");
        std::env::set_var("FORMWORK_DEBUG", "yes");
        let settings = apply_env_overrides(Settings::default());
        std::env::remove_var("FORMWORK_POLL_INTERVAL_SECS");
        std::env::remove_var("FORMWORK_DEBUG");
        let settings = settings.unwrap();
        assert_eq!(settings.poll_interval_secs, 9);
        assert!(settings.debug);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("X", "true").unwrap());
        assert!(parse_bool("X", "1").unwrap());
        assert!(!parse_bool("X", "Off").unwrap());
        assert!(parse_bool("X", "maybe").is_err());
    }

    #[test]
    fn test_parse_secs() {
        assert_eq!(parse_secs("X", "15").unwrap(), 15);
        assert!(parse_secs("X", "soon").is_err());
    }
}
