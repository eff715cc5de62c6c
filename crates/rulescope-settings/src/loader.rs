//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`RulescopeSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Validate the result
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{Result, SettingsError};
use crate::types::RulescopeSettings;

/// Resolve the path to the user settings file (`~/.rulescope/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".rulescope").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<RulescopeSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults (plus env overrides). If the
/// file contains invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<RulescopeSettings> {
    let mut settings = load_file_layer(path)?;
    apply_env_overrides(&mut settings);
    validate(&settings)?;
    Ok(settings)
}

/// Defaults with the settings file merged over them, without env overrides.
fn load_file_layer(path: &Path) -> Result<RulescopeSettings> {
    let defaults = serde_json::to_value(RulescopeSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `RULESCOPE_*` environment variable overrides.
pub fn apply_env_overrides(settings: &mut RulescopeSettings) {
    apply_overrides_from(settings, |name| std::env::var(name).ok());
}

/// Apply overrides read through `lookup`.
///
/// Invalid values are ignored with a warning (fall back to file/default).
pub fn apply_overrides_from<F>(settings: &mut RulescopeSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let read_string = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = read_string("RULESCOPE_RULES_DIRS") {
        settings.rules.dirs = parse_list(&v);
    }
    if let Some(v) = read_string("RULESCOPE_EXTENSIONS") {
        settings.rules.extensions = parse_list(&v)
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_string())
            .collect();
    }
    if let Some(v) = read_string("RULESCOPE_STRICT") {
        match parse_bool(&v) {
            Some(b) => settings.rules.strict = b,
            None => warn!(key = "RULESCOPE_STRICT", value = %v, "invalid boolean env var, ignoring"),
        }
    }
    if let Some(v) = read_string("RULESCOPE_CASE_INSENSITIVE") {
        match parse_bool(&v) {
            Some(b) => settings.rules.case_insensitive = b,
            None => warn!(
                key = "RULESCOPE_CASE_INSENSITIVE",
                value = %v,
                "invalid boolean env var, ignoring"
            ),
        }
    }
    if let Some(v) = read_string("RULESCOPE_MAX_FILE_SIZE") {
        match parse_u64_range(&v, 1, 64 * 1024 * 1024) {
            Some(n) => settings.rules.max_file_size = n,
            None => warn!(key = "RULESCOPE_MAX_FILE_SIZE", value = %v, "invalid u64 env var, ignoring"),
        }
    }
    if let Some(v) = read_string("RULESCOPE_LOG_LEVEL") {
        settings.logging.level = v.trim().to_lowercase();
    }
}

/// Reject settings that would make rule loading meaningless.
pub fn validate(settings: &RulescopeSettings) -> Result<()> {
    if settings.rules.dirs.is_empty() {
        return Err(SettingsError::InvalidValue("rules.dirs is empty".into()));
    }
    if settings.rules.extensions.is_empty() {
        return Err(SettingsError::InvalidValue("rules.extensions is empty".into()));
    }
    if settings.rules.max_file_size == 0 {
        return Err(SettingsError::InvalidValue("rules.maxFileSize is zero".into()));
    }
    Ok(())
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Split a comma-separated list, dropping blank entries.
pub fn parse_list(val: &str) -> Vec<String> {
    val.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
