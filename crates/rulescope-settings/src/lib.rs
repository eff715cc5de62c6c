//! # rulescope-settings
//!
//! Configuration with layered sources for the rulescope resolver.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** - [`RulescopeSettings::default()`]
//! 2. **Settings file** - `~/.rulescope/settings.json` or an explicit path
//!    (deep-merged over defaults)
//! 3. **Environment variables** - `RULESCOPE_*` overrides (highest priority)
//!
//! Unlike a process-wide singleton, the loaded value is handed to callers
//! explicitly; rule loading takes what it needs from it.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
