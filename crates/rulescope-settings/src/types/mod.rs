//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]`, so a
//! settings file may be partial: missing fields keep their default value.

mod logging;
mod rules;

pub use logging::*;
pub use rules::*;

use serde::{Deserialize, Serialize};

/// Root settings type.
///
/// ```json
/// {
///   "rules": { "dirs": [".cursor/rules", "docs/rules"], "strict": true },
///   "logging": { "level": "info" }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RulescopeSettings {
    /// Rule discovery and loading settings.
    pub rules: RulesSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let settings: RulescopeSettings =
            serde_json::from_str(r#"{"rules": {"strict": true}}"#).unwrap();
        assert!(settings.rules.strict);
        assert_eq!(settings.rules.dirs, vec![".cursor/rules"]);
        assert_eq!(settings.logging.level, "warn");
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(RulescopeSettings::default()).unwrap();
        assert!(json["rules"]["maxFileSize"].is_u64());
        assert!(json["rules"]["excludeDirs"].is_array());
        assert!(json["rules"]["caseInsensitive"].is_boolean());
    }
}
