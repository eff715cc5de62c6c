//! Rule discovery and loading settings.

use serde::{Deserialize, Serialize};

/// Directories excluded from rule discovery by default.
const DEFAULT_EXCLUDE_DIRS: &[&str] = &["node_modules", ".git", "target", "dist", "build"];

/// Rule discovery and loading settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RulesSettings {
    /// Rule directories, relative to the project root.
    pub dirs: Vec<String>,
    /// File extensions (without dot) recognised as rule sources.
    pub extensions: Vec<String>,
    /// Fail the whole load on any malformed source.
    pub strict: bool,
    /// Maximum rule file size in bytes.
    pub max_file_size: u64,
    /// Maximum directory depth below each rules directory.
    pub max_depth: usize,
    /// Directory names skipped while walking.
    pub exclude_dirs: Vec<String>,
    /// Match glob patterns case-insensitively.
    pub case_insensitive: bool,
}

impl Default for RulesSettings {
    fn default() -> Self {
        Self {
            dirs: vec![".cursor/rules".to_string()],
            extensions: vec!["mdc".to_string(), "md".to_string()],
            strict: false,
            max_file_size: 256 * 1024,
            max_depth: 10,
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| (*s).to_owned()).collect(),
            case_insensitive: false,
        }
    }
}
