//! Rule source discovery.
//!
//! Walks the configured rules directories under a project root and reads
//! every file with a recognised extension into a [`RuleSource`]. The id of
//! each source is its path relative to the rules directory, minus the
//! extension (`.cursor/rules/frontend/react.mdc` → `frontend/react`).
//!
//! Missing rules directories are not errors. Unreadable or oversized files,
//! broken links and directories that cannot be walked are reported as
//! [`RuleError::Unreadable`] and skipped. Symlinks are followed.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use rulescope_core::RuleError;
use rulescope_settings::RulesSettings;

use crate::source::{RuleSource, id_from_relative_path};

/// Configuration for rule discovery.
#[derive(Clone, Debug)]
pub struct DiscoveryConfig {
    /// Project root directory.
    pub project_root: PathBuf,
    /// Rules directories, relative to `project_root`.
    pub rule_dirs: Vec<PathBuf>,
    /// Recognised extensions, lowercase, without dot.
    pub extensions: Vec<String>,
    /// Files larger than this are reported and skipped.
    pub max_file_size: u64,
    /// Maximum depth below each rules directory.
    pub max_depth: usize,
    /// Directory names skipped while walking.
    pub exclude_dirs: HashSet<String>,
}

impl DiscoveryConfig {
    /// Build a discovery config for `project_root` from settings.
    pub fn from_settings(project_root: impl Into<PathBuf>, settings: &RulesSettings) -> Self {
        Self {
            project_root: project_root.into(),
            rule_dirs: settings.dirs.iter().map(PathBuf::from).collect(),
            extensions: settings
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            max_file_size: settings.max_file_size,
            max_depth: settings.max_depth,
            exclude_dirs: settings.exclude_dirs.iter().cloned().collect(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self::from_settings(PathBuf::new(), &RulesSettings::default())
    }
}

/// Sources found by a discovery pass, plus per-file failures.
#[derive(Clone, Debug, Default)]
pub struct DiscoveryResult {
    /// Readable rule sources, in walk order.
    pub sources: Vec<RuleSource>,
    /// Files or directories that could not be read.
    pub errors: Vec<RuleError>,
}

/// Discover rule sources under every configured rules directory.
///
/// Directories are walked in configuration order; entries within a
/// directory are visited sorted by file name so results are deterministic.
pub fn discover_rule_sources(config: &DiscoveryConfig) -> DiscoveryResult {
    let mut result = DiscoveryResult::default();

    for dir in &config.rule_dirs {
        let rules_root = config.project_root.join(dir);
        if !rules_root.is_dir() {
            debug!(dir = %rules_root.display(), "rules directory not found, skipping");
            continue;
        }
        scan_rules_dir(config, &rules_root, &mut result);
    }

    debug!(
        sources = result.sources.len(),
        errors = result.errors.len(),
        "rule discovery complete"
    );
    result
}

fn scan_rules_dir(config: &DiscoveryConfig, rules_root: &Path, result: &mut DiscoveryResult) {
    let walker = WalkDir::new(rules_root)
        .max_depth(config.max_depth)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e, &config.exclude_dirs));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let failed = e.path().unwrap_or(rules_root);
                let relative = slash_path(failed.strip_prefix(rules_root).unwrap_or(failed));
                let id = if relative.is_empty() {
                    id_from_relative_path(&slash_path(rules_root))
                } else {
                    id_from_relative_path(&relative)
                };
                warn!(path = %failed.display(), error = %e, "failed to walk rules directory");
                result.errors.push(RuleError::Unreadable {
                    id,
                    message: format!("failed to walk rules directory: {e}"),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() || !has_rule_extension(entry.path(), &config.extensions) {
            continue;
        }

        let relative = slash_path(entry.path().strip_prefix(rules_root).unwrap_or(entry.path()));
        let origin = slash_path(
            entry
                .path()
                .strip_prefix(&config.project_root)
                .unwrap_or(entry.path()),
        );

        match read_source(entry.path(), &relative, config.max_file_size) {
            Ok(content) => {
                debug!(origin = %origin, "discovered rule source");
                result
                    .sources
                    .push(RuleSource::from_relative_path(&relative, content).with_origin(origin));
            }
            Err(message) => {
                warn!(origin = %origin, %message, "unreadable rule source");
                result.errors.push(RuleError::Unreadable {
                    id: id_from_relative_path(&relative),
                    message,
                });
            }
        }
    }
}

fn is_skipped_dir(entry: &DirEntry, exclude_dirs: &HashSet<String>) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || exclude_dirs.contains(name.as_ref())
}

fn has_rule_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)))
}

fn read_source(path: &Path, relative: &str, max_size: u64) -> Result<String, String> {
    let metadata = std::fs::metadata(path).map_err(|e| format!("failed to read metadata: {e}"))?;
    let size = metadata.len();
    if size > max_size {
        return Err(format!(
            "{relative}: file too large: {size} bytes (max {max_size} bytes)"
        ));
    }
    std::fs::read_to_string(path).map_err(|e| format!("{relative}: failed to read file: {e}"))
}

/// Join path components with forward slashes.
fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
