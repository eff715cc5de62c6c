//! Rule applicability resolution.
//!
//! [`resolve`] answers "which rules apply to this file, and in what order?"
//! for one candidate path against an immutable [`RuleRecordSet`].
//!
//! ## Ordering
//!
//! 1. Always-apply rules, in input order.
//! 2. Glob-matched rules by specificity of their matching pattern,
//!    descending. Ties keep input order.
//!
//! Resolution is a pure function of its inputs: the same path and set always
//! yield the same result.

use tracing::{debug, trace};

use rulescope_core::{MatchReason, ResolutionResult, RuleError, RuleMatch};

use crate::set::RuleRecordSet;

/// Resolve the ordered list of rules applicable to `path`.
///
/// Only a non-normalizable `path` is an error. Records with invalid patterns
/// are skipped for glob matching and reported in
/// [`ResolutionResult::errors`].
pub fn resolve(path: &str, set: &RuleRecordSet) -> Result<ResolutionResult, RuleError> {
    let path = normalize_path(path)?;

    let mut always = Vec::new();
    let mut globbed = Vec::new();

    for rule in set.rules() {
        let hit = rule.best_match(&path);
        let record = &rule.record;

        if record.always_apply {
            trace!(rule_id = %record.id, "always-apply rule");
            always.push(RuleMatch {
                id: record.id.clone(),
                reason: MatchReason::Always,
                glob: hit.map(|p| p.as_str().to_owned()),
                specificity: hit.map_or(0, |p| p.specificity()),
            });
        } else if let Some(pattern) = hit {
            trace!(rule_id = %record.id, pattern = pattern.as_str(), "glob matched");
            globbed.push(RuleMatch {
                id: record.id.clone(),
                reason: MatchReason::Glob(pattern.as_str().to_owned()),
                glob: Some(pattern.as_str().to_owned()),
                specificity: pattern.specificity(),
            });
        }
    }

    // Stable: equal specificity keeps input order
    globbed.sort_by(|a, b| b.specificity.cmp(&a.specificity));

    let mut matches = always;
    matches.append(&mut globbed);

    debug!(path = %path, matched = matches.len(), "resolved rules");

    Ok(ResolutionResult {
        path,
        matches,
        errors: set.pattern_errors().to_vec(),
    })
}

/// Normalize a candidate path to slash-separated relative form.
///
/// Backslashes become `/`, empty and `.` segments are dropped. Absolute
/// paths, `..` segments and empty paths are rejected.
pub fn normalize_path(path: &str) -> Result<String, RuleError> {
    let invalid = |message: &str| RuleError::InvalidPath {
        path: path.to_owned(),
        message: message.to_owned(),
    };

    let unified = path.trim().replace('\\', "/");
    if unified.starts_with('/') || has_drive_prefix(&unified) {
        return Err(invalid("path must be relative"));
    }

    let mut segments = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(invalid("path must not contain '..' segments")),
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return Err(invalid("path is empty"));
    }
    Ok(segments.join("/"))
}

/// `C:` or `C:/...`. A colon later in a name (`a:b.ts`) is a plain file name.
fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes.len() == 2 || bytes[2] == b'/')
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
