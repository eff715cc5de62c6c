//! Batch loading of rule sources into a [`RuleRecordSet`].
//!
//! Loading makes one pass over every source and collects all problems
//! before deciding the outcome:
//!
//! - `DuplicateId` is fatal for the whole load; no records are loaded.
//! - `MalformedMetadata` / `Unreadable` exclude only the offending source,
//!   unless [`LoadOptions::strict`] is set, in which case any error (including
//!   an invalid glob pattern) fails the load.

use thiserror::Error;
use tracing::{info, warn};

use rulescope_core::{RuleError, RuleRecord};
use rulescope_settings::RulesSettings;

use crate::discovery::DiscoveryResult;
use crate::glob::GlobOptions;
use crate::parser::parse_rule;
use crate::set::{RuleRecordSet, find_duplicate_ids};
use crate::source::RuleSource;

/// Load policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Fail the whole load on any error instead of excluding bad sources.
    pub strict: bool,
    /// Pattern compilation options.
    pub glob: GlobOptions,
}

impl LoadOptions {
    /// Derive load options from settings.
    pub fn from_settings(settings: &RulesSettings) -> Self {
        Self {
            strict: settings.strict,
            glob: GlobOptions {
                case_insensitive: settings.case_insensitive,
            },
        }
    }
}

/// A successful load: the record set plus non-fatal errors.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Loaded records.
    pub set: RuleRecordSet,
    /// Sources that were excluded, one error each.
    pub errors: Vec<RuleError>,
}

/// A failed load. No records were loaded.
#[derive(Debug, Error)]
#[error("failed to load rules: {} error(s)", .errors.len())]
pub struct LoadFailure {
    /// Every error observed during the load.
    pub errors: Vec<RuleError>,
}

/// Parse and validate rule sources into a record set.
pub fn load_records<I>(sources: I, options: LoadOptions) -> Result<LoadReport, LoadFailure>
where
    I: IntoIterator<Item = RuleSource>,
{
    load_with_errors(sources.into_iter().collect(), Vec::new(), options)
}

/// Load the sources of a discovery pass, carrying its errors along.
pub fn load_discovered(
    discovered: DiscoveryResult,
    options: LoadOptions,
) -> Result<LoadReport, LoadFailure> {
    load_with_errors(discovered.sources, discovered.errors, options)
}

fn load_with_errors(
    sources: Vec<RuleSource>,
    mut errors: Vec<RuleError>,
    options: LoadOptions,
) -> Result<LoadReport, LoadFailure> {
    let duplicates = find_duplicate_ids(sources.iter().map(|s| &s.id));

    let mut records = Vec::with_capacity(sources.len());
    for source in sources {
        match parse_source(source) {
            Ok(record) => records.push(record),
            Err(err) => errors.push(err),
        }
    }

    if !duplicates.is_empty() {
        let mut all = duplicates;
        all.append(&mut errors);
        return Err(fail(all));
    }

    let set = match RuleRecordSet::build(records, options.glob) {
        Ok(set) => set,
        Err(mut dup) => {
            dup.append(&mut errors);
            return Err(fail(dup));
        }
    };

    if options.strict && (!errors.is_empty() || !set.pattern_errors().is_empty()) {
        errors.extend(set.pattern_errors().iter().cloned());
        return Err(fail(errors));
    }

    for err in &errors {
        warn!(error = %err, "rule source excluded");
    }
    info!(
        loaded = set.len(),
        excluded = errors.len(),
        invalid_patterns = set.pattern_errors().len(),
        "rules loaded"
    );

    Ok(LoadReport { set, errors })
}

fn parse_source(source: RuleSource) -> Result<RuleRecord, RuleError> {
    if source.id.is_blank() {
        return Err(RuleError::malformed(source.id, "rule id is empty"));
    }
    let parsed = parse_rule(&source.id, &source.content)?;
    Ok(RuleRecord {
        id: source.id,
        description: parsed.description,
        globs: parsed.globs,
        always_apply: parsed.always_apply,
        body: parsed.body,
        origin: source.origin,
    })
}

fn fail(errors: Vec<RuleError>) -> LoadFailure {
    for err in &errors {
        warn!(error = %err, "rule load error");
    }
    LoadFailure { errors }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rulescope_core::RuleErrorKind;
    use rulescope_core::logging::capture_logs;
    use tracing::Level;

    const TS_RULE: &str = "---\ndescription: TypeScript\nglobs: *.ts, *.tsx\nalwaysApply: false\n---\nUse strict.\n";
    const BASE_RULE: &str = "---\ndescription: Base\nalwaysApply: true\n---\nBe kind.\n";

    fn strict() -> LoadOptions {
        LoadOptions {
            strict: true,
            ..LoadOptions::default()
        }
    }

    #[test]
    fn loads_well_formed_sources() {
        let report = load_records(
            vec![
                RuleSource::new("base", BASE_RULE),
                RuleSource::new("ts", TS_RULE).with_origin(".cursor/rules/ts.mdc"),
            ],
            LoadOptions::default(),
        )
        .unwrap();

        assert!(report.errors.is_empty());
        assert_eq!(report.set.len(), 2);
        let ts = report.set.get("ts").unwrap();
        assert_eq!(ts.globs, vec!["*.ts", "*.tsx"]);
        assert_eq!(ts.description.as_deref(), Some("TypeScript"));
        assert_eq!(ts.body, "Use strict.\n");
        assert_eq!(ts.origin.as_deref(), Some(".cursor/rules/ts.mdc"));
        assert!(report.set.get("base").unwrap().always_apply);
    }

    #[test]
    fn empty_input_loads_empty_set() {
        let report = load_records(Vec::new(), LoadOptions::default()).unwrap();
        assert!(report.set.is_empty());
        assert!(report.errors.is_empty());
    }

    #[test]
    fn duplicate_id_fails_whole_load() {
        let failure = load_records(
            vec![
                RuleSource::new("x", TS_RULE),
                RuleSource::new("other", BASE_RULE),
                RuleSource::new("x", BASE_RULE),
            ],
            LoadOptions::default(),
        )
        .unwrap_err();

        assert_eq!(failure.errors.len(), 1);
        assert_matches!(&failure.errors[0], RuleError::DuplicateId { id, count: 2 } if id.as_str() == "x");
    }

    #[test]
    fn duplicate_failure_also_reports_malformed_sources() {
        let failure = load_records(
            vec![
                RuleSource::new("x", TS_RULE),
                RuleSource::new("x", TS_RULE),
                RuleSource::new("broken", "no metadata here"),
            ],
            LoadOptions::default(),
        )
        .unwrap_err();

        let kinds: Vec<RuleErrorKind> = failure.errors.iter().map(RuleError::kind).collect();
        assert_eq!(
            kinds,
            vec![RuleErrorKind::DuplicateId, RuleErrorKind::MalformedMetadata]
        );
    }

    #[test]
    fn malformed_source_excluded_siblings_load() {
        let report = load_records(
            vec![
                RuleSource::new("ts", TS_RULE),
                RuleSource::new("broken", "# Title\nno delimiter"),
                RuleSource::new("base", BASE_RULE),
            ],
            LoadOptions::default(),
        )
        .unwrap();

        assert_eq!(report.set.len(), 2);
        assert!(report.set.contains("ts"));
        assert!(report.set.contains("base"));
        assert!(!report.set.contains("broken"));
        assert_eq!(report.errors.len(), 1);
        assert_matches!(&report.errors[0], RuleError::MalformedMetadata { id, .. } if id.as_str() == "broken");
    }

    #[test]
    fn all_malformed_sources_reported_in_one_pass() {
        let report = load_records(
            vec![
                RuleSource::new("a", "nope"),
                RuleSource::new("b", "---\nglobs: *.ts\n"),
                RuleSource::new("c", "---\nalwaysApply: perhaps\n---\n"),
            ],
            LoadOptions::default(),
        )
        .unwrap();

        assert!(report.set.is_empty());
        let ids: Vec<&str> = report
            .errors
            .iter()
            .filter_map(|e| e.rule_id().map(|id| id.as_str()))
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn strict_mode_fails_on_malformed() {
        let failure = load_records(
            vec![
                RuleSource::new("ts", TS_RULE),
                RuleSource::new("broken", "nope"),
            ],
            strict(),
        )
        .unwrap_err();
        assert_eq!(failure.errors.len(), 1);
        assert_eq!(failure.errors[0].kind(), RuleErrorKind::MalformedMetadata);
    }

    #[test]
    fn strict_mode_fails_on_invalid_pattern() {
        let failure = load_records(
            vec![RuleSource::new("bad", "---\nglobs: src/[a-z.ts\n---\n")],
            strict(),
        )
        .unwrap_err();
        assert_eq!(failure.errors[0].kind(), RuleErrorKind::InvalidPattern);
    }

    #[test]
    fn lenient_mode_keeps_record_with_invalid_pattern() {
        let report = load_records(
            vec![RuleSource::new("bad", "---\nglobs: src/[a-z.ts\n---\n")],
            LoadOptions::default(),
        )
        .unwrap();
        assert!(report.set.contains("bad"));
        assert!(report.errors.is_empty());
        assert_eq!(report.set.pattern_errors().len(), 1);
    }

    #[test]
    fn blank_id_is_malformed() {
        let report = load_records(vec![RuleSource::new("  ", TS_RULE)], LoadOptions::default())
            .unwrap();
        assert!(report.set.is_empty());
        assert_eq!(report.errors[0].kind(), RuleErrorKind::MalformedMetadata);
    }

    #[test]
    fn discovery_errors_carried_into_report() {
        let discovered = DiscoveryResult {
            sources: vec![RuleSource::new("ts", TS_RULE)],
            errors: vec![RuleError::Unreadable {
                id: "huge".into(),
                message: "too large".into(),
            }],
        };
        let report = load_discovered(discovered, LoadOptions::default()).unwrap();
        assert_eq!(report.set.len(), 1);
        assert_eq!(report.errors[0].kind(), RuleErrorKind::Unreadable);
    }

    #[test]
    fn excluded_sources_are_logged() {
        let (logs, _guard) = capture_logs();
        let _ = load_records(vec![RuleSource::new("broken", "nope")], LoadOptions::default())
            .unwrap();
        assert!(logs.has_event(Level::WARN, "rule source excluded"));
    }

    #[test]
    fn options_from_settings() {
        let settings = RulesSettings {
            strict: true,
            case_insensitive: true,
            ..RulesSettings::default()
        };
        let options = LoadOptions::from_settings(&settings);
        assert!(options.strict);
        assert!(options.glob.case_insensitive);
    }
}
