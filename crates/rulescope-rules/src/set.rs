//! Immutable, compiled rule record set.
//!
//! A [`RuleRecordSet`] is built once per session. Every record's patterns
//! are compiled up front; a record with an uncompilable pattern keeps its
//! place in the set but takes no part in glob matching, and the failure is
//! kept as a [`RuleError::InvalidPattern`] for every resolution to report.
//! The set is never mutated after construction, so it can be shared across
//! threads behind an `Arc`.

use std::collections::HashMap;

use tracing::{debug, warn};

use rulescope_core::{RuleError, RuleId, RuleRecord};

use crate::glob::{GlobOptions, GlobPattern};

/// A record with its compiled patterns.
#[derive(Clone, Debug)]
pub(crate) struct CompiledRule {
    pub(crate) record: RuleRecord,
    /// Empty when any pattern failed to compile.
    pub(crate) patterns: Vec<GlobPattern>,
    pub(crate) matchable: bool,
}

impl CompiledRule {
    fn compile(record: RuleRecord, options: GlobOptions, errors: &mut Vec<RuleError>) -> Self {
        let mut patterns = Vec::with_capacity(record.globs.len());
        let mut matchable = true;

        for raw in &record.globs {
            match GlobPattern::compile(raw, options) {
                Ok(pattern) => patterns.push(pattern),
                Err(e) => {
                    warn!(rule_id = %record.id, pattern = %raw, error = %e, "invalid glob pattern, rule excluded from matching");
                    errors.push(RuleError::InvalidPattern {
                        id: record.id.clone(),
                        pattern: raw.clone(),
                        message: e.kind().to_string(),
                    });
                    matchable = false;
                }
            }
        }

        if !matchable {
            patterns.clear();
        }

        Self {
            record,
            patterns,
            matchable,
        }
    }

    /// The most specific pattern matching `path` (first on ties).
    pub(crate) fn best_match(&self, path: &str) -> Option<&GlobPattern> {
        if !self.matchable {
            return None;
        }
        let mut best: Option<&GlobPattern> = None;
        for pattern in &self.patterns {
            if !pattern.is_match(path) {
                continue;
            }
            if best.is_none_or(|b| pattern.specificity() > b.specificity()) {
                best = Some(pattern);
            }
        }
        best
    }
}

/// Immutable set of loaded rule records, in input order.
#[derive(Clone, Debug, Default)]
pub struct RuleRecordSet {
    rules: Vec<CompiledRule>,
    index: HashMap<RuleId, usize>,
    pattern_errors: Vec<RuleError>,
}

impl RuleRecordSet {
    /// An empty set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a set from records, compiling their patterns.
    ///
    /// Fails with one [`RuleError::DuplicateId`] per shared id. Invalid
    /// patterns do not fail the build; see [`Self::pattern_errors`].
    pub fn build(records: Vec<RuleRecord>, options: GlobOptions) -> Result<Self, Vec<RuleError>> {
        let duplicates = find_duplicate_ids(records.iter().map(|r| &r.id));
        if !duplicates.is_empty() {
            return Err(duplicates);
        }

        let mut pattern_errors = Vec::new();
        let mut rules = Vec::with_capacity(records.len());
        let mut index = HashMap::with_capacity(records.len());

        for record in records {
            let _ = index.insert(record.id.clone(), rules.len());
            rules.push(CompiledRule::compile(record, options, &mut pattern_errors));
        }

        debug!(
            count = rules.len(),
            invalid_patterns = pattern_errors.len(),
            "rule record set built"
        );

        Ok(Self {
            rules,
            index,
            pattern_errors,
        })
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// `true` if the set has no records.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Look up a record by id.
    pub fn get(&self, id: &str) -> Option<&RuleRecord> {
        let idx = self.index.get(id)?;
        self.rules.get(*idx).map(|r| &r.record)
    }

    /// `true` if a record with `id` exists.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Records in input order.
    pub fn records(&self) -> impl Iterator<Item = &RuleRecord> {
        self.rules.iter().map(|r| &r.record)
    }

    /// Patterns that failed to compile, in record order.
    pub fn pattern_errors(&self) -> &[RuleError] {
        &self.pattern_errors
    }

    pub(crate) fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }
}

/// One [`RuleError::DuplicateId`] per id that occurs more than once, in
/// order of first appearance.
pub(crate) fn find_duplicate_ids<'a, I>(ids: I) -> Vec<RuleError>
where
    I: IntoIterator<Item = &'a RuleId>,
{
    let mut order: Vec<&RuleId> = Vec::new();
    let mut counts: HashMap<&RuleId, usize> = HashMap::new();
    for id in ids {
        let count = counts.entry(id).or_insert(0);
        if *count == 0 {
            order.push(id);
        }
        *count += 1;
    }

    order
        .into_iter()
        .filter_map(|id| {
            let count = counts.get(id).copied().unwrap_or(0);
            (count > 1).then(|| RuleError::DuplicateId {
                id: id.clone(),
                count,
            })
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
