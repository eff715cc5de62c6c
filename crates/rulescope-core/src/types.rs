//! Rule records and resolution results.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::errors::RuleError;
use crate::ids::RuleId;

/// One rule document's metadata and content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRecord {
    /// Stable identifier, unique across a record set.
    pub id: RuleId,
    /// Free-text summary. Advisory only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Glob alternatives in declaration order. Entries are never empty.
    #[serde(default)]
    pub globs: Vec<String>,
    /// Apply to every candidate path regardless of `globs`.
    #[serde(default)]
    pub always_apply: bool,
    /// Content after the metadata block, verbatim.
    #[serde(default)]
    pub body: String,
    /// Where the record was loaded from (diagnostics only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl RuleRecord {
    /// Create a record with no metadata beyond its id.
    pub fn new(id: impl Into<RuleId>) -> Self {
        Self {
            id: id.into(),
            description: None,
            globs: Vec::new(),
            always_apply: false,
            body: String::new(),
            origin: None,
        }
    }

    /// Builder-style setter for `globs`.
    #[must_use]
    pub fn with_globs<I, S>(mut self, globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.globs = globs.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style setter for `always_apply`.
    #[must_use]
    pub fn with_always_apply(mut self, always_apply: bool) -> Self {
        self.always_apply = always_apply;
        self
    }

    /// Builder-style setter for `description`.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder-style setter for `body`.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

/// Why a rule is in a resolution result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "pattern", rename_all = "camelCase")]
pub enum MatchReason {
    /// The record has `alwaysApply` set.
    Always,
    /// The given glob pattern matched the candidate path.
    Glob(String),
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("always"),
            Self::Glob(pattern) => f.write_str(pattern),
        }
    }
}

/// One applicable rule in a [`ResolutionResult`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMatch {
    /// Id of the applicable record.
    pub id: RuleId,
    /// Display reason. `Always` wins when a record is both always-apply and
    /// glob-matched.
    pub reason: MatchReason,
    /// Most specific pattern that matched, retained even when `reason` is
    /// `Always`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glob: Option<String>,
    /// Literal-character count of `glob` (0 when no pattern matched).
    pub specificity: usize,
}

impl RuleMatch {
    /// `true` if the record applies through its `alwaysApply` flag.
    pub fn is_always(&self) -> bool {
        self.reason == MatchReason::Always
    }
}

/// Ordered rules applicable to one candidate path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    /// The normalized candidate path.
    pub path: String,
    /// Applicable rules, always-apply first, then by specificity.
    pub matches: Vec<RuleMatch>,
    /// Per-record problems observed while resolving (invalid patterns).
    #[serde(serialize_with = "serialize_errors")]
    pub errors: Vec<RuleError>,
}

impl ResolutionResult {
    /// Number of applicable rules.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// `true` if no rule applies.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Ids of the applicable rules, in order.
    pub fn ids(&self) -> Vec<&RuleId> {
        self.matches.iter().map(|m| &m.id).collect()
    }

    /// Look up the match for a rule id.
    pub fn get(&self, id: &str) -> Option<&RuleMatch> {
        self.matches.iter().find(|m| m.id.as_str() == id)
    }

    /// `true` if the rule with `id` applies.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}

fn serialize_errors<S>(errors: &[RuleError], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    struct Entry<'a>(&'a RuleError);

    impl Serialize for Entry<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut s = serializer.serialize_struct("RuleError", 3)?;
            s.serialize_field("kind", &self.0.kind())?;
            s.serialize_field("id", &self.0.rule_id())?;
            s.serialize_field("message", &self.0.to_string())?;
            s.end()
        }
    }

    serializer.collect_seq(errors.iter().map(Entry))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
