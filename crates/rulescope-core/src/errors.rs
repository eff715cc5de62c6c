//! Error taxonomy for loading and resolving rules.
//!
//! Every record-level variant carries the offending rule id so a caller can
//! report all problems of a load or resolution at once. [`RuleErrorKind`]
//! gives a cheap, copyable classification for filtering and strict-mode
//! decisions.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::RuleId;

/// Errors produced while loading rule sources or resolving a path.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuleError {
    /// A source's metadata block is structurally unparsable.
    #[error("malformed metadata in rule '{id}': {message}")]
    MalformedMetadata {
        /// Id of the offending source.
        id: RuleId,
        /// What was wrong with the block.
        message: String,
    },

    /// Two or more sources resolved to the same id.
    #[error("duplicate rule id '{id}' ({count} sources)")]
    DuplicateId {
        /// The shared id.
        id: RuleId,
        /// How many sources declared it.
        count: usize,
    },

    /// A glob pattern failed to compile.
    #[error("invalid glob pattern '{pattern}' in rule '{id}': {message}")]
    InvalidPattern {
        /// Id of the record owning the pattern.
        id: RuleId,
        /// The pattern text as written.
        pattern: String,
        /// Compiler diagnostic.
        message: String,
    },

    /// A rule source could not be read (I/O failure or size limit).
    #[error("unreadable rule source '{id}': {message}")]
    Unreadable {
        /// Id the source would have had.
        id: RuleId,
        /// Underlying failure.
        message: String,
    },

    /// The candidate path of a resolution request is not a normalized
    /// relative path.
    #[error("invalid candidate path '{path}': {message}")]
    InvalidPath {
        /// The rejected path.
        path: String,
        /// Why it was rejected.
        message: String,
    },
}

/// Coarse classification of a [`RuleError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleErrorKind {
    /// See [`RuleError::MalformedMetadata`].
    MalformedMetadata,
    /// See [`RuleError::DuplicateId`].
    DuplicateId,
    /// See [`RuleError::InvalidPattern`].
    InvalidPattern,
    /// See [`RuleError::Unreadable`].
    Unreadable,
    /// See [`RuleError::InvalidPath`].
    InvalidPath,
}

impl fmt::Display for RuleErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MalformedMetadata => "MalformedMetadata",
            Self::DuplicateId => "DuplicateId",
            Self::InvalidPattern => "InvalidPattern",
            Self::Unreadable => "Unreadable",
            Self::InvalidPath => "InvalidPath",
        };
        f.write_str(s)
    }
}

impl RuleError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> RuleErrorKind {
        match self {
            Self::MalformedMetadata { .. } => RuleErrorKind::MalformedMetadata,
            Self::DuplicateId { .. } => RuleErrorKind::DuplicateId,
            Self::InvalidPattern { .. } => RuleErrorKind::InvalidPattern,
            Self::Unreadable { .. } => RuleErrorKind::Unreadable,
            Self::InvalidPath { .. } => RuleErrorKind::InvalidPath,
        }
    }

    /// The rule id this error is about, if it concerns a record.
    #[must_use]
    pub fn rule_id(&self) -> Option<&RuleId> {
        match self {
            Self::MalformedMetadata { id, .. }
            | Self::DuplicateId { id, .. }
            | Self::InvalidPattern { id, .. }
            | Self::Unreadable { id, .. } => Some(id),
            Self::InvalidPath { .. } => None,
        }
    }

    /// Shorthand constructor for [`RuleError::MalformedMetadata`].
    pub fn malformed(id: impl Into<RuleId>, message: impl Into<String>) -> Self {
        Self::MalformedMetadata {
            id: id.into(),
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
