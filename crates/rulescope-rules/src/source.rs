//! Raw rule sources handed to the loader.

use rulescope_core::RuleId;

/// One unparsed rule document plus the id it will be loaded under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleSource {
    /// Id the resulting record will carry.
    pub id: RuleId,
    /// Where the content came from (diagnostics only).
    pub origin: Option<String>,
    /// Raw document text.
    pub content: String,
}

impl RuleSource {
    /// Create a source with an explicit id.
    pub fn new(id: impl Into<RuleId>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            origin: None,
            content: content.into(),
        }
    }

    /// Create a source whose id is derived from its relative file path.
    ///
    /// The origin is set to the path as given.
    pub fn from_relative_path(relative_path: &str, content: impl Into<String>) -> Self {
        Self {
            id: id_from_relative_path(relative_path),
            origin: Some(relative_path.to_owned()),
            content: content.into(),
        }
    }

    /// Builder-style setter for `origin`.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

/// Derive a rule id from a path relative to its rules directory.
///
/// ```text
/// id_from_relative_path("react.mdc")          → "react"
/// id_from_relative_path("frontend/react.mdc") → "frontend/react"
/// id_from_relative_path("./notes")            → "notes"
/// ```
pub fn id_from_relative_path(relative_path: &str) -> RuleId {
    let normalized = relative_path.replace('\\', "/");
    let mut path = normalized.as_str();
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }

    let (dir, file) = match path.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, path),
    };
    // Dotfiles like ".rules" keep their name
    let stem = match file.rfind('.') {
        Some(idx) if idx > 0 => &file[..idx],
        _ => file,
    };

    match dir {
        Some(dir) if !dir.is_empty() => RuleId::from(format!("{dir}/{stem}")),
        _ => RuleId::from(stem),
    }
}
