//! Glob patterns for rule applicability.
//!
//! Thin layer over [`globset`] with the semantics rule authors expect:
//!
//! - `*` matches any run of characters except `/`
//! - `**` matches across separators (`src/**/*.ts`, `**/*.rs`)
//! - `?` matches one character except `/`
//! - `[...]` / `[!...]` match a character set, `{a,b}` alternation
//! - a pattern with no `/` is also tested against the final path component,
//!   so `*.ts` applies to `src/a.ts`
//!
//! Specificity is the count of literal characters in the pattern and is
//! used to order overlapping matches.

use globset::{GlobBuilder, GlobMatcher};

/// Options applied when compiling patterns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlobOptions {
    /// Match letters case-insensitively.
    pub case_insensitive: bool,
}

/// A compiled glob pattern.
#[derive(Clone, Debug)]
pub struct GlobPattern {
    raw: String,
    matcher: GlobMatcher,
    file_name_fallback: bool,
    specificity: usize,
}

impl GlobPattern {
    /// Compile `pattern`.
    ///
    /// A leading `./` or `/` is ignored: candidate paths are always relative
    /// to the project root.
    pub fn compile(pattern: &str, options: GlobOptions) -> Result<Self, globset::Error> {
        let normalized = normalize_pattern(pattern);
        let glob = GlobBuilder::new(normalized)
            .literal_separator(true)
            .backslash_escape(true)
            .case_insensitive(options.case_insensitive)
            .build()?;

        Ok(Self {
            raw: pattern.to_owned(),
            matcher: glob.compile_matcher(),
            file_name_fallback: !normalized.contains('/'),
            specificity: specificity(normalized),
        })
    }

    /// The pattern as written by the rule author.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Literal-character count of the pattern.
    pub fn specificity(&self) -> usize {
        self.specificity
    }

    /// Test a normalized, slash-separated relative path.
    pub fn is_match(&self, path: &str) -> bool {
        if self.matcher.is_match(path) {
            return true;
        }
        if !self.file_name_fallback {
            return false;
        }
        match path.rsplit_once('/') {
            Some((_, file_name)) => self.matcher.is_match(file_name),
            None => false,
        }
    }
}

fn normalize_pattern(pattern: &str) -> &str {
    let mut p = pattern.trim();
    while let Some(rest) = p.strip_prefix("./") {
        p = rest;
    }
    p.trim_start_matches('/')
}

/// Count literal (non-wildcard) characters in a pattern.
///
/// `*`, `?`, bracket classes and `{...}` groups contribute nothing; an
/// escaped character counts as one literal.
///
/// ```text
/// specificity("src/*.ts")   → 7
/// specificity("*.ts")       → 3
/// specificity("**/*.{ts,tsx}") → 2
/// ```
pub fn specificity(pattern: &str) -> usize {
    let chars: Vec<char> = pattern.chars().collect();
    let mut count = 0;
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                count += 1;
                i += 2;
            }
            '*' | '?' => i += 1,
            '[' => i = skip_class(&chars, i),
            '{' => i = skip_group(&chars, i),
            _ => {
                count += 1;
                i += 1;
            }
        }
    }

    count
}

/// Index just past the `]` closing the class opened at `start`.
fn skip_class(chars: &[char], start: usize) -> usize {
    let mut i = start + 1;
    if i < chars.len() && (chars[i] == '!' || chars[i] == '^') {
        i += 1;
    }
    // A leading ']' is a member of the class
    if i < chars.len() && chars[i] == ']' {
        i += 1;
    }
    while i < chars.len() && chars[i] != ']' {
        i += 1;
    }
    i + 1
}

/// Index just past the `}` closing the group opened at `start`.
fn skip_group(chars: &[char], start: usize) -> usize {
    let mut depth = 0usize;
    let mut i = start;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    i
}

/// Split a comma-separated pattern list into independent alternatives.
///
/// Commas inside `{...}` groups, `[...]` classes and quoted entries do not
/// split. Entries are trimmed and unquoted; empty entries are dropped.
pub fn split_pattern_list(value: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut brace_depth = 0usize;
    let mut in_class = false;
    let mut quote: Option<char> = None;
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                continue;
            }
            '"' | '\'' if quote == Some(c) => quote = None,
            _ if quote.is_some() => {}
            '"' | '\'' if !in_class && current.trim().is_empty() => quote = Some(c),
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '{' if !in_class => brace_depth += 1,
            '}' if !in_class && brace_depth > 0 => brace_depth -= 1,
            ',' if !in_class && brace_depth == 0 => {
                push_entry(&mut out, &current);
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    push_entry(&mut out, &current);
    out
}

fn push_entry(out: &mut Vec<String>, raw: &str) {
    let entry = unquote(raw);
    if !entry.is_empty() {
        out.push(entry);
    }
}

/// Unquote a scalar list value when the quotes wrap the whole value.
///
/// `"*.ts,*.tsx"` becomes `*.ts,*.tsx`; `"a.ts", "b.ts"` is left alone so
/// each entry is unquoted on its own.
pub(crate) fn unquote_whole(s: &str) -> &str {
    let trimmed = s.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open @ ('"' | '\'')), Some(close))
            if open == close && !chars.as_str().contains(open) =>
        {
            chars.as_str()
        }
        _ => trimmed,
    }
}

/// Remove surrounding quotes from a string value.
pub(crate) fn unquote(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')))
    {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
