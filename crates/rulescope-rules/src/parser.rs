//! Rule document parser.
//!
//! A rule document is a metadata block delimited by `---` lines followed by
//! an opaque body:
//!
//! ```text
//! ---
//! description: React component conventions
//! globs: *.tsx, src/components/**/*.ts
//! alwaysApply: false
//! ---
//! Prefer function components...
//! ```
//!
//! The metadata block is a small YAML subset (no external YAML dependency):
//! `key: value` lines, quoted strings, booleans, inline arrays `[a, b]` and
//! multi-line `- item` lists. Missing keys take their defaults; only
//! structurally unparsable input is an error.

use tracing::debug;

use rulescope_core::{RuleError, RuleId};

use crate::glob::{split_pattern_list, unquote, unquote_whole};

/// Metadata delimiter line.
const DELIMITER: &str = "---";

/// Parsed metadata plus body of one rule document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedRule {
    /// `description` value, if present and non-empty.
    pub description: Option<String>,
    /// Glob alternatives, split and unquoted. Never contains empty entries.
    pub globs: Vec<String>,
    /// `alwaysApply` value (false when absent).
    pub always_apply: bool,
    /// Everything after the closing delimiter, verbatim.
    pub body: String,
}

/// What the lines following a valueless key belong to.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Continuation {
    /// `- item` entries of `globs`.
    Globs,
    /// Indented text of a multi-line `description`.
    Description { literal: bool, lines: Vec<String> },
    /// Nested lines of an unknown key.
    Ignored,
}

/// YAML block scalar indicators accepted for `description`.
const BLOCK_INDICATORS: &[&str] = &["", ">", ">-", ">+", "|", "|-", "|+"];

/// Parse a rule document.
///
/// Fails with [`RuleError::MalformedMetadata`] when the opening or closing
/// delimiter is missing, a metadata line is not `key: value`, or
/// `alwaysApply` is not a boolean.
pub fn parse_rule(id: &RuleId, raw: &str) -> Result<ParsedRule, RuleError> {
    let (metadata, body) = split_document(id, raw)?;
    let mut parsed = parse_metadata(id, metadata)?;
    parsed.body = body.to_string();
    Ok(parsed)
}

/// Split a document into `(metadata_block, body)`.
fn split_document<'a>(id: &RuleId, raw: &'a str) -> Result<(&'a str, &'a str), RuleError> {
    let content = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let content = content.trim_start_matches(['\n', '\r', ' ', '\t']);

    let Some(first_end) = line_end(content, 0) else {
        return Err(missing_opening(id, content));
    };
    if content[..first_end.0].trim_end() != DELIMITER {
        return Err(missing_opening(id, content));
    }

    let meta_start = first_end.1;
    let mut pos = meta_start;
    while pos < content.len() {
        let Some((end, next)) = line_end(content, pos) else {
            break;
        };
        if content[pos..end].trim_end() == DELIMITER {
            return Ok((&content[meta_start..pos], &content[next..]));
        }
        pos = next;
    }

    Err(RuleError::malformed(
        id.clone(),
        "metadata block has no closing '---' delimiter",
    ))
}

fn missing_opening(id: &RuleId, content: &str) -> RuleError {
    let message = if content.is_empty() {
        "document is empty; expected a '---' metadata block"
    } else {
        "missing opening '---' metadata delimiter"
    };
    RuleError::malformed(id.clone(), message)
}

/// `(end_of_line_content, start_of_next_line)` for the line starting at
/// `pos`, or `None` past the end.
fn line_end(content: &str, pos: usize) -> Option<(usize, usize)> {
    if pos >= content.len() {
        return None;
    }
    match content[pos..].find('\n') {
        Some(offset) => {
            let end = pos + offset;
            let content_end = if end > pos && content.as_bytes()[end - 1] == b'\r' {
                end - 1
            } else {
                end
            };
            Some((content_end, end + 1))
        }
        None => Some((content.len(), content.len())),
    }
}

fn parse_metadata(id: &RuleId, block: &str) -> Result<ParsedRule, RuleError> {
    let mut parsed = ParsedRule::default();
    let mut pending: Option<Continuation> = None;

    for (index, line) in block.lines().enumerate() {
        let line_no = index + 2; // after the opening delimiter
        let trimmed = line.trim();
        let indented = line.starts_with([' ', '\t']);

        if trimmed.is_empty() {
            continue;
        }
        if let Some(Continuation::Description { lines, .. }) = &mut pending {
            if indented {
                lines.push(trimmed.to_owned());
                continue;
            }
        }
        if trimmed.starts_with('#') {
            continue;
        }
        match &pending {
            Some(Continuation::Globs) => {
                if let Some(item) = trimmed.strip_prefix('-') {
                    parsed.globs.extend(split_pattern_list(item));
                    continue;
                }
            }
            Some(Continuation::Ignored) if indented || trimmed.starts_with('-') => continue,
            _ => {}
        }
        finish_continuation(&mut parsed, pending.take());

        let Some((key, value)) = trimmed.split_once(':') else {
            return Err(RuleError::malformed(
                id.clone(),
                format!("line {line_no}: expected 'key: value', found '{trimmed}'"),
            ));
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() {
            return Err(RuleError::malformed(
                id.clone(),
                format!("line {line_no}: missing key before ':'"),
            ));
        }

        match key {
            "description" => {
                if BLOCK_INDICATORS.contains(&value) {
                    parsed.description = None;
                    pending = Some(Continuation::Description {
                        literal: value.starts_with('|'),
                        lines: Vec::new(),
                    });
                } else {
                    let text = unquote(value);
                    parsed.description = (!text.is_empty()).then_some(text);
                }
            }
            "globs" => {
                if value.is_empty() {
                    pending = Some(Continuation::Globs);
                } else if value.starts_with('[') && value.ends_with(']') {
                    parsed.globs.extend(split_pattern_list(&value[1..value.len() - 1]));
                } else {
                    parsed.globs.extend(split_pattern_list(unquote_whole(value)));
                }
            }
            "alwaysApply" | "always_apply" => {
                parsed.always_apply = parse_bool_value(id, line_no, value)?;
            }
            _ => {
                debug!(rule_id = %id, key, "ignoring unknown metadata key");
                if value.is_empty() || BLOCK_INDICATORS.contains(&value) {
                    pending = Some(Continuation::Ignored);
                }
            }
        }
    }
    finish_continuation(&mut parsed, pending);

    Ok(parsed)
}

/// Apply the lines collected for a multi-line `description`.
///
/// Literal (`|`) blocks keep their line breaks; folded (`>`) and plain
/// blocks join lines with spaces.
fn finish_continuation(parsed: &mut ParsedRule, pending: Option<Continuation>) {
    if let Some(Continuation::Description { literal, lines }) = pending {
        let text = lines.join(if literal { "\n" } else { " " });
        parsed.description = (!text.is_empty()).then_some(text);
    }
}

fn parse_bool_value(id: &RuleId, line_no: usize, value: &str) -> Result<bool, RuleError> {
    let cleaned = unquote(value).to_lowercase();
    match cleaned.as_str() {
        "" | "false" | "no" => Ok(false),
        "true" | "yes" => Ok(true),
        _ => Err(RuleError::malformed(
            id.clone(),
            format!("line {line_no}: alwaysApply must be true or false, found '{value}'"),
        )),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn parse(raw: &str) -> Result<ParsedRule, RuleError> {
        parse_rule(&RuleId::from("test"), raw)
    }

    #[test]
    fn parses_full_metadata() {
        let raw = "---\ndescription: React conventions\nglobs: *.tsx, *.ts\nalwaysApply: false\n---\n# React\n\nUse hooks.\n";
        let rule = parse(raw).unwrap();
        assert_eq!(rule.description.as_deref(), Some("React conventions"));
        assert_eq!(rule.globs, vec!["*.tsx", "*.ts"]);
        assert!(!rule.always_apply);
        assert_eq!(rule.body, "# React\n\nUse hooks.\n");
    }

    #[test]
    fn missing_optional_fields_default() {
        let rule = parse("---\n---\nBody").unwrap();
        assert!(rule.description.is_none());
        assert!(rule.globs.is_empty());
        assert!(!rule.always_apply);
        assert_eq!(rule.body, "Body");
    }

    #[test]
    fn always_apply_true() {
        let rule = parse("---\nalwaysApply: true\n---\n").unwrap();
        assert!(rule.always_apply);
        assert_eq!(rule.body, "");
    }

    #[test]
    fn snake_case_always_apply() {
        let rule = parse("---\nalways_apply: \"true\"\n---\n").unwrap();
        assert!(rule.always_apply);
    }

    #[test]
    fn empty_values_are_defaults() {
        let rule = parse("---\ndescription:\nglobs:\nalwaysApply:\n---\nx").unwrap();
        assert!(rule.description.is_none());
        assert!(rule.globs.is_empty());
        assert!(!rule.always_apply);
    }

    #[test]
    fn inline_array_globs() {
        let rule = parse("---\nglobs: [\"src/**/*.rs\", '*.toml']\n---\n").unwrap();
        assert_eq!(rule.globs, vec!["src/**/*.rs", "*.toml"]);
    }

    #[test]
    fn multiline_list_globs() {
        let rule = parse("---\nglobs:\n  - \"*.py\"\n  - tests/**/*.py\nalwaysApply: false\n---\n").unwrap();
        assert_eq!(rule.globs, vec!["*.py", "tests/**/*.py"]);
    }

    #[test]
    fn inline_array_entry_with_comma_stays_whole() {
        let rule = parse("---\nglobs: [\"a,b.ts\", '*.md']\n---\n").unwrap();
        assert_eq!(rule.globs, vec!["a,b.ts", "*.md"]);
    }

    #[test]
    fn brace_globs_are_not_split() {
        let rule = parse("---\nglobs: **/*.{ts,tsx}, *.md\n---\n").unwrap();
        assert_eq!(rule.globs, vec!["**/*.{ts,tsx}", "*.md"]);
    }

    #[test]
    fn quoted_comma_list() {
        let rule = parse("---\nglobs: \"*.ts,*.tsx\"\n---\n").unwrap();
        assert_eq!(rule.globs, vec!["*.ts", "*.tsx"]);
    }

    #[test]
    fn trailing_commas_never_yield_empty_globs() {
        let rule = parse("---\nglobs: *.ts,,\n---\n").unwrap();
        assert_eq!(rule.globs, vec!["*.ts"]);
    }

    #[test]
    fn folded_description_joins_lines() {
        let raw = "---\ndescription: >\n  Conventions for React\n  components and hooks\nglobs: *.tsx\n---\nbody";
        let rule = parse(raw).unwrap();
        assert_eq!(
            rule.description.as_deref(),
            Some("Conventions for React components and hooks")
        );
        assert_eq!(rule.globs, vec!["*.tsx"]);
        assert_eq!(rule.body, "body");
    }

    #[test]
    fn literal_description_keeps_line_breaks() {
        let raw = "---\ndescription: |-\n  First line\n  # not a comment\nalwaysApply: true\n---\n";
        let rule = parse(raw).unwrap();
        assert_eq!(
            rule.description.as_deref(),
            Some("First line\n# not a comment")
        );
        assert!(rule.always_apply);
    }

    #[test]
    fn plain_multiline_description_at_end_of_block() {
        let rule = parse("---\ndescription:\n  Go style\n  guide\n---\n").unwrap();
        assert_eq!(rule.description.as_deref(), Some("Go style guide"));
    }

    #[test]
    fn block_scalar_under_unknown_key_ignored() {
        let rule = parse("---\nnotes: |\n  free: text\n  more text\nglobs: *.ts\n---\n").unwrap();
        assert_eq!(rule.globs, vec!["*.ts"]);
    }

    #[test]
    fn description_with_colon() {
        let rule = parse("---\ndescription: Note: be terse\n---\n").unwrap();
        assert_eq!(rule.description.as_deref(), Some("Note: be terse"));
    }

    #[test]
    fn unknown_keys_ignored_with_nested_values() {
        let raw = "---\nowner: platform\ntags:\n  - style\n  - ts\nextra:\n  nested: 1\nglobs: *.ts\n---\n";
        let rule = parse(raw).unwrap();
        assert_eq!(rule.globs, vec!["*.ts"]);
    }

    #[test]
    fn comments_and_blank_lines_skipped() {
        let rule = parse("---\n# a comment\n\nglobs: *.go\n---\n").unwrap();
        assert_eq!(rule.globs, vec!["*.go"]);
    }

    #[test]
    fn crlf_line_endings() {
        let rule = parse("---\r\nglobs: *.cs\r\nalwaysApply: true\r\n---\r\nBody\r\n").unwrap();
        assert_eq!(rule.globs, vec!["*.cs"]);
        assert!(rule.always_apply);
        assert_eq!(rule.body, "Body\r\n");
    }

    #[test]
    fn leading_blank_lines_and_bom_tolerated() {
        let rule = parse("\u{feff}\n\n---\nglobs: *.rs\n---\nx").unwrap();
        assert_eq!(rule.globs, vec!["*.rs"]);
    }

    #[test]
    fn body_kept_verbatim_including_later_delimiters() {
        let rule = parse("---\nglobs: *.md\n---\nintro\n---\nmore\n").unwrap();
        assert_eq!(rule.body, "intro\n---\nmore\n");
    }

    #[test]
    fn missing_opening_delimiter_is_malformed() {
        let err = parse("# Just markdown\n\nNo metadata.").unwrap_err();
        assert_matches!(err, RuleError::MalformedMetadata { ref id, ref message }
            if id.as_str() == "test" && message.contains("opening"));
    }

    #[test]
    fn empty_document_is_malformed() {
        assert_matches!(parse(""), Err(RuleError::MalformedMetadata { .. }));
    }

    #[test]
    fn missing_closing_delimiter_is_malformed() {
        let err = parse("---\nglobs: *.ts\nBody without close").unwrap_err();
        assert_matches!(err, RuleError::MalformedMetadata { ref message, .. }
            if message.contains("closing"));
    }

    #[test]
    fn line_without_colon_is_malformed() {
        let err = parse("---\nglobs *.ts\n---\n").unwrap_err();
        assert_matches!(err, RuleError::MalformedMetadata { ref message, .. }
            if message.contains("line 2"));
    }

    #[test]
    fn non_boolean_always_apply_is_malformed() {
        let err = parse("---\nalwaysApply: sometimes\n---\n").unwrap_err();
        assert_matches!(err, RuleError::MalformedMetadata { ref message, .. }
            if message.contains("alwaysApply"));
    }

    #[test]
    fn delimiter_with_trailing_spaces_accepted() {
        let rule = parse("---  \nglobs: *.ts\n---   \nBody").unwrap();
        assert_eq!(rule.globs, vec!["*.ts"]);
        assert_eq!(rule.body, "Body");
    }
}
