//! # rulescope
//!
//! Command-line front end: discovers the rules of a project, then resolves
//! candidate paths, checks the rule set for errors, or lists loaded records.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use rulescope_core::logging::{init_subscriber, verbosity_level};
use rulescope_core::{ResolutionResult, RuleError, RuleMatch, RuleRecord};
use rulescope_rules::{
    DiscoveryConfig, LoadFailure, LoadOptions, LoadReport, discover_rule_sources,
    load_discovered, resolve,
};
use rulescope_settings::{RulescopeSettings, load_settings, load_settings_from_path};

/// Resolve which project rules apply to a file.
#[derive(Parser, Debug)]
#[command(name = "rulescope", version, about = "Resolve which project rules apply to a file")]
struct Cli {
    /// Project root containing the rules directories.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Rules directory relative to the root (repeatable, replaces settings).
    #[arg(long = "rules-dir", global = true)]
    rules_dirs: Vec<String>,

    /// Fail on any malformed rule instead of skipping it.
    #[arg(long, global = true)]
    strict: bool,

    /// Settings file (defaults to `~/.rulescope/settings.json`).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Emit JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the rules applicable to each path, in order.
    Resolve {
        /// Candidate paths, relative to the project root.
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Load every rule and report all errors.
    Check,
    /// List loaded rule records.
    List,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let mut settings = match &cli.settings {
        Some(path) => load_settings_from_path(path)
            .with_context(|| format!("Failed to load settings: {}", path.display()))?,
        None => load_settings().context("Failed to load settings")?,
    };
    apply_cli_overrides(&mut settings, cli);
    init_subscriber(verbosity_level(&settings.logging.level, cli.verbose));
    debug!(root = %cli.root.display(), dirs = ?settings.rules.dirs, "rulescope starting");

    let loaded = load_project(cli, &settings);
    match &cli.command {
        Command::Resolve { paths } => cmd_resolve(&loaded.map_err(report_failure)?, paths, cli.json),
        Command::Check => cmd_check(&loaded, cli.json),
        Command::List => cmd_list(&loaded.map_err(report_failure)?, cli.json),
    }
}

fn report_failure(failure: LoadFailure) -> anyhow::Error {
    for err in &failure.errors {
        eprintln!("error: {err}");
    }
    anyhow::Error::new(failure)
}

/// Command-line flags take precedence over settings and environment.
fn apply_cli_overrides(settings: &mut RulescopeSettings, cli: &Cli) {
    if !cli.rules_dirs.is_empty() {
        settings.rules.dirs.clone_from(&cli.rules_dirs);
    }
    if cli.strict {
        settings.rules.strict = true;
    }
}

fn load_project(cli: &Cli, settings: &RulescopeSettings) -> Result<LoadReport, LoadFailure> {
    let config = DiscoveryConfig::from_settings(&cli.root, &settings.rules);
    let discovered = discover_rule_sources(&config);
    load_discovered(discovered, LoadOptions::from_settings(&settings.rules))
}

fn cmd_resolve(report: &LoadReport, paths: &[String], json: bool) -> Result<ExitCode> {
    for err in &report.errors {
        eprintln!("warning: {err}");
    }

    let mut results = Vec::with_capacity(paths.len());
    let mut failed = false;
    for path in paths {
        match resolve(path, &report.set) {
            Ok(result) => results.push(result),
            Err(e) => {
                eprintln!("error: {e}");
                failed = true;
            }
        }
    }

    if let Some(first) = results.first() {
        for err in &first.errors {
            eprintln!("warning: {err}");
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print!("{}", format_results(&results));
    }

    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn cmd_check(loaded: &Result<LoadReport, LoadFailure>, json: bool) -> Result<ExitCode> {
    let (errors, loaded_count) = match loaded {
        Ok(report) => {
            let mut errors = report.errors.clone();
            errors.extend(report.set.pattern_errors().iter().cloned());
            (errors, report.set.len())
        }
        Err(failure) => (failure.errors.clone(), 0),
    };

    if json {
        let entries: Vec<serde_json::Value> = errors.iter().map(error_json).collect();
        let summary = serde_json::json!({ "loaded": loaded_count, "errors": entries });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for err in &errors {
            println!("{err}");
        }
        println!("{loaded_count} rule(s) loaded, {} error(s)", errors.len());
    }

    Ok(if errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn cmd_list(report: &LoadReport, json: bool) -> Result<ExitCode> {
    for err in &report.errors {
        eprintln!("warning: {err}");
    }
    let records: Vec<&RuleRecord> = report.set.records().collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for record in records {
            println!("{}", format_record(record));
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Text output for `resolve`: a `path:` header, then `id<TAB>reason` lines.
fn format_results(results: &[ResolutionResult]) -> String {
    let mut out = String::new();
    for result in results {
        out.push_str(&result.path);
        out.push_str(":\n");
        for m in &result.matches {
            out.push_str(&format_match(m));
            out.push('\n');
        }
    }
    out
}

fn format_match(m: &RuleMatch) -> String {
    format!("{}\t{}", m.id, m.reason)
}

fn format_record(record: &RuleRecord) -> String {
    let scope = if record.always_apply {
        "always".to_string()
    } else if record.globs.is_empty() {
        "-".to_string()
    } else {
        record.globs.join(", ")
    };
    match &record.description {
        Some(desc) => format!("{}\t{scope}\t{desc}", record.id),
        None => format!("{}\t{scope}", record.id),
    }
}

fn error_json(err: &RuleError) -> serde_json::Value {
    serde_json::json!({
        "kind": err.kind(),
        "id": err.rule_id(),
        "message": err.to_string(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rulescope_core::MatchReason;
    use rulescope_rules::RuleRecordSet;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn write_rule(root: &std::path::Path, name: &str, content: &str) {
        let dir = root.join(".cursor/rules");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn parses_resolve_with_global_flags() {
        let cli = parse(&["rulescope", "resolve", "src/a.ts", "--json", "-vv", "--strict"]);
        assert!(cli.json);
        assert!(cli.strict);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Resolve { paths } => assert_eq!(paths, vec!["src/a.ts"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn resolve_requires_a_path() {
        assert!(Cli::try_parse_from(["rulescope", "resolve"]).is_err());
    }

    #[test]
    fn cli_overrides_settings() {
        let cli = parse(&["rulescope", "--rules-dir", "docs/rules", "--strict", "check"]);
        let mut settings = RulescopeSettings::default();
        apply_cli_overrides(&mut settings, &cli);
        assert_eq!(settings.rules.dirs, vec!["docs/rules"]);
        assert!(settings.rules.strict);
    }

    #[test]
    fn no_flags_keep_settings() {
        let cli = parse(&["rulescope", "list"]);
        let mut settings = RulescopeSettings::default();
        apply_cli_overrides(&mut settings, &cli);
        assert_eq!(settings, RulescopeSettings::default());
    }

    #[test]
    fn match_line_is_tab_separated() {
        let m = RuleMatch {
            id: "ts".into(),
            reason: MatchReason::Glob("*.ts".into()),
            glob: Some("*.ts".into()),
            specificity: 3,
        };
        assert_eq!(format_match(&m), "ts\t*.ts");
    }

    #[test]
    fn record_line_shows_scope() {
        let always = RuleRecord::new("base").with_always_apply(true);
        assert_eq!(format_record(&always), "base\talways");

        let scoped = RuleRecord::new("ts")
            .with_globs(["*.ts", "*.tsx"])
            .with_description("TypeScript");
        assert_eq!(format_record(&scoped), "ts\t*.ts, *.tsx\tTypeScript");

        assert_eq!(format_record(&RuleRecord::new("manual")), "manual\t-");
    }

    #[test]
    fn results_text_groups_by_path() {
        let set = RuleRecordSet::build(
            vec![
                RuleRecord::new("base").with_always_apply(true),
                RuleRecord::new("ts").with_globs(["*.ts"]),
            ],
            rulescope_rules::GlobOptions::default(),
        )
        .unwrap();
        let results = vec![
            resolve("src/a.ts", &set).unwrap(),
            resolve("README.md", &set).unwrap(),
        ];
        assert_eq!(
            format_results(&results),
            "src/a.ts:\nbase\talways\nts\t*.ts\nREADME.md:\nbase\talways\n"
        );
    }

    #[test]
    fn load_project_reads_rules_under_root() {
        let tmp = tempfile::tempdir().unwrap();
        write_rule(tmp.path(), "ts.mdc", "---\nglobs: *.ts\n---\n");
        write_rule(tmp.path(), "bad.mdc", "no header");

        let root = tmp.path().to_str().unwrap();
        let cli = parse(&["rulescope", "--root", root, "check"]);
        let report = load_project(&cli, &RulescopeSettings::default()).unwrap();
        assert_eq!(report.set.len(), 1);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn error_json_carries_kind_and_id() {
        let err = RuleError::malformed("bad", "missing closing delimiter");
        let value = error_json(&err);
        assert_eq!(value["kind"], "malformedMetadata");
        assert_eq!(value["id"], "bad");
    }
}
