// crates/review-gate-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing, settings layering, and
// offline report rendering.
// Purpose: Ensure flags override environment settings and rendering is
// driven by the serialized result alone.
// Dependencies: review-gate-cli main helpers, review-gate-config,
// review-gate-core, tempfile
// ============================================================================

//! ## Overview
//! Validates the CLI surface without touching the network: command parsing,
//! the flag-over-environment layering rule, and the `report render` path.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;

use clap::Parser;
use review_gate_config::GateSettings;
use review_gate_core::ReviewResult;

use super::Cli;
use super::Commands;
use super::RulesCommand;
use super::apply_overrides;
use super::command_rules_validate;
use super::parse_cli;
use super::render_result;

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn review_command_parses_all_flags() {
    let cli = Cli::try_parse_from([
        "review-gate",
        "review",
        "--pr",
        "42",
        "--repo",
        "acme/widgets",
        "--rules",
        "team.toml",
        "--strict",
        "--max-lines",
        "800",
        "--max-files",
        "12",
    ])
    .expect("arguments must parse");
    let Some(Commands::Review(command)) = cli.command else {
        panic!("expected a review command");
    };
    assert_eq!(command.pr, "42");
    assert_eq!(command.repo, "acme/widgets");
    assert!(command.strict);
    assert_eq!(command.max_lines, Some(800));
    assert_eq!(command.max_files, Some(12));
}

#[test]
fn review_command_requires_pr_and_repo() {
    assert!(Cli::try_parse_from(["review-gate", "review", "--pr", "42"]).is_err());
    assert!(Cli::try_parse_from(["review-gate", "review", "--repo", "acme/widgets"]).is_err());
}

#[test]
fn rules_validate_requires_a_path() {
    let parsed = Cli::try_parse_from(["review-gate", "rules", "validate"]);
    assert!(parsed.is_err());
}

#[test]
fn usage_errors_become_startup_failures() {
    // Startup failures share exit code 3 via `emit_error`; a usage error
    // must never surface through clap's own exit with the refusal code.
    let err = parse_cli(["review-gate", "review", "--bogus"]).expect_err("unknown flag must fail");
    assert!(err.to_string().contains("--bogus"));
}

#[test]
fn help_request_terminates_successfully() {
    let parsed = parse_cli(["review-gate", "--help"]).expect("help must not be an error");
    assert!(parsed.is_none());
}

// ============================================================================
// SECTION: Settings Layering
// ============================================================================

#[test]
fn flags_override_environment_settings() {
    let cli = Cli::try_parse_from([
        "review-gate",
        "review",
        "--pr",
        "42",
        "--repo",
        "acme/widgets",
        "--strict",
        "--max-lines",
        "800",
    ])
    .expect("arguments must parse");
    let Some(Commands::Review(command)) = cli.command else {
        panic!("expected a review command");
    };

    let mut settings = GateSettings::default();
    apply_overrides(&mut settings, &command);

    assert!(settings.strict_mode);
    assert_eq!(settings.limits.max_lines, 800);
    // Untouched flags keep the resolved defaults.
    assert_eq!(settings.limits.max_files, GateSettings::default().limits.max_files);
    assert!(settings.custom_rules_path.is_none());
}

#[test]
fn absent_flags_leave_settings_unchanged() {
    let cli = Cli::try_parse_from(["review-gate", "review", "--pr", "42", "--repo", "a/b"])
        .expect("arguments must parse");
    let Some(Commands::Review(command)) = cli.command else {
        panic!("expected a review command");
    };

    let mut settings = GateSettings::default();
    apply_overrides(&mut settings, &command);

    assert_eq!(settings, GateSettings::default());
}

// ============================================================================
// SECTION: Rule Validation
// ============================================================================

#[test]
fn rules_validate_accepts_a_well_formed_overlay() {
    let dir = tempfile::tempdir().expect("create temp directory");
    let path = dir.path().join("team.toml");
    fs::write(
        &path,
        concat!(
            "[[rules]]\n",
            "id = \"ORG001\"\n",
            "category = \"maintainability\"\n",
            "severity = \"warning\"\n",
            "description = \"No println in committed code\"\n",
            "pattern = \"println!\"\n",
        ),
    )
    .expect("write overlay");

    let cli = Cli::try_parse_from([
        "review-gate",
        "rules",
        "validate",
        "--rules",
        path.to_str().expect("utf-8 path"),
    ])
    .expect("arguments must parse");
    let Some(Commands::Rules {
        command: RulesCommand::Validate(command),
    }) = cli.command
    else {
        panic!("expected a rules validate command");
    };

    assert!(command_rules_validate(&command).is_ok());
}

#[test]
fn rules_validate_rejects_an_unknown_severity() {
    let dir = tempfile::tempdir().expect("create temp directory");
    let path = dir.path().join("team.toml");
    fs::write(
        &path,
        concat!(
            "[[rules]]\n",
            "id = \"ORG002\"\n",
            "category = \"safety\"\n",
            "severity = \"blocker\"\n",
            "description = \"Bad severity\"\n",
            "pattern = \"x\"\n",
        ),
    )
    .expect("write overlay");

    let cli = Cli::try_parse_from([
        "review-gate",
        "rules",
        "validate",
        "--rules",
        path.to_str().expect("utf-8 path"),
    ])
    .expect("arguments must parse");
    let Some(Commands::Rules {
        command: RulesCommand::Validate(command),
    }) = cli.command
    else {
        panic!("expected a rules validate command");
    };

    let err = command_rules_validate(&command).expect_err("overlay must be rejected");
    assert!(err.to_string().contains("rule validation failed"));
}

// ============================================================================
// SECTION: Report Rendering
// ============================================================================

#[test]
fn render_result_produces_the_pass_report() {
    let result = ReviewResult::reviewed(Vec::new(), false);
    let text = serde_json::to_string(&result).expect("serialize result");

    let report = render_result(&text).expect("rendering must succeed");

    assert!(report.contains("## ✅ Review Gate: pass"));
}

#[test]
fn render_result_rejects_malformed_json() {
    let err = render_result("not json").expect_err("malformed input must fail");
    assert!(err.to_string().contains("result decode failed"));
}
