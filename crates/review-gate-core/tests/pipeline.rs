// crates/review-gate-core/tests/pipeline.rs
// ============================================================================
// Module: Pipeline Tests
// Description: End-to-end orchestrator runs over stubbed collaborators.
// Purpose: Verify phase ordering, exit codes, and publication behavior.
// Dependencies: review-gate-core, tokio
// ============================================================================

//! ## Overview
//! Drives the orchestrator end to end with stubbed diff sources, analyzers,
//! and publishers: clean passes, critical failures, refusals, degraded
//! pipelines, rule overlays, and fetch/publish faults.

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

mod common;

use std::sync::Arc;

use review_gate_core::DiffSource;
use review_gate_core::FixTemplate;
use review_gate_core::Orchestrator;
use review_gate_core::OrchestratorConfig;
use review_gate_core::RefusalReason;
use review_gate_core::ReviewStatus;
use review_gate_core::Rule;
use review_gate_core::RuleCategory;
use review_gate_core::RuleId;
use review_gate_core::RuleSet;
use review_gate_core::RunPhase;
use review_gate_core::SemanticAnalyzer;
use review_gate_core::Severity;
use review_gate_core::builtin::builtin_rule_set;
use review_gate_core::orchestrator::RunOutcome;

use crate::common::FailingAnalyzer;
use crate::common::RecordingPublisher;
use crate::common::ScriptedAnalyzer;
use crate::common::StubSource;
use crate::common::changes_for;
use crate::common::text_file;

/// Runs one orchestrated review over the given collaborators.
async fn run_pipeline(
    source: StubSource,
    analyzer: Arc<dyn SemanticAnalyzer>,
    publisher: Arc<RecordingPublisher>,
    rule_set: RuleSet,
    config: OrchestratorConfig,
) -> RunOutcome {
    let source: Arc<dyn DiffSource> = Arc::new(source);
    let orchestrator =
        Orchestrator::new(source, analyzer, publisher, Arc::new(rule_set), config);
    orchestrator.run("42").await
}

/// Builds the built-in rule set.
fn rules() -> RuleSet {
    builtin_rule_set().expect("built-in catalog must validate")
}

#[tokio::test]
async fn critical_violation_fails_the_gate() {
    let changes = changes_for(vec![text_file(
        "src/db.py",
        "query = f\"SELECT * FROM users WHERE id = {user_id}\"\n",
    )]);
    let publisher = RecordingPublisher::new();
    let outcome = run_pipeline(
        StubSource::with_changes(changes),
        Arc::new(ScriptedAnalyzer::quiet()),
        Arc::clone(&publisher),
        rules(),
        OrchestratorConfig::default(),
    )
    .await;

    assert_eq!(outcome.result.status, ReviewStatus::Fail);
    assert_eq!(outcome.exit_code, 1);
    assert!(outcome.published);
    assert_eq!(outcome.publish_error, None);
    assert!(outcome.report.contains("SEC001"));
    assert_eq!(
        outcome.phases,
        vec![
            RunPhase::Fetching,
            RunPhase::ContextCheck,
            RunPhase::Reviewing,
            RunPhase::Reporting,
            RunPhase::Publishing,
            RunPhase::Done,
        ]
    );

    let published = publisher.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].status, ReviewStatus::Fail);
    assert_eq!(published[0].idempotency_key, "deadbeef");
    assert_eq!(published[0].report, outcome.report);
}

#[tokio::test]
async fn clean_change_passes() {
    let changes = changes_for(vec![text_file(
        "src/math.py",
        "def add(left, right):\n    return left + right\n",
    )]);
    let publisher = RecordingPublisher::new();
    let outcome = run_pipeline(
        StubSource::with_changes(changes),
        Arc::new(ScriptedAnalyzer::quiet()),
        Arc::clone(&publisher),
        rules(),
        OrchestratorConfig::default(),
    )
    .await;

    assert_eq!(outcome.result.status, ReviewStatus::Pass);
    assert_eq!(outcome.exit_code, 0);
    assert!(outcome.result.findings.is_empty());
    assert!(outcome.report.contains("No violations found."));
}

#[tokio::test]
async fn truncated_diff_refuses_without_reviewing() {
    let mut changes = changes_for(vec![text_file("src/app.py", "x = 1\n")]);
    changes.truncated = true;
    let analyzer = Arc::new(ScriptedAnalyzer::quiet());
    let publisher = RecordingPublisher::new();
    let outcome = run_pipeline(
        StubSource::with_changes(changes),
        Arc::clone(&analyzer) as Arc<dyn SemanticAnalyzer>,
        Arc::clone(&publisher),
        rules(),
        OrchestratorConfig::default(),
    )
    .await;

    assert_eq!(outcome.result.status, ReviewStatus::Refused);
    assert_eq!(outcome.exit_code, 2);
    assert_eq!(
        outcome.result.refusal.and_then(|check| check.reason),
        Some(RefusalReason::TruncatedDiff)
    );
    assert!(outcome.report.contains(RefusalReason::TruncatedDiff.remediation()));
    // The review engine never ran.
    assert_eq!(analyzer.call_count(), 0);
    assert!(outcome.phases.contains(&RunPhase::Refused));
    assert!(!outcome.phases.contains(&RunPhase::Reviewing));
    // The refusal is still published.
    assert_eq!(publisher.published().len(), 1);
    assert_eq!(publisher.published()[0].status, ReviewStatus::Refused);
}

#[tokio::test]
async fn degraded_refusal_exits_zero() {
    let mut changes = changes_for(vec![text_file("src/app.py", "x = 1\n")]);
    changes.truncated = true;
    let config = OrchestratorConfig {
        fail_on_insufficient_context: false,
        ..OrchestratorConfig::default()
    };
    let outcome = run_pipeline(
        StubSource::with_changes(changes),
        Arc::new(ScriptedAnalyzer::quiet()),
        RecordingPublisher::new(),
        rules(),
        config,
    )
    .await;

    // Status stays refused; only the exit code degrades.
    assert_eq!(outcome.result.status, ReviewStatus::Refused);
    assert_eq!(outcome.exit_code, 0);
}

#[tokio::test]
async fn analyzer_outage_degrades_to_diagnostics() {
    let changes = changes_for(vec![text_file(
        "src/math.py",
        "def add(left, right):\n    return left + right\n",
    )]);
    let outcome = run_pipeline(
        StubSource::with_changes(changes),
        Arc::new(FailingAnalyzer),
        RecordingPublisher::new(),
        rules(),
        OrchestratorConfig::default(),
    )
    .await;

    // Diagnostics are informational; the deterministic pass alone decides.
    assert_eq!(outcome.result.status, ReviewStatus::Pass);
    assert_eq!(outcome.exit_code, 0);
    assert!(outcome.result.summary_counts.info > 0);
    assert!(outcome.report.contains("_Pipeline diagnostic, not a code violation._"));
}

#[tokio::test]
async fn overlay_shadows_builtin_rule() {
    // Project overlay demotes the eval rule to informational.
    let overlay = vec![Rule {
        id: RuleId::new("SEC003"),
        category: RuleCategory::Safety,
        severity: Severity::Info,
        description: "dynamic evaluation of runtime strings".to_string(),
        pattern: Some(r"\beval\s*\(".to_string()),
        llm_prompt: None,
        fix: Some(FixTemplate {
            replacement: "ast.literal_eval(".to_string(),
        }),
    }];
    let rule_set = rules().with_overlay(overlay).expect("overlay must validate");

    let changes = changes_for(vec![text_file("src/calc.py", "result = eval(x)\n")]);
    let outcome = run_pipeline(
        StubSource::with_changes(changes),
        Arc::new(ScriptedAnalyzer::quiet()),
        RecordingPublisher::new(),
        rule_set,
        OrchestratorConfig {
            strict_mode: true,
            ..OrchestratorConfig::default()
        },
    )
    .await;

    // Demoted to info, so even strict mode passes.
    assert_eq!(outcome.result.status, ReviewStatus::Pass);
    assert_eq!(outcome.result.findings.len(), 1);
    assert_eq!(outcome.result.findings[0].severity, Severity::Info);
}

#[tokio::test]
async fn strict_mode_fails_on_warnings() {
    let changes = changes_for(vec![text_file("src/app.py", "# TODO handle retries\n")]);
    let outcome = run_pipeline(
        StubSource::with_changes(changes),
        Arc::new(ScriptedAnalyzer::quiet()),
        RecordingPublisher::new(),
        rules(),
        OrchestratorConfig {
            strict_mode: true,
            ..OrchestratorConfig::default()
        },
    )
    .await;

    assert_eq!(outcome.result.status, ReviewStatus::Fail);
    assert_eq!(outcome.exit_code, 1);
    assert_eq!(outcome.result.summary_counts.warning, 1);
}

#[tokio::test]
async fn fetch_failure_is_an_error_outcome() {
    let publisher = RecordingPublisher::new();
    let outcome = run_pipeline(
        StubSource::failing("connection reset by peer"),
        Arc::new(ScriptedAnalyzer::quiet()),
        Arc::clone(&publisher),
        rules(),
        OrchestratorConfig::default(),
    )
    .await;

    assert_eq!(outcome.result.status, ReviewStatus::Error);
    assert_eq!(outcome.exit_code, 3);
    assert!(outcome.report.contains("not a verdict"));
    assert!(outcome.report.contains("connection reset by peer"));
    assert!(outcome.phases.contains(&RunPhase::Error));
    // Best-effort publish still happens, keyed by the pull request id.
    let published = publisher.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].idempotency_key, "42");
}

#[tokio::test]
async fn publish_failure_never_changes_the_exit_code() {
    let changes = changes_for(vec![text_file(
        "src/db.py",
        "query = f\"SELECT * FROM users WHERE id = {user_id}\"\n",
    )]);
    let publisher = RecordingPublisher::failing();
    let outcome = run_pipeline(
        StubSource::with_changes(changes),
        Arc::new(ScriptedAnalyzer::quiet()),
        Arc::clone(&publisher),
        rules(),
        OrchestratorConfig::default(),
    )
    .await;

    assert_eq!(outcome.result.status, ReviewStatus::Fail);
    assert_eq!(outcome.exit_code, 1);
    assert!(!outcome.published);
    assert!(outcome.publish_error.is_some());
    assert!(outcome.phases.ends_with(&[RunPhase::Publishing, RunPhase::Done]));
}

#[tokio::test]
async fn generated_and_binary_files_are_skipped() {
    let changes = changes_for(vec![
        text_file("Cargo.lock", "# TODO not real\n"),
        text_file("src/app.py", "x = 1\n"),
    ]);
    let outcome = run_pipeline(
        StubSource::with_changes(changes),
        Arc::new(ScriptedAnalyzer::quiet()),
        RecordingPublisher::new(),
        rules(),
        OrchestratorConfig::default(),
    )
    .await;

    // The TODO in the lockfile is never evaluated.
    assert_eq!(outcome.result.status, ReviewStatus::Pass);
    assert!(outcome.result.findings.is_empty());
}

#[tokio::test]
async fn findings_are_ordered_across_files() {
    let changes = changes_for(vec![
        text_file("src/z_later.py", "# TODO later\n"),
        text_file("src/a_first.py", "API_KEY = \"abcd1234efgh5678\"\n"),
    ]);
    let outcome = run_pipeline(
        StubSource::with_changes(changes),
        Arc::new(ScriptedAnalyzer::quiet()),
        RecordingPublisher::new(),
        rules(),
        OrchestratorConfig::default(),
    )
    .await;

    // Severity-descending order regardless of worker completion order.
    assert_eq!(outcome.result.findings.len(), 2);
    assert_eq!(outcome.result.findings[0].rule_id, RuleId::new("SEC002"));
    assert_eq!(outcome.result.findings[1].rule_id, RuleId::new("MNT001"));
}
