// crates/review-gate-core/tests/report_format.rs
// ============================================================================
// Module: Output Formatter Tests
// Description: Markdown rendering coverage for every terminal status.
// Purpose: Verify report content and byte-stable output.
// Dependencies: review-gate-core
// ============================================================================

//! ## Overview
//! Exercises the markdown formatter across pass, fail, refused, and error
//! results, including the byte-stability guarantee idempotent publishing
//! relies on.

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

use review_gate_core::ContextCheck;
use review_gate_core::Finding;
use review_gate_core::RefusalReason;
use review_gate_core::ReviewResult;
use review_gate_core::RuleCategory;
use review_gate_core::RuleId;
use review_gate_core::Severity;
use review_gate_core::format_report;

/// Builds a finding with the given shape and default text fields.
fn finding(rule: &str, severity: Severity, file: &str, line: u32) -> Finding {
    Finding {
        rule_id: RuleId::new(rule),
        severity,
        category: RuleCategory::Safety,
        file: file.to_string(),
        line_start: line,
        line_end: line,
        message: "hardcoded credential or API key".to_string(),
        rationale: "pattern matched: `API_KEY = \"...\"`".to_string(),
        suggested_diff: None,
    }
}

#[test]
fn pass_report_names_status_and_summary() {
    let result = ReviewResult::reviewed(Vec::new(), false);
    let report = format_report(&result);
    assert!(report.starts_with("## ✅ Review Gate: pass"));
    assert!(report.contains("No violations found."));
    assert!(report.contains("**Summary**: 0 critical, 0 warning, 0 info."));
    assert!(report.contains("clear to merge"));
}

#[test]
fn fail_report_lists_findings_and_next_steps() {
    let findings = vec![
        finding("SEC002", Severity::Critical, "src/config.py", 4),
        finding("MNT001", Severity::Warning, "src/app.py", 10),
    ];
    let result = ReviewResult::reviewed(findings, false);
    let report = format_report(&result);
    assert!(report.starts_with("## ❌ Review Gate: fail"));
    assert!(report.contains("### `src/config.py:4` — SEC002 (critical)"));
    assert!(report.contains("### `src/app.py:10` — MNT001 (warning)"));
    assert!(report.contains("**Summary**: 1 critical, 1 warning, 0 info."));
    assert!(report.contains("Next steps: address each critical finding"));
    // Critical findings render before warnings regardless of path order.
    let critical_at = report.find("SEC002").expect("critical block");
    let warning_at = report.find("MNT001").expect("warning block");
    assert!(critical_at < warning_at);
}

#[test]
fn suggested_diff_renders_fenced_and_unapplied() {
    let mut flagged = finding("SEC003", Severity::Warning, "src/calc.py", 2);
    flagged.suggested_diff = Some(
        "--- a/src/calc.py\n+++ b/src/calc.py\n@@ -2,1 +2,1 @@\n-result = eval(x)\n+result = ast.literal_eval(x)\n"
            .to_string(),
    );
    let result = ReviewResult::reviewed(vec![flagged], false);
    let report = format_report(&result);
    assert!(report.contains("Suggested fix (not applied automatically):"));
    assert!(report.contains("```diff\n--- a/src/calc.py"));
    assert!(report.contains("+result = ast.literal_eval(x)\n```"));
}

#[test]
fn diagnostic_finding_is_labeled() {
    let mut diagnostic = finding("MNT002", Severity::Info, "src/app.py", 1);
    diagnostic.category = RuleCategory::Diagnostic;
    diagnostic.message = "rule evaluation did not complete".to_string();
    let result = ReviewResult::reviewed(vec![diagnostic], false);
    let report = format_report(&result);
    assert!(report.contains("_Pipeline diagnostic, not a code violation._"));
    // Info-only findings never fail the gate.
    assert!(report.starts_with("## ✅ Review Gate: pass"));
}

#[test]
fn refusal_report_carries_reason_and_remediation() {
    let result = ReviewResult::refused(ContextCheck::insufficient(RefusalReason::TruncatedDiff));
    let report = format_report(&result);
    assert!(report.starts_with("## ⛔ Review Gate: refused"));
    assert!(report.contains("**truncated-diff**"));
    assert!(report.contains(RefusalReason::TruncatedDiff.remediation()));
    assert!(!report.contains("**Summary**"));
}

#[test]
fn error_report_is_honest_about_the_pipeline() {
    let result = ReviewResult::pipeline_error("diff fetch failed: connection reset");
    let report = format_report(&result);
    assert!(report.starts_with("## ⚠️ Review Gate: error"));
    assert!(report.contains("not a verdict on the change under review"));
    assert!(report.contains("Cause: diff fetch failed: connection reset"));
}

#[test]
fn rendering_is_byte_stable() {
    let findings = vec![
        finding("SEC002", Severity::Critical, "src/config.py", 4),
        finding("CLR002", Severity::Warning, "src/app.py", 7),
        finding("CLR001", Severity::Info, "src/app.py", 3),
    ];
    let result = ReviewResult::reviewed(findings, false);
    let first = format_report(&result);
    let second = format_report(&result);
    assert_eq!(first.as_bytes(), second.as_bytes());
}
