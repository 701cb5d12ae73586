// crates/review-gate-core/src/report.rs
// ============================================================================
// Module: Output Formatter
// Description: Markdown rendering of review results and refusals.
// Purpose: Produce a byte-stable, human-readable report for publication.
// Dependencies: crate::finding
// ============================================================================

//! ## Overview
//! The formatter renders a [`ReviewResult`] into markdown. It is a pure
//! function with no embedded timestamps or other nondeterminism, so
//! re-running on an unchanged diff produces a byte-identical report. That
//! stability is what makes idempotent comment updates possible downstream.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use crate::finding::Finding;
use crate::finding::ReviewResult;
use crate::finding::ReviewStatus;
use crate::rules::RuleCategory;

// ============================================================================
// SECTION: Markers
// ============================================================================

/// Returns the severity marker for a status header.
const fn status_marker(status: ReviewStatus) -> &'static str {
    match status {
        ReviewStatus::Pass => "✅",
        ReviewStatus::Fail => "❌",
        ReviewStatus::Refused => "⛔",
        ReviewStatus::Error => "⚠️",
    }
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders a review result as markdown.
///
/// Byte-identical output for identical input; required for idempotent
/// comment updates.
#[must_use]
pub fn format_report(result: &ReviewResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "## {} Review Gate: {}",
        status_marker(result.status),
        result.status.as_str()
    );
    let _ = writeln!(out);

    match result.status {
        ReviewStatus::Refused => render_refusal(&mut out, result),
        ReviewStatus::Error => render_error(&mut out, result),
        ReviewStatus::Pass | ReviewStatus::Fail => render_findings(&mut out, result),
    }

    out
}

/// Renders the refusal section with remediation guidance.
fn render_refusal(out: &mut String, result: &ReviewResult) {
    let reason = result.refusal.as_ref().and_then(|check| check.reason);
    match reason {
        Some(reason) => {
            let _ = writeln!(
                out,
                "The gate declined to review this change: **{}**.",
                reason.as_str()
            );
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", reason.remediation());
        }
        None => {
            let _ = writeln!(out, "The gate declined to review this change.");
        }
    }
}

/// Renders the minimal honest error section.
fn render_error(out: &mut String, result: &ReviewResult) {
    let _ = writeln!(
        out,
        "The review pipeline could not complete. This is not a verdict on the \
         change under review."
    );
    let _ = writeln!(out);
    if let Some(error) = &result.error {
        let _ = writeln!(out, "Cause: {error}");
    }
}

/// Renders finding blocks and the summary section.
fn render_findings(out: &mut String, result: &ReviewResult) {
    if result.findings.is_empty() {
        let _ = writeln!(out, "No violations found.");
        let _ = writeln!(out);
    }
    for finding in &result.findings {
        render_finding(out, finding);
    }
    render_summary(out, result);
}

/// Renders one finding as a titled block.
fn render_finding(out: &mut String, finding: &Finding) {
    let _ = writeln!(
        out,
        "### `{}:{}` — {} ({})",
        finding.file,
        finding.line_start,
        finding.rule_id,
        finding.severity.as_str()
    );
    let _ = writeln!(out);
    if finding.category == RuleCategory::Diagnostic {
        let _ = writeln!(out, "_Pipeline diagnostic, not a code violation._");
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "{}", finding.message);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", finding.rationale);
    let _ = writeln!(out);
    if let Some(diff) = &finding.suggested_diff {
        let _ = writeln!(out, "Suggested fix (not applied automatically):");
        let _ = writeln!(out);
        let _ = writeln!(out, "```diff");
        let _ = write!(out, "{diff}");
        if !diff.ends_with('\n') {
            let _ = writeln!(out);
        }
        let _ = writeln!(out, "```");
        let _ = writeln!(out);
    }
}

/// Renders the trailing summary tallies and next steps.
fn render_summary(out: &mut String, result: &ReviewResult) {
    let counts = result.summary_counts;
    let _ = writeln!(out, "---");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "**Summary**: {} critical, {} warning, {} info.",
        counts.critical, counts.warning, counts.info
    );
    let _ = writeln!(out);
    match result.status {
        ReviewStatus::Fail => {
            let _ = writeln!(
                out,
                "Next steps: address each critical finding above, then push a new \
                 commit to re-run the gate. Suggested diffs are proposals only and \
                 are never applied automatically."
            );
        }
        ReviewStatus::Pass => {
            let _ = writeln!(out, "Next steps: none. The change is clear to merge.");
        }
        ReviewStatus::Refused | ReviewStatus::Error => {}
    }
}
