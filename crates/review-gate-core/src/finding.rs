// crates/review-gate-core/src/finding.rs
// ============================================================================
// Module: Findings and Review Results
// Description: Finding records, severity ranking, and aggregate results.
// Purpose: Capture review outcomes in a deterministic, serializable shape.
// Dependencies: crate::{context, rules}, serde
// ============================================================================

//! ## Overview
//! Findings are the unit of review output: one detected issue located at a
//! file and line range. A [`ReviewResult`] aggregates all findings for one
//! run together with the terminal [`ReviewStatus`] and summary tallies.
//! Invariants:
//! - Findings are sorted severity-descending, then file path, then line,
//!   then rule id, so report rendering is deterministic.
//! - `status == Refused` implies no findings and a populated refusal.
//! - `status == Error` implies no findings and a populated error message.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Reverse;

use serde::Deserialize;
use serde::Serialize;

use crate::context::ContextCheck;
use crate::rules::RuleCategory;
use crate::rules::RuleId;

// ============================================================================
// SECTION: Severity
// ============================================================================

/// Severity of a rule or finding.
///
/// # Invariants
/// - Variants are stable for serialization and report rendering.
/// - Ranking order is `Critical > Warning > Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational only; never affects the verdict.
    Info,
    /// Should be addressed; fails the gate only in strict mode.
    Warning,
    /// Must be addressed; always fails the gate.
    Critical,
}

impl Severity {
    /// Returns a stable label for report rendering.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    /// Returns the numeric rank used for descending sort order.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Critical => 3,
            Self::Warning => 2,
            Self::Info => 1,
        }
    }
}

// ============================================================================
// SECTION: Finding
// ============================================================================

/// A single detected issue located at a file and line range.
///
/// # Invariants
/// - `line_start <= line_end`, both 1-based.
/// - `suggested_diff`, when present, is unified-diff text and is never
///   applied by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Identifier of the rule that produced the finding.
    pub rule_id: RuleId,
    /// Severity of the finding.
    pub severity: Severity,
    /// Category of the finding; `error` marks pipeline diagnostics.
    pub category: RuleCategory,
    /// Path of the file the finding applies to.
    pub file: String,
    /// First line of the flagged span (1-based).
    pub line_start: u32,
    /// Last line of the flagged span (1-based, inclusive).
    pub line_end: u32,
    /// Short human-readable description of the issue.
    pub message: String,
    /// Explanation of why the span was flagged.
    pub rationale: String,
    /// Optional unified-diff suggestion; display only.
    pub suggested_diff: Option<String>,
}

/// Sorts findings into the canonical deterministic order.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        (Reverse(a.severity.rank()), &a.file, a.line_start, a.line_end, &a.rule_id).cmp(&(
            Reverse(b.severity.rank()),
            &b.file,
            b.line_start,
            b.line_end,
            &b.rule_id,
        ))
    });
}

// ============================================================================
// SECTION: Summary Counts
// ============================================================================

/// Per-severity finding tallies for a run.
///
/// # Invariants
/// - Counts match the findings list they were computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCounts {
    /// Number of critical findings.
    pub critical: usize,
    /// Number of warning findings.
    pub warning: usize,
    /// Number of informational findings.
    pub info: usize,
}

impl SummaryCounts {
    /// Computes tallies from a findings list.
    #[must_use]
    pub fn tally(findings: &[Finding]) -> Self {
        let mut counts = Self::default();
        for finding in findings {
            match finding.severity {
                Severity::Critical => counts.critical += 1,
                Severity::Warning => counts.warning += 1,
                Severity::Info => counts.info += 1,
            }
        }
        counts
    }

    /// Returns the total number of findings.
    #[must_use]
    pub const fn total(self) -> usize {
        self.critical + self.warning + self.info
    }
}

// ============================================================================
// SECTION: Review Status
// ============================================================================

/// Terminal status of a review run.
///
/// # Invariants
/// - Variants are stable for serialization and exit-code mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// No blocking violations were found.
    Pass,
    /// Blocking violations were found.
    Fail,
    /// The gate declined to review for lack of context.
    Refused,
    /// The pipeline itself failed; not attributable to reviewed code.
    Error,
}

impl ReviewStatus {
    /// Returns a stable label for report rendering.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Refused => "refused",
            Self::Error => "error",
        }
    }
}

// ============================================================================
// SECTION: Review Result
// ============================================================================

/// Aggregate outcome of one review run.
///
/// # Invariants
/// - `Refused` results carry a refusal and no findings.
/// - `Error` results carry an error message and no findings.
/// - `findings` are in canonical sorted order and `summary_counts` match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResult {
    /// Terminal status of the run.
    pub status: ReviewStatus,
    /// Findings in canonical sorted order.
    pub findings: Vec<Finding>,
    /// Context refusal when the gate declined to review.
    pub refusal: Option<ContextCheck>,
    /// Pipeline failure description when `status == Error`.
    pub error: Option<String>,
    /// Per-severity finding tallies.
    pub summary_counts: SummaryCounts,
}

impl ReviewResult {
    /// Builds a reviewed result, deriving status from findings and mode.
    ///
    /// Status is `Fail` when any critical finding exists, or when strict mode
    /// is enabled and any warning exists; otherwise `Pass`.
    #[must_use]
    pub fn reviewed(mut findings: Vec<Finding>, strict_mode: bool) -> Self {
        sort_findings(&mut findings);
        let summary_counts = SummaryCounts::tally(&findings);
        let failed =
            summary_counts.critical > 0 || (strict_mode && summary_counts.warning > 0);
        Self {
            status: if failed { ReviewStatus::Fail } else { ReviewStatus::Pass },
            findings,
            refusal: None,
            error: None,
            summary_counts,
        }
    }

    /// Builds a refused result from a failed context check.
    #[must_use]
    pub const fn refused(check: ContextCheck) -> Self {
        Self {
            status: ReviewStatus::Refused,
            findings: Vec::new(),
            refusal: Some(check),
            error: None,
            summary_counts: SummaryCounts {
                critical: 0,
                warning: 0,
                info: 0,
            },
        }
    }

    /// Builds an error result for a pipeline failure.
    #[must_use]
    pub fn pipeline_error(message: impl Into<String>) -> Self {
        Self {
            status: ReviewStatus::Error,
            findings: Vec::new(),
            refusal: None,
            error: Some(message.into()),
            summary_counts: SummaryCounts::default(),
        }
    }
}
