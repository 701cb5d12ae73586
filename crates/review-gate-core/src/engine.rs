// crates/review-gate-core/src/engine.rs
// ============================================================================
// Module: Rules Engine
// Description: Per-file rule evaluation for pattern and semantic checks.
// Purpose: Produce findings for one file, fault-isolated per rule.
// Dependencies: crate::{changes, diffgen, finding, interfaces, rules}, regex
// ============================================================================

//! ## Overview
//! The rules engine evaluates a rule set against one file's content. Rules
//! with a pattern run the deterministic regex pass; rules with a prompt
//! issue one semantic call per (file, rule) pair. The two checks are
//! independent and may both fire; duplicates are collapsed by overlapping
//! line ranges before returning.
//! Invariants:
//! - A failure evaluating one rule never aborts the file: it is downgraded
//!   to an `error`-category diagnostic finding.
//! - Empty content never errors and yields no findings.
//! - Output order is the rule-set order, then match position; fully
//!   deterministic for identical inputs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::changes::LineRange;
use crate::diffgen;
use crate::finding::Finding;
use crate::finding::Severity;
use crate::interfaces::SemanticAnalyzer;
use crate::interfaces::SemanticRequest;
use crate::rules::RuleCategory;
use crate::rules::RuleId;
use crate::rules::RuleSet;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Hard cap on content scanned by the deterministic pass, in bytes.
///
/// Oversized content is downgraded to a per-rule diagnostic instead of
/// risking pathological scan times.
pub const MAX_SCAN_BYTES: usize = 1024 * 1024;

/// Line window within which pattern and semantic findings of the same rule
/// are considered duplicates.
///
/// Two findings overlap when their ranges intersect or their starts are
/// within this many lines of each other; the pattern finding wins because
/// its span is more precise.
pub const DEDUP_LINE_WINDOW: u32 = 2;

/// Maximum bytes of matched text quoted in a finding rationale.
const MAX_SNIPPET_BYTES: usize = 120;

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Evaluates the deterministic pattern pass for one file.
///
/// Each pattern match yields one finding; multiple matches on the same line
/// collapse to one. Oversized content yields one diagnostic finding per
/// pattern rule instead of scanning.
#[must_use]
pub fn evaluate_patterns(path: &str, content: &str, rule_set: &RuleSet) -> Vec<Finding> {
    let mut findings = Vec::new();
    if content.is_empty() {
        return findings;
    }
    for compiled in rule_set.rules() {
        let Some(matcher) = &compiled.matcher else {
            continue;
        };
        if content.len() > MAX_SCAN_BYTES {
            findings.push(diagnostic_finding(
                compiled.rule.id.clone(),
                path,
                format!(
                    "pattern check skipped: content exceeds {MAX_SCAN_BYTES} byte scan limit"
                ),
            ));
            continue;
        }
        let mut last_line = 0_u32;
        for matched in matcher.find_iter(content) {
            let line_start = line_of_offset(content, matched.start());
            if line_start == last_line {
                continue;
            }
            last_line = line_start;
            let line_end = line_start + count_newlines(matched.as_str());
            let range = LineRange::new(line_start, line_end);
            let suggested_diff = compiled.rule.fix.as_ref().and_then(|fix| {
                diffgen::suggest(path, content, range, matcher, &fix.replacement)
            });
            findings.push(Finding {
                rule_id: compiled.rule.id.clone(),
                severity: compiled.rule.severity,
                category: compiled.rule.category,
                file: path.to_string(),
                line_start,
                line_end,
                message: compiled.rule.description.clone(),
                rationale: format!("pattern matched: `{}`", snippet(matched.as_str())),
                suggested_diff,
            });
        }
    }
    findings
}

/// Evaluates all checks of the rule set against one file.
///
/// Runs the deterministic pass, then one semantic call per prompt-bearing
/// rule, then collapses duplicates. Analyzer failures (retries already
/// exhausted by the implementation) downgrade to diagnostic findings.
pub async fn evaluate_file(
    path: &str,
    content: &str,
    rule_set: &RuleSet,
    analyzer: &dyn SemanticAnalyzer,
) -> Vec<Finding> {
    let mut findings = evaluate_patterns(path, content, rule_set);
    if content.is_empty() {
        return findings;
    }
    for compiled in rule_set.rules() {
        let Some(prompt) = &compiled.rule.llm_prompt else {
            continue;
        };
        let request = SemanticRequest {
            rule_id: compiled.rule.id.clone(),
            prompt: prompt.clone(),
            file_path: path.to_string(),
            content: content.to_string(),
        };
        match analyzer.analyze(request).await {
            Ok(verdict) => {
                if !verdict.violation {
                    continue;
                }
                let line_start = verdict.line_start.unwrap_or(1);
                let line_end = verdict.line_end.unwrap_or(line_start).max(line_start);
                let candidate = Finding {
                    rule_id: compiled.rule.id.clone(),
                    severity: compiled.rule.severity,
                    category: compiled.rule.category,
                    file: path.to_string(),
                    line_start,
                    line_end,
                    message: compiled.rule.description.clone(),
                    rationale: verdict.explanation,
                    suggested_diff: None,
                };
                if !duplicates_existing(&findings, &candidate) {
                    findings.push(candidate);
                }
            }
            Err(err) => {
                findings.push(diagnostic_finding(
                    compiled.rule.id.clone(),
                    path,
                    format!("semantic check failed after retries: {err}"),
                ));
            }
        }
    }
    findings
}

// ============================================================================
// SECTION: Deduplication
// ============================================================================

/// Returns true when a candidate duplicates an existing same-rule finding.
fn duplicates_existing(findings: &[Finding], candidate: &Finding) -> bool {
    findings.iter().any(|existing| {
        existing.rule_id == candidate.rule_id
            && existing.file == candidate.file
            && existing.category != RuleCategory::Diagnostic
            && ranges_overlap(existing, candidate)
    })
}

/// Returns true when two findings' line ranges fall within the dedup window.
fn ranges_overlap(a: &Finding, b: &Finding) -> bool {
    let a_range = LineRange::new(a.line_start, a.line_end);
    let b_range = LineRange::new(b.line_start, b.line_end);
    if a_range.overlaps(b_range) {
        return true;
    }
    a.line_start.abs_diff(b.line_start) <= DEDUP_LINE_WINDOW
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds an `error`-category diagnostic finding for a failed rule check.
fn diagnostic_finding(rule_id: RuleId, path: &str, rationale: String) -> Finding {
    Finding {
        rule_id,
        severity: Severity::Info,
        category: RuleCategory::Diagnostic,
        file: path.to_string(),
        line_start: 1,
        line_end: 1,
        message: "rule evaluation did not complete".to_string(),
        rationale,
        suggested_diff: None,
    }
}

/// Returns the 1-based line number containing a byte offset.
fn line_of_offset(content: &str, offset: usize) -> u32 {
    let prefix = content.get(..offset).unwrap_or(content);
    u32::try_from(prefix.bytes().filter(|byte| *byte == b'\n').count())
        .unwrap_or(u32::MAX - 1)
        + 1
}

/// Counts newline bytes within matched text.
fn count_newlines(text: &str) -> u32 {
    u32::try_from(text.bytes().filter(|byte| *byte == b'\n').count()).unwrap_or(0)
}

/// Trims matched text to a single-line snippet for the rationale.
fn snippet(matched: &str) -> String {
    let first_line = matched.lines().next().unwrap_or(matched).trim();
    if first_line.len() <= MAX_SNIPPET_BYTES {
        return first_line.to_string();
    }
    let mut cut = MAX_SNIPPET_BYTES;
    while cut > 0 && !first_line.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…", &first_line[..cut])
}
