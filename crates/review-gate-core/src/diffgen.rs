// crates/review-gate-core/src/diffgen.rs
// ============================================================================
// Module: Diff Generator
// Description: Unified-diff suggestions for mechanically fixable findings.
// Purpose: Render display-only fix proposals; never touch the filesystem.
// Dependencies: crate::{changes, rules}, regex
// ============================================================================

//! ## Overview
//! The diff generator turns a rule's fix template and a flagged span into a
//! unified-diff suggestion attached to the finding for display. When no
//! mechanical fix is knowable the generator is a no-op. It is a pure
//! function: no disk writes, no patch application, idempotent for the same
//! inputs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use regex::Regex;

use crate::changes::LineRange;

// ============================================================================
// SECTION: Suggestion
// ============================================================================

/// Renders a unified-diff suggestion for a flagged span.
///
/// Applies `replacement` to every pattern match within the flagged lines and
/// renders the before/after as a single hunk. Returns `None` when the
/// replacement leaves the span unchanged or the range falls outside the
/// content.
#[must_use]
pub fn suggest(
    path: &str,
    content: &str,
    range: LineRange,
    matcher: &Regex,
    replacement: &str,
) -> Option<String> {
    let lines: Vec<&str> = content.lines().collect();
    let start = usize::try_from(range.start).ok()?.checked_sub(1)?;
    let end = usize::try_from(range.end).ok()?;
    if start >= lines.len() || end > lines.len() || start >= end {
        return None;
    }

    let old_block = &lines[start..end];
    let new_block: Vec<String> =
        old_block.iter().map(|line| matcher.replace_all(line, replacement).into_owned()).collect();
    if new_block.iter().zip(old_block.iter()).all(|(new, old)| new == old) {
        return None;
    }

    let count = old_block.len();
    let mut diff = String::new();
    let _ = writeln!(diff, "--- a/{path}");
    let _ = writeln!(diff, "+++ b/{path}");
    let _ = writeln!(diff, "@@ -{},{count} +{},{count} @@", range.start, range.start);
    for line in old_block {
        let _ = writeln!(diff, "-{line}");
    }
    for line in &new_block {
        let _ = writeln!(diff, "+{line}");
    }
    Some(diff)
}
