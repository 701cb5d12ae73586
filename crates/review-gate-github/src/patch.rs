// crates/review-gate-github/src/patch.rs
// ============================================================================
// Module: Patch Parsing
// Description: Added-line extraction from unified-diff patch text.
// Purpose: Turn the files API `patch` field into post-change line ranges.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The files API delivers one unified-diff fragment per file. Only the
//! post-change side matters for review: hunk headers carry the new-file
//! start line, and `+` lines advance through the new file. Contiguous added
//! lines collapse into one range. Parsing is lenient about context but
//! strict about hunk headers; a malformed header invalidates the patch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use review_gate_core::LineRange;

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses added-line ranges from unified-diff patch text.
///
/// Returns `None` for patch text with a malformed hunk header; the caller
/// must treat that file as truncated rather than guessing.
#[must_use]
pub fn parse_added_ranges(patch: &str) -> Option<Vec<LineRange>> {
    let mut ranges: Vec<LineRange> = Vec::new();
    let mut new_line = 0_u32;
    let mut open_start: Option<u32> = None;
    let mut in_hunk = false;

    for line in patch.lines() {
        if let Some(header) = line.strip_prefix("@@") {
            close_range(&mut ranges, &mut open_start, new_line);
            new_line = parse_hunk_new_start(header)?;
            in_hunk = true;
            continue;
        }
        if !in_hunk {
            continue;
        }
        // A `\ No newline at end of file` marker annotates the previous
        // line and occupies no line on either side.
        if line.starts_with('\\') {
            continue;
        }
        if let Some(rest) = line.strip_prefix('+') {
            // File headers inside malformed fragments are not added lines.
            if rest.starts_with("++ ") {
                continue;
            }
            if open_start.is_none() {
                open_start = Some(new_line);
            }
            new_line += 1;
        } else if line.starts_with('-') {
            close_range(&mut ranges, &mut open_start, new_line);
        } else {
            close_range(&mut ranges, &mut open_start, new_line);
            new_line += 1;
        }
    }
    close_range(&mut ranges, &mut open_start, new_line);
    Some(ranges)
}

/// Extracts the new-file start line from a hunk header remainder.
///
/// The remainder looks like ` -12,3 +14,6 @@ context`.
fn parse_hunk_new_start(header: &str) -> Option<u32> {
    let plus = header.find('+')?;
    let after_plus = &header[plus + 1..];
    let end = after_plus.find([',', ' ', '@']).unwrap_or(after_plus.len());
    let start: u32 = after_plus[..end].parse().ok()?;
    // A zero start marks an empty new side; lines are otherwise 1-based.
    Some(start.max(1))
}

/// Closes the open added-range, if any, ending before `next_line`.
fn close_range(ranges: &mut Vec<LineRange>, open_start: &mut Option<u32>, next_line: u32) {
    if let Some(start) = open_start.take() {
        ranges.push(LineRange::new(start, next_line.saturating_sub(1).max(start)));
    }
}

/// Sums the added lines across parsed ranges.
#[must_use]
pub fn added_line_count(ranges: &[LineRange]) -> u32 {
    ranges.iter().map(|range| range.end.saturating_sub(range.start) + 1).sum()
}
