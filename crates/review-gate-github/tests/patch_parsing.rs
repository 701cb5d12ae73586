// crates/review-gate-github/tests/patch_parsing.rs
// ============================================================================
// Module: Patch Parsing Tests
// Description: Added-range extraction from unified-diff fragments.
// Purpose: Verify hunk handling, range collapsing, and malformed headers.
// Dependencies: review-gate-github, review-gate-core
// ============================================================================

//! ## Overview
//! Exercises the unified-diff parser on representative files API patch
//! fragments: fresh files, interleaved context and removals, multiple
//! hunks, and malformed headers that must invalidate the patch.

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

use review_gate_core::LineRange;
use review_gate_github::parse_added_ranges;
use review_gate_github::patch::added_line_count;

#[test]
fn fresh_file_is_one_range() {
    let patch = "@@ -0,0 +1,3 @@\n+import os\n+\n+x = 1";
    let ranges = parse_added_ranges(patch).expect("patch must parse");
    assert_eq!(ranges, vec![LineRange::new(1, 3)]);
    assert_eq!(added_line_count(&ranges), 3);
}

#[test]
fn context_and_removals_split_ranges() {
    let patch = concat!(
        "@@ -10,5 +10,6 @@ def main():\n",
        " context\n",
        "-old = 1\n",
        "+new_a = 1\n",
        " context\n",
        "+new_b = 2\n",
        " context",
    );
    let ranges = parse_added_ranges(patch).expect("patch must parse");
    assert_eq!(ranges, vec![LineRange::new(11, 11), LineRange::new(13, 13)]);
}

#[test]
fn multiple_hunks_track_new_file_lines() {
    let patch = concat!(
        "@@ -1,2 +1,3 @@\n",
        " context\n",
        "+top = 1\n",
        " context\n",
        "@@ -40,2 +41,4 @@\n",
        " context\n",
        "+mid_a = 2\n",
        "+mid_b = 3\n",
        " context",
    );
    let ranges = parse_added_ranges(patch).expect("patch must parse");
    assert_eq!(ranges, vec![LineRange::new(2, 2), LineRange::new(42, 43)]);
    assert_eq!(added_line_count(&ranges), 3);
}

#[test]
fn consecutive_added_lines_collapse() {
    let patch = "@@ -5,0 +6,4 @@\n+a = 1\n+b = 2\n+c = 3\n+d = 4";
    let ranges = parse_added_ranges(patch).expect("patch must parse");
    assert_eq!(ranges, vec![LineRange::new(6, 9)]);
}

#[test]
fn patch_without_additions_yields_no_ranges() {
    let patch = "@@ -3,2 +3,1 @@\n context\n-removed = 1";
    let ranges = parse_added_ranges(patch).expect("patch must parse");
    assert!(ranges.is_empty());
    assert_eq!(added_line_count(&ranges), 0);
}

#[test]
fn no_newline_marker_occupies_no_line() {
    let patch = concat!(
        "@@ -1,2 +1,2 @@\n",
        " context\n",
        "-old\n",
        "\\ No newline at end of file\n",
        "+new",
    );
    let ranges = parse_added_ranges(patch).expect("patch must parse");
    assert_eq!(ranges, vec![LineRange::new(2, 2)]);

    let trailing = "@@ -0,0 +1,2 @@\n+a\n+b\n\\ No newline at end of file";
    let ranges = parse_added_ranges(trailing).expect("patch must parse");
    assert_eq!(ranges, vec![LineRange::new(1, 2)]);
}

#[test]
fn malformed_hunk_header_invalidates_the_patch() {
    assert!(parse_added_ranges("@@ not a header @@\n+x = 1").is_none());
    assert!(parse_added_ranges("@@ -1,2 - @@\n+x = 1").is_none());
}

#[test]
fn empty_patch_yields_no_ranges() {
    let ranges = parse_added_ranges("").expect("empty patch must parse");
    assert!(ranges.is_empty());
}
