// crates/review-gate-core/src/changes.rs
// ============================================================================
// Module: Pull Request Changes
// Description: Immutable change-set records consumed by the pipeline.
// Purpose: Capture the unit of work delivered by the external diff source.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! [`PrChanges`] is the unit of work: the ordered list of changed files with
//! their added-line ranges and post-change content, plus aggregate totals and
//! the honesty-critical `truncated` flag. The record is created once per
//! invocation by the diff source and is read-only thereafter.
//! Invariants:
//! - Totals reflect the contained files as reported by the diff source.
//! - Text files carry post-change content; binary files carry none.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Line Ranges
// ============================================================================

/// Inclusive 1-based line range.
///
/// # Invariants
/// - `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    /// First line of the range (1-based).
    pub start: u32,
    /// Last line of the range (1-based, inclusive).
    pub end: u32,
}

impl LineRange {
    /// Creates a range, swapping the bounds if given out of order.
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        if start <= end {
            Self {
                start,
                end,
            }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Returns true when the ranges share at least one line.
    #[must_use]
    pub const fn overlaps(self, other: Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

// ============================================================================
// SECTION: File Content
// ============================================================================

/// Post-change content of a changed file.
///
/// # Invariants
/// - Variants are stable for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileContent {
    /// UTF-8 text content after the change.
    Text {
        /// Full post-change file content.
        body: String,
    },
    /// Binary content; not reviewable.
    Binary,
    /// Content the diff source could not supply.
    Missing,
}

impl FileContent {
    /// Returns the text body when present.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text {
                body,
            } => Some(body),
            Self::Binary | Self::Missing => None,
        }
    }

    /// Returns true for binary content.
    #[must_use]
    pub const fn is_binary(&self) -> bool {
        matches!(self, Self::Binary)
    }
}

// ============================================================================
// SECTION: Changed Files
// ============================================================================

/// One changed file in a pull request.
///
/// # Invariants
/// - `added_ranges` are 1-based post-change line ranges in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Repository-relative file path.
    pub path: String,
    /// Added-line ranges in the post-change file.
    pub added_ranges: Vec<LineRange>,
    /// Post-change content.
    pub content: FileContent,
}

// ============================================================================
// SECTION: Change Set
// ============================================================================

/// The unit of work: all changes of one pull request at one commit.
///
/// # Invariants
/// - Created once per invocation by the diff source; read-only thereafter.
/// - `truncated` must be set honestly by the diff source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrChanges {
    /// Pull request identifier as supplied at invocation.
    pub pr: String,
    /// Head commit SHA the changes were taken at.
    pub head_sha: String,
    /// Changed files in diff order.
    pub files: Vec<ChangedFile>,
    /// Total number of changed lines across all files.
    pub total_lines: u32,
    /// Total number of changed files.
    pub total_files: usize,
    /// True when the diff source cut off content.
    pub truncated: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised for malformed change sets.
///
/// # Invariants
/// - Variants are surfaced as pipeline errors, never attributed to the code
///   under review.
#[derive(Debug, Error)]
pub enum ContentError {
    /// A text file arrived without content.
    #[error("missing content for changed file: {path}")]
    MissingContent {
        /// Path of the file lacking content.
        path: String,
    },
}

impl PrChanges {
    /// Validates that every reviewable file carries content.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError`] for the first file missing content.
    pub fn validate(&self) -> Result<(), ContentError> {
        for file in &self.files {
            if matches!(file.content, FileContent::Missing) {
                return Err(ContentError::MissingContent {
                    path: file.path.clone(),
                });
            }
        }
        Ok(())
    }
}
