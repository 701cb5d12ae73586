// crates/review-gate-core/src/context.rs
// ============================================================================
// Module: Context Gate
// Description: Pre-review sufficiency check over the change set.
// Purpose: Decide whether the available diff is reviewable, refusing early
// when it is not.
// Dependencies: crate::changes, serde
// ============================================================================

//! ## Overview
//! The context gate inspects the aggregate size and shape of a change set and
//! either clears it for review or produces an explicit, reasoned refusal.
//! Refusal is a hard short-circuit: reviewing partial or oversized context
//! produces unreliable findings and must never silently pass.
//! Invariants:
//! - Policy checks run in fixed order; the first match wins, so the reported
//!   reason is the most fundamental blocker.
//! - The check is a pure function of its inputs and has no side effects.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::changes::FileContent;
use crate::changes::PrChanges;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Size limits applied by the context gate.
///
/// # Invariants
/// - Limits are configuration values fixed for the duration of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewLimits {
    /// Maximum total changed lines before refusal.
    pub max_lines: u32,
    /// Maximum changed files before refusal.
    pub max_files: usize,
}

impl Default for ReviewLimits {
    fn default() -> Self {
        Self {
            max_lines: 5_000,
            max_files: 50,
        }
    }
}

// ============================================================================
// SECTION: Refusal Reasons
// ============================================================================

/// Closed set of reasons the gate refuses to review.
///
/// # Invariants
/// - Variants are stable for serialization and report rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefusalReason {
    /// The diff source cut off content.
    TruncatedDiff,
    /// Total changed lines exceed the configured limit.
    ExcessiveSize,
    /// Changed file count exceeds the configured limit.
    TooManyFiles,
    /// Only binary or generated content changed; nothing reviewable.
    MissingContext,
}

impl RefusalReason {
    /// Returns a stable label for report rendering.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TruncatedDiff => "truncated-diff",
            Self::ExcessiveSize => "excessive-size",
            Self::TooManyFiles => "too-many-files",
            Self::MissingContext => "missing-context",
        }
    }

    /// Returns concrete remediation guidance for the reason.
    #[must_use]
    pub const fn remediation(self) -> &'static str {
        match self {
            Self::TruncatedDiff => {
                "The diff provider truncated the change content. Re-run once the full diff \
                 is available, or split the pull request so the provider can deliver it \
                 completely."
            }
            Self::ExcessiveSize => {
                "The change is too large to review reliably. Split the pull request into \
                 smaller, focused changes and re-run the gate on each."
            }
            Self::TooManyFiles => {
                "Too many files changed at once. Split the pull request into smaller \
                 change sets that can be reviewed in isolation."
            }
            Self::MissingContext => {
                "Only binary or generated files changed, with no reviewable source \
                 alongside them. Include the source change that produced these artifacts, \
                 or exclude the artifacts from review."
            }
        }
    }
}

// ============================================================================
// SECTION: Context Check
// ============================================================================

/// Result of the context gate.
///
/// # Invariants
/// - `reason` is `Some` exactly when `sufficient` is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextCheck {
    /// True when the change set is reviewable.
    pub sufficient: bool,
    /// Refusal reason when insufficient.
    pub reason: Option<RefusalReason>,
}

impl ContextCheck {
    /// Builds a passing check.
    #[must_use]
    pub const fn sufficient() -> Self {
        Self {
            sufficient: true,
            reason: None,
        }
    }

    /// Builds a failing check with the given reason.
    #[must_use]
    pub const fn insufficient(reason: RefusalReason) -> Self {
        Self {
            sufficient: false,
            reason: Some(reason),
        }
    }
}

// ============================================================================
// SECTION: Gate Policy
// ============================================================================

/// Checks whether a change set carries enough context to review.
///
/// Policy order is fixed: truncation, then total size, then file count, then
/// binary/generated-only content. The first failing check wins.
#[must_use]
pub fn check_context(changes: &PrChanges, limits: ReviewLimits) -> ContextCheck {
    if changes.truncated {
        return ContextCheck::insufficient(RefusalReason::TruncatedDiff);
    }
    if changes.total_lines > limits.max_lines {
        return ContextCheck::insufficient(RefusalReason::ExcessiveSize);
    }
    if changes.total_files > limits.max_files {
        return ContextCheck::insufficient(RefusalReason::TooManyFiles);
    }
    if !changes.files.is_empty() && changes.files.iter().all(is_unreviewable) {
        return ContextCheck::insufficient(RefusalReason::MissingContext);
    }
    ContextCheck::sufficient()
}

/// Returns true when a changed file offers no reviewable source.
fn is_unreviewable(file: &crate::changes::ChangedFile) -> bool {
    if file.content.is_binary() {
        return true;
    }
    if is_generated_path(&file.path) {
        return true;
    }
    if let FileContent::Text {
        body,
    } = &file.content
    {
        return looks_minified(body);
    }
    false
}

/// Lockfile and vendored-artifact names treated as generated content.
const GENERATED_BASENAMES: &[&str] = &[
    "Cargo.lock",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "Gemfile.lock",
    "poetry.lock",
    "composer.lock",
    "go.sum",
];

/// Path prefixes treated as vendored bundles.
const VENDORED_PREFIXES: &[&str] = &["vendor/", "node_modules/", "third_party/", "dist/"];

/// Returns true for paths matching the generated-content heuristic.
#[must_use]
pub fn is_generated_path(path: &str) -> bool {
    let basename = path.rsplit('/').next().unwrap_or(path);
    if GENERATED_BASENAMES.contains(&basename) {
        return true;
    }
    if VENDORED_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return true;
    }
    path.ends_with(".min.js") || path.ends_with(".min.css") || path.ends_with(".map")
}

/// Line length beyond which text content is treated as minified.
const MINIFIED_LINE_BYTES: usize = 2_000;

/// Returns true when the content looks like a minified asset.
fn looks_minified(body: &str) -> bool {
    body.lines().take(8).any(|line| line.len() > MINIFIED_LINE_BYTES)
}
