// crates/review-gate-core/src/interfaces.rs
// ============================================================================
// Module: Review Gate Interfaces
// Description: Backend-agnostic interfaces for diff fetch, semantic
// analysis, and report publication.
// Purpose: Define the contract surfaces used by the pipeline at its
// external boundaries.
// Dependencies: crate::{changes, finding}, async-trait, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the review pipeline integrates with external
//! systems without embedding backend-specific details. Implementations must
//! fail closed: a diff source must set `truncated` honestly, an analyzer
//! must surface transient failures as such so retries can apply, and a
//! publisher must support idempotent re-publication keyed by commit SHA.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::changes::PrChanges;
use crate::finding::ReviewStatus;
use crate::rules::RuleId;

// ============================================================================
// SECTION: Diff Source
// ============================================================================

/// Diff source errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The diff source reported an error.
    #[error("diff source error: {0}")]
    Source(String),
    /// The diff fetch exceeded its hard timeout.
    #[error("diff fetch timed out")]
    Timeout,
}

/// Backend-agnostic source of pull-request changes.
#[async_trait]
pub trait DiffSource: Send + Sync {
    /// Fetches the change set for a pull request.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the changes cannot be obtained.
    async fn fetch(&self, pr: &str) -> Result<PrChanges, FetchError>;
}

// ============================================================================
// SECTION: Semantic Analyzer
// ============================================================================

/// One semantic-analysis request for a (file, rule) pair.
///
/// # Invariants
/// - `content` is the full post-change text of the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticRequest {
    /// Identifier of the rule driving the check.
    pub rule_id: RuleId,
    /// Natural-language instruction from the rule.
    pub prompt: String,
    /// Path of the file under analysis.
    pub file_path: String,
    /// Post-change file content.
    pub content: String,
}

/// Structured verdict returned by the semantic analyzer.
///
/// # Invariants
/// - `explanation` is non-empty when `violation` is true.
/// - Line fields, when present, refer to 1-based post-change lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticVerdict {
    /// True when the rule is violated.
    pub violation: bool,
    /// Explanation used as the finding rationale.
    pub explanation: String,
    /// First flagged line when the analyzer can localize the issue.
    pub line_start: Option<u32>,
    /// Last flagged line when the analyzer can localize the issue.
    pub line_end: Option<u32>,
}

/// Semantic analyzer errors.
///
/// # Invariants
/// - `Transient` marks failures worth retrying (timeouts, rate limits).
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Retryable failure such as a timeout or rate limit.
    #[error("semantic analyzer transient failure: {0}")]
    Transient(String),
    /// Non-retryable failure.
    #[error("semantic analyzer failure: {0}")]
    Fatal(String),
}

impl AnalyzerError {
    /// Returns true for failures worth retrying.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Backend-agnostic semantic analyzer for prompt-bearing rules.
///
/// Implementations own their retry policy: by the time an error reaches the
/// engine, retries are exhausted and the finding is downgraded to a
/// diagnostic.
#[async_trait]
pub trait SemanticAnalyzer: Send + Sync {
    /// Analyzes one (file, rule) pair and returns a structured verdict.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError`] when no verdict could be obtained.
    async fn analyze(&self, request: SemanticRequest) -> Result<SemanticVerdict, AnalyzerError>;
}

// ============================================================================
// SECTION: Report Publisher
// ============================================================================

/// Report publication errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The publication target reported an error.
    #[error("publish error: {0}")]
    Publish(String),
    /// The publish call exceeded its hard timeout.
    #[error("publish timed out")]
    Timeout,
}

/// Capability interface for publishing the formatted report.
///
/// Implementations must update an existing comment or check keyed by
/// `idempotency_key` instead of duplicating on re-runs of the same commit.
#[async_trait]
pub trait ReportPublisher: Send + Sync {
    /// Publishes the report with the terminal status.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when publication fails.
    async fn publish(
        &self,
        report: &str,
        status: ReviewStatus,
        idempotency_key: &str,
    ) -> Result<(), PublishError>;
}
