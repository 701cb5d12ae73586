// crates/review-gate-core/src/review.rs
// ============================================================================
// Module: Review Engine
// Description: Change-set review with bounded per-file parallelism.
// Purpose: Aggregate findings across files and derive the run status.
// Dependencies: crate::{changes, engine, finding, interfaces, rules}, tokio
// ============================================================================

//! ## Overview
//! The review engine runs the rules engine across all changed files. Files
//! have no cross-dependencies, so evaluation fans out onto a bounded tokio
//! worker pool; aggregation is a join point and partial results are never
//! surfaced. Findings are re-sorted after the join, so the output is
//! deterministic regardless of worker completion order.
//! Invariants:
//! - Called only after the context gate has cleared the change set.
//! - An empty change list is a degenerate pass with zero findings.
//! - Binary and generated files are skipped, never errored on.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::changes::ContentError;
use crate::changes::PrChanges;
use crate::context::is_generated_path;
use crate::engine;
use crate::finding::Finding;
use crate::finding::ReviewResult;
use crate::interfaces::SemanticAnalyzer;
use crate::rules::RuleSet;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by the review engine.
///
/// # Invariants
/// - Variants describe pipeline failures, never code-under-review issues.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// The change set was malformed.
    #[error(transparent)]
    Content(#[from] ContentError),
    /// A review worker terminated abnormally.
    #[error("review worker failed: {0}")]
    Worker(String),
}

// ============================================================================
// SECTION: Review Engine
// ============================================================================

/// Review engine with a bounded worker pool.
///
/// # Invariants
/// - `concurrency` is at least 1.
/// - The rule set and analyzer are shared read-only across workers.
pub struct ReviewEngine {
    /// Semantic analyzer shared across workers.
    analyzer: Arc<dyn SemanticAnalyzer>,
    /// Maximum number of files evaluated concurrently.
    concurrency: usize,
    /// Escalates warnings to build-failing severity.
    strict_mode: bool,
}

impl ReviewEngine {
    /// Creates a review engine.
    #[must_use]
    pub fn new(analyzer: Arc<dyn SemanticAnalyzer>, concurrency: usize, strict_mode: bool) -> Self {
        Self {
            analyzer,
            concurrency: concurrency.max(1),
            strict_mode,
        }
    }

    /// Reviews a change set against a rule set.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError`] for malformed change sets or abnormal worker
    /// termination; rule-level failures degrade to diagnostic findings
    /// instead.
    pub async fn review(
        &self,
        changes: &PrChanges,
        rule_set: &Arc<RuleSet>,
    ) -> Result<ReviewResult, ReviewError> {
        changes.validate()?;
        if changes.files.is_empty() {
            return Ok(ReviewResult::reviewed(Vec::new(), self.strict_mode));
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut workers: JoinSet<Result<Vec<Finding>, String>> = JoinSet::new();
        for file in &changes.files {
            let Some(body) = file.content.text() else {
                continue;
            };
            if is_generated_path(&file.path) {
                continue;
            }
            let path = file.path.clone();
            let body = body.to_string();
            let rule_set = Arc::clone(rule_set);
            let analyzer = Arc::clone(&self.analyzer);
            let semaphore = Arc::clone(&semaphore);
            workers.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|err| format!("worker pool closed: {err}"))?;
                Ok(engine::evaluate_file(&path, &body, &rule_set, analyzer.as_ref()).await)
            });
        }

        // Join point: all workers must finish before counts are computed.
        let mut findings = Vec::new();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(Ok(file_findings)) => findings.extend(file_findings),
                Ok(Err(message)) => return Err(ReviewError::Worker(message)),
                Err(err) => return Err(ReviewError::Worker(err.to_string())),
            }
        }

        Ok(ReviewResult::reviewed(findings, self.strict_mode))
    }
}
