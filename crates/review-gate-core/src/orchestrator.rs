// crates/review-gate-core/src/orchestrator.rs
// ============================================================================
// Module: Orchestrator
// Description: Top-level pipeline state machine and exit-code mapping.
// Purpose: Coordinate fetch, gate, review, report, and publish steps.
// Dependencies: crate::{changes, context, finding, interfaces, report,
// review, rules}, tokio
// ============================================================================

//! ## Overview
//! The orchestrator walks the run through its phases: `Fetching` →
//! `ContextCheck` → {`Reviewing` | `Refused`} → `Reporting` → `Publishing` →
//! `Done`, with `Error` reachable from any step. Every internal failure is
//! categorized before it surfaces; the orchestrator never lets a raw error
//! escape and never reports a false pass. The phase trace is recorded on the
//! outcome for verification.
//! Invariants:
//! - A failed context check skips the review engine entirely.
//! - `Error` outcomes still format a minimal honest report and attempt a
//!   best-effort publish.
//! - A publish failure never changes the locally computed exit code.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use tokio::time::timeout;

use crate::context::ReviewLimits;
use crate::context::check_context;
use crate::finding::ReviewResult;
use crate::finding::ReviewStatus;
use crate::interfaces::DiffSource;
use crate::interfaces::ReportPublisher;
use crate::interfaces::SemanticAnalyzer;
use crate::report::format_report;
use crate::review::ReviewEngine;
use crate::rules::RuleSet;

// ============================================================================
// SECTION: Phases
// ============================================================================

/// Pipeline phase labels recorded in the run trace.
///
/// # Invariants
/// - Variants are stable for serialization and verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Obtaining changes from the diff source.
    Fetching,
    /// Running the context gate.
    ContextCheck,
    /// Running the review engine.
    Reviewing,
    /// Synthesizing a refused result.
    Refused,
    /// Rendering the report.
    Reporting,
    /// Handing the report to the publisher.
    Publishing,
    /// Terminal success.
    Done,
    /// Terminal pipeline failure.
    Error,
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Orchestrator configuration fixed for the duration of a run.
///
/// # Invariants
/// - Timeouts are hard bounds; fetch and publish are not retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Context gate limits.
    pub limits: ReviewLimits,
    /// Escalates warnings to build-failing severity.
    pub strict_mode: bool,
    /// When false, a refusal degrades to exit code 0 instead of 2.
    pub fail_on_insufficient_context: bool,
    /// Hard timeout for the diff fetch.
    pub fetch_timeout: Duration,
    /// Hard timeout for the publish call.
    pub publish_timeout: Duration,
    /// Maximum number of files reviewed concurrently.
    pub concurrency: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            limits: ReviewLimits::default(),
            strict_mode: false,
            fail_on_insufficient_context: true,
            fetch_timeout: Duration::from_secs(30),
            publish_timeout: Duration::from_secs(30),
            concurrency: 4,
        }
    }
}

// ============================================================================
// SECTION: Run Outcome
// ============================================================================

/// Terminal outcome of one orchestrated run.
///
/// # Invariants
/// - `exit_code` follows the authoritative mapping: pass=0, fail=1,
///   refused=2 (0 when degraded), error=3.
/// - `publish_error` is `Some` exactly when publication was attempted and
///   failed; the exit code is unaffected.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Final review result.
    pub result: ReviewResult,
    /// Rendered markdown report.
    pub report: String,
    /// Process exit code for CI gating.
    pub exit_code: u8,
    /// True when the report was published.
    pub published: bool,
    /// Publication failure description, if any.
    pub publish_error: Option<String>,
    /// Ordered phase trace of the run.
    pub phases: Vec<RunPhase>,
}

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Top-level coordinator for one review run.
///
/// # Invariants
/// - Holds only read-only shared state; safe to reuse across runs.
pub struct Orchestrator {
    /// External diff source.
    source: Arc<dyn DiffSource>,
    /// Semantic analyzer for prompt-bearing rules.
    analyzer: Arc<dyn SemanticAnalyzer>,
    /// External publication target.
    publisher: Arc<dyn ReportPublisher>,
    /// Active rule set for the run.
    rule_set: Arc<RuleSet>,
    /// Run configuration.
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Creates an orchestrator over the given collaborators.
    #[must_use]
    pub fn new(
        source: Arc<dyn DiffSource>,
        analyzer: Arc<dyn SemanticAnalyzer>,
        publisher: Arc<dyn ReportPublisher>,
        rule_set: Arc<RuleSet>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            source,
            analyzer,
            publisher,
            rule_set,
            config,
        }
    }

    /// Executes one full run for a pull request.
    ///
    /// Never returns an error: pipeline failures become `Error` outcomes
    /// with exit code 3 and a minimal honest report.
    pub async fn run(&self, pr: &str) -> RunOutcome {
        let mut phases = vec![RunPhase::Fetching];

        let changes = match timeout(self.config.fetch_timeout, self.source.fetch(pr)).await {
            Ok(Ok(changes)) => changes,
            Ok(Err(err)) => {
                return self.error_outcome(phases, pr, format!("diff fetch failed: {err}")).await;
            }
            Err(_) => {
                return self
                    .error_outcome(phases, pr, "diff fetch timed out".to_string())
                    .await;
            }
        };

        phases.push(RunPhase::ContextCheck);
        let check = check_context(&changes, self.config.limits);
        let result = if check.sufficient {
            phases.push(RunPhase::Reviewing);
            let engine = ReviewEngine::new(
                Arc::clone(&self.analyzer),
                self.config.concurrency,
                self.config.strict_mode,
            );
            match engine.review(&changes, &self.rule_set).await {
                Ok(result) => result,
                Err(err) => {
                    return self
                        .error_outcome(phases, &changes.head_sha, format!("review failed: {err}"))
                        .await;
                }
            }
        } else {
            phases.push(RunPhase::Refused);
            ReviewResult::refused(check)
        };

        phases.push(RunPhase::Reporting);
        let report = format_report(&result);

        phases.push(RunPhase::Publishing);
        let (published, publish_error) = self.publish(&report, result.status, &changes.head_sha).await;

        phases.push(RunPhase::Done);
        let exit_code = self.exit_code(result.status);
        RunOutcome {
            result,
            report,
            exit_code,
            published,
            publish_error,
            phases,
        }
    }

    /// Builds an error outcome, still attempting a best-effort publish.
    async fn error_outcome(
        &self,
        mut phases: Vec<RunPhase>,
        idempotency_key: &str,
        message: String,
    ) -> RunOutcome {
        phases.push(RunPhase::Error);
        let result = ReviewResult::pipeline_error(message);
        phases.push(RunPhase::Reporting);
        let report = format_report(&result);
        phases.push(RunPhase::Publishing);
        let (published, publish_error) =
            self.publish(&report, result.status, idempotency_key).await;
        RunOutcome {
            exit_code: self.exit_code(result.status),
            result,
            report,
            published,
            publish_error,
            phases,
        }
    }

    /// Publishes the report under a hard timeout.
    async fn publish(
        &self,
        report: &str,
        status: ReviewStatus,
        idempotency_key: &str,
    ) -> (bool, Option<String>) {
        match timeout(
            self.config.publish_timeout,
            self.publisher.publish(report, status, idempotency_key),
        )
        .await
        {
            Ok(Ok(())) => (true, None),
            Ok(Err(err)) => (false, Some(err.to_string())),
            Err(_) => (false, Some("publish timed out".to_string())),
        }
    }

    /// Maps a status to the authoritative exit code.
    #[must_use]
    pub const fn exit_code(&self, status: ReviewStatus) -> u8 {
        match status {
            ReviewStatus::Pass => 0,
            ReviewStatus::Fail => 1,
            ReviewStatus::Refused => {
                if self.config.fail_on_insufficient_context {
                    2
                } else {
                    0
                }
            }
            ReviewStatus::Error => 3,
        }
    }
}
