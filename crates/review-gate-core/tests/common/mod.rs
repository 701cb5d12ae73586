// crates/review-gate-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared helpers for review-gate-core tests.
// Purpose: Provide reusable stubs and builders for pipeline tests.
// Dependencies: review-gate-core, async-trait
// ============================================================================

//! ## Overview
//! Provides stub collaborators (diff source, semantic analyzer, publisher)
//! and change-set builders shared across the core integration tests.

#![allow(
    dead_code,
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only helpers and panic-based assertions are permitted."
)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use review_gate_core::AnalyzerError;
use review_gate_core::ChangedFile;
use review_gate_core::DiffSource;
use review_gate_core::FetchError;
use review_gate_core::FileContent;
use review_gate_core::LineRange;
use review_gate_core::PrChanges;
use review_gate_core::PublishError;
use review_gate_core::ReportPublisher;
use review_gate_core::ReviewStatus;
use review_gate_core::SemanticAnalyzer;
use review_gate_core::SemanticRequest;
use review_gate_core::SemanticVerdict;

// ============================================================================
// SECTION: Change Set Builders
// ============================================================================

/// Builds a text changed file covering the whole content as added lines.
pub fn text_file(path: &str, body: &str) -> ChangedFile {
    let lines = u32::try_from(body.lines().count().max(1)).unwrap();
    ChangedFile {
        path: path.to_string(),
        added_ranges: vec![LineRange::new(1, lines)],
        content: FileContent::Text {
            body: body.to_string(),
        },
    }
}

/// Builds a change set from files, deriving totals from the contents.
pub fn changes_for(files: Vec<ChangedFile>) -> PrChanges {
    let total_lines = files
        .iter()
        .map(|file| file.content.text().map_or(0, |body| body.lines().count()))
        .sum::<usize>();
    PrChanges {
        pr: "42".to_string(),
        head_sha: "deadbeef".to_string(),
        total_lines: u32::try_from(total_lines).unwrap(),
        total_files: files.len(),
        files,
        truncated: false,
    }
}

// ============================================================================
// SECTION: Stub Diff Source
// ============================================================================

/// Diff source returning a fixed change set or a fixed error.
pub struct StubSource {
    /// Result handed out on every fetch.
    response: Result<PrChanges, String>,
}

impl StubSource {
    /// Creates a source that returns the given change set.
    pub fn with_changes(changes: PrChanges) -> Self {
        Self {
            response: Ok(changes),
        }
    }

    /// Creates a source that fails every fetch.
    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
        }
    }
}

#[async_trait]
impl DiffSource for StubSource {
    async fn fetch(&self, _pr: &str) -> Result<PrChanges, FetchError> {
        match &self.response {
            Ok(changes) => Ok(changes.clone()),
            Err(message) => Err(FetchError::Source(message.clone())),
        }
    }
}

// ============================================================================
// SECTION: Stub Semantic Analyzers
// ============================================================================

/// Analyzer returning scripted verdicts by rule id; counts calls.
pub struct ScriptedAnalyzer {
    /// Verdicts keyed by rule id; unknown ids report no violation.
    verdicts: BTreeMap<String, SemanticVerdict>,
    /// Number of analyze calls made.
    calls: AtomicUsize,
}

impl ScriptedAnalyzer {
    /// Creates an analyzer that never reports a violation.
    pub fn quiet() -> Self {
        Self {
            verdicts: BTreeMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Creates an analyzer with scripted verdicts keyed by rule id.
    pub fn scripted(verdicts: BTreeMap<String, SemanticVerdict>) -> Self {
        Self {
            verdicts,
            calls: AtomicUsize::new(0),
        }
    }

    /// Returns the number of analyze calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SemanticAnalyzer for ScriptedAnalyzer {
    async fn analyze(&self, request: SemanticRequest) -> Result<SemanticVerdict, AnalyzerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.verdicts.get(request.rule_id.as_str()).cloned().unwrap_or(SemanticVerdict {
            violation: false,
            explanation: String::new(),
            line_start: None,
            line_end: None,
        }))
    }
}

/// Analyzer that fails every call, as after exhausted retries.
pub struct FailingAnalyzer;

#[async_trait]
impl SemanticAnalyzer for FailingAnalyzer {
    async fn analyze(&self, _request: SemanticRequest) -> Result<SemanticVerdict, AnalyzerError> {
        Err(AnalyzerError::Transient("rate limited after 3 attempts".to_string()))
    }
}

// ============================================================================
// SECTION: Recording Publisher
// ============================================================================

/// One recorded publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedReport {
    /// Report body as handed to the publisher.
    pub report: String,
    /// Terminal status alongside the report.
    pub status: ReviewStatus,
    /// Idempotency key for comment upsert.
    pub idempotency_key: String,
}

/// Publisher recording every publication; optionally failing.
pub struct RecordingPublisher {
    /// Recorded publications in call order.
    published: Mutex<Vec<PublishedReport>>,
    /// When true, every publish fails.
    fail: bool,
}

impl RecordingPublisher {
    /// Creates a publisher that records and succeeds.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            published: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    /// Creates a publisher that records and fails every call.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            published: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    /// Returns the recorded publications.
    pub fn published(&self) -> Vec<PublishedReport> {
        self.published.lock().expect("publisher lock").clone()
    }
}

#[async_trait]
impl ReportPublisher for RecordingPublisher {
    async fn publish(
        &self,
        report: &str,
        status: ReviewStatus,
        idempotency_key: &str,
    ) -> Result<(), PublishError> {
        self.published.lock().expect("publisher lock").push(PublishedReport {
            report: report.to_string(),
            status,
            idempotency_key: idempotency_key.to_string(),
        });
        if self.fail {
            return Err(PublishError::Publish("comment endpoint unreachable".to_string()));
        }
        Ok(())
    }
}
