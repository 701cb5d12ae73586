// crates/review-gate-core/src/lib.rs
// ============================================================================
// Module: Review Gate Core
// Description: Data model, rule evaluation, and pipeline orchestration.
// Purpose: Provide the deterministic review pipeline behind the gate verdict.
// Dependencies: regex, serde, thiserror, tokio, async-trait
// ============================================================================

//! ## Overview
//! This crate implements the review pipeline core: the rule data model, the
//! context gate, the rules engine (deterministic pattern pass plus semantic
//! pass), finding aggregation, suggested-fix generation, report formatting,
//! and the orchestrator state machine. External concerns (diff fetching,
//! chat-completion calls, report publication) are reached only through the
//! interfaces in [`interfaces`].
//! Invariants:
//! - The pipeline never mutates reviewed sources and never publishes partial
//!   results.
//! - Verdicts are a pure function of the change set, the rule set, and the
//!   configuration, up to the external boundary calls.
//! - Report rendering is byte-stable for identical inputs.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod builtin;
pub mod changes;
pub mod context;
pub mod diffgen;
pub mod engine;
pub mod finding;
pub mod interfaces;
pub mod orchestrator;
pub mod report;
pub mod review;
pub mod rules;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use changes::ChangedFile;
pub use changes::ContentError;
pub use changes::FileContent;
pub use changes::LineRange;
pub use changes::PrChanges;
pub use context::ContextCheck;
pub use context::RefusalReason;
pub use context::ReviewLimits;
pub use context::check_context;
pub use context::is_generated_path;
pub use finding::Finding;
pub use finding::ReviewResult;
pub use finding::ReviewStatus;
pub use finding::Severity;
pub use finding::SummaryCounts;
pub use interfaces::AnalyzerError;
pub use interfaces::DiffSource;
pub use interfaces::FetchError;
pub use interfaces::PublishError;
pub use interfaces::ReportPublisher;
pub use interfaces::SemanticAnalyzer;
pub use interfaces::SemanticRequest;
pub use interfaces::SemanticVerdict;
pub use orchestrator::Orchestrator;
pub use orchestrator::OrchestratorConfig;
pub use orchestrator::RunOutcome;
pub use orchestrator::RunPhase;
pub use report::format_report;
pub use review::ReviewEngine;
pub use review::ReviewError;
pub use rules::FixTemplate;
pub use rules::Rule;
pub use rules::RuleCategory;
pub use rules::RuleConfigError;
pub use rules::RuleId;
pub use rules::RuleSet;
