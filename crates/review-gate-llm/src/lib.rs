// crates/review-gate-llm/src/lib.rs
// ============================================================================
// Module: Review Gate LLM
// Description: Semantic analyzer over a chat-completion HTTP API.
// Purpose: Turn prompt-bearing rules into validated structured verdicts.
// Dependencies: review-gate-core, reqwest, serde_json, tokio, tracing
// ============================================================================

//! ## Overview
//! Implements the semantic side of rule evaluation: each prompt-bearing rule
//! becomes one chat-completion call with a fixed system prompt, and the
//! model's reply is parsed as a strict JSON verdict. Calls run under a hard
//! per-request timeout and a composable retry policy with jittered backoff;
//! a failure that survives the retries surfaces as an analyzer error for the
//! engine to downgrade.
//! Invariants:
//! - The model's output is never trusted: replies that fail validation are
//!   treated as retryable failures, never as verdicts.
//! - Retries apply only to transient failures (timeouts, rate limits,
//!   5xx responses, malformed replies).

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod prompts;
pub mod retry;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use client::ChatAnalyzer;
pub use client::ChatAnalyzerConfig;
pub use prompts::VerdictParseError;
pub use prompts::build_user_prompt;
pub use prompts::parse_verdict;
pub use retry::RetryPolicy;
pub use retry::run_with_retry;
