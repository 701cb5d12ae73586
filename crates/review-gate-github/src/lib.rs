// crates/review-gate-github/src/lib.rs
// ============================================================================
// Module: Review Gate GitHub
// Description: GitHub-backed diff source and report publisher.
// Purpose: Adapt the pipeline's external interfaces to the GitHub REST API.
// Dependencies: review-gate-core, reqwest, serde, sha2, url
// ============================================================================

//! ## Overview
//! Two adapters over the GitHub REST API: a diff source that assembles a
//! change set from the pull-request files endpoint (unified-patch parsing,
//! honest truncation flags, content fetched at the head commit), and a
//! publisher that upserts one marker comment per pull request, keyed by
//! commit SHA and skipped entirely when the report digest is unchanged.
//! Invariants:
//! - The source never fabricates content: anything it cannot deliver
//!   completely is marked truncated or binary.
//! - The publisher never duplicates comments across re-runs.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod patch;
pub mod publisher;
pub mod source;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use client::GithubApiConfig;
pub use client::GithubClient;
pub use client::GithubError;
pub use patch::parse_added_ranges;
pub use publisher::GithubPublisher;
pub use publisher::report_digest;
pub use source::GithubDiffSource;
