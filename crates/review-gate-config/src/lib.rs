// crates/review-gate-config/src/lib.rs
// ============================================================================
// Module: Review Gate Config
// Description: Configuration loading for the review gate pipeline.
// Purpose: Provide environment settings, guarded file reads, and the custom
// rule overlay format.
// Dependencies: review-gate-core, serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration for the review gate comes from two places: environment
//! variables layered under CLI flags, and an optional TOML rule overlay file
//! that shadows built-in rules by id. All file inputs pass through strict
//! guards (path length, size cap, UTF-8) before parsing, and every load
//! failure is fail-fast with the offending source named.
//! Invariants:
//! - Settings are resolved once at startup and immutable afterwards.
//! - Overlay parsing rejects unknown fields, categories, and severities.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod guards;
pub mod overlay;
pub mod settings;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use guards::GuardError;
pub use guards::read_limited_utf8;
pub use overlay::MAX_OVERLAY_BYTES;
pub use overlay::load_overlay;
pub use overlay::load_rule_set;
pub use overlay::parse_overlay;
pub use settings::ConfigError;
pub use settings::EnvMap;
pub use settings::GateSettings;
pub use settings::GithubSettings;
pub use settings::LlmSettings;
