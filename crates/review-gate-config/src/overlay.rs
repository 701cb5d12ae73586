// crates/review-gate-config/src/overlay.rs
// ============================================================================
// Module: Rule Overlay Loader
// Description: Custom rule overlay parsing and rule-set assembly.
// Purpose: Load project `[[rules]]` TOML files and merge them over the
// built-in catalog (last-wins by id).
// Dependencies: crate::{guards, settings}, review-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! A project overlay is a TOML file of `[[rules]]` records. Each record is
//! validated strictly: unknown fields, unknown categories, and unknown
//! severities are rejected at parse time, and rule-level invariants (pattern
//! compilation, reserved category, fix without pattern) are enforced when
//! the rules merge into the set. Overlay rules shadow built-ins by id.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use review_gate_core::FixTemplate;
use review_gate_core::Rule;
use review_gate_core::RuleCategory;
use review_gate_core::RuleId;
use review_gate_core::RuleSet;
use review_gate_core::Severity;
use review_gate_core::builtin::builtin_rule_set;
use serde::Deserialize;

use crate::guards::read_limited_utf8;
use crate::settings::ConfigError;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum accepted overlay file size in bytes.
pub const MAX_OVERLAY_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Overlay Format
// ============================================================================

/// Top-level overlay document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OverlayDoc {
    /// Overlay rule records in file order.
    #[serde(default)]
    rules: Vec<OverlayRule>,
}

/// One `[[rules]]` record.
///
/// Mirrors the core rule definition with strict unknown-field rejection.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OverlayRule {
    /// Stable rule identifier.
    id: String,
    /// Rule category.
    category: RuleCategory,
    /// Severity assigned to findings from this rule.
    severity: Severity,
    /// Short human-readable description of the rule.
    description: String,
    /// Optional deterministic regex pattern.
    #[serde(default)]
    pattern: Option<String>,
    /// Optional natural-language instruction for the semantic pass.
    #[serde(default)]
    llm_prompt: Option<String>,
    /// Optional mechanical fix template.
    #[serde(default)]
    fix: Option<OverlayFix>,
}

/// Fix template record nested under a rule.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OverlayFix {
    /// Replacement text substituted for the matched span.
    replacement: String,
}

impl From<OverlayRule> for Rule {
    fn from(overlay: OverlayRule) -> Self {
        Self {
            id: RuleId::new(overlay.id),
            category: overlay.category,
            severity: overlay.severity,
            description: overlay.description,
            pattern: overlay.pattern,
            llm_prompt: overlay.llm_prompt,
            fix: overlay.fix.map(|fix| FixTemplate {
                replacement: fix.replacement,
            }),
        }
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Parses overlay TOML text into rule definitions.
///
/// # Errors
///
/// Returns [`ConfigError::OverlayParse`] for malformed TOML or records that
/// violate the overlay schema.
pub fn parse_overlay(text: &str) -> Result<Vec<Rule>, ConfigError> {
    let doc: OverlayDoc = toml::from_str(text).map_err(|err| ConfigError::OverlayParse {
        reason: err.to_string(),
    })?;
    Ok(doc.rules.into_iter().map(Rule::from).collect())
}

/// Loads overlay rules from a file through the input guards.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file violates an input guard or fails to
/// parse.
pub fn load_overlay(path: &Path) -> Result<Vec<Rule>, ConfigError> {
    let text =
        read_limited_utf8(path, MAX_OVERLAY_BYTES).map_err(|err| ConfigError::OverlayRead {
            path: path.display().to_string(),
            source: err,
        })?;
    parse_overlay(&text)
}

/// Builds the active rule set: built-ins plus an optional overlay.
///
/// # Errors
///
/// Returns [`ConfigError`] when the overlay fails to load or any rule fails
/// validation.
pub fn load_rule_set(overlay_path: Option<&Path>) -> Result<RuleSet, ConfigError> {
    let base = builtin_rule_set()?;
    match overlay_path {
        Some(path) => Ok(base.with_overlay(load_overlay(path)?)?),
        None => Ok(base),
    }
}
