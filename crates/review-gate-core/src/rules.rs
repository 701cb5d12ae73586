// crates/review-gate-core/src/rules.rs
// ============================================================================
// Module: Rule Data Model
// Description: Rule definitions, rule set construction, and validation.
// Purpose: Provide the immutable rule catalog evaluated by the engine.
// Dependencies: regex, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`Rule`] is one pattern-or-prompt check plus metadata. A [`RuleSet`] is
//! the ordered, id-unique collection of rules active for a run, built once
//! per invocation from the built-in catalog plus an optional project overlay.
//! Invariants:
//! - Rules are validated and patterns compiled at construction; nothing is
//!   mutated after load.
//! - Later-loaded rules shadow earlier rules with the same id (last-wins),
//!   replacing them in place to preserve ordering.
//! - A rule with neither pattern nor prompt is rejected at load time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use regex::Regex;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::finding::Severity;

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Stable rule identifier, e.g. `SEC001`.
///
/// # Invariants
/// - Identifiers are non-empty and unique within a [`RuleSet`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl RuleId {
    /// Creates a rule identifier from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Categories
// ============================================================================

/// Category of a rule or finding.
///
/// # Invariants
/// - Variants are stable for serialization and report rendering.
/// - `Diagnostic` (serialized as `error`) is reserved for pipeline
///   diagnostics and may not be declared by rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    /// Security and correctness hazards.
    Safety,
    /// Readability and comprehension issues.
    Clarity,
    /// Long-term upkeep concerns.
    Maintainability,
    /// Pipeline diagnostic, not a code violation.
    #[serde(rename = "error")]
    Diagnostic,
}

impl RuleCategory {
    /// Returns a stable label for report rendering.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Safety => "safety",
            Self::Clarity => "clarity",
            Self::Maintainability => "maintainability",
            Self::Diagnostic => "error",
        }
    }
}

// ============================================================================
// SECTION: Rule Definition
// ============================================================================

/// Mechanical fix template attached to a rule.
///
/// # Invariants
/// - `replacement` uses the pattern's capture-group syntax and is applied to
///   the matched span only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixTemplate {
    /// Replacement text substituted for the matched span.
    pub replacement: String,
}

/// Immutable rule definition: one pattern-or-prompt check plus metadata.
///
/// # Invariants
/// - At least one of `pattern` and `llm_prompt` is set.
/// - `category` is never [`RuleCategory::Diagnostic`].
/// - `fix` is meaningful only when `pattern` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Stable rule identifier.
    pub id: RuleId,
    /// Rule category.
    pub category: RuleCategory,
    /// Severity assigned to findings from this rule.
    pub severity: Severity,
    /// Short human-readable description of the rule.
    pub description: String,
    /// Optional deterministic regex pattern.
    pub pattern: Option<String>,
    /// Optional natural-language instruction for the semantic pass.
    pub llm_prompt: Option<String>,
    /// Optional mechanical fix template for pattern matches.
    pub fix: Option<FixTemplate>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while constructing a rule set.
///
/// # Invariants
/// - Variants name the offending rule id for fail-fast diagnostics.
#[derive(Debug, Error)]
pub enum RuleConfigError {
    /// Rule declares neither a pattern nor a prompt.
    #[error("rule {id} has neither pattern nor llm_prompt")]
    MissingCheck {
        /// Offending rule identifier.
        id: RuleId,
    },
    /// Rule identifier is empty.
    #[error("rule id must not be empty")]
    EmptyId,
    /// Rule pattern failed to compile.
    #[error("rule {id} has an invalid pattern: {reason}")]
    InvalidPattern {
        /// Offending rule identifier.
        id: RuleId,
        /// Compilation failure description.
        reason: String,
    },
    /// Rule declares the reserved diagnostic category.
    #[error("rule {id} uses the reserved category `error`")]
    ReservedCategory {
        /// Offending rule identifier.
        id: RuleId,
    },
    /// Rule declares a fix template without a pattern.
    #[error("rule {id} declares a fix template but no pattern")]
    FixWithoutPattern {
        /// Offending rule identifier.
        id: RuleId,
    },
}

// ============================================================================
// SECTION: Compiled Rules
// ============================================================================

/// A validated rule with its pattern compiled.
///
/// # Invariants
/// - `matcher` is `Some` exactly when `rule.pattern` is `Some`.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// The validated rule definition.
    pub rule: Rule,
    /// Compiled regex for the deterministic pass.
    pub matcher: Option<Regex>,
}

impl CompiledRule {
    /// Validates and compiles a rule definition.
    fn compile(rule: Rule) -> Result<Self, RuleConfigError> {
        if rule.id.as_str().is_empty() {
            return Err(RuleConfigError::EmptyId);
        }
        if rule.category == RuleCategory::Diagnostic {
            return Err(RuleConfigError::ReservedCategory {
                id: rule.id,
            });
        }
        if rule.pattern.is_none() && rule.llm_prompt.is_none() {
            return Err(RuleConfigError::MissingCheck {
                id: rule.id,
            });
        }
        if rule.fix.is_some() && rule.pattern.is_none() {
            return Err(RuleConfigError::FixWithoutPattern {
                id: rule.id,
            });
        }
        let matcher = match &rule.pattern {
            Some(pattern) => Some(Regex::new(pattern).map_err(|err| {
                RuleConfigError::InvalidPattern {
                    id: rule.id.clone(),
                    reason: err.to_string(),
                }
            })?),
            None => None,
        };
        Ok(Self {
            rule,
            matcher,
        })
    }
}

// ============================================================================
// SECTION: Rule Set
// ============================================================================

/// Ordered, id-unique collection of compiled rules.
///
/// # Invariants
/// - Immutable after construction; safe to share across workers.
/// - Rule ids are unique; shadowing replaces in place.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    /// Compiled rules in load order.
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// Builds a rule set from rule definitions.
    ///
    /// Later definitions with an id already present shadow the earlier entry
    /// in place (last-wins).
    ///
    /// # Errors
    ///
    /// Returns [`RuleConfigError`] for the first invalid rule encountered.
    pub fn from_rules(rules: Vec<Rule>) -> Result<Self, RuleConfigError> {
        let mut set = Self::default();
        set.merge(rules)?;
        Ok(set)
    }

    /// Merges additional rule definitions into this set (last-wins by id).
    ///
    /// # Errors
    ///
    /// Returns [`RuleConfigError`] for the first invalid rule encountered.
    pub fn merge(&mut self, rules: Vec<Rule>) -> Result<(), RuleConfigError> {
        for rule in rules {
            let compiled = CompiledRule::compile(rule)?;
            match self.rules.iter_mut().find(|entry| entry.rule.id == compiled.rule.id) {
                Some(existing) => *existing = compiled,
                None => self.rules.push(compiled),
            }
        }
        Ok(())
    }

    /// Returns a set with additional rules merged in (last-wins by id).
    ///
    /// # Errors
    ///
    /// Returns [`RuleConfigError`] for the first invalid rule encountered.
    pub fn with_overlay(mut self, rules: Vec<Rule>) -> Result<Self, RuleConfigError> {
        self.merge(rules)?;
        Ok(self)
    }

    /// Returns the compiled rules in load order.
    #[must_use]
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Returns the number of rules in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true when the set contains no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Looks up a compiled rule by id.
    #[must_use]
    pub fn get(&self, id: &RuleId) -> Option<&CompiledRule> {
        self.rules.iter().find(|entry| &entry.rule.id == id)
    }
}
