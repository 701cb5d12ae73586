// crates/review-gate-core/src/builtin.rs
// ============================================================================
// Module: Built-in Rule Catalog
// Description: Default rules shipped with the review gate.
// Purpose: Provide a zero-config rule baseline for safety, clarity, and
// maintainability checks.
// Dependencies: crate::{finding, rules}
// ============================================================================

//! ## Overview
//! The built-in catalog covers the hazards the gate must catch without any
//! project configuration: injection-prone string building, hardcoded
//! credentials, dynamic evaluation, and common hygiene issues. Project
//! overlays may shadow any built-in by id (last-wins).

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::finding::Severity;
use crate::rules::FixTemplate;
use crate::rules::Rule;
use crate::rules::RuleCategory;
use crate::rules::RuleConfigError;
use crate::rules::RuleId;
use crate::rules::RuleSet;

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Returns the built-in rule definitions in catalog order.
#[must_use]
pub fn builtin_rules() -> Vec<Rule> {
    vec![
        Rule {
            id: RuleId::new("SEC001"),
            category: RuleCategory::Safety,
            severity: Severity::Critical,
            description: "SQL statement built from string interpolation or concatenation"
                .to_string(),
            pattern: Some(
                r#"(?i)f["'][^"'\n]*\b(select|insert|update|delete)\b[^"'\n]*\{|["'][^"'\n]*\b(select|insert|update|delete)\b[^"'\n]*["']\s*(\+|%|\.format\()"#
                    .to_string(),
            ),
            llm_prompt: Some(
                "Does this change build a SQL statement by interpolating or concatenating \
                 untrusted input instead of using parameterized queries?"
                    .to_string(),
            ),
            fix: None,
        },
        Rule {
            id: RuleId::new("SEC002"),
            category: RuleCategory::Safety,
            severity: Severity::Critical,
            description: "hardcoded credential or API key".to_string(),
            pattern: Some(
                r#"(?i)\b(api[_-]?key|secret|passwd|password|token)\b\s*[:=]\s*["'][A-Za-z0-9_\-/+=]{8,}["']"#
                    .to_string(),
            ),
            llm_prompt: None,
            fix: None,
        },
        Rule {
            id: RuleId::new("SEC003"),
            category: RuleCategory::Safety,
            severity: Severity::Warning,
            description: "dynamic evaluation of runtime strings".to_string(),
            pattern: Some(r"\beval\s*\(".to_string()),
            llm_prompt: None,
            fix: Some(FixTemplate {
                replacement: "ast.literal_eval(".to_string(),
            }),
        },
        Rule {
            id: RuleId::new("SEC004"),
            category: RuleCategory::Safety,
            severity: Severity::Warning,
            description: "subprocess invoked through a shell".to_string(),
            pattern: Some(r"\bshell\s*=\s*True\b".to_string()),
            llm_prompt: None,
            fix: Some(FixTemplate {
                replacement: "shell=False".to_string(),
            }),
        },
        Rule {
            id: RuleId::new("CLR001"),
            category: RuleCategory::Clarity,
            severity: Severity::Info,
            description: "identifier names do not convey intent".to_string(),
            pattern: None,
            llm_prompt: Some(
                "Do the identifiers introduced by this change convey their intent, or are \
                 they single letters or abbreviations that obscure meaning?"
                    .to_string(),
            ),
            fix: None,
        },
        Rule {
            id: RuleId::new("CLR002"),
            category: RuleCategory::Clarity,
            severity: Severity::Warning,
            description: "commented-out code left in the change".to_string(),
            pattern: Some(
                r"(?m)^\s*(#|//)\s*(def |class |import |fn |return\b|if\s*\(|for\s*\()"
                    .to_string(),
            ),
            llm_prompt: None,
            fix: None,
        },
        Rule {
            id: RuleId::new("MNT001"),
            category: RuleCategory::Maintainability,
            severity: Severity::Warning,
            description: "unresolved TODO or FIXME marker".to_string(),
            pattern: Some(r"\b(TODO|FIXME|XXX)\b".to_string()),
            llm_prompt: None,
            fix: None,
        },
        Rule {
            id: RuleId::new("MNT002"),
            category: RuleCategory::Maintainability,
            severity: Severity::Info,
            description: "function is too long or deeply nested to maintain".to_string(),
            pattern: None,
            llm_prompt: Some(
                "Does this change introduce a function that is excessively long or deeply \
                 nested, such that it should be decomposed?"
                    .to_string(),
            ),
            fix: None,
        },
    ]
}

/// Builds the built-in rule set.
///
/// # Errors
///
/// Returns [`RuleConfigError`] if the catalog fails validation; the catalog
/// is covered by tests, so this indicates a packaging defect.
pub fn builtin_rule_set() -> Result<RuleSet, RuleConfigError> {
    RuleSet::from_rules(builtin_rules())
}
