// crates/review-gate-llm/src/prompts.rs
// ============================================================================
// Module: Prompt Construction and Verdict Parsing
// Description: Chat prompts for semantic checks and strict reply validation.
// Purpose: Keep the model on a fixed contract: structured JSON in, structured
// JSON out, nothing else accepted.
// Dependencies: review-gate-core, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The system prompt pins the model to a reviewer role and a JSON-only
//! output contract. The user prompt carries the rule's instruction plus the
//! file content with line numbers, so the model can locate violations.
//! Replies are parsed strictly: JSON only (an optional code fence is
//! stripped), required fields enforced, line ranges normalized.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use review_gate_core::SemanticRequest;
use review_gate_core::SemanticVerdict;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum file content bytes embedded in one prompt.
pub const MAX_PROMPT_CONTENT_BYTES: usize = 48_000;

// ============================================================================
// SECTION: System Prompt
// ============================================================================

/// Fixed system prompt for every semantic check.
pub const SYSTEM_PROMPT: &str = r#"You are a code reviewer evaluating one file against one review rule.

You must:
- Judge only the rule you are given, nothing else
- Base the verdict strictly on the file content provided
- Cite the smallest line range that demonstrates the violation
- Be conservative: when the evidence is ambiguous, report no violation

Your reply must be a single JSON object and nothing else, with this shape:
{"violation": <bool>, "explanation": <string>, "line_start": <int or null>, "line_end": <int or null>}

When "violation" is false, "explanation" may be empty and both line fields must be null."#;

// ============================================================================
// SECTION: User Prompt
// ============================================================================

/// Builds the user prompt for one semantic check.
///
/// Content is embedded with 1-based line numbers; oversized content is cut
/// at a character boundary and marked as truncated.
#[must_use]
pub fn build_user_prompt(request: &SemanticRequest) -> String {
    let (content, truncated) = bounded_content(&request.content);
    let mut prompt = String::new();
    let _ = writeln!(prompt, "Rule: {}", request.prompt);
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "File: {}", request.file_path);
    if truncated {
        let _ = writeln!(prompt, "(content truncated for length)");
    }
    let _ = writeln!(prompt);
    for (index, line) in content.lines().enumerate() {
        let _ = writeln!(prompt, "{:>5} | {line}", index + 1);
    }
    prompt
}

/// Cuts content at the prompt byte limit on a character boundary.
fn bounded_content(content: &str) -> (&str, bool) {
    if content.len() <= MAX_PROMPT_CONTENT_BYTES {
        return (content, false);
    }
    let mut cut = MAX_PROMPT_CONTENT_BYTES;
    while cut > 0 && !content.is_char_boundary(cut) {
        cut -= 1;
    }
    (&content[..cut], true)
}

// ============================================================================
// SECTION: Verdict Parsing
// ============================================================================

/// Errors raised while parsing a model reply into a verdict.
///
/// # Invariants
/// - Variants describe contract violations; any of them is retryable.
#[derive(Debug, Error)]
pub enum VerdictParseError {
    /// The reply is not a single JSON object of the expected shape.
    #[error("reply is not a valid verdict object: {0}")]
    Malformed(String),
    /// A violation verdict arrived without an explanation.
    #[error("violation reported without an explanation")]
    MissingExplanation,
    /// A line number of zero was reported; lines are 1-based.
    #[error("line numbers must be 1-based")]
    ZeroLine,
}

/// Raw verdict shape as produced by the model.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawVerdict {
    /// Whether the rule is violated.
    violation: bool,
    /// Explanation of the verdict.
    #[serde(default)]
    explanation: String,
    /// First line of the violating span.
    #[serde(default)]
    line_start: Option<u32>,
    /// Last line of the violating span.
    #[serde(default)]
    line_end: Option<u32>,
}

/// Parses and validates a model reply into a verdict.
///
/// Accepts the bare JSON object, optionally wrapped in a markdown code
/// fence. Line ranges are normalized so `line_end >= line_start`.
///
/// # Errors
///
/// Returns [`VerdictParseError`] when the reply violates the output
/// contract.
pub fn parse_verdict(reply: &str) -> Result<SemanticVerdict, VerdictParseError> {
    let body = strip_fence(reply.trim());
    let raw: RawVerdict = serde_json::from_str(body)
        .map_err(|err| VerdictParseError::Malformed(err.to_string()))?;
    if raw.violation && raw.explanation.trim().is_empty() {
        return Err(VerdictParseError::MissingExplanation);
    }
    if raw.line_start == Some(0) || raw.line_end == Some(0) {
        return Err(VerdictParseError::ZeroLine);
    }
    let line_start = raw.line_start.filter(|_| raw.violation);
    let line_end = raw
        .line_end
        .filter(|_| raw.violation)
        .map(|end| line_start.map_or(end, |start| end.max(start)));
    Ok(SemanticVerdict {
        violation: raw.violation,
        explanation: raw.explanation,
        line_start,
        line_end,
    })
}

/// Strips an optional markdown code fence around the reply.
fn strip_fence(reply: &str) -> &str {
    let Some(inner) = reply.strip_prefix("```") else {
        return reply;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    inner.trim()
}
