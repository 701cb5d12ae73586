// crates/review-gate-config/src/settings.rs
// ============================================================================
// Module: Gate Settings
// Description: Environment-derived configuration for a review run.
// Purpose: Resolve pipeline, LLM, and GitHub settings once at startup.
// Dependencies: crate::guards, review-gate-core, thiserror
// ============================================================================

//! ## Overview
//! Settings resolve from environment variables and are then layered under
//! CLI flags by the binary. Resolution is a pure function over a captured
//! environment map, so tests never mutate process state. Unset variables
//! fall back to conservative defaults; malformed values are fail-fast
//! errors naming the variable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::time::Duration;

use review_gate_core::ReviewLimits;
use review_gate_core::RuleConfigError;
use thiserror::Error;

use crate::guards::GuardError;

// ============================================================================
// SECTION: Variable Names
// ============================================================================

/// Strict-mode toggle variable.
pub const STRICT_MODE_VAR: &str = "STRICT_MODE";

/// Refusal exit-code behavior variable.
pub const FAIL_ON_INSUFFICIENT_CONTEXT_VAR: &str = "FAIL_ON_INSUFFICIENT_CONTEXT";

/// Line-count limit variable.
pub const MAX_LINES_VAR: &str = "MAX_LINES_PER_PR";

/// File-count limit variable.
pub const MAX_FILES_VAR: &str = "MAX_FILES_PER_PR";

/// Custom rule overlay path variable.
pub const CUSTOM_RULES_VAR: &str = "CUSTOM_RULES_PATH";

/// Worker-pool concurrency variable.
pub const CONCURRENCY_VAR: &str = "REVIEW_GATE_CONCURRENCY";

/// Chat-completion endpoint variable.
pub const LLM_ENDPOINT_VAR: &str = "REVIEW_GATE_LLM_ENDPOINT";

/// Chat-completion model variable.
pub const LLM_MODEL_VAR: &str = "REVIEW_GATE_LLM_MODEL";

/// Chat-completion API key variable.
pub const LLM_API_KEY_VAR: &str = "REVIEW_GATE_LLM_API_KEY";

/// GitHub API base variable.
pub const GITHUB_API_VAR: &str = "REVIEW_GATE_GITHUB_API";

/// GitHub token variable.
pub const GITHUB_TOKEN_VAR: &str = "REVIEW_GATE_GITHUB_TOKEN";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while resolving configuration.
///
/// # Invariants
/// - Variants name the offending variable, file, or rule for fail-fast
///   diagnostics.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable holds a value that is not a boolean.
    #[error("{key} must be true or false, got `{value}`")]
    InvalidBool {
        /// Offending variable name.
        key: &'static str,
        /// Observed value.
        value: String,
    },
    /// An environment variable holds a value that is not a positive integer.
    #[error("{key} must be a positive integer, got `{value}`")]
    InvalidNumber {
        /// Offending variable name.
        key: &'static str,
        /// Observed value.
        value: String,
    },
    /// A required setting is absent.
    #[error("required setting {key} is not set")]
    Missing {
        /// Missing variable name.
        key: &'static str,
    },
    /// The overlay file failed an input guard.
    #[error("rule overlay {path}: {source}")]
    OverlayRead {
        /// Offending file path.
        path: String,
        /// Guard violation.
        source: GuardError,
    },
    /// The overlay file failed to parse.
    #[error("rule overlay is invalid: {reason}")]
    OverlayParse {
        /// Parse failure description.
        reason: String,
    },
    /// An overlay rule failed validation.
    #[error(transparent)]
    Rule(#[from] RuleConfigError),
}

// ============================================================================
// SECTION: Settings Model
// ============================================================================

/// Captured environment, keyed by variable name.
pub type EnvMap = BTreeMap<String, String>;

/// Chat-completion settings for the semantic analyzer.
///
/// # Invariants
/// - `api_key` is `None` only when semantic analysis is disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmSettings {
    /// Chat-completion endpoint URL.
    pub endpoint: String,
    /// Model identifier sent with each request.
    pub model: String,
    /// Bearer token for the endpoint.
    pub api_key: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
        }
    }
}

/// GitHub adapter settings.
///
/// # Invariants
/// - `token` is `None` only for unauthenticated read paths in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubSettings {
    /// API base URL.
    pub api_base: String,
    /// Bearer token for the API.
    pub token: Option<String>,
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            token: None,
        }
    }
}

/// Resolved configuration for one review run.
///
/// # Invariants
/// - Resolved once at startup; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateSettings {
    /// Escalates warnings to build-failing severity.
    pub strict_mode: bool,
    /// When false, a refusal degrades to exit code 0.
    pub fail_on_insufficient_context: bool,
    /// Context gate limits.
    pub limits: ReviewLimits,
    /// Worker-pool concurrency.
    pub concurrency: usize,
    /// Optional rule overlay path.
    pub custom_rules_path: Option<String>,
    /// Hard timeout for the diff fetch.
    pub fetch_timeout: Duration,
    /// Hard timeout for the publish call.
    pub publish_timeout: Duration,
    /// Chat-completion settings.
    pub llm: LlmSettings,
    /// GitHub adapter settings.
    pub github: GithubSettings,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            strict_mode: false,
            fail_on_insufficient_context: true,
            limits: ReviewLimits::default(),
            concurrency: 4,
            custom_rules_path: None,
            fetch_timeout: Duration::from_secs(30),
            publish_timeout: Duration::from_secs(30),
            llm: LlmSettings::default(),
            github: GithubSettings::default(),
        }
    }
}

impl GateSettings {
    /// Resolves settings from a captured environment map.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for malformed boolean or numeric values.
    pub fn resolve(env: &EnvMap) -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        if let Some(value) = env.get(STRICT_MODE_VAR) {
            settings.strict_mode = parse_bool(STRICT_MODE_VAR, value)?;
        }
        if let Some(value) = env.get(FAIL_ON_INSUFFICIENT_CONTEXT_VAR) {
            settings.fail_on_insufficient_context =
                parse_bool(FAIL_ON_INSUFFICIENT_CONTEXT_VAR, value)?;
        }
        if let Some(value) = env.get(MAX_LINES_VAR) {
            settings.limits.max_lines = parse_number(MAX_LINES_VAR, value)?;
        }
        if let Some(value) = env.get(MAX_FILES_VAR) {
            settings.limits.max_files = usize::try_from(parse_number(MAX_FILES_VAR, value)?)
                .map_err(|_| ConfigError::InvalidNumber {
                    key: MAX_FILES_VAR,
                    value: value.clone(),
                })?;
        }
        if let Some(value) = env.get(CONCURRENCY_VAR) {
            settings.concurrency = usize::try_from(parse_number(CONCURRENCY_VAR, value)?)
                .map_err(|_| ConfigError::InvalidNumber {
                    key: CONCURRENCY_VAR,
                    value: value.clone(),
                })?;
        }
        if let Some(value) = env.get(CUSTOM_RULES_VAR) {
            settings.custom_rules_path = Some(value.clone());
        }
        if let Some(value) = env.get(LLM_ENDPOINT_VAR) {
            settings.llm.endpoint = value.clone();
        }
        if let Some(value) = env.get(LLM_MODEL_VAR) {
            settings.llm.model = value.clone();
        }
        if let Some(value) = env.get(LLM_API_KEY_VAR) {
            settings.llm.api_key = Some(value.clone());
        }
        if let Some(value) = env.get(GITHUB_API_VAR) {
            settings.github.api_base = value.clone();
        }
        if let Some(value) = env.get(GITHUB_TOKEN_VAR) {
            settings.github.token = Some(value.clone());
        }
        Ok(settings)
    }

    /// Resolves settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for malformed boolean or numeric values.
    pub fn from_process_env() -> Result<Self, ConfigError> {
        let env: EnvMap = std::env::vars().collect();
        Self::resolve(&env)
    }
}

// ============================================================================
// SECTION: Value Parsing
// ============================================================================

/// Parses a boolean environment value.
fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: value.to_string(),
        }),
    }
}

/// Parses a positive integer environment value.
fn parse_number(key: &'static str, value: &str) -> Result<u32, ConfigError> {
    let parsed = value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidNumber {
        key,
        value: value.to_string(),
    })?;
    if parsed == 0 {
        return Err(ConfigError::InvalidNumber {
            key,
            value: value.to_string(),
        });
    }
    Ok(parsed)
}
