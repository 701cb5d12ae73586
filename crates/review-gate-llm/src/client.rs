// crates/review-gate-llm/src/client.rs
// ============================================================================
// Module: Chat-Completion Analyzer
// Description: Semantic analyzer over an OpenAI-compatible HTTP endpoint.
// Purpose: Issue one bounded, retried chat-completion call per semantic
// check and return a validated verdict.
// Dependencies: crate::{prompts, retry}, review-gate-core, reqwest, serde,
// serde_json, tracing, url
// ============================================================================

//! ## Overview
//! The analyzer posts one chat-completion request per (file, rule) check:
//! fixed system prompt, rule-specific user prompt, temperature zero. The
//! retry policy wraps the whole call including reply validation, so a
//! malformed completion gets a fresh sample before it degrades. Failure
//! classification: timeouts, connection errors, 429, and 5xx are transient;
//! other HTTP failures and client misconfiguration are fatal.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use review_gate_core::AnalyzerError;
use review_gate_core::SemanticAnalyzer;
use review_gate_core::SemanticRequest;
use review_gate_core::SemanticVerdict;
use serde::Deserialize;
use serde::Serialize;
use url::Url;

use crate::prompts::SYSTEM_PROMPT;
use crate::prompts::build_user_prompt;
use crate::prompts::parse_verdict;
use crate::retry::RetryPolicy;
use crate::retry::run_with_retry;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the chat-completion analyzer.
///
/// # Invariants
/// - `endpoint` is a full chat-completions URL.
/// - `timeout` bounds each individual HTTP call; retries multiply it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatAnalyzerConfig {
    /// Chat-completion endpoint URL.
    pub endpoint: String,
    /// Model identifier sent with each request.
    pub model: String,
    /// Bearer token for the endpoint.
    pub api_key: String,
    /// Hard timeout per HTTP call.
    pub timeout: Duration,
    /// Retry policy for transient failures.
    pub retry: RetryPolicy,
}

impl Default for ChatAnalyzerConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(20),
            retry: RetryPolicy::default(),
        }
    }
}

// ============================================================================
// SECTION: Wire Shapes
// ============================================================================

/// One chat message in the request body.
#[derive(Debug, Serialize)]
struct ChatMessage {
    /// Message role: `system` or `user`.
    role: &'static str,
    /// Message text.
    content: String,
}

/// Chat-completion request body.
#[derive(Debug, Serialize)]
struct ChatRequest {
    /// Model identifier.
    model: String,
    /// Conversation messages.
    messages: Vec<ChatMessage>,
    /// Sampling temperature; zero for deterministic verdicts.
    temperature: f32,
}

/// Chat-completion response body, reduced to the fields used.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    /// Completion choices; the first is used.
    choices: Vec<ChatChoice>,
}

/// One completion choice.
#[derive(Debug, Deserialize)]
struct ChatChoice {
    /// The completion message.
    message: ChatReply,
}

/// The completion message content.
#[derive(Debug, Deserialize)]
struct ChatReply {
    /// Reply text.
    content: String,
}

// ============================================================================
// SECTION: Analyzer
// ============================================================================

/// Semantic analyzer backed by a chat-completion endpoint.
///
/// # Invariants
/// - One HTTP call per attempt; the retry policy owns all retrying, so
///   callers never retry on top.
pub struct ChatAnalyzer {
    /// Shared HTTP client.
    client: Client,
    /// Parsed endpoint URL.
    endpoint: Url,
    /// Analyzer configuration.
    config: ChatAnalyzerConfig,
}

impl ChatAnalyzer {
    /// Creates an analyzer from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Fatal`] when the endpoint URL is invalid or
    /// the HTTP client cannot be built.
    pub fn new(config: ChatAnalyzerConfig) -> Result<Self, AnalyzerError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|err| AnalyzerError::Fatal(format!("invalid endpoint: {err}")))?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| AnalyzerError::Fatal(format!("http client build failed: {err}")))?;
        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    /// Issues one chat-completion call and validates the reply.
    async fn complete_once(&self, body: &ChatRequest) -> Result<SemanticVerdict, AnalyzerError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status));
        }
        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|err| AnalyzerError::Transient(format!("malformed response body: {err}")))?;
        let content = reply
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| AnalyzerError::Transient("response carried no choices".to_string()))?;
        parse_verdict(content)
            .map_err(|err| AnalyzerError::Transient(format!("invalid verdict: {err}")))
    }
}

#[async_trait]
impl SemanticAnalyzer for ChatAnalyzer {
    async fn analyze(&self, request: SemanticRequest) -> Result<SemanticVerdict, AnalyzerError> {
        tracing::debug!(
            rule = %request.rule_id,
            file = %request.file_path,
            "semantic check dispatched"
        );
        let body = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_user_prompt(&request),
                },
            ],
            temperature: 0.0,
        };
        let verdict = run_with_retry(self.config.retry, || self.complete_once(&body)).await?;
        tracing::debug!(
            rule = %request.rule_id,
            file = %request.file_path,
            violation = verdict.violation,
            "semantic check completed"
        );
        Ok(verdict)
    }
}

// ============================================================================
// SECTION: Failure Classification
// ============================================================================

/// Classifies a reqwest error as transient or fatal.
fn classify_request_error(err: reqwest::Error) -> AnalyzerError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        return AnalyzerError::Transient(format!("request failed: {err}"));
    }
    AnalyzerError::Fatal(format!("request failed: {err}"))
}

/// Classifies an HTTP status as transient or fatal.
fn classify_status(status: StatusCode) -> AnalyzerError {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        return AnalyzerError::Transient(format!("endpoint returned {status}"));
    }
    AnalyzerError::Fatal(format!("endpoint returned {status}"))
}
