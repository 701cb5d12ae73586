// crates/review-gate-github/src/client.rs
// ============================================================================
// Module: GitHub API Client
// Description: Thin authenticated JSON client for the GitHub REST API.
// Purpose: Provide bounded, typed request helpers shared by the adapters.
// Dependencies: reqwest, serde, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! A small wrapper around `reqwest` carrying the API base, repository
//! coordinates, and token. Requests are JSON in and out with a hard
//! per-call timeout; response statuses are surfaced verbatim so callers
//! can classify them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// GitHub API client errors.
///
/// # Invariants
/// - `Status` carries the HTTP status so callers can classify failures.
#[derive(Debug, Error)]
pub enum GithubError {
    /// The API base or a path segment is not a valid URL.
    #[error("invalid api url: {0}")]
    Url(String),
    /// The request failed below the HTTP layer.
    #[error("github request failed: {0}")]
    Transport(String),
    /// The API answered with a non-success status.
    #[error("github returned {status} for {path}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Request path for diagnostics.
        path: String,
    },
    /// The response body did not match the expected shape.
    #[error("github response decode failed: {0}")]
    Decode(String),
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the GitHub API client.
///
/// # Invariants
/// - `repo` is `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubApiConfig {
    /// API base URL.
    pub api_base: String,
    /// Repository in `owner/name` form.
    pub repo: String,
    /// Bearer token; unauthenticated when absent.
    pub token: Option<String>,
    /// Hard timeout per HTTP call.
    pub timeout: Duration,
}

impl Default for GithubApiConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            repo: String::new(),
            token: None,
            timeout: Duration::from_secs(20),
        }
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Authenticated JSON client for one repository.
pub struct GithubClient {
    /// Shared HTTP client.
    http: Client,
    /// Parsed API base.
    base: Url,
    /// Client configuration.
    config: GithubApiConfig,
}

impl GithubClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError`] when the base URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: GithubApiConfig) -> Result<Self, GithubError> {
        // A trailing slash keeps path joins from clobbering base segments.
        let mut base_text = config.api_base.clone();
        if !base_text.ends_with('/') {
            base_text.push('/');
        }
        let base = Url::parse(&base_text).map_err(|err| GithubError::Url(err.to_string()))?;
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent("review-gate/0.1")
            .build()
            .map_err(|err| GithubError::Transport(err.to_string()))?;
        Ok(Self {
            http,
            base,
            config,
        })
    }

    /// Returns the configured `owner/name` repository.
    #[must_use]
    pub fn repo(&self) -> &str {
        &self.config.repo
    }

    /// Resolves a repository-relative path against the API base.
    fn repo_url(&self, path: &str) -> Result<Url, GithubError> {
        let full = format!("repos/{}/{path}", self.config.repo);
        self.base.join(&full).map_err(|err| GithubError::Url(err.to_string()))
    }

    /// Issues a GET returning typed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError`] for transport failures, non-success statuses,
    /// and undecodable bodies.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GithubError> {
        let url = self.repo_url(path)?;
        let mut request = self.http.get(url).header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }
        let response =
            request.send().await.map_err(|err| GithubError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(GithubError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        response.json().await.map_err(|err| GithubError::Decode(err.to_string()))
    }

    /// Issues a POST or PATCH with a JSON body, discarding the response.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError`] for transport failures and non-success
    /// statuses.
    pub async fn send_json<B: Serialize + Sync>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<(), GithubError> {
        let url = self.repo_url(path)?;
        let mut request = self
            .http
            .request(method, url)
            .header("Accept", "application/vnd.github+json")
            .json(body);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }
        let response =
            request.send().await.map_err(|err| GithubError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(GithubError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        Ok(())
    }
}
