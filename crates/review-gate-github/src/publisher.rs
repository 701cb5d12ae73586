// crates/review-gate-github/src/publisher.rs
// ============================================================================
// Module: GitHub Report Publisher
// Description: Idempotent marker-comment upsert on the pull request.
// Purpose: Publish exactly one gate comment per pull request, updated in
// place and skipped when nothing changed.
// Dependencies: crate::client, review-gate-core, serde, serde_json, sha2
// ============================================================================

//! ## Overview
//! The publisher owns one comment on the pull-request conversation. A hidden
//! marker line identifies the comment across runs; a second hidden line
//! carries the commit SHA and a SHA-256 digest of the report body. Re-runs
//! update the existing comment, and when the key and digest both match, the
//! write is skipped entirely.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use async_trait::async_trait;
use reqwest::Method;
use review_gate_core::PublishError;
use review_gate_core::ReportPublisher;
use review_gate_core::ReviewStatus;
use serde::Deserialize;
use serde_json::json;
use sha2::Digest as _;
use sha2::Sha256;

use crate::client::GithubClient;

// ============================================================================
// SECTION: Markers
// ============================================================================

/// Marker line identifying the gate's comment.
const COMMENT_MARKER: &str = "<!-- review-gate -->";

/// Prefix of the hidden line carrying the key and digest.
const STAMP_PREFIX: &str = "<!-- review-gate-stamp:";

/// Comments listed per page; the API maximum.
const COMMENTS_PER_PAGE: usize = 100;

// ============================================================================
// SECTION: Wire Shapes
// ============================================================================

/// One issue comment, reduced to the fields used.
#[derive(Debug, Deserialize)]
struct IssueComment {
    /// Comment identifier.
    id: u64,
    /// Comment body.
    body: String,
}

// ============================================================================
// SECTION: Digest
// ============================================================================

/// Computes the SHA-256 hex digest of a report body.
#[must_use]
pub fn report_digest(report: &str) -> String {
    let digest = Sha256::digest(report.as_bytes());
    digest.iter().fold(String::with_capacity(64), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}

// ============================================================================
// SECTION: Publisher
// ============================================================================

/// Report publisher backed by GitHub issue comments.
///
/// # Invariants
/// - At most one gate comment exists per pull request.
pub struct GithubPublisher {
    /// Shared API client.
    client: GithubClient,
    /// Pull-request number the comment belongs to.
    pr: String,
}

impl GithubPublisher {
    /// Creates a publisher for one pull request.
    #[must_use]
    pub const fn new(client: GithubClient, pr: String) -> Self {
        Self {
            client,
            pr,
        }
    }

    /// Builds the published comment body with hidden marker and stamp.
    fn comment_body(report: &str, idempotency_key: &str) -> String {
        let digest = report_digest(report);
        format!("{COMMENT_MARKER}\n{STAMP_PREFIX}{idempotency_key}:{digest} -->\n\n{report}")
    }

    /// Finds the gate's existing comment, walking all listing pages.
    async fn find_existing(&self) -> Result<Option<IssueComment>, PublishError> {
        let mut page = 1_usize;
        loop {
            let comments: Vec<IssueComment> = self
                .client
                .get_json(&format!(
                    "issues/{}/comments?per_page={COMMENTS_PER_PAGE}&page={page}",
                    self.pr
                ))
                .await
                .map_err(|err| PublishError::Publish(err.to_string()))?;
            let batch_len = comments.len();
            if let Some(comment) =
                comments.into_iter().find(|comment| comment.body.starts_with(COMMENT_MARKER))
            {
                return Ok(Some(comment));
            }
            if batch_len < COMMENTS_PER_PAGE {
                return Ok(None);
            }
            page += 1;
        }
    }
}

#[async_trait]
impl ReportPublisher for GithubPublisher {
    async fn publish(
        &self,
        report: &str,
        status: ReviewStatus,
        idempotency_key: &str,
    ) -> Result<(), PublishError> {
        let body = Self::comment_body(report, idempotency_key);
        let existing = self.find_existing().await?;

        match existing {
            Some(comment) => {
                let stamp = format!("{STAMP_PREFIX}{idempotency_key}:{}", report_digest(report));
                if comment.body.contains(&stamp) {
                    tracing::debug!(pr = %self.pr, "report unchanged, skipping publish");
                    return Ok(());
                }
                self.client
                    .send_json(
                        Method::PATCH,
                        &format!("issues/comments/{}", comment.id),
                        &json!({ "body": body }),
                    )
                    .await
                    .map_err(|err| PublishError::Publish(err.to_string()))?;
            }
            None => {
                self.client
                    .send_json(
                        Method::POST,
                        &format!("issues/{}/comments", self.pr),
                        &json!({ "body": body }),
                    )
                    .await
                    .map_err(|err| PublishError::Publish(err.to_string()))?;
            }
        }
        tracing::info!(pr = %self.pr, status = status.as_str(), "review report published");
        Ok(())
    }
}
