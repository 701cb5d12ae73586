// crates/review-gate-github/src/source.rs
// ============================================================================
// Module: GitHub Diff Source
// Description: Change-set assembly from the pull-request files API.
// Purpose: Deliver complete, honestly-flagged changes to the pipeline.
// Dependencies: crate::{client, patch}, review-gate-core, base64, serde
// ============================================================================

//! ## Overview
//! The source assembles a change set in three steps: pull-request metadata
//! for the head SHA, the paginated files listing for per-file patches, and
//! the contents API for post-change text at the head commit. Anything the
//! API cannot deliver completely is flagged instead of guessed: a text file
//! without a usable patch marks the whole change set truncated, and content
//! that does not decode as UTF-8 is carried as binary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use review_gate_core::ChangedFile;
use review_gate_core::DiffSource;
use review_gate_core::FetchError;
use review_gate_core::FileContent;
use review_gate_core::PrChanges;
use serde::Deserialize;

use crate::client::GithubClient;
use crate::client::GithubError;
use crate::patch::added_line_count;
use crate::patch::parse_added_ranges;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Files listed per page; the API maximum.
const FILES_PER_PAGE: usize = 100;

/// File-count cap beyond which the listing itself is cut off by the API.
const API_FILE_CAP: usize = 3_000;

// ============================================================================
// SECTION: Wire Shapes
// ============================================================================

/// Pull-request metadata, reduced to the fields used.
#[derive(Debug, Deserialize)]
struct PullMeta {
    /// Head commit of the pull request.
    head: PullHead,
}

/// Head reference of a pull request.
#[derive(Debug, Deserialize)]
struct PullHead {
    /// Head commit SHA.
    sha: String,
}

/// One entry from the pull-request files listing.
#[derive(Debug, Deserialize)]
struct FileEntry {
    /// Path of the changed file.
    filename: String,
    /// Change status, e.g. `added`, `modified`, `removed`.
    status: String,
    /// Added line count reported by the API.
    additions: u32,
    /// Unified-diff fragment; absent for binary and oversized diffs.
    #[serde(default)]
    patch: Option<String>,
}

/// Contents API response, reduced to the fields used.
#[derive(Debug, Deserialize)]
struct ContentEntry {
    /// Base64-encoded content.
    #[serde(default)]
    content: Option<String>,
    /// Content encoding label.
    #[serde(default)]
    encoding: Option<String>,
}

// ============================================================================
// SECTION: Diff Source
// ============================================================================

/// Diff source backed by the GitHub pull-request API.
pub struct GithubDiffSource {
    /// Shared API client.
    client: GithubClient,
}

impl GithubDiffSource {
    /// Creates a diff source over an API client.
    #[must_use]
    pub const fn new(client: GithubClient) -> Self {
        Self {
            client,
        }
    }

    /// Lists all changed files across listing pages.
    async fn list_files(&self, pr: &str) -> Result<Vec<FileEntry>, GithubError> {
        let mut entries = Vec::new();
        let mut page = 1_usize;
        loop {
            let batch: Vec<FileEntry> = self
                .client
                .get_json(&format!("pulls/{pr}/files?per_page={FILES_PER_PAGE}&page={page}"))
                .await?;
            let batch_len = batch.len();
            entries.extend(batch);
            if batch_len < FILES_PER_PAGE {
                return Ok(entries);
            }
            page += 1;
        }
    }

    /// Fetches post-change content for a path at the head commit.
    async fn fetch_content(&self, path: &str, sha: &str) -> Result<FileContent, GithubError> {
        let entry: ContentEntry =
            match self.client.get_json(&format!("contents/{path}?ref={sha}")).await {
                Ok(entry) => entry,
                Err(GithubError::Status {
                    status: 404,
                    ..
                }) => return Ok(FileContent::Missing),
                Err(err) => return Err(err),
            };
        let Some(encoded) = entry.content else {
            return Ok(FileContent::Missing);
        };
        if entry.encoding.as_deref() != Some("base64") {
            return Ok(FileContent::Missing);
        }
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let Ok(bytes) = BASE64.decode(compact) else {
            return Ok(FileContent::Binary);
        };
        match String::from_utf8(bytes) {
            Ok(body) => Ok(FileContent::Text {
                body,
            }),
            Err(_) => Ok(FileContent::Binary),
        }
    }
}

#[async_trait]
impl DiffSource for GithubDiffSource {
    async fn fetch(&self, pr: &str) -> Result<PrChanges, FetchError> {
        let meta: PullMeta = self
            .client
            .get_json(&format!("pulls/{pr}"))
            .await
            .map_err(|err| FetchError::Source(err.to_string()))?;
        let entries =
            self.list_files(pr).await.map_err(|err| FetchError::Source(err.to_string()))?;

        let mut truncated = entries.len() >= API_FILE_CAP;
        let mut files = Vec::with_capacity(entries.len());
        let mut total_lines = 0_u32;
        for entry in entries {
            if entry.status == "removed" {
                continue;
            }
            let content = self
                .fetch_content(&entry.filename, &meta.head.sha)
                .await
                .map_err(|err| FetchError::Source(err.to_string()))?;
            let added_ranges = match &entry.patch {
                Some(patch) => match parse_added_ranges(patch) {
                    Some(ranges) => ranges,
                    None => {
                        truncated = true;
                        Vec::new()
                    }
                },
                // No patch for a text file means the diff was cut off.
                None => {
                    if matches!(content, FileContent::Text { .. }) && entry.additions > 0 {
                        truncated = true;
                    }
                    Vec::new()
                }
            };
            total_lines = total_lines
                .saturating_add(added_line_count(&added_ranges).max(entry.additions));
            tracing::debug!(
                path = %entry.filename,
                ranges = added_ranges.len(),
                "assembled changed file"
            );
            files.push(ChangedFile {
                path: entry.filename,
                added_ranges,
                content,
            });
        }

        Ok(PrChanges {
            pr: pr.to_string(),
            head_sha: meta.head.sha,
            total_lines,
            total_files: files.len(),
            files,
            truncated,
        })
    }
}
