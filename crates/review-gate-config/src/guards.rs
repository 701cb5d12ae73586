// crates/review-gate-config/src/guards.rs
// ============================================================================
// Module: File Input Guards
// Description: Bounded, validated reads for configuration files.
// Purpose: Reject oversized paths and contents before any parsing happens.
// Dependencies: std, thiserror
// ============================================================================

//! ## Overview
//! Every file the gate reads at configuration time passes through these
//! guards: path and component length checks, a hard size cap enforced both
//! before and after the read, and UTF-8 validation. Guards run before any
//! parser sees the bytes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read as _;
use std::path::Path;

use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum accepted path length in bytes.
pub const MAX_PATH_BYTES: usize = 4_096;

/// Maximum accepted path component length in bytes.
pub const MAX_COMPONENT_BYTES: usize = 255;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by guarded file reads.
///
/// # Invariants
/// - Variants name the violated limit for fail-fast diagnostics.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Path exceeds the maximum length.
    #[error("path exceeds {MAX_PATH_BYTES} bytes")]
    PathTooLong,
    /// A path component exceeds the maximum length.
    #[error("path component exceeds {MAX_COMPONENT_BYTES} bytes")]
    ComponentTooLong,
    /// The underlying read failed.
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    /// File size exceeds the caller's limit.
    #[error("file is {size} bytes, limit is {limit}")]
    TooLarge {
        /// Observed file size in bytes.
        size: u64,
        /// Caller-supplied limit in bytes.
        limit: usize,
    },
    /// File content is not valid UTF-8.
    #[error("file is not valid UTF-8")]
    InvalidUtf8,
}

// ============================================================================
// SECTION: Guarded Reads
// ============================================================================

/// Validates path shape against the length limits.
fn check_path(path: &Path) -> Result<(), GuardError> {
    if path.as_os_str().len() > MAX_PATH_BYTES {
        return Err(GuardError::PathTooLong);
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_COMPONENT_BYTES {
            return Err(GuardError::ComponentTooLong);
        }
    }
    Ok(())
}

/// Reads a file as UTF-8 text under a hard size limit.
///
/// The limit is enforced against the file metadata before reading and
/// against the bytes actually read, so growth mid-read cannot bypass it.
///
/// # Errors
///
/// Returns [`GuardError`] when the path shape, size, or encoding violates a
/// guard, or when the read itself fails.
pub fn read_limited_utf8(path: &Path, max_bytes: usize) -> Result<String, GuardError> {
    check_path(path)?;
    let file = File::open(path)?;
    let metadata = file.metadata()?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| GuardError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(GuardError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(GuardError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    String::from_utf8(bytes).map_err(|_| GuardError::InvalidUtf8)
}
