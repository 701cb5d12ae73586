// crates/review-gate-llm/src/retry.rs
// ============================================================================
// Module: Retry Policy
// Description: Composable retry with exponential backoff and jitter.
// Purpose: Apply one uniform transient-failure policy to semantic calls.
// Dependencies: review-gate-core, rand, tokio
// ============================================================================

//! ## Overview
//! A retry policy wraps any fallible async operation whose error carries a
//! transient/fatal split. Transient failures back off exponentially with
//! random jitter up to a delay cap; fatal failures and exhausted attempts
//! surface immediately.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::time::Duration;

use rand::Rng as _;
use review_gate_core::AnalyzerError;

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Retry policy for transient failures.
///
/// # Invariants
/// - `max_attempts` is at least 1; the first attempt always runs.
/// - Delays never exceed `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Computes the jittered backoff delay before the given retry.
    ///
    /// `attempt` is the 1-based attempt that just failed.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let scaled = self.base_delay.saturating_mul(2_u32.saturating_pow(exponent));
        let capped = scaled.min(self.max_delay);
        let capped_ms = u64::try_from(capped.as_millis()).unwrap_or(u64::MAX).max(1);
        // Jitter spreads retries inside the cap instead of stacking on top.
        let jitter_ms = rand::thread_rng().gen_range(0..=capped_ms / 2);
        Duration::from_millis(capped_ms - jitter_ms)
    }
}

// ============================================================================
// SECTION: Execution
// ============================================================================

/// Runs an operation under a retry policy.
///
/// Transient failures are retried until the policy's attempts are exhausted;
/// fatal failures return immediately.
///
/// # Errors
///
/// Returns the final [`AnalyzerError`] once the policy gives up.
pub async fn run_with_retry<T, F, Fut>(
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, AnalyzerError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AnalyzerError>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1_u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < attempts => {
                let delay = policy.delay_for(attempt);
                let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!(attempt, delay_ms, error = %err, "semantic call failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
