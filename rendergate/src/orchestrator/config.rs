//! Orchestrator configuration.
//!
//! This module contains the [`OrchestratorConfig`] struct and related
//! constants for configuring job lifecycles.

use std::time::Duration;

// =============================================================================
// Configuration Constants
// =============================================================================

/// Default interval between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default number of retries for a transient status-poll failure.
pub const DEFAULT_POLL_RETRY_LIMIT: u32 = 3;

/// Default delay before the first poll retry.
pub const DEFAULT_POLL_RETRY_INITIAL_DELAY: Duration = Duration::from_millis(500);

/// Default multiplier applied to the retry delay after each attempt.
pub const DEFAULT_POLL_RETRY_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Default wall-clock deadline for one job, measured from submission.
pub const DEFAULT_JOB_DEADLINE: Duration = Duration::from_secs(30 * 60);

// =============================================================================
// Orchestrator Configuration
// =============================================================================

/// Configuration shared by every lifecycle in a batch.
///
/// Retry settings apply to the status-poll step only; submission and
/// payment are never silently retried.
#[derive(Clone, Debug)]
pub struct OrchestratorConfig {
    /// Wallet address jobs are submitted under.
    pub wallet_address: String,

    /// Interval between status polls.
    pub poll_interval: Duration,

    /// How many times a transient poll failure is retried before the job
    /// is failed with "status check exhausted retries".
    pub poll_retry_limit: u32,

    /// Delay before the first poll retry.
    pub poll_retry_initial_delay: Duration,

    /// Backoff multiplier between poll retries.
    pub poll_retry_backoff_multiplier: f64,

    /// Wall-clock deadline for one job, measured from its submission.
    pub job_deadline: Duration,
}

impl OrchestratorConfig {
    /// Creates a configuration for `wallet_address` with default timing.
    pub fn new(wallet_address: impl Into<String>) -> Self {
        Self {
            wallet_address: wallet_address.into(),
            ..Self::default()
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            wallet_address: String::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_retry_limit: DEFAULT_POLL_RETRY_LIMIT,
            poll_retry_initial_delay: DEFAULT_POLL_RETRY_INITIAL_DELAY,
            poll_retry_backoff_multiplier: DEFAULT_POLL_RETRY_BACKOFF_MULTIPLIER,
            job_deadline: DEFAULT_JOB_DEADLINE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = OrchestratorConfig::new("client.wallet");
        assert_eq!(config.wallet_address, "client.wallet");
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(config.poll_retry_limit, DEFAULT_POLL_RETRY_LIMIT);
        assert_eq!(config.job_deadline, DEFAULT_JOB_DEADLINE);
    }

    #[test]
    fn test_config_clone() {
        let config = OrchestratorConfig::new("client.wallet");
        let cloned = config.clone();
        assert_eq!(cloned.wallet_address, config.wallet_address);
        assert_eq!(cloned.poll_interval, config.poll_interval);
    }
}
