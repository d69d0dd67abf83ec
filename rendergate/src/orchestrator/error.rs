//! Orchestrator error taxonomy.
//!
//! Two layers: [`BatchError`] aborts a `run_batch` call before any job
//! starts (bad input, nothing retried); [`JobError`] is captured into the
//! failing job's outcome and never unwinds across the batch boundary.

use crate::api::ApiError;
use crate::payment::PaymentError;
use thiserror::Error;

/// Batch-level validation failures.
///
/// These are raised before any network call and before any job starts.
#[derive(Debug, Clone, Error)]
pub enum BatchError {
    /// The batch request itself was malformed.
    #[error("invalid batch: {0}")]
    Validation(String),
}

impl BatchError {
    /// An empty input sequence.
    pub fn no_work() -> Self {
        Self::Validation("no work provided".to_string())
    }

    /// A non-positive concurrency bound.
    pub fn bad_concurrency(concurrency: usize) -> Self {
        Self::Validation(format!(
            "concurrency must be a positive integer, got {concurrency}"
        ))
    }
}

/// Terminal failure of a single job's lifecycle.
#[derive(Debug, Error)]
pub enum JobError {
    /// Submission failed; no job exists remotely. Never retried here:
    /// resubmitting blindly risks double submission.
    #[error("submission failed: {0}")]
    Submit(ApiError),

    /// The quote expired before payment was attempted. No money moved.
    #[error("quote expired at {expired_at}")]
    QuoteExpired {
        expired_at: chrono::DateTime<chrono::Utc>,
    },

    /// The payment capability failed. Not retried: the transfer may or
    /// may not have landed.
    #[error("payment failed: {0}")]
    Payment(PaymentError),

    /// The service refused the payment proof. Money already left the
    /// wallet, so this is never retried automatically.
    #[error("payment rejected: {reason}")]
    PaymentRejected { reason: String },

    /// The confirmation call itself failed in transit. The proof is kept
    /// in the record so the caller can confirm out of band.
    #[error("payment confirmation failed: {0}")]
    ConfirmFailed(ApiError),

    /// The remote service reported the job failed.
    #[error("remote failure: {reason}")]
    RemoteFailure { reason: String },

    /// The remote service reported the job cancelled.
    #[error("cancelled by remote service")]
    RemoteCancelled,

    /// A status poll failed with a non-transient error.
    #[error("status check failed: {0}")]
    StatusCheck(ApiError),

    /// Transient poll errors persisted past the bounded retry limit.
    #[error("status check exhausted retries after {attempts} attempts: {last_error}")]
    StatusCheckExhausted { attempts: u32, last_error: ApiError },

    /// The wall-clock deadline elapsed, measured from submission.
    #[error("deadline exceeded after {timeout:?}")]
    DeadlineExceeded { timeout: std::time::Duration },

    /// Cancelled before any payment was made. No money moved.
    #[error("cancelled before payment")]
    CancelledBeforePayment,

    /// The batch was cancelled while this job awaited completion. The
    /// payment stands and the remote job may still finish unobserved.
    #[error("batch cancelled while awaiting completion")]
    CancelledWhilePolling,

    /// A cancellation request arrived after funds were committed.
    #[error("cannot cancel after payment")]
    CannotCancelAfterPayment,

    /// The lifecycle task itself died (panicked). Should not happen;
    /// recorded so the batch result still accounts for the input.
    #[error("lifecycle aborted: {0}")]
    Internal(String),
}

impl JobError {
    /// Returns true if this failure ends the job as `Cancelled` rather
    /// than `Failed`.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            Self::CancelledBeforePayment | Self::CancelledWhilePolling | Self::RemoteCancelled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_error_messages() {
        assert!(BatchError::no_work().to_string().contains("no work provided"));
        assert!(BatchError::bad_concurrency(0)
            .to_string()
            .contains("positive integer"));
    }

    #[test]
    fn test_payment_rejected_message() {
        let err = JobError::PaymentRejected {
            reason: "amount mismatch".to_string(),
        };
        assert!(err.to_string().contains("payment rejected"));
        assert!(err.to_string().contains("amount mismatch"));
    }

    #[test]
    fn test_exhausted_retries_message() {
        let err = JobError::StatusCheckExhausted {
            attempts: 3,
            last_error: ApiError::Transport("timed out".to_string()),
        };
        assert!(err.to_string().contains("exhausted retries"));
        assert!(err.to_string().contains("3 attempts"));
    }

    #[test]
    fn test_cancellation_classification() {
        assert!(JobError::CancelledBeforePayment.is_cancellation());
        assert!(JobError::CancelledWhilePolling.is_cancellation());
        assert!(JobError::RemoteCancelled.is_cancellation());
        assert!(!JobError::DeadlineExceeded {
            timeout: std::time::Duration::from_secs(60)
        }
        .is_cancellation());
        assert!(!JobError::PaymentRejected {
            reason: "x".to_string()
        }
        .is_cancellation());
    }
}
