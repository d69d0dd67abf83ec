//! Job lifecycle status.
//!
//! A job advances through a payment-gated state machine:
//!
//! ```text
//! Submitted → PaymentPending → Paid → Queued → Running → Completed
//!                                                      ↘ Failed
//!                                                      ↘ Cancelled
//! ```
//!
//! Terminal states are sticky: once `Completed`, `Failed` or `Cancelled`
//! is reached, no further transition is ever applied.

/// Status of one job as tracked by the orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobStatus {
    /// Accepted by the remote service; a job ID and quote exist.
    Submitted,

    /// Price known, payment not yet sent.
    PaymentPending,

    /// Payment sent and acknowledged by the service.
    Paid,

    /// Waiting for a worker slot on the remote side.
    Queued,

    /// A remote worker is rendering.
    Running,

    /// Render finished. The result may still have failed to download;
    /// see the job record's error field.
    Completed,

    /// The job failed: remote failure, payment rejection, exhausted
    /// status checks, or deadline.
    Failed,

    /// Cancelled before completion, by the caller or by a batch stop.
    Cancelled,
}

impl JobStatus {
    /// Returns true if this is a terminal state (job is settled).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Returns true if the job is still moving through its lifecycle.
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true once funds have left the wallet for this job.
    ///
    /// Cancellation is refused from any of these states.
    pub fn funds_committed(&self) -> bool {
        matches!(
            self,
            Self::Paid | Self::Queued | Self::Running | Self::Completed
        )
    }

    /// Returns true if `next` is a legal direct transition from `self`.
    ///
    /// Terminal states admit no transition. `Failed` and `Cancelled` are
    /// reachable from any non-terminal state; forward progress otherwise
    /// follows the lifecycle order, tolerating skipped observations (a
    /// fast job may go from `Paid` straight to `Running` between polls).
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if matches!(next, Self::Failed | Self::Cancelled) {
            return true;
        }
        matches!(
            (self, next),
            (Self::Submitted, Self::PaymentPending)
                | (Self::PaymentPending, Self::Paid)
                | (Self::Paid, Self::Queued)
                | (Self::Paid, Self::Running)
                | (Self::Paid, Self::Completed)
                | (Self::Queued, Self::Running)
                | (Self::Queued, Self::Completed)
                | (Self::Running, Self::Completed)
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Submitted => write!(f, "Submitted"),
            Self::PaymentPending => write!(f, "PaymentPending"),
            Self::Paid => write!(f, "Paid"),
            Self::Queued => write!(f, "Queued"),
            Self::Running => write!(f, "Running"),
            Self::Completed => write!(f, "Completed"),
            Self::Failed => write!(f, "Failed"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}
