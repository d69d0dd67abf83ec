//! Job inputs and records.
//!
//! An [`InputRef`] names one input artifact the caller wants rendered; it
//! is the caller-side key for a job before and after the remote service
//! assigns its own ID. A [`JobRecord`] accumulates everything the
//! orchestrator learns about one job. Records are owned and mutated by
//! exactly one lifecycle; they are never shared across jobs.

use super::status::JobStatus;
use crate::api::RemoteJobId;
use chrono::{DateTime, Utc};
use std::fmt;

/// Reference to one input artifact (a path, URL, or asset handle).
///
/// Batch order is defined by input order; `InputRef` is the key of the
/// per-job status table.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct InputRef(String);

impl InputRef {
    /// Creates an input reference.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the string value of this reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for InputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InputRef({})", self.0)
    }
}

impl fmt::Display for InputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for InputRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for InputRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Everything the orchestrator knows about one job.
///
/// `id` is `None` until submission succeeds; the remote service assigns
/// it and it is the join key for all later operations. Timestamps are
/// wall-clock; elapsed-time measurement uses the monotonic clock instead.
#[derive(Clone, Debug)]
pub struct JobRecord {
    /// The input this job renders.
    pub input: InputRef,

    /// Service-assigned job ID; absent if submission never succeeded.
    pub id: Option<RemoteJobId>,

    /// Current lifecycle status.
    pub status: JobStatus,

    /// Quoted price for the job, absent if no quote was obtained.
    pub price: Option<f64>,

    /// Transaction ID of the payment, once sent.
    pub payment_ref: Option<String>,

    /// When the orchestrator began working on this job.
    pub created_at: DateTime<Utc>,

    /// When the remote was first observed rendering.
    pub started_at: Option<DateTime<Utc>>,

    /// When the job reached a terminal state.
    pub completed_at: Option<DateTime<Utc>>,

    /// Reference to the rendered result, for completed jobs.
    pub result_ref: Option<String>,

    /// Failure reason, or a non-fatal problem on a completed job
    /// (e.g. the render finished but the result download failed).
    pub error: Option<String>,
}

impl JobRecord {
    /// Creates a fresh record for `input`, not yet submitted.
    pub fn new(input: InputRef, created_at: DateTime<Utc>) -> Self {
        Self {
            input,
            id: None,
            // Nothing exists remotely yet; the first real transition is
            // applied when submission succeeds.
            status: JobStatus::Submitted,
            price: None,
            payment_ref: None,
            created_at,
            started_at: None,
            completed_at: None,
            result_ref: None,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_ref_display() {
        let input = InputRef::new("scenes/intro.blend");
        assert_eq!(format!("{}", input), "scenes/intro.blend");
        assert_eq!(input.as_str(), "scenes/intro.blend");
    }

    #[test]
    fn test_input_ref_equality() {
        assert_eq!(InputRef::from("a"), InputRef::from("a"));
        assert_ne!(InputRef::from("a"), InputRef::from("b"));
    }

    #[test]
    fn test_new_record_is_unsubmitted() {
        let record = JobRecord::new(InputRef::from("a"), Utc::now());
        assert!(record.id.is_none());
        assert!(record.price.is_none());
        assert!(record.payment_ref.is_none());
        assert!(record.completed_at.is_none());
        assert!(record.error.is_none());
    }
}
