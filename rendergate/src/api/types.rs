//! Wire types for the render service API.
//!
//! These are our own types, decoupled from any particular service's JSON
//! shape beyond the fields the orchestrator needs. Unknown fields in
//! responses are tolerated and ignored.

use crate::pricing::PriceBreakdown;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier the remote service assigns to a job at submission.
///
/// It does not exist before submission succeeds and is the join key for
/// every subsequent operation on the job.
#[derive(Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteJobId(String);

impl RemoteJobId {
    /// Creates a job ID from the service-assigned string value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string value of this job ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RemoteJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RemoteJobId({})", self.0)
    }
}

impl fmt::Display for RemoteJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RemoteJobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RemoteJobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Job state as reported by the remote service.
///
/// This is the service's view; the orchestrator folds it into its own
/// payment-gated state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteJobState {
    /// Accepted but not yet queued for a worker.
    Pending,
    /// Waiting for a worker slot.
    Queued,
    /// A worker is rendering.
    Running,
    /// Render finished; result available for retrieval.
    Completed,
    /// Render failed on the remote side.
    Failed,
    /// Cancelled on the remote side.
    Cancelled,
}

impl RemoteJobState {
    /// Returns true if the remote will never report a different state again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// A priced, time-bounded offer returned by the service prior to payment.
///
/// The quote must be paid to `pay_to` with `memo` attached before
/// `expires_at`; an expired quote is rejected before any payment attempt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobQuote {
    /// Amount to transfer, already rounded to settlement precision.
    pub amount: f64,

    /// Settlement currency symbol.
    pub currency: String,

    /// Address the payment must be sent to.
    pub pay_to: String,

    /// Memo that ties the transfer back to the job.
    pub memo: String,

    /// Instant after which the service no longer honours this quote.
    pub expires_at: DateTime<Utc>,

    /// Optional itemized breakdown, when the provider discloses one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<PriceBreakdown>,
}

impl JobQuote {
    /// Returns true if the quote is no longer honoured at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Successful submission: the assigned job ID plus the payment quote.
#[derive(Clone, Debug)]
pub struct SubmitResponse {
    pub job_id: RemoteJobId,
    pub quote: JobQuote,
}

/// Outcome of a payment confirmation attempt.
#[derive(Clone, Debug, Deserialize)]
pub struct ConfirmResponse {
    /// Whether the service accepted the payment proof.
    pub accepted: bool,

    /// Service-supplied reason when the proof was not accepted.
    #[serde(default)]
    pub reason: Option<String>,
}

/// One status poll observation.
#[derive(Clone, Debug, Deserialize)]
pub struct StatusResponse {
    /// Remote job state at poll time.
    pub state: RemoteJobState,

    /// Failure reason, populated when `state` is `Failed`.
    #[serde(default)]
    pub error: Option<String>,

    /// Reference to the rendered result, populated when `state` is `Completed`.
    #[serde(default)]
    pub result_ref: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_remote_job_id_display() {
        let id = RemoteJobId::new("rj-42");
        assert_eq!(format!("{}", id), "rj-42");
        assert_eq!(id.as_str(), "rj-42");
    }

    #[test]
    fn test_remote_state_terminal() {
        assert!(!RemoteJobState::Pending.is_terminal());
        assert!(!RemoteJobState::Queued.is_terminal());
        assert!(!RemoteJobState::Running.is_terminal());
        assert!(RemoteJobState::Completed.is_terminal());
        assert!(RemoteJobState::Failed.is_terminal());
        assert!(RemoteJobState::Cancelled.is_terminal());
    }

    #[test]
    fn test_quote_expiry_boundary() {
        let expires = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
        let quote = JobQuote {
            amount: 0.008375,
            currency: "NEAR".to_string(),
            pay_to: "farm.provider".to_string(),
            memo: "rj-42".to_string(),
            expires_at: expires,
            breakdown: None,
        };

        assert!(!quote.is_expired(expires - chrono::Duration::seconds(1)));
        assert!(quote.is_expired(expires));
        assert!(quote.is_expired(expires + chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_status_response_tolerates_extra_fields() {
        let json = r#"{
            "state": "running",
            "worker": "gpu-07",
            "progress_pct": 40
        }"#;

        let status: StatusResponse = serde_json::from_str(json).unwrap();
        assert_eq!(status.state, RemoteJobState::Running);
        assert!(status.error.is_none());
        assert!(status.result_ref.is_none());
    }

    #[test]
    fn test_quote_deserializes_with_breakdown() {
        let json = r#"{
            "amount": 0.008375,
            "currency": "NEAR",
            "pay_to": "farm.provider",
            "memo": "rj-42",
            "expires_at": "2026-08-01T12:00:00Z",
            "breakdown": {
                "base_price": 0.0079765625,
                "size_fee": 0.0009765625,
                "work_fee": 0.001,
                "time_fee": 0.006,
                "platform_fee": 0.000398828125,
                "total": 0.008375
            }
        }"#;

        let quote: JobQuote = serde_json::from_str(json).unwrap();
        let breakdown = quote.breakdown.unwrap();
        assert!((breakdown.total - quote.amount).abs() < f64::EPSILON);
    }
}
