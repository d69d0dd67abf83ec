//! Render service API errors.

use thiserror::Error;

/// Errors from the remote render service API.
///
/// The transient/permanent split drives retry decisions: only transient
/// errors may be retried, and only at the status-poll step.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Connection-level failure (timeout, reset, DNS). Transient.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success HTTP status.
    #[error("remote service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("invalid response body: {0}")]
    InvalidResponse(String),

    /// Submission succeeded but no payment quote came back with it.
    #[error("remote service did not return a payment quote")]
    PaymentRequiredNotReturned,
}

impl ApiError {
    /// Returns true if a later identical request could plausibly succeed.
    ///
    /// Server-side errors (5xx) and rate limiting (429) count as transient;
    /// client-side rejections and malformed bodies do not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::InvalidResponse(_) => false,
            Self::PaymentRequiredNotReturned => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_is_transient() {
        assert!(ApiError::Transport("connection reset".to_string()).is_transient());
    }

    #[test]
    fn test_server_errors_are_transient() {
        let err = ApiError::Status {
            status: 503,
            message: "overloaded".to_string(),
        };
        assert!(err.is_transient());

        let rate_limited = ApiError::Status {
            status: 429,
            message: "slow down".to_string(),
        };
        assert!(rate_limited.is_transient());
    }

    #[test]
    fn test_client_errors_are_permanent() {
        let err = ApiError::Status {
            status: 404,
            message: "no such job".to_string(),
        };
        assert!(!err.is_transient());
        assert!(!ApiError::PaymentRequiredNotReturned.is_transient());
        assert!(!ApiError::InvalidResponse("truncated".to_string()).is_transient());
    }

    #[test]
    fn test_display_includes_status() {
        let err = ApiError::Status {
            status: 402,
            message: "payment required".to_string(),
        };
        assert!(err.to_string().contains("402"));
    }
}
