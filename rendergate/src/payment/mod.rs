//! Injected payment and signing capabilities.
//!
//! The orchestrator never handles key material. Moving money is delegated
//! to a [`PaymentProvider`] and message signing to a [`MessageSigner`];
//! both arrive as injected capabilities. [`WalletRpcPayment`] is a thin
//! client for a local wallet daemon that holds the actual keys.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default HTTP timeout for wallet daemon calls.
///
/// On-chain transfers can take several seconds to land; this is generous
/// compared to the render service timeout.
pub const DEFAULT_WALLET_TIMEOUT: Duration = Duration::from_secs(120);

/// Instruction to transfer funds for one job.
#[derive(Clone, Debug, Serialize)]
pub struct PaymentRequest {
    /// Destination address from the quote.
    pub pay_to: String,

    /// Amount to transfer, at settlement precision.
    pub amount: f64,

    /// Settlement currency symbol.
    pub currency: String,

    /// Memo tying the transfer to the job.
    pub memo: String,
}

/// Proof that a transfer happened, presented back to the render service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentProof {
    /// Transaction identifier on the settlement layer.
    pub transaction_id: String,

    /// Amount that was actually transferred.
    pub amount: f64,
}

/// A detached signature over a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature(String);

impl Signature {
    /// Creates a signature from its encoded string form.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the encoded signature.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Errors from payment capabilities.
#[derive(Debug, Clone, Error)]
pub enum PaymentError {
    /// The wallet refused to make the transfer.
    #[error("payment refused: {0}")]
    Refused(String),

    /// The wallet could not be reached or the call failed mid-flight.
    ///
    /// Deliberately not retried by the orchestrator: the transfer may or
    /// may not have landed, and a blind retry risks double payment.
    #[error("wallet transport error: {0}")]
    Transport(String),

    /// Signing failed.
    #[error("signing error: {0}")]
    Signing(String),
}

/// Capability to transfer funds on the caller's behalf.
///
/// Implementations may be slow (on the order of seconds for on-chain
/// settlement) and must be treated as at-most-once by callers.
pub trait PaymentProvider: Send + Sync + 'static {
    /// Executes the transfer and returns proof of it.
    fn send_payment(
        &self,
        request: &PaymentRequest,
    ) -> impl Future<Output = Result<PaymentProof, PaymentError>> + Send;
}

/// Capability to sign a message with the caller's registered key.
///
/// Consumed by the service-facing auth surface (submission signing); the
/// orchestrator core itself never signs anything.
pub trait MessageSigner: Send + Sync {
    /// Signs `message` and returns the detached signature.
    fn sign_message(&self, message: &[u8]) -> Result<Signature, PaymentError>;
}

// ---------------------------------------------------------------------------
// Wallet daemon client
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct WalletPayResponse {
    transaction_id: String,
    amount: f64,
}

/// Payment provider backed by a local wallet daemon's HTTP RPC.
///
/// The daemon owns the keys; this client only relays transfer requests.
#[derive(Clone)]
pub struct WalletRpcPayment {
    http: reqwest::Client,
    rpc_url: String,
}

impl WalletRpcPayment {
    /// Creates a client for a wallet daemon at `rpc_url`.
    pub fn new(rpc_url: impl Into<String>) -> Result<Self, PaymentError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_WALLET_TIMEOUT)
            .build()
            .map_err(|e| PaymentError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            rpc_url: rpc_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl PaymentProvider for WalletRpcPayment {
    async fn send_payment(&self, request: &PaymentRequest) -> Result<PaymentProof, PaymentError> {
        let url = format!("{}/pay", self.rpc_url);

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Refused(format!("HTTP {status}: {message}")));
        }

        let body: WalletPayResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::Transport(format!("invalid wallet response: {e}")))?;

        debug!(
            transaction_id = %body.transaction_id,
            amount = body.amount,
            pay_to = %request.pay_to,
            "payment sent"
        );

        Ok(PaymentProof {
            transaction_id: body.transaction_id,
            amount: body.amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_round_trip() {
        let signature = Signature::new("ed25519:abcd");
        assert_eq!(signature.as_str(), "ed25519:abcd");
    }

    #[test]
    fn test_payment_request_serializes() {
        let request = PaymentRequest {
            pay_to: "farm.provider".to_string(),
            amount: 0.008375,
            currency: "NEAR".to_string(),
            memo: "rj-42".to_string(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("farm.provider"));
        assert!(json.contains("rj-42"));
    }

    #[test]
    fn test_wallet_rpc_url_trimmed() {
        let wallet = WalletRpcPayment::new("http://127.0.0.1:4100/").unwrap();
        assert_eq!(wallet.rpc_url, "http://127.0.0.1:4100");
    }

    #[test]
    fn test_payment_error_display() {
        let err = PaymentError::Refused("insufficient funds".to_string());
        assert!(err.to_string().contains("insufficient funds"));
    }
}
