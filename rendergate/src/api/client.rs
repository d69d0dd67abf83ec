//! Render API trait and HTTP implementation.
//!
//! The [`RenderApi`] trait abstracts over the remote render service so the
//! orchestrator can be driven against mocks in tests. [`HttpRenderApi`]
//! talks JSON over HTTP via a pooled `reqwest` client.

use super::error::ApiError;
use super::types::{
    ConfirmResponse, JobQuote, RemoteJobId, StatusResponse, SubmitResponse,
};
use crate::payment::{MessageSigner, PaymentProof};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default HTTP timeout for render service requests.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the submission signature, when a signer is configured.
const SIGNATURE_HEADER: &str = "X-Render-Signature";

/// Remote render service operations the orchestrator depends on.
///
/// Implementations perform one network round trip per call and never retry
/// internally; retry policy belongs to the orchestrator.
pub trait RenderApi: Send + Sync + 'static {
    /// Submits a job for the given input and returns the assigned job ID
    /// together with a payment quote.
    ///
    /// Fails with [`ApiError::PaymentRequiredNotReturned`] if the service
    /// accepts the submission without quoting a price.
    fn submit_job(
        &self,
        input_ref: &str,
        wallet_address: &str,
    ) -> impl Future<Output = Result<SubmitResponse, ApiError>> + Send;

    /// Presents a payment proof for a submitted job.
    fn confirm_payment(
        &self,
        job_id: &RemoteJobId,
        proof: &PaymentProof,
    ) -> impl Future<Output = Result<ConfirmResponse, ApiError>> + Send;

    /// Polls the current status of a job. Repeatable.
    fn poll_status(
        &self,
        job_id: &RemoteJobId,
    ) -> impl Future<Output = Result<StatusResponse, ApiError>> + Send;

    /// Retrieves the rendered result of a completed job.
    fn fetch_result(
        &self,
        job_id: &RemoteJobId,
    ) -> impl Future<Output = Result<Vec<u8>, ApiError>> + Send;
}

// ---------------------------------------------------------------------------
// Wire bodies
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SubmitRequestBody<'a> {
    input_ref: &'a str,
    wallet_address: &'a str,
}

#[derive(Deserialize)]
struct SubmitResponseBody {
    job_id: String,
    #[serde(default)]
    quote: Option<JobQuote>,
}

#[derive(Serialize)]
struct ConfirmRequestBody<'a> {
    transaction_id: &'a str,
    amount: f64,
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// JSON-over-HTTP implementation of [`RenderApi`].
///
/// Uses a reusable `reqwest::Client` with connection pooling and timeouts.
/// When a [`MessageSigner`] is attached, submissions carry a signature
/// header so the service can associate the job with a registered wallet.
#[derive(Clone)]
pub struct HttpRenderApi {
    http: reqwest::Client,
    base_url: String,
    signer: Option<Arc<dyn MessageSigner>>,
}

impl HttpRenderApi {
    /// Creates a client for a render service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            signer: None,
        })
    }

    /// Attaches a signer used to authenticate submissions.
    pub fn with_signer(mut self, signer: Arc<dyn MessageSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Base URL of the remote service.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn transport_error(e: reqwest::Error) -> ApiError {
        ApiError::Transport(e.to_string())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), message = %message, "render service error response");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

impl RenderApi for HttpRenderApi {
    async fn submit_job(
        &self,
        input_ref: &str,
        wallet_address: &str,
    ) -> Result<SubmitResponse, ApiError> {
        let url = format!("{}/v1/jobs", self.base_url);
        let body = SubmitRequestBody {
            input_ref,
            wallet_address,
        };

        let mut request = self.http.post(&url).json(&body);
        if let Some(signer) = &self.signer {
            let message = format!("{input_ref}:{wallet_address}");
            let signature = signer
                .sign_message(message.as_bytes())
                .map_err(|e| ApiError::Transport(format!("failed to sign submission: {e}")))?;
            request = request.header(SIGNATURE_HEADER, signature.as_str().to_string());
        }

        let response = request.send().await.map_err(Self::transport_error)?;
        let response = Self::check_status(response).await?;

        let body: SubmitResponseBody = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        debug!(
            job_id = %body.job_id,
            has_quote = body.quote.is_some(),
            "job submitted"
        );

        let quote = body.quote.ok_or(ApiError::PaymentRequiredNotReturned)?;
        Ok(SubmitResponse {
            job_id: RemoteJobId::new(body.job_id),
            quote,
        })
    }

    async fn confirm_payment(
        &self,
        job_id: &RemoteJobId,
        proof: &PaymentProof,
    ) -> Result<ConfirmResponse, ApiError> {
        let url = format!("{}/v1/jobs/{}/payment", self.base_url, job_id);
        let body = ConfirmRequestBody {
            transaction_id: &proof.transaction_id,
            amount: proof.amount,
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;
        let response = Self::check_status(response).await?;

        let confirm: ConfirmResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        debug!(job_id = %job_id, accepted = confirm.accepted, "payment confirmation");
        Ok(confirm)
    }

    async fn poll_status(&self, job_id: &RemoteJobId) -> Result<StatusResponse, ApiError> {
        let url = format!("{}/v1/jobs/{}", self.base_url, job_id);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(Self::transport_error)?;
        let response = Self::check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    async fn fetch_result(&self, job_id: &RemoteJobId) -> Result<Vec<u8>, ApiError> {
        let url = format!("{}/v1/jobs/{}/result", self.base_url, job_id);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(Self::transport_error)?;
        let response = Self::check_status(response).await?;

        let bytes = response.bytes().await.map_err(Self::transport_error)?;
        debug!(job_id = %job_id, bytes = bytes.len(), "result fetched");
        Ok(bytes.to_vec())
    }
}
