//! Remote render service API.
//!
//! The orchestrator consumes the remote service purely through the
//! [`RenderApi`] trait: submission (which returns a priced quote), payment
//! confirmation, status polling, and result retrieval. [`HttpRenderApi`] is
//! the JSON-over-HTTP implementation; tests substitute mocks.

mod client;
mod error;
mod types;

pub use client::{HttpRenderApi, RenderApi, DEFAULT_HTTP_TIMEOUT};
pub use error::ApiError;
pub use types::{
    ConfirmResponse, JobQuote, RemoteJobId, RemoteJobState, StatusResponse, SubmitResponse,
};
