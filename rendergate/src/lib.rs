//! RenderGate - Batch client for pay-per-use remote render services
//!
//! This library orchestrates billable render jobs against a remote render
//! marketplace: it prices jobs from a provider tariff, drives each job
//! through a payment-gated lifecycle (submit, pay, confirm, poll, fetch),
//! and schedules many such lifecycles concurrently under a caller-supplied
//! concurrency bound.
//!
//! # High-Level API
//!
//! For most use cases, the [`orchestrator`] module is the entry point:
//!
//! ```ignore
//! use rendergate::api::HttpRenderApi;
//! use rendergate::clock::SystemClock;
//! use rendergate::orchestrator::{BatchOptions, BatchScheduler, OrchestratorConfig};
//!
//! let api = HttpRenderApi::new("https://render.example.com")?;
//! let scheduler = BatchScheduler::new(api, payment, SystemClock::shared(), config);
//!
//! let result = scheduler
//!     .run_batch(inputs, BatchOptions::with_concurrency(4))
//!     .await?;
//! ```

pub mod api;
pub mod clock;
pub mod logging;
pub mod orchestrator;
pub mod payment;
pub mod pricing;

/// Version of the RenderGate library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
