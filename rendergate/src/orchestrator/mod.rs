//! Batch Job Orchestrator
//!
//! This module drives billable render jobs against a remote pay-per-use
//! service: one payment-gated lifecycle per job, many lifecycles scheduled
//! concurrently under a caller-supplied bound.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      BatchScheduler                          │
//! │  FIFO queue, bounded in-flight set, result collection       │
//! ├─────────────────────────────────────────────────────────────┤
//! │                      JobLifecycle (× N)                      │
//! │  submit → pay → confirm → poll loop → fetch                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │ StatusTable │  │ Progress    │  │ Injected            │  │
//! │  │ (per-job)   │  │ Sink        │  │ RenderApi/Payment   │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Core Concepts
//!
//! - **Lifecycle**: the strictly sequential steps one job moves through.
//!   Payment is the gate: nothing is queued remotely until the service
//!   acknowledges the transfer, and from `Paid` onward cancellation is
//!   refused.
//!
//! - **Batch**: a set of inputs run under one concurrency bound. The
//!   bound is a hard ceiling, re-checked after every completion so a
//!   freed slot refills within one scheduling iteration.
//!
//! - **Progress**: each lifecycle writes its own entry in the shared
//!   status table and synchronously emits per-job and aggregate events
//!   through the [`ProgressSink`].
//!
//! - **Failure isolation**: one job's failure never aborts another.
//!   `run_batch` returns a [`BatchResult`] partitioning every input into
//!   succeeded, failed (with reasons), or skipped.
//!
//! # Example
//!
//! ```ignore
//! use rendergate::orchestrator::{BatchOptions, BatchScheduler, InputRef, OrchestratorConfig};
//!
//! let scheduler = BatchScheduler::new(api, payment, clock, config)
//!     .with_progress_sink(Arc::new(TracingProgressSink));
//!
//! let inputs: Vec<InputRef> = files.iter().map(InputRef::from).collect();
//! let result = scheduler
//!     .run_batch(inputs, BatchOptions::with_concurrency(4))
//!     .await?;
//!
//! println!("{} completed, {} failed", result.succeeded.len(), result.failed.len());
//! ```

mod config;
mod error;
mod job;
mod lifecycle;
mod progress;
mod scheduler;
mod status;

// Configuration
pub use config::{
    OrchestratorConfig, DEFAULT_JOB_DEADLINE, DEFAULT_POLL_INTERVAL,
    DEFAULT_POLL_RETRY_BACKOFF_MULTIPLIER, DEFAULT_POLL_RETRY_INITIAL_DELAY,
    DEFAULT_POLL_RETRY_LIMIT,
};

// Errors
pub use error::{BatchError, JobError};

// Jobs and status
pub use job::{InputRef, JobRecord};
pub use status::JobStatus;

// Lifecycle
pub use lifecycle::{CancelHandle, JobLifecycle, JobOutcome, LifecycleContext};

// Progress
pub use progress::{
    aggregate, BatchProgress, JobSnapshot, NullProgressSink, ProgressSink, StatusTable,
    TracingProgressSink,
};

// Scheduler
pub use scheduler::{BatchOptions, BatchResult, BatchScheduler, DEFAULT_BATCH_CONCURRENCY};
