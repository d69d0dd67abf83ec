//! Batch scheduling.
//!
//! [`BatchScheduler`] runs many job lifecycles concurrently under a hard
//! concurrency ceiling. Inputs start in submission order from a FIFO
//! queue; a slot freed by a finishing job is refilled in the same
//! scheduling iteration. Failures are collected, never thrown across the
//! batch boundary: the caller always receives a [`BatchResult`] that
//! accounts for every input.

use super::config::OrchestratorConfig;
use super::error::{BatchError, JobError};
use super::job::{InputRef, JobRecord};
use super::lifecycle::{JobLifecycle, JobOutcome, LifecycleContext};
use super::progress::{aggregate, BatchProgress, NullProgressSink, ProgressSink, StatusTable};
use super::status::JobStatus;
use crate::api::RenderApi;
use crate::clock::Clock;
use crate::payment::PaymentProvider;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Default number of concurrently active lifecycles.
pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;

/// Per-invocation batch settings.
#[derive(Clone, Debug)]
pub struct BatchOptions {
    /// Hard ceiling on concurrently active lifecycles. Must be positive.
    pub concurrency: usize,

    /// Stop starting new jobs after the first failure. Jobs already in
    /// flight are allowed to finish; the remaining queue is reported as
    /// skipped.
    pub stop_on_error: bool,

    /// Batch-level stop signal. Cancelling it stops new starts and is
    /// observed by in-flight poll loops at their next poll boundary.
    pub cancellation: CancellationToken,
}

impl BatchOptions {
    /// Options with the given concurrency and defaults otherwise.
    pub fn with_concurrency(concurrency: usize) -> Self {
        Self {
            concurrency,
            ..Self::default()
        }
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_BATCH_CONCURRENCY,
            stop_on_error: false,
            cancellation: CancellationToken::new(),
        }
    }
}

/// Complete account of one batch run.
///
/// Every input lands in exactly one of `succeeded`, `failed`, or
/// `skipped`; nothing is silently dropped.
#[derive(Debug)]
pub struct BatchResult {
    /// Jobs that completed (possibly with a noted result-fetch problem).
    pub succeeded: Vec<JobOutcome>,

    /// Jobs that reached `Failed` or `Cancelled`, with their reasons.
    pub failed: Vec<JobOutcome>,

    /// Inputs never started because the batch halted first.
    pub skipped: Vec<InputRef>,

    /// Wall-clock start of the batch.
    pub started_at: DateTime<Utc>,

    /// Final aggregate snapshot.
    pub progress: BatchProgress,
}

impl BatchResult {
    /// Number of jobs actually attempted.
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Returns true if every input completed.
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }
}

/// Runs batches of job lifecycles against shared capabilities.
pub struct BatchScheduler<A, P> {
    api: Arc<A>,
    payment: Arc<P>,
    clock: Arc<dyn Clock>,
    config: Arc<OrchestratorConfig>,
    sink: Arc<dyn ProgressSink>,
}

impl<A, P> BatchScheduler<A, P>
where
    A: RenderApi,
    P: PaymentProvider,
{
    /// Creates a scheduler with a no-op progress sink.
    pub fn new(api: A, payment: P, clock: Arc<dyn Clock>, config: OrchestratorConfig) -> Self {
        Self {
            api: Arc::new(api),
            payment: Arc::new(payment),
            clock,
            config: Arc::new(config),
            sink: Arc::new(NullProgressSink),
        }
    }

    /// Replaces the progress sink.
    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Runs every input through its lifecycle, at most
    /// `options.concurrency` at a time.
    ///
    /// Validation failures (empty input sequence, zero concurrency) abort
    /// before any job starts. Per-job failures never abort the batch
    /// unless `stop_on_error` is set, and even then only pending work is
    /// affected.
    pub async fn run_batch(
        &self,
        inputs: Vec<InputRef>,
        options: BatchOptions,
    ) -> Result<BatchResult, BatchError> {
        if options.concurrency == 0 {
            return Err(BatchError::bad_concurrency(options.concurrency));
        }
        if inputs.is_empty() {
            return Err(BatchError::no_work());
        }

        let started_at = self.clock.now_utc();
        let table = Arc::new(StatusTable::new(self.clock.now()));
        let context = LifecycleContext::new(
            Arc::clone(&self.api),
            Arc::clone(&self.payment),
            Arc::clone(&self.clock),
            Arc::clone(&self.config),
            Arc::clone(&table),
            Arc::clone(&self.sink),
        );

        info!(
            total = inputs.len(),
            concurrency = options.concurrency,
            stop_on_error = options.stop_on_error,
            "batch started"
        );

        let mut pending: VecDeque<InputRef> = inputs.into_iter().collect();
        let mut in_flight: JoinSet<JobOutcome> = JoinSet::new();
        let mut started: HashMap<tokio::task::Id, InputRef> = HashMap::new();
        let mut succeeded: Vec<JobOutcome> = Vec::new();
        let mut failed: Vec<JobOutcome> = Vec::new();
        let mut skipped: Vec<InputRef> = Vec::new();
        let mut halted = false;

        loop {
            if options.cancellation.is_cancelled() {
                halted = true;
            }
            if halted && !pending.is_empty() {
                skipped.extend(pending.drain(..));
            }

            // Refill free slots up to the hard ceiling
            while !halted && in_flight.len() < options.concurrency {
                let Some(input) = pending.pop_front() else {
                    break;
                };
                let lifecycle = JobLifecycle::new(
                    input.clone(),
                    context.clone(),
                    options.cancellation.child_token(),
                );
                let handle = in_flight.spawn(lifecycle.run());
                started.insert(handle.id(), input);
            }

            // Wait for the next lifecycle to settle
            let Some(joined) = in_flight.join_next_with_id().await else {
                break;
            };

            let outcome = match joined {
                Ok((id, outcome)) => {
                    started.remove(&id);
                    outcome
                }
                Err(join_error) => {
                    let input = started
                        .remove(&join_error.id())
                        .unwrap_or_else(|| InputRef::from("<unknown>"));
                    error!(input = %input, error = %join_error, "lifecycle task aborted");
                    self.aborted_outcome(&table, input, join_error.to_string())
                }
            };

            if outcome.is_success() {
                succeeded.push(outcome);
            } else {
                if options.stop_on_error && !halted {
                    warn!(
                        input = %outcome.record.input,
                        "job failed with stop_on_error set, draining pending queue"
                    );
                    halted = true;
                }
                failed.push(outcome);
            }
        }

        let progress = aggregate(&table, self.clock.now());
        info!(
            completed = progress.completed,
            failed = progress.failed,
            skipped = skipped.len(),
            total_cost = progress.total_cost,
            "batch finished"
        );

        Ok(BatchResult {
            succeeded,
            failed,
            skipped,
            started_at,
            progress,
        })
    }

    /// Accounts for a lifecycle whose task died before producing an
    /// outcome, so the input still appears in the result and table.
    fn aborted_outcome(
        &self,
        table: &StatusTable,
        input: InputRef,
        message: String,
    ) -> JobOutcome {
        let error = JobError::Internal(message);
        let mut record = JobRecord::new(input.clone(), self.clock.now_utc());
        record.status = JobStatus::Failed;
        record.error = Some(error.to_string());
        record.completed_at = Some(self.clock.now_utc());
        table.set_status(&input, JobStatus::Failed);
        JobOutcome {
            record,
            result: None,
            error: Some(error),
        }
    }
}
