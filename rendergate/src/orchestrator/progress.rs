//! Batch progress tracking.
//!
//! The scheduler owns a [`StatusTable`] with one entry per attempted
//! input. Each lifecycle writes only its own entry, so entries need no
//! locking of their own; the map itself synchronizes insertion and
//! iteration against concurrent readers.
//!
//! Progress reaches the caller through the [`ProgressSink`] trait,
//! following the "emit, don't present" pattern: lifecycles emit per-job
//! transitions and fresh batch aggregates synchronously on every status
//! mutation, and the consumer decides how to present them.

use super::job::InputRef;
use super::status::JobStatus;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Snapshot of one job in the status table.
#[derive(Clone, Copy, Debug)]
pub struct JobSnapshot {
    /// Current lifecycle status.
    pub status: JobStatus,

    /// Price actually paid, set once the job reaches `Paid`.
    pub paid_cost: Option<f64>,
}

/// Scheduler-owned table of per-job snapshots.
///
/// Keys are inserted when a job's first status lands and never removed
/// for the lifetime of the batch.
pub struct StatusTable {
    jobs: DashMap<InputRef, JobSnapshot>,
    started_at: Instant,
}

impl StatusTable {
    /// Creates an empty table for a batch starting at `started_at`.
    pub fn new(started_at: Instant) -> Self {
        Self {
            jobs: DashMap::new(),
            started_at,
        }
    }

    /// When the batch started, for elapsed-time aggregation.
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Records a status for `input`, preserving any recorded cost.
    pub fn set_status(&self, input: &InputRef, status: JobStatus) {
        self.jobs
            .entry(input.clone())
            .and_modify(|snapshot| snapshot.status = status)
            .or_insert(JobSnapshot {
                status,
                paid_cost: None,
            });
    }

    /// Records the amount paid for `input`.
    pub fn set_paid_cost(&self, input: &InputRef, cost: f64) {
        if let Some(mut snapshot) = self.jobs.get_mut(input) {
            snapshot.paid_cost = Some(cost);
        }
    }

    /// Returns the current status of `input`, if it has one yet.
    pub fn status_of(&self, input: &InputRef) -> Option<JobStatus> {
        self.jobs.get(input).map(|snapshot| snapshot.status)
    }

    /// Number of jobs currently in a non-terminal state.
    pub fn active_count(&self) -> usize {
        self.jobs
            .iter()
            .filter(|entry| entry.value().status.is_active())
            .count()
    }
}

/// Aggregate totals over a batch at one point in time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BatchProgress {
    /// Jobs that have entered the table (attempted so far).
    pub total: usize,

    /// Jobs that reached `Completed`.
    pub completed: usize,

    /// Jobs that reached `Failed` or `Cancelled`.
    pub failed: usize,

    /// `total - completed - failed`.
    pub in_progress: usize,

    /// Sum of amounts actually paid. Jobs that failed before payment
    /// contribute zero.
    pub total_cost: f64,

    /// Time since the batch started.
    pub elapsed: Duration,
}

/// Reduces the current table to aggregate totals.
///
/// Pure over the snapshot: reads the table, mutates nothing. Called
/// synchronously after each status mutation so consumers never observe a
/// stale aggregate.
pub fn aggregate(table: &StatusTable, now: Instant) -> BatchProgress {
    let mut total = 0usize;
    let mut completed = 0usize;
    let mut failed = 0usize;
    let mut total_cost = 0.0f64;

    for entry in table.jobs.iter() {
        let snapshot = entry.value();
        total += 1;
        match snapshot.status {
            JobStatus::Completed => completed += 1,
            JobStatus::Failed | JobStatus::Cancelled => failed += 1,
            _ => {}
        }
        if let Some(cost) = snapshot.paid_cost {
            total_cost += cost;
        }
    }

    BatchProgress {
        total,
        completed,
        failed,
        in_progress: total - completed - failed,
        total_cost,
        elapsed: now.saturating_duration_since(table.started_at),
    }
}

// =============================================================================
// Progress Sinks
// =============================================================================

/// Observer for batch progress.
///
/// Implementations must be cheap and non-blocking: they are invoked
/// synchronously from inside lifecycles on every status transition.
pub trait ProgressSink: Send + Sync {
    /// One job changed status.
    fn on_job_progress(&self, input: &InputRef, status: JobStatus);

    /// Fresh aggregate after a status change.
    fn on_batch_progress(&self, progress: &BatchProgress);
}

/// Sink that discards all events. The default.
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn on_job_progress(&self, _input: &InputRef, _status: JobStatus) {}
    fn on_batch_progress(&self, _progress: &BatchProgress) {}
}

/// Sink that logs events through `tracing`.
pub struct TracingProgressSink;

impl ProgressSink for TracingProgressSink {
    fn on_job_progress(&self, input: &InputRef, status: JobStatus) {
        info!(input = %input, status = %status, "job progress");
    }

    fn on_batch_progress(&self, progress: &BatchProgress) {
        debug!(
            total = progress.total,
            completed = progress.completed,
            failed = progress.failed,
            in_progress = progress.in_progress,
            total_cost = progress.total_cost,
            "batch progress"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str) -> InputRef {
        InputRef::from(name)
    }

    #[test]
    fn test_empty_table_aggregates_to_zero() {
        let table = StatusTable::new(Instant::now());
        let progress = aggregate(&table, Instant::now());

        assert_eq!(progress.total, 0);
        assert_eq!(progress.completed, 0);
        assert_eq!(progress.failed, 0);
        assert_eq!(progress.in_progress, 0);
        assert_eq!(progress.total_cost, 0.0);
    }

    #[test]
    fn test_aggregate_counts_buckets() {
        let table = StatusTable::new(Instant::now());
        table.set_status(&input("a"), JobStatus::Completed);
        table.set_status(&input("b"), JobStatus::Failed);
        table.set_status(&input("c"), JobStatus::Cancelled);
        table.set_status(&input("d"), JobStatus::Running);
        table.set_status(&input("e"), JobStatus::PaymentPending);

        let progress = aggregate(&table, Instant::now());

        assert_eq!(progress.total, 5);
        assert_eq!(progress.completed, 1);
        assert_eq!(progress.failed, 2);
        assert_eq!(progress.in_progress, 2);
    }

    #[test]
    fn test_total_cost_sums_only_paid_jobs() {
        let table = StatusTable::new(Instant::now());

        // Paid and completed
        table.set_status(&input("a"), JobStatus::Paid);
        table.set_paid_cost(&input("a"), 0.0085);
        table.set_status(&input("a"), JobStatus::Completed);

        // Failed before payment: contributes zero
        table.set_status(&input("b"), JobStatus::Failed);

        // Paid and still running
        table.set_status(&input("c"), JobStatus::Paid);
        table.set_paid_cost(&input("c"), 0.0100);
        table.set_status(&input("c"), JobStatus::Running);

        let progress = aggregate(&table, Instant::now());
        assert!((progress.total_cost - 0.0185).abs() < 1e-12);
    }

    #[test]
    fn test_status_update_preserves_cost() {
        let table = StatusTable::new(Instant::now());
        table.set_status(&input("a"), JobStatus::Paid);
        table.set_paid_cost(&input("a"), 1.0);
        table.set_status(&input("a"), JobStatus::Running);

        let progress = aggregate(&table, Instant::now());
        assert!((progress.total_cost - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_elapsed_measured_from_start() {
        let start = Instant::now();
        let table = StatusTable::new(start);
        let progress = aggregate(&table, start + Duration::from_secs(7));
        assert_eq!(progress.elapsed, Duration::from_secs(7));
    }

    #[test]
    fn test_active_count() {
        let table = StatusTable::new(Instant::now());
        table.set_status(&input("a"), JobStatus::Running);
        table.set_status(&input("b"), JobStatus::Completed);
        table.set_status(&input("c"), JobStatus::Queued);

        assert_eq!(table.active_count(), 2);
    }
}
