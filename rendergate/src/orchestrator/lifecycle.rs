//! Single-job lifecycle control.
//!
//! A [`JobLifecycle`] owns exactly one job and drives it through the
//! payment-gated state machine against the injected capabilities:
//! submit, pay, confirm, poll until terminal, fetch. Steps within one
//! lifecycle are strictly sequential; concurrency lives one layer up in
//! the scheduler.
//!
//! Money rules are asymmetric with ordinary error handling:
//! - the quote's expiry is checked before any payment attempt
//! - submission and payment are never silently retried
//! - a rejected payment confirmation is terminal (the transfer already
//!   happened; retrying could pay twice)
//! - only the status-poll step retries, bounded, with backoff

use super::config::OrchestratorConfig;
use super::error::JobError;
use super::job::{InputRef, JobRecord};
use super::progress::{aggregate, ProgressSink, StatusTable};
use super::status::JobStatus;
use crate::api::{RemoteJobId, RemoteJobState, RenderApi, StatusResponse};
use crate::clock::Clock;
use crate::payment::{PaymentProvider, PaymentRequest};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Final result of one lifecycle.
#[derive(Debug)]
pub struct JobOutcome {
    /// Everything recorded about the job.
    pub record: JobRecord,

    /// Rendered output bytes, when the job completed and the fetch
    /// succeeded.
    pub result: Option<Vec<u8>>,

    /// The terminal failure, absent for completed jobs (a completed job
    /// with a failed result fetch keeps `record.error` instead).
    pub error: Option<JobError>,
}

impl JobOutcome {
    /// Returns true if the job completed.
    pub fn is_success(&self) -> bool {
        self.record.status == JobStatus::Completed
    }
}

/// Capabilities and shared state every lifecycle in a batch needs.
///
/// Cloning is cheap: all fields are shared handles.
pub struct LifecycleContext<A, P> {
    pub api: Arc<A>,
    pub payment: Arc<P>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<OrchestratorConfig>,
    pub table: Arc<StatusTable>,
    pub sink: Arc<dyn ProgressSink>,
}

impl<A, P> LifecycleContext<A, P> {
    /// Bundles the capabilities for one batch.
    pub fn new(
        api: Arc<A>,
        payment: Arc<P>,
        clock: Arc<dyn Clock>,
        config: Arc<OrchestratorConfig>,
        table: Arc<StatusTable>,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            api,
            payment,
            clock,
            config,
            table,
            sink,
        }
    }
}

impl<A, P> Clone for LifecycleContext<A, P> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            payment: Arc::clone(&self.payment),
            clock: Arc::clone(&self.clock),
            config: Arc::clone(&self.config),
            table: Arc::clone(&self.table),
            sink: Arc::clone(&self.sink),
        }
    }
}

/// Handle to cancel one job before its payment is made.
///
/// Cancellation after funds are committed is refused: the transfer
/// already happened and cannot be recalled from here.
pub struct CancelHandle {
    input: InputRef,
    table: Arc<StatusTable>,
    token: CancellationToken,
}

impl CancelHandle {
    /// Requests cancellation of the job.
    ///
    /// Fails with [`JobError::CannotCancelAfterPayment`] once the job has
    /// reached `Paid` or any later state. The lifecycle observes the
    /// cancellation at its next checkpoint, not instantaneously.
    pub fn cancel(&self) -> Result<(), JobError> {
        if let Some(status) = self.table.status_of(&self.input) {
            if status.funds_committed() {
                return Err(JobError::CannotCancelAfterPayment);
            }
        }
        self.token.cancel();
        Ok(())
    }
}

/// Drives one job from submission to a terminal state.
pub struct JobLifecycle<A, P> {
    input: InputRef,
    context: LifecycleContext<A, P>,
    cancel: CancellationToken,
}

impl<A, P> JobLifecycle<A, P>
where
    A: RenderApi,
    P: PaymentProvider,
{
    /// Creates a lifecycle for `input`.
    ///
    /// `cancel` carries both per-job and batch-level cancellation; the
    /// scheduler passes a child of the batch token.
    pub fn new(input: InputRef, context: LifecycleContext<A, P>, cancel: CancellationToken) -> Self {
        Self {
            input,
            context,
            cancel,
        }
    }

    /// Returns a handle that can cancel this job before payment.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            input: self.input.clone(),
            table: Arc::clone(&self.context.table),
            token: self.cancel.clone(),
        }
    }

    /// Runs the lifecycle to its terminal state.
    ///
    /// Never panics on capability failures and never returns early with
    /// an `Err`: every failure is folded into the returned outcome.
    pub async fn run(self) -> JobOutcome {
        let submitted_at = self.context.clock.now();
        let mut record = JobRecord::new(self.input.clone(), self.context.clock.now_utc());

        if self.cancel.is_cancelled() {
            return self.finish_error(record, JobError::CancelledBeforePayment);
        }

        info!(input = %self.input, "submitting job");
        let submitted = match self
            .context
            .api
            .submit_job(self.input.as_str(), &self.context.config.wallet_address)
            .await
        {
            Ok(response) => response,
            Err(e) => return self.finish_error(record, JobError::Submit(e)),
        };

        record.id = Some(submitted.job_id.clone());
        record.price = Some(submitted.quote.amount);
        self.transition(&mut record, JobStatus::Submitted);
        self.transition(&mut record, JobStatus::PaymentPending);

        // Last checkpoint before money moves
        if self.cancel.is_cancelled() {
            return self.finish_error(record, JobError::CancelledBeforePayment);
        }

        let quote = submitted.quote;
        if quote.is_expired(self.context.clock.now_utc()) {
            return self.finish_error(
                record,
                JobError::QuoteExpired {
                    expired_at: quote.expires_at,
                },
            );
        }

        debug!(
            job_id = %submitted.job_id,
            amount = quote.amount,
            pay_to = %quote.pay_to,
            "sending payment"
        );
        let request = PaymentRequest {
            pay_to: quote.pay_to,
            amount: quote.amount,
            currency: quote.currency,
            memo: quote.memo,
        };
        let proof = match self.context.payment.send_payment(&request).await {
            Ok(proof) => proof,
            Err(e) => return self.finish_error(record, JobError::Payment(e)),
        };
        record.payment_ref = Some(proof.transaction_id.clone());

        let confirmation = match self
            .context
            .api
            .confirm_payment(&submitted.job_id, &proof)
            .await
        {
            Ok(confirmation) => confirmation,
            Err(e) => return self.finish_error(record, JobError::ConfirmFailed(e)),
        };
        if !confirmation.accepted {
            let reason = confirmation
                .reason
                .unwrap_or_else(|| "no reason given".to_string());
            return self.finish_error(record, JobError::PaymentRejected { reason });
        }

        self.transition(&mut record, JobStatus::Paid);
        self.context.table.set_paid_cost(&self.input, proof.amount);

        self.poll_to_terminal(record, submitted_at, &submitted.job_id)
            .await
    }

    /// Polls the remote until a terminal state, deadline, or stop signal.
    async fn poll_to_terminal(
        &self,
        mut record: JobRecord,
        submitted_at: std::time::Instant,
        job_id: &RemoteJobId,
    ) -> JobOutcome {
        loop {
            let elapsed = self.context.clock.now().duration_since(submitted_at);
            if elapsed >= self.context.config.job_deadline {
                return self.finish_error(
                    record,
                    JobError::DeadlineExceeded {
                        timeout: self.context.config.job_deadline,
                    },
                );
            }

            // Stop signals are observed here, at the poll boundary
            if self.cancel.is_cancelled() {
                return self.finish_error(record, JobError::CancelledWhilePolling);
            }

            let status = match self.poll_with_retry(job_id).await {
                Ok(status) => status,
                Err(e) => return self.finish_error(record, e),
            };

            match status.state {
                RemoteJobState::Pending | RemoteJobState::Queued => {
                    self.transition(&mut record, JobStatus::Queued);
                }
                RemoteJobState::Running => {
                    if record.started_at.is_none() {
                        record.started_at = Some(self.context.clock.now_utc());
                    }
                    self.transition(&mut record, JobStatus::Running);
                }
                RemoteJobState::Completed => {
                    record.result_ref = status.result_ref;
                    let result = match self.context.api.fetch_result(job_id).await {
                        Ok(bytes) => Some(bytes),
                        Err(e) => {
                            // The remote reports success; the completion
                            // stands and the fetch problem is noted.
                            warn!(
                                job_id = %job_id,
                                error = %e,
                                "result fetch failed after completion"
                            );
                            record.error = Some(format!("result fetch failed: {e}"));
                            None
                        }
                    };
                    return self.finish_completed(record, result);
                }
                RemoteJobState::Failed => {
                    let reason = status
                        .error
                        .unwrap_or_else(|| "unspecified remote failure".to_string());
                    return self.finish_error(record, JobError::RemoteFailure { reason });
                }
                RemoteJobState::Cancelled => {
                    return self.finish_error(record, JobError::RemoteCancelled);
                }
            }

            self.context
                .clock
                .sleep(self.context.config.poll_interval)
                .await;
        }
    }

    /// One status observation, retrying transient failures up to the
    /// configured limit with exponential backoff.
    async fn poll_with_retry(&self, job_id: &RemoteJobId) -> Result<StatusResponse, JobError> {
        let mut delay = self.context.config.poll_retry_initial_delay;
        let mut attempts = 0u32;

        loop {
            match self.context.api.poll_status(job_id).await {
                Ok(status) => return Ok(status),
                Err(e) if e.is_transient() => {
                    attempts += 1;
                    if attempts > self.context.config.poll_retry_limit {
                        return Err(JobError::StatusCheckExhausted {
                            attempts,
                            last_error: e,
                        });
                    }
                    warn!(
                        job_id = %job_id,
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient status check failure, retrying"
                    );
                    self.context.clock.sleep(delay).await;
                    delay = delay.mul_f64(self.context.config.poll_retry_backoff_multiplier);
                }
                Err(e) => return Err(JobError::StatusCheck(e)),
            }
        }
    }

    /// Applies a status transition: record, table, then sinks.
    ///
    /// Repeated observations of the current status are dropped so sinks
    /// fire once per actual change; an illegal transition is logged and
    /// ignored rather than corrupting a terminal state.
    fn transition(&self, record: &mut JobRecord, next: JobStatus) {
        let recorded = self.context.table.status_of(&self.input);
        if record.status == next && recorded == Some(next) {
            return;
        }
        if record.status != next && !record.status.can_transition_to(next) {
            error!(
                input = %self.input,
                from = %record.status,
                to = %next,
                "illegal status transition ignored"
            );
            return;
        }

        record.status = next;
        self.context.table.set_status(&self.input, next);
        self.context.sink.on_job_progress(&self.input, next);
        let progress = aggregate(&self.context.table, self.context.clock.now());
        self.context.sink.on_batch_progress(&progress);
    }

    fn finish_completed(&self, mut record: JobRecord, result: Option<Vec<u8>>) -> JobOutcome {
        record.completed_at = Some(self.context.clock.now_utc());
        self.transition(&mut record, JobStatus::Completed);
        info!(
            input = %self.input,
            job_id = ?record.id,
            fetched = result.is_some(),
            "job completed"
        );
        JobOutcome {
            record,
            result,
            error: None,
        }
    }

    fn finish_error(&self, mut record: JobRecord, error: JobError) -> JobOutcome {
        let terminal = if error.is_cancellation() {
            JobStatus::Cancelled
        } else {
            JobStatus::Failed
        };
        record.error = Some(error.to_string());
        record.completed_at = Some(self.context.clock.now_utc());
        self.transition(&mut record, terminal);
        warn!(
            input = %self.input,
            job_id = ?record.id,
            status = %terminal,
            error = %error,
            "job did not complete"
        );
        JobOutcome {
            record,
            result: None,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn handle_with_status(status: Option<JobStatus>) -> CancelHandle {
        let input = InputRef::from("scene.blend");
        let table = Arc::new(StatusTable::new(Instant::now()));
        if let Some(status) = status {
            table.set_status(&input, status);
        }
        CancelHandle {
            input,
            table,
            token: CancellationToken::new(),
        }
    }

    #[test]
    fn test_cancel_allowed_before_submission() {
        let handle = handle_with_status(None);
        assert!(handle.cancel().is_ok());
        assert!(handle.token.is_cancelled());
    }

    #[test]
    fn test_cancel_allowed_while_payment_pending() {
        let handle = handle_with_status(Some(JobStatus::PaymentPending));
        assert!(handle.cancel().is_ok());
    }

    #[test]
    fn test_cancel_refused_after_payment() {
        for status in [
            JobStatus::Paid,
            JobStatus::Queued,
            JobStatus::Running,
            JobStatus::Completed,
        ] {
            let handle = handle_with_status(Some(status));
            let result = handle.cancel();
            assert!(
                matches!(result, Err(JobError::CannotCancelAfterPayment)),
                "cancel should be refused in {status}"
            );
            assert!(!handle.token.is_cancelled());
        }
    }
}
