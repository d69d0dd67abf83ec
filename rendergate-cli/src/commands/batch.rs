//! Batch submission command.
//!
//! Wires the HTTP render service client and the local wallet daemon into a
//! [`BatchScheduler`] and runs every input through its payment-gated
//! lifecycle, writing fetched results next to the inputs.

use crate::error::CliError;
use clap::Args;
use rendergate::api::HttpRenderApi;
use rendergate::clock::SystemClock;
use rendergate::orchestrator::{
    BatchOptions, BatchResult, BatchScheduler, InputRef, OrchestratorConfig, TracingProgressSink,
    DEFAULT_BATCH_CONCURRENCY,
};
use rendergate::payment::WalletRpcPayment;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Arguments for the `batch` command.
#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Render service endpoint, e.g. https://render.example.com
    #[arg(long)]
    pub endpoint: String,

    /// Wallet address jobs are billed to
    #[arg(long)]
    pub wallet: String,

    /// Local wallet daemon RPC, e.g. http://127.0.0.1:4100
    #[arg(long)]
    pub wallet_rpc: String,

    /// Maximum number of jobs in flight at once
    #[arg(long, default_value_t = DEFAULT_BATCH_CONCURRENCY)]
    pub concurrency: usize,

    /// Stop starting new jobs after the first failure
    #[arg(long)]
    pub stop_on_error: bool,

    /// Directory to write fetched results into
    #[arg(long, default_value = "renders")]
    pub output_dir: PathBuf,

    /// Input artifacts to render
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
}

/// Run the batch command.
pub async fn run(args: BatchArgs) -> Result<(), CliError> {
    let api = HttpRenderApi::new(&args.endpoint)
        .map_err(|e| CliError::ClientCreation(e.to_string()))?;
    let payment = WalletRpcPayment::new(&args.wallet_rpc)
        .map_err(|e| CliError::ClientCreation(e.to_string()))?;

    let config = OrchestratorConfig::new(&args.wallet);
    let scheduler = BatchScheduler::new(api, payment, SystemClock::shared(), config)
        .with_progress_sink(Arc::new(TracingProgressSink));

    let inputs: Vec<InputRef> = args
        .inputs
        .iter()
        .map(|path| InputRef::new(path.display().to_string()))
        .collect();

    let options = BatchOptions {
        concurrency: args.concurrency,
        stop_on_error: args.stop_on_error,
        cancellation: CancellationToken::new(),
    };

    let result = scheduler
        .run_batch(inputs, options)
        .await
        .map_err(CliError::Batch)?;

    write_results(&result, &args.output_dir)?;
    print_summary(&result);

    if result.is_complete_success() {
        Ok(())
    } else {
        std::process::exit(1)
    }
}

/// Write fetched result bytes for completed jobs.
fn write_results(result: &BatchResult, output_dir: &std::path::Path) -> Result<(), CliError> {
    let fetched: Vec<_> = result
        .succeeded
        .iter()
        .filter_map(|outcome| outcome.result.as_ref().map(|bytes| (outcome, bytes)))
        .collect();
    if fetched.is_empty() {
        return Ok(());
    }

    std::fs::create_dir_all(output_dir).map_err(|error| CliError::FileWrite {
        path: output_dir.display().to_string(),
        error,
    })?;

    for (outcome, bytes) in fetched {
        let id = outcome
            .record
            .id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let path = output_dir.join(format!("{id}.out"));
        std::fs::write(&path, bytes).map_err(|error| CliError::FileWrite {
            path: path.display().to_string(),
            error,
        })?;
    }
    Ok(())
}

/// Print the final batch summary.
fn print_summary(result: &BatchResult) {
    println!();
    println!(
        "Batch finished in {:.1}s: {} completed, {} failed, {} skipped",
        result.progress.elapsed.as_secs_f64(),
        result.progress.completed,
        result.progress.failed,
        result.skipped.len(),
    );
    println!("Total cost: {:.6}", result.progress.total_cost);

    for outcome in &result.failed {
        let reason = outcome
            .record
            .error
            .as_deref()
            .unwrap_or("unknown failure");
        println!("  FAILED  {}: {}", outcome.record.input, reason);
    }
    for input in &result.skipped {
        println!("  SKIPPED {}", input);
    }
}
