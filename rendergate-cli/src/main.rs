//! RenderGate CLI - Command-line interface
//!
//! This binary provides a command-line interface to the RenderGate library:
//! price estimation against a provider tariff and batch submission of
//! render jobs to a remote pay-per-use service.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use rendergate::logging::{default_log_dir, default_log_file, init_logging};

#[derive(Parser)]
#[command(name = "rendergate")]
#[command(version = rendergate::VERSION)]
#[command(about = "Submit batches of render jobs to a pay-per-use render service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Price an input against a provider tariff, without submitting
    Estimate(commands::estimate::EstimateArgs),
    /// Submit a batch of inputs and drive them to completion
    Batch(commands::batch::BatchArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let _logging_guard = match init_logging(default_log_dir(), default_log_file()) {
        Ok(guard) => guard,
        Err(e) => error::CliError::LoggingInit(e.to_string()).exit(),
    };

    let result = match cli.command {
        Command::Estimate(args) => commands::estimate::run(args),
        Command::Batch(args) => commands::batch::run(args).await,
    };

    if let Err(e) = result {
        e.exit();
    }
}
