//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use rendergate::orchestrator::BatchError;
use std::fmt;
use std::process;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Bad arguments or tariff file
    Config(String),
    /// Failed to read an input file
    InputRead { path: String, error: std::io::Error },
    /// Failed to create the API or wallet client
    ClientCreation(String),
    /// The batch request was rejected before any job started
    Batch(BatchError),
    /// Failed to write a result file
    FileWrite { path: String, error: std::io::Error },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::Batch(_) = self {
            eprintln!();
            eprintln!("Nothing was submitted and no payment was made.");
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InputRead { path, error } => {
                write!(f, "Failed to read input '{}': {}", path, error)
            }
            CliError::ClientCreation(msg) => write!(f, "Failed to create client: {}", msg),
            CliError::Batch(e) => write!(f, "Batch rejected: {}", e),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path, error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::InputRead { error, .. } => Some(error),
            CliError::FileWrite { error, .. } => Some(error),
            CliError::Batch(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_config_error() {
        let err = CliError::Config("missing tariff".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("missing tariff"));
    }

    #[test]
    fn test_display_input_read() {
        let err = CliError::InputRead {
            path: "scene.blend".to_string(),
            error: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("scene.blend"));
    }
}
