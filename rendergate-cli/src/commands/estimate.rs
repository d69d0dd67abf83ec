//! Price estimation command.
//!
//! Prices a local input against a provider tariff without contacting the
//! service, mirroring the computation the provider performs when quoting.

use crate::error::CliError;
use clap::Args;
use rendergate::pricing::{estimate, JobCharacteristics, Tariff, DEFAULT_PLATFORM_FEE_RATE};
use std::path::PathBuf;

/// Arguments for the `estimate` command.
#[derive(Debug, Args)]
pub struct EstimateArgs {
    /// Input artifact to price
    #[arg(long)]
    pub input: PathBuf,

    /// Path to the provider tariff JSON
    #[arg(long)]
    pub tariff: PathBuf,

    /// Work units requested (e.g. frames to render)
    #[arg(long, default_value = "1")]
    pub work_units: u32,

    /// Estimated render time in seconds
    #[arg(long, default_value = "60")]
    pub seconds: u64,

    /// Platform fee rate as a fraction
    #[arg(long, default_value_t = DEFAULT_PLATFORM_FEE_RATE)]
    pub fee_rate: f64,
}

/// Run the estimate command.
pub fn run(args: EstimateArgs) -> Result<(), CliError> {
    let tariff = load_tariff(&args.tariff)?;

    let characteristics =
        JobCharacteristics::from_input(&args.input, args.work_units, args.seconds).map_err(
            |error| CliError::InputRead {
                path: args.input.display().to_string(),
                error,
            },
        )?;

    let breakdown = estimate(&tariff, &characteristics, args.fee_rate);

    println!("Price estimate for {}:", args.input.display());
    println!("  Size:         {} bytes", characteristics.size_bytes);
    println!("  Work units:   {}", characteristics.work_units);
    println!("  Est. seconds: {}", characteristics.estimated_seconds);
    println!();
    println!("  Size fee:     {:.9} {}", breakdown.size_fee, tariff.currency);
    println!("  Work fee:     {:.9} {}", breakdown.work_fee, tariff.currency);
    println!("  Time fee:     {:.9} {}", breakdown.time_fee, tariff.currency);
    println!("  Base price:   {:.9} {}", breakdown.base_price, tariff.currency);
    println!("  Platform fee: {:.9} {}", breakdown.platform_fee, tariff.currency);
    println!("  Total:        {:.6} {}", breakdown.total, tariff.currency);

    Ok(())
}

/// Load and parse a tariff JSON file.
fn load_tariff(path: &std::path::Path) -> Result<Tariff, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|error| CliError::InputRead {
        path: path.display().to_string(),
        error,
    })?;
    serde_json::from_str(&raw)
        .map_err(|e| CliError::Config(format!("invalid tariff '{}': {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_tariff_valid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"price_per_gb": 0.01, "price_per_work_unit": 0.001,
                "price_per_second": 0.0001, "minimum_price": 0.005, "currency": "NEAR"}}"#
        )
        .unwrap();

        let tariff = load_tariff(file.path()).unwrap();
        assert_eq!(tariff.currency, "NEAR");
    }

    #[test]
    fn test_load_tariff_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(matches!(load_tariff(file.path()), Err(CliError::Config(_))));
    }

    #[test]
    fn test_load_tariff_missing_file() {
        let result = load_tariff(std::path::Path::new("/nonexistent/tariff.json"));
        assert!(matches!(result, Err(CliError::InputRead { .. })));
    }
}
