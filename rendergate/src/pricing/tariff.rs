//! Provider tariffs and per-job characteristics.
//!
//! A [`Tariff`] is owned and published by the remote provider; this side
//! only reads it. [`JobCharacteristics`] are computed once per job from the
//! input artifact and the requested render settings, and are immutable
//! thereafter.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bytes per gigabyte used for size-fee computation (binary GB).
pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// A provider's per-unit pricing table.
///
/// All rates are denominated in `currency`. The provider publishes this as
/// JSON; the orchestrator never mutates it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tariff {
    /// Price per gigabyte of input artifact size.
    pub price_per_gb: f64,

    /// Price per unit of render work (e.g. one frame).
    pub price_per_work_unit: f64,

    /// Price per second of estimated render time.
    pub price_per_second: f64,

    /// Price floor: a job is never quoted below this, however small.
    pub minimum_price: f64,

    /// Settlement currency symbol (e.g. "NEAR", "USDC").
    pub currency: String,
}

/// Billable characteristics of a single job.
///
/// `estimated_seconds` is an externally supplied input: the library mandates
/// no render-time estimation algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobCharacteristics {
    /// Size of the input artifact in bytes.
    pub size_bytes: u64,

    /// Number of work units requested (e.g. frames to render).
    pub work_units: u32,

    /// Estimated render time in seconds.
    pub estimated_seconds: u64,
}

impl JobCharacteristics {
    /// Derives characteristics from a local input file.
    ///
    /// Only `size_bytes` can be read off the artifact itself; `work_units`
    /// and `estimated_seconds` come from the caller's render settings.
    pub fn from_input(
        path: &Path,
        work_units: u32,
        estimated_seconds: u64,
    ) -> std::io::Result<Self> {
        let size_bytes = std::fs::metadata(path)?.len();
        Ok(Self {
            size_bytes,
            work_units,
            estimated_seconds,
        })
    }

    /// Input artifact size in (binary) gigabytes.
    pub fn size_gb(&self) -> f64 {
        self.size_bytes as f64 / BYTES_PER_GB
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn size_gb_converts_binary_gigabytes() {
        let characteristics = JobCharacteristics {
            size_bytes: 1024 * 1024 * 1024,
            work_units: 1,
            estimated_seconds: 0,
        };
        assert!((characteristics.size_gb() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn from_input_reads_file_size() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 4096]).unwrap();

        let characteristics = JobCharacteristics::from_input(file.path(), 24, 120).unwrap();
        assert_eq!(characteristics.size_bytes, 4096);
        assert_eq!(characteristics.work_units, 24);
        assert_eq!(characteristics.estimated_seconds, 120);
    }

    #[test]
    fn from_input_missing_file_is_error() {
        let result = JobCharacteristics::from_input(Path::new("/nonexistent/input.blend"), 1, 1);
        assert!(result.is_err());
    }

    #[test]
    fn tariff_deserializes_from_provider_json() {
        let json = r#"{
            "price_per_gb": 0.01,
            "price_per_work_unit": 0.001,
            "price_per_second": 0.0001,
            "minimum_price": 0.005,
            "currency": "NEAR"
        }"#;

        let tariff: Tariff = serde_json::from_str(json).unwrap();
        assert_eq!(tariff.currency, "NEAR");
        assert!((tariff.minimum_price - 0.005).abs() < f64::EPSILON);
    }
}
