//! Deterministic price estimation.
//!
//! Pure functions mapping a tariff and job characteristics to a price
//! breakdown. Both the client and the provider run this computation and the
//! resulting transfer amounts must match bit-for-bit, so everything here is
//! deterministic: no clock reads, no randomness, and a single terminal
//! rounding step on the total.

use super::tariff::{JobCharacteristics, Tariff};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default platform fee rate applied on top of the base price (5%).
pub const DEFAULT_PLATFORM_FEE_RATE: f64 = 0.05;

/// Decimal places the total is rounded to.
///
/// The settlement layer transfers amounts at this precision; rounding is
/// applied exactly once, on the total.
pub const PRICE_PRECISION_DECIMALS: u32 = 6;

// ---------------------------------------------------------------------------
// Price breakdown
// ---------------------------------------------------------------------------

/// Itemized price for one job.
///
/// Fee fields are unrounded so the computation can be audited; only `total`
/// carries the terminal rounding.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// `max(size_fee + work_fee + time_fee, tariff.minimum_price)`.
    pub base_price: f64,

    /// Fee for input artifact size.
    pub size_fee: f64,

    /// Fee for requested work units.
    pub work_fee: f64,

    /// Fee for estimated render time.
    pub time_fee: f64,

    /// Platform cut: `base_price * platform_fee_rate`.
    pub platform_fee: f64,

    /// `base_price * (1 + platform_fee_rate)`, rounded to
    /// [`PRICE_PRECISION_DECIMALS`] places.
    pub total: f64,
}

/// Computes the price breakdown for a job under a tariff.
///
/// Pure and deterministic: identical inputs always produce bit-identical
/// output. If the fee subtotal falls below `tariff.minimum_price`, the
/// minimum wins (floor, not error). No fee is ever negative: rates and
/// characteristics are non-negative by construction, and negative rates in
/// a malformed tariff are clamped to zero.
///
/// # Arguments
///
/// * `tariff` - the provider's pricing table
/// * `characteristics` - billable characteristics of the job
/// * `platform_fee_rate` - fraction added on top of the base price
///   (see [`DEFAULT_PLATFORM_FEE_RATE`])
pub fn estimate(
    tariff: &Tariff,
    characteristics: &JobCharacteristics,
    platform_fee_rate: f64,
) -> PriceBreakdown {
    let size_fee = (characteristics.size_gb() * tariff.price_per_gb).max(0.0);
    let work_fee = (characteristics.work_units as f64 * tariff.price_per_work_unit).max(0.0);
    let time_fee = (characteristics.estimated_seconds as f64 * tariff.price_per_second).max(0.0);

    let subtotal = size_fee + work_fee + time_fee;
    let base_price = subtotal.max(tariff.minimum_price.max(0.0));
    let platform_fee = base_price * platform_fee_rate.max(0.0);

    let total = round_to_precision(
        base_price + platform_fee,
        PRICE_PRECISION_DECIMALS,
    );

    PriceBreakdown {
        base_price,
        size_fee,
        work_fee,
        time_fee,
        platform_fee,
        total,
    }
}

/// Rounds `value` to `decimals` decimal places, half away from zero.
fn round_to_precision(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tariff() -> Tariff {
        Tariff {
            price_per_gb: 0.01,
            price_per_work_unit: 0.001,
            price_per_second: 0.0001,
            minimum_price: 0.005,
            currency: "NEAR".to_string(),
        }
    }

    // -- breakdown arithmetic -----------------------------------------------

    #[test]
    fn hundred_megabyte_render_breakdown() {
        let characteristics = JobCharacteristics {
            size_bytes: 100 * 1024 * 1024,
            work_units: 1,
            estimated_seconds: 60,
        };

        let breakdown = estimate(&sample_tariff(), &characteristics, 0.05);

        // 100 MiB = 0.09765625 GB at 0.01/GB
        assert!((breakdown.size_fee - 0.0009765625).abs() < 1e-12);
        assert!((breakdown.work_fee - 0.001).abs() < 1e-12);
        assert!((breakdown.time_fee - 0.006).abs() < 1e-12);
        // Subtotal 0.0079765625 clears the 0.005 floor
        assert!((breakdown.base_price - 0.0079765625).abs() < 1e-12);
        assert!((breakdown.platform_fee - 0.0079765625 * 0.05).abs() < 1e-12);
        // 0.0079765625 * 1.05 = 0.008375390625, rounded once to 6 places
        assert!((breakdown.total - 0.008375).abs() < 1e-12);
    }

    #[test]
    fn minimum_price_floors_small_jobs() {
        let characteristics = JobCharacteristics {
            size_bytes: 1024,
            work_units: 0,
            estimated_seconds: 0,
        };

        let breakdown = estimate(&sample_tariff(), &characteristics, 0.05);

        assert!((breakdown.base_price - 0.005).abs() < f64::EPSILON);
        assert!((breakdown.total - 0.00525).abs() < 1e-12);
    }

    #[test]
    fn total_never_below_minimum_with_fee() {
        let tariff = sample_tariff();
        for size_bytes in [0u64, 1, 1024, 1024 * 1024, 50 * 1024 * 1024 * 1024] {
            for work_units in [0u32, 1, 240] {
                let characteristics = JobCharacteristics {
                    size_bytes,
                    work_units,
                    estimated_seconds: 30,
                };
                let breakdown = estimate(&tariff, &characteristics, 0.05);
                // Allow for the terminal rounding step
                assert!(
                    breakdown.total >= tariff.minimum_price * 1.05 - 1e-6,
                    "total {} below floored minimum for {:?}",
                    breakdown.total,
                    characteristics
                );
            }
        }
    }

    #[test]
    fn estimate_is_deterministic() {
        let characteristics = JobCharacteristics {
            size_bytes: 123_456_789,
            work_units: 17,
            estimated_seconds: 421,
        };

        let first = estimate(&sample_tariff(), &characteristics, 0.05);
        let second = estimate(&sample_tariff(), &characteristics, 0.05);

        assert_eq!(first.total.to_bits(), second.total.to_bits());
        assert_eq!(first, second);
    }

    #[test]
    fn fee_rate_is_explicit() {
        let characteristics = JobCharacteristics {
            size_bytes: 100 * 1024 * 1024,
            work_units: 1,
            estimated_seconds: 60,
        };

        let no_fee = estimate(&sample_tariff(), &characteristics, 0.0);
        let ten_percent = estimate(&sample_tariff(), &characteristics, 0.10);

        assert!((no_fee.platform_fee).abs() < f64::EPSILON);
        assert!((no_fee.total - 0.007977).abs() < 1e-9);
        assert!(ten_percent.total > no_fee.total);
    }

    #[test]
    fn negative_rates_never_produce_negative_fees() {
        let tariff = Tariff {
            price_per_gb: -1.0,
            price_per_work_unit: -1.0,
            price_per_second: -1.0,
            minimum_price: -1.0,
            currency: "NEAR".to_string(),
        };
        let characteristics = JobCharacteristics {
            size_bytes: 1024 * 1024 * 1024,
            work_units: 10,
            estimated_seconds: 10,
        };

        let breakdown = estimate(&tariff, &characteristics, 0.05);

        assert!(breakdown.size_fee >= 0.0);
        assert!(breakdown.work_fee >= 0.0);
        assert!(breakdown.time_fee >= 0.0);
        assert!(breakdown.base_price >= 0.0);
        assert!(breakdown.total >= 0.0);
    }

    #[test]
    fn intermediate_fees_stay_unrounded() {
        // A size fee with more than 6 significant decimals must survive
        // unrounded; only the total is rounded.
        let characteristics = JobCharacteristics {
            size_bytes: 100 * 1024 * 1024,
            work_units: 0,
            estimated_seconds: 0,
        };

        let breakdown = estimate(&sample_tariff(), &characteristics, 0.0);

        assert!((breakdown.size_fee - 0.0009765625).abs() < 1e-15);
    }
}
