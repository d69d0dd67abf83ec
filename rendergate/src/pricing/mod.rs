//! Job pricing.
//!
//! A provider publishes a [`Tariff`] (per-unit rates plus a price floor).
//! The caller derives [`JobCharacteristics`] from the input artifact and
//! requested settings, and [`estimate`] maps the two to a [`PriceBreakdown`]
//! deterministically: both sides of a transaction must arrive at the same
//! total, so the computation has no time or randomness dependence and the
//! final rounding is applied exactly once.

mod estimator;
mod tariff;

pub use estimator::{
    estimate, PriceBreakdown, DEFAULT_PLATFORM_FEE_RATE, PRICE_PRECISION_DECIMALS,
};
pub use tariff::{JobCharacteristics, Tariff, BYTES_PER_GB};
