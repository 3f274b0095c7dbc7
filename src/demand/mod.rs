//! Demand realizations fed to the evaluator.
//!
//! The evaluator only sees [`DemandSampler`]; everything distribution-specific lives here.

pub mod distribution;
pub mod sampler;

use thiserror::Error;

pub use distribution::{InverseCdf, PeriodDemand};
pub use sampler::{DemandSampler, DistributionDemand, FixedDemand, IndependentDemand};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DemandError {
    #[error("{field} must be finite (got {value})")]
    NonFinite { field: &'static str, value: f64 },
    #[error("standard deviation must be non-negative (got {value})")]
    NegativeSpread { value: f64 },
    #[error("mean must be positive (got {value})")]
    NonPositiveMean { value: f64 },
    #[error("uniform bounds invalid (low {low} > high {high})")]
    InvalidRange { low: f64, high: f64 },
    #[error("empirical distribution needs at least one observation")]
    EmptySample,
    #[error("got {actual} spreads for {expected} means")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("invalid distribution: {0}")]
    Distribution(String),
}
