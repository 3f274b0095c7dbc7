// src/demand/distribution.rs

use serde::Serialize;

use crate::demand::DemandError;
use crate::stats::normal::standard_normal_quantile;

/// Poisson means above this switch from exact CDF inversion to a
/// continuity-corrected normal approximation (`e^-mean` underflows near 745).
const POISSON_EXACT_LIMIT: f64 = 500.0;

/// Maps a uniform draw in `[0, 1)` to a demand value.
pub trait InverseCdf {
    fn inverse_cdf(&self, u: f64) -> f64;
}

/// Demand distribution of a single period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PeriodDemand {
    Deterministic(f64),
    Normal { mean: f64, std_dev: f64 },
    Poisson { mean: f64 },
    Exponential { mean: f64 },
    Uniform { low: f64, high: f64 },
    /// Sorted observations; each carries probability `1 / n`.
    Empirical(Vec<f64>),
}

impl PeriodDemand {
    pub fn deterministic(value: f64) -> Result<Self, DemandError> {
        finite("value", value)?;
        Ok(Self::Deterministic(value))
    }

    pub fn normal(mean: f64, std_dev: f64) -> Result<Self, DemandError> {
        finite("mean", mean)?;
        finite("std_dev", std_dev)?;
        if std_dev < 0.0 {
            return Err(DemandError::NegativeSpread { value: std_dev });
        }
        Ok(Self::Normal { mean, std_dev })
    }

    pub fn poisson(mean: f64) -> Result<Self, DemandError> {
        positive_mean(mean)?;
        Ok(Self::Poisson { mean })
    }

    pub fn exponential(mean: f64) -> Result<Self, DemandError> {
        positive_mean(mean)?;
        Ok(Self::Exponential { mean })
    }

    pub fn uniform(low: f64, high: f64) -> Result<Self, DemandError> {
        finite("low", low)?;
        finite("high", high)?;
        if low > high {
            return Err(DemandError::InvalidRange { low, high });
        }
        Ok(Self::Uniform { low, high })
    }

    pub fn empirical(mut observations: Vec<f64>) -> Result<Self, DemandError> {
        if observations.is_empty() {
            return Err(DemandError::EmptySample);
        }
        if let Some(&bad) = observations.iter().find(|v| !v.is_finite()) {
            return Err(DemandError::NonFinite {
                field: "observation",
                value: bad,
            });
        }
        observations.sort_by(f64::total_cmp);
        Ok(Self::Empirical(observations))
    }

    pub fn mean(&self) -> f64 {
        match self {
            Self::Deterministic(v) => *v,
            Self::Normal { mean, .. } | Self::Poisson { mean } | Self::Exponential { mean } => {
                *mean
            }
            Self::Uniform { low, high } => 0.5 * (low + high),
            Self::Empirical(obs) => obs.iter().sum::<f64>() / obs.len() as f64,
        }
    }
}

impl InverseCdf for PeriodDemand {
    fn inverse_cdf(&self, u: f64) -> f64 {
        let u = u.clamp(0.0, 1.0);
        match self {
            Self::Deterministic(v) => *v,
            Self::Normal { mean, std_dev } => mean + std_dev * standard_normal_quantile(u),
            Self::Poisson { mean } => poisson_quantile(*mean, u),
            // 1 - u lies in (0, 1] for u in [0, 1), so the log stays finite
            Self::Exponential { mean } => -mean * (1.0 - u).max(f64::MIN_POSITIVE).ln(),
            Self::Uniform { low, high } => low + (high - low) * u,
            Self::Empirical(obs) => {
                let index = ((u * obs.len() as f64).floor() as usize).min(obs.len() - 1);
                obs[index]
            }
        }
    }
}

fn poisson_quantile(mean: f64, u: f64) -> f64 {
    if mean > POISSON_EXACT_LIMIT {
        let approx = mean + mean.sqrt() * standard_normal_quantile(u) + 0.5;
        return approx.floor().max(0.0);
    }

    let mut k = 0u64;
    let mut pmf = (-mean).exp();
    let mut cdf = pmf;
    // the tail beyond mean + 40 sd is below double precision
    let cap = (mean + 40.0 * mean.sqrt() + 40.0) as u64;
    while cdf < u && k < cap {
        k += 1;
        pmf *= mean / k as f64;
        cdf += pmf;
    }
    k as f64
}

fn finite(field: &'static str, value: f64) -> Result<(), DemandError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DemandError::NonFinite { field, value })
    }
}

fn positive_mean(mean: f64) -> Result<(), DemandError> {
    finite("mean", mean)?;
    if mean <= 0.0 {
        return Err(DemandError::NonPositiveMean { value: mean });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() <= tol, "expected {b}, got {a}");
    }

    #[test]
    fn normal_median_is_the_mean() {
        let d = PeriodDemand::normal(110.0, 22.0).unwrap();
        approx_eq(d.inverse_cdf(0.5), 110.0, 1e-9);
        approx_eq(d.inverse_cdf(0.975), 110.0 + 22.0 * 1.959_963_985, 1e-6);
    }

    #[test]
    fn zero_spread_normal_is_deterministic() {
        let d = PeriodDemand::normal(40.0, 0.0).unwrap();
        for u in [0.0, 0.3, 0.999] {
            assert_eq!(d.inverse_cdf(u), 40.0);
        }
    }

    #[test]
    fn poisson_quantiles() {
        let d = PeriodDemand::poisson(2.0).unwrap();
        // P(X = 0) = e^-2 ~ 0.1353, P(X <= 1) ~ 0.4060, P(X <= 2) ~ 0.6767
        assert_eq!(d.inverse_cdf(0.0), 0.0);
        assert_eq!(d.inverse_cdf(0.10), 0.0);
        assert_eq!(d.inverse_cdf(0.20), 1.0);
        assert_eq!(d.inverse_cdf(0.50), 2.0);
        assert_eq!(d.inverse_cdf(0.70), 3.0);
    }

    #[test]
    fn large_poisson_stays_near_mean() {
        let d = PeriodDemand::poisson(10_000.0).unwrap();
        approx_eq(d.inverse_cdf(0.5), 10_000.0, 1.0);
    }

    #[test]
    fn exponential_and_uniform() {
        let e = PeriodDemand::exponential(50.0).unwrap();
        assert_eq!(e.inverse_cdf(0.0), 0.0);
        approx_eq(e.inverse_cdf(0.5), 50.0 * std::f64::consts::LN_2, 1e-9);

        let u = PeriodDemand::uniform(0.0, 100.0).unwrap();
        approx_eq(u.inverse_cdf(0.25), 25.0, 1e-12);
        approx_eq(u.mean(), 50.0, 1e-12);
    }

    #[test]
    fn empirical_steps_through_sorted_sample() {
        let d = PeriodDemand::empirical(vec![30.0, 10.0, 20.0, 40.0]).unwrap();
        assert_eq!(d.inverse_cdf(0.0), 10.0);
        assert_eq!(d.inverse_cdf(0.26), 20.0);
        assert_eq!(d.inverse_cdf(0.74), 30.0);
        assert_eq!(d.inverse_cdf(0.999), 40.0);
        approx_eq(d.mean(), 25.0, 1e-12);
    }

    #[test]
    fn constructors_validate_parameters() {
        assert!(matches!(
            PeriodDemand::normal(10.0, -1.0),
            Err(DemandError::NegativeSpread { .. })
        ));
        assert!(matches!(
            PeriodDemand::poisson(0.0),
            Err(DemandError::NonPositiveMean { .. })
        ));
        assert!(matches!(
            PeriodDemand::uniform(5.0, 1.0),
            Err(DemandError::InvalidRange { .. })
        ));
        assert!(matches!(
            PeriodDemand::empirical(vec![]),
            Err(DemandError::EmptySample)
        ));
    }
}
