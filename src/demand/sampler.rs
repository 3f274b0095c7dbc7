// src/demand/sampler.rs

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::demand::distribution::{InverseCdf, PeriodDemand};
use crate::demand::DemandError;

/// Produces one realization of demand over the whole horizon per call.
///
/// Successive calls must be independent given independent generator output.
/// `Sync` so one sampler can be shared by parallel workers.
pub trait DemandSampler: Sync {
    fn horizon(&self) -> usize;

    /// Writes one realization into `out`, which has exactly `horizon()` slots.
    fn fill<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut [f64]);

    fn realize<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        let mut out = vec![0.0; self.horizon()];
        self.fill(rng, &mut out);
        out
    }
}

/// Independent per-period demand sampled by inversion: one uniform draw per
/// period, in period order, mapped through that period's quantile function.
#[derive(Debug, Clone, PartialEq)]
pub struct IndependentDemand {
    periods: Vec<PeriodDemand>,
}

impl IndependentDemand {
    pub fn new(periods: Vec<PeriodDemand>) -> Self {
        Self { periods }
    }

    pub fn normal(means: &[f64], std_devs: &[f64]) -> Result<Self, DemandError> {
        if means.len() != std_devs.len() {
            return Err(DemandError::LengthMismatch {
                expected: means.len(),
                actual: std_devs.len(),
            });
        }
        means
            .iter()
            .zip(std_devs)
            .map(|(&m, &s)| PeriodDemand::normal(m, s))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    /// Normal demand whose standard deviation is `cv` times the period mean.
    pub fn normal_with_cv(means: &[f64], cv: f64) -> Result<Self, DemandError> {
        let std_devs: Vec<f64> = means.iter().map(|m| m * cv).collect();
        Self::normal(means, &std_devs)
    }

    pub fn poisson(means: &[f64]) -> Result<Self, DemandError> {
        means
            .iter()
            .map(|&m| PeriodDemand::poisson(m))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    pub fn periods(&self) -> &[PeriodDemand] {
        &self.periods
    }

    pub fn expected_demand(&self) -> Vec<f64> {
        self.periods.iter().map(PeriodDemand::mean).collect()
    }
}

impl DemandSampler for IndependentDemand {
    fn horizon(&self) -> usize {
        self.periods.len()
    }

    fn fill<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut [f64]) {
        for (slot, period) in out.iter_mut().zip(&self.periods) {
            let u: f64 = rng.gen();
            *slot = period.inverse_cdf(u);
        }
    }
}

/// Per-period demand drawn straight from `rand_distr` distributions.
///
/// Useful for families without a closed-form quantile (Gamma, LogNormal, ...).
#[derive(Debug, Clone)]
pub struct DistributionDemand<D> {
    periods: Vec<D>,
}

impl<D> DistributionDemand<D>
where
    D: Distribution<f64> + Sync,
{
    pub fn new(periods: Vec<D>) -> Self {
        Self { periods }
    }
}

impl DistributionDemand<Normal<f64>> {
    pub fn normal(means: &[f64], std_devs: &[f64]) -> Result<Self, DemandError> {
        if means.len() != std_devs.len() {
            return Err(DemandError::LengthMismatch {
                expected: means.len(),
                actual: std_devs.len(),
            });
        }
        let periods = means
            .iter()
            .zip(std_devs)
            .map(|(&m, &s)| Normal::new(m, s).map_err(|e| DemandError::Distribution(e.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(periods))
    }
}

impl<D> DemandSampler for DistributionDemand<D>
where
    D: Distribution<f64> + Sync,
{
    fn horizon(&self) -> usize {
        self.periods.len()
    }

    fn fill<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut [f64]) {
        for (slot, dist) in out.iter_mut().zip(&self.periods) {
            *slot = dist.sample(rng);
        }
    }
}

/// Replays the same realization on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedDemand {
    values: Vec<f64>,
}

impl FixedDemand {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn constant(horizon: usize, value: f64) -> Self {
        Self::new(vec![value; horizon])
    }
}

impl DemandSampler for FixedDemand {
    fn horizon(&self) -> usize {
        self.values.len()
    }

    fn fill<R: Rng + ?Sized>(&self, _rng: &mut R, out: &mut [f64]) {
        out.copy_from_slice(&self.values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rand_distr::Gamma;

    #[test]
    fn independent_demand_is_reproducible_for_a_seed() {
        let sampler = IndependentDemand::normal(&[110.0, 40.0, 10.0], &[22.0, 8.0, 2.0]).unwrap();
        let mut a = ChaCha8Rng::seed_from_u64(11);
        let mut b = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..20 {
            assert_eq!(sampler.realize(&mut a), sampler.realize(&mut b));
        }
    }

    #[test]
    fn independent_normal_sample_mean_tracks_expectation() {
        let sampler = IndependentDemand::normal_with_cv(&[10.0, 20.0, 30.0, 40.0], 0.25).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let n = 20_000;
        let mut sums = vec![0.0; sampler.horizon()];
        for _ in 0..n {
            for (s, d) in sums.iter_mut().zip(sampler.realize(&mut rng)) {
                *s += d;
            }
        }
        for (sum, expected) in sums.iter().zip(sampler.expected_demand()) {
            let mean = sum / n as f64;
            // sd of the mean is expected * 0.25 / sqrt(n) < 0.1
            assert!((mean - expected).abs() < 0.5, "mean {mean} vs {expected}");
        }
    }

    #[test]
    fn poisson_demand_is_integral() {
        let sampler = IndependentDemand::poisson(&[10.0, 20.0]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..100 {
            for d in sampler.realize(&mut rng) {
                assert_eq!(d.fract(), 0.0);
                assert!(d >= 0.0);
            }
        }
    }

    #[test]
    fn distribution_demand_wraps_rand_distr() {
        let sampler = DistributionDemand::new(vec![Gamma::new(4.0, 2.5).unwrap(); 3]);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let draws = sampler.realize(&mut rng);
        assert_eq!(draws.len(), 3);
        assert!(draws.iter().all(|d| *d > 0.0));
    }

    #[test]
    fn normal_distribution_demand_rejects_bad_spread() {
        assert!(DistributionDemand::normal(&[1.0], &[f64::NAN]).is_err());
        assert!(matches!(
            DistributionDemand::normal(&[1.0, 2.0], &[1.0]),
            Err(DemandError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn fixed_demand_replays() {
        let sampler = FixedDemand::new(vec![4.0, 3.0]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(sampler.realize(&mut rng), vec![4.0, 3.0]);
        assert_eq!(sampler.realize(&mut rng), vec![4.0, 3.0]);
    }
}
