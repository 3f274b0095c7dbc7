// src/stats/tally.rs

use serde::Serialize;

use crate::stats::normal::two_sided_z;

/// Center and half-width of a symmetric confidence interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    pub center: f64,
    pub half_width: f64,
}

impl ConfidenceInterval {
    pub fn lower(&self) -> f64 {
        self.center - self.half_width
    }

    pub fn upper(&self) -> f64 {
        self.center + self.half_width
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower() <= value && value <= self.upper()
    }
}

/// Running mean/variance accumulator (Welford).
///
/// Two tallies built from disjoint samples can be combined with [`Tally::merge`],
/// which gives the same statistics as feeding every sample into one tally.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tally {
    count: u64,
    mean: f64,
    m2: f64,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    /// Folds another tally into this one (Chan et al. pairwise update).
    pub fn merge(&mut self, other: &Tally) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        let n_a = self.count as f64;
        let n_b = other.count as f64;
        let total = n_a + n_b;
        let delta = other.mean - self.mean;
        self.mean += delta * n_b / total;
        self.m2 += other.m2 + delta * delta * n_a * n_b / total;
        self.count += other.count;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Sample mean; zero for an empty tally.
    pub fn average(&self) -> f64 {
        self.mean
    }

    /// Unbiased sample variance. `None` until two samples have been seen.
    pub fn variance(&self) -> Option<f64> {
        if self.count < 2 {
            return None;
        }
        Some((self.m2 / (self.count - 1) as f64).max(0.0))
    }

    pub fn standard_deviation(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }

    /// Normal-approximation interval for the mean at the given confidence level.
    ///
    /// `half_width = z * s / sqrt(n)`. `None` until two samples have been seen.
    pub fn confidence_interval_normal(&self, level: f64) -> Option<ConfidenceInterval> {
        let std_dev = self.standard_deviation()?;
        let half_width = two_sided_z(level) * std_dev / (self.count as f64).sqrt();
        Some(ConfidenceInterval {
            center: self.mean,
            half_width,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() <= tol, "expected {b}, got {a}");
    }

    #[test]
    fn mean_and_variance_of_small_sample() {
        let mut tally = Tally::new();
        for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            tally.add(v);
        }
        assert_eq!(tally.count(), 8);
        approx_eq(tally.average(), 5.0, 1e-12);
        // population variance is 4, sample variance 32/7
        approx_eq(tally.variance().unwrap(), 32.0 / 7.0, 1e-12);
    }

    #[test]
    fn interval_needs_two_samples() {
        let mut tally = Tally::new();
        assert!(tally.confidence_interval_normal(0.95).is_none());
        tally.add(3.0);
        assert!(tally.confidence_interval_normal(0.95).is_none());
        tally.add(5.0);
        let ci = tally.confidence_interval_normal(0.95).unwrap();
        approx_eq(ci.center, 4.0, 1e-12);
        // s = sqrt(2), n = 2
        approx_eq(ci.half_width, 1.959_963_985 * 2f64.sqrt() / 2f64.sqrt(), 1e-7);
    }

    #[test]
    fn constant_samples_give_zero_half_width() {
        let mut tally = Tally::new();
        for _ in 0..50 {
            tally.add(12.5);
        }
        let ci = tally.confidence_interval_normal(0.95).unwrap();
        approx_eq(ci.center, 12.5, 1e-12);
        approx_eq(ci.half_width, 0.0, 1e-12);
    }

    #[test]
    fn merge_matches_sequential_accumulation() {
        let values: Vec<f64> = (0..97).map(|i| ((i * 37) % 101) as f64 * 0.73 - 11.0).collect();

        let mut whole = Tally::new();
        values.iter().for_each(|v| whole.add(*v));

        let mut merged = Tally::new();
        for chunk in values.chunks(13) {
            let mut part = Tally::new();
            chunk.iter().for_each(|v| part.add(*v));
            merged.merge(&part);
        }

        assert_eq!(merged.count(), whole.count());
        approx_eq(merged.average(), whole.average(), 1e-10);
        approx_eq(merged.variance().unwrap(), whole.variance().unwrap(), 1e-8);
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let mut a = Tally::new();
        a.add(1.0);
        a.add(2.0);
        let before = a;
        a.merge(&Tally::new());
        assert_eq!(a, before);

        let mut empty = Tally::new();
        empty.merge(&before);
        assert_eq!(empty, before);
    }

    #[test]
    fn interval_bounds() {
        let ci = ConfidenceInterval {
            center: 10.0,
            half_width: 0.5,
        };
        assert!(ci.contains(9.5));
        assert!(ci.contains(10.5));
        assert!(!ci.contains(10.51));
    }
}
