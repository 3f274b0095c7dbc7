// src/simulation/evaluator.rs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::demand::DemandSampler;
use crate::error::EvalError;
use crate::model::{CostParameters, Policy};
use crate::simulation::config::EvaluatorConfig;
use crate::simulation::path::{check_sampler, replay, CostBreakdown};
use crate::stats::{ConfidenceInterval, Tally};

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Termination {
    /// `half_width < relative_precision * |center|`.
    Converged,
    /// `half_width <= absolute_precision`.
    AbsolutePrecision,
    /// `max_replications` reached before either precision test held.
    ReplicationCeiling,
    /// A [`CancelToken`] was raised between replications.
    Cancelled,
}

/// Shared flag checked between replications.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Final estimate of a policy's expected cost.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Normal-approximation interval for the expected total cost. The half-width is
    /// infinite when fewer than two replications ran (cancelled during warm-up).
    pub interval: ConfidenceInterval,
    pub replications: u64,
    pub termination: Termination,
    pub cost_std_dev: Option<f64>,
    /// Mean cost per source over all replications.
    pub mean_breakdown: CostBreakdown,
    /// Per-period average end-of-period stock on hand.
    pub avg_on_hand: Vec<f64>,
    /// Per-period average end-of-period backorder magnitude.
    pub avg_backorders: Vec<f64>,
}

/// Sufficient statistics folded in once per completed replication.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RunningEstimate {
    pub(crate) cost: Tally,
    breakdown: CostBreakdown,
    on_hand: Vec<Tally>,
    backorders: Vec<Tally>,
}

impl RunningEstimate {
    pub(crate) fn new(horizon: usize) -> Self {
        Self {
            cost: Tally::new(),
            breakdown: CostBreakdown::default(),
            on_hand: vec![Tally::new(); horizon],
            backorders: vec![Tally::new(); horizon],
        }
    }

    pub(crate) fn replications(&self) -> u64 {
        self.cost.count()
    }

    fn record(&mut self, cost: f64, breakdown: CostBreakdown, on_hand: &[f64], backorders: &[f64]) {
        self.cost.add(cost);
        self.breakdown += breakdown;
        for (tally, v) in self.on_hand.iter_mut().zip(on_hand) {
            tally.add(*v);
        }
        for (tally, v) in self.backorders.iter_mut().zip(backorders) {
            tally.add(*v);
        }
    }

    /// Folds a disjoint batch of replications into this estimate.
    pub(crate) fn merge(&mut self, other: &RunningEstimate) {
        self.cost.merge(&other.cost);
        self.breakdown += other.breakdown;
        for (a, b) in self.on_hand.iter_mut().zip(&other.on_hand) {
            a.merge(b);
        }
        for (a, b) in self.backorders.iter_mut().zip(&other.backorders) {
            a.merge(b);
        }
    }

    pub(crate) fn interval(&self, level: f64) -> ConfidenceInterval {
        self.cost
            .confidence_interval_normal(level)
            .unwrap_or(ConfidenceInterval {
                center: self.cost.average(),
                half_width: f64::INFINITY,
            })
    }

    pub(crate) fn into_evaluation(self, level: f64, termination: Termination) -> Evaluation {
        let n = self.replications();
        let mean_breakdown = if n == 0 {
            CostBreakdown::default()
        } else {
            self.breakdown.scaled(1.0 / n as f64)
        };
        Evaluation {
            interval: self.interval(level),
            replications: n,
            termination,
            cost_std_dev: self.cost.standard_deviation(),
            mean_breakdown,
            avg_on_hand: self.on_hand.iter().map(Tally::average).collect(),
            avg_backorders: self.backorders.iter().map(Tally::average).collect(),
        }
    }
}

/// Reusable buffers for one replication at a time.
#[derive(Debug, Clone)]
pub(crate) struct PathScratch {
    demand: Vec<f64>,
    on_hand: Vec<f64>,
    backorders: Vec<f64>,
}

impl PathScratch {
    pub(crate) fn new(horizon: usize) -> Self {
        Self {
            demand: vec![0.0; horizon],
            on_hand: vec![0.0; horizon],
            backorders: vec![0.0; horizon],
        }
    }

    /// Draws one realization, replays it and folds the result into `estimate`.
    pub(crate) fn replicate<S, R>(
        &mut self,
        policy: &Policy,
        costs: &CostParameters,
        sampler: &S,
        rng: &mut R,
        estimate: &mut RunningEstimate,
    ) where
        S: DemandSampler,
        R: Rng + ?Sized,
    {
        sampler.fill(rng, &mut self.demand);
        let (cost, breakdown) = replay(
            policy,
            costs,
            &self.demand,
            &mut self.on_hand,
            &mut self.backorders,
        );
        estimate.record(cost, breakdown, &self.on_hand, &self.backorders);
    }
}

/// Precision tests applied after each precision-phase replication.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StoppingRule {
    level: f64,
    relative: f64,
    absolute: f64,
}

impl StoppingRule {
    pub(crate) fn new(config: &EvaluatorConfig) -> Self {
        Self {
            level: config.confidence_level,
            relative: config.relative_precision,
            absolute: config.absolute_precision,
        }
    }

    /// `None` while the interval is undefined (fewer than two samples) or still too wide.
    pub(crate) fn check(&self, cost: &Tally) -> Option<Termination> {
        let ci = cost.confidence_interval_normal(self.level)?;
        if ci.half_width < ci.center.abs() * self.relative {
            Some(Termination::Converged)
        } else if ci.half_width <= self.absolute {
            Some(Termination::AbsolutePrecision)
        } else {
            None
        }
    }
}

pub(crate) fn log_termination(evaluation: &Evaluation) {
    let ci = evaluation.interval;
    info!(
        replications = evaluation.replications,
        center = ci.center,
        half_width = ci.half_width,
        termination = ?evaluation.termination,
        "evaluation finished"
    );
    if evaluation.termination != Termination::Converged {
        warn!(
            termination = ?evaluation.termination,
            "relative precision not reached; stopped by fallback rule"
        );
    }
}

/// Sequential Monte Carlo estimator of a policy's expected total cost.
///
/// Runs `warmup_replications` unconditionally, then one replication at a time
/// until the [`Termination`] rules fire.
#[derive(Debug, Clone, Default)]
pub struct SequentialEvaluator {
    config: EvaluatorConfig,
    cancel: Option<CancelToken>,
}

impl SequentialEvaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    pub fn evaluate<S, R>(
        &self,
        policy: &Policy,
        costs: &CostParameters,
        sampler: &S,
        rng: &mut R,
    ) -> Result<Evaluation, EvalError>
    where
        S: DemandSampler,
        R: Rng + ?Sized,
    {
        self.evaluate_observed(policy, costs, sampler, rng, |_, _| {})
    }

    /// Like [`evaluate`](Self::evaluate) with a reproducible `ChaCha8Rng` built from `seed`.
    pub fn evaluate_seeded<S>(
        &self,
        policy: &Policy,
        costs: &CostParameters,
        sampler: &S,
        seed: u64,
    ) -> Result<Evaluation, EvalError>
    where
        S: DemandSampler,
    {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.evaluate(policy, costs, sampler, &mut rng)
    }

    /// Like [`evaluate`](Self::evaluate), calling `observe(n, interval)` after every
    /// precision-phase replication.
    pub fn evaluate_observed<S, R, F>(
        &self,
        policy: &Policy,
        costs: &CostParameters,
        sampler: &S,
        rng: &mut R,
        mut observe: F,
    ) -> Result<Evaluation, EvalError>
    where
        S: DemandSampler,
        R: Rng + ?Sized,
        F: FnMut(u64, ConfidenceInterval),
    {
        self.config.validate()?;
        let horizon = check_sampler(policy, costs, sampler)?;

        let config = &self.config;
        info!(
            horizon,
            warmup = config.warmup_replications,
            confidence = config.confidence_level,
            precision = config.relative_precision,
            "starting sequential evaluation"
        );

        let rule = StoppingRule::new(config);
        let mut estimate = RunningEstimate::new(horizon);
        let mut scratch = PathScratch::new(horizon);

        for _ in 0..config.warmup_replications {
            if self.is_cancelled() {
                return Ok(self.finish(estimate, Termination::Cancelled));
            }
            scratch.replicate(policy, costs, sampler, rng, &mut estimate);
        }
        debug!(
            replications = estimate.replications(),
            mean = estimate.cost.average(),
            "warm-up complete"
        );

        let termination = loop {
            if self.is_cancelled() {
                break Termination::Cancelled;
            }
            if estimate.replications() >= config.max_replications {
                break Termination::ReplicationCeiling;
            }

            scratch.replicate(policy, costs, sampler, rng, &mut estimate);
            let n = estimate.replications();
            if let Some(ci) = estimate.cost.confidence_interval_normal(config.confidence_level) {
                observe(n, ci);
            }
            if let Some(reason) = rule.check(&estimate.cost) {
                break reason;
            }

            if config.progress_interval > 0 && n % config.progress_interval == 0 {
                let ci = estimate.interval(config.confidence_level);
                debug!(
                    replications = n,
                    center = ci.center,
                    half_width = ci.half_width,
                    "precision phase"
                );
            }
        };

        Ok(self.finish(estimate, termination))
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    fn finish(&self, estimate: RunningEstimate, termination: Termination) -> Evaluation {
        let evaluation = estimate.into_evaluation(self.config.confidence_level, termination);
        log_termination(&evaluation);
        evaluation
    }
}
