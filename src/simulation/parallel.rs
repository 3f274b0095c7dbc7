// src/simulation/parallel.rs

//! Batched evaluation across a Rayon thread pool.
//!
//! Every worker owns a `ChaCha8Rng` stream and a private [`RunningEstimate`];
//! batches are merged in worker order, so a fixed seed, worker count and batch
//! size always give the same result. The stopping rule is checked after each
//! round of batches rather than after every replication, so a run may overshoot
//! the sequential stopping point by at most one round.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{debug, info};

use crate::demand::DemandSampler;
use crate::error::EvalError;
use crate::model::{CostParameters, Policy};
use crate::simulation::config::EvaluatorConfig;
use crate::simulation::evaluator::{
    log_termination, CancelToken, Evaluation, PathScratch, RunningEstimate, StoppingRule,
    Termination,
};
use crate::simulation::path::check_sampler;

/// Split `total` replications over `parts` workers, as evenly as possible.
/// Earlier workers take the remainder.
pub fn split_evenly(total: u64, parts: usize) -> Vec<u64> {
    if parts == 0 {
        return Vec::new();
    }
    let base = total / parts as u64;
    let remainder = (total % parts as u64) as usize;
    (0..parts)
        .map(|i| base + u64::from(i < remainder))
        .collect()
}

struct Worker {
    rng: ChaCha8Rng,
    scratch: PathScratch,
}

/// Parallel counterpart of [`SequentialEvaluator`](crate::simulation::evaluator::SequentialEvaluator).
#[derive(Debug, Clone)]
pub struct ParallelEvaluator {
    config: EvaluatorConfig,
    /// Worker threads; 0 uses Rayon's global pool (all cores).
    workers: usize,
    /// Precision-phase replications per worker per round.
    batch_size: u64,
    cancel: Option<CancelToken>,
}

impl Default for ParallelEvaluator {
    fn default() -> Self {
        Self::new(EvaluatorConfig::default())
    }
}

impl ParallelEvaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self {
            config,
            workers: 0,
            batch_size: 256,
            cancel: None,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn evaluate<S>(
        &self,
        policy: &Policy,
        costs: &CostParameters,
        sampler: &S,
        seed: u64,
    ) -> Result<Evaluation, EvalError>
    where
        S: DemandSampler,
    {
        self.config.validate()?;
        let horizon = check_sampler(policy, costs, sampler)?;

        if self.workers == 0 {
            Ok(self.run(policy, costs, sampler, seed, horizon))
        } else {
            let pool = ThreadPoolBuilder::new().num_threads(self.workers).build()?;
            Ok(pool.install(|| self.run(policy, costs, sampler, seed, horizon)))
        }
    }

    fn run<S>(
        &self,
        policy: &Policy,
        costs: &CostParameters,
        sampler: &S,
        seed: u64,
        horizon: usize,
    ) -> Evaluation
    where
        S: DemandSampler,
    {
        let config = &self.config;
        let streams = rayon::current_num_threads().max(1);
        info!(
            horizon,
            streams,
            batch_size = self.batch_size,
            warmup = config.warmup_replications,
            "starting parallel evaluation"
        );

        let mut workers: Vec<Worker> = (0..streams)
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                rng.set_stream(i as u64);
                Worker {
                    rng,
                    scratch: PathScratch::new(horizon),
                }
            })
            .collect();

        let rule = StoppingRule::new(config);
        let mut estimate = RunningEstimate::new(horizon);

        if self.is_cancelled() {
            return self.finish(estimate, Termination::Cancelled);
        }
        let warmup = split_evenly(config.warmup_replications, streams);
        self.round(&mut workers, &warmup, policy, costs, sampler, &mut estimate);
        debug!(
            replications = estimate.replications(),
            mean = estimate.cost.average(),
            "warm-up complete"
        );

        let termination = loop {
            if self.is_cancelled() {
                break Termination::Cancelled;
            }
            let remaining = config.max_replications.saturating_sub(estimate.replications());
            if remaining == 0 {
                break Termination::ReplicationCeiling;
            }

            let round_total = remaining.min(self.batch_size.saturating_mul(streams as u64));
            let sizes = split_evenly(round_total, streams);
            self.round(&mut workers, &sizes, policy, costs, sampler, &mut estimate);

            if let Some(reason) = rule.check(&estimate.cost) {
                break reason;
            }
            let ci = estimate.interval(config.confidence_level);
            debug!(
                replications = estimate.replications(),
                center = ci.center,
                half_width = ci.half_width,
                "precision round"
            );
        };

        self.finish(estimate, termination)
    }

    /// Runs `sizes[i]` replications on worker `i` and merges the batches in worker order.
    fn round<S>(
        &self,
        workers: &mut [Worker],
        sizes: &[u64],
        policy: &Policy,
        costs: &CostParameters,
        sampler: &S,
        estimate: &mut RunningEstimate,
    ) where
        S: DemandSampler,
    {
        let horizon = policy.horizon();
        let batches: Vec<RunningEstimate> = workers
            .par_iter_mut()
            .zip(sizes.par_iter())
            .map(|(worker, &size)| {
                let mut batch = RunningEstimate::new(horizon);
                for _ in 0..size {
                    worker
                        .scratch
                        .replicate(policy, costs, sampler, &mut worker.rng, &mut batch);
                }
                batch
            })
            .collect();

        for batch in &batches {
            estimate.merge(batch);
        }
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
