// src/error.rs

use thiserror::Error;

use crate::demand::DemandError;
use crate::model::PolicyError;
use crate::simulation::config::ConfigError;

/// Crate-level error for evaluation and its input/output surfaces.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Demand(#[from] DemandError),
    #[error("demand sampler covers {sampler} periods but the policy has {policy}")]
    HorizonMismatch { policy: usize, sampler: usize },
    #[error("demand realization has {actual} periods, expected {expected}")]
    RealizationLength { expected: usize, actual: usize },
    #[error("scenario file has no periods")]
    EmptyScenario,
    #[error("scenario row {row}: expected period {expected}, found {found}")]
    ScenarioPeriodOrder {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
