//! Sequential Monte Carlo evaluation of periodic-review order-up-to policies
//! under backordered stochastic demand.
//!
//! A [`Policy`] says in which periods an order is placed and the level stock is
//! raised to. [`simulate_path`] replays one demand realization through it;
//! [`SequentialEvaluator`] repeats that with fresh draws until the confidence
//! interval on expected cost is tight relative to its center.

pub mod cli;
pub mod demand;
pub mod error;
pub mod io;
pub mod model;
pub mod simulation;
pub mod stats;

pub use demand::{DemandSampler, IndependentDemand, PeriodDemand};
pub use error::EvalError;
pub use model::{CostParameters, Policy};
pub use simulation::{
    simulate_path, CancelToken, Evaluation, EvaluatorConfig, ParallelEvaluator,
    SequentialEvaluator, Termination,
};
pub use stats::{ConfidenceInterval, Tally};
