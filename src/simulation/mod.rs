pub mod config;
pub mod evaluator;
pub mod parallel;
pub mod path;

pub use config::{ConfigError, EvaluatorConfig};
pub use evaluator::{CancelToken, Evaluation, SequentialEvaluator, Termination};
pub use parallel::{split_evenly, ParallelEvaluator};
pub use path::{check_dimensions, simulate_path, CostBreakdown, PathOutcome};
