pub mod normal;
pub mod tally;

pub use normal::{standard_normal_quantile, two_sided_z};
pub use tally::{ConfidenceInterval, Tally};
