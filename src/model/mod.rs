pub mod costs;
pub mod policy;

pub use costs::CostParameters;
pub use policy::{PeriodDecision, Policy, PolicyError};
