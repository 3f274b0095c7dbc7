// src/simulation/config.rs

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("confidence_level must lie strictly between 0 and 1 (got {0})")]
    ConfidenceLevel(f64),
    #[error("{field} must be finite and non-negative (got {value})")]
    Precision { field: &'static str, value: f64 },
    #[error("max_replications ({max}) must exceed warmup_replications ({warmup})")]
    ReplicationCeiling { max: u64, warmup: u64 },
}

/// Knobs of the sequential stopping rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Coverage of the reported interval; sets the z-value.
    pub confidence_level: f64,
    /// Stop once `half_width < relative_precision * |center|`.
    pub relative_precision: f64,
    /// Replications run before the stopping rule is consulted.
    pub warmup_replications: u64,
    /// Stop once `half_width <= absolute_precision`. Zero only fires on a zero-variance cost.
    pub absolute_precision: f64,
    /// Hard ceiling on the total number of replications.
    pub max_replications: u64,
    /// Precision-phase replications between progress log lines.
    pub progress_interval: u64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            relative_precision: 0.0001,
            warmup_replications: 1000,
            absolute_precision: 0.0,
            max_replications: 100_000_000,
            progress_interval: 10_000,
        }
    }
}

impl EvaluatorConfig {
    pub fn with_confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    pub fn with_relative_precision(mut self, precision: f64) -> Self {
        self.relative_precision = precision;
        self
    }

    pub fn with_warmup_replications(mut self, warmup: u64) -> Self {
        self.warmup_replications = warmup;
        self
    }

    pub fn with_absolute_precision(mut self, precision: f64) -> Self {
        self.absolute_precision = precision;
        self
    }

    pub fn with_max_replications(mut self, max: u64) -> Self {
        self.max_replications = max;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ConfigError::ConfidenceLevel(self.confidence_level));
        }
        for (field, value) in [
            ("relative_precision", self.relative_precision),
            ("absolute_precision", self.absolute_precision),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Precision { field, value });
            }
        }
        if self.max_replications <= self.warmup_replications {
            return Err(ConfigError::ReplicationCeiling {
                max: self.max_replications,
                warmup: self.warmup_replications,
            });
        }
        Ok(())
    }
}
