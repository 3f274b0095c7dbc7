// src/model/policy.rs

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    #[error("{field} has {actual} periods, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{field}[{period}] must be finite and non-negative (got {value})")]
    InvalidRate {
        field: &'static str,
        period: usize,
        value: f64,
    },
    #[error("{field} must be finite and non-negative (got {value})")]
    InvalidCost { field: &'static str, value: f64 },
    #[error("target_level[{period}] must be finite (got {value})")]
    InvalidTarget { period: usize, value: f64 },
    #[error("initial_stock must be finite (got {value})")]
    InvalidInitialStock { value: f64 },
}

/// One decision of a periodic-review order-up-to policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodDecision {
    pub order: bool,
    /// Order-up-to level; only read when `order` is set.
    pub target_level: f64,
}

/// A replenishment plan over the whole horizon: in which periods to review,
/// and the level to raise stock to when reviewing.
///
/// The order flags and levels always have the same length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Policy {
    order: Vec<bool>,
    target_level: Vec<f64>,
}

impl Policy {
    pub fn new(order: Vec<bool>, target_level: Vec<f64>) -> Result<Self, PolicyError> {
        if order.len() != target_level.len() {
            return Err(PolicyError::LengthMismatch {
                field: "target_level",
                expected: order.len(),
                actual: target_level.len(),
            });
        }
        for (period, (&ordered, &level)) in order.iter().zip(&target_level).enumerate() {
            // levels of non-order periods are placeholders and never read
            if ordered && !level.is_finite() {
                return Err(PolicyError::InvalidTarget {
                    period,
                    value: level,
                });
            }
        }
        Ok(Self {
            order,
            target_level,
        })
    }

    pub fn from_decisions(decisions: &[PeriodDecision]) -> Result<Self, PolicyError> {
        Self::new(
            decisions.iter().map(|d| d.order).collect(),
            decisions.iter().map(|d| d.target_level).collect(),
        )
    }

    /// A policy that never orders.
    pub fn never_order(horizon: usize) -> Self {
        Self {
            order: vec![false; horizon],
            target_level: vec![0.0; horizon],
        }
    }

    pub fn horizon(&self) -> usize {
        self.order.len()
    }

    pub fn order(&self) -> &[bool] {
        &self.order
    }

    pub fn target_level(&self) -> &[f64] {
        &self.target_level
    }

    pub fn decision(&self, period: usize) -> Option<PeriodDecision> {
        Some(PeriodDecision {
            order: *self.order.get(period)?,
            target_level: self.target_level[period],
        })
    }

    /// Number of periods in which an order is placed.
    pub fn review_count(&self) -> usize {
        self.order.iter().filter(|&&o| o).count()
    }
}
