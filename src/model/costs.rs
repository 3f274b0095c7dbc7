// src/model/costs.rs

use serde::{Deserialize, Serialize};

use crate::model::policy::PolicyError;

/// Cost structure of the lot-sizing problem.
///
/// Fixed ordering cost is charged per placed order, the unit cost per unit purchased
/// (it may vary by period), holding per unit on hand at the end of a period and
/// penalty per unit backordered at the end of a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostParameters {
    pub fixed_order_cost: f64,
    pub holding_cost_rate: f64,
    pub penalty_cost_rate: f64,
    pub unit_cost: Vec<f64>,
    /// Net inventory at the start of the horizon. Negative means backorders are carried in.
    pub initial_stock: f64,
}

impl CostParameters {
    pub fn new(
        fixed_order_cost: f64,
        holding_cost_rate: f64,
        penalty_cost_rate: f64,
        unit_cost: Vec<f64>,
        initial_stock: f64,
    ) -> Result<Self, PolicyError> {
        let costs = Self {
            fixed_order_cost,
            holding_cost_rate,
            penalty_cost_rate,
            unit_cost,
            initial_stock,
        };
        costs.validate()?;
        Ok(costs)
    }

    /// Same purchase price in every period.
    pub fn with_constant_unit_cost(
        horizon: usize,
        fixed_order_cost: f64,
        holding_cost_rate: f64,
        penalty_cost_rate: f64,
        unit_cost: f64,
        initial_stock: f64,
    ) -> Result<Self, PolicyError> {
        Self::new(
            fixed_order_cost,
            holding_cost_rate,
            penalty_cost_rate,
            vec![unit_cost; horizon],
            initial_stock,
        )
    }

    pub fn horizon(&self) -> usize {
        self.unit_cost.len()
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        for (field, value) in [
            ("fixed_order_cost", self.fixed_order_cost),
            ("holding_cost_rate", self.holding_cost_rate),
            ("penalty_cost_rate", self.penalty_cost_rate),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PolicyError::InvalidCost { field, value });
            }
        }
        if let Some((period, &value)) = self
            .unit_cost
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(PolicyError::InvalidRate {
                field: "unit_cost",
                period,
                value,
            });
        }
        if !self.initial_stock.is_finite() {
            return Err(PolicyError::InvalidInitialStock {
                value: self.initial_stock,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_unit_cost_fills_horizon() {
        let costs = CostParameters::with_constant_unit_cost(4, 30.0, 1.0, 5.0, 0.0, 0.0).unwrap();
        assert_eq!(costs.unit_cost, vec![0.0; 4]);
        assert_eq!(costs.horizon(), 4);
    }

    #[test]
    fn rejects_negative_rates() {
        assert!(matches!(
            CostParameters::new(1.0, -0.5, 5.0, vec![1.0], 0.0),
            Err(PolicyError::InvalidCost {
                field: "holding_cost_rate",
                ..
            })
        ));
        assert!(matches!(
            CostParameters::new(1.0, 0.5, 5.0, vec![1.0, -2.0], 0.0),
            Err(PolicyError::InvalidRate { period: 1, .. })
        ));
    }

    #[test]
    fn negative_initial_stock_is_allowed() {
        assert!(CostParameters::new(0.0, 1.0, 2.0, vec![], -15.0).is_ok());
        assert!(CostParameters::new(0.0, 1.0, 2.0, vec![], f64::NAN).is_err());
    }
}
