// src/simulation/path.rs

use std::ops::AddAssign;

use serde::Serialize;

use crate::demand::DemandSampler;
use crate::error::EvalError;
use crate::model::{CostParameters, Policy, PolicyError};

/// Total path cost split by source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub ordering: f64,
    pub purchasing: f64,
    pub holding: f64,
    pub penalty: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.ordering + self.purchasing + self.holding + self.penalty
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            ordering: self.ordering * factor,
            purchasing: self.purchasing * factor,
            holding: self.holding * factor,
            penalty: self.penalty * factor,
        }
    }
}

impl AddAssign for CostBreakdown {
    fn add_assign(&mut self, rhs: Self) {
        self.ordering += rhs.ordering;
        self.purchasing += rhs.purchasing;
        self.holding += rhs.holding;
        self.penalty += rhs.penalty;
    }
}

/// Result of replaying one demand realization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathOutcome {
    pub total_cost: f64,
    pub breakdown: CostBreakdown,
    /// End-of-period stock on hand, `max(stock, 0)`.
    pub on_hand: Vec<f64>,
    /// End-of-period backorder magnitude, `max(-stock, 0)`.
    pub backorders: Vec<f64>,
}

/// Checks that policy and costs cover the same horizon, and that `horizon`
/// (a demand realization or a sampler) matches it.
pub fn check_dimensions(
    policy: &Policy,
    costs: &CostParameters,
    horizon: usize,
) -> Result<usize, EvalError> {
    costs.validate()?;
    if costs.horizon() != policy.horizon() {
        return Err(PolicyError::LengthMismatch {
            field: "unit_cost",
            expected: policy.horizon(),
            actual: costs.horizon(),
        }
        .into());
    }
    if horizon != policy.horizon() {
        return Err(EvalError::RealizationLength {
            expected: policy.horizon(),
            actual: horizon,
        });
    }
    Ok(horizon)
}

/// [`check_dimensions`] against a sampler's horizon, reporting a disagreement
/// as [`EvalError::HorizonMismatch`].
pub(crate) fn check_sampler<S>(
    policy: &Policy,
    costs: &CostParameters,
    sampler: &S,
) -> Result<usize, EvalError>
where
    S: DemandSampler,
{
    check_dimensions(policy, costs, sampler.horizon()).map_err(|err| match err {
        EvalError::RealizationLength { expected, actual } => EvalError::HorizonMismatch {
            policy: expected,
            sampler: actual,
        },
        other => other,
    })
}

/// Replays one demand realization through the policy.
///
/// Fails before simulating anything if the vectors disagree in length.
pub fn simulate_path(
    policy: &Policy,
    costs: &CostParameters,
    demand: &[f64],
) -> Result<PathOutcome, EvalError> {
    let horizon = check_dimensions(policy, costs, demand.len())?;
    let mut on_hand = vec![0.0; horizon];
    let mut backorders = vec![0.0; horizon];
    let (total_cost, breakdown) = replay(policy, costs, demand, &mut on_hand, &mut backorders);
    Ok(PathOutcome {
        total_cost,
        breakdown,
        on_hand,
        backorders,
    })
}

/// Per-period state transition over the whole horizon. Lengths must already agree.
///
/// Returns the total cost (accumulated in period order) and its breakdown.
pub(crate) fn replay(
    policy: &Policy,
    costs: &CostParameters,
    demand: &[f64],
    on_hand: &mut [f64],
    backorders: &mut [f64],
) -> (f64, CostBreakdown) {
    let mut cost = 0.0;
    let mut breakdown = CostBreakdown::default();
    let mut stock = costs.initial_stock;

    let periods = policy
        .order()
        .iter()
        .zip(policy.target_level())
        .zip(&costs.unit_cost)
        .zip(demand);

    for (period, (((&order, &target), &unit_cost), &realized)) in periods.enumerate() {
        if order {
            // the fixed cost is paid even when stock already sits above the target
            let purchase = (target - stock).max(0.0) * unit_cost;
            cost += costs.fixed_order_cost;
            cost += purchase;
            breakdown.ordering += costs.fixed_order_cost;
            breakdown.purchasing += purchase;
            stock = stock.max(target) - realized;
        } else {
            stock -= realized;
        }

        let holding = stock.max(0.0) * costs.holding_cost_rate;
        let penalty = (-stock).max(0.0) * costs.penalty_cost_rate;
        cost += holding;
        cost += penalty;
        breakdown.holding += holding;
        breakdown.penalty += penalty;

        on_hand[period] = stock.max(0.0);
        backorders[period] = (-stock).max(0.0);
    }

    (cost, breakdown)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() <= tol, "expected {b}, got {a}");
    }

    fn two_period_costs() -> CostParameters {
        CostParameters::new(1.0, 1.0, 5.0, vec![1.0, 1.0], 0.0).unwrap()
    }

    #[test]
    fn order_then_coast() {
        let policy = Policy::new(vec![true, false], vec![10.0, 0.0]).unwrap();
        let outcome = simulate_path(&policy, &two_period_costs(), &[4.0, 3.0]).unwrap();

        assert_eq!(outcome.total_cost, 20.0);
        assert_eq!(outcome.on_hand, vec![6.0, 3.0]);
        assert_eq!(outcome.backorders, vec![0.0, 0.0]);
        assert_eq!(
            outcome.breakdown,
            CostBreakdown {
                ordering: 1.0,
                purchasing: 10.0,
                holding: 9.0,
                penalty: 0.0
            }
        );
    }

    #[test]
    fn empty_horizon_costs_nothing() {
        let policy = Policy::new(vec![], vec![]).unwrap();
        let costs = CostParameters::new(100.0, 1.0, 1.0, vec![], 50.0).unwrap();
        let outcome = simulate_path(&policy, &costs, &[]).unwrap();
        assert_eq!(outcome.total_cost, 0.0);
        assert!(outcome.on_hand.is_empty());
        assert!(outcome.backorders.is_empty());
    }

    #[test]
    fn backorders_accrue_penalty() {
        let policy = Policy::never_order(3);
        let costs = CostParameters::new(10.0, 0.5, 4.0, vec![2.0; 3], 5.0).unwrap();
        let outcome = simulate_path(&policy, &costs, &[3.0, 4.0, 2.0]).unwrap();

        // stock: 2, -2, -4
        assert_eq!(outcome.on_hand, vec![2.0, 0.0, 0.0]);
        assert_eq!(outcome.backorders, vec![0.0, 2.0, 4.0]);
        approx_eq(outcome.total_cost, 2.0 * 0.5 + 2.0 * 4.0 + 4.0 * 4.0, 1e-12);
        assert_eq!(outcome.breakdown.ordering, 0.0);
        assert_eq!(outcome.breakdown.purchasing, 0.0);
    }

    #[test]
    fn target_below_stock_charges_fixed_cost_only() {
        let policy = Policy::new(vec![true], vec![5.0]).unwrap();
        let costs = CostParameters::new(7.0, 1.0, 3.0, vec![2.0], 12.0).unwrap();
        let outcome = simulate_path(&policy, &costs, &[4.0]).unwrap();

        assert_eq!(outcome.breakdown.ordering, 7.0);
        assert_eq!(outcome.breakdown.purchasing, 0.0);
        // post-order stock stays at 12, not 5
        assert_eq!(outcome.on_hand, vec![8.0]);
        assert_eq!(outcome.total_cost, 7.0 + 8.0);
    }

    #[test]
    fn ordering_clears_carried_backorders() {
        let policy = Policy::new(vec![false, true], vec![0.0, 10.0]).unwrap();
        let costs = CostParameters::new(2.0, 1.0, 3.0, vec![1.0, 1.5], 0.0).unwrap();
        let outcome = simulate_path(&policy, &costs, &[4.0, 6.0]).unwrap();

        // period 0: stock -4, penalty 12
        // period 1: buy 14 at 1.5, stock 10 - 6 = 4, holding 4
        approx_eq(outcome.breakdown.purchasing, 21.0, 1e-12);
        approx_eq(outcome.total_cost, 12.0 + 2.0 + 21.0 + 4.0, 1e-12);
        assert_eq!(outcome.backorders, vec![4.0, 0.0]);
    }

    #[test]
    fn breakdown_sums_to_total() {
        let policy =
            Policy::new(vec![true, false, true, true], vec![30.0, 0.0, 25.0, 5.0]).unwrap();
        let costs = CostParameters::new(4.5, 0.3, 6.0, vec![1.1, 0.9, 1.3, 0.7], -3.0).unwrap();
        let outcome = simulate_path(&policy, &costs, &[12.3, 19.1, 8.8, 14.0]).unwrap();
        approx_eq(outcome.breakdown.total(), outcome.total_cost, 1e-9);
    }

    #[test]
    fn rejects_short_demand() {
        let policy = Policy::never_order(3);
        let costs = CostParameters::new(0.0, 1.0, 1.0, vec![0.0; 3], 0.0).unwrap();
        assert!(matches!(
            simulate_path(&policy, &costs, &[1.0, 2.0]),
            Err(EvalError::RealizationLength {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn rejects_unit_cost_horizon_mismatch() {
        let policy = Policy::never_order(2);
        let costs = CostParameters::new(0.0, 1.0, 1.0, vec![0.0; 3], 0.0).unwrap();
        assert!(matches!(
            simulate_path(&policy, &costs, &[1.0, 2.0]),
            Err(EvalError::Policy(PolicyError::LengthMismatch {
                field: "unit_cost",
                ..
            }))
        ));
    }
}
