// src/io/scenario.rs

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::demand::{IndependentDemand, PeriodDemand};
use crate::error::EvalError;
use crate::model::{CostParameters, Policy};

/// One row of a scenario file.
///
/// ```text
/// period,order,target_level,unit_cost,demand_mean,demand_std_dev
/// 0,true,128.5,5.6,110,22
/// 1,false,0,4.2,40,8
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioRow {
    pub period: usize,
    pub order: bool,
    pub target_level: f64,
    pub unit_cost: f64,
    pub demand_mean: f64,
    pub demand_std_dev: f64,
}

/// Per-period inputs read from a scenario file. Scalar costs are supplied separately.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub policy: Policy,
    pub unit_cost: Vec<f64>,
    pub demand: IndependentDemand,
}

impl Scenario {
    pub fn horizon(&self) -> usize {
        self.policy.horizon()
    }

    pub fn costs(
        &self,
        fixed_order_cost: f64,
        holding_cost_rate: f64,
        penalty_cost_rate: f64,
        initial_stock: f64,
    ) -> Result<CostParameters, EvalError> {
        Ok(CostParameters::new(
            fixed_order_cost,
            holding_cost_rate,
            penalty_cost_rate,
            self.unit_cost.clone(),
            initial_stock,
        )?)
    }
}

pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<Scenario, EvalError> {
    let file = std::fs::File::open(path)?;
    read_scenario(file)
}

/// Parses scenario rows. Periods must be listed in order starting at 0.
/// A zero standard deviation makes that period's demand deterministic.
pub fn read_scenario<R: Read>(reader: R) -> Result<Scenario, EvalError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut order = Vec::new();
    let mut target_level = Vec::new();
    let mut unit_cost = Vec::new();
    let mut periods = Vec::new();

    for (row_index, record) in rdr.deserialize::<ScenarioRow>().enumerate() {
        let row = record?;
        if row.period != row_index {
            return Err(EvalError::ScenarioPeriodOrder {
                row: row_index + 1,
                expected: row_index,
                found: row.period,
            });
        }
        order.push(row.order);
        target_level.push(row.target_level);
        unit_cost.push(row.unit_cost);
        periods.push(if row.demand_std_dev == 0.0 {
            PeriodDemand::deterministic(row.demand_mean)?
        } else {
            PeriodDemand::normal(row.demand_mean, row.demand_std_dev)?
        });
    }

    if order.is_empty() {
        return Err(EvalError::EmptyScenario);
    }

    Ok(Scenario {
        policy: Policy::new(order, target_level)?,
        unit_cost,
        demand: IndependentDemand::new(periods),
    })
}
