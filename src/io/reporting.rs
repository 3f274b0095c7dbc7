// src/io/reporting.rs

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::EvalError;
use crate::model::Policy;
use crate::simulation::Evaluation;

/// Per-period diagnostics of a finished evaluation, one CSV row each.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReport {
    pub period: usize,
    pub order: bool,
    pub target_level: f64,
    pub avg_on_hand: f64,
    pub avg_backorder: f64,
}

pub fn period_reports(policy: &Policy, evaluation: &Evaluation) -> Vec<PeriodReport> {
    policy
        .order()
        .iter()
        .zip(policy.target_level())
        .zip(evaluation.avg_on_hand.iter().zip(&evaluation.avg_backorders))
        .enumerate()
        .map(|(period, ((&order, &target_level), (&on_hand, &backorder)))| PeriodReport {
            period,
            order,
            target_level,
            avg_on_hand: on_hand,
            avg_backorder: backorder,
        })
        .collect()
}

/// Writes the per-period report to a CSV file.
pub fn write_period_report<P: AsRef<Path>>(
    path: P,
    rows: &[PeriodReport],
) -> Result<(), EvalError> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)?;
    write_period_report_to(file, rows)?;
    info!(rows = rows.len(), path = %path.display(), "exported period report");
    Ok(())
}

pub fn write_period_report_to<W: Write>(
    writer: W,
    rows: &[PeriodReport],
) -> Result<(), EvalError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Console summary: run count, then a tab-separated table of average on-hand
/// and backorder per period, to two decimals.
pub fn format_summary(evaluation: &Evaluation) -> String {
    let ci = evaluation.interval;
    let b = evaluation.mean_breakdown;
    let header: Vec<String> = (0..evaluation.avg_on_hand.len())
        .map(|i| format!("Period: {i}"))
        .collect();

    [
        format!("Simulation runs: {}", evaluation.replications),
        format!(
            "Expected cost: {:.4} +/- {:.4} ({:?})",
            ci.center, ci.half_width, evaluation.termination
        ),
        header.join("\t"),
        two_decimals(&evaluation.avg_on_hand),
        two_decimals(&evaluation.avg_backorders),
        format!(
            "Ordering: {:.2}  Purchasing: {:.2}  Holding: {:.2}  Penalty: {:.2}",
            b.ordering, b.purchasing, b.holding, b.penalty
        ),
    ]
    .join("\n")
}

fn two_decimals(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{v:.2}"))
        .collect::<Vec<_>>()
        .join("\t")
}
