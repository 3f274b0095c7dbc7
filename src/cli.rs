// src/cli.rs

use std::path::PathBuf;

use crate::simulation::EvaluatorConfig;

pub const USAGE: &str = "\
usage: backorder-sim [FLAGS]

  --scenario <csv>      per-period scenario (default: built-in 8-period instance)
  --report <csv>        write per-period averages to this file
  --seed <u64>          generator seed (default 1)
  --confidence <f64>    confidence level (default 0.95)
  --precision <f64>     relative precision (default 0.0001)
  --warmup <u64>        warm-up replications (default 1000)
  --max-runs <u64>      replication ceiling (default 100000000)
  --threads <usize>     evaluate in parallel on this many threads (0 = all cores)
  --fixed-cost <f64>    fixed ordering cost
  --holding <f64>       holding cost per unit and period
  --penalty <f64>       backorder penalty per unit and period
  --initial-stock <f64> stock at the start of the horizon";

/// Options of the command-line runner.
#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub seed: u64,
    pub threads: Option<usize>,
    pub config: EvaluatorConfig,
    pub fixed_order_cost: Option<f64>,
    pub holding_cost_rate: Option<f64>,
    pub penalty_cost_rate: Option<f64>,
    pub initial_stock: Option<f64>,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            scenario: None,
            report: None,
            seed: 1,
            threads: None,
            config: EvaluatorConfig::default(),
            fixed_order_cost: None,
            holding_cost_rate: None,
            penalty_cost_rate: None,
            initial_stock: None,
        }
    }
}

/// Parses `args` (program name first). Returns `Ok(None)` when help was requested.
pub fn parse_args(args: &[String]) -> Result<Option<CliOptions>, String> {
    let mut options = CliOptions::default();
    let mut iter = args.iter().skip(1);

    while let Some(flag) = iter.next() {
        if flag == "-h" || flag == "--help" {
            return Ok(None);
        }
        let value = iter
            .next()
            .ok_or_else(|| format!("missing value for {flag}"))?;
        match flag.as_str() {
            "--scenario" => options.scenario = Some(PathBuf::from(value)),
            "--report" => options.report = Some(PathBuf::from(value)),
            "--seed" => options.seed = parse_value(flag, value)?,
            "--threads" => options.threads = Some(parse_value(flag, value)?),
            "--confidence" => options.config.confidence_level = parse_value(flag, value)?,
            "--precision" => options.config.relative_precision = parse_value(flag, value)?,
            "--warmup" => options.config.warmup_replications = parse_value(flag, value)?,
            "--max-runs" => options.config.max_replications = parse_value(flag, value)?,
            "--fixed-cost" => options.fixed_order_cost = Some(parse_value(flag, value)?),
            "--holding" => options.holding_cost_rate = Some(parse_value(flag, value)?),
            "--penalty" => options.penalty_cost_rate = Some(parse_value(flag, value)?),
            "--initial-stock" => options.initial_stock = Some(parse_value(flag, value)?),
            other => return Err(format!("unknown flag {other}")),
        }
    }
    Ok(Some(options))
}

fn parse_value<T: std::str::FromStr>(flag: &str, raw: &str) -> Result<T, String> {
    raw.parse()
        .map_err(|_| format!("invalid value for {flag}: {raw}"))
}
