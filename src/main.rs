use std::env;
use std::error::Error;
use std::process::ExitCode;

use backorder_sim::cli::{parse_args, CliOptions, USAGE};
use backorder_sim::io::{format_summary, load_scenario, period_reports, write_period_report};
use backorder_sim::{
    CostParameters, IndependentDemand, ParallelEvaluator, Policy, SequentialEvaluator,
};
use tracing_subscriber::EnvFilter;

// Reference instance: 8 periods, normal demand.
const DEMAND_MEAN: [f64; 8] = [110.0, 40.0, 10.0, 62.0, 12.0, 80.0, 122.0, 130.0];
const DEMAND_STD_DEV: [f64; 8] = [22.0, 8.0, 2.0, 12.4, 2.4, 16.0, 24.4, 26.0];
const UNIT_COST: [f64; 8] = [5.6, 4.2, 3.0, 2.0, 1.2, 0.6, 0.2, 0.0];
const ORDER: [bool; 8] = [true, true, false, true, false, true, true, true];
const TARGET_LEVEL: [f64; 8] = [128.5, 56.9, 0.0, 84.6, 0.0, 101.9, 155.4, 165.6];
const FIXED_ORDER_COST: f64 = 48.0;
const HOLDING_COST: f64 = 0.5;
const PENALTY_COST: f64 = 12.0;
const INITIAL_STOCK: f64 = 98.0;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(msg) => {
            eprintln!("{msg}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(options: &CliOptions) -> Result<(), Box<dyn Error>> {
    println!("=== Backorder Policy Evaluation ===");

    // 1. POLICY, COSTS AND DEMAND
    let fixed = options.fixed_order_cost.unwrap_or(FIXED_ORDER_COST);
    let holding = options.holding_cost_rate.unwrap_or(HOLDING_COST);
    let penalty = options.penalty_cost_rate.unwrap_or(PENALTY_COST);
    let initial = options.initial_stock.unwrap_or(INITIAL_STOCK);

    let (policy, costs, demand) = match &options.scenario {
        Some(path) => {
            let scenario = load_scenario(path)?;
            let costs = scenario.costs(fixed, holding, penalty, initial)?;
            (scenario.policy, costs, scenario.demand)
        }
        None => (
            Policy::new(ORDER.to_vec(), TARGET_LEVEL.to_vec())?,
            CostParameters::new(fixed, holding, penalty, UNIT_COST.to_vec(), initial)?,
            IndependentDemand::normal(&DEMAND_MEAN, &DEMAND_STD_DEV)?,
        ),
    };
    println!(
        "Horizon: {} periods, {} orders placed",
        policy.horizon(),
        policy.review_count()
    );

    // 2. EVALUATE
    let evaluation = match options.threads {
        Some(threads) => ParallelEvaluator::new(options.config.clone())
            .with_workers(threads)
            .evaluate(&policy, &costs, &demand, options.seed)?,
        None => SequentialEvaluator::new(options.config.clone())
            .evaluate_seeded(&policy, &costs, &demand, options.seed)?,
    };

    // 3. REPORT
    println!("\n{}", format_summary(&evaluation));
    println!(
        "{:.4} +/- {:.4} @ {:.0}% confidence",
        evaluation.interval.center,
        evaluation.interval.half_width,
        options.config.confidence_level * 100.0
    );

    if let Some(path) = &options.report {
        write_period_report(path, &period_reports(&policy, &evaluation))?;
        println!("Per-period report written to {}", path.display());
    }

    Ok(())
}
