pub mod reporting;
pub mod scenario;

pub use reporting::{
    format_summary, period_reports, write_period_report, write_period_report_to, PeriodReport,
};
pub use scenario::{load_scenario, read_scenario, Scenario, ScenarioRow};
