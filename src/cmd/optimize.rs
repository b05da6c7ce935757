use crate::reports;
use clap::Args;
use floodfly::config::{Config, Variant};
use floodfly::optimizer::{OptimizationOptions, Optimizer, RunOutcome};
use floodfly::scenario::Scenario;
use floodfly::session::{RunMode, RunSession, SessionResult};
use floodfly::{FfResult, FloodFlyError};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct OptimizeArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(long, value_enum, default_value_t = Variant::Extended)]
    pub variant: Variant,

    /// Wall-clock limit in seconds; the best solution so far is reported.
    #[arg(short = 'T', long)]
    pub max_time: Option<u64>,

    /// Write the full run report as JSON to this path.
    #[arg(long)]
    pub json: Option<String>,
}

pub fn run(args: OptimizeArgs, scenario: Arc<Scenario>, config_file: Option<&str>) -> FfResult<()> {
    let config = super::resolve_config(&args.config, config_file, args.variant)?;

    let mut options = OptimizationOptions::from(&config);
    options.variant = args.variant;
    options.max_time = args.max_time.map(Duration::from_secs);

    let optimizer = Arc::new(Optimizer::new(scenario.clone(), &config.objective, options));
    let session = RunSession::start(optimizer, RunMode::Single)?;

    let report = match super::follow(session) {
        SessionResult::Single(RunOutcome::Completed(report)) => report,
        SessionResult::Single(RunOutcome::Stopped) => {
            warn!("🛑 Run stopped before completion");
            return Ok(());
        }
        SessionResult::Failed(msg) => return Err(FloodFlyError::Run(msg)),
        SessionResult::Batch(_) => {
            return Err(FloodFlyError::Run("unexpected batch result".into()));
        }
    };

    println!("\n🏆 BEST ALLOCATION ({} variant, gamma {:.4})", report.variant, report.gamma);
    reports::print_breakdown(&report.breakdown);
    reports::print_allocation(&scenario, &report.allocation_rows);
    reports::print_flows(&report.flows);
    if let Some(validation) = &report.validation {
        reports::print_validation(&scenario, validation);
    }

    if let Some(path) = &args.json {
        fs::write(path, serde_json::to_string_pretty(&*report)?)?;
        info!("💾 Report written to {}", path);
    }
    Ok(())
}
