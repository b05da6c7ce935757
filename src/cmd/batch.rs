use crate::reports;
use clap::Args;
use floodfly::config::{Config, Variant};
use floodfly::optimizer::{OptimizationOptions, Optimizer};
use floodfly::scenario::Scenario;
use floodfly::session::{RunMode, RunSession, SessionResult};
use floodfly::{FfResult, FloodFlyError};
use std::sync::Arc;
use tracing::warn;

#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(long, value_enum, default_value_t = Variant::Extended)]
    pub variant: Variant,

    #[arg(short = 'r', long, default_value_t = 10)]
    pub runs: usize,
}

pub fn run(args: BatchArgs, scenario: Arc<Scenario>, config_file: Option<&str>) -> FfResult<()> {
    let config = super::resolve_config(&args.config, config_file, args.variant)?;

    let mut options = OptimizationOptions::from(&config);
    options.variant = args.variant;

    println!(
        "🔁 Batch of {} runs ({} variant, {} generations each)",
        args.runs, args.variant, config.search.generations
    );

    let optimizer = Arc::new(Optimizer::new(scenario.clone(), &config.objective, options));
    let session = RunSession::start(optimizer, RunMode::Batch { runs: args.runs })?;

    let batch = match super::follow(session) {
        SessionResult::Batch(batch) => batch,
        SessionResult::Failed(msg) => return Err(FloodFlyError::Run(msg)),
        SessionResult::Single(_) => {
            return Err(FloodFlyError::Run("unexpected single-run result".into()));
        }
    };

    if batch.stopped {
        warn!("🛑 Batch stopped after {} runs", batch.runs.len());
    }

    reports::print_batch(&batch);
    if let Some(best) = batch.best() {
        println!("\n🏆 BEST RUN: #{}", best.run);
        reports::print_breakdown(&best.breakdown);
        reports::print_allocation(&scenario, &best.allocation_rows);
    }
    if let Some(validation) = &batch.validation {
        reports::print_multi_validation(&scenario, validation);
    }

    if batch.runs.is_empty() {
        return Err(FloodFlyError::Run("no run completed".into()));
    }
    Ok(())
}
