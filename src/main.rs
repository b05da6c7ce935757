use clap::{Parser, Subcommand};
use floodfly::scenario::load_scenario;
use std::process;
use std::sync::Arc;
use tracing::{error, info, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(global = true, short, long, default_value = "data/zones.csv")]
    zones: String,

    #[arg(global = true, short, long, default_value = "data/classes.csv")]
    classes: String,

    /// JSON parameter file; replaces the parameter flags when given.
    #[arg(global = true, long = "config")]
    config_file: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Single optimization run
    Optimize(cmd::optimize::OptimizeArgs),
    /// Repeated runs with aggregate statistics
    Batch(cmd::batch::BatchArgs),
    /// Show the loaded scenario and its feasibility bands
    Inspect,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    info!("🚀 Initializing FloodFly...");

    // 1. Load Scenario
    let scenario = match load_scenario(&cli.zones, &cli.classes) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!("❌ FATAL ERROR LOADING SCENARIO: {}", e);
            process::exit(1);
        }
    };

    // 2. Execute
    let result = match cli.command {
        Commands::Optimize(args) => {
            cmd::optimize::run(args, scenario, cli.config_file.as_deref())
        }
        Commands::Batch(args) => cmd::batch::run(args, scenario, cli.config_file.as_deref()),
        Commands::Inspect => {
            cmd::inspect::run(&scenario);
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("❌ {}", e);
        process::exit(1);
    }
}
