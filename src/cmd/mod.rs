pub mod batch;
pub mod inspect;
pub mod optimize;

use floodfly::config::{Config, Variant};
use floodfly::session::{RunSession, SessionResult};
use floodfly::FfResult;
use std::thread;
use std::time::Duration;
use tracing::info;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// CLI flags, unless a JSON file takes their place. Validated either way.
pub fn resolve_config(cli: &Config, file: Option<&str>, variant: Variant) -> FfResult<Config> {
    let config = match file {
        Some(path) => {
            info!("⚖️  Loading parameters from: {}", path);
            Config::load_from_file(path)?
        }
        None => cli.clone(),
    };
    config.validate(variant)?;
    Ok(config)
}

/// Polls the session until the worker is done, printing coarse progress.
pub fn follow(mut session: RunSession) -> SessionResult {
    let mut last_pct = None;
    while session.is_running() {
        let status = session.status();
        let pct = (status.progress * 100.0).floor() as u32;
        if last_pct != Some(pct) && pct % 10 == 0 {
            let best = status
                .best_value
                .map_or_else(|| "-".to_string(), |v| format!("{:.6}", v));
            println!(
                "   ⏳ run {}/{} | gen {}/{} | {:>3}% | best {}",
                status.current_run,
                status.total_runs,
                status.current_generation,
                status.total_generations,
                pct,
                best
            );
            last_pct = Some(pct);
        }
        thread::sleep(POLL_INTERVAL);
    }
    session.wait()
}
