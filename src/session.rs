//! Background run lifecycle: start, poll status, stop, collect results.
//!
//! The worker thread owns every piece of mutable run state and only talks to the caller
//! through a channel of [`RunEvent`]s. The session folds those events into a
//! [`StatusSnapshot`] whenever the caller asks, so readers never share collections
//! with the worker.

use crate::error::{FfResult, FloodFlyError};
use crate::optimizer::runner::{MAX_BATCH_RUNS, MIN_BATCH_RUNS};
use crate::optimizer::{BatchReport, GenerationSnapshot, Optimizer, RunOutcome};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunMode {
    Single,
    Batch { runs: usize },
}

impl RunMode {
    fn total_runs(self) -> usize {
        match self {
            RunMode::Single => 1,
            RunMode::Batch { runs } => runs,
        }
    }
}

/// Final product of a session.
#[derive(Debug, Clone)]
pub enum SessionResult {
    Single(RunOutcome),
    Batch(BatchReport),
    Failed(String),
}

#[derive(Debug, Clone)]
pub enum RunEvent {
    Generation {
        run: usize,
        snapshot: GenerationSnapshot,
    },
    Finished(SessionResult),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusSnapshot {
    pub running: bool,
    pub completed: bool,
    pub stopped: bool,
    pub current_run: usize,
    pub total_runs: usize,
    pub current_generation: usize,
    pub total_generations: usize,
    /// Overall progress in `[0, 1]`.
    pub progress: f64,
    pub best_value: Option<f64>,
    pub failed_runs: usize,
    pub error: Option<String>,
}

pub struct RunSession {
    cancel: Arc<AtomicBool>,
    events: Receiver<RunEvent>,
    handle: Option<JoinHandle<()>>,
    status: StatusSnapshot,
    // Trace of the run currently reported
    iterations: Vec<(usize, f64)>,
    result: Option<SessionResult>,
}

impl RunSession {
    /// Validates, then spawns the worker. Invalid parameters never start a thread.
    pub fn start(optimizer: Arc<Optimizer>, mode: RunMode) -> FfResult<Self> {
        optimizer.validate()?;
        if let RunMode::Batch { runs } = mode {
            if !(MIN_BATCH_RUNS..=MAX_BATCH_RUNS).contains(&runs) {
                return Err(FloodFlyError::invalid(
                    "runs",
                    format!("= {} is outside [{}, {}]", runs, MIN_BATCH_RUNS, MAX_BATCH_RUNS),
                ));
            }
        }

        let cancel = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();
        let total_generations = optimizer.options().search.generations;

        let worker_cancel = cancel.clone();
        let handle = thread::Builder::new()
            .name("floodfly-worker".into())
            .spawn(move || worker(optimizer, mode, worker_cancel, tx))?;

        info!("🧵 Session started ({:?})", mode);
        Ok(Self {
            cancel,
            events: rx,
            handle: Some(handle),
            status: StatusSnapshot {
                running: true,
                total_runs: mode.total_runs(),
                total_generations,
                current_run: 1,
                ..StatusSnapshot::default()
            },
            iterations: Vec::new(),
            result: None,
        })
    }

    /// Requests cooperative cancellation. Takes effect at the next generation boundary.
    pub fn stop(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_running(&mut self) -> bool {
        self.drain();
        self.status.running
    }

    pub fn status(&mut self) -> StatusSnapshot {
        self.drain();
        self.status.clone()
    }

    /// `(generation, best value)` of the run currently in progress (or the last one).
    pub fn iterations(&mut self) -> Vec<(usize, f64)> {
        self.drain();
        self.iterations.clone()
    }

    /// Blocks until the worker exits.
    pub fn wait(mut self) -> SessionResult {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                return SessionResult::Failed("worker thread panicked".into());
            }
        }
        self.drain();
        self.result
            .take()
            .unwrap_or_else(|| SessionResult::Failed("worker exited without a result".into()))
    }

    fn drain(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: RunEvent) {
        let st = &mut self.status;
        match event {
            RunEvent::Generation { run, snapshot } => {
                if run != st.current_run {
                    st.current_run = run;
                    self.iterations.clear();
                }
                st.current_generation = snapshot.generation;
                st.best_value = Some(snapshot.best_value);
                let run_progress =
                    snapshot.generation as f64 / st.total_generations.max(1) as f64;
                st.progress = ((run - 1) as f64 + run_progress) / st.total_runs.max(1) as f64;
                self.iterations
                    .push((snapshot.generation, snapshot.best_value));
            }
            RunEvent::Finished(result) => {
                st.running = false;
                match &result {
                    SessionResult::Single(RunOutcome::Completed(_)) => {
                        st.completed = true;
                        st.progress = 1.0;
                    }
                    SessionResult::Single(RunOutcome::Stopped) => st.stopped = true,
                    SessionResult::Batch(batch) => {
                        st.stopped = batch.stopped;
                        st.completed = !batch.stopped;
                        st.failed_runs = batch.errors.len();
                        if st.completed {
                            st.progress = 1.0;
                        }
                    }
                    SessionResult::Failed(msg) => st.error = Some(msg.clone()),
                }
                self.result = Some(result);
            }
        }
    }
}

impl Drop for RunSession {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.cancel.store(true, Ordering::Relaxed);
            let _ = handle.join();
        }
    }
}

fn worker(
    optimizer: Arc<Optimizer>,
    mode: RunMode,
    cancel: Arc<AtomicBool>,
    tx: Sender<RunEvent>,
) {
    let progress_tx = tx.clone();
    let callback = move |run: usize, snapshot: &GenerationSnapshot| {
        if cancel.load(Ordering::Relaxed) {
            return false;
        }
        // A dropped receiver only means nobody is listening
        let _ = progress_tx.send(RunEvent::Generation {
            run,
            snapshot: snapshot.clone(),
        });
        true
    };

    let seed = optimizer.options().search.seed;
    let result = match mode {
        RunMode::Single => match optimizer.run(1, seed, &callback) {
            Ok(outcome) => SessionResult::Single(outcome),
            Err(e) => SessionResult::Failed(e.to_string()),
        },
        RunMode::Batch { runs } => match optimizer.run_batch(runs, &callback) {
            Ok(batch) => SessionResult::Batch(batch),
            Err(e) => SessionResult::Failed(e.to_string()),
        },
    };

    if let SessionResult::Failed(msg) = &result {
        warn!("Session failed: {}", msg);
    }
    let _ = tx.send(RunEvent::Finished(result));
}
