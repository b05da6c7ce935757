use super::{ExtendedFirefly, Firefly, GenerationSnapshot, Metaheuristic};
use crate::allocation::{
    allocate_flows, allocation_rows, flow_rows, normalize_flat, AllocationRow, FlowPlan, FlowRow,
    IntAllocation,
};
use crate::config::{AdaptiveParams, Config, ObjectiveWeights, SearchParams, Variant};
use crate::error::{FfResult, FloodFlyError};
use crate::objective::{AllocationObjective, FeasibilityFilter, ObjectiveBreakdown};
use crate::scenario::{Bounds, Scenario};
use crate::stats::{BatchStats, RunSummary};
use crate::validation::{validate_allocation, MultiRunValidation, ValidationReport};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

const LOG_EVERY: usize = 50;

pub const MIN_BATCH_RUNS: usize = 2;
pub const MAX_BATCH_RUNS: usize = 100;

#[derive(Debug, Clone)]
pub struct OptimizationOptions {
    pub variant: Variant,
    pub search: SearchParams,
    pub adaptive: AdaptiveParams,
    pub max_time: Option<Duration>,
}

impl From<&Config> for OptimizationOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            variant: Variant::default(),
            search: cfg.search.clone(),
            adaptive: cfg.adaptive.clone(),
            max_time: None, // Set manually if needed
        }
    }
}

/// A trait for receiving updates during optimization.
/// Boolean return value indicates if the search should continue (true) or abort (false).
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, run: usize, snapshot: &GenerationSnapshot) -> bool;
}

impl<F> ProgressCallback for F
where
    F: Fn(usize, &GenerationSnapshot) -> bool + Send + Sync,
{
    fn on_progress(&self, run: usize, snapshot: &GenerationSnapshot) -> bool {
        self(run, snapshot)
    }
}

/// Everything a completed run produces.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run: usize,
    pub variant: Variant,
    pub best: Vec<f64>,
    pub best_value: f64,
    /// Maximization convention (`−best_value`).
    pub best_fitness: f64,
    /// `(generation, best-so-far value)`, non-increasing.
    pub trace: Vec<(usize, f64)>,
    pub breakdown: ObjectiveBreakdown,
    pub allocation: IntAllocation,
    pub allocation_rows: Vec<AllocationRow>,
    pub flow_plan: FlowPlan,
    pub flows: Vec<FlowRow>,
    pub validation: Option<ValidationReport>,
    pub gamma: f64,
    pub reinitialized: usize,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            run: self.run,
            fitness: self.best_fitness,
            best_value: self.best_value,
            elapsed_ms: self.elapsed.as_secs_f64() * 1000.0,
            generations: self.trace.len(),
            reinitialized: self.reinitialized,
        }
    }
}

/// Cancellation is a regular outcome, not an error.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed(Box<RunReport>),
    Stopped,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub runs: Vec<RunSummary>,
    pub reports: Vec<RunReport>,
    /// `(run, message)` of every failed run.
    pub errors: Vec<(usize, String)>,
    pub stopped: bool,
    pub stats: Option<BatchStats>,
    pub validation: Option<MultiRunValidation>,
    pub elapsed: Duration,
}

impl BatchReport {
    /// Run with the highest fitness.
    pub fn best(&self) -> Option<&RunReport> {
        self.reports
            .iter()
            .max_by(|a, b| a.best_fitness.total_cmp(&b.best_fitness))
    }
}

pub struct Optimizer {
    scenario: Arc<Scenario>,
    objective: Arc<AllocationObjective>,
    filter: FeasibilityFilter,
    weights: ObjectiveWeights,
    options: OptimizationOptions,
}

impl Optimizer {
    pub fn new(
        scenario: Arc<Scenario>,
        weights: &ObjectiveWeights,
        options: OptimizationOptions,
    ) -> Self {
        let objective = Arc::new(AllocationObjective::new(&scenario, weights));
        let filter = FeasibilityFilter::new(&scenario);
        if objective.distance_enabled() {
            debug!("Distance penalty enabled");
        }
        Self {
            scenario,
            objective,
            filter,
            weights: weights.clone(),
            options,
        }
    }

    pub fn options(&self) -> &OptimizationOptions {
        &self.options
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn objective(&self) -> &AllocationObjective {
        &self.objective
    }

    /// Checks the search parameters for the configured variant and the objective weights.
    pub fn validate(&self) -> FfResult<()> {
        self.options.search.validate(self.options.variant)?;
        if self.options.variant == Variant::Extended {
            self.options.adaptive.validate()?;
        }
        self.weights.validate()
    }

    /// Fresh optimizer and swarm for one run.
    pub fn build(&self, seed: Option<u64>) -> Box<dyn Metaheuristic> {
        let rng = match seed {
            Some(s) => fastrand::Rng::with_seed(s),
            None => fastrand::Rng::new(),
        };
        let bounds = Bounds::for_scenario(&self.scenario);
        let opts = &self.options;

        match opts.variant {
            Variant::Baseline => Box::new(Firefly::new(
                self.objective.clone(),
                bounds,
                &opts.search,
                rng,
            )),
            Variant::Extended => {
                let mut efa = ExtendedFirefly::new(
                    self.objective.clone(),
                    bounds,
                    &opts.search,
                    &opts.adaptive,
                    rng,
                )
                .with_filter(self.filter.clone());
                if opts.adaptive.tune_gamma {
                    efa.tune_gamma_by_influence_radius(
                        opts.adaptive.influence_radius,
                        opts.adaptive.influence_tau,
                    );
                }
                Box::new(efa)
            }
        }
    }

    fn effective_gamma(&self) -> f64 {
        let opts = &self.options;
        if opts.variant == Variant::Extended && opts.adaptive.tune_gamma {
            super::schedule::tune_gamma_by_influence_radius(
                opts.adaptive.influence_radius,
                opts.adaptive.influence_tau,
            )
        } else {
            opts.search.gamma
        }
    }

    /// Single run. `run` is the 1-based number reported to the callback.
    pub fn run<CB: ProgressCallback + ?Sized>(
        &self,
        run: usize,
        seed: Option<u64>,
        callback: &CB,
    ) -> FfResult<RunOutcome> {
        // 1. Validate before anything is allocated
        self.validate()?;
        let opts = &self.options;
        let start_time = Instant::now();

        info!(
            "🔥 Run #{}: {} firefly, {} fireflies × {} generations over {} dimensions",
            run,
            opts.variant,
            opts.search.population,
            opts.search.generations,
            self.scenario.dimensions()
        );

        // 2. Initialize swarm
        let mut mh = self.build(seed);
        let mut trace = Vec::with_capacity(opts.search.generations);
        let mut reinitialized = 0;

        // 3. Main loop
        for snap in mh.generations() {
            if !callback.on_progress(run, &snap) {
                warn!("🛑 Run #{} stopped at generation {}", run, snap.generation);
                return Ok(RunOutcome::Stopped);
            }

            trace.push((snap.generation, snap.best_value));
            reinitialized += snap.reinitialized;

            if let Some(d) = &snap.diagnostics {
                debug!(
                    "gen {:>4} best {:.6} w {:.3} c {:.4} step {:.4} beta {:.3} floored {:.1}% \
                     moves {} walks {} reinit {}",
                    snap.generation,
                    snap.best_value,
                    d.inertia,
                    d.step_factor,
                    d.avg_step,
                    d.avg_beta,
                    d.floored_beta_rate * 100.0,
                    d.moves_toward,
                    d.random_walks,
                    snap.reinitialized
                );
            }
            if snap.generation % LOG_EVERY == 0 {
                info!(
                    "   Gen {:>4}/{} | best {:.6}",
                    snap.generation, opts.search.generations, snap.best_value
                );
            }

            if let Some(limit) = opts.max_time {
                if start_time.elapsed() >= limit {
                    warn!(
                        "⏱️  Run #{} hit the time limit at generation {}",
                        run, snap.generation
                    );
                    break;
                }
            }
        }

        // 4. Post-process the best vector
        let best = mh.best().to_vec();
        let best_value = mh.best_value();
        if !best_value.is_finite() {
            return Err(FloodFlyError::Run(format!(
                "no finite solution found (best value {})",
                best_value
            )));
        }

        let report = self.finalize(run, best, best_value, trace, reinitialized, start_time)?;
        info!(
            "✅ Run #{} finished: fitness {:.6} in {:.2?}",
            run, report.best_fitness, report.elapsed
        );
        Ok(RunOutcome::Completed(Box::new(report)))
    }

    fn finalize(
        &self,
        run: usize,
        best: Vec<f64>,
        best_value: f64,
        trace: Vec<(usize, f64)>,
        reinitialized: usize,
        start_time: Instant,
    ) -> FfResult<RunReport> {
        let scenario = &self.scenario;
        let breakdown = self.objective.breakdown(&best);
        let allocation = normalize_flat(&best, scenario.class_count(), &scenario.supplies());

        let coords = scenario.coordinates();
        let flow_plan = allocate_flows(&allocation, &scenario.current_matrix(), coords.as_deref())?;
        let validation = scenario
            .has_population()
            .then(|| validate_allocation(scenario, &allocation));

        Ok(RunReport {
            run,
            variant: self.options.variant,
            best_fitness: -best_value,
            best_value,
            best,
            trace,
            breakdown,
            allocation_rows: allocation_rows(scenario, &allocation),
            flows: flow_rows(scenario, &flow_plan),
            allocation,
            flow_plan,
            validation,
            gamma: self.effective_gamma(),
            reinitialized,
            elapsed: start_time.elapsed(),
        })
    }

    /// `runs` sequential runs with fresh state each. A failed run is recorded and skipped;
    /// a stop ends the batch.
    pub fn run_batch<CB: ProgressCallback + ?Sized>(
        &self,
        runs: usize,
        callback: &CB,
    ) -> FfResult<BatchReport> {
        if !(MIN_BATCH_RUNS..=MAX_BATCH_RUNS).contains(&runs) {
            return Err(FloodFlyError::invalid(
                "runs",
                format!("= {} is outside [{}, {}]", runs, MIN_BATCH_RUNS, MAX_BATCH_RUNS),
            ));
        }
        self.validate()?;

        let start_time = Instant::now();
        let base_seed = self.options.search.seed;
        let mut batch = collect_batch(runs, |run| {
            self.run(run, base_seed.map(|s| s + run as u64), callback)
        });

        batch.stats = BatchStats::from_runs(&batch.runs, batch.errors.len());
        let validations: Vec<ValidationReport> = batch
            .reports
            .iter()
            .filter_map(|r| r.validation.clone())
            .collect();
        batch.validation = MultiRunValidation::from_reports(&validations);
        batch.elapsed = start_time.elapsed();

        info!(
            "📊 Batch finished: {} ok, {} failed{} in {:.2?}",
            batch.runs.len(),
            batch.errors.len(),
            if batch.stopped { ", stopped" } else { "" },
            batch.elapsed
        );
        Ok(batch)
    }
}

/// Drives `run_one` for runs `1..=runs`: failures are recorded with their index,
/// a stop ends the loop.
fn collect_batch<F>(runs: usize, mut run_one: F) -> BatchReport
where
    F: FnMut(usize) -> FfResult<RunOutcome>,
{
    let mut batch = BatchReport::default();
    for run in 1..=runs {
        match run_one(run) {
            Ok(RunOutcome::Completed(report)) => {
                batch.runs.push(report.summary());
                batch.reports.push(*report);
            }
            Ok(RunOutcome::Stopped) => {
                batch.stopped = true;
                break;
            }
            Err(e) => {
                error!("❌ Run {} failed: {}", run, e);
                batch.errors.push((run, format!("Run {}: {}", run, e)));
            }
        }
    }
    batch
}
