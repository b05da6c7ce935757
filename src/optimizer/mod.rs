pub mod diversity;
pub mod extended;
pub mod firefly;
pub mod population;
pub mod runner;
pub mod schedule;

pub use self::extended::ExtendedFirefly;
pub use self::firefly::Firefly;
pub use self::runner::{
    BatchReport, OptimizationOptions, Optimizer, ProgressCallback, RunOutcome, RunReport,
};

use serde::Serialize;

/// Movement statistics of one extended-variant generation.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StepDiagnostics {
    pub avg_step: f64,
    pub avg_beta: f64,
    pub floored_beta_rate: f64,
    pub moves_toward: usize,
    pub random_walks: usize,
    pub inertia: f64,
    pub step_factor: f64,
}

/// State published after every completed generation.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationSnapshot {
    /// 1-based
    pub generation: usize,
    pub best_value: f64,
    pub alpha: f64,
    pub reinitialized: usize,
    pub diagnostics: Option<StepDiagnostics>,
}

/// A generational minimizer driven one generation at a time.
pub trait Metaheuristic: Send {
    /// Runs the next generation, or `None` once the budget is spent.
    fn step(&mut self) -> Option<GenerationSnapshot>;
    fn best(&self) -> &[f64];
    fn best_value(&self) -> f64;
    fn total_generations(&self) -> usize;

    /// Pull-based view of the remaining generations.
    fn generations(&mut self) -> Generations<'_, Self>
    where
        Self: Sized,
    {
        Generations { inner: self }
    }
}

pub struct Generations<'a, M: ?Sized> {
    inner: &'a mut M,
}

impl<M: Metaheuristic + ?Sized> Iterator for Generations<'_, M> {
    type Item = GenerationSnapshot;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.step()
    }
}

impl<M: Metaheuristic + ?Sized> Metaheuristic for Box<M> {
    fn step(&mut self) -> Option<GenerationSnapshot> {
        (**self).step()
    }
    fn best(&self) -> &[f64] {
        (**self).best()
    }
    fn best_value(&self) -> f64 {
        (**self).best_value()
    }
    fn total_generations(&self) -> usize {
        (**self).total_generations()
    }
}
