pub mod allocation;
pub mod feasibility;
pub mod geo;
pub mod transport;

pub use self::allocation::{AllocationObjective, ObjectiveBreakdown, NON_FINITE_SENTINEL};
pub use self::feasibility::{FeasibilityFilter, FloodBand};

/// A minimization target over a flat decision vector. Lower is better.
pub trait Objective: Send + Sync {
    fn evaluate(&self, x: &[f64]) -> f64;
}

impl<F> Objective for F
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn evaluate(&self, x: &[f64]) -> f64 {
        self(x)
    }
}

/// Multiplies another objective by a constant factor.
#[derive(Debug, Clone)]
pub struct Scaled<O> {
    inner: O,
    factor: f64,
}

impl<O: Objective> Scaled<O> {
    pub fn new(inner: O, factor: f64) -> Self {
        Self { inner, factor }
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }
}

impl<O: Objective> Objective for Scaled<O> {
    fn evaluate(&self, x: &[f64]) -> f64 {
        self.factor * self.inner.evaluate(x)
    }
}
