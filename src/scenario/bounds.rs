use super::Scenario;
use crate::error::{FfResult, FloodFlyError};

/// Extra headroom above a zone's adaptive capacity.
pub const CAPACITY_HEADROOM: f64 = 200.0;

const MIN_RANGE: f64 = 1e-12;

/// Per-dimension search box. Immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl Bounds {
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> FfResult<Self> {
        if lower.is_empty() || lower.len() != upper.len() {
            return Err(FloodFlyError::Validation(format!(
                "bounds need matching non-empty vectors (lower {}, upper {})",
                lower.len(),
                upper.len()
            )));
        }
        for (d, (lo, hi)) in lower.iter().zip(&upper).enumerate() {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(FloodFlyError::Validation(format!(
                    "dimension {} has invalid bounds [{}, {}]",
                    d, lo, hi
                )));
            }
        }
        Ok(Self { lower, upper })
    }

    /// Uniform box `[lo, hi]` in every dimension.
    pub fn uniform(dimensions: usize, lo: f64, hi: f64) -> FfResult<Self> {
        Self::new(vec![lo; dimensions], vec![hi; dimensions])
    }

    /// Allocation box: `0 ≤ x[i*C + c] ≤ max(1, min(supply[c], AC[i] + 200))`.
    pub fn for_scenario(scenario: &Scenario) -> Self {
        let dims = scenario.dimensions();
        let mut upper = Vec::with_capacity(dims);
        for zone in scenario.zones() {
            for class in scenario.classes() {
                let cap = class
                    .supply
                    .min(zone.adaptive_capacity + CAPACITY_HEADROOM)
                    .max(1.0);
                upper.push(cap);
            }
        }
        Self {
            lower: vec![0.0; dims],
            upper,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.lower.len()
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    #[inline]
    pub fn range(&self, d: usize) -> f64 {
        (self.upper[d] - self.lower[d]).max(MIN_RANGE)
    }

    pub fn avg_range(&self) -> f64 {
        let n = self.dimensions();
        (0..n).map(|d| self.range(d)).sum::<f64>() / n as f64
    }

    #[inline]
    pub fn clamp(&self, d: usize, v: f64) -> f64 {
        v.max(self.lower[d]).min(self.upper[d])
    }

    pub fn clamp_all(&self, x: &mut [f64]) {
        for (d, v) in x.iter_mut().enumerate() {
            *v = self.clamp(d, *v);
        }
    }

    /// Position of `v` inside dimension `d`, in `[0, 1]` for in-bounds values.
    #[inline]
    pub fn normalize(&self, d: usize, v: f64) -> f64 {
        (v - self.lower[d]) / self.range(d)
    }

    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == self.dimensions()
            && x
                .iter()
                .enumerate()
                .all(|(d, &v)| v >= self.lower[d] && v <= self.upper[d])
    }

    /// Uniform sample from the box.
    pub fn sample(&self, rng: &mut fastrand::Rng) -> Vec<f64> {
        (0..self.dimensions())
            .map(|d| {
                let v = self.lower[d] + rng.f64() * (self.upper[d] - self.lower[d]);
                self.clamp(d, v)
            })
            .collect()
    }
}
