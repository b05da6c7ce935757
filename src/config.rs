use crate::error::{FfResult, FloodFlyError};
use clap::{ArgAction, Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs;
use std::path::Path;
use strum_macros::{Display as StrumDisplay, EnumString};

/// Which optimizer drives the run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize, StrumDisplay,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Variant {
    /// Classic firefly algorithm
    Baseline,
    /// Self-adaptive, feasibility-filtered firefly algorithm with diversity control
    #[default]
    Extended,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub search: SearchParams,
    #[command(flatten)]
    pub adaptive: AdaptiveParams,
    #[command(flatten)]
    pub objective: ObjectiveWeights,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    #[arg(long, default_value_t = 300)]
    pub generations: usize,
    #[arg(long, default_value_t = 50)]
    pub population: usize,
    #[arg(long, default_value_t = 0.6)]
    pub alpha0: f64,
    #[arg(long, default_value_t = 0.05)]
    pub alpha_final: f64,
    #[arg(long, default_value_t = 1.0)]
    pub beta0: f64,
    // Only read by the extended variant
    #[arg(long, default_value_t = 0.2)]
    pub beta_min: f64,
    #[arg(long, default_value_t = 1.0)]
    pub gamma: f64,

    /// Fixed RNG seed. Unseeded runs are not reproducible.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            generations: 300,
            population: 50,
            alpha0: 0.6,
            alpha_final: 0.05,
            beta0: 1.0,
            beta_min: 0.2,
            gamma: 1.0,
            seed: None,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveParams {
    // === INERTIA (w_t) ===
    #[arg(long, default_value_t = 0.9)]
    pub inertia_start: f64,
    #[arg(long, default_value_t = 0.4)]
    pub inertia_end: f64,
    #[arg(long, default_value_t = 1.0)]
    pub inertia_rate: f64,

    // === STEP FACTOR (c_t) ===
    #[arg(long, default_value_t = 0.9)]
    pub theta: f64,

    // === DIVERSITY ===
    #[arg(long, default_value_t = 5.0)]
    pub diversity_constant: f64,
    #[arg(long, default_value_t = 8)]
    pub bits_per_dimension: u32,

    // === GAMMA TUNING ===
    // When enabled, gamma is derived from the influence radius and overrides --gamma.
    #[arg(long = "no-gamma-tuning", action = ArgAction::SetFalse)]
    pub tune_gamma: bool,
    #[arg(long, default_value_t = 1.0)]
    pub influence_radius: f64,
    #[arg(long, default_value_t = 0.6)]
    pub influence_tau: f64,
}

impl Default for AdaptiveParams {
    fn default() -> Self {
        Self {
            inertia_start: 0.9,
            inertia_end: 0.4,
            inertia_rate: 1.0,
            theta: 0.9,
            diversity_constant: 5.0,
            bits_per_dimension: 8,
            tune_gamma: true,
            influence_radius: 1.0,
            influence_tau: 0.6,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveWeights {
    #[arg(long, default_value_t = 1e-6)]
    pub epsilon: f64,
    #[arg(long, default_value_t = 10.0)]
    pub weight_supply: f64,

    /// Optional overall personnel target; penalized quadratically.
    #[arg(long)]
    pub target_total: Option<f64>,
    #[arg(long, default_value_t = 1.0)]
    pub weight_budget: f64,

    // Penalty per average kilometer moved (needs coordinates)
    #[arg(long, default_value_t = 0.01)]
    pub weight_distance: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            epsilon: 1e-6,
            weight_supply: 10.0,
            target_total: None,
            weight_budget: 1.0,
            weight_distance: 0.01,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> FfResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Checks every field before any run is started.
    pub fn validate(&self, variant: Variant) -> FfResult<()> {
        self.search.validate(variant)?;
        self.adaptive.validate()?;
        self.objective.validate()
    }
}

impl SearchParams {
    pub fn validate(&self, variant: Variant) -> FfResult<()> {
        ensure_range("generations", self.generations, 10, 500)?;
        ensure_range("population", self.population, 10, 150)?;
        ensure_range("alpha0", self.alpha0, 0.01, 1.0)?;
        ensure_range("alpha_final", self.alpha_final, 0.01, 1.0)?;
        ensure_range("beta0", self.beta0, 0.1, 10.0)?;
        ensure_range("gamma", self.gamma, 0.1, 10.0)?;

        if variant == Variant::Extended {
            ensure_range("beta_min", self.beta_min, 0.1, 0.5)?;
            if self.beta_min > self.beta0 {
                return Err(FloodFlyError::invalid(
                    "beta_min",
                    format!("{} must not exceed beta0 ({})", self.beta_min, self.beta0),
                ));
            }
        }
        Ok(())
    }
}

impl AdaptiveParams {
    pub fn validate(&self) -> FfResult<()> {
        ensure_range("inertia_start", self.inertia_start, 0.0, 1.0)?;
        ensure_range("inertia_end", self.inertia_end, 0.0, 1.0)?;
        ensure_range("inertia_rate", self.inertia_rate, 0.0, 10.0)?;
        ensure_range("theta", self.theta, 0.0, 1.0)?;
        ensure_range("diversity_constant", self.diversity_constant, 0.0, 20.0)?;
        ensure_range("bits_per_dimension", self.bits_per_dimension, 1, 16)?;
        if self.tune_gamma {
            ensure_range("influence_radius", self.influence_radius, 1e-6, 1e6)?;
            ensure_range("influence_tau", self.influence_tau, 1e-9, 0.999999)?;
        }
        Ok(())
    }
}

impl ObjectiveWeights {
    pub fn validate(&self) -> FfResult<()> {
        ensure_range("epsilon", self.epsilon, f64::MIN_POSITIVE, 1.0)?;
        ensure_range("weight_supply", self.weight_supply, 0.0, 1e9)?;
        ensure_range("weight_budget", self.weight_budget, 0.0, 1e9)?;
        ensure_range("weight_distance", self.weight_distance, 0.0, 1e9)?;
        if let Some(target) = self.target_total {
            ensure_range("target_total", target, 0.0, f64::MAX)?;
        }
        Ok(())
    }
}

fn ensure_range<T>(field: &'static str, value: T, lo: T, hi: T) -> FfResult<()>
where
    T: PartialOrd + Display + Copy,
{
    // NaN fails both comparisons, so it is rejected as well
    if value >= lo && value <= hi {
        Ok(())
    } else {
        Err(FloodFlyError::invalid(
            field,
            format!("= {} is outside [{}, {}]", value, lo, hi),
        ))
    }
}
