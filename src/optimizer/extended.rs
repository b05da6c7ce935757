use super::diversity::DiversityControl;
use super::population::Population;
use super::schedule::{
    alpha_decay, attractiveness, inertia_weight, step_factor, tune_gamma_by_influence_radius,
};
use super::{GenerationSnapshot, Metaheuristic, StepDiagnostics};
use crate::config::{AdaptiveParams, SearchParams};
use crate::objective::{FeasibilityFilter, Objective};
use crate::scenario::Bounds;
use std::sync::Arc;

/// Share of the legacy alpha schedule blended into the noise scale.
const ALPHA_BLEND: f64 = 0.25;

#[derive(Debug, Default)]
struct Tally {
    step_sum: f64,
    step_count: usize,
    beta_sum: f64,
    beta_count: usize,
    beta_floored: usize,
    moves_toward: usize,
    random_walks: usize,
}

/// Firefly variant with floored attraction, self-adaptive noise,
/// feasibility filtering and Hamming diversity control.
pub struct ExtendedFirefly {
    objective: Arc<dyn Objective>,
    filter: Option<FeasibilityFilter>,
    bounds: Bounds,
    pop: Population,
    rng: fastrand::Rng,
    diversity: DiversityControl,

    gamma: f64,
    beta0: f64,
    beta_min: f64,
    alpha0: f64,
    alpha_final: f64,
    alpha: f64,

    inertia_start: f64,
    inertia_end: f64,
    inertia_rate: f64,
    theta: f64,
    avg_range: f64,

    // Current generation's schedule values
    inertia: f64,
    step: f64,
    tally: Tally,

    generation: usize,
    generations: usize,
}

impl ExtendedFirefly {
    /// Samples and evaluates the initial swarm. The initial swarm is not filtered.
    pub fn new(
        objective: Arc<dyn Objective>,
        bounds: Bounds,
        search: &SearchParams,
        adaptive: &AdaptiveParams,
        mut rng: fastrand::Rng,
    ) -> Self {
        let pop = Population::initialize(search.population, &bounds, objective.as_ref(), &mut rng);
        let diversity = DiversityControl::new(
            adaptive.diversity_constant,
            adaptive.bits_per_dimension,
            bounds.dimensions(),
        );
        let avg_range = bounds.avg_range();

        Self {
            objective,
            filter: None,
            bounds,
            pop,
            rng,
            diversity,
            gamma: search.gamma,
            beta0: search.beta0,
            beta_min: search.beta_min,
            alpha0: search.alpha0,
            alpha_final: search.alpha_final,
            alpha: search.alpha0,
            inertia_start: adaptive.inertia_start,
            inertia_end: adaptive.inertia_end,
            inertia_rate: adaptive.inertia_rate,
            theta: adaptive.theta,
            avg_range,
            inertia: 1.0,
            step: 0.0,
            tally: Tally::default(),
            generation: 0,
            generations: search.generations,
        }
    }

    /// Infeasible candidates get `+∞` brightness after each update.
    pub fn with_filter(mut self, filter: FeasibilityFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn set_gamma(&mut self, gamma: f64) {
        self.gamma = gamma;
    }

    /// Derives gamma so attraction decays to `tau·β0` at normalized distance `r0`.
    pub fn tune_gamma_by_influence_radius(&mut self, r0: f64, tau: f64) {
        self.gamma = tune_gamma_by_influence_radius(r0, tau);
    }

    pub fn population(&self) -> &Population {
        &self.pop
    }

    #[inline]
    fn noise_scale(&self) -> f64 {
        self.inertia * self.step + ALPHA_BLEND * self.alpha
    }

    fn move_toward(&mut self, i: usize, j: usize) {
        let noise = self.noise_scale();
        let (xi, xj) = self.pop.pair_mut(i, j);

        let r = normalized_distance(&self.bounds, &xi.position, &xj.position);
        let raw = attractiveness(r, self.gamma, self.beta0);
        let beta = if raw < self.beta_min {
            self.tally.beta_floored += 1;
            self.beta_min
        } else {
            raw
        };

        let mut delta_sq = 0.0;
        for d in 0..xi.position.len() {
            let old = xi.position[d];
            let updated = self.bounds.clamp(
                d,
                old + beta * (xj.position[d] - old) + noise * (self.rng.f64() - 0.5),
            );
            xi.position[d] = updated;
            delta_sq += (updated - old) * (updated - old);
        }

        let dims = xi.position.len().max(1) as f64;
        self.tally.step_sum += (delta_sq / dims).sqrt();
        self.tally.step_count += 1;
        self.tally.beta_sum += beta;
        self.tally.beta_count += 1;
        self.tally.moves_toward += 1;
    }

    fn random_walk(&mut self, i: usize) {
        let noise = self.noise_scale();
        let x = &mut self.pop.candidates[i].position;

        let mut delta_sq = 0.0;
        for (d, v) in x.iter_mut().enumerate() {
            let old = *v;
            *v = self.bounds.clamp(d, old + noise * (self.rng.f64() - 0.5));
            delta_sq += (*v - old) * (*v - old);
        }

        let dims = x.len().max(1) as f64;
        self.tally.step_sum += (delta_sq / dims).sqrt();
        self.tally.step_count += 1;
        self.tally.random_walks += 1;
    }

    fn evaluate_filtered(&self, x: &[f64]) -> f64 {
        match &self.filter {
            Some(filter) if !filter.is_feasible(x) => f64::INFINITY,
            _ => self.objective.evaluate(x),
        }
    }

    fn diagnostics(&self) -> StepDiagnostics {
        let t = &self.tally;
        let ratio = |num: f64, den: usize| if den > 0 { num / den as f64 } else { 0.0 };
        StepDiagnostics {
            avg_step: ratio(t.step_sum, t.step_count),
            avg_beta: ratio(t.beta_sum, t.beta_count),
            floored_beta_rate: ratio(t.beta_floored as f64, t.beta_count),
            moves_toward: t.moves_toward,
            random_walks: t.random_walks,
            inertia: self.inertia,
            step_factor: self.step,
        }
    }
}

impl Metaheuristic for ExtendedFirefly {
    fn step(&mut self) -> Option<GenerationSnapshot> {
        if self.generation >= self.generations {
            return None;
        }
        let gen = self.generation;
        let n = self.pop.len();

        // 1. Self-adaptive schedules (1-based)
        self.inertia = inertia_weight(
            gen + 1,
            self.generations,
            self.inertia_start,
            self.inertia_end,
            self.inertia_rate,
        );
        self.step = step_factor(
            gen + 1,
            self.generations,
            self.theta,
            self.bounds.dimensions(),
            self.avg_range,
        );
        self.tally = Tally::default();

        // 2. Sequential candidate updates
        for i in 0..n {
            for j in 0..n {
                if self.pop.candidates[i].brightness > self.pop.candidates[j].brightness {
                    self.move_toward(i, j);
                } else {
                    self.random_walk(i);
                }
            }
            let value = self.evaluate_filtered(&self.pop.candidates[i].position);
            self.pop.candidates[i].brightness = value;
            self.pop.commit(i);
        }

        // 3. Diversity, then hill-climb the best
        let reinitialized = self.diversity.apply(
            gen,
            &mut self.pop,
            &self.bounds,
            self.objective.as_ref(),
            &mut self.rng,
        );
        let noise = self.noise_scale();
        self.pop
            .perturb_best(noise, &self.bounds, self.objective.as_ref(), &mut self.rng);

        // 4. Legacy alpha decay
        self.alpha = alpha_decay(self.alpha0, self.alpha_final, gen);

        self.generation += 1;
        Some(GenerationSnapshot {
            generation: self.generation,
            best_value: self.pop.best_value(),
            alpha: self.alpha,
            reinitialized,
            diagnostics: Some(self.diagnostics()),
        })
    }

    fn best(&self) -> &[f64] {
        self.pop.best()
    }

    fn best_value(&self) -> f64 {
        self.pop.best_value()
    }

    fn total_generations(&self) -> usize {
        self.generations
    }
}

/// RMS of per-axis differences, each scaled by its bound range.
pub fn normalized_distance(bounds: &Bounds, a: &[f64], b: &[f64]) -> f64 {
    let dims = a.len();
    let sum: f64 = a
        .iter()
        .zip(b)
        .enumerate()
        .map(|(d, (x, y))| {
            let diff = (x - y) / bounds.range(d);
            diff * diff
        })
        .sum();
    (sum / dims.max(1) as f64).sqrt()
}
