use super::population::Population;
use super::schedule::{alpha_decay, attractiveness};
use super::{GenerationSnapshot, Metaheuristic};
use crate::config::SearchParams;
use crate::objective::Objective;
use crate::scenario::Bounds;
use std::sync::Arc;

/// Classic firefly algorithm over a box-bounded space.
pub struct Firefly {
    objective: Arc<dyn Objective>,
    bounds: Bounds,
    pop: Population,
    rng: fastrand::Rng,

    gamma: f64,
    beta0: f64,
    alpha0: f64,
    alpha_final: f64,
    alpha: f64,

    generation: usize,
    generations: usize,
}

impl Firefly {
    /// Samples and evaluates the initial swarm.
    pub fn new(
        objective: Arc<dyn Objective>,
        bounds: Bounds,
        params: &SearchParams,
        mut rng: fastrand::Rng,
    ) -> Self {
        let pop = Population::initialize(params.population, &bounds, objective.as_ref(), &mut rng);
        Self {
            objective,
            bounds,
            pop,
            rng,
            gamma: params.gamma,
            beta0: params.beta0,
            alpha0: params.alpha0,
            alpha_final: params.alpha_final,
            alpha: params.alpha0,
            generation: 0,
            generations: params.generations,
        }
    }

    pub fn population(&self) -> &Population {
        &self.pop
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    fn move_toward(&mut self, i: usize, j: usize) {
        let (xi, xj) = self.pop.pair_mut(i, j);
        let r = euclidean(&xi.position, &xj.position);
        let beta = attractiveness(r, self.gamma, self.beta0);
        for d in 0..xi.position.len() {
            let v = xi.position[d]
                + beta * (xj.position[d] - xi.position[d])
                + self.alpha * (self.rng.f64() - 0.5);
            xi.position[d] = self.bounds.clamp(d, v);
        }
    }

    fn random_walk(&mut self, i: usize) {
        let x = &mut self.pop.candidates[i].position;
        for (d, v) in x.iter_mut().enumerate() {
            *v = self.bounds.clamp(d, *v + self.alpha * (self.rng.f64() - 0.5));
        }
    }
}

impl Metaheuristic for Firefly {
    fn step(&mut self) -> Option<GenerationSnapshot> {
        if self.generation >= self.generations {
            return None;
        }
        let gen = self.generation;
        let n = self.pop.len();

        for i in 0..n {
            for j in 0..n {
                if self.pop.candidates[i].brightness > self.pop.candidates[j].brightness {
                    self.move_toward(i, j);
                } else {
                    self.random_walk(i);
                }
            }
            // Later candidates see this one's new brightness
            let value = self.objective.evaluate(&self.pop.candidates[i].position);
            self.pop.candidates[i].brightness = value;
            self.pop.commit(i);
        }

        self.pop.perturb_best(
            self.alpha,
            &self.bounds,
            self.objective.as_ref(),
            &mut self.rng,
        );
        self.alpha = alpha_decay(self.alpha0, self.alpha_final, gen);

        self.generation += 1;
        Some(GenerationSnapshot {
            generation: self.generation,
            best_value: self.pop.best_value(),
            alpha: self.alpha,
            reinitialized: 0,
            diagnostics: None,
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

#[inline]
fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
