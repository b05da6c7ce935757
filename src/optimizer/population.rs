use crate::objective::Objective;
use crate::scenario::Bounds;

/// One firefly: a position and its cached minimization value.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub position: Vec<f64>,
    pub brightness: f64,
}

/// Fixed-size swarm plus the best position seen so far.
#[derive(Debug, Clone)]
pub struct Population {
    pub candidates: Vec<Candidate>,
    best: Vec<f64>,
    best_value: f64,
}

impl Population {
    /// Uniform sample within bounds, every member evaluated.
    pub fn initialize(
        size: usize,
        bounds: &Bounds,
        objective: &dyn Objective,
        rng: &mut fastrand::Rng,
    ) -> Self {
        let mut pop = Self {
            candidates: Vec::with_capacity(size),
            best: vec![0.0; bounds.dimensions()],
            best_value: f64::MAX,
        };
        for _ in 0..size {
            let position = bounds.sample(rng);
            let brightness = objective.evaluate(&position);
            pop.offer(&position, brightness);
            pop.candidates.push(Candidate {
                position,
                brightness,
            });
        }
        pop
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn best(&self) -> &[f64] {
        &self.best
    }

    pub fn best_value(&self) -> f64 {
        self.best_value
    }

    /// Replaces the best when `value` is strictly lower. Returns whether it did.
    pub fn offer(&mut self, position: &[f64], value: f64) -> bool {
        if value < self.best_value {
            self.best_value = value;
            self.best.clear();
            self.best.extend_from_slice(position);
            true
        } else {
            false
        }
    }

    /// Offers candidate `i` as the new best.
    pub fn commit(&mut self, i: usize) -> bool {
        let c = &self.candidates[i];
        if c.brightness < self.best_value {
            self.best_value = c.brightness;
            self.best.clone_from(&c.position);
            true
        } else {
            false
        }
    }

    /// Mutable `i` alongside shared `j`. Panics if `i == j`.
    pub fn pair_mut(&mut self, i: usize, j: usize) -> (&mut Candidate, &Candidate) {
        assert_ne!(i, j, "a candidate cannot be paired with itself");
        if i < j {
            let (left, right) = self.candidates.split_at_mut(j);
            (&mut left[i], &right[0])
        } else {
            let (left, right) = self.candidates.split_at_mut(i);
            (&mut right[0], &left[j])
        }
    }

    /// Hill-climbing step on the best: noise of scale `noise`, kept only if strictly better.
    pub fn perturb_best(
        &mut self,
        noise: f64,
        bounds: &Bounds,
        objective: &dyn Objective,
        rng: &mut fastrand::Rng,
    ) -> bool {
        let mut trial = self.best.clone();
        for (d, v) in trial.iter_mut().enumerate() {
            *v = bounds.clamp(d, *v + noise * (rng.f64() - 0.5));
        }
        let value = objective.evaluate(&trial);
        self.offer(&trial, value)
    }
}
