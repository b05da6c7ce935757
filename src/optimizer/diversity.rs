use super::population::{Candidate, Population};
use crate::objective::Objective;
use crate::scenario::Bounds;

/// Hamming-distance based reinitialization of near-duplicate candidates.
#[derive(Debug, Clone)]
pub struct DiversityControl {
    constant: f64,
    bits_per_dimension: u32,
    string_length: usize,
}

impl DiversityControl {
    pub fn new(constant: f64, bits_per_dimension: u32, dimensions: usize) -> Self {
        let bits = bits_per_dimension.clamp(1, 31);
        Self {
            constant,
            bits_per_dimension: bits,
            string_length: dimensions * bits as usize,
        }
    }

    /// `TH = c·L` with `c = (constant·0.05)·exp(−0.001·gen)`.
    pub fn threshold(&self, generation: usize) -> f64 {
        let c = (self.constant * 0.05) * (-0.001 * generation as f64).exp();
        c * self.string_length as f64
    }

    /// Fixed-width code of one coordinate over its normalized range.
    #[inline]
    pub fn quantize(&self, bounds: &Bounds, d: usize, v: f64) -> u32 {
        let max = (1u32 << self.bits_per_dimension) - 1;
        let norm = bounds.normalize(d, v).clamp(0.0, 1.0);
        (norm * max as f64).round() as u32
    }

    pub fn hamming(&self, bounds: &Bounds, a: &[f64], b: &[f64]) -> u32 {
        a.iter()
            .zip(b)
            .enumerate()
            .map(|(d, (&x, &y))| {
                (self.quantize(bounds, d, x) ^ self.quantize(bounds, d, y)).count_ones()
            })
            .sum()
    }

    /// Scans pairs `i < j`; a close pair loses one member to a uniform reinit.
    ///
    /// A member is reinitialized at most once per call. Reinitialized candidates are
    /// evaluated with the bare objective. Returns how many were reinitialized.
    pub fn apply(
        &self,
        generation: usize,
        pop: &mut Population,
        bounds: &Bounds,
        objective: &dyn Objective,
        rng: &mut fastrand::Rng,
    ) -> usize {
        let threshold = self.threshold(generation);
        let n = pop.len();
        let mut reinitialized = vec![false; n];
        let mut count = 0;

        for i in 0..n {
            if reinitialized[i] {
                continue;
            }
            for j in (i + 1)..n {
                if reinitialized[j] {
                    continue;
                }
                let distance = self.hamming(
                    bounds,
                    &pop.candidates[i].position,
                    &pop.candidates[j].position,
                );
                if (distance as f64) < threshold {
                    let target = if rng.f64() < 0.5 { j } else { i };
                    if !reinitialized[target] {
                        let position = bounds.sample(rng);
                        let brightness = objective.evaluate(&position);
                        pop.candidates[target] = Candidate {
                            position,
                            brightness,
                        };
                        pop.commit(target);
                        reinitialized[target] = true;
                        count += 1;
                    }
                }
            }
        }
        count
    }
}
