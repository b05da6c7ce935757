use serde::Serialize;

/// Descriptive statistics of one metric across runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (`n − 1`); zero for a single value.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    /// `None` for an empty input.
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        let std = if n > 1 {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        } else {
            0.0
        };
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            count: n,
            mean,
            std,
            min,
            max,
        })
    }

    /// Coefficient of variation; zero when the mean is zero.
    pub fn cv(&self) -> f64 {
        if self.mean != 0.0 {
            self.std / self.mean
        } else {
            0.0
        }
    }
}

/// Condensed result of one run inside a batch.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// 1-based
    pub run: usize,
    /// Maximization convention (`−best_value`).
    pub fitness: f64,
    pub best_value: f64,
    pub elapsed_ms: f64,
    pub generations: usize,
    pub reinitialized: usize,
}

/// Aggregates over the successful runs of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchStats {
    pub successful: usize,
    pub failed: usize,
    /// `max` is the best fitness, `min` the worst.
    pub fitness: Summary,
    /// `min` is the best minimized value, `max` the worst.
    pub best_value: Summary,
    pub elapsed_ms: Summary,
}

impl BatchStats {
    pub fn from_runs(runs: &[RunSummary], failed: usize) -> Option<Self> {
        let collect = |f: fn(&RunSummary) -> f64| runs.iter().map(f).collect::<Vec<_>>();
        Some(Self {
            successful: runs.len(),
            failed,
            fitness: Summary::of(&collect(|r| r.fitness))?,
            best_value: Summary::of(&collect(|r| r.best_value))?,
            elapsed_ms: Summary::of(&collect(|r| r.elapsed_ms))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_std() {
        let s = Summary::of(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((s.mean - 5.0).abs() < 1e-12);
        assert!((s.std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 9.0);
    }

    #[test]
    fn test_single_value_has_zero_spread() {
        let s = Summary::of(&[3.5]).unwrap();
        assert_eq!(s.std, 0.0);
        assert_eq!(s.cv(), 0.0);
        assert!(Summary::of(&[]).is_none());
    }
}
