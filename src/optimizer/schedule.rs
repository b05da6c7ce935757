//! Per-generation coefficient schedules shared by both firefly variants.

/// Baseline dimension the step factor's `theta` is calibrated against.
pub const STEP_BASELINE_DIMENSIONS: f64 = 50.0;

/// Share of the average bound range kept as the smallest step factor.
const STEP_FLOOR_SHARE: f64 = 0.001;

/// `α(gen) = αF + (α0 − αF)·exp(−0.1·gen)`, with `gen` 0-based.
#[inline]
pub fn alpha_decay(alpha0: f64, alpha_final: f64, generation: usize) -> f64 {
    alpha_final + (alpha0 - alpha_final) * (-0.1 * generation as f64).exp()
}

/// Attraction `β0·exp(−γ r²)`.
#[inline]
pub fn attractiveness(r: f64, gamma: f64, beta0: f64) -> f64 {
    beta0 * (-gamma * r * r).exp()
}

/// Attraction floored at `beta_min`.
#[inline]
pub fn attractiveness_with_min(r: f64, gamma: f64, beta0: f64, beta_min: f64) -> f64 {
    attractiveness(r, gamma, beta0).max(beta_min)
}

/// Log-shaped inertia from `w1` toward `w2`.
///
/// `t` is 1-based and clamped to `[1, total]`. Progress is `ln t / ln T`; with a single
/// generation it is 1. The result is clamped to `[min(w1, w2), max(w1, w2)]`.
pub fn inertia_weight(t: usize, total: usize, w1: f64, w2: f64, rate: f64) -> f64 {
    if w1.is_nan() || w2.is_nan() || rate.is_nan() {
        return f64::NAN;
    }
    let total = total.max(1);
    let t = t.clamp(1, total);

    let log_den = (total as f64).ln();
    let progress = if log_den > 0.0 {
        (t as f64).ln() / log_den
    } else {
        1.0
    };

    let wt = w1 - rate * (w1 - w2) * progress;
    wt.clamp(w1.min(w2), w1.max(w2))
}

/// Dimension-compensated step factor `θ_eff^D · T · exp(−t/T)`.
///
/// `θ_eff = clamp(θ, 0, 1)^(50 / max(1, D))`, floored by `0.001 · avg_range · exp(−t/T)`.
/// Non-finite or negative results collapse to zero.
pub fn step_factor(t: usize, total: usize, theta: f64, dimensions: usize, avg_range: f64) -> f64 {
    if theta.is_nan() {
        return f64::NAN;
    }
    let total = total.max(1);
    let t = t.clamp(1, total);
    let dim = dimensions as f64;

    let theta_eff = theta
        .clamp(0.0, 1.0)
        .powf(STEP_BASELINE_DIMENSIONS / dim.max(1.0));
    let decay = (-(t as f64) / total as f64).exp();
    let mut c = theta_eff.powf(dim) * total as f64 * decay;

    let floor = if avg_range > 0.0 {
        STEP_FLOOR_SHARE * avg_range * decay
    } else {
        0.0
    };
    c = c.max(floor);

    if !c.is_finite() || c < 0.0 {
        0.0
    } else {
        c
    }
}

/// `γ = −ln(τ) / r0²`: attraction falls to `τ·β0` at normalized distance `r0`.
pub fn tune_gamma_by_influence_radius(r0: f64, tau: f64) -> f64 {
    let rr = r0.max(1e-9);
    let tt = tau.clamp(1e-9, 0.999999);
    -tt.ln() / (rr * rr)
}
