use super::normalizer::by_descending_remainder;
use super::IntAllocation;
use crate::error::{FfResult, FloodFlyError};
use crate::objective::geo::distance_matrix;
use serde::Serialize;
use strum_macros::Display;
use tracing::debug;

const MIN_CURRENT_TOTAL: f64 = 1e-12;

/// How residual surplus is matched to residual deficit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum FlowStrategy {
    /// Two cursors over zones in stored index order.
    #[strum(to_string = "index-order")]
    IndexOrder,
    /// Largest deficit first, served from the nearest surplus.
    #[strum(to_string = "nearest-surplus")]
    NearestSurplus,
}

/// Zone-to-zone transfers per class.
#[derive(Debug, Clone, Serialize)]
pub struct FlowPlan {
    /// `flows[c][from][to]`; the diagonal holds self-retained units.
    pub flows: Vec<Vec<Vec<u64>>>,
    /// Current staffing rescaled to each class's target total: `[C][Z]`.
    pub scaled_current: Vec<Vec<u64>>,
    pub strategy: FlowStrategy,
}

impl FlowPlan {
    pub fn outgoing(&self, class: usize, zone: usize) -> u64 {
        self.flows[class][zone].iter().sum()
    }

    pub fn incoming(&self, class: usize, zone: usize) -> u64 {
        self.flows[class].iter().map(|row| row[zone]).sum()
    }

    /// Units that actually change zone, across all classes.
    pub fn transferred(&self) -> u64 {
        let mut moved = 0;
        for matrix in &self.flows {
            for (i, row) in matrix.iter().enumerate() {
                moved += row.iter().sum::<u64>() - row[i];
            }
        }
        moved
    }
}

/// Decomposes a target allocation into self-retention plus transfers.
///
/// `target` is `Z×C` (already integer valued), `current` is `[C][Z]`. Coordinates switch
/// on nearest-surplus matching only when every zone has a finite pair.
///
/// A class with no current staff anywhere (total ≤ 1e-12) has no source to move from:
/// its flow matrix stays all zero, so incoming totals are 0 rather than the target.
/// Those units are new deployments, not transfers.
pub fn allocate_flows(
    target: &IntAllocation,
    current: &[Vec<f64>],
    coordinates: Option<&[(f64, f64)]>,
) -> FfResult<FlowPlan> {
    let z_count = target.len();
    let c_count = target.first().map_or(0, Vec::len);
    if current.len() != c_count || current.iter().any(|col| col.len() != z_count) {
        return Err(FloodFlyError::Validation(format!(
            "current staffing must be {} classes × {} zones",
            c_count, z_count
        )));
    }

    let distances = coordinates
        .filter(|coords| {
            coords.len() == z_count
                && coords.iter().all(|(lat, lon)| lat.is_finite() && lon.is_finite())
        })
        .map(distance_matrix);
    let strategy = if distances.is_some() {
        FlowStrategy::NearestSurplus
    } else {
        FlowStrategy::IndexOrder
    };
    debug!("Flow decomposition over {} zones using {}", z_count, strategy);

    let mut flows = Vec::with_capacity(c_count);
    let mut scaled_current = Vec::with_capacity(c_count);

    for c in 0..c_count {
        let demand_target: Vec<u64> = target.iter().map(|row| row[c]).collect();
        let total: u64 = demand_target.iter().sum();
        let scaled = scale_and_round_to_sum(&current[c], total);

        let mut m = vec![vec![0u64; z_count]; z_count];
        let mut surplus = vec![0u64; z_count];
        let mut demand = vec![0u64; z_count];
        for i in 0..z_count {
            let keep = scaled[i].min(demand_target[i]);
            m[i][i] = keep;
            surplus[i] = scaled[i] - keep;
            demand[i] = demand_target[i] - keep;
        }

        match &distances {
            Some(dist) => match_nearest(&mut m, &mut surplus, &mut demand, dist),
            None => match_in_order(&mut m, &mut surplus, &mut demand),
        }

        flows.push(m);
        scaled_current.push(scaled);
    }

    Ok(FlowPlan {
        flows,
        scaled_current,
        strategy,
    })
}

fn match_in_order(m: &mut [Vec<u64>], surplus: &mut [u64], demand: &mut [u64]) {
    let n = surplus.len();
    let (mut i_sur, mut i_def) = (0, 0);
    loop {
        while i_sur < n && surplus[i_sur] == 0 {
            i_sur += 1;
        }
        while i_def < n && demand[i_def] == 0 {
            i_def += 1;
        }
        if i_sur >= n || i_def >= n {
            break;
        }
        let moved = surplus[i_sur].min(demand[i_def]);
        m[i_sur][i_def] += moved;
        surplus[i_sur] -= moved;
        demand[i_def] -= moved;
    }
}

fn match_nearest(m: &mut [Vec<u64>], surplus: &mut [u64], demand: &mut [u64], dist: &[Vec<f64>]) {
    loop {
        // Largest deficit; first index wins ties
        let mut def = None;
        let mut need_max = 0;
        for (i, &need) in demand.iter().enumerate() {
            if need > need_max {
                need_max = need;
                def = Some(i);
            }
        }
        let Some(def) = def else { break };

        let mut src = None;
        let mut best_d = f64::INFINITY;
        for (j, &extra) in surplus.iter().enumerate() {
            if extra > 0 && dist[j][def] < best_d {
                best_d = dist[j][def];
                src = Some(j);
            }
        }
        let Some(src) = src else { break };

        let moved = surplus[src].min(demand[def]);
        m[src][def] += moved;
        surplus[src] -= moved;
        demand[def] -= moved;
    }
}

/// Scales non-negative `values` to sum to `target`, then rounds by largest remainder
/// so the integer sum is exact. All zeros when `target` is 0 or `values` sum to ~0.
pub fn scale_and_round_to_sum(values: &[f64], target: u64) -> Vec<u64> {
    let n = values.len();
    let total: f64 = values.iter().map(|v| v.max(0.0)).sum();
    if target == 0 || total <= MIN_CURRENT_TOTAL {
        return vec![0; n];
    }

    let ratio = target as f64 / total;
    let scaled: Vec<f64> = values.iter().map(|v| v.max(0.0) * ratio).collect();
    let mut out: Vec<u64> = scaled.iter().map(|v| v.floor() as u64).collect();
    let remainders: Vec<f64> = scaled
        .iter()
        .zip(&out)
        .map(|(v, &f)| v - f as f64)
        .collect();

    let mut budget = target.saturating_sub(out.iter().sum());
    for i in by_descending_remainder(&remainders) {
        if budget == 0 {
            break;
        }
        out[i] += 1;
        budget -= 1;
    }
    out
}
