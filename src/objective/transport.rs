const MIN_UNITS: f64 = 1e-12;

/// Personnel moved and kilometer-weighted sum of the greedy transport plan.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransportEstimate {
    pub moved: f64,
    pub distance_sum: f64,
}

impl TransportEstimate {
    pub fn avg_km(&self, eps: f64) -> f64 {
        self.distance_sum / self.moved.max(eps)
    }
}

/// Greedy nearest-surplus approximation of the cost of moving from `current` to `target`.
///
/// Both slices are flattened `Z×C` (zone-major). Per class, the zone with the largest
/// remaining deficit is served from its nearest zone with surplus until one side runs dry.
pub fn greedy_transport(
    target: &[f64],
    current: &[f64],
    classes: usize,
    dist_km: &[Vec<f64>],
) -> TransportEstimate {
    let zones = dist_km.len();
    let mut demand = vec![0.0; zones];
    let mut surplus = vec![0.0; zones];
    let mut est = TransportEstimate::default();

    for c in 0..classes {
        for i in 0..zones {
            let k = i * classes + c;
            demand[i] = (target[k] - current[k]).max(0.0);
            surplus[i] = (current[k] - target[k]).max(0.0);
        }

        loop {
            // Largest deficit, first index wins ties
            let mut def = None;
            let mut need_max = 0.0;
            for (i, &need) in demand.iter().enumerate() {
                if need > MIN_UNITS && need > need_max {
                    need_max = need;
                    def = Some(i);
                }
            }
            let Some(def) = def else { break };

            let mut src = None;
            let mut best_d = f64::INFINITY;
            for (j, &extra) in surplus.iter().enumerate() {
                if extra > MIN_UNITS && dist_km[j][def] < best_d {
                    best_d = dist_km[j][def];
                    src = Some(j);
                }
            }
            let Some(src) = src else { break };

            let moved = surplus[src].min(demand[def]);
            est.moved += moved;
            est.distance_sum += moved * best_d;
            surplus[src] -= moved;
            demand[def] -= moved;
        }
    }
    est
}
