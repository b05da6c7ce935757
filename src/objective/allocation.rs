use super::geo::distance_matrix;
use super::transport::greedy_transport;
use super::Objective;
use crate::config::ObjectiveWeights;
use crate::scenario::Scenario;
use serde::Serialize;

/// Returned instead of NaN/∞ so the minimizer keeps a total order.
pub const NON_FINITE_SENTINEL: f64 = 1e30;

/// Every term of one evaluation, for reports.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ObjectiveBreakdown {
    pub coverage: f64,
    pub prioritization: f64,
    pub imbalance: f64,
    pub demand_satisfaction: f64,
    pub fitness: f64,
    pub total_allocated: f64,
    pub supply_penalty: f64,
    pub budget_penalty: f64,
    pub distance_penalty: f64,
    pub avg_km: Option<f64>,
    /// Minimized value: `-fitness + penalties`, or the sentinel.
    pub value: f64,
}

#[derive(Debug, Clone)]
struct DistanceModel {
    current: Vec<f64>,
    dist_km: Vec<Vec<f64>>,
}

/// Coverage + prioritization − imbalance + demand satisfaction, with supply repair and penalties.
#[derive(Debug, Clone)]
pub struct AllocationObjective {
    zones: usize,
    classes: usize,
    hazard: Vec<f64>,
    depth: Vec<f64>,
    exposure: Vec<f64>,
    capacity: Vec<f64>,
    lambda: Vec<f64>,
    supply: Vec<f64>,
    weights: ObjectiveWeights,
    distance: Option<DistanceModel>,
}

impl AllocationObjective {
    pub fn new(scenario: &Scenario, weights: &ObjectiveWeights) -> Self {
        let zones = scenario.zones();

        // Distance term only runs on complete data
        let distance = match scenario.coordinates() {
            Some(coords) if scenario.has_current() => Some(DistanceModel {
                current: scenario.current_flat(),
                dist_km: distance_matrix(&coords),
            }),
            _ => None,
        };

        Self {
            zones: scenario.zone_count(),
            classes: scenario.class_count(),
            hazard: zones.iter().map(|z| z.hazard_level).collect(),
            depth: zones.iter().map(|z| z.flood_depth_ft).collect(),
            exposure: zones.iter().map(|z| z.exposure).collect(),
            capacity: zones.iter().map(|z| z.adaptive_capacity).collect(),
            lambda: scenario.lambdas(),
            supply: scenario.supplies(),
            weights: weights.clone(),
            distance,
        }
    }

    pub fn distance_enabled(&self) -> bool {
        self.distance.is_some()
    }

    /// Clips negatives and scales every over-subscribed class column down to its supply.
    pub fn repair(&self, x: &[f64]) -> Vec<f64> {
        let c_count = self.classes;
        let mut a: Vec<f64> = x.iter().map(|v| v.max(0.0)).collect();
        for c in 0..c_count {
            let used: f64 = (0..self.zones).map(|i| a[i * c_count + c]).sum();
            let cap = self.supply[c];
            if used > cap {
                let scale = cap / used;
                for i in 0..self.zones {
                    a[i * c_count + c] *= scale;
                }
            }
        }
        a
    }

    pub fn breakdown(&self, x: &[f64]) -> ObjectiveBreakdown {
        let eps = self.weights.epsilon;
        let (z_count, c_count) = (self.zones, self.classes);
        let a = self.repair(x);

        // 1. Totals
        let row_totals: Vec<f64> = a.chunks(c_count).map(|row| row.iter().sum()).collect();
        let total: f64 = row_totals.iter().sum();
        let denom_total = total.max(eps);

        // 2. Coverage
        let covered = row_totals.iter().filter(|&&t| t > 0.0).count();
        let coverage = covered as f64 / z_count as f64;

        // 3. Prioritization
        let prioritized: f64 = row_totals
            .iter()
            .zip(&self.hazard)
            .map(|(t, r)| t * (1.0 + r.max(0.0)).ln())
            .sum();
        let prioritization = prioritized / denom_total;

        // 4. Imbalance (population std / mean)
        let mean = total / z_count as f64;
        let var = row_totals.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / z_count as f64;
        let imbalance = var.sqrt() / (mean + eps);

        // 5. Demand satisfaction
        let mut satisfied = 0.0;
        for i in 0..z_count {
            let severity = self.hazard[i].max(0.0) * self.depth[i].max(0.0);
            for c in 0..c_count {
                let demand =
                    self.lambda[c] * self.exposure[i] * severity / (self.capacity[i] + eps);
                satisfied += (a[i * c_count + c] / demand.max(eps)).min(1.0);
            }
        }
        let demand_satisfaction = satisfied / (z_count * c_count) as f64;

        let fitness = coverage + prioritization - imbalance + demand_satisfaction;

        // Penalties
        let mut supply_penalty = 0.0;
        for c in 0..c_count {
            let used: f64 = (0..z_count).map(|i| a[i * c_count + c]).sum();
            let viol = (used - self.supply[c]).max(0.0);
            supply_penalty += self.weights.weight_supply * viol * viol;
        }

        let budget_penalty = self
            .weights
            .target_total
            .map(|target| self.weights.weight_budget * (total - target).powi(2))
            .unwrap_or(0.0);

        let avg_km = self.distance.as_ref().map(|model| {
            greedy_transport(&a, &model.current, c_count, &model.dist_km).avg_km(eps)
        });
        let distance_penalty = avg_km
            .map(|km| self.weights.weight_distance * km)
            .unwrap_or(0.0);

        let penalty = supply_penalty + budget_penalty + distance_penalty;
        let value = if fitness.is_finite() && penalty.is_finite() {
            -fitness + penalty
        } else {
            NON_FINITE_SENTINEL
        };

        ObjectiveBreakdown {
            coverage,
            prioritization,
            imbalance,
            demand_satisfaction,
            fitness,
            total_allocated: total,
            supply_penalty,
            budget_penalty,
            distance_penalty,
            avg_km,
            value,
        }
    }
}

impl Objective for AllocationObjective {
    fn evaluate(&self, x: &[f64]) -> f64 {
        self.breakdown(x).value
    }
}
