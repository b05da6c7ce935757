//! Benchmarks an integer allocation against a population-based staffing standard
//! (one responder per 500 residents, split by hazard level).

use crate::allocation::IntAllocation;
use crate::scenario::loader::hazard_split_ratios;
use crate::scenario::Scenario;
use crate::stats::Summary;
use serde::Serialize;
use strum_macros::Display;

pub const RESIDENTS_PER_RESPONDER: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum HazardLabel {
    High,
    Medium,
    Low,
}

impl HazardLabel {
    /// Depth bands in feet (1.5 m, 0.5 m, 0.2 m). Shallower than 0.2 m counts as medium.
    pub fn from_depth(depth_ft: f64) -> Self {
        if depth_ft > 4.92126 {
            HazardLabel::High
        } else if depth_ft > 1.64042 {
            HazardLabel::Medium
        } else if depth_ft >= 0.656168 {
            HazardLabel::Low
        } else {
            HazardLabel::Medium
        }
    }

    fn level(self) -> f64 {
        match self {
            HazardLabel::High => 3.0,
            HazardLabel::Medium => 2.0,
            HazardLabel::Low => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum QualityRating {
    Excellent,
    Strong,
    Good,
    Moderate,
    #[strum(to_string = "Needs Improvement")]
    NeedsImprovement,
}

impl QualityRating {
    /// From a closeness expressed in percent.
    pub fn from_percent(pct: f64) -> Self {
        if pct >= 90.0 {
            QualityRating::Excellent
        } else if pct >= 80.0 {
            QualityRating::Strong
        } else if pct >= 70.0 {
            QualityRating::Good
        } else if pct >= 60.0 {
            QualityRating::Moderate
        } else {
            QualityRating::NeedsImprovement
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneValidation {
    pub zone_id: String,
    pub zone_name: String,
    pub population: f64,
    pub hazard: HazardLabel,
    pub ideal_total: u64,
    pub actual_total: u64,
    pub ideal_per_class: Vec<u64>,
    pub actual_per_class: Vec<u64>,
    pub population_closeness: f64,
    pub class_closeness: Vec<f64>,
    pub hazard_closeness: f64,
    pub combined_closeness: f64,
    pub population_score: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverallStats {
    pub zones: usize,
    pub population_score: f64,
    pub population_closeness: f64,
    pub class_closeness: Vec<f64>,
    pub hazard_closeness: f64,
    pub combined_closeness: f64,
}

impl OverallStats {
    pub fn rating(&self) -> QualityRating {
        QualityRating::from_percent(self.combined_closeness * 100.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub zones: Vec<ZoneValidation>,
    pub overall: Option<OverallStats>,
}

/// Score from residents per allocated responder: ≤500 → 4, ≤1000 → 3, ≤2000 → 2, ≤3000 → 1.
pub fn population_score(population: f64, responders: u64) -> u8 {
    if responders == 0 {
        return 0;
    }
    let per_responder = population / responders as f64;
    if per_responder <= 500.0 {
        4
    } else if per_responder <= 1000.0 {
        3
    } else if per_responder <= 2000.0 {
        2
    } else if per_responder <= 3000.0 {
        1
    } else {
        0
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn closeness(actual: u64, ideal: u64) -> f64 {
    if ideal > 0 {
        actual as f64 / ideal as f64
    } else {
        1.0
    }
}

fn ideal_split(label: HazardLabel, classes: usize) -> Vec<f64> {
    if classes == 2 {
        hazard_split_ratios(label.level()).to_vec()
    } else {
        vec![1.0 / classes.max(1) as f64; classes]
    }
}

/// Validates every zone with a positive population.
pub fn validate_allocation(scenario: &Scenario, allocation: &IntAllocation) -> ValidationReport {
    let classes = scenario.class_count();
    let mut zones = Vec::new();

    for (zone, amounts) in scenario.zones().iter().zip(allocation) {
        let population = match zone.population {
            Some(p) if p > 0.0 => p,
            _ => continue,
        };
        let hazard = HazardLabel::from_depth(zone.flood_depth_ft);

        let ideal_total = (population / RESIDENTS_PER_RESPONDER).round() as u64;
        let actual_total: u64 = amounts.iter().sum();
        let ideal_per_class: Vec<u64> = ideal_split(hazard, classes)
            .iter()
            .map(|r| (ideal_total as f64 * r).round() as u64)
            .collect();

        let raw_class: Vec<f64> = amounts
            .iter()
            .zip(&ideal_per_class)
            .map(|(&a, &i)| closeness(a, i))
            .collect();
        let hazard_closeness = raw_class.iter().sum::<f64>() / classes.max(1) as f64;
        let population_closeness = round2(closeness(actual_total, ideal_total));
        let hazard_closeness = round2(hazard_closeness);

        zones.push(ZoneValidation {
            zone_id: zone.id.clone(),
            zone_name: zone.name.clone(),
            population,
            hazard,
            ideal_total,
            actual_total,
            ideal_per_class,
            actual_per_class: amounts.clone(),
            population_closeness,
            class_closeness: raw_class.into_iter().map(round2).collect(),
            hazard_closeness,
            combined_closeness: round2((population_closeness + hazard_closeness) / 2.0),
            population_score: population_score(population, actual_total),
        });
    }

    let overall = overall_stats(&zones, classes);
    ValidationReport { zones, overall }
}

fn overall_stats(zones: &[ZoneValidation], classes: usize) -> Option<OverallStats> {
    if zones.is_empty() {
        return None;
    }
    Some(OverallStats {
        zones: zones.len(),
        population_score: mean_of(zones, |z| z.population_score as f64),
        population_closeness: mean_of(zones, |z| z.population_closeness),
        class_closeness: (0..classes)
            .map(|c| mean_of(zones, |z| z.class_closeness[c]))
            .collect(),
        hazard_closeness: mean_of(zones, |z| z.hazard_closeness),
        combined_closeness: mean_of(zones, |z| z.combined_closeness),
    })
}

fn mean_of<F: Fn(&ZoneValidation) -> f64>(zones: &[ZoneValidation], f: F) -> f64 {
    round2(zones.iter().map(f).sum::<f64>() / zones.len() as f64)
}

/// Spread of one zone's closeness metrics across runs.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneMultiStats {
    pub zone_id: String,
    pub zone_name: String,
    pub population_closeness: Summary,
    pub class_closeness: Vec<Summary>,
    pub hazard_closeness: Summary,
    pub combined_closeness: Summary,
}

/// Spread of the overall validation metrics across runs.
#[derive(Debug, Clone, Serialize)]
pub struct MultiRunValidation {
    pub runs: usize,
    pub population_closeness: Summary,
    /// One summary per personnel class.
    pub class_closeness: Vec<Summary>,
    pub hazard_closeness: Summary,
    pub combined_closeness: Summary,
    pub population_score: Summary,
    pub zones: Vec<ZoneMultiStats>,
}

impl MultiRunValidation {
    pub fn from_reports(reports: &[ValidationReport]) -> Option<Self> {
        let overall: Vec<&OverallStats> =
            reports.iter().filter_map(|r| r.overall.as_ref()).collect();
        let pick =
            |f: &dyn Fn(&OverallStats) -> f64| overall.iter().map(|o| f(*o)).collect::<Vec<_>>();
        let classes = overall.first()?.class_closeness.len();
        Some(Self {
            runs: overall.len(),
            population_closeness: Summary::of(&pick(&|o| o.population_closeness))?,
            class_closeness: (0..classes)
                .map(|c| Summary::of(&pick(&|o| o.class_closeness[c])))
                .collect::<Option<Vec<_>>>()?,
            hazard_closeness: Summary::of(&pick(&|o| o.hazard_closeness))?,
            combined_closeness: Summary::of(&pick(&|o| o.combined_closeness))?,
            population_score: Summary::of(&pick(&|o| o.population_score))?,
            zones: zone_stats(reports, classes),
        })
    }

    pub fn rating(&self) -> QualityRating {
        QualityRating::from_percent(self.combined_closeness.mean * 100.0)
    }
}

/// Per-zone spread, zones matched by id across runs in the order of the first report.
fn zone_stats(reports: &[ValidationReport], classes: usize) -> Vec<ZoneMultiStats> {
    let Some(first) = reports.iter().find(|r| !r.zones.is_empty()) else {
        return Vec::new();
    };

    first
        .zones
        .iter()
        .filter_map(|zone| {
            let runs: Vec<&ZoneValidation> = reports
                .iter()
                .filter_map(|r| r.zones.iter().find(|z| z.zone_id == zone.zone_id))
                .collect();
            let pick = |f: &dyn Fn(&ZoneValidation) -> f64| {
                runs.iter().map(|z| f(*z)).collect::<Vec<_>>()
            };
            Some(ZoneMultiStats {
                zone_id: zone.zone_id.clone(),
                zone_name: zone.zone_name.clone(),
                population_closeness: Summary::of(&pick(&|z| z.population_closeness))?,
                class_closeness: (0..classes)
                    .map(|c| Summary::of(&pick(&|z| z.class_closeness[c])))
                    .collect::<Option<Vec<_>>>()?,
                hazard_closeness: Summary::of(&pick(&|z| z.hazard_closeness))?,
                combined_closeness: Summary::of(&pick(&|z| z.combined_closeness))?,
            })
        })
        .collect()
}
