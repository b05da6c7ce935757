use crate::scenario::Scenario;
use serde::Serialize;
use strum_macros::{Display, EnumIter};

/// Zones shallower than this must receive no personnel at all.
pub const NO_FLOOD_DEPTH_FT: f64 = 0.13;

const ZERO_ALLOCATION_TOL: f64 = 1e-6;

/// Flood severity band, selected by depth in feet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, Serialize)]
pub enum FloodBand {
    #[strum(to_string = "A: over the head")]
    OverHead,
    #[strum(to_string = "B: neck-deep")]
    NeckDeep,
    #[strum(to_string = "C: chest-deep")]
    ChestDeep,
    #[strum(to_string = "D: waist-deep")]
    WaistDeep,
    #[strum(to_string = "E: knee-deep")]
    KneeDeep,
    #[strum(to_string = "F: gutter-deep")]
    GutterDeep,
    #[strum(to_string = "G: no flood")]
    NoFlood,
}

impl FloodBand {
    pub fn from_depth(depth_ft: f64) -> Self {
        if depth_ft < NO_FLOOD_DEPTH_FT {
            FloodBand::NoFlood
        } else if depth_ft >= 5.0 {
            FloodBand::OverHead
        } else if depth_ft >= 4.75 {
            FloodBand::NeckDeep
        } else if depth_ft >= 4.0 {
            FloodBand::ChestDeep
        } else if depth_ft >= 2.75 {
            FloodBand::WaistDeep
        } else if depth_ft >= 1.5 {
            FloodBand::KneeDeep
        } else {
            FloodBand::GutterDeep
        }
    }

    /// Share of pre-disaster staffing that must be retained.
    /// `None` for [`FloodBand::NoFlood`], where the zone must stay empty instead.
    pub fn required_fraction(self) -> Option<f64> {
        match self {
            FloodBand::OverHead => Some(1.0),
            FloodBand::NeckDeep => Some(0.75),
            FloodBand::ChestDeep => Some(0.5),
            FloodBand::WaistDeep => Some(0.4),
            FloodBand::KneeDeep => Some(0.3),
            FloodBand::GutterDeep => Some(0.1),
            FloodBand::NoFlood => None,
        }
    }

    /// Smallest depth that falls into this band.
    pub fn min_depth_ft(self) -> f64 {
        match self {
            FloodBand::OverHead => 5.0,
            FloodBand::NeckDeep => 4.75,
            FloodBand::ChestDeep => 4.0,
            FloodBand::WaistDeep => 2.75,
            FloodBand::KneeDeep => 1.5,
            FloodBand::GutterDeep => NO_FLOOD_DEPTH_FT,
            FloodBand::NoFlood => 0.0,
        }
    }
}

/// Depth-driven retention rules over a flattened `Z×C` candidate.
#[derive(Debug, Clone)]
pub struct FeasibilityFilter {
    classes: usize,
    bands: Vec<FloodBand>,
    // Flattened like the decision vector, negatives clipped
    current: Vec<f64>,
}

impl FeasibilityFilter {
    pub fn new(scenario: &Scenario) -> Self {
        Self {
            classes: scenario.class_count(),
            bands: scenario
                .zones()
                .iter()
                .map(|z| FloodBand::from_depth(z.flood_depth_ft))
                .collect(),
            current: scenario.current_flat().iter().map(|v| v.max(0.0)).collect(),
        }
    }

    pub fn band(&self, zone: usize) -> FloodBand {
        self.bands[zone]
    }

    /// `true` when every zone meets its band's rule. Stops at the first violation.
    pub fn is_feasible(&self, x: &[f64]) -> bool {
        let c_count = self.classes;
        for (i, band) in self.bands.iter().enumerate() {
            let row = &x[i * c_count..(i + 1) * c_count];
            match band.required_fraction() {
                None => {
                    let total: f64 = row.iter().map(|v| v.max(0.0)).sum();
                    if total > ZERO_ALLOCATION_TOL {
                        return false;
                    }
                }
                Some(pct) => {
                    let current = &self.current[i * c_count..(i + 1) * c_count];
                    for (a, cur) in row.iter().zip(current) {
                        if a.max(0.0) < pct * cur {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }
}
