use crate::error::{FfResult, FloodFlyError};
use serde::{Deserialize, Serialize};

/// A geographic response zone (barangay, district, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Zone {
    pub id: String,
    pub name: String,
    /// Hazard level on a 1 (low) to 3 (high) scale.
    pub hazard_level: f64,
    pub flood_depth_ft: f64,
    pub exposure: f64,
    /// Adaptive capacity: personnel the zone can already field.
    pub adaptive_capacity: f64,
    /// Pre-disaster staffing, one entry per personnel class.
    pub current: Vec<f64>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub population: Option<f64>,
}

impl Zone {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        hazard_level: f64,
        flood_depth_ft: f64,
        exposure: f64,
        adaptive_capacity: f64,
        current: Vec<f64>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            hazard_level,
            flood_depth_ft,
            exposure,
            adaptive_capacity,
            current,
            lat: None,
            lon: None,
            population: None,
        }
    }

    pub fn with_coordinates(mut self, lat: f64, lon: f64) -> Self {
        self.lat = Some(lat);
        self.lon = Some(lon);
        self
    }

    pub fn with_population(mut self, population: f64) -> Self {
        self.population = Some(population);
        self
    }

    /// Both coordinates present and finite.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }

    pub fn current_total(&self) -> f64 {
        self.current.iter().map(|v| v.max(0.0)).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonnelClass {
    pub id: String,
    pub name: String,
    /// Demand weight.
    pub lambda: f64,
    pub supply: f64,
}

impl PersonnelClass {
    pub fn new(id: impl Into<String>, name: impl Into<String>, lambda: f64, supply: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lambda,
            supply,
        }
    }
}

/// Static input of one optimization: zones and the personnel classes to spread over them.
///
/// Constructed through [`Scenario::new`], which validates shapes and invariants once.
/// Everything downstream treats the scenario as read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    zones: Vec<Zone>,
    classes: Vec<PersonnelClass>,
}

impl Scenario {
    pub fn new(zones: Vec<Zone>, classes: Vec<PersonnelClass>) -> FfResult<Self> {
        let scenario = Self { zones, classes };
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> FfResult<()> {
        if self.zones.is_empty() {
            return Err(FloodFlyError::Validation("scenario has no zones".into()));
        }
        if self.classes.is_empty() {
            return Err(FloodFlyError::Validation(
                "scenario has no personnel classes".into(),
            ));
        }

        let c = self.classes.len();
        for class in &self.classes {
            if !class.supply.is_finite() || class.supply < 0.0 {
                return Err(FloodFlyError::Validation(format!(
                    "class '{}' has invalid supply {}",
                    class.id, class.supply
                )));
            }
            if !class.lambda.is_finite() {
                return Err(FloodFlyError::Validation(format!(
                    "class '{}' has non-finite lambda",
                    class.id
                )));
            }
        }

        for zone in &self.zones {
            if zone.current.len() != c {
                return Err(FloodFlyError::Validation(format!(
                    "zone '{}' lists {} current counts, expected {}",
                    zone.id,
                    zone.current.len(),
                    c
                )));
            }
            if !zone.adaptive_capacity.is_finite() || zone.adaptive_capacity < 0.0 {
                return Err(FloodFlyError::Validation(format!(
                    "zone '{}' has invalid adaptive capacity {}",
                    zone.id, zone.adaptive_capacity
                )));
            }
            let half_present = zone.lat.is_some() != zone.lon.is_some();
            let non_finite = zone.lat.is_some_and(|v| !v.is_finite())
                || zone.lon.is_some_and(|v| !v.is_finite());
            if half_present || non_finite {
                return Err(FloodFlyError::Validation(format!(
                    "zone '{}' must carry both coordinates as finite numbers or neither",
                    zone.id
                )));
            }
        }
        Ok(())
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn classes(&self) -> &[PersonnelClass] {
        &self.classes
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Length of a flattened decision vector (`Z * C`).
    pub fn dimensions(&self) -> usize {
        self.zones.len() * self.classes.len()
    }

    #[inline]
    pub fn index(&self, zone: usize, class: usize) -> usize {
        zone * self.classes.len() + class
    }

    pub fn has_coordinates(&self) -> bool {
        self.zones.iter().all(|z| z.coordinates().is_some())
    }

    pub fn has_current(&self) -> bool {
        self.zones
            .iter()
            .all(|z| z.current.iter().all(|v| v.is_finite()))
    }

    pub fn has_population(&self) -> bool {
        self.zones
            .iter()
            .any(|z| z.population.is_some_and(|p| p > 0.0))
    }

    /// All coordinates, or `None` if any zone lacks a finite pair.
    pub fn coordinates(&self) -> Option<Vec<(f64, f64)>> {
        self.zones.iter().map(Zone::coordinates).collect()
    }

    pub fn supplies(&self) -> Vec<f64> {
        self.classes.iter().map(|c| c.supply).collect()
    }

    pub fn lambdas(&self) -> Vec<f64> {
        self.classes.iter().map(|c| c.lambda).collect()
    }

    /// Current staffing laid out per class: `[C][Z]`.
    pub fn current_matrix(&self) -> Vec<Vec<f64>> {
        (0..self.classes.len())
            .map(|c| self.zones.iter().map(|z| z.current[c]).collect())
            .collect()
    }

    /// Current staffing flattened in decision-vector order.
    pub fn current_flat(&self) -> Vec<f64> {
        self.zones
            .iter()
            .flat_map(|z| z.current.iter().copied())
            .collect()
    }
}
