use super::{PersonnelClass, Scenario, Zone};
use crate::error::{FfResult, FloodFlyError};
use std::path::Path;
use tracing::{debug, info, warn};

/// SAR/EMS split of adaptive capacity used when current staffing columns are missing.
pub fn hazard_split_ratios(hazard_level: f64) -> [f64; 2] {
    if hazard_level >= 2.5 {
        [0.85, 0.15]
    } else if hazard_level >= 1.5 {
        [0.75, 0.25]
    } else {
        [0.65, 0.35]
    }
}

/// `low* → 1`, `med* → 2`, `high* → 3`, anything else → 1.
pub fn hazard_text_to_level(text: &str) -> f64 {
    let s = text.trim().to_ascii_lowercase();
    if s.starts_with("high") {
        3.0
    } else if s.starts_with("med") {
        2.0
    } else {
        1.0
    }
}

struct Header {
    names: Vec<String>,
}

impl Header {
    fn new(record: &csv::StringRecord) -> Self {
        Self {
            names: record.iter().map(|h| h.trim().to_ascii_lowercase()).collect(),
        }
    }

    fn optional(&self, key: &str) -> Option<usize> {
        self.names.iter().position(|n| n == key)
    }

    fn required(&self, key: &str, file: &str) -> FfResult<usize> {
        self.optional(key).ok_or_else(|| {
            FloodFlyError::Validation(format!("missing column '{}' in {}", key, file))
        })
    }
}

fn cell<'a>(rec: &'a csv::StringRecord, idx: Option<usize>) -> &'a str {
    idx.and_then(|i| rec.get(i)).map(str::trim).unwrap_or("")
}

fn parse_opt(s: &str) -> Option<f64> {
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok()
}

fn reader(path: &Path) -> FfResult<csv::Reader<std::fs::File>> {
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?)
}

/// Reads `class_id, class_name, lambda, supply`. Blank lambda → 1, blank supply → 0.
pub fn load_classes<P: AsRef<Path>>(path: P) -> FfResult<Vec<PersonnelClass>> {
    let path = path.as_ref();
    let mut rdr = reader(path)?;
    let header = Header::new(rdr.headers()?);
    let file = "classes file";
    let idx_id = header.required("class_id", file)?;
    let idx_name = header.required("class_name", file)?;
    let idx_lambda = header.required("lambda", file)?;
    let idx_supply = header.required("supply", file)?;

    let mut classes = Vec::new();
    for result in rdr.records() {
        let rec = result?;
        if rec.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        classes.push(PersonnelClass::new(
            cell(&rec, Some(idx_id)),
            cell(&rec, Some(idx_name)),
            parse_opt(cell(&rec, Some(idx_lambda))).unwrap_or(1.0),
            parse_opt(cell(&rec, Some(idx_supply))).unwrap_or(0.0),
        ));
    }
    debug!("Loaded {} personnel classes from {:?}", classes.len(), path);
    Ok(classes)
}

struct RawZone {
    id: String,
    name: String,
    hazard: f64,
    depth: f64,
    population: Option<f64>,
    exposure: Option<f64>,
    total: Option<f64>,
    current: Vec<Option<f64>>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Reads the zone table, deriving exposure, adaptive capacity and current staffing when absent.
pub fn load_zones<P: AsRef<Path>>(path: P, classes: &[PersonnelClass]) -> FfResult<Vec<Zone>> {
    let path = path.as_ref();
    let mut rdr = reader(path)?;
    let header = Header::new(rdr.headers()?);
    let file = "zones file";

    let idx_id = header.required("id", file)?;
    let idx_name = header.required("name", file)?;
    let idx_hazard = header.required("hazard_level_text", file)?;
    let idx_depth = header.required("flood_depth_ft", file)?;
    let idx_pop = header.required("population", file)?;
    let idx_exposure = header.required("exposure", file)?;
    let idx_total = header.required("total_personnel", file)?;
    let idx_current: Vec<Option<usize>> = classes
        .iter()
        .map(|c| header.optional(&format!("{}_current", c.id.to_ascii_lowercase())))
        .collect();
    let idx_lat = header
        .optional("lat")
        .or_else(|| header.optional("latitude"));
    let idx_lon = header
        .optional("lon")
        .or_else(|| header.optional("longitude"));

    let mut raw = Vec::new();
    for result in rdr.records() {
        let rec = result?;
        if rec.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        raw.push(RawZone {
            id: cell(&rec, Some(idx_id)).to_string(),
            name: cell(&rec, Some(idx_name)).to_string(),
            hazard: hazard_text_to_level(cell(&rec, Some(idx_hazard))),
            depth: parse_opt(cell(&rec, Some(idx_depth))).unwrap_or(0.0),
            population: parse_opt(cell(&rec, Some(idx_pop))),
            exposure: parse_opt(cell(&rec, Some(idx_exposure))),
            total: parse_opt(cell(&rec, Some(idx_total))),
            current: idx_current
                .iter()
                .map(|&idx| idx.and_then(|i| parse_opt(cell(&rec, Some(i)))))
                .collect(),
            lat: parse_opt(cell(&rec, idx_lat)),
            lon: parse_opt(cell(&rec, idx_lon)),
        });
    }

    // 1. Population statistics for the exposure and capacity fallbacks
    let populations: Vec<f64> = raw.iter().filter_map(|z| z.population).collect();
    let pop_sum: f64 = populations.iter().sum();
    let pop_mean = if populations.is_empty() {
        1.0
    } else {
        pop_sum / populations.len() as f64
    };
    let provided_total: f64 = raw.iter().filter_map(|z| z.total).sum();
    let fallback_total = if provided_total > 0.0 {
        provided_total
    } else {
        1.0
    };

    // 2. Derive per-zone values
    let mut zones = Vec::with_capacity(raw.len());
    let mut derived_current = 0usize;
    for z in raw {
        let exposure = match (z.exposure, z.population) {
            (Some(e), _) if e > 0.0 => e,
            (_, Some(p)) if pop_mean > 0.0 => p / pop_mean,
            _ => 1.0,
        };

        let adaptive_capacity = match (z.total, z.population) {
            (Some(t), _) => t,
            (None, Some(p)) if pop_sum > 0.0 => (p / pop_sum) * fallback_total,
            _ => 0.0,
        };

        let current = if z.current.iter().all(Option::is_some) {
            z.current.iter().map(|v| v.unwrap_or(0.0)).collect()
        } else {
            derived_current += 1;
            split_capacity(adaptive_capacity, z.hazard, classes.len())
        };

        let (lat, lon) = match (z.lat, z.lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                (Some(lat), Some(lon))
            }
            (None, None) => (None, None),
            _ => {
                warn!("⚠️  Zone '{}' has an incomplete coordinate pair; ignoring both.", z.id);
                (None, None)
            }
        };

        zones.push(Zone {
            id: z.id,
            name: z.name,
            hazard_level: z.hazard,
            flood_depth_ft: z.depth,
            exposure,
            adaptive_capacity,
            current,
            lat,
            lon,
            population: z.population,
        });
    }

    if derived_current > 0 {
        warn!(
            "⚠️  Derived current staffing from capacity for {} zone(s).",
            derived_current
        );
    }
    Ok(zones)
}

fn split_capacity(capacity: f64, hazard: f64, classes: usize) -> Vec<f64> {
    if capacity <= 0.0 || classes == 0 {
        return vec![0.0; classes];
    }
    if classes == 2 {
        let [first, _] = hazard_split_ratios(hazard);
        let a = first * capacity;
        return vec![a, (capacity - a).max(0.0)];
    }
    vec![capacity / classes as f64; classes]
}

/// Loads both tables and validates the resulting scenario.
pub fn load_scenario<P: AsRef<Path>, Q: AsRef<Path>>(zones: P, classes: Q) -> FfResult<Scenario> {
    info!("📂 Loading classes: {:?}", classes.as_ref());
    let classes = load_classes(classes)?;
    info!("📂 Loading zones: {:?}", zones.as_ref());
    let zones = load_zones(zones, &classes)?;
    let scenario = Scenario::new(zones, classes)?;
    info!(
        "✅ Scenario ready: {} zones × {} classes",
        scenario.zone_count(),
        scenario.class_count()
    );
    Ok(scenario)
}
