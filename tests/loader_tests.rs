use floodfly::scenario::loader::{hazard_split_ratios, hazard_text_to_level, load_classes};
use floodfly::scenario::load_scenario;
use floodfly::FloodFlyError;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const CLASSES: &str = "class_id,class_name,lambda,supply\nSAR,Search and Rescue,1.0,50\nEMS,Medical,0.8,30\n";

struct Fixture {
    _dir: TempDir,
    zones: PathBuf,
    classes: PathBuf,
}

impl Fixture {
    fn new(zones_csv: &str, classes_csv: &str) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let zones = dir.path().join("zones.csv");
        let classes = dir.path().join("classes.csv");
        fs::write(&zones, zones_csv).unwrap();
        fs::write(&classes, classes_csv).unwrap();
        Self {
            _dir: dir,
            zones,
            classes,
        }
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_complete_rows_load_verbatim() {
    let fx = Fixture::new(
        "id,name,hazard_level_text,flood_depth_ft,population,exposure,total_personnel,SAR_current,EMS_current,lat,lon\n\
         Z1,Riverside,High,6.5,20000,1.4,30,20,10,14.65,121.10\n\
         Z2,Hillside,low,0.5,5000,0.6,12,8,4,14.67,121.11\n",
        CLASSES,
    );
    let s = load_scenario(&fx.zones, &fx.classes).unwrap();

    assert_eq!(s.zone_count(), 2);
    assert_eq!(s.class_count(), 2);
    let z1 = &s.zones()[0];
    assert_eq!(z1.id, "Z1");
    assert_eq!(z1.name, "Riverside");
    assert_eq!(z1.hazard_level, 3.0);
    assert_eq!(z1.flood_depth_ft, 6.5);
    assert_eq!(z1.exposure, 1.4);
    assert_eq!(z1.adaptive_capacity, 30.0);
    assert_eq!(z1.current, vec![20.0, 10.0]);
    assert_eq!(z1.population, Some(20000.0));
    assert_eq!(s.zones()[1].hazard_level, 1.0);
    assert!(s.has_coordinates());
    assert!(s.has_current());
    assert_eq!(s.supplies(), vec![50.0, 30.0]);
}

#[test]
fn test_missing_values_use_fallbacks() {
    let fx = Fixture::new(
        "id,name,hazard_level_text,flood_depth_ft,population,exposure,total_personnel\n\
         A,Alpha,High,6,1000,,10\n\
         B,Bravo,Medium,3,3000,2,\n",
        CLASSES,
    );
    let s = load_scenario(&fx.zones, &fx.classes).unwrap();
    let (a, b) = (&s.zones()[0], &s.zones()[1]);

    // Exposure: population over the mean population (2000)
    assert!(close(a.exposure, 0.5));
    assert!(close(b.exposure, 2.0));
    // Capacity: population share of the provided total (10)
    assert!(close(a.adaptive_capacity, 10.0));
    assert!(close(b.adaptive_capacity, 7.5));
    // Current split by hazard ratios
    assert!(close(a.current[0], 8.5) && close(a.current[1], 1.5));
    assert!(close(b.current[0], 5.625) && close(b.current[1], 1.875));
    assert!(!s.has_coordinates());
}

#[test]
fn test_alternative_coordinate_headers() {
    let fx = Fixture::new(
        "id,name,hazard_level_text,flood_depth_ft,population,exposure,total_personnel,latitude,longitude\n\
         A,Alpha,High,6,1000,1,10,14.6,121.0\n",
        CLASSES,
    );
    let s = load_scenario(&fx.zones, &fx.classes).unwrap();
    assert_eq!(s.zones()[0].coordinates(), Some((14.6, 121.0)));
}

#[test]
fn test_half_coordinates_are_dropped() {
    let fx = Fixture::new(
        "id,name,hazard_level_text,flood_depth_ft,population,exposure,total_personnel,lat,lon\n\
         A,Alpha,High,6,1000,1,10,14.6,\n\
         B,Bravo,Low,1,1000,1,10,14.7,121.1\n",
        CLASSES,
    );
    let s = load_scenario(&fx.zones, &fx.classes).unwrap();
    assert_eq!(s.zones()[0].lat, None);
    assert_eq!(s.zones()[0].lon, None);
    assert!(s.zones()[1].coordinates().is_some());
    assert!(!s.has_coordinates());
    assert!(s.coordinates().is_none());
}

#[rstest]
#[case("NaN", "121.0")]
#[case("14.6", "inf")]
#[case("-inf", "NaN")]
fn test_non_finite_coordinates_are_dropped(#[case] lat: &str, #[case] lon: &str) {
    let fx = Fixture::new(
        &format!(
            "id,name,hazard_level_text,flood_depth_ft,population,exposure,total_personnel,lat,lon\n\
             A,Alpha,High,6,1000,1,10,{lat},{lon}\n\
             B,Bravo,Low,1,1000,1,10,14.7,121.1\n"
        ),
        CLASSES,
    );
    let s = load_scenario(&fx.zones, &fx.classes).unwrap();
    assert_eq!(s.zones()[0].coordinates(), None);
    assert!(s.zones()[1].coordinates().is_some());
    assert!(!s.has_coordinates());
}

#[test]
fn test_missing_required_column_is_named() {
    let fx = Fixture::new(
        "id,name,hazard_level_text,population,exposure,total_personnel\nA,Alpha,High,1000,1,10\n",
        CLASSES,
    );
    match load_scenario(&fx.zones, &fx.classes) {
        Err(FloodFlyError::Validation(msg)) => assert!(msg.contains("flood_depth_ft"), "{}", msg),
        other => panic!("expected a validation error, got {:?}", other),
    }
}

#[test]
fn test_class_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("classes.csv");
    fs::write(&path, "class_id,class_name,lambda,supply\nSAR,Rescue,,\n\nEMS,Medical,0.5,12\n").unwrap();

    let classes = load_classes(&path).unwrap();
    assert_eq!(classes.len(), 2);
    assert_eq!(classes[0].lambda, 1.0);
    assert_eq!(classes[0].supply, 0.0);
    assert_eq!(classes[1].lambda, 0.5);
    assert_eq!(classes[1].supply, 12.0);
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_scenario(dir.path().join("nope.csv"), dir.path().join("nope2.csv")).is_err());
}

#[rstest]
#[case("High", 3.0)]
#[case("HIGHEST", 3.0)]
#[case(" medium ", 2.0)]
#[case("Med", 2.0)]
#[case("low", 1.0)]
#[case("unknown", 1.0)]
#[case("", 1.0)]
fn test_hazard_text(#[case] text: &str, #[case] level: f64) {
    assert_eq!(hazard_text_to_level(text), level);
}

#[rstest]
#[case(3.0, [0.85, 0.15])]
#[case(2.0, [0.75, 0.25])]
#[case(1.0, [0.65, 0.35])]
fn test_split_ratios(#[case] hazard: f64, #[case] ratios: [f64; 2]) {
    assert_eq!(hazard_split_ratios(hazard), ratios);
}
