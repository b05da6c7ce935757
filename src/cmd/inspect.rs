use crate::reports;
use floodfly::scenario::{Bounds, Scenario};

pub fn run(scenario: &Scenario) {
    println!(
        "\n📋 Scenario: {} zones × {} classes = {} dimensions",
        scenario.zone_count(),
        scenario.class_count(),
        scenario.dimensions()
    );
    reports::print_classes(scenario);
    reports::print_zones(scenario, &Bounds::for_scenario(scenario));
    reports::print_band_legend();

    let flags = [
        ("coordinates", scenario.has_coordinates()),
        ("current deployment", scenario.has_current()),
        ("population", scenario.has_population()),
    ];
    for (name, present) in flags {
        println!("   {} {}", if present { "✅" } else { "➖" }, name);
    }
}
