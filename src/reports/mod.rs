use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use floodfly::allocation::{AllocationRow, FlowRow};
use floodfly::objective::{FloodBand, ObjectiveBreakdown};
use floodfly::optimizer::BatchReport;
use floodfly::scenario::{Bounds, Scenario};
use floodfly::stats::Summary;
use floodfly::validation::{MultiRunValidation, QualityRating, ValidationReport};
use strum::IntoEnumIterator;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|n| Cell::new(n).add_attribute(Attribute::Bold))
        .collect()
}

fn align_right_from(table: &mut Table, first: usize, count: usize) {
    for i in first..count {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn rating_cell(rating: QualityRating) -> Cell {
    let color = match rating {
        QualityRating::Excellent | QualityRating::Strong => Color::Green,
        QualityRating::Good | QualityRating::Moderate => Color::Yellow,
        QualityRating::NeedsImprovement => Color::Red,
    };
    Cell::new(rating).fg(color).add_attribute(Attribute::Bold)
}

fn band_color(band: FloodBand) -> Color {
    match band {
        FloodBand::OverHead | FloodBand::NeckDeep => Color::Red,
        FloodBand::ChestDeep | FloodBand::WaistDeep => Color::Yellow,
        FloodBand::KneeDeep | FloodBand::GutterDeep => Color::Cyan,
        FloodBand::NoFlood => Color::Green,
    }
}

pub fn print_classes(scenario: &Scenario) {
    let mut table = new_table();
    table.set_header(header(&["Class", "Name", "Lambda", "Supply"]));
    for class in scenario.classes() {
        table.add_row(vec![
            Cell::new(&class.id).add_attribute(Attribute::Bold),
            Cell::new(&class.name),
            Cell::new(format!("{:.2}", class.lambda)),
            Cell::new(format!("{:.0}", class.supply)),
        ]);
    }
    align_right_from(&mut table, 2, 4);
    println!("\n{}", table);
}

pub fn print_zones(scenario: &Scenario, bounds: &Bounds) {
    let mut table = new_table();
    let mut names = vec!["Zone", "Name", "Hazard", "Depth ft", "Band", "Keep %", "AC"];
    let class_ids: Vec<&str> = scenario.classes().iter().map(|c| c.id.as_str()).collect();
    names.extend(class_ids.iter().copied());
    names.push("Upper");
    table.set_header(header(&names));

    for (z, zone) in scenario.zones().iter().enumerate() {
        let band = FloodBand::from_depth(zone.flood_depth_ft);
        let keep = band
            .required_fraction()
            .map_or_else(|| "empty".to_string(), |f| format!("{:.0}", f * 100.0));

        let mut row = vec![
            Cell::new(&zone.id).add_attribute(Attribute::Bold),
            Cell::new(&zone.name),
            Cell::new(format!("{:.2}", zone.hazard_level)),
            Cell::new(format!("{:.2}", zone.flood_depth_ft)),
            Cell::new(band.to_string()).fg(band_color(band)),
            Cell::new(keep),
            Cell::new(format!("{:.0}", zone.adaptive_capacity)),
        ];
        row.extend(zone.current.iter().map(|v| Cell::new(format!("{:.0}", v))));
        let upper = bounds.upper()[scenario.index(z, 0)];
        row.push(Cell::new(format!("{:.0}", upper)));
        table.add_row(row);
    }
    align_right_from(&mut table, 2, names.len());
    println!("\n{}", table);
}

/// Depth bands and the share of current staff each must keep.
pub fn print_band_legend() {
    let mut table = new_table();
    table.set_header(header(&["Band", "From ft", "Keep %"]));
    for band in FloodBand::iter() {
        let keep = band
            .required_fraction()
            .map_or_else(|| "none allowed".to_string(), |f| format!("{:.0}", f * 100.0));
        table.add_row(vec![
            Cell::new(band.to_string()).fg(band_color(band)),
            Cell::new(format!("{:.2}", band.min_depth_ft())),
            Cell::new(keep),
        ]);
    }
    align_right_from(&mut table, 1, 3);
    println!("\n{}", table);
}

pub fn print_breakdown(b: &ObjectiveBreakdown) {
    let mut table = new_table();
    table.set_header(header(&["Term", "Value"]));

    let rows = [
        ("Coverage", b.coverage, None),
        ("Prioritization", b.prioritization, None),
        ("Imbalance", b.imbalance, Some(Color::Red)),
        ("Demand satisfaction", b.demand_satisfaction, Some(Color::Green)),
        ("Supply penalty", b.supply_penalty, Some(Color::Red)),
        ("Budget penalty", b.budget_penalty, Some(Color::Red)),
        ("Distance penalty", b.distance_penalty, Some(Color::Red)),
        ("Total allocated", b.total_allocated, None),
    ];
    for (name, value, color) in rows {
        let mut cell = Cell::new(format!("{:.6}", value));
        if let Some(c) = color {
            cell = cell.fg(c);
        }
        table.add_row(vec![Cell::new(name), cell]);
    }
    if let Some(km) = b.avg_km {
        table.add_row(vec![Cell::new("Avg transfer km"), Cell::new(format!("{:.3}", km))]);
    }
    table.add_row(vec![
        Cell::new("Fitness").add_attribute(Attribute::Bold),
        Cell::new(format!("{:.6}", b.fitness))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
    ]);
    align_right_from(&mut table, 1, 2);
    println!("\n{}", table);
}

pub fn print_allocation(scenario: &Scenario, rows: &[AllocationRow]) {
    let mut table = new_table();
    let mut names = vec!["Zone", "Name"];
    names.extend(scenario.classes().iter().map(|c| c.id.as_str()));
    names.push("Total");
    table.set_header(header(&names));

    let mut totals = vec![0u64; scenario.class_count()];
    for row in rows {
        let mut cells = vec![
            Cell::new(&row.zone_id).add_attribute(Attribute::Bold),
            Cell::new(&row.zone_name),
        ];
        for (c, amount) in row.amounts.iter().enumerate() {
            totals[c] += amount;
            cells.push(Cell::new(amount));
        }
        cells.push(Cell::new(row.total).fg(Color::Cyan));
        table.add_row(cells);
    }

    let mut footer = vec![Cell::new("Σ").add_attribute(Attribute::Bold), Cell::new("")];
    footer.extend(totals.iter().map(|t| Cell::new(t).add_attribute(Attribute::Bold)));
    footer.push(Cell::new(totals.iter().sum::<u64>()).add_attribute(Attribute::Bold));
    table.add_row(footer);

    align_right_from(&mut table, 2, names.len());
    println!("\n{}", table);
}

/// Transfers only; self-retention rows are summarized in the footer line.
pub fn print_flows(rows: &[FlowRow]) {
    let (retained, moved): (Vec<&FlowRow>, Vec<&FlowRow>) =
        rows.iter().partition(|r| r.is_self_retention());

    if moved.is_empty() {
        println!("\n🚚 No transfers needed.");
    } else {
        let mut table = new_table();
        table.set_header(header(&["Class", "From", "To", "Units"]));
        for r in &moved {
            table.add_row(vec![
                Cell::new(&r.class_name),
                Cell::new(format!("{} ({})", r.from_name, r.from_id)),
                Cell::new(format!("{} ({})", r.to_name, r.to_id)),
                Cell::new(r.units).fg(Color::Yellow),
            ]);
        }
        align_right_from(&mut table, 3, 4);
        println!("\n{}", table);
    }

    let kept: u64 = retained.iter().map(|r| r.units).sum();
    let transferred: u64 = moved.iter().map(|r| r.units).sum();
    println!("   Retained in place: {} | Transferred: {}", kept, transferred);
}

pub fn print_validation(scenario: &Scenario, report: &ValidationReport) {
    let mut table = new_table();
    let mut names = vec!["Zone", "Population", "Hazard", "Ideal", "Actual"];
    names.extend(scenario.classes().iter().map(|c| c.id.as_str()));
    names.extend(["Pop %", "Hazard %", "Combined %", "Score"]);
    table.set_header(header(&names));

    for z in &report.zones {
        let mut cells = vec![
            Cell::new(&z.zone_name).add_attribute(Attribute::Bold),
            Cell::new(format!("{:.0}", z.population)),
            Cell::new(z.hazard.to_string()),
            Cell::new(z.ideal_total),
            Cell::new(z.actual_total),
        ];
        cells.extend(
            z.actual_per_class
                .iter()
                .zip(&z.ideal_per_class)
                .map(|(a, i)| Cell::new(format!("{}/{}", a, i))),
        );
        cells.extend([
            Cell::new(format!("{:.0}", z.population_closeness * 100.0)),
            Cell::new(format!("{:.0}", z.hazard_closeness * 100.0)),
            Cell::new(format!("{:.0}", z.combined_closeness * 100.0)).fg(Color::Cyan),
            Cell::new(z.population_score),
        ]);
        table.add_row(cells);
    }
    align_right_from(&mut table, 1, names.len());
    println!("\n{}", table);

    if let Some(o) = &report.overall {
        let mut overall = new_table();
        overall.set_header(header(&["Zones", "Pop %", "Hazard %", "Combined %", "Score", "Rating"]));
        overall.add_row(vec![
            Cell::new(o.zones),
            Cell::new(format!("{:.0}", o.population_closeness * 100.0)),
            Cell::new(format!("{:.0}", o.hazard_closeness * 100.0)),
            Cell::new(format!("{:.0}", o.combined_closeness * 100.0)).fg(Color::Cyan),
            Cell::new(format!("{:.2}", o.population_score)),
            rating_cell(o.rating()),
        ]);
        println!("{}", overall);
    }
}

fn summary_row(name: &str, s: &Summary, precision: usize) -> Vec<Cell> {
    vec![
        Cell::new(name).add_attribute(Attribute::Bold),
        Cell::new(format!("{:.*}", precision, s.mean)).fg(Color::Cyan),
        Cell::new(format!("{:.*}", precision, s.std)),
        Cell::new(format!("{:.*}", precision, s.min)),
        Cell::new(format!("{:.*}", precision, s.max)),
        Cell::new(format!("{:.2}%", s.cv() * 100.0)),
    ]
}

pub fn print_batch(batch: &BatchReport) {
    let mut runs = new_table();
    runs.set_header(header(&["Run", "Fitness", "Objective", "Gens", "Reinit", "ms"]));
    for r in &batch.runs {
        runs.add_row(vec![
            Cell::new(r.run),
            Cell::new(format!("{:.6}", r.fitness)).fg(Color::Cyan),
            Cell::new(format!("{:.6}", r.best_value)),
            Cell::new(r.generations),
            Cell::new(r.reinitialized),
            Cell::new(format!("{:.0}", r.elapsed_ms)),
        ]);
    }
    align_right_from(&mut runs, 0, 6);
    println!("\n{}", runs);

    for (_, msg) in &batch.errors {
        println!("   ❌ {}", msg);
    }

    if let Some(stats) = &batch.stats {
        let mut table = new_table();
        table.set_header(header(&["Metric", "Mean", "Std", "Min", "Max", "CV"]));
        table.add_row(summary_row("Fitness", &stats.fitness, 6));
        table.add_row(summary_row("Objective", &stats.best_value, 6));
        table.add_row(summary_row("Time (ms)", &stats.elapsed_ms, 0));
        align_right_from(&mut table, 1, 6);
        println!("\n{}", table);
        println!(
            "   {} successful | {} failed | {:.2?} total",
            stats.successful, stats.failed, batch.elapsed
        );
    }
}

pub fn print_multi_validation(scenario: &Scenario, v: &MultiRunValidation) {
    let mut table = new_table();
    table.set_header(header(&["Closeness", "Mean", "Std", "Min", "Max", "CV"]));
    table.add_row(summary_row("Population", &v.population_closeness, 2));
    for (class, s) in scenario.classes().iter().zip(&v.class_closeness) {
        table.add_row(summary_row(&class.id, s, 2));
    }
    table.add_row(summary_row("Hazard", &v.hazard_closeness, 2));
    table.add_row(summary_row("Combined", &v.combined_closeness, 2));
    table.add_row(summary_row("Pop. score", &v.population_score, 2));
    align_right_from(&mut table, 1, 6);
    table.add_row(vec![
        Cell::new("Rating").add_attribute(Attribute::Bold),
        rating_cell(v.rating()),
    ]);
    println!("\n📐 Validation over {} runs", v.runs);
    println!("{}", table);

    if v.zones.is_empty() {
        return;
    }
    let mut zones = new_table();
    let mut names = vec!["Zone", "Pop % (±)"];
    names.extend(scenario.classes().iter().map(|c| c.id.as_str()));
    names.extend(["Hazard % (±)", "Combined % (±)", "CV"]);
    zones.set_header(header(&names));
    let pct = |s: &Summary| format!("{:.0} ±{:.0}", s.mean * 100.0, s.std * 100.0);
    for z in &v.zones {
        let mut cells = vec![
            Cell::new(&z.zone_name).add_attribute(Attribute::Bold),
            Cell::new(pct(&z.population_closeness)),
        ];
        cells.extend(z.class_closeness.iter().map(|s| Cell::new(pct(s))));
        cells.extend([
            Cell::new(pct(&z.hazard_closeness)),
            Cell::new(pct(&z.combined_closeness)).fg(Color::Cyan),
            Cell::new(format!("{:.2}%", z.combined_closeness.cv() * 100.0)),
        ]);
        zones.add_row(cells);
    }
    align_right_from(&mut zones, 1, names.len());
    println!("{}", zones);
}
