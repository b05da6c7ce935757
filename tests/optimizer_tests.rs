use floodfly::config::{AdaptiveParams, Config, SearchParams, Variant};
use floodfly::objective::{AllocationObjective, FeasibilityFilter, Objective};
use floodfly::optimizer::extended::normalized_distance;
use floodfly::optimizer::schedule::{alpha_decay, step_factor, tune_gamma_by_influence_radius};
use floodfly::optimizer::{
    ExtendedFirefly, Firefly, GenerationSnapshot, Metaheuristic, OptimizationOptions, Optimizer,
    RunOutcome,
};
use floodfly::scenario::{Bounds, PersonnelClass, Scenario, Zone};
use floodfly::FloodFlyError;
use std::sync::Arc;
use std::time::Duration;

fn sphere() -> Arc<dyn Objective> {
    Arc::new(|x: &[f64]| x.iter().map(|v| (v - 1.0) * (v - 1.0)).sum::<f64>())
}

fn small_search(seed: u64) -> SearchParams {
    SearchParams {
        generations: 30,
        population: 12,
        seed: Some(seed),
        ..SearchParams::default()
    }
}

fn assert_monotone(trace: &[f64]) {
    for pair in trace.windows(2) {
        assert!(pair[1] <= pair[0], "trace went up: {} → {}", pair[0], pair[1]);
    }
}

fn scenario() -> Arc<Scenario> {
    let zones = vec![
        Zone::new("Z1", "Riverside", 3.0, 6.0, 1.4, 30.0, vec![12.0, 6.0])
            .with_coordinates(14.65, 121.10)
            .with_population(30_000.0),
        Zone::new("Z2", "Hillside", 2.0, 3.0, 1.0, 20.0, vec![8.0, 4.0])
            .with_coordinates(14.67, 121.11)
            .with_population(12_000.0),
        Zone::new("Z3", "Uptown", 1.0, 0.0, 0.6, 10.0, vec![4.0, 4.0])
            .with_coordinates(14.64, 121.08)
            .with_population(8_000.0),
    ];
    let classes = vec![
        PersonnelClass::new("SAR", "Search and Rescue", 1.0, 40.0),
        PersonnelClass::new("EMS", "Medical", 0.8, 20.0),
    ];
    Arc::new(Scenario::new(zones, classes).unwrap())
}

fn optimizer(variant: Variant, seed: Option<u64>) -> Optimizer {
    let mut config = Config::default();
    config.search.generations = 20;
    config.search.population = 10;
    config.search.seed = seed;
    let mut options = OptimizationOptions::from(&config);
    options.variant = variant;
    Optimizer::new(scenario(), &config.objective, options)
}

fn keep_going(_: usize, _: &GenerationSnapshot) -> bool {
    true
}

#[test]
fn test_baseline_trace_is_monotone_and_in_bounds() {
    let bounds = Bounds::uniform(4, -5.0, 5.0).unwrap();
    let mut fa = Firefly::new(
        sphere(),
        bounds.clone(),
        &small_search(1),
        fastrand::Rng::with_seed(1),
    );
    let initial = fa.best_value();

    let trace: Vec<f64> = fa.generations().map(|s| s.best_value).collect();
    assert_eq!(trace.len(), 30);
    assert_monotone(&trace);
    assert!(fa.best_value() <= initial);
    assert!(bounds.contains(fa.best()));
    assert!(fa.population().candidates.iter().all(|c| bounds.contains(&c.position)));
    assert!(fa.step().is_none());
}

#[test]
fn test_extended_reports_diagnostics() {
    let bounds = Bounds::uniform(3, -5.0, 5.0).unwrap();
    let mut efa = ExtendedFirefly::new(
        sphere(),
        bounds.clone(),
        &small_search(2),
        &AdaptiveParams::default(),
        fastrand::Rng::with_seed(2),
    );

    let snaps: Vec<GenerationSnapshot> = efa.generations().collect();
    assert_eq!(snaps.len(), 30);
    assert_eq!(snaps[0].generation, 1);
    assert_eq!(snaps[29].generation, 30);
    assert_monotone(&snaps.iter().map(|s| s.best_value).collect::<Vec<_>>());

    for s in &snaps {
        let d = s.diagnostics.expect("extended variant reports diagnostics");
        assert!(d.avg_beta == 0.0 || d.avg_beta >= 0.2 - 1e-12);
        assert!(d.inertia <= 0.9 + 1e-12 && d.inertia >= 0.4 - 1e-12);
        assert_eq!(d.moves_toward + d.random_walks, 12 * 12);
    }
    assert!(bounds.contains(efa.best()));
}

#[test]
fn test_same_seed_same_trajectory() {
    let run = |seed: u64| {
        let mut efa = ExtendedFirefly::new(
            sphere(),
            Bounds::uniform(3, -5.0, 5.0).unwrap(),
            &small_search(seed),
            &AdaptiveParams::default(),
            fastrand::Rng::with_seed(seed),
        );
        efa.generations().map(|s| s.best_value).collect::<Vec<_>>()
    };
    assert_eq!(run(11), run(11));
}

#[test]
fn test_gamma_from_influence_radius() {
    let gamma = tune_gamma_by_influence_radius(1.0, 0.6);
    assert!((gamma - 0.5108).abs() < 1e-4);

    let mut efa = ExtendedFirefly::new(
        sphere(),
        Bounds::uniform(2, 0.0, 1.0).unwrap(),
        &small_search(3),
        &AdaptiveParams::default(),
        fastrand::Rng::with_seed(3),
    );
    assert_eq!(efa.gamma(), 1.0);
    efa.tune_gamma_by_influence_radius(1.0, 0.6);
    assert!((efa.gamma() - 0.5108).abs() < 1e-4);
    efa.set_gamma(2.0);
    assert_eq!(efa.gamma(), 2.0);
}

#[test]
fn test_schedules() {
    assert_eq!(alpha_decay(0.6, 0.05, 0), 0.6);
    assert!(alpha_decay(0.6, 0.05, 1000) - 0.05 < 1e-9);
    // Never vanishes while the average range is positive
    assert!(step_factor(300, 300, 0.9, 2000, 10.0) > 0.0);
}

#[test]
fn test_normalized_distance_is_scale_free() {
    let bounds = Bounds::new(vec![0.0, 0.0], vec![10.0, 1000.0]).unwrap();
    assert_eq!(normalized_distance(&bounds, &[5.0, 500.0], &[5.0, 500.0]), 0.0);
    let corners = normalized_distance(&bounds, &[0.0, 0.0], &[10.0, 1000.0]);
    assert!((corners - 1.0).abs() < 1e-12);
}

#[test]
fn test_run_produces_consistent_report() {
    let opt = optimizer(Variant::Extended, Some(5));
    let report = match opt.run(1, Some(5), &keep_going).unwrap() {
        RunOutcome::Completed(r) => r,
        RunOutcome::Stopped => panic!("run should complete"),
    };

    assert_eq!(report.trace.len(), 20);
    assert_monotone(&report.trace.iter().map(|t| t.1).collect::<Vec<_>>());
    assert_eq!(report.best_fitness, -report.best_value);
    assert!((report.gamma - 0.5108).abs() < 1e-4);

    // Integer allocation respects supply and flows conserve it
    let sar: u64 = report.allocation.iter().map(|r| r[0]).sum();
    let ems: u64 = report.allocation.iter().map(|r| r[1]).sum();
    assert!(sar <= 40 && ems <= 20);
    for (c, total) in [sar, ems].into_iter().enumerate() {
        let incoming: u64 = (0..3).map(|z| report.flow_plan.incoming(c, z)).sum();
        assert_eq!(incoming, total);
    }
    assert_eq!(report.allocation_rows.len(), 3);
    assert!(report.flows.iter().all(|f| f.units > 0));
    assert!(report.validation.is_some());
}

#[test]
fn test_baseline_keeps_configured_gamma() {
    let opt = optimizer(Variant::Baseline, Some(8));
    match opt.run(1, Some(8), &keep_going).unwrap() {
        RunOutcome::Completed(r) => assert_eq!(r.gamma, 1.0),
        RunOutcome::Stopped => panic!("run should complete"),
    }
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let opt = optimizer(Variant::Extended, Some(9));
    let best = |opt: &Optimizer| match opt.run(1, Some(9), &keep_going).unwrap() {
        RunOutcome::Completed(r) => (r.best_value, r.allocation),
        RunOutcome::Stopped => panic!("run should complete"),
    };
    assert_eq!(best(&opt), best(&opt));
}

#[test]
fn test_callback_false_stops_the_run() {
    let opt = optimizer(Variant::Extended, Some(1));
    let stop_at_three = |_: usize, s: &GenerationSnapshot| s.generation < 3;
    assert!(matches!(
        opt.run(1, Some(1), &stop_at_three).unwrap(),
        RunOutcome::Stopped
    ));
}

#[test]
fn test_time_limit_keeps_best_so_far() {
    let mut config = Config::default();
    config.search.generations = 200;
    config.search.population = 10;
    let mut options = OptimizationOptions::from(&config);
    options.max_time = Some(Duration::ZERO);
    let opt = Optimizer::new(scenario(), &config.objective, options);

    match opt.run(1, Some(4), &keep_going).unwrap() {
        RunOutcome::Completed(r) => assert_eq!(r.trace.len(), 1),
        RunOutcome::Stopped => panic!("time limit is not a stop"),
    }
}

#[test]
fn test_invalid_parameters_never_start() {
    let mut config = Config::default();
    config.search.population = 3;
    let opt = Optimizer::new(scenario(), &config.objective, OptimizationOptions::from(&config));
    let err = opt.run(1, None, &keep_going).unwrap_err();
    assert!(matches!(err, FloodFlyError::InvalidConfig { field: "population", .. }));
}

#[test]
fn test_batch_run_count_is_bounded() {
    let opt = optimizer(Variant::Baseline, None);
    for runs in [0, 1, 101] {
        let err = opt.run_batch(runs, &keep_going).unwrap_err();
        assert!(matches!(err, FloodFlyError::InvalidConfig { field: "runs", .. }));
    }
}

#[test]
fn test_batch_aggregates_runs() {
    let opt = optimizer(Variant::Extended, Some(100));
    let batch = opt.run_batch(3, &keep_going).unwrap();

    assert_eq!(batch.runs.len(), 3);
    assert!(batch.errors.is_empty());
    assert!(!batch.stopped);
    let stats = batch.stats.as_ref().unwrap();
    assert_eq!(stats.successful, 3);
    assert_eq!(stats.fitness.count, 3);
    let best = batch.best().unwrap();
    assert_eq!(best.best_fitness, stats.fitness.max);
    assert_eq!(batch.validation.as_ref().unwrap().runs, 3);

    // Per-run seeds are base + run, so a second batch repeats the first
    let again = opt.run_batch(3, &keep_going).unwrap();
    let values = |b: &floodfly::optimizer::BatchReport| {
        b.runs.iter().map(|r| r.best_value).collect::<Vec<_>>()
    };
    assert_eq!(values(&batch), values(&again));
}

#[test]
fn test_stop_ends_batch_early() {
    let opt = optimizer(Variant::Baseline, Some(1));
    let only_first_run = |run: usize, _: &GenerationSnapshot| run < 2;
    let batch = opt.run_batch(5, &only_first_run).unwrap();
    assert!(batch.stopped);
    assert_eq!(batch.runs.len(), 1);
}

#[test]
fn test_objective_weights_are_checked_before_running() {
    let cases: [(&str, fn(&mut Config)); 3] = [
        ("weight_supply", |c| c.objective.weight_supply = f64::NAN),
        ("epsilon", |c| c.objective.epsilon = -5.0),
        ("weight_distance", |c| c.objective.weight_distance = -1.0),
    ];
    for (field, tweak) in cases {
        let mut config = Config::default();
        tweak(&mut config);
        let opt = Optimizer::new(scenario(), &config.objective, OptimizationOptions::from(&config));

        let err = opt.run(1, None, &keep_going).unwrap_err();
        assert!(
            matches!(err, FloodFlyError::InvalidConfig { field: f, .. } if f == field),
            "{field}: {err:?}"
        );
        assert!(opt.run_batch(3, &keep_going).is_err());
    }
}

#[test]
fn test_infeasible_candidates_are_dimmed_but_keep_their_position() {
    // Z1 has nothing to retain and Z2 sits below the no-flood depth,
    // so a candidate is infeasible exactly when it staffs Z2
    let zones = vec![
        Zone::new("Z1", "Riverside", 3.0, 6.0, 1.4, 30.0, vec![0.0, 0.0]),
        Zone::new("Z2", "Dry Ridge", 1.0, 0.1, 0.5, 10.0, vec![3.0, 2.0]),
    ];
    let classes = vec![
        PersonnelClass::new("SAR", "Search and Rescue", 1.0, 40.0),
        PersonnelClass::new("EMS", "Medical", 0.8, 20.0),
    ];
    let scenario = Scenario::new(zones, classes).unwrap();
    let objective: Arc<dyn Objective> = Arc::new(AllocationObjective::new(
        &scenario,
        &Config::default().objective,
    ));
    let filter = FeasibilityFilter::new(&scenario);
    let bounds = Bounds::for_scenario(&scenario);

    // No diversity resets, so every candidate goes through the filter
    let adaptive = AdaptiveParams {
        diversity_constant: 0.0,
        ..AdaptiveParams::default()
    };
    let mut efa = ExtendedFirefly::new(
        objective.clone(),
        bounds.clone(),
        &small_search(5),
        &adaptive,
        fastrand::Rng::with_seed(5),
    )
    .with_filter(filter.clone());

    let snap = efa.step().unwrap();
    assert_eq!(snap.reinitialized, 0);

    let mut infeasible = 0;
    for c in &efa.population().candidates {
        assert!(bounds.contains(&c.position));
        if filter.is_feasible(&c.position) {
            assert_eq!(c.brightness, objective.evaluate(&c.position));
        } else {
            infeasible += 1;
            assert_eq!(c.brightness, f64::INFINITY);
            // The override only dims the candidate, Z2 still holds staff
            let z2: f64 = c.position[2..4].iter().sum();
            assert!(z2 > 1e-6);
        }
    }
    assert!(infeasible > 0);
    assert!(efa.best_value().is_finite());
}
