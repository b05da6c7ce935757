use floodfly::allocation::flow::scale_and_round_to_sum;
use floodfly::allocation::{allocate_flows, flow_rows, FlowStrategy};
use floodfly::scenario::{PersonnelClass, Scenario, Zone};
use floodfly::FloodFlyError;

fn assert_conserved(target: &[Vec<u64>], plan: &floodfly::allocation::FlowPlan) {
    for (c, scaled) in plan.scaled_current.iter().enumerate() {
        for (z, row) in target.iter().enumerate() {
            assert_eq!(plan.outgoing(c, z), scaled[z], "outgoing class {} zone {}", c, z);
            assert_eq!(plan.incoming(c, z), row[c], "incoming class {} zone {}", c, z);
        }
    }
}

#[test]
fn test_two_zone_surplus_moves_to_deficit() {
    // current [6, 4], target [7, 3]: 6 and 3 stay, zone 1's extra unit goes to zone 0
    let target = vec![vec![7], vec![3]];
    let current = vec![vec![6.0, 4.0]];
    let plan = allocate_flows(&target, &current, None).unwrap();

    assert_eq!(plan.strategy, FlowStrategy::IndexOrder);
    assert_eq!(plan.flows[0], vec![vec![6, 0], vec![1, 3]]);
    assert_eq!(plan.transferred(), 1);
    assert_conserved(&target, &plan);
}

#[test]
fn test_current_is_rescaled_to_target_total() {
    // 20 current staff, 10 targeted: scaled current is [5, 5]
    let target = vec![vec![8], vec![2]];
    let current = vec![vec![10.0, 10.0]];
    let plan = allocate_flows(&target, &current, None).unwrap();
    assert_eq!(plan.scaled_current[0], vec![5, 5]);
    assert_eq!(plan.flows[0][1][0], 3);
    assert_conserved(&target, &plan);
}

#[test]
fn test_no_current_staff_yields_no_flows() {
    let target = vec![vec![4], vec![6]];
    let current = vec![vec![0.0, 0.0]];
    let plan = allocate_flows(&target, &current, None).unwrap();
    assert_eq!(plan.transferred(), 0);
    assert!(plan.flows[0].iter().flatten().all(|&u| u == 0));
    // Targets with no source are left as fresh deployments
    assert_eq!((plan.incoming(0, 0), plan.incoming(0, 1)), (0, 0));
}

#[test]
fn test_nearest_surplus_prefers_closest_source() {
    // Zones 0 and 3 sit together in the north, 1 and 2 in the south
    let target = vec![vec![2], vec![2], vec![0], vec![0]];
    let current = vec![vec![0.0, 0.0, 2.0, 2.0]];
    let coords = [(15.60, 121.0), (14.60, 121.0), (14.61, 121.0), (15.61, 121.0)];

    let plan = allocate_flows(&target, &current, Some(&coords[..])).unwrap();
    assert_eq!(plan.strategy, FlowStrategy::NearestSurplus);
    assert_eq!(plan.flows[0][3][0], 2);
    assert_eq!(plan.flows[0][2][1], 2);
    assert_conserved(&target, &plan);

    // Without coordinates the cursors pair zones by index instead
    let plan = allocate_flows(&target, &current, None).unwrap();
    assert_eq!(plan.flows[0][2][0], 2);
    assert_eq!(plan.flows[0][3][1], 2);
    assert_conserved(&target, &plan);
}

#[test]
fn test_non_finite_coordinates_fall_back_to_index_order() {
    let target = vec![vec![7], vec![3]];
    let current = vec![vec![6.0, 4.0]];
    let coords = [(14.6, 121.0), (f64::NAN, 121.0)];
    let plan = allocate_flows(&target, &current, Some(&coords[..])).unwrap();
    assert_eq!(plan.strategy, FlowStrategy::IndexOrder);
}

#[test]
fn test_shape_mismatch_is_rejected() {
    let target = vec![vec![1, 1], vec![1, 1]];
    let current = vec![vec![1.0, 1.0]];
    assert!(matches!(
        allocate_flows(&target, &current, None),
        Err(FloodFlyError::Validation(_))
    ));
}

#[test]
fn test_scale_and_round_hits_exact_sum() {
    let out = scale_and_round_to_sum(&[1.0, 1.0, 1.0], 10);
    assert_eq!(out.iter().sum::<u64>(), 10);
    assert_eq!(out, vec![4, 3, 3]);
    assert_eq!(scale_and_round_to_sum(&[0.0, 0.0], 5), vec![0, 0]);
    assert_eq!(scale_and_round_to_sum(&[2.0, 3.0], 0), vec![0, 0]);
}

#[test]
fn test_flow_rows_carry_names_and_self_retention() {
    let zones = vec![
        Zone::new("Z0", "North", 2.0, 3.0, 1.0, 10.0, vec![6.0]),
        Zone::new("Z1", "South", 2.0, 3.0, 1.0, 10.0, vec![4.0]),
    ];
    let classes = vec![PersonnelClass::new("SAR", "Rescue", 1.0, 10.0)];
    let scenario = Scenario::new(zones, classes).unwrap();

    let plan = allocate_flows(&vec![vec![7], vec![3]], &scenario.current_matrix(), None).unwrap();
    let rows = flow_rows(&scenario, &plan);

    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.units > 0 && r.class_name == "Rescue"));
    let moved: Vec<_> = rows.iter().filter(|r| !r.is_self_retention()).collect();
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].from_name, "South");
    assert_eq!(moved[0].to_name, "North");
    assert_eq!(moved[0].units, 1);
}
