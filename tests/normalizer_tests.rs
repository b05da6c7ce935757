use floodfly::allocation::{normalize, normalize_flat};
use rstest::rstest;

#[test]
fn test_integral_target_within_supply_is_kept() {
    let out = normalize(&[vec![7.0], vec![3.0]], &[10.0]);
    assert_eq!(out, vec![vec![7], vec![3]]);
}

#[test]
fn test_overshoot_is_scaled_to_cap() {
    // 30 requested, 12 available: 8 / 4 exactly
    let out = normalize(&[vec![20.0], vec![10.0]], &[12.0]);
    assert_eq!(out, vec![vec![8], vec![4]]);
}

#[test]
fn test_remainders_go_to_largest_fraction_first() {
    // Floors 1+1+1 = 3, cap 5: the two largest remainders (.9, .6) get a unit
    let out = normalize(&[vec![1.9], vec![1.6], vec![1.4]], &[5.0]);
    assert_eq!(out, vec![vec![2], vec![2], vec![1]]);
}

#[test]
fn test_ties_break_by_index() {
    let out = normalize(&[vec![0.5], vec![0.5], vec![0.5]], &[1.0]);
    assert_eq!(out, vec![vec![1], vec![0], vec![0]]);
}

#[test]
fn test_zero_remainder_never_receives_a_unit() {
    // Budget of 10 but the column only asks for 4
    let out = normalize(&[vec![3.0], vec![1.0], vec![0.0]], &[10.0]);
    assert_eq!(out, vec![vec![3], vec![1], vec![0]]);
}

#[test]
fn test_negatives_are_clipped() {
    let out = normalize(&[vec![-5.0, 2.0], vec![4.0, -1.0]], &[10.0, 10.0]);
    assert_eq!(out, vec![vec![0, 2], vec![4, 0]]);
}

#[test]
fn test_fractional_cap_uses_floor_budget() {
    let out = normalize(&[vec![4.7], vec![4.7]], &[9.5]);
    let total: u64 = out.iter().map(|r| r[0]).sum();
    assert!(total <= 9);
}

#[rstest]
#[case(vec![vec![3.0, 1.0], vec![2.0, 4.0]], vec![10.0, 10.0])]
#[case(vec![vec![0.0, 0.0], vec![5.0, 5.0]], vec![5.0, 5.0])]
#[case(vec![vec![1.0], vec![1.0], vec![1.0]], vec![3.0])]
fn test_idempotent_on_capped_integers(#[case] a: Vec<Vec<f64>>, #[case] supply: Vec<f64>) {
    let once = normalize(&a, &supply);
    let as_f64: Vec<Vec<f64>> = once
        .iter()
        .map(|r| r.iter().map(|&v| v as f64).collect())
        .collect();
    assert_eq!(normalize(&as_f64, &supply), once);
}

#[test]
fn test_flat_layout_is_zone_major() {
    // zone 0: [1, 2], zone 1: [3, 4]
    let out = normalize_flat(&[1.0, 2.0, 3.0, 4.0], 2, &[100.0, 100.0]);
    assert_eq!(out, vec![vec![1, 2], vec![3, 4]]);
}
