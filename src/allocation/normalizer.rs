use super::IntAllocation;
use std::cmp::Ordering;

const CAP_TOL: f64 = 1e-9;
const MIN_REMAINDER: f64 = 1e-12;

/// Rounds a continuous `Z×C` allocation to integers without exceeding any class cap.
///
/// Per class: clip negatives, scale down proportionally when the column overshoots its
/// cap, floor, then hand out the remaining integer budget (`floor(cap)` minus the floors)
/// one unit at a time by descending fractional remainder. Zero remainders never receive a unit.
pub fn normalize(a: &[Vec<f64>], supply: &[f64]) -> IntAllocation {
    let z_count = a.len();
    let c_count = a.first().map_or(0, Vec::len);
    let mut out = vec![vec![0u64; c_count]; z_count];

    for c in 0..c_count {
        let cap = supply.get(c).copied().unwrap_or(0.0).max(0.0);

        let mut col: Vec<f64> = a.iter().map(|row| row[c].max(0.0)).collect();
        let used: f64 = col.iter().sum();
        if used > cap + CAP_TOL && used > 0.0 {
            let scale = cap / used;
            col.iter_mut().for_each(|v| *v *= scale);
        }

        let floors: Vec<u64> = col.iter().map(|v| v.floor() as u64).collect();
        let remainders: Vec<f64> = col
            .iter()
            .zip(&floors)
            .map(|(v, &f)| v - f as f64)
            .collect();
        let floor_sum: u64 = floors.iter().sum();
        let cap_int = (cap + CAP_TOL).floor() as u64;

        for (i, &f) in floors.iter().enumerate() {
            out[i][c] = f;
        }

        let mut budget = cap_int.saturating_sub(floor_sum);
        if budget > 0 {
            for i in by_descending_remainder(&remainders) {
                if budget == 0 {
                    break;
                }
                if remainders[i] > MIN_REMAINDER {
                    out[i][c] += 1;
                    budget -= 1;
                }
            }
        }
    }
    out
}

/// Same as [`normalize`] for a zone-major flattened vector.
pub fn normalize_flat(x: &[f64], classes: usize, supply: &[f64]) -> IntAllocation {
    let rows: Vec<Vec<f64>> = x.chunks(classes.max(1)).map(<[f64]>::to_vec).collect();
    normalize(&rows, supply)
}

/// Indices sorted by remainder, largest first. Ties keep index order.
pub(crate) fn by_descending_remainder(remainders: &[f64]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..remainders.len()).collect();
    idx.sort_by(|&a, &b| {
        remainders[b]
            .partial_cmp(&remainders[a])
            .unwrap_or(Ordering::Equal)
    });
    idx
}
