/// Mean Earth radius (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Great-circle distance between two `(lat, lon)` points in degrees.
pub fn haversine_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lon1) = a;
    let (lat2, lon2) = b;
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Full `Z×Z` distance table, zero on the diagonal.
pub fn distance_matrix(coords: &[(f64, f64)]) -> Vec<Vec<f64>> {
    coords
        .iter()
        .enumerate()
        .map(|(i, &a)| {
            coords
                .iter()
                .enumerate()
                .map(|(j, &b)| if i == j { 0.0 } else { haversine_km(a, b) })
                .collect()
        })
        .collect()
}
