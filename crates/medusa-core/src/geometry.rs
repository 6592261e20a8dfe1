//! Planar measures for feature footprints and road centre-lines.
//! Coordinates are projected (metres), so no geodesic correction is applied.

/// Unsigned area of a polygon ring (shoelace). The ring may be open or
/// closed; fewer than three vertices gives 0.
pub fn polygon_area(ring: &[[f64; 2]]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let twice: f64 = ring
        .iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| a[0] * b[1] - b[0] * a[1])
        .sum();
    twice.abs() * 0.5
}

/// Exterior area minus the area of each hole.
pub fn polygon_area_with_holes(exterior: &[[f64; 2]], holes: &[Vec<[f64; 2]>]) -> f64 {
    holes
        .iter()
        .fold(polygon_area(exterior), |area, hole| area - polygon_area(hole))
}

/// Length of a polyline.
pub fn line_length(path: &[[f64; 2]]) -> f64 {
    path.windows(2)
        .map(|w| (w[1][0] - w[0][0]).hypot(w[1][1] - w[0][1]))
        .sum()
}
