//! Slope steepness from a topographic map

/// Slope as rise over reach, measured between contour lines
///
/// # Formula
/// ```text
/// rise  = contour_interval × contour_count
/// reach = map_distance × map_scale
/// slope = rise / reach
/// ```
///
/// # Arguments
/// * `map_scale` - Representative fraction denominator (e.g. 24000)
/// * `contour_interval` - Elevation between contour lines (ft)
/// * `contour_count` - Contour lines crossed
/// * `map_distance` - Distance measured on the map (in)
pub fn map_slope(map_scale: f64, contour_interval: f64, contour_count: f64, map_distance: f64) -> f64 {
    let reach = map_distance / 12.0 * map_scale;
    if reach <= 0.0 {
        return 0.0;
    }
    contour_interval * contour_count / reach
}

/// Slope angle in degrees for a rise over reach
pub fn slope_degrees(slope: f64) -> f64 {
    slope.atan().to_degrees()
}
