//! Elliptical fire growth from a point ignition
//!
//! # References
//! - Anderson, H.E. (1983). "Predicting wind-driven wild land fire size and shape."
//!   USDA Forest Service Research Paper INT-305.
//! - Andrews, P.L. (1986). "BEHAVE: Fire behavior prediction and fuel modeling system."
//!   USDA Forest Service General Technical Report INT-194.

use std::f64::consts::PI;

/// Feet per minute in one mile per hour
pub const FT_PER_MIN_PER_MPH: f64 = 88.0;

/// Fire ellipse dimensions after a period of free spread
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FireEllipse {
    pub length_to_width: f64,
    /// Backing spread rate (ft/min)
    pub backing_rate: f64,
    /// Head fire travel (ft)
    pub forward_distance: f64,
    /// Overall length (ft)
    pub length: f64,
    /// Maximum width (ft)
    pub width: f64,
    /// Area (ft²)
    pub area: f64,
    /// Perimeter (ft)
    pub perimeter: f64,
}

/// Length-to-width ratio from effective wind
///
/// ```text
/// L/W = 1 + 0.25 × U_e   (U_e in mi/h)
/// ```
pub fn length_to_width(effective_wind: f64) -> f64 {
    1.0 + 0.25 * (effective_wind / FT_PER_MIN_PER_MPH).max(0.0)
}

/// Ellipse eccentricity for a length-to-width ratio
pub fn eccentricity(length_to_width: f64) -> f64 {
    if length_to_width <= 1.0 {
        return 0.0;
    }
    (length_to_width.powi(2) - 1.0).sqrt() / length_to_width
}

/// Ramanujan's second approximation to an ellipse perimeter
///
/// ```text
/// h = ((a - b) / (a + b))²
/// P = π(a + b)(1 + 3h / (10 + sqrt(4 - 3h)))
/// ```
pub fn ellipse_perimeter(semi_major: f64, semi_minor: f64) -> f64 {
    let sum = semi_major + semi_minor;
    if sum <= 0.0 {
        return 0.0;
    }
    let h = ((semi_major - semi_minor) / sum).powi(2);
    PI * sum * (1.0 + 3.0 * h / (10.0 + (4.0 - 3.0 * h).sqrt()))
}

/// Grow an ellipse for `elapsed` minutes
///
/// # Formula
/// ```text
/// e   = sqrt(L/W² - 1) / (L/W)
/// R_b = R × (1 - e) / (1 + e)
/// L   = (R + R_b) × t,   W = L / (L/W)
/// A   = π/4 × L × W
/// ```
///
/// # Arguments
/// * `spread_rate` - Head fire spread rate (ft/min)
/// * `effective_wind` - Effective wind speed (ft/min)
/// * `elapsed` - Time since ignition (min)
pub fn fire_ellipse(spread_rate: f64, effective_wind: f64, elapsed: f64) -> FireEllipse {
    let length_to_width = length_to_width(effective_wind);
    let e = eccentricity(length_to_width);
    let backing_rate = spread_rate * (1.0 - e) / (1.0 + e);

    let forward_distance = spread_rate * elapsed;
    let length = (spread_rate + backing_rate) * elapsed;
    let width = length / length_to_width;

    FireEllipse {
        length_to_width,
        backing_rate,
        forward_distance,
        length,
        width,
        area: PI / 4.0 * length * width,
        perimeter: ellipse_perimeter(length / 2.0, width / 2.0),
    }
}
