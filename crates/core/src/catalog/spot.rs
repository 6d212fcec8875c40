//! Albini Spotting Distance Model (1979, 1983)
//!
//! Maximum spotting distance from a surface fire, computed in SI units:
//! 1. Lofting height based on fireline intensity
//! 2. Wind speed profile with height (power law)
//! 3. Ember terminal velocity from drag balance
//! 4. Terrain effects on landing distance
//!
//! # Scientific References
//!
//! - Albini, F.A. (1979). "Spot fire distance from burning trees: a predictive model"
//!   USDA Forest Service Research Paper INT-56
//! - Albini, F.A. (1983). "Transport of firebrands by line thermals"
//!   Combustion Science and Technology, 32(5-6), 277-288
//! - Tarifa, C.S., del Notario, P.P., Moreno, F.G. (1965). "Transport and combustion of firebrands"

/// Height of the reference wind measurement (m), the 20-ft wind
pub const REFERENCE_HEIGHT: f64 = 6.096;

/// Wind shear exponent for open terrain
pub const WIND_SHEAR_EXPONENT: f64 = 0.15;

const AIR_DENSITY: f64 = 1.225; // kg/m³ at sea level
const DRAG_COEFFICIENT: f64 = 0.4; // Sphere approximation
const GRAVITY: f64 = 9.81; // m/s²

/// Calculate ember lofting height based on fireline intensity
///
/// Albini (1979) empirical relationship:
/// H = 12.2 × I^0.4
///
/// # Arguments
/// * `fireline_intensity` - Byram's fireline intensity (kW/m)
///
/// # Returns
/// Lofting height in meters
pub fn lofting_height(fireline_intensity: f64) -> f64 {
    if fireline_intensity <= 0.0 {
        return 0.0;
    }
    12.2 * fireline_intensity.powf(0.4)
}

/// Calculate wind speed at height from the 20-ft reference wind
///
/// u(z) = u_ref × (z / z_ref)^α
///
/// # Arguments
/// * `reference_wind` - Wind speed at 20 ft (m/s)
/// * `height` - Height above ground (m)
pub fn wind_speed_at_height(reference_wind: f64, height: f64) -> f64 {
    if height <= 0.0 {
        return 0.0;
    }
    reference_wind * (height / REFERENCE_HEIGHT).powf(WIND_SHEAR_EXPONENT)
}

/// Calculate ember terminal velocity based on size and mass
///
/// w_f = sqrt((2 × m × g) / (ρ_air × C_d × A))
///
/// # Arguments
/// * `ember_mass` - Mass of ember (kg)
/// * `ember_diameter` - Characteristic diameter (m)
///
/// # Returns
/// Terminal velocity in m/s (positive = falling)
pub fn terminal_velocity(ember_mass: f64, ember_diameter: f64) -> f64 {
    if ember_mass <= 0.0 || ember_diameter <= 0.0 {
        return 0.0;
    }
    let cross_section_area = std::f64::consts::PI * (ember_diameter / 2.0).powi(2);
    (2.0 * ember_mass * GRAVITY / (AIR_DENSITY * DRAG_COEFFICIENT * cross_section_area)).sqrt()
}

/// Landing distance multiplier for slope in degrees (positive = uphill)
pub fn terrain_factor(slope_degrees: f64) -> f64 {
    if slope_degrees > 0.0 {
        1.0 + (slope_degrees / 45.0) * 0.5
    } else if slope_degrees < 0.0 {
        (1.0 + (slope_degrees / 45.0) * 0.5).max(0.5)
    } else {
        1.0
    }
}

/// Calculate maximum spotting distance
///
/// s_max = H × (u_H / w_f) × terrain_factor
///
/// # Arguments
/// * `fireline_intensity` - Byram's fireline intensity (kW/m)
/// * `reference_wind` - Wind speed at 20 ft (m/s)
/// * `ember_mass` - Mass of typical ember (kg)
/// * `ember_diameter` - Characteristic diameter (m)
/// * `slope_degrees` - Slope angle in degrees
///
/// # Returns
/// Maximum spotting distance in meters
pub fn maximum_spotting_distance(
    fireline_intensity: f64,
    reference_wind: f64,
    ember_mass: f64,
    ember_diameter: f64,
    slope_degrees: f64,
) -> f64 {
    let height = lofting_height(fireline_intensity);
    if height <= 0.0 {
        return 0.0;
    }
    let falling = terminal_velocity(ember_mass, ember_diameter);
    if falling <= 0.0 {
        return 0.0;
    }
    let wind_at_height = wind_speed_at_height(reference_wind, height);
    height * (wind_at_height / falling) * terrain_factor(slope_degrees)
}
