//! Crown scorch height (Van Wagner 1973)
//!
//! # References
//! - Van Wagner, C.E. (1973). "Height of crown scorch in forest fires."
//!   Canadian Journal of Forest Research 3: 373-378.

/// Lethal foliage temperature (°F)
pub const LETHAL_TEMPERATURE_F: f64 = 140.0;

/// Height of lethal scorch above the surface fire (ft)
///
/// # Formula
/// ```text
/// h_s = 63 / (140 - T) × I^(7/6) / sqrt(I + U³)
/// ```
///
/// # Arguments
/// * `fireline_intensity` - Byram's fireline intensity (Btu/ft/s)
/// * `midflame_wind` - Wind speed at midflame height (mi/h)
/// * `air_temperature` - Ambient air temperature (°F)
pub fn scorch_height(fireline_intensity: f64, midflame_wind: f64, air_temperature: f64) -> f64 {
    if fireline_intensity <= 0.0 || air_temperature >= LETHAL_TEMPERATURE_F {
        return 0.0;
    }
    let wind = midflame_wind.max(0.0);
    63.0 / (LETHAL_TEMPERATURE_F - air_temperature) * fireline_intensity.powf(7.0 / 6.0)
        / (fireline_intensity + wind.powi(3)).sqrt()
}
