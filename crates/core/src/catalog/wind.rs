//! Wind adjustment from the 20-ft reference height down to midflame
//!
//! # References
//! - Albini, F.A. & Baughman, R.G. (1979). "Estimating windspeeds for predicting wildland
//!   fire behavior." USDA Forest Service Research Paper INT-221.
//! - Andrews, P.L. (2012). "Modeling wind adjustment factor and midflame wind speed for
//!   Rothermel's surface fire spread model." USDA Forest Service RMRS-GTR-266.

/// Canopy cover below which fuel is treated as unsheltered (fraction)
pub const SHELTER_THRESHOLD: f64 = 0.05;

/// Wind adjustment factor for fuel exposed to the wind
///
/// # Formula
/// ```text
/// WAF = 1.83 / ln((20 + 0.36×δ) / (0.13×δ))
/// ```
///
/// # Arguments
/// * `fuel_depth` - Fuel bed depth δ (ft)
pub fn unsheltered_factor(fuel_depth: f64) -> f64 {
    if fuel_depth <= 0.0 {
        return 0.0;
    }
    let ratio = (20.0 + 0.36 * fuel_depth) / (0.13 * fuel_depth);
    (1.83 / ratio.ln()).min(1.0)
}

/// Wind adjustment factor under a forest canopy
///
/// # Formula
/// ```text
/// f   = cover × crown_ratio / 3
/// WAF = 0.555 / (sqrt(f × H) × ln((20 + 0.36×H) / (0.13×H)))
/// ```
///
/// # Arguments
/// * `canopy_height` - Stand height H (ft)
/// * `cover` - Canopy cover (fraction)
/// * `crown_ratio` - Crown length over tree height (fraction)
pub fn sheltered_factor(canopy_height: f64, cover: f64, crown_ratio: f64) -> f64 {
    let crown_fill = cover * crown_ratio / 3.0;
    let denominator = (crown_fill * canopy_height).sqrt()
        * ((20.0 + 0.36 * canopy_height) / (0.13 * canopy_height)).ln();
    if denominator <= 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    (0.555 / denominator).min(1.0)
}

/// Pick the sheltered or unsheltered factor from canopy cover
pub fn adjustment_factor(fuel_depth: f64, canopy_height: f64, cover: f64, crown_ratio: f64) -> f64 {
    if cover < SHELTER_THRESHOLD || canopy_height <= 0.0 {
        unsheltered_factor(fuel_depth)
    } else {
        sheltered_factor(canopy_height, cover, crown_ratio)
    }
}

/// Midflame wind from the 20-ft wind
pub fn midflame_wind(twenty_foot_wind: f64, adjustment_factor: f64) -> f64 {
    twenty_foot_wind * adjustment_factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unsheltered_grass() {
        // One foot of grass gives the familiar 0.36
        assert_relative_eq!(unsheltered_factor(1.0), 0.362, epsilon = 1e-3);
        assert!(unsheltered_factor(6.0) > unsheltered_factor(1.0));
    }

    #[test]
    fn test_denser_canopy_shelters_more() {
        let open = sheltered_factor(60.0, 0.2, 0.5);
        let closed = sheltered_factor(60.0, 0.8, 0.5);
        assert!(closed < open);
        assert!(closed > 0.0);
    }

    #[test]
    fn test_sparse_cover_is_unsheltered() {
        assert_eq!(adjustment_factor(1.0, 60.0, 0.01, 0.5), unsheltered_factor(1.0));
        assert_eq!(adjustment_factor(1.0, 60.0, 0.5, 0.5), sheltered_factor(60.0, 0.5, 0.5));
    }

    #[test]
    fn test_midflame_scales_linearly() {
        assert_relative_eq!(midflame_wind(880.0, 0.4), 352.0);
    }
}
