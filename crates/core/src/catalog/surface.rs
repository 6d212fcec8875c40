//! Rothermel Surface Fire Spread Model (1972)
//!
//! Single fuel-bed formulation in the classic English units: loads in lb/ft²,
//! depths in ft, surface-area-to-volume ratios in ft²/ft³, heat in Btu and
//! rates in ft/min.
//!
//! # References
//! - Rothermel, R.C. (1972). "A mathematical model for predicting fire spread in wildland fuels."
//!   USDA Forest Service Research Paper INT-115.
//! - Albini, F.A. (1976). "Estimating wildfire behavior and effects."
//!   USDA Forest Service General Technical Report INT-30.
//! - Byram, G.M. (1959). "Combustion of forest fuels." In: Forest Fire: Control and Use.

/// Oven-dry particle density (lb/ft³)
pub const PARTICLE_DENSITY: f64 = 32.0;

/// Total mineral content (fraction)
pub const TOTAL_MINERAL: f64 = 0.0555;

/// Effective (silica-free) mineral content (fraction)
pub const EFFECTIVE_MINERAL: f64 = 0.010;

/// Physical description of a homogeneous fuel bed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelBed {
    /// Oven-dry fuel load (lb/ft²)
    pub load: f64,
    /// Fuel bed depth (ft)
    pub depth: f64,
    /// Characteristic surface-area-to-volume ratio (ft²/ft³)
    pub sav_ratio: f64,
    /// Low heat content (Btu/lb)
    pub heat_content: f64,
    /// Dead fuel moisture of extinction (fraction)
    pub extinction_moisture: f64,
}

/// Head fire behavior of a surface fire
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceFire {
    /// Rate of spread (ft/min)
    pub spread_rate: f64,
    /// Reaction intensity (Btu/ft²/min)
    pub reaction_intensity: f64,
    /// Heat per unit area (Btu/ft²)
    pub heat_per_unit_area: f64,
    /// Flame residence time (min)
    pub residence_time: f64,
    /// Wind speed that alone would produce the combined wind and slope effect (ft/min)
    pub effective_wind: f64,
}

/// Packing ratio and its optimum
fn packing(fuel: &FuelBed) -> (f64, f64) {
    let bulk_density = fuel.load / fuel.depth;
    let beta = bulk_density / PARTICLE_DENSITY;
    let beta_op = 3.348 * fuel.sav_ratio.powf(-0.8189);
    (beta, beta_op)
}

/// Calculate moisture damping coefficient (η_M)
///
/// # Formula
/// ```text
/// η_M = 1 - 2.59×r + 5.11×r² - 3.52×r³,  r = M_f / M_x
/// ```
pub fn moisture_damping(moisture: f64, extinction: f64) -> f64 {
    if extinction <= 0.0 {
        return 0.0;
    }
    let r = (moisture / extinction).min(1.0);
    (1.0 - 2.59 * r + 5.11 * r.powi(2) - 3.52 * r.powi(3)).clamp(0.0, 1.0)
}

/// Calculate mineral damping coefficient (η_s)
///
/// ```text
/// η_s = 0.174 × S_e^-0.19
/// ```
pub fn mineral_damping() -> f64 {
    (0.174 * EFFECTIVE_MINERAL.powf(-0.19)).min(1.0)
}

/// Calculate reaction intensity (Btu/ft²/min)
///
/// # Formula
/// ```text
/// I_R = Γ' × w_n × h × η_M × η_s
/// Γ'  = Γ'_max × (β/β_op)^A × exp(A × (1 - β/β_op))
/// Γ'_max = σ^1.5 / (495 + 0.0594 × σ^1.5)
/// A   = 133 × σ^-0.7913
/// ```
pub fn reaction_intensity(fuel: &FuelBed, moisture: f64) -> f64 {
    let sigma = fuel.sav_ratio;
    let (beta, beta_op) = packing(fuel);
    let relative = beta / beta_op;

    let sigma_15 = sigma.powf(1.5);
    let gamma_max = sigma_15 / (495.0 + 0.0594 * sigma_15);
    let a = 133.0 * sigma.powf(-0.7913);
    let gamma = gamma_max * relative.powf(a) * (a * (1.0 - relative)).exp();

    let net_load = fuel.load * (1.0 - TOTAL_MINERAL);
    gamma
        * net_load
        * fuel.heat_content
        * moisture_damping(moisture, fuel.extinction_moisture)
        * mineral_damping()
}

/// Calculate propagating flux ratio (ξ)
///
/// ```text
/// ξ = exp((0.792 + 0.681×σ^0.5) × (β + 0.1)) / (192 + 0.2595×σ)
/// ```
pub fn propagating_flux(sigma: f64, beta: f64) -> f64 {
    ((0.792 + 0.681 * sigma.sqrt()) * (beta + 0.1)).exp() / (192.0 + 0.2595 * sigma)
}

/// Wind factor constants `(C, B, E)` for a surface-area-to-volume ratio
fn wind_constants(sigma: f64) -> (f64, f64, f64) {
    let c = 7.47 * (-0.133 * sigma.powf(0.55)).exp();
    let b = 0.02526 * sigma.powf(0.54);
    let e = 0.715 * (-3.59e-4 * sigma).exp();
    (c, b, e)
}

/// Calculate wind coefficient (Φ_w)
///
/// ```text
/// Φ_w = C × U^B × (β/β_op)^-E
/// ```
pub fn wind_coefficient(fuel: &FuelBed, midflame_wind: f64) -> f64 {
    if midflame_wind <= 0.0 {
        return 0.0;
    }
    let (beta, beta_op) = packing(fuel);
    let (c, b, e) = wind_constants(fuel.sav_ratio);
    c * midflame_wind.powf(b) * (beta / beta_op).powf(-e)
}

/// Calculate slope coefficient (Φ_s)
///
/// ```text
/// Φ_s = 5.275 × β^-0.3 × tan²(θ)
/// ```
///
/// `slope` is the rise over reach; only upslope spread is modeled.
pub fn slope_coefficient(fuel: &FuelBed, slope: f64) -> f64 {
    if slope <= 0.0 {
        return 0.0;
    }
    let (beta, _) = packing(fuel);
    5.275 * beta.powf(-0.3) * slope.powi(2)
}

/// Calculate head fire spread rate and intensity terms
///
/// # Formula
/// ```text
/// R = I_R × ξ × (1 + Φ_w + Φ_s) / (ρ_b × ε × Q_ig)
/// ε = exp(-138 / σ)
/// Q_ig = 250 + 1116 × M_f
/// ```
///
/// Midflame wind is capped at 0.9 × I_R (the wind limit). Fuel at or above
/// its moisture of extinction does not burn.
///
/// # Arguments
/// * `fuel` - Fuel bed description
/// * `moisture` - Dead fuel moisture (fraction)
/// * `midflame_wind` - Wind speed at midflame height (ft/min)
/// * `slope` - Terrain slope as rise over reach
pub fn rothermel_spread(fuel: &FuelBed, moisture: f64, midflame_wind: f64, slope: f64) -> SurfaceFire {
    if fuel.load <= 0.0 || fuel.depth <= 0.0 || fuel.sav_ratio <= 0.0 {
        return SurfaceFire::default();
    }
    if moisture >= fuel.extinction_moisture {
        return SurfaceFire::default();
    }

    let sigma = fuel.sav_ratio;
    let (beta, beta_op) = packing(fuel);
    let bulk_density = fuel.load / fuel.depth;

    let ir = reaction_intensity(fuel, moisture);
    let xi = propagating_flux(sigma, beta);
    let wind = midflame_wind.min(0.9 * ir);
    let phi_w = wind_coefficient(fuel, wind);
    let phi_s = slope_coefficient(fuel, slope);

    let heating_number = (-138.0 / sigma).exp();
    let preignition = 250.0 + 1116.0 * moisture;
    let spread_rate = ir * xi * (1.0 + phi_w + phi_s) / (bulk_density * heating_number * preignition);

    // Invert the wind factor for the combined effect
    let (c, b, e) = wind_constants(sigma);
    let phi_e = phi_w + phi_s;
    let effective_wind = if phi_e > 0.0 {
        (phi_e * (beta / beta_op).powf(e) / c).powf(1.0 / b)
    } else {
        0.0
    };

    let residence_time = 384.0 / sigma;
    SurfaceFire {
        spread_rate: spread_rate.max(0.0),
        reaction_intensity: ir,
        heat_per_unit_area: ir * residence_time,
        residence_time,
        effective_wind,
    }
}

/// Byram's fireline intensity (Btu/ft/s)
///
/// ```text
/// I_B = H_A × R / 60
/// ```
pub fn fireline_intensity(heat_per_unit_area: f64, spread_rate: f64) -> f64 {
    heat_per_unit_area * spread_rate / 60.0
}

/// Byram's flame length (ft)
///
/// ```text
/// L = 0.45 × I_B^0.46
/// ```
pub fn flame_length(intensity: f64) -> f64 {
    if intensity <= 0.0 {
        return 0.0;
    }
    0.45 * intensity.powf(0.46)
}
