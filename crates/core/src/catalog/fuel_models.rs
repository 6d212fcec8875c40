//! Standard surface fuel models (Anderson 1982)
//!
//! Each model is collapsed to a single dead size class carrying the model's
//! total fine-fuel load and characteristic surface-area-to-volume ratio.
//!
//! # References
//! - Anderson, H.E. (1982). "Aids to determining fuel models for estimating fire behavior."
//!   USDA Forest Service General Technical Report INT-122.

use super::surface::FuelBed;

/// Conversion from tons per acre to pounds per square foot
pub const TONS_PER_ACRE_TO_LB_PER_FT2: f64 = 2000.0 / 43560.0;

/// Low heat content shared by every standard model (Btu/lb)
pub const STANDARD_HEAT_CONTENT: f64 = 8000.0;

/// A named fuel model in table units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelModel {
    pub code: &'static str,
    pub description: &'static str,
    /// Fine fuel load (tons/acre)
    pub load_tons_per_acre: f64,
    /// Fuel bed depth (ft)
    pub depth: f64,
    /// Surface-area-to-volume ratio (ft²/ft³)
    pub sav_ratio: f64,
    /// Dead fuel moisture of extinction (fraction)
    pub extinction_moisture: f64,
}

impl FuelModel {
    /// Fuel bed in Rothermel units
    pub fn fuel_bed(&self) -> FuelBed {
        FuelBed {
            load: self.load_tons_per_acre * TONS_PER_ACRE_TO_LB_PER_FT2,
            depth: self.depth,
            sav_ratio: self.sav_ratio,
            heat_content: STANDARD_HEAT_CONTENT,
            extinction_moisture: self.extinction_moisture,
        }
    }
}

const fn model(
    code: &'static str,
    description: &'static str,
    load_tons_per_acre: f64,
    depth: f64,
    sav_ratio: f64,
    extinction_moisture: f64,
) -> FuelModel {
    FuelModel {
        code,
        description,
        load_tons_per_acre,
        depth,
        sav_ratio,
        extinction_moisture,
    }
}

/// Models offered by the fuel model selector, in item order
pub const STANDARD_MODELS: &[FuelModel] = &[
    model("FM1", "Short grass (1 ft)", 0.74, 1.0, 3500.0, 0.12),
    model("FM2", "Timber (grass and understory)", 4.0, 1.0, 2784.0, 0.15),
    model("FM3", "Tall grass (2.5 ft)", 3.0, 2.5, 1500.0, 0.25),
    model("FM4", "Chaparral (6 ft)", 13.0, 6.0, 1739.0, 0.20),
    model("FM5", "Brush (2 ft)", 3.5, 2.0, 1683.0, 0.20),
    model("FM6", "Dormant brush, hardwood slash", 6.0, 2.5, 1564.0, 0.25),
    model("FM7", "Southern rough", 4.87, 2.5, 1552.0, 0.40),
    model("FM8", "Closed timber litter", 5.0, 0.2, 1889.0, 0.30),
    model("FM9", "Hardwood litter", 3.5, 0.2, 2484.0, 0.25),
    model("FM10", "Timber (litter and understory)", 12.0, 1.0, 1764.0, 0.25),
];

/// Item names for the fuel model selector
pub fn model_codes() -> Vec<&'static str> {
    STANDARD_MODELS.iter().map(|m| m.code).collect()
}

/// Model at a selector index, falling back to the first model
pub fn by_index(index: usize) -> &'static FuelModel {
    STANDARD_MODELS.get(index).unwrap_or(&STANDARD_MODELS[0])
}

/// Model by code, case-insensitive
pub fn by_code(code: &str) -> Option<&'static FuelModel> {
    STANDARD_MODELS.iter().find(|m| m.code.eq_ignore_ascii_case(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_codes_are_unique() {
        let codes = model_codes();
        for (i, a) in codes.iter().enumerate() {
            assert!(codes[i + 1..].iter().all(|b| a != b), "duplicate {a}");
        }
    }

    #[test]
    fn test_load_conversion() {
        let bed = by_code("fm1").unwrap().fuel_bed();
        assert_relative_eq!(bed.load, 0.034, max_relative = 0.01);
        assert_eq!(bed.heat_content, 8000.0);
    }

    #[test]
    fn test_out_of_range_index_falls_back() {
        assert_eq!(by_index(99).code, "FM1");
        assert_eq!(by_index(9).code, "FM10");
    }

    #[test]
    fn test_models_are_physical() {
        for m in STANDARD_MODELS {
            assert!(m.load_tons_per_acre > 0.0 && m.depth > 0.0 && m.sav_ratio > 0.0);
            assert!(m.extinction_moisture > 0.0 && m.extinction_moisture < 1.0);
        }
    }
}
