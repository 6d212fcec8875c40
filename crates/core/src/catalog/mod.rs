//! Surface fire behavior catalog
//!
//! Registers the variables and producer functions of a surface fire
//! calculation: fuel, wind and slope inputs feeding the Rothermel spread
//! model, with optional fire size, spotting and scorch modules. Native units
//! are English throughout; every variable also carries metric display units.
//!
//! Configuration properties:
//! - `fuel.input`: `model` (standard fuel model) or `custom` (fuel bed leaves)
//! - `wind.speed`: `midflame` or `twenty_foot`
//! - `wind.adjustment`: `input` or `canopy`
//! - `slope.input`: `direct` or `map`
//! - `module.size`, `module.spot`, `module.scorch`: flags

pub mod fuel_models;
pub mod scorch;
pub mod size;
pub mod spot;
pub mod surface;
pub mod terrain;
pub mod wind;

use crate::config::{Condition, Configuration, ConflictRule, PropertyValue};
use crate::function::{Inputs, Outputs};
use crate::graph::{DependencyGraph, GraphBuilder, GraphError};
use crate::units::UnitsRegistry;
use crate::variable::ContinuousSpec;
use std::sync::Arc;
use surface::FuelBed;

/// Variable names
pub mod names {
    pub const FUEL_MODEL: &str = "fuel.model";
    pub const FUEL_LOAD: &str = "fuel.load";
    pub const FUEL_DEPTH: &str = "fuel.depth";
    pub const FUEL_SAV_RATIO: &str = "fuel.sav_ratio";
    pub const FUEL_HEAT_CONTENT: &str = "fuel.heat_content";
    pub const FUEL_EXTINCTION_MOISTURE: &str = "fuel.extinction_moisture";
    pub const FUEL_DEAD_MOISTURE: &str = "fuel.dead_moisture";

    pub const WIND_MIDFLAME: &str = "wind.midflame";
    pub const WIND_TWENTY_FOOT: &str = "wind.twenty_foot";
    pub const WIND_ADJUSTMENT_FACTOR: &str = "wind.adjustment_factor";
    pub const CANOPY_COVER: &str = "canopy.cover";
    pub const CANOPY_HEIGHT: &str = "canopy.height";
    pub const CANOPY_CROWN_RATIO: &str = "canopy.crown_ratio";

    pub const SLOPE_STEEPNESS: &str = "slope.steepness";
    pub const SLOPE_DEGREES: &str = "slope.degrees";
    pub const MAP_SCALE: &str = "map.scale";
    pub const MAP_CONTOUR_INTERVAL: &str = "map.contour_interval";
    pub const MAP_CONTOUR_COUNT: &str = "map.contour_count";
    pub const MAP_DISTANCE: &str = "map.distance";

    pub const SPREAD_RATE: &str = "surface.spread_rate";
    pub const REACTION_INTENSITY: &str = "surface.reaction_intensity";
    pub const HEAT_PER_UNIT_AREA: &str = "surface.heat_per_unit_area";
    pub const RESIDENCE_TIME: &str = "surface.residence_time";
    pub const EFFECTIVE_WIND: &str = "surface.effective_wind";
    pub const FIRELINE_INTENSITY: &str = "surface.fireline_intensity";
    pub const FLAME_LENGTH: &str = "surface.flame_length";

    pub const ELAPSED_TIME: &str = "size.elapsed_time";
    pub const LENGTH_TO_WIDTH: &str = "size.length_to_width";
    pub const BACKING_RATE: &str = "size.backing_rate";
    pub const FORWARD_DISTANCE: &str = "size.forward_distance";
    pub const FIRE_LENGTH: &str = "size.length";
    pub const FIRE_WIDTH: &str = "size.width";
    pub const FIRE_AREA: &str = "size.area";
    pub const FIRE_PERIMETER: &str = "size.perimeter";

    pub const FIREBRAND_MASS: &str = "spot.firebrand_mass";
    pub const FIREBRAND_DIAMETER: &str = "spot.firebrand_diameter";
    pub const LOFTING_HEIGHT: &str = "spot.lofting_height";
    pub const SPOT_DISTANCE: &str = "spot.distance";

    pub const AIR_TEMPERATURE: &str = "air.temperature";
    pub const SCORCH_HEIGHT: &str = "scorch.height";
}

/// Configuration property names and values
pub mod properties {
    pub const FUEL_INPUT: &str = "fuel.input";
    pub const WIND_SPEED: &str = "wind.speed";
    pub const WIND_ADJUSTMENT: &str = "wind.adjustment";
    pub const SLOPE_INPUT: &str = "slope.input";
    pub const MODULE_SIZE: &str = "module.size";
    pub const MODULE_SPOT: &str = "module.spot";
    pub const MODULE_SCORCH: &str = "module.scorch";
}

// Native-to-SI factors for the spotting model
const BTU_PER_FT_S_TO_KW_PER_M: f64 = 3.461_469;
const FT_PER_MIN_TO_M_PER_S: f64 = 0.00508;
const FEET_PER_METER: f64 = 1.0 / 0.3048;

/// Properties of a plain surface fire run
pub fn default_configuration() -> Configuration {
    use properties::*;
    Configuration::new()
        .with_choice(FUEL_INPUT, "model")
        .with_choice(WIND_SPEED, "midflame")
        .with_choice(WIND_ADJUSTMENT, "input")
        .with_choice(SLOPE_INPUT, "direct")
        .with_flag(MODULE_SIZE, false)
        .with_flag(MODULE_SPOT, false)
        .with_flag(MODULE_SCORCH, false)
}

/// Combinations rejected on reconfiguration
pub fn conflict_rules() -> Vec<ConflictRule> {
    use properties::*;
    let twenty_foot = Condition::choice(WIND_SPEED, "twenty_foot");
    vec![
        ConflictRule {
            kind: "spot_needs_twenty_foot_wind".to_string(),
            when: Condition::All(vec![Condition::flag(MODULE_SPOT), twenty_foot.clone().negate()]),
            message: "spotting distance is driven by the 20-ft wind speed".to_string(),
            resolution: vec![(WIND_SPEED.to_string(), PropertyValue::Choice("twenty_foot".to_string()))],
        },
        ConflictRule {
            kind: "canopy_needs_twenty_foot_wind".to_string(),
            when: Condition::All(vec![
                Condition::choice(WIND_ADJUSTMENT, "canopy"),
                twenty_foot.negate(),
            ]),
            message: "a canopy wind adjustment only applies to a 20-ft wind speed".to_string(),
            resolution: vec![(WIND_ADJUSTMENT.to_string(), PropertyValue::Choice("input".to_string()))],
        },
    ]
}

/// Outputs worth reporting under a configuration
pub fn default_outputs(configuration: &Configuration) -> Vec<&'static str> {
    use names::*;
    let mut outputs = vec![
        SPREAD_RATE,
        HEAT_PER_UNIT_AREA,
        FIRELINE_INTENSITY,
        FLAME_LENGTH,
    ];
    if configuration.flag(properties::MODULE_SIZE) {
        outputs.extend([FIRE_AREA, FIRE_PERIMETER, LENGTH_TO_WIDTH]);
    }
    if configuration.flag(properties::MODULE_SPOT) {
        outputs.push(SPOT_DISTANCE);
    }
    if configuration.flag(properties::MODULE_SCORCH) {
        outputs.push(SCORCH_HEIGHT);
    }
    outputs
}

/// Speed in ft/min, shown as mi/h or km/h
fn wind_spec(default: f64) -> ContinuousSpec {
    ContinuousSpec::new("ft/min", 0.0, 8800.0, default)
        .english("mi/h", 1)
        .metric("km/h", 1)
}

/// Distance in ft, shown as chains or meters
fn distance_spec() -> ContinuousSpec {
    ContinuousSpec::new("ft", 0.0, 1.0e9, 0.0)
        .english("ch", 1)
        .metric("m", 0)
}

fn percent_spec(minimum: f64, maximum: f64, default: f64) -> ContinuousSpec {
    ContinuousSpec::new("fraction", minimum, maximum, default)
        .english("%", 0)
        .metric("%", 0)
}

/// Register every catalog variable, function and conflict rule
///
/// # Errors
/// Returns error if a unit phrase fails to compile or a name is reused
pub fn builder(units: Arc<UnitsRegistry>) -> Result<GraphBuilder, GraphError> {
    use names::*;
    use properties::*;

    let mut b = GraphBuilder::new(units);
    let fm1 = fuel_models::by_index(0).fuel_bed();

    // Fuel
    let model = b.discrete(FUEL_MODEL, &fuel_models::model_codes(), 0)?;
    let load = b.continuous(
        FUEL_LOAD,
        ContinuousSpec::new("lb/ft2", 0.0, 5.0, fm1.load)
            .english("ton/ac", 2)
            .metric("t/ha", 2),
    )?;
    let depth = b.continuous(
        FUEL_DEPTH,
        ContinuousSpec::new("ft", 0.01, 10.0, fm1.depth)
            .english("ft", 2)
            .metric("m", 2),
    )?;
    let sav = b.continuous(
        FUEL_SAV_RATIO,
        ContinuousSpec::new("ft2/ft3", 1.0, 4000.0, fm1.sav_ratio)
            .english("ft2/ft3", 0)
            .metric("m2/m3", 0),
    )?;
    let heat = b.continuous(
        FUEL_HEAT_CONTENT,
        ContinuousSpec::new("btu/lb", 1000.0, 12000.0, fm1.heat_content)
            .english("btu/lb", 0)
            .metric("kJ/kg", 0),
    )?;
    let extinction = b.continuous(
        FUEL_EXTINCTION_MOISTURE,
        percent_spec(0.05, 1.0, fm1.extinction_moisture),
    )?;
    let moisture = b.continuous(FUEL_DEAD_MOISTURE, percent_spec(0.01, 0.6, 0.06))?;

    // Wind
    let midflame = b.continuous(WIND_MIDFLAME, wind_spec(440.0))?;
    let twenty_foot = b.continuous(WIND_TWENTY_FOOT, wind_spec(1320.0))?;
    let waf = b.continuous(
        WIND_ADJUSTMENT_FACTOR,
        ContinuousSpec::new("fraction", 0.0, 1.0, 0.4)
            .english("fraction", 2)
            .metric("fraction", 2),
    )?;
    let cover = b.continuous(CANOPY_COVER, percent_spec(0.0, 1.0, 0.5))?;
    let canopy_height = b.continuous(
        CANOPY_HEIGHT,
        ContinuousSpec::new("ft", 1.0, 300.0, 60.0)
            .english("ft", 0)
            .metric("m", 1),
    )?;
    let crown_ratio = b.continuous(
        CANOPY_CROWN_RATIO,
        ContinuousSpec::new("fraction", 0.0, 1.0, 0.5)
            .english("fraction", 2)
            .metric("fraction", 2),
    )?;

    // Slope
    let slope = b.continuous(SLOPE_STEEPNESS, percent_spec(0.0, 6.0, 0.0))?;
    let degrees = b.continuous(
        SLOPE_DEGREES,
        ContinuousSpec::new("deg", 0.0, 90.0, 0.0)
            .english("deg", 1)
            .metric("deg", 1),
    )?;
    let scale = b.continuous(
        MAP_SCALE,
        ContinuousSpec::new("", 1.0, 1.0e7, 24000.0).english("", 0).metric("", 0),
    )?;
    let interval = b.continuous(
        MAP_CONTOUR_INTERVAL,
        ContinuousSpec::new("ft", 1.0, 10000.0, 40.0)
            .english("ft", 0)
            .metric("m", 0),
    )?;
    let count = b.continuous(
        MAP_CONTOUR_COUNT,
        ContinuousSpec::new("", 0.0, 1000.0, 5.0).english("", 0).metric("", 0),
    )?;
    let map_distance = b.continuous(
        MAP_DISTANCE,
        ContinuousSpec::new("in", 0.01, 100.0, 1.0)
            .english("in", 2)
            .metric("cm", 1),
    )?;

    // Surface fire
    let spread = b.continuous(
        SPREAD_RATE,
        ContinuousSpec::new("ft/min", 0.0, 1.0e6, 0.0)
            .english("ch/h", 1)
            .metric("m/min", 1),
    )?;
    let reaction = b.continuous(
        REACTION_INTENSITY,
        ContinuousSpec::new("btu/ft2/min", 0.0, 1.0e9, 0.0)
            .english("btu/ft2/min", 0)
            .metric("kW/m2", 0),
    )?;
    let hpua = b.continuous(
        HEAT_PER_UNIT_AREA,
        ContinuousSpec::new("btu/ft2", 0.0, 1.0e9, 0.0)
            .english("btu/ft2", 0)
            .metric("kJ/m2", 0),
    )?;
    let residence = b.continuous(
        RESIDENCE_TIME,
        ContinuousSpec::new("min", 0.0, 1.0e3, 0.0)
            .english("min", 3)
            .metric("min", 3),
    )?;
    let effective = b.continuous(
        EFFECTIVE_WIND,
        ContinuousSpec::new("ft/min", 0.0, 1.0e9, 0.0)
            .english("mi/h", 1)
            .metric("km/h", 1),
    )?;
    let intensity = b.continuous(
        FIRELINE_INTENSITY,
        ContinuousSpec::new("btu/ft/s", 0.0, 1.0e9, 0.0)
            .english("btu/ft/s", 0)
            .metric("kW/m", 0),
    )?;
    let flame = b.continuous(
        FLAME_LENGTH,
        ContinuousSpec::new("ft", 0.0, 1.0e6, 0.0)
            .english("ft", 1)
            .metric("m", 2),
    )?;

    // Size
    let elapsed = b.continuous(
        ELAPSED_TIME,
        ContinuousSpec::new("min", 0.0, 10000.0, 60.0)
            .english("h", 2)
            .metric("h", 2),
    )?;
    let ratio = b.continuous(
        LENGTH_TO_WIDTH,
        ContinuousSpec::new("", 1.0, 1.0e3, 1.0).english("", 2).metric("", 2),
    )?;
    let backing = b.continuous(
        BACKING_RATE,
        ContinuousSpec::new("ft/min", 0.0, 1.0e6, 0.0)
            .english("ch/h", 1)
            .metric("m/min", 1),
    )?;
    let forward = b.continuous(FORWARD_DISTANCE, distance_spec())?;
    let fire_length = b.continuous(FIRE_LENGTH, distance_spec())?;
    let fire_width = b.continuous(FIRE_WIDTH, distance_spec())?;
    let area = b.continuous(
        FIRE_AREA,
        ContinuousSpec::new("ft2", 0.0, 1.0e15, 0.0)
            .english("ac", 2)
            .metric("ha", 2),
    )?;
    let perimeter = b.continuous(FIRE_PERIMETER, distance_spec())?;

    // Spotting
    let mass = b.continuous(
        FIREBRAND_MASS,
        ContinuousSpec::new("g", 0.01, 1000.0, 0.5)
            .english("g", 2)
            .metric("g", 2),
    )?;
    let diameter = b.continuous(
        FIREBRAND_DIAMETER,
        ContinuousSpec::new("in", 0.01, 20.0, 0.4)
            .english("in", 2)
            .metric("cm", 1),
    )?;
    let lofting = b.continuous(
        LOFTING_HEIGHT,
        ContinuousSpec::new("ft", 0.0, 1.0e6, 0.0)
            .english("ft", 0)
            .metric("m", 0),
    )?;
    let spot_distance = b.continuous(
        SPOT_DISTANCE,
        ContinuousSpec::new("ft", 0.0, 1.0e9, 0.0)
            .english("mi", 2)
            .metric("km", 2),
    )?;

    // Scorch
    let air = b.continuous(
        AIR_TEMPERATURE,
        ContinuousSpec::new("oF", -40.0, 130.0, 77.0)
            .english("oF", 0)
            .metric("oC", 0),
    )?;
    let scorch_height = b.continuous(
        SCORCH_HEIGHT,
        ContinuousSpec::new("ft", 0.0, 1.0e6, 0.0)
            .english("ft", 1)
            .metric("m", 1),
    )?;

    b.function(
        "fuel_model",
        &[model],
        &[load, depth, sav, heat, extinction],
        Condition::choice(FUEL_INPUT, "model"),
        |i: &Inputs<'_>, o: &mut Outputs| {
            let bed = fuel_models::by_index(i.item(0)).fuel_bed();
            o.set_number(0, bed.load);
            o.set_number(1, bed.depth);
            o.set_number(2, bed.sav_ratio);
            o.set_number(3, bed.heat_content);
            o.set_number(4, bed.extinction_moisture);
        },
    )?;

    b.function(
        "wind_adjustment_factor",
        &[depth, canopy_height, cover, crown_ratio],
        &[waf],
        Condition::choice(WIND_ADJUSTMENT, "canopy"),
        |i: &Inputs<'_>, o: &mut Outputs| {
            o.set_number(
                0,
                wind::adjustment_factor(i.number(0), i.number(1), i.number(2), i.number(3)),
            );
        },
    )?;

    b.function(
        "midflame_wind",
        &[twenty_foot, waf],
        &[midflame],
        Condition::choice(WIND_SPEED, "twenty_foot"),
        |i: &Inputs<'_>, o: &mut Outputs| {
            o.set_number(0, wind::midflame_wind(i.number(0), i.number(1)));
        },
    )?;

    b.function(
        "map_slope",
        &[scale, interval, count, map_distance],
        &[slope],
        Condition::choice(SLOPE_INPUT, "map"),
        |i: &Inputs<'_>, o: &mut Outputs| {
            o.set_number(
                0,
                terrain::map_slope(i.number(0), i.number(1), i.number(2), i.number(3)),
            );
        },
    )?;

    b.function(
        "slope_degrees",
        &[slope],
        &[degrees],
        Condition::Always,
        |i: &Inputs<'_>, o: &mut Outputs| {
            o.set_number(0, terrain::slope_degrees(i.number(0)));
        },
    )?;

    b.function(
        "rothermel_spread",
        &[load, depth, sav, heat, extinction, moisture, midflame, slope],
        &[spread, reaction, hpua, residence, effective],
        Condition::Always,
        |i: &Inputs<'_>, o: &mut Outputs| {
            let fuel = FuelBed {
                load: i.number(0),
                depth: i.number(1),
                sav_ratio: i.number(2),
                heat_content: i.number(3),
                extinction_moisture: i.number(4),
            };
            let fire = surface::rothermel_spread(&fuel, i.number(5), i.number(6), i.number(7));
            o.set_number(0, fire.spread_rate);
            o.set_number(1, fire.reaction_intensity);
            o.set_number(2, fire.heat_per_unit_area);
            o.set_number(3, fire.residence_time);
            o.set_number(4, fire.effective_wind);
        },
    )?;

    b.function(
        "byram_intensity",
        &[hpua, spread],
        &[intensity, flame],
        Condition::Always,
        |i: &Inputs<'_>, o: &mut Outputs| {
            let fireline = surface::fireline_intensity(i.number(0), i.number(1));
            o.set_number(0, fireline);
            o.set_number(1, surface::flame_length(fireline));
        },
    )?;

    b.function(
        "fire_size",
        &[spread, effective, elapsed],
        &[ratio, backing, forward, fire_length, fire_width, area, perimeter],
        Condition::flag(MODULE_SIZE),
        |i: &Inputs<'_>, o: &mut Outputs| {
            let ellipse = size::fire_ellipse(i.number(0), i.number(1), i.number(2));
            o.set_number(0, ellipse.length_to_width);
            o.set_number(1, ellipse.backing_rate);
            o.set_number(2, ellipse.forward_distance);
            o.set_number(3, ellipse.length);
            o.set_number(4, ellipse.width);
            o.set_number(5, ellipse.area);
            o.set_number(6, ellipse.perimeter);
        },
    )?;

    b.function(
        "spotting_distance",
        &[intensity, twenty_foot, mass, diameter, degrees],
        &[lofting, spot_distance],
        Condition::flag(MODULE_SPOT),
        |i: &Inputs<'_>, o: &mut Outputs| {
            let fireline = i.number(0) * BTU_PER_FT_S_TO_KW_PER_M;
            let wind = i.number(1) * FT_PER_MIN_TO_M_PER_S;
            let mass = i.number(2) / 1000.0;
            let diameter = i.number(3) * 0.0254;
            o.set_number(0, spot::lofting_height(fireline) * FEET_PER_METER);
            o.set_number(
                1,
                spot::maximum_spotting_distance(fireline, wind, mass, diameter, i.number(4))
                    * FEET_PER_METER,
            );
        },
    )?;

    b.function(
        "scorch_height",
        &[intensity, midflame, air],
        &[scorch_height],
        Condition::flag(MODULE_SCORCH),
        |i: &Inputs<'_>, o: &mut Outputs| {
            let wind_mph = i.number(1) / size::FT_PER_MIN_PER_MPH;
            o.set_number(0, scorch::scorch_height(i.number(0), wind_mph, i.number(2)));
        },
    )?;

    for rule in conflict_rules() {
        b.conflict_rule(rule);
    }
    Ok(b)
}

/// Build the catalog graph under a configuration
///
/// # Errors
/// Returns error if the catalog fails to register or the configuration is rejected
pub fn standard_graph(
    units: Arc<UnitsRegistry>,
    configuration: Configuration,
) -> Result<DependencyGraph, GraphError> {
    builder(units)?.build(configuration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, UnitSystem};
    use approx::assert_relative_eq;

    fn graph(configuration: Configuration) -> DependencyGraph {
        standard_graph(Arc::new(UnitsRegistry::standard()), configuration).unwrap()
    }

    fn value(g: &DependencyGraph, name: &str) -> f64 {
        g.variable(g.variable_id(name).unwrap()).native_value().unwrap()
    }

    #[test]
    fn test_default_surface_run() {
        let mut g = graph(default_configuration());
        let outputs = default_outputs(g.configuration());
        g.request_outputs_by_name(&outputs[..]).unwrap();
        g.calculate_outputs().unwrap();

        assert_relative_eq!(value(&g, names::SPREAD_RATE), 103.3, max_relative = 0.01);
        assert_relative_eq!(value(&g, names::FLAME_LENGTH), 4.59, max_relative = 0.01);
        let load: f64 = g
            .variable(g.variable_id(names::FUEL_LOAD).unwrap())
            .store()
            .parse()
            .unwrap();
        assert_relative_eq!(load, 0.74052, max_relative = 1e-9);
    }

    #[test]
    fn test_required_inputs_follow_configuration() {
        let mut g = graph(default_configuration());
        g.request_outputs_by_name(&[names::SPREAD_RATE]).unwrap();
        let mut required: Vec<&str> = g
            .required_inputs()
            .iter()
            .map(|&id| g.variable(id).name())
            .collect();
        required.sort_unstable();
        assert_eq!(
            required,
            vec![
                names::FUEL_DEAD_MOISTURE,
                names::FUEL_MODEL,
                names::SLOPE_STEEPNESS,
                names::WIND_MIDFLAME
            ]
        );

        g.configure(
            default_configuration()
                .with_choice(properties::SLOPE_INPUT, "map")
                .with_choice(properties::WIND_SPEED, "twenty_foot"),
        )
        .unwrap();
        let twenty = g.variable_id(names::WIND_TWENTY_FOOT).unwrap();
        let steepness = g.variable_id(names::SLOPE_STEEPNESS).unwrap();
        assert!(g.is_required(twenty));
        assert!(!g.is_required(steepness));
        assert!(!g.is_leaf(steepness));
    }

    #[test]
    fn test_map_slope_feeds_spread() {
        let mut g = graph(default_configuration());
        g.request_outputs_by_name(&[names::SPREAD_RATE]).unwrap();
        g.calculate_outputs().unwrap();
        let flat = value(&g, names::SPREAD_RATE);

        g.configure(default_configuration().with_choice(properties::SLOPE_INPUT, "map"))
            .unwrap();
        g.calculate_outputs().unwrap();
        assert_relative_eq!(value(&g, names::SLOPE_STEEPNESS), 0.1, epsilon = 1e-12);
        assert!(value(&g, names::SPREAD_RATE) > flat);
    }

    #[test]
    fn test_spot_requires_twenty_foot_wind() {
        let mut g = graph(default_configuration());
        let err = g
            .configure(default_configuration().with_flag(properties::MODULE_SPOT, true))
            .unwrap_err();
        match err {
            GraphError::Config(ConfigError::ConfigurationConflict(conflict)) => {
                assert_eq!(conflict.kind, "spot_needs_twenty_foot_wind");
            }
            other => panic!("unexpected error {other}"),
        }
        // Rejected configurations leave the graph untouched
        assert!(!g.configuration().flag(properties::MODULE_SPOT));
    }

    #[test]
    fn test_all_modules() {
        let configuration = default_configuration()
            .with_choice(properties::WIND_SPEED, "twenty_foot")
            .with_choice(properties::WIND_ADJUSTMENT, "canopy")
            .with_flag(properties::MODULE_SIZE, true)
            .with_flag(properties::MODULE_SPOT, true)
            .with_flag(properties::MODULE_SCORCH, true);
        let mut g = graph(configuration);
        let outputs = default_outputs(g.configuration());
        g.request_outputs_by_name(&outputs[..]).unwrap();
        g.calculate_outputs().unwrap();

        assert!(value(&g, names::WIND_ADJUSTMENT_FACTOR) > 0.0);
        assert!(value(&g, names::FIRE_AREA) > 0.0);
        assert!(value(&g, names::LENGTH_TO_WIDTH) > 1.0);
        assert!(value(&g, names::SPOT_DISTANCE) > 0.0);
        assert!(value(&g, names::SCORCH_HEIGHT) > 0.0);
    }

    #[test]
    fn test_metric_display() {
        let mut g = graph(default_configuration().with_unit_system(UnitSystem::Metric));
        g.request_outputs_by_name(&[names::SPREAD_RATE]).unwrap();
        g.calculate_outputs().unwrap();
        let spread = g.variable(g.variable_id(names::SPREAD_RATE).unwrap());
        assert_eq!(spread.display_units(), Some("m/min"));
        assert_relative_eq!(spread.display_value().unwrap(), 103.3 * 0.3048, max_relative = 0.01);
    }
}
