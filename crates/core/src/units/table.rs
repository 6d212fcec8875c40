//! Standard unit table
//!
//! Every unit the fire behavior catalog and its users may type. Factors are
//! relative to the SI base of each dimension signature (m, kg, s, K, rad).

use super::{exponents, Dimension, UnitError, UnitsRegistry};
use Dimension::{
    Class, Current, Length, Luminosity, Mass, PlaneAngle, Ratio, SolidAngle, Substance,
    Temperature, Time,
};

/// Description keys of the three temperature scales that carry an offset
pub(crate) const CELSIUS: &str = "Celsius";
pub(crate) const FAHRENHEIT: &str = "Fahrenheit";
pub(crate) const KELVIN: &str = "Kelvin";

/// Additive offsets for `[source][destination]`, indexed Celsius, Fahrenheit, Kelvin.
///
/// Applied after the multiplicative factor: `value' = offset + value * factor`.
pub(crate) const TEMPERATURE_OFFSETS: [[f64; 3]; 3] = [
    [0.0, 32.0, 273.15],
    [-160.0 / 9.0, 0.0, 273.15 - 160.0 / 9.0],
    [-273.15, -459.67, 0.0],
];

/// A named derived-unit signature used to explain dimension mismatches
pub(crate) struct DerivedUnit {
    pub name: &'static str,
    pub units: &'static str,
    pub signature: &'static [(Dimension, i32)],
}

/// Derived-unit signatures, first exact match wins
pub(crate) const DERIVED_UNITS: &[DerivedUnit] = &[
    DerivedUnit { name: "area", units: "m2", signature: &[(Length, 2)] },
    DerivedUnit { name: "volume", units: "m3", signature: &[(Length, 3)] },
    DerivedUnit { name: "velocity", units: "m/s", signature: &[(Length, 1), (Time, -1)] },
    DerivedUnit { name: "acceleration", units: "m/s2", signature: &[(Length, 1), (Time, -2)] },
    DerivedUnit { name: "frequency", units: "1/s", signature: &[(Time, -1)] },
    DerivedUnit { name: "surface-area-to-volume ratio", units: "m2/m3", signature: &[(Length, -1)] },
    DerivedUnit { name: "density", units: "kg/m3", signature: &[(Mass, 1), (Length, -3)] },
    DerivedUnit { name: "fuel load", units: "kg/m2", signature: &[(Mass, 1), (Length, -2)] },
    DerivedUnit { name: "mass flow", units: "kg/s", signature: &[(Mass, 1), (Time, -1)] },
    DerivedUnit { name: "force", units: "N", signature: &[(Mass, 1), (Length, 1), (Time, -2)] },
    DerivedUnit { name: "pressure", units: "Pa", signature: &[(Mass, 1), (Length, -1), (Time, -2)] },
    DerivedUnit { name: "energy", units: "J", signature: &[(Mass, 1), (Length, 2), (Time, -2)] },
    DerivedUnit { name: "power", units: "W", signature: &[(Mass, 1), (Length, 2), (Time, -3)] },
    DerivedUnit { name: "heat content", units: "kJ/kg", signature: &[(Length, 2), (Time, -2)] },
    DerivedUnit { name: "heat per unit area", units: "kJ/m2", signature: &[(Mass, 1), (Time, -2)] },
    DerivedUnit { name: "fireline intensity", units: "kW/m", signature: &[(Mass, 1), (Length, 1), (Time, -3)] },
    DerivedUnit { name: "reaction intensity", units: "kW/m2", signature: &[(Mass, 1), (Time, -3)] },
];

const FOOT: f64 = 0.3048;
const POUND: f64 = 0.45359237;
const BTU: f64 = 1055.05585262;

/// Register the standard table into an empty registry.
pub(super) fn register_standard(registry: &mut UnitsRegistry) -> Result<(), UnitError> {
    // Length
    registry.define("meter", "meter", exponents(&[(Length, 1)]), 1.0, &["m", "meter", "metre"])?;
    registry.define("foot", "meter", exponents(&[(Length, 1)]), FOOT, &["ft", "foot", "feet", "'"])?;
    registry.define("inch", "meter", exponents(&[(Length, 1)]), 0.0254, &["in", "inch", "inches", "\""])?;
    registry.define("yard", "meter", exponents(&[(Length, 1)]), 0.9144, &["yd", "yard"])?;
    registry.define("chain", "meter", exponents(&[(Length, 1)]), 66.0 * FOOT, &["ch", "chain"])?;
    registry.define("mile", "meter", exponents(&[(Length, 1)]), 5280.0 * FOOT, &["mi", "mile"])?;

    // Area and volume
    registry.define("hectare", "meter", exponents(&[(Length, 2)]), 1.0e4, &["ha", "hectare"])?;
    registry.define("acre", "meter", exponents(&[(Length, 2)]), 43560.0 * FOOT * FOOT, &["ac", "acre"])?;
    registry.define("liter", "meter", exponents(&[(Length, 3)]), 1.0e-3, &["l", "L", "liter", "litre"])?;
    registry.define("gallon", "meter", exponents(&[(Length, 3)]), 3.785411784e-3, &["gal", "gallon"])?;

    // Mass
    registry.define("kilogram", "kilogram", exponents(&[(Mass, 1)]), 1.0, &["kg", "kilogram", "kilo"])?;
    registry.define("gram", "kilogram", exponents(&[(Mass, 1)]), 1.0e-3, &["g", "gm", "gram"])?;
    registry.define("pound", "kilogram", exponents(&[(Mass, 1)]), POUND, &["lb", "pound"])?;
    registry.define("ton", "kilogram", exponents(&[(Mass, 1)]), 2000.0 * POUND, &["ton", "tn"])?;
    registry.define("tonne", "kilogram", exponents(&[(Mass, 1)]), 1000.0, &["t", "tonne"])?;

    // Time
    registry.define("second", "second", exponents(&[(Time, 1)]), 1.0, &["s", "sec", "second"])?;
    registry.define("minute", "second", exponents(&[(Time, 1)]), 60.0, &["min", "minute"])?;
    registry.define("hour", "second", exponents(&[(Time, 1)]), 3600.0, &["h", "hr", "hour"])?;
    registry.define("day", "second", exponents(&[(Time, 1)]), 86400.0, &["day"])?;
    registry.define("year", "second", exponents(&[(Time, 1)]), 365.25 * 86400.0, &["yr", "year"])?;

    // Temperature scales share a dimension; offsets live in TEMPERATURE_OFFSETS
    registry.define(KELVIN, KELVIN, exponents(&[(Temperature, 1)]), 1.0, &["oK", "degK", "K", "kelvin", "Kelvin"])?;
    registry.define(CELSIUS, KELVIN, exponents(&[(Temperature, 1)]), 1.0, &["oC", "degC", "C", "celsius", "Celsius", "centigrade"])?;
    registry.define(FAHRENHEIT, KELVIN, exponents(&[(Temperature, 1)]), 5.0 / 9.0, &["oF", "degF", "F", "fahrenheit", "Fahrenheit"])?;

    // Angles
    registry.define("radian", "radian", exponents(&[(PlaneAngle, 1)]), 1.0, &["rad", "radian"])?;
    registry.define("degree", "radian", exponents(&[(PlaneAngle, 1)]), std::f64::consts::PI / 180.0, &["deg", "degree"])?;
    registry.define("steradian", "steradian", exponents(&[(SolidAngle, 1)]), 1.0, &["sr", "steradian"])?;

    // Ratios and classes
    registry.define("fraction", "fraction", exponents(&[(Ratio, 1)]), 1.0, &["fraction", "frac", "ratio"])?;
    registry.define("percent", "fraction", exponents(&[(Ratio, 1)]), 0.01, &["%", "percent", "pct"])?;
    registry.define("class", "class", exponents(&[(Class, 1)]), 1.0, &["class", "category"])?;

    // Remaining SI bases
    registry.define("ampere", "ampere", exponents(&[(Current, 1)]), 1.0, &["A", "amp", "ampere"])?;
    registry.define("candela", "candela", exponents(&[(Luminosity, 1)]), 1.0, &["cd", "candela"])?;
    registry.define("mole", "mole", exponents(&[(Substance, 1)]), 1.0, &["mol", "mole"])?;

    // Energy, power and friends
    let energy = exponents(&[(Mass, 1), (Length, 2), (Time, -2)]);
    registry.define("joule", "joule", energy, 1.0, &["J", "joule"])?;
    registry.define("calorie", "joule", energy, 4.1868, &["cal", "calorie"])?;
    registry.define("british thermal unit", "joule", energy, BTU, &["btu", "Btu", "BTU"])?;
    registry.define("watt", "watt", exponents(&[(Mass, 1), (Length, 2), (Time, -3)]), 1.0, &["W", "watt"])?;
    registry.define("newton", "newton", exponents(&[(Mass, 1), (Length, 1), (Time, -2)]), 1.0, &["N", "newton"])?;
    registry.define("pascal", "pascal", exponents(&[(Mass, 1), (Length, -1), (Time, -2)]), 1.0, &["Pa", "pascal"])?;

    // Speeds commonly typed as one word
    let speed = exponents(&[(Length, 1), (Time, -1)]);
    registry.define("miles per hour", "meter per second", speed, 5280.0 * FOOT / 3600.0, &["mph"])?;
    registry.define("kilometers per hour", "meter per second", speed, 1000.0 / 3600.0, &["kph"])?;
    registry.define("knot", "meter per second", speed, 1852.0 / 3600.0, &["kt", "knot"])?;

    Ok(())
}
