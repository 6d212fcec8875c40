//! Unit registry properties over the phrases the catalog uses

mod common;

use approx::assert_relative_eq;
use fire_behavior_core::units::Side;
use fire_behavior_core::{ContinuousSpec, UnitError, UnitsRegistry, Variable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const PHRASES: &[&str] = &[
    "ft", "m", "in", "cm", "ch", "mi", "km", "ft/min", "m/s", "mi/h", "km/h", "ch/h", "m/min",
    "lb/ft2", "kg/m2", "ton/ac", "t/ha", "btu/ft/s", "kW/m", "btu/ft2/min", "kW/m2", "btu/lb",
    "kJ/kg", "%", "fraction", "h", "min", "s", "deg", "rad", "ac", "ha", "ft2", "oF", "oC", "K",
];

#[test]
fn test_compatibility_is_symmetric() {
    let units = UnitsRegistry::standard();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
        let a = PHRASES[rng.random_range(0..PHRASES.len())];
        let b = PHRASES[rng.random_range(0..PHRASES.len())];
        let ca = units.compile(a, Side::Source).unwrap();
        let cb = units.compile(b, Side::Source).unwrap();
        assert_eq!(
            units.compatible(&ca, &cb),
            units.compatible(&cb, &ca),
            "{a} vs {b}"
        );
    }
}

#[test]
fn test_identity_conversion_is_exact() {
    let units = UnitsRegistry::standard();
    let mut rng = StdRng::seed_from_u64(11);
    for phrase in PHRASES {
        for _ in 0..20 {
            let v: f64 = rng.random_range(-1.0e4..1.0e4);
            assert_eq!(units.convert(v, phrase, phrase).unwrap(), v, "{phrase}");
        }
    }
}

#[test]
fn test_compatible_pairs_round_trip() {
    let units = UnitsRegistry::standard();
    let mut rng = StdRng::seed_from_u64(23);
    let mut checked = 0;
    for _ in 0..2000 {
        let a = PHRASES[rng.random_range(0..PHRASES.len())];
        let b = PHRASES[rng.random_range(0..PHRASES.len())];
        let Ok(forward) = units.convert(1.0, a, b) else {
            continue;
        };
        assert!(forward.is_finite());
        let v: f64 = rng.random_range(-500.0..500.0);
        let there = units.convert(v, a, b).unwrap();
        let back = units.convert(there, b, a).unwrap();
        assert_relative_eq!(back, v, epsilon = 1e-9, max_relative = 1e-9);
        checked += 1;
    }
    assert!(checked > 50, "only {checked} compatible pairs drawn");
}

#[test]
fn test_fahrenheit_to_celsius() {
    let units = UnitsRegistry::standard();
    assert_relative_eq!(units.convert(100.0, "oF", "oC").unwrap(), 37.777_777_8, epsilon = 1e-6);
    assert_relative_eq!(units.convert(32.0, "oF", "oC").unwrap(), 0.0, epsilon = 1e-9);
}

#[test]
fn test_fuel_load_units_agree() {
    let units = UnitsRegistry::standard();
    let lb = units.compile("lb/ft2", Side::Source).unwrap();
    let kg = units.compile("kg/m2", Side::Destination).unwrap();
    assert!(units.compatible(&lb, &kg));
    // 1 t/ac is about 2.24 t/ha
    assert_relative_eq!(units.convert(1.0, "ton/ac", "t/ha").unwrap(), 2.2417, epsilon = 1e-3);
}

#[test]
fn test_speed_against_length_is_explained() {
    let units = UnitsRegistry::standard();
    let err = units.convert(1.0, "m/s", "ft").unwrap_err();
    match err {
        UnitError::IncompatibleDimensions { explanation, .. } => {
            assert!(explanation.contains("distance/time"), "{explanation}");
            assert!(explanation.contains("distance"), "{explanation}");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn test_unknown_alias_names_the_token() {
    let units = UnitsRegistry::standard();
    match units.convert(1.0, "furlong", "m").unwrap_err() {
        UnitError::UnknownUnitAlias { side, token, .. } => {
            assert_eq!(side, Side::Source);
            assert_eq!(token, "furlong");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn test_display_round_trip_within_decimals() {
    let units = UnitsRegistry::standard();
    let mut variable = Variable::continuous(
        "spread",
        ContinuousSpec::new("ft/min", 0.0, 1000.0, 0.0)
            .english("ch/h", 1)
            .metric("m/min", 2),
        &units,
    )
    .unwrap();
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..200 {
        let x: f64 = rng.random_range(0.0..990.0);
        variable.set_native_value(x).unwrap();
        let shown: f64 = variable.format_display().parse().unwrap();
        variable.set_display_value(shown).unwrap();
        // Half a display digit of ch/h, in ft/min
        let tolerance = 0.05 * 66.0 / 60.0;
        assert!((variable.native_value().unwrap() - x).abs() <= tolerance + 1e-9);
    }
}
