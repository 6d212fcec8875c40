//! End-to-end surface fire runs through the catalog and saved scenarios

mod common;

use approx::assert_relative_eq;
use common::{enter, native, surface_graph};
use fire_behavior_core::catalog::{default_configuration, names, properties};
use fire_behavior_core::{
    catalog, GraphError, InputError, ResultTable, ScenarioFile, TableData, UnitSystem,
};
use std::path::PathBuf;

fn scenario(file: &str) -> ScenarioFile {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../cli/scenarios")
        .join(file);
    ScenarioFile::load(path).unwrap()
}

fn run(file: &str) -> ResultTable {
    let scenario = scenario(file);
    let mut graph =
        catalog::standard_graph(common::units(), scenario.configuration.clone()).unwrap();
    scenario.apply(&mut graph).unwrap();
    graph.run_from_stores().unwrap()
}

fn column(table: &ResultTable, name: &str) -> usize {
    table.outputs.iter().position(|c| c.name == name).unwrap()
}

#[test]
fn test_short_grass_wind_sweep() {
    let table = run("short_grass_wind.json");
    assert_eq!(table.rank(), 1);
    assert_eq!(table.axes[0].labels, vec!["0.0", "5.0", "10.0"]);
    assert_eq!(table.axes[0].units.as_deref(), Some("mi/h"));

    let spread = column(&table, names::SPREAD_RATE);
    assert_eq!(table.outputs[spread].units.as_deref(), Some("ch/h"));
    // 103.3 ft/min at 5 mi/h is 93.9 ch/h
    assert_relative_eq!(table.value(spread, &[1]).unwrap(), 93.9, max_relative = 0.01);

    let flame = column(&table, names::FLAME_LENGTH);
    assert_relative_eq!(table.value(flame, &[1]).unwrap(), 4.59, max_relative = 0.01);
    let calm = table.value(spread, &[0]).unwrap();
    let windy = table.value(spread, &[2]).unwrap();
    assert!(calm < table.value(spread, &[1]).unwrap() && windy > 200.0);
}

#[test]
fn test_timber_moisture_by_wind() {
    let table = run("timber_moisture_by_wind.json");
    assert_eq!(table.rank(), 2);
    let TableData::Matrix(matrices) = &table.data else {
        panic!("expected one matrix per output");
    };
    assert_eq!(matrices.len(), 2);
    assert_eq!(matrices[0].shape(), (3, 4));

    // Drier fuel and stronger wind both spread faster
    for row in 0..3 {
        for col in 1..4 {
            assert!(matrices[0][(row, col)] > matrices[0][(row, col - 1)]);
        }
    }
    for col in 0..4 {
        assert!(matrices[0][(0, col)] > matrices[0][(2, col)]);
    }
}

#[test]
fn test_all_modules_under_canopy() {
    let table = run("brush_all_modules.json");
    assert_eq!(table.rank(), 0);

    let waf = column(&table, names::WIND_ADJUSTMENT_FACTOR);
    assert_relative_eq!(table.value(waf, &[]).unwrap(), 0.222, max_relative = 0.01);
    let slope = column(&table, names::SLOPE_STEEPNESS);
    assert_relative_eq!(table.value(slope, &[]).unwrap(), 6.667, max_relative = 1e-3);

    for name in [
        names::SPREAD_RATE,
        names::FIRE_AREA,
        names::FIRE_PERIMETER,
        names::SPOT_DISTANCE,
        names::SCORCH_HEIGHT,
    ] {
        let value = table.value(column(&table, name), &[]).unwrap();
        assert!(value > 0.0, "{name} = {value}");
    }
    assert!(table.value(column(&table, names::LENGTH_TO_WIDTH), &[]).unwrap() > 1.0);
}

#[test]
fn test_metric_run_matches_english() {
    let english = run("short_grass_wind.json");

    let scenario = scenario("short_grass_wind.json");
    let mut graph =
        catalog::standard_graph(common::units(), scenario.configuration.clone()).unwrap();
    scenario.apply(&mut graph).unwrap();
    let configuration = graph
        .configuration()
        .clone()
        .with_unit_system(UnitSystem::Metric);
    graph.configure(configuration).unwrap();
    let metric = graph.run_from_stores().unwrap();

    let spread = column(&metric, names::SPREAD_RATE);
    assert_eq!(metric.outputs[spread].units.as_deref(), Some("m/min"));
    assert_eq!(metric.axes[0].units.as_deref(), Some("km/h"));
    let units = common::units();
    for row in 0..3 {
        let from_english = units
            .convert(english.value(spread, &[row]).unwrap(), "ch/h", "ft/min")
            .unwrap();
        let from_metric = units
            .convert(metric.value(spread, &[row]).unwrap(), "m/min", "ft/min")
            .unwrap();
        assert_relative_eq!(from_metric, from_english, max_relative = 1e-9);
    }
}

#[test]
fn test_out_of_range_store_is_located() {
    let mut graph = surface_graph(default_configuration(), &[names::SPREAD_RATE]);
    let moisture = graph.variable_id(names::FUEL_DEAD_MOISTURE).unwrap();
    assert!(graph.set_leaf_text(moisture, "6 70").is_err());

    match graph.run_from_stores() {
        Err(GraphError::Input(err)) => {
            assert_eq!(err.variable(), Some(moisture));
            assert_eq!(err.span(), Some((2, 2)));
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn test_blank_required_input_is_missing() {
    let mut graph = surface_graph(default_configuration(), &[names::SPREAD_RATE]);
    enter(&mut graph, names::WIND_MIDFLAME, "");
    assert!(matches!(
        graph.validate_inputs(),
        Err(InputError::MissingRequiredInput { name, .. }) if name == names::WIND_MIDFLAME
    ));
}

#[test]
fn test_only_downstream_routines_rerun() {
    let configuration = default_configuration().with_flag(properties::MODULE_SCORCH, true);
    let mut graph = surface_graph(configuration, &[names::SPREAD_RATE, names::SCORCH_HEIGHT]);
    graph.calculate_outputs().unwrap();
    let before = graph.invocations();
    let scorch = native(&graph, names::SCORCH_HEIGHT);

    enter(&mut graph, names::AIR_TEMPERATURE, "95");
    graph.calculate_outputs().unwrap();
    assert_eq!(graph.invocations(), before + 1);
    assert!(native(&graph, names::SCORCH_HEIGHT) > scorch);

    graph.calculate_outputs().unwrap();
    assert_eq!(graph.invocations(), before + 1);
}

#[test]
fn test_custom_fuel_bed() {
    let configuration = default_configuration().with_choice(properties::FUEL_INPUT, "custom");
    let mut graph = surface_graph(configuration, &[names::SPREAD_RATE]);
    let load = graph.variable_id(names::FUEL_LOAD).unwrap();
    assert!(graph.is_required(load));

    graph.calculate_outputs().unwrap();
    let light = native(&graph, names::SPREAD_RATE);
    // Heavier load of the same grass burns hotter but the bed packs tighter
    enter(&mut graph, names::FUEL_LOAD, "2");
    graph.calculate_outputs().unwrap();
    assert!(native(&graph, names::SPREAD_RATE) != light);
    assert_relative_eq!(light, 103.3, max_relative = 0.01);
}
