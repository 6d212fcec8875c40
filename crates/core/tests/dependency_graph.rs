//! Engine behavior on small hand-built graphs

mod common;

use fire_behavior_core::{
    Condition, ConfigError, Configuration, ContinuousSpec, DependencyGraph, GraphBuilder,
    GraphError, InputError, Inputs, Outputs, RangeSpec, TableData, VarId,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn spec() -> ContinuousSpec {
    ContinuousSpec::new("ft", 0.0, 1000.0, 1.0).english("ft", 2).metric("m", 2)
}

/// Two leaves feeding one function, counted per invocation
fn counted() -> (DependencyGraph, VarId, VarId, VarId, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let mut b = GraphBuilder::new(common::units());
    let a = b.continuous("a", spec()).unwrap();
    let c = b.continuous("c", spec()).unwrap();
    let sum = b.continuous("sum", spec()).unwrap();
    b.function(
        "add",
        &[a, c],
        &[sum],
        Condition::Always,
        move |i: &Inputs<'_>, o: &mut Outputs| {
            seen.fetch_add(1, Ordering::SeqCst);
            o.set_number(0, i.number(0) + i.number(1));
        },
    )
    .unwrap();
    let mut g = b.build(Configuration::new()).unwrap();
    g.request_outputs(&[sum]);
    (g, a, c, sum, calls)
}

#[test]
fn test_one_dirty_input_runs_once_then_never() {
    let (mut g, a, _, sum, calls) = counted();
    g.calculate_variable(sum).unwrap();
    calls.store(0, Ordering::SeqCst);

    g.set_native_value(a, 5.0).unwrap();
    g.calculate_variable(sum).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(g.variable(sum).native_value(), Some(6.0));

    g.calculate_variable(sum).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_range_zero_to_ten_by_five() {
    let (mut g, a, _, sum, _) = counted();
    let range = g.stepped_range(a, 0.0, 10.0, 5.0).unwrap();
    let table = g.run_table(&[sum], &[range]).unwrap();

    assert_eq!(table.rank(), 1);
    assert_eq!(table.axes[0].labels, vec!["0.00", "5.00", "10.00"]);
    let TableData::Vector(m) = &table.data else {
        panic!("expected a vector table");
    };
    assert_eq!(m.shape(), (3, 1));
    assert_eq!(table.value(0, &[2]), Some(11.0));
    // Ranging leaf is restored
    assert_eq!(g.variable(a).native_value(), Some(1.0));
}

#[test]
fn test_table_rank_follows_range_count() {
    let (mut g, a, c, sum, _) = counted();
    let scalar = g.run_table(&[sum], &[]).unwrap();
    assert_eq!(scalar.rank(), 0);

    let matrix = g
        .run_table(
            &[sum],
            &[RangeSpec::list(a, vec![1.0, 2.0]), RangeSpec::list(c, vec![10.0, 20.0, 30.0])],
        )
        .unwrap();
    assert_eq!(matrix.rank(), 2);
    assert_eq!(matrix.value(0, &[1, 2]), Some(32.0));

    let three = [
        RangeSpec::list(a, vec![1.0]),
        RangeSpec::list(c, vec![1.0]),
        RangeSpec::list(a, vec![2.0]),
    ];
    assert!(matches!(
        g.run_table(&[sum], &three),
        Err(GraphError::Input(InputError::TooManyRangingVariables { count: 3 }))
    ));
}

#[test]
fn test_stores_drive_the_table() {
    let (mut g, a, c, _, _) = counted();
    g.set_leaf_text(a, "1 2 3").unwrap();
    g.set_leaf_text(c, "0, 100").unwrap();
    let table = g.run_from_stores().unwrap();
    assert_eq!(table.rank(), 2);
    assert_eq!(table.value(0, &[2, 1]), Some(103.0));
}

#[test]
fn test_computed_variable_cannot_range() {
    let (mut g, _, _, sum, _) = counted();
    let err = g
        .run_table(&[sum], &[RangeSpec::list(sum, vec![1.0, 2.0])])
        .unwrap_err();
    assert!(matches!(
        err,
        GraphError::Input(InputError::RangingVariableNotLeaf { .. })
    ));
}

/// x and y each computable from the other under different choices
fn swappable() -> GraphBuilder {
    let mut b = GraphBuilder::new(common::units());
    let x = b.continuous("x", spec()).unwrap();
    let y = b.continuous("y", spec()).unwrap();
    b.function(
        "x_from_y",
        &[y],
        &[x],
        Condition::choice("x.source", "y"),
        |i: &Inputs<'_>, o: &mut Outputs| o.set_number(0, i.number(0) * 2.0),
    )
    .unwrap();
    b.function(
        "y_from_x",
        &[x],
        &[y],
        Condition::choice("y.source", "x"),
        |i: &Inputs<'_>, o: &mut Outputs| o.set_number(0, i.number(0) / 2.0),
    )
    .unwrap();
    b
}

#[test]
fn test_cycle_is_rejected_at_configuration() {
    let mut g = swappable()
        .build(Configuration::new().with_choice("x.source", "y"))
        .unwrap();
    let x = g.variable_id("x").unwrap();
    assert!(!g.is_leaf(x));

    let err = g
        .configure(
            Configuration::new()
                .with_choice("x.source", "y")
                .with_choice("y.source", "x"),
        )
        .unwrap_err();
    assert!(matches!(err, GraphError::Config(ConfigError::CycleDetected { .. })));
    // Previous wiring survives
    assert!(!g.is_leaf(x));
    assert_eq!(g.configuration().choice("y.source"), None);
}

#[test]
fn test_two_active_producers_are_ambiguous() {
    let mut b = GraphBuilder::new(common::units());
    let x = b.continuous("x", spec()).unwrap();
    let y = b.continuous("y", spec()).unwrap();
    for name in ["double", "triple"] {
        b.function(name, &[x], &[y], Condition::Always, |i: &Inputs<'_>, o: &mut Outputs| {
            o.set_number(0, i.number(0));
        })
        .unwrap();
    }
    match b.build(Configuration::new()) {
        Err(GraphError::Config(ConfigError::AmbiguousProducer { variable, functions })) => {
            assert_eq!(variable, "y");
            assert_eq!(functions.len(), 2);
        }
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("two active producers were accepted"),
    }
}

#[test]
fn test_switching_producers_recomputes() {
    let mut g = swappable()
        .build(Configuration::new().with_choice("y.source", "x"))
        .unwrap();
    let x = g.variable_id("x").unwrap();
    let y = g.variable_id("y").unwrap();
    g.request_outputs(&[y]);
    g.set_native_value(x, 8.0).unwrap();
    g.calculate_outputs().unwrap();
    assert_eq!(g.variable(y).native_value(), Some(4.0));

    g.configure(Configuration::new().with_choice("x.source", "y"))
        .unwrap();
    g.request_outputs(&[x]);
    g.calculate_outputs().unwrap();
    assert_eq!(g.variable(x).native_value(), Some(8.0));
    assert_eq!(g.required_inputs(), &[y]);
}
