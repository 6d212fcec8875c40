//! Range tables
//!
//! Up to two leaves are swept across value lists while the requested outputs
//! are recomputed for every combination. Continuous range values are in the
//! variable's display units, discrete ones are item indices.

use super::{DependencyGraph, GraphError, InputError, VarId};
use crate::variable::{stepped_values, LeafValues, Variable, VariableKind};
use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use tracing::{debug, info};

/// Values a ranging variable takes, in enumeration order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RangeValues {
    /// Display-unit values of a continuous leaf
    Numbers(Vec<f64>),
    /// Item indices of a discrete leaf
    Items(Vec<usize>),
}

impl RangeValues {
    pub fn len(&self) -> usize {
        match self {
            RangeValues::Numbers(v) => v.len(),
            RangeValues::Items(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One ranging leaf and its values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSpec {
    pub variable: VarId,
    pub values: RangeValues,
}

impl RangeSpec {
    /// Explicit display-unit values, kept in the given order
    pub fn list(variable: VarId, values: Vec<f64>) -> Self {
        Self {
            variable,
            values: RangeValues::Numbers(values),
        }
    }

    /// Discrete item indices, kept in the given order
    pub fn items(variable: VarId, items: Vec<usize>) -> Self {
        Self {
            variable,
            values: RangeValues::Items(items),
        }
    }
}

/// Description of one output column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputColumn {
    pub variable: VarId,
    pub name: String,
    /// Display units of a continuous output
    pub units: Option<String>,
    pub decimals: u8,
    /// Item labels of a discrete output; its values are item indices
    pub items: Option<Vec<String>>,
}

/// Description of one ranging axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeAxis {
    pub variable: VarId,
    pub name: String,
    pub units: Option<String>,
    /// Value labels in enumeration order
    pub labels: Vec<String>,
}

/// Table body, shaped by the number of ranging variables
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TableData {
    /// One value per output
    Scalar(DVector<f64>),
    /// Rows follow the ranging values, columns the outputs
    Vector(DMatrix<f64>),
    /// One matrix per output, rows follow the first range and columns the second
    Matrix(Vec<DMatrix<f64>>),
}

/// Values of the requested outputs in display units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    pub outputs: Vec<OutputColumn>,
    pub axes: Vec<RangeAxis>,
    pub data: TableData,
}

impl ResultTable {
    /// Number of ranging variables
    pub fn rank(&self) -> usize {
        self.axes.len()
    }

    /// Value of one output at a range position (`&[]`, `&[row]` or `&[row, column]`)
    pub fn value(&self, output: usize, at: &[usize]) -> Option<f64> {
        match (&self.data, at) {
            (TableData::Scalar(v), []) => v.get(output).copied(),
            (TableData::Vector(m), [row]) => m.get((*row, output)).copied(),
            (TableData::Matrix(ms), [row, column]) => {
                ms.get(output).and_then(|m| m.get((*row, *column))).copied()
            }
            _ => None,
        }
    }

    /// Render a value of one output with its decimals or item label
    pub fn format(&self, output: usize, value: f64) -> String {
        let column = &self.outputs[output];
        match &column.items {
            Some(items) => items
                .get(value.max(0.0) as usize)
                .cloned()
                .unwrap_or_else(|| value.to_string()),
            None => format!("{:.*}", usize::from(column.decimals), value),
        }
    }
}

/// Current value of an output in display units, or its item index
fn output_value(variable: &Variable) -> f64 {
    match variable.kind() {
        VariableKind::Continuous(c) => c.conversion().apply(c.native_value()),
        VariableKind::Discrete(d) => d.active_index() as f64,
        VariableKind::Text(_) => f64::NAN,
    }
}

fn output_column(id: VarId, variable: &Variable) -> OutputColumn {
    match variable.kind() {
        VariableKind::Continuous(c) => OutputColumn {
            variable: id,
            name: variable.name().to_string(),
            units: Some(c.display_units().to_string()),
            decimals: c.display_decimals(),
            items: None,
        },
        VariableKind::Discrete(d) => OutputColumn {
            variable: id,
            name: variable.name().to_string(),
            units: None,
            decimals: 0,
            items: Some(d.items().to_vec()),
        },
        VariableKind::Text(_) => OutputColumn {
            variable: id,
            name: variable.name().to_string(),
            units: None,
            decimals: 0,
            items: None,
        },
    }
}

impl DependencyGraph {
    /// Evaluate the outputs once per combination of ranging values.
    ///
    /// Ranging leaves are restored to their previous values afterwards,
    /// whether or not the sweep succeeded.
    pub fn run_table(
        &mut self,
        outputs: &[VarId],
        ranges: &[RangeSpec],
    ) -> Result<ResultTable, GraphError> {
        if ranges.len() > 2 {
            return Err(InputError::TooManyRangingVariables {
                count: ranges.len(),
            }
            .into());
        }
        let mut axes = Vec::with_capacity(ranges.len());
        for (i, range) in ranges.iter().enumerate() {
            if ranges[..i].iter().any(|r| r.variable == range.variable) {
                return Err(InputError::InvalidRange {
                    variable: range.variable,
                    name: self.variables[range.variable.index()].name().to_string(),
                    reason: "ranged more than once".to_string(),
                }
                .into());
            }
            axes.push(self.check_range(range)?);
        }

        let saved: Vec<(VarId, Variable)> = ranges
            .iter()
            .map(|r| (r.variable, self.variables[r.variable.index()].clone()))
            .collect();
        let result = self.sweep(outputs, ranges);
        for (id, variable) in saved {
            self.variables[id.index()] = variable;
            self.invalidate(id);
        }
        let data = result?;

        let table = ResultTable {
            outputs: outputs
                .iter()
                .map(|&id| output_column(id, &self.variables[id.index()]))
                .collect(),
            axes,
            data,
        };
        info!(
            "Table run: {} outputs, {} ranging variables",
            table.outputs.len(),
            table.rank()
        );
        Ok(table)
    }

    /// Ascending display values `from, from + step, ...` up to and including `thru`
    pub fn stepped_range(
        &self,
        variable: VarId,
        from: f64,
        thru: f64,
        step: f64,
    ) -> Result<RangeSpec, InputError> {
        let values = stepped_values(from, thru, step).map_err(|reason| InputError::InvalidRange {
            variable,
            name: self.variables[variable.index()].name().to_string(),
            reason,
        })?;
        Ok(RangeSpec::list(variable, values))
    }

    /// Reject a range over a produced variable, a mismatched kind or an empty list
    fn check_range(&self, range: &RangeSpec) -> Result<RangeAxis, InputError> {
        let id = range.variable;
        let variable = &self.variables[id.index()];
        let name = variable.name().to_string();
        if !self.is_leaf(id) {
            return Err(InputError::RangingVariableNotLeaf { variable: id, name });
        }
        let invalid = |reason: &str| InputError::InvalidRange {
            variable: id,
            name: name.clone(),
            reason: reason.to_string(),
        };
        if range.values.is_empty() {
            return Err(invalid("no values to range over"));
        }

        let (units, labels) = match (variable.kind(), &range.values) {
            (VariableKind::Continuous(c), RangeValues::Numbers(values)) => {
                let decimals = usize::from(c.display_decimals());
                (
                    Some(c.display_units().to_string()),
                    values.iter().map(|v| format!("{v:.decimals$}")).collect(),
                )
            }
            (VariableKind::Discrete(d), RangeValues::Items(items)) => {
                let labels = items
                    .iter()
                    .map(|&i| d.items().get(i).cloned())
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| invalid("item index out of range"))?;
                (None, labels)
            }
            _ => return Err(invalid("range values do not match the variable kind")),
        };

        Ok(RangeAxis {
            variable: id,
            name: name.clone(),
            units,
            labels,
        })
    }

    fn set_range_value(&mut self, range: &RangeSpec, index: usize) -> Result<(), GraphError> {
        match &range.values {
            RangeValues::Numbers(values) => self.set_display_value(range.variable, values[index]),
            RangeValues::Items(items) => self.set_item_index(range.variable, items[index]),
        }
    }

    fn evaluate_into(&mut self, outputs: &[VarId], row: &mut [f64]) -> Result<(), GraphError> {
        for (slot, &id) in outputs.iter().enumerate() {
            self.calculate_variable(id)?;
            row[slot] = output_value(&self.variables[id.index()]);
        }
        Ok(())
    }

    fn sweep(&mut self, outputs: &[VarId], ranges: &[RangeSpec]) -> Result<TableData, GraphError> {
        let mut row = vec![0.0; outputs.len()];
        match ranges {
            [] => {
                self.evaluate_into(outputs, &mut row)?;
                Ok(TableData::Scalar(DVector::from_vec(row)))
            }
            [first] => {
                let mut table = DMatrix::zeros(first.values.len(), outputs.len());
                for i in 0..first.values.len() {
                    self.set_range_value(first, i)?;
                    self.evaluate_into(outputs, &mut row)?;
                    debug!("Table row {}: {:?}", i, row);
                    for (j, &value) in row.iter().enumerate() {
                        table[(i, j)] = value;
                    }
                }
                Ok(TableData::Vector(table))
            }
            [first, second] => {
                let (rows, columns) = (first.values.len(), second.values.len());
                let mut tables = vec![DMatrix::zeros(rows, columns); outputs.len()];
                for i in 0..rows {
                    self.set_range_value(first, i)?;
                    for j in 0..columns {
                        self.set_range_value(second, j)?;
                        self.evaluate_into(outputs, &mut row)?;
                        debug!("Table cell ({}, {}): {:?}", i, j, row);
                        for (table, &value) in tables.iter_mut().zip(&row) {
                            table[(i, j)] = value;
                        }
                    }
                }
                Ok(TableData::Matrix(tables))
            }
            _ => Err(InputError::TooManyRangingVariables {
                count: ranges.len(),
            }
            .into()),
        }
    }

    /// Ranges implied by multi-valued stores of the required leaves
    pub fn range_specs_from_stores(&self) -> Result<Vec<RangeSpec>, InputError> {
        let mut specs = Vec::new();
        for &id in &self.required {
            let variable = &self.variables[id.index()];
            let parsed = variable.parse_store(variable.store()).map_err(|e| {
                InputError::InvalidLeafValue {
                    variable: id,
                    name: variable.name().to_string(),
                    position: e.position,
                    length: e.length,
                    reason: e.reason,
                }
            })?;
            if parsed.len() < 2 {
                continue;
            }
            match parsed {
                LeafValues::Numbers(values) => specs.push(RangeSpec::list(id, values)),
                LeafValues::Items(items) => specs.push(RangeSpec::items(id, items)),
                LeafValues::Text(_) => {}
            }
        }
        if specs.len() > 2 {
            return Err(InputError::TooManyRangingVariables { count: specs.len() });
        }
        Ok(specs)
    }

    /// Validate, then run the table implied by the current stores
    pub fn run_from_stores(&mut self) -> Result<ResultTable, GraphError> {
        self.validate_inputs()?;
        let ranges = self.range_specs_from_stores()?;
        let outputs = self.requested.clone();
        self.run_table(&outputs, &ranges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Condition, Configuration};
    use crate::function::{Inputs, Outputs};
    use crate::graph::GraphBuilder;
    use crate::units::UnitsRegistry;
    use crate::variable::ContinuousSpec;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    struct Fixture {
        graph: DependencyGraph,
        a: VarId,
        b: VarId,
        c: VarId,
        kind: VarId,
        sum: VarId,
        label: VarId,
    }

    fn fixture() -> Fixture {
        let mut builder = GraphBuilder::new(Arc::new(UnitsRegistry::standard()));
        let spec = || ContinuousSpec::new("ft", 0.0, 100.0, 1.0).english("ft", 1);
        let a = builder.continuous("a", spec()).unwrap();
        let b = builder.continuous("b", spec()).unwrap();
        let c = builder.continuous("c", spec()).unwrap();
        let kind = builder.discrete("kind", &["low", "high"], 0).unwrap();
        let sum = builder
            .continuous("sum", ContinuousSpec::new("ft", 0.0, 1.0e4, 0.0).english("ft", 1))
            .unwrap();
        let label = builder.discrete("label", &["small", "large"], 0).unwrap();
        builder
            .function(
                "total",
                &[a, b, c, kind],
                &[sum, label],
                Condition::Always,
                |i: &Inputs<'_>, o: &mut Outputs| {
                    let scale = if i.item(3) == 1 { 10.0 } else { 1.0 };
                    let total = scale * (i.number(0) + i.number(1) + i.number(2));
                    o.set_number(0, total);
                    o.set_item(1, usize::from(total > 20.0));
                },
            )
            .unwrap();
        let mut graph = builder.build(Configuration::new()).unwrap();
        graph.request_outputs(&[sum, label]);
        Fixture {
            graph,
            a,
            b,
            c,
            kind,
            sum,
            label,
        }
    }

    #[test]
    fn test_scalar_table() {
        let mut f = fixture();
        let table = f.graph.run_table(&[f.sum, f.label], &[]).unwrap();
        assert_eq!(table.rank(), 0);
        assert_relative_eq!(table.value(0, &[]).unwrap(), 3.0);
        assert_eq!(table.format(1, table.value(1, &[]).unwrap()), "small");
    }

    #[test]
    fn test_vector_rows_follow_range_order() {
        let mut f = fixture();
        let range = f.graph.stepped_range(f.a, 0.0, 10.0, 5.0).unwrap();
        let table = f.graph.run_table(&[f.sum], &[range]).unwrap();
        assert_eq!(table.rank(), 1);
        match &table.data {
            TableData::Vector(m) => assert_eq!(m.shape(), (3, 1)),
            other => panic!("expected a vector, got {other:?}"),
        }
        assert_eq!(table.axes[0].labels, vec!["0.0", "5.0", "10.0"]);
        assert_relative_eq!(table.value(0, &[0]).unwrap(), 2.0);
        assert_relative_eq!(table.value(0, &[1]).unwrap(), 7.0);
        assert_relative_eq!(table.value(0, &[2]).unwrap(), 12.0);
    }

    #[test]
    fn test_matrix_over_two_ranges() {
        let mut f = fixture();
        let ranges = [
            RangeSpec::list(f.a, vec![1.0, 2.0]),
            RangeSpec::items(f.kind, vec![1, 0]),
        ];
        let table = f.graph.run_table(&[f.sum, f.label], &ranges).unwrap();
        assert_eq!(table.rank(), 2);
        match &table.data {
            TableData::Matrix(ms) => {
                assert_eq!(ms.len(), 2);
                assert_eq!(ms[0].shape(), (2, 2));
            }
            other => panic!("expected matrices, got {other:?}"),
        }
        // kind = high scales by ten
        assert_relative_eq!(table.value(0, &[0, 0]).unwrap(), 30.0);
        assert_relative_eq!(table.value(0, &[0, 1]).unwrap(), 3.0);
        assert_relative_eq!(table.value(0, &[1, 0]).unwrap(), 40.0);
        assert_eq!(table.format(1, table.value(1, &[1, 0]).unwrap()), "large");
        assert_eq!(table.axes[1].labels, vec!["high", "low"]);
    }

    #[test]
    fn test_three_ranges_are_rejected() {
        let mut f = fixture();
        let ranges = [
            RangeSpec::list(f.a, vec![1.0]),
            RangeSpec::list(f.b, vec![1.0]),
            RangeSpec::list(f.c, vec![1.0]),
        ];
        let err = f.graph.run_table(&[f.sum], &ranges).unwrap_err();
        assert!(matches!(
            err,
            GraphError::Input(InputError::TooManyRangingVariables { count: 3 })
        ));
    }

    #[test]
    fn test_ranging_leaves_are_restored() {
        let mut f = fixture();
        f.graph.set_native_value(f.a, 4.0).unwrap();
        let range = RangeSpec::list(f.a, vec![10.0, 20.0]);
        f.graph.run_table(&[f.sum], &[range]).unwrap();
        assert_eq!(f.graph.variable(f.a).native_value(), Some(4.0));

        f.graph.calculate_variable(f.sum).unwrap();
        assert_eq!(f.graph.variable(f.sum).native_value(), Some(6.0));
    }

    #[test]
    fn test_range_over_output_is_rejected() {
        let mut f = fixture();
        let range = RangeSpec::list(f.sum, vec![1.0, 2.0]);
        let err = f.graph.run_table(&[f.sum], &[range]).unwrap_err();
        assert!(matches!(
            err,
            GraphError::Input(InputError::RangingVariableNotLeaf { .. })
        ));
    }

    #[test]
    fn test_out_of_bounds_range_value_fails_and_restores() {
        let mut f = fixture();
        let range = RangeSpec::list(f.a, vec![5.0, 500.0]);
        assert!(f.graph.run_table(&[f.sum], &[range]).is_err());
        assert_eq!(f.graph.variable(f.a).native_value(), Some(1.0));
        assert!(f.graph.variable(f.a).is_valid());
    }

    #[test]
    fn test_ranges_from_stores() {
        let mut f = fixture();
        f.graph.set_leaf_text(f.b, "1 2 3").unwrap();
        f.graph.set_leaf_text(f.kind, "low high").unwrap();
        let specs = f.graph.range_specs_from_stores().unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].variable, f.b);
        assert_eq!(specs[1].values, RangeValues::Items(vec![0, 1]));

        let table = f.graph.run_from_stores().unwrap();
        assert_eq!(table.rank(), 2);
        assert_relative_eq!(table.value(0, &[2, 1]).unwrap(), 50.0);

        f.graph.set_leaf_text(f.c, "4 5").unwrap();
        assert!(matches!(
            f.graph.range_specs_from_stores(),
            Err(InputError::TooManyRangingVariables { count: 3 })
        ));
    }

    #[test]
    fn test_same_leaf_cannot_range_twice() {
        let mut f = fixture();
        let ranges = [
            RangeSpec::list(f.a, vec![1.0, 2.0]),
            RangeSpec::list(f.a, vec![10.0, 20.0]),
        ];
        match f.graph.run_table(&[f.sum], &ranges) {
            Err(GraphError::Input(InputError::InvalidRange { variable, name, .. })) => {
                assert_eq!(variable, f.a);
                assert_eq!(name, "a");
            }
            other => panic!("expected an invalid range, got {other:?}"),
        }
        assert_eq!(f.graph.variable(f.a).native_value(), Some(1.0));
    }

    #[test]
    fn test_bad_step_names_the_leaf() {
        let f = fixture();
        let err = f.graph.stepped_range(f.b, 0.0, 10.0, 0.0).unwrap_err();
        assert_eq!(err.variable(), Some(f.b));
        assert_eq!(err.to_string(), "b: step 0 must be positive");
    }
}
