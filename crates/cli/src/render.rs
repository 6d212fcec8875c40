//! Plain-text rendering of result tables

use fire_behavior_core::{OutputColumn, RangeAxis, ResultTable, TableData};
use std::fmt::Write;

fn heading(name: &str, units: Option<&str>) -> String {
    match units {
        Some(u) if !u.is_empty() => format!("{name} ({u})"),
        _ => name.to_string(),
    }
}

fn column_heading(column: &OutputColumn) -> String {
    heading(&column.name, column.units.as_deref())
}

fn axis_heading(axis: &RangeAxis) -> String {
    heading(&axis.name, axis.units.as_deref())
}

/// Pad every cell of a row to its column width
fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:>width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{}", line.trim_end());
}

fn grid(out: &mut String, rows: &[Vec<String>]) {
    let columns = rows.first().map_or(0, Vec::len);
    let widths: Vec<usize> = (0..columns)
        .map(|c| rows.iter().map(|r| r[c].chars().count()).max().unwrap_or(0))
        .collect();
    for row in rows {
        push_row(out, row, &widths);
    }
}

/// Render a table the way it is shaped: a list, a row per value, or a grid per output
pub fn render(table: &ResultTable) -> String {
    let mut out = String::new();
    match &table.data {
        TableData::Scalar(values) => {
            let rows: Vec<Vec<String>> = table
                .outputs
                .iter()
                .enumerate()
                .map(|(i, column)| vec![column_heading(column), table.format(i, values[i])])
                .collect();
            grid(&mut out, &rows);
        }
        TableData::Vector(matrix) => {
            let axis = &table.axes[0];
            let mut rows = vec![std::iter::once(axis_heading(axis))
                .chain(table.outputs.iter().map(column_heading))
                .collect::<Vec<_>>()];
            for (r, label) in axis.labels.iter().enumerate() {
                let mut row = vec![label.clone()];
                row.extend((0..table.outputs.len()).map(|c| table.format(c, matrix[(r, c)])));
                rows.push(row);
            }
            grid(&mut out, &rows);
        }
        TableData::Matrix(matrices) => {
            let (first, second) = (&table.axes[0], &table.axes[1]);
            for (o, matrix) in matrices.iter().enumerate() {
                let _ = writeln!(out, "{}", column_heading(&table.outputs[o]));
                let mut rows = vec![std::iter::once(format!(
                    "{} \\ {}",
                    axis_heading(first),
                    axis_heading(second)
                ))
                .chain(second.labels.iter().cloned())
                .collect::<Vec<_>>()];
                for (r, label) in first.labels.iter().enumerate() {
                    let mut row = vec![label.clone()];
                    row.extend((0..second.labels.len()).map(|c| table.format(o, matrix[(r, c)])));
                    rows.push(row);
                }
                grid(&mut out, &rows);
                out.push('\n');
            }
        }
    }
    out
}
