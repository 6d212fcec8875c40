//! Scenario persistence
//!
//! A graph is saved as the raw text of its leaf stores plus the
//! configuration and requested outputs. Loading replays the stores through
//! the same parser used for interactive input.

use crate::config::Configuration;
use crate::graph::{DependencyGraph, GraphError, InputError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Raw text entered for one variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreEntry {
    pub name: String,
    pub store: String,
}

impl StoreEntry {
    pub fn new(name: &str, store: &str) -> Self {
        Self {
            name: name.to_string(),
            store: store.to_string(),
        }
    }
}

/// Errors that can occur loading or saving a scenario
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize scenario: {0}")]
    SerializeFailed(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DependencyGraph {
    /// Store text of every leaf, in declaration order
    pub fn dump_stores(&self) -> Vec<StoreEntry> {
        self.variables()
            .filter(|&(id, _)| self.is_leaf(id))
            .map(|(_, v)| StoreEntry::new(v.name(), v.store()))
            .collect()
    }

    /// Replay stores into the graph, then recalculate the requested outputs.
    ///
    /// Entries for computed variables are skipped. Every entry is applied
    /// even after a rejected one; the first rejection is returned and the
    /// recalculation is skipped.
    pub fn rehydrate(&mut self, entries: &[StoreEntry]) -> Result<(), GraphError> {
        let mut first_error: Option<InputError> = None;
        for entry in entries {
            let id = self.variable_id(&entry.name)?;
            if !self.is_leaf(id) {
                continue;
            }
            match self.set_leaf_text(id, &entry.store) {
                Ok(()) => {}
                Err(GraphError::Input(e)) => {
                    first_error.get_or_insert(e);
                }
                Err(e) => return Err(e),
            }
        }
        if let Some(e) = first_error {
            return Err(e.into());
        }
        self.invalidate_all();
        self.calculate_outputs()
    }
}

/// A saved calculation: configuration, requested outputs and leaf stores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFile {
    pub name: String,
    #[serde(default)]
    pub configuration: Configuration,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub inputs: Vec<StoreEntry>,
}

impl ScenarioFile {
    /// Snapshot a configured graph
    pub fn capture(name: &str, graph: &DependencyGraph) -> Self {
        Self {
            name: name.to_string(),
            configuration: graph.configuration().clone(),
            outputs: graph
                .requested_outputs()
                .iter()
                .map(|&id| graph.variable(id).name().to_string())
                .collect(),
            inputs: graph.dump_stores(),
        }
    }

    /// Configure a graph, request the outputs and replay the stores
    pub fn apply(&self, graph: &mut DependencyGraph) -> Result<(), GraphError> {
        graph.configure(self.configuration.clone())?;
        graph.request_outputs_by_name(&self.outputs[..])?;
        graph.rehydrate(&self.inputs)
    }

    /// Load a scenario from a JSON file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| StoreError::LoadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let scenario: Self =
            serde_json::from_str(&contents).map_err(|source| StoreError::ParseFailed {
                path: path.to_path_buf(),
                source,
            })?;
        info!(
            "Loaded scenario '{}' from {} ({} inputs)",
            scenario.name,
            path.display(),
            scenario.inputs.len()
        );
        Ok(scenario)
    }

    /// Save the scenario as pretty-printed JSON
    ///
    /// # Errors
    /// Returns error if the scenario cannot be serialized or written
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let path = path.as_ref();
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents).map_err(|source| StoreError::SaveFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Condition, UnitSystem};
    use crate::function::{Inputs, Outputs};
    use crate::graph::{GraphBuilder, RangeValues, VarId};
    use crate::units::UnitsRegistry;
    use crate::variable::ContinuousSpec;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn graph() -> (DependencyGraph, VarId, VarId) {
        let mut b = GraphBuilder::new(Arc::new(UnitsRegistry::standard()));
        let depth = b
            .continuous(
                "depth",
                ContinuousSpec::new("ft", 0.0, 10.0, 1.0)
                    .english("ft", 2)
                    .metric("m", 2),
            )
            .unwrap();
        let half = b
            .continuous("half", ContinuousSpec::new("ft", 0.0, 10.0, 0.0).english("ft", 2))
            .unwrap();
        b.function("halve", &[depth], &[half], Condition::Always, |i: &Inputs<'_>, o: &mut Outputs| {
            o.set_number(0, i.number(0) / 2.0);
        })
        .unwrap();
        let mut g = b.build(Configuration::new()).unwrap();
        g.request_outputs(&[half]);
        (g, depth, half)
    }

    #[test]
    fn test_dump_lists_only_leaves() {
        let (g, ..) = graph();
        assert_eq!(g.dump_stores(), vec![StoreEntry::new("depth", "1.00")]);
    }

    #[test]
    fn test_rehydrate_recalculates() {
        let (mut g, _, half) = graph();
        g.rehydrate(&[StoreEntry::new("depth", "3"), StoreEntry::new("half", "9")])
            .unwrap();
        assert_eq!(g.variable(half).native_value(), Some(1.5));
    }

    #[test]
    fn test_rehydrate_reports_first_bad_store() {
        let (mut g, depth, _) = graph();
        let err = g.rehydrate(&[StoreEntry::new("depth", "deep")]).unwrap_err();
        assert!(matches!(err, GraphError::Input(InputError::InvalidLeafValue { variable, .. }) if variable == depth));
        assert_eq!(g.variable(depth).store(), "deep");
    }

    #[test]
    fn test_unknown_entry_is_an_error() {
        let (mut g, ..) = graph();
        assert!(matches!(
            g.rehydrate(&[StoreEntry::new("width", "1")]),
            Err(GraphError::UnknownVariable(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let (mut g, depth, _) = graph();
        g.set_leaf_text(depth, "2 4").unwrap();
        g.configure(Configuration::new().with_unit_system(UnitSystem::Metric))
            .unwrap();
        let scenario = ScenarioFile::capture("halving", &g);
        assert_eq!(scenario.outputs, vec!["half".to_string()]);

        let path = std::env::temp_dir().join(format!("scenario-{}.json", std::process::id()));
        scenario.save(&path).unwrap();
        let loaded = ScenarioFile::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, scenario);

        let (mut fresh, fresh_depth, _) = graph();
        loaded.apply(&mut fresh).unwrap();
        assert_eq!(fresh.configuration().unit_system(), UnitSystem::Metric);
        let ranges = fresh.range_specs_from_stores().unwrap();
        let RangeValues::Numbers(values) = &ranges[0].values else {
            panic!("expected a numeric range");
        };
        let conversion = fresh.variable(fresh_depth).continuous_state().unwrap().conversion();
        assert_relative_eq!(conversion.invert(values[0]), 2.0, max_relative = 1e-12);
        assert_relative_eq!(conversion.invert(values[1]), 4.0, max_relative = 1e-12);
    }

    #[test]
    fn test_metric_capture_and_apply_keep_values() {
        let (mut g, depth, half) = graph();
        g.configure(Configuration::new().with_unit_system(UnitSystem::Metric))
            .unwrap();
        g.set_native_value(depth, 1.0).unwrap();
        g.calculate_outputs().unwrap();
        assert_eq!(g.variable(half).native_value(), Some(0.5));

        let scenario = ScenarioFile::capture("metric", &g);
        let (mut fresh, fresh_depth, fresh_half) = graph();
        scenario.apply(&mut fresh).unwrap();
        fresh.calculate_outputs().unwrap();
        assert_relative_eq!(
            fresh.variable(fresh_depth).native_value().unwrap(),
            1.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            fresh.variable(fresh_half).native_value().unwrap(),
            0.5,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = ScenarioFile::load("/nonexistent/scenario.json").unwrap_err();
        assert!(matches!(err, StoreError::LoadFailed { .. }));
    }
}
