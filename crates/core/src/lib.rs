//! Fire Behavior Core Library
//!
//! A dependency-graph calculation engine for wildland fire behavior.
//! Variables carry native values, display units and raw input text; producer
//! functions are activated by a configuration and evaluated lazily with dirty
//! bits, so changing one input re-runs only the routines downstream of it.
//!
//! ## Layers
//!
//! - `units`: unit phrase compiler and conversion registry
//! - `variable` and `function`: the graph's nodes
//! - `config`: configuration properties, activation conditions and conflict rules
//! - `graph`: configuration, lazy evaluation, validation and result tables
//! - `store`: scenario persistence
//! - `catalog`: the surface fire models (Rothermel spread, fire size, spotting, scorch)

// Units of measure
pub mod units;

// Graph nodes and configuration
pub mod config;
pub mod function;
pub mod variable;

// Evaluation engine
pub mod graph;
pub mod store;

// Fire behavior models
pub mod catalog;

// Re-export the engine surface
pub use config::{Condition, ConfigError, Configuration, Conflict, ConflictRule, PropertyValue, UnitSystem};
pub use function::{Compute, Inputs, Outputs, Sample};
pub use graph::{
    DependencyGraph, FnId, GraphBuilder, GraphError, InputError, OutputColumn, RangeAxis,
    RangeSpec, RangeValues, ResultTable, TableData, VarId,
};
pub use store::{ScenarioFile, StoreEntry, StoreError};
pub use units::{Conversion, UnitError, UnitsRegistry};
pub use variable::{ContinuousSpec, LeafValues, Variable, VariableError, VariableKind};

// Re-export the catalog entry points
pub use catalog::{default_configuration, default_outputs, standard_graph};
