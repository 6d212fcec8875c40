//! Dependency graph over variables and producer functions
//!
//! Variables and functions live in two arenas addressed by [`VarId`] and
//! [`FnId`]. A configuration picks at most one active producer per variable;
//! variables without one are leaves and take their values from user input.
//!
//! Evaluation is lazy. Setting a leaf marks the dirty bit of every function
//! input slot downstream of it, and [`DependencyGraph::calculate_variable`]
//! re-runs only the routines that have a dirty slot.

mod calculate;
mod table;
mod validate;

pub use table::{OutputColumn, RangeAxis, RangeSpec, RangeValues, ResultTable, TableData};
pub use validate::InputError;

use crate::config::{Condition, ConfigError, Configuration, ConflictRule};
use crate::function::{Compute, Function};
use crate::units::{UnitError, UnitsRegistry};
use crate::variable::{ContinuousSpec, LeafValues, Variable, VariableError, VariableKind};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Index of a variable in its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(pub(crate) u32);

/// Index of a function in its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FnId(pub(crate) u32);

impl VarId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl FnId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Errors raised while building, configuring or evaluating a graph
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("'{0}' is already defined")]
    DuplicateName(String),

    #[error("function '{function}': {reason}")]
    InvalidDefinition { function: String, reason: String },

    #[error("'{0}' is produced by an active function and cannot be set directly")]
    NotALeaf(String),

    #[error(transparent)]
    Variable(#[from] VariableError),

    #[error(transparent)]
    Units(#[from] UnitError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Collects variables and functions before the graph is configured
pub struct GraphBuilder {
    units: Arc<UnitsRegistry>,
    variables: Vec<Variable>,
    functions: Vec<Function>,
    variable_names: FxHashMap<String, VarId>,
    function_names: FxHashMap<String, FnId>,
    rules: Vec<ConflictRule>,
}

impl GraphBuilder {
    pub fn new(units: Arc<UnitsRegistry>) -> Self {
        Self {
            units,
            variables: Vec::new(),
            functions: Vec::new(),
            variable_names: FxHashMap::default(),
            function_names: FxHashMap::default(),
            rules: Vec::new(),
        }
    }

    pub fn units(&self) -> &UnitsRegistry {
        &self.units
    }

    fn push_variable(&mut self, variable: Variable) -> Result<VarId, GraphError> {
        if self.variable_names.contains_key(variable.name()) {
            return Err(GraphError::DuplicateName(variable.name().to_string()));
        }
        let id = VarId(self.variables.len() as u32);
        self.variable_names.insert(variable.name().to_string(), id);
        self.variables.push(variable);
        Ok(id)
    }

    pub fn continuous(&mut self, name: &str, spec: ContinuousSpec) -> Result<VarId, GraphError> {
        let variable = Variable::continuous(name, spec, &self.units)?;
        self.push_variable(variable)
    }

    pub fn discrete(
        &mut self,
        name: &str,
        items: &[&str],
        default: usize,
    ) -> Result<VarId, GraphError> {
        let variable = Variable::discrete(name, items, default)?;
        self.push_variable(variable)
    }

    pub fn text(&mut self, name: &str, default: &str) -> Result<VarId, GraphError> {
        self.push_variable(Variable::text(name, default))
    }

    /// Add a candidate producer.
    ///
    /// Inputs and outputs must be existing continuous or discrete variables,
    /// and no variable may be both an input and an output of one function.
    pub fn function<C: Compute + 'static>(
        &mut self,
        name: &str,
        inputs: &[VarId],
        outputs: &[VarId],
        activation: Condition,
        routine: C,
    ) -> Result<FnId, GraphError> {
        let invalid = |reason: String| GraphError::InvalidDefinition {
            function: name.to_string(),
            reason,
        };
        if self.function_names.contains_key(name) {
            return Err(GraphError::DuplicateName(name.to_string()));
        }
        if outputs.is_empty() {
            return Err(invalid("declares no outputs".to_string()));
        }
        for id in inputs.iter().chain(outputs) {
            let variable = self
                .variables
                .get(id.index())
                .ok_or_else(|| invalid(format!("no variable with index {}", id.index())))?;
            if matches!(variable.kind(), VariableKind::Text(_)) {
                return Err(invalid(format!("text variable '{}' cannot be wired", variable.name())));
            }
        }
        if let Some(id) = outputs.iter().find(|o| inputs.contains(*o)) {
            return Err(invalid(format!(
                "'{}' is both an input and an output",
                self.variables[id.index()].name()
            )));
        }

        let id = FnId(self.functions.len() as u32);
        self.function_names.insert(name.to_string(), id);
        self.functions.push(Function::new(
            name,
            inputs.to_vec(),
            outputs.to_vec(),
            activation,
            Box::new(routine),
        ));
        Ok(id)
    }

    /// Cross-validation rule checked on every reconfiguration
    pub fn conflict_rule(&mut self, rule: ConflictRule) {
        self.rules.push(rule);
    }

    pub fn variable_id(&self, name: &str) -> Option<VarId> {
        self.variable_names.get(name).copied()
    }

    /// Finish construction and apply the first configuration
    pub fn build(self, configuration: Configuration) -> Result<DependencyGraph, GraphError> {
        let mut consumers = vec![Vec::new(); self.variables.len()];
        let mut candidates = vec![Vec::new(); self.variables.len()];
        for (index, function) in self.functions.iter().enumerate() {
            let id = FnId(index as u32);
            for (slot, input) in function.inputs().iter().enumerate() {
                consumers[input.index()].push((id, slot));
            }
            for output in function.outputs() {
                candidates[output.index()].push(id);
            }
        }

        info!(
            "Dependency graph built: {} variables, {} functions",
            self.variables.len(),
            self.functions.len()
        );

        let mut graph = DependencyGraph {
            units: self.units,
            active: vec![false; self.functions.len()],
            producers: vec![None; self.variables.len()],
            variables: self.variables,
            functions: self.functions,
            variable_names: self.variable_names,
            function_names: self.function_names,
            consumers,
            candidates,
            requested: Vec::new(),
            required: Vec::new(),
            invocations: 0,
            configuration: Configuration::new(),
            rules: self.rules,
        };
        graph.configure(configuration)?;
        Ok(graph)
    }
}

/// Variables, functions and the active producer wiring of one scenario
pub struct DependencyGraph {
    units: Arc<UnitsRegistry>,
    variables: Vec<Variable>,
    functions: Vec<Function>,
    variable_names: FxHashMap<String, VarId>,
    function_names: FxHashMap<String, FnId>,
    /// Function input slots reading each variable
    consumers: Vec<Vec<(FnId, usize)>>,
    /// Every function declaring each variable as an output
    candidates: Vec<Vec<FnId>>,
    /// Active producer of each variable, `None` for leaves
    producers: Vec<Option<FnId>>,
    active: Vec<bool>,
    requested: Vec<VarId>,
    /// Leaves the requested outputs depend on, in discovery order
    required: Vec<VarId>,
    invocations: u64,
    configuration: Configuration,
    rules: Vec<ConflictRule>,
}

impl DependencyGraph {
    pub fn units(&self) -> &Arc<UnitsRegistry> {
        &self.units
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn conflict_rules(&self) -> &[ConflictRule] {
        &self.rules
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn variable_id(&self, name: &str) -> Result<VarId, GraphError> {
        self.variable_names
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::UnknownVariable(name.to_string()))
    }

    pub fn function_id(&self, name: &str) -> Result<FnId, GraphError> {
        self.function_names
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::UnknownFunction(name.to_string()))
    }

    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id.index()]
    }

    pub fn function(&self, id: FnId) -> &Function {
        &self.functions[id.index()]
    }

    pub fn variables(&self) -> impl Iterator<Item = (VarId, &Variable)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(i, v)| (VarId(i as u32), v))
    }

    /// Active producer of a variable
    pub fn producer(&self, id: VarId) -> Option<FnId> {
        self.producers[id.index()]
    }

    pub fn is_leaf(&self, id: VarId) -> bool {
        self.producers[id.index()].is_none()
    }

    pub fn is_active(&self, id: FnId) -> bool {
        self.active[id.index()]
    }

    /// Leaves the requested outputs currently depend on
    pub fn required_inputs(&self) -> &[VarId] {
        &self.required
    }

    pub fn is_required(&self, id: VarId) -> bool {
        self.required.contains(&id)
    }

    pub fn requested_outputs(&self) -> &[VarId] {
        &self.requested
    }

    /// Routine invocations since the graph was built
    pub fn invocations(&self) -> u64 {
        self.invocations
    }

    /// Apply a configuration.
    ///
    /// Selects active producers, rejects conflicting properties, ambiguous
    /// producers and cycles, applies the unit system and marks every dirty
    /// bit. On error the previous configuration stays in effect.
    pub fn configure(&mut self, configuration: Configuration) -> Result<(), GraphError> {
        if let Some(conflict) = configuration.cross_validate(&self.rules).into_iter().next() {
            return Err(ConfigError::ConfigurationConflict(conflict).into());
        }

        let active: Vec<bool> = self
            .functions
            .iter()
            .map(|f| f.activation().holds(&configuration))
            .collect();

        let mut producers = vec![None; self.variables.len()];
        for (variable, candidates) in self.candidates.iter().enumerate() {
            let live: Vec<FnId> = candidates
                .iter()
                .copied()
                .filter(|f| active[f.index()])
                .collect();
            match live.as_slice() {
                [] => {}
                [one] => producers[variable] = Some(*one),
                many => {
                    return Err(ConfigError::AmbiguousProducer {
                        variable: self.variables[variable].name().to_string(),
                        functions: many
                            .iter()
                            .map(|f| self.functions[f.index()].name().to_string())
                            .collect(),
                    }
                    .into());
                }
            }
        }

        if let Some(cycle) = self.find_cycle(&producers) {
            return Err(ConfigError::CycleDetected {
                variables: cycle
                    .iter()
                    .map(|v| self.variables[v.index()].name().to_string())
                    .collect(),
            }
            .into());
        }

        let system = configuration.unit_system();
        if system != self.configuration.unit_system() {
            for variable in &mut self.variables {
                variable.apply_unit_system(system, &self.units)?;
            }
        }

        self.active = active;
        self.producers = producers;
        self.configuration = configuration;
        for function in &mut self.functions {
            function.mark_all_dirty();
        }
        self.required = self.collect_required();

        info!(
            "Graph configured: {} active functions, {} required inputs",
            self.active.iter().filter(|&&a| a).count(),
            self.required.len()
        );
        Ok(())
    }

    /// Depth-first search over `variable -> producer inputs` edges.
    ///
    /// Returns the variables on the first cycle found.
    fn find_cycle(&self, producers: &[Option<FnId>]) -> Option<Vec<VarId>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            OnPath,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.variables.len()];
        for start in 0..self.variables.len() {
            if marks[start] != Mark::Unvisited {
                continue;
            }
            // Each frame is a variable and the next producer input to visit
            let mut path: Vec<(VarId, usize)> = vec![(VarId(start as u32), 0)];
            marks[start] = Mark::OnPath;

            while let Some(top) = path.last_mut() {
                let (variable, next) = *top;
                let inputs = producers[variable.index()]
                    .map_or(&[][..], |f| self.functions[f.index()].inputs());
                if next == inputs.len() {
                    marks[variable.index()] = Mark::Done;
                    path.pop();
                    continue;
                }
                top.1 += 1;
                let input = inputs[next];
                match marks[input.index()] {
                    Mark::Unvisited => {
                        marks[input.index()] = Mark::OnPath;
                        path.push((input, 0));
                    }
                    Mark::OnPath => {
                        let from = path.iter().position(|&(v, _)| v == input).unwrap_or(0);
                        return Some(path[from..].iter().map(|&(v, _)| v).collect());
                    }
                    Mark::Done => {}
                }
            }
        }
        None
    }

    /// Leaves reachable from the requested outputs through active producers
    fn collect_required(&self) -> Vec<VarId> {
        let mut seen = vec![false; self.variables.len()];
        let mut required = Vec::new();
        let mut stack: Vec<VarId> = self.requested.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut seen[id.index()], true) {
                continue;
            }
            match self.producers[id.index()] {
                None => required.push(id),
                Some(f) => stack.extend(self.functions[f.index()].inputs().iter().rev()),
            }
        }
        required
    }

    /// Designate the root variables and recompute which leaves are required
    pub fn request_outputs(&mut self, outputs: &[VarId]) {
        self.requested = outputs.to_vec();
        self.required = self.collect_required();
        debug!(
            "Requested {} outputs, {} required inputs",
            self.requested.len(),
            self.required.len()
        );
    }

    /// [`DependencyGraph::request_outputs`] by variable name
    pub fn request_outputs_by_name<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), GraphError> {
        let ids = names
            .iter()
            .map(|n| self.variable_id(n.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        self.request_outputs(&ids);
        Ok(())
    }

    fn leaf_mut(&mut self, id: VarId) -> Result<&mut Variable, GraphError> {
        if self.producers[id.index()].is_some() {
            return Err(GraphError::NotALeaf(self.variables[id.index()].name().to_string()));
        }
        Ok(&mut self.variables[id.index()])
    }

    /// Set a leaf's native value and invalidate everything downstream
    pub fn set_native_value(&mut self, id: VarId, value: f64) -> Result<(), GraphError> {
        let variable = self.leaf_mut(id)?;
        variable.set_native_value(value)?;
        let text = variable.format_store();
        variable.set_store(&text, true);
        self.invalidate(id);
        Ok(())
    }

    /// Set a leaf in its current display units
    pub fn set_display_value(&mut self, id: VarId, value: f64) -> Result<(), GraphError> {
        let variable = self.leaf_mut(id)?;
        variable.set_display_value(value)?;
        let text = variable.format_store();
        variable.set_store(&text, true);
        self.invalidate(id);
        Ok(())
    }

    pub fn set_item(&mut self, id: VarId, item: &str) -> Result<(), GraphError> {
        let variable = self.leaf_mut(id)?;
        variable.set_item(item)?;
        let text = variable.format_store();
        variable.set_store(&text, true);
        self.invalidate(id);
        Ok(())
    }

    pub fn set_item_index(&mut self, id: VarId, index: usize) -> Result<(), GraphError> {
        let variable = self.leaf_mut(id)?;
        variable.set_item_index(index)?;
        let text = variable.format_store();
        variable.set_store(&text, true);
        self.invalidate(id);
        Ok(())
    }

    /// Parse raw text into a leaf.
    ///
    /// The text is always kept as the leaf's store. A valid store sets the
    /// leaf to its first value; more than one value makes the leaf ranging.
    /// Rejected text flags the leaf invalid and leaves its value unchanged.
    pub fn set_leaf_text(&mut self, id: VarId, text: &str) -> Result<(), GraphError> {
        let variable = self.leaf_mut(id)?;
        let parsed = match variable.parse_store(text) {
            Ok(parsed) => parsed,
            Err(e) => {
                variable.set_store(text, false);
                warn!("Rejected input for {}: {}", variable.name(), e.reason);
                return Err(InputError::InvalidLeafValue {
                    variable: id,
                    name: variable.name().to_string(),
                    position: e.position,
                    length: e.length,
                    reason: e.reason,
                }
                .into());
            }
        };

        match parsed {
            LeafValues::Numbers(values) => {
                if let Some(&first) = values.first() {
                    variable.set_display_value(first)?;
                }
            }
            LeafValues::Items(items) => {
                if let Some(&first) = items.first() {
                    variable.set_item_index(first)?;
                }
            }
            LeafValues::Text(t) => variable.set_text(&t)?,
        }
        variable.set_store(text, true);
        self.invalidate(id);
        Ok(())
    }

    /// Change one variable's display units; native values and dirty bits are untouched
    pub fn set_display_units(
        &mut self,
        id: VarId,
        units: &str,
        decimals: Option<u8>,
    ) -> Result<(), GraphError> {
        let registry = Arc::clone(&self.units);
        self.variables[id.index()].set_display_units(units, decimals, &registry)?;
        Ok(())
    }

    /// Mark every input slot downstream of a variable dirty.
    ///
    /// Propagates through active producers so a later request for any
    /// dependent recomputes the whole changed chain.
    pub fn invalidate(&mut self, id: VarId) {
        let mut visited = vec![false; self.functions.len()];
        let mut stack = vec![id];
        while let Some(variable) = stack.pop() {
            for &(function, slot) in &self.consumers[variable.index()] {
                self.functions[function.index()].mark_dirty(slot);
                if self.active[function.index()]
                    && !std::mem::replace(&mut visited[function.index()], true)
                {
                    stack.extend(self.functions[function.index()].outputs());
                }
            }
        }
    }

    /// Mark every dirty bit, forcing a full recalculation
    pub fn invalidate_all(&mut self) {
        for function in &mut self.functions {
            function.mark_all_dirty();
        }
    }
}
