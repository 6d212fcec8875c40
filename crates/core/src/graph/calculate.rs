//! Lazy evaluation with an explicit work stack

use super::{DependencyGraph, FnId, GraphError, VarId};
use crate::config::ConfigError;
use crate::function::Sample;
use tracing::debug;

/// A function being brought up to date
struct Frame {
    function: FnId,
    /// Next input slot to examine
    slot: usize,
    /// At least one input slot was dirty
    changed: bool,
}

impl Frame {
    fn new(function: FnId) -> Self {
        Self {
            function,
            slot: 0,
            changed: false,
        }
    }
}

impl DependencyGraph {
    /// Bring a variable up to date.
    ///
    /// Leaves return immediately. Otherwise each dirty input slot of the
    /// active producer is brought up to date depth-first and cleared, and the
    /// routine runs only if some slot was dirty.
    pub fn calculate_variable(&mut self, target: VarId) -> Result<(), GraphError> {
        let Some(root) = self.producers[target.index()] else {
            return Ok(());
        };

        let mut stack = vec![Frame::new(root)];
        while let Some(top) = stack.last_mut() {
            let function = &self.functions[top.function.index()];

            if top.slot < function.inputs().len() {
                let slot = top.slot;
                if function.is_dirty(slot) {
                    let input = function.inputs()[slot];
                    if let Some(child) = self.producers[input.index()] {
                        if self.functions[child.index()].needs_run() {
                            // Revisit this slot once the child has run
                            if stack.len() > self.functions.len() {
                                return Err(self.cycle_error(&stack));
                            }
                            stack.push(Frame::new(child));
                            continue;
                        }
                    }
                    top.changed = true;
                    top.slot += 1;
                    let id = top.function;
                    self.functions[id.index()].clear_dirty(slot);
                    continue;
                }
                top.slot += 1;
                continue;
            }

            let id = top.function;
            let run = top.changed || function.is_stale();
            stack.pop();
            if run {
                self.invoke(id)?;
            }
        }
        Ok(())
    }

    /// Bring every requested output up to date
    pub fn calculate_outputs(&mut self) -> Result<(), GraphError> {
        for index in 0..self.requested.len() {
            let target = self.requested[index];
            self.calculate_variable(target)?;
        }
        Ok(())
    }

    /// Run a function's routine and store its outputs
    fn invoke(&mut self, id: FnId) -> Result<(), GraphError> {
        let function = &self.functions[id.index()];
        let values = function
            .inputs()
            .iter()
            .map(|input| {
                self.variables[input.index()].sample().ok_or_else(|| {
                    GraphError::InvalidDefinition {
                        function: function.name().to_string(),
                        reason: format!(
                            "input '{}' has no numeric value",
                            self.variables[input.index()].name()
                        ),
                    }
                })
            })
            .collect::<Result<Vec<Sample>, _>>()?;

        let results = self.functions[id.index()].invoke(&values);
        self.invocations += 1;

        let function = &self.functions[id.index()];
        debug!(
            "Invoked {} ({} inputs, {} outputs)",
            function.name(),
            values.len(),
            results.len()
        );
        for (output, result) in function.outputs().iter().zip(results) {
            if let Some(sample) = result {
                self.variables[output.index()].set_sample(sample)?;
            }
        }
        Ok(())
    }

    fn cycle_error(&self, stack: &[Frame]) -> GraphError {
        ConfigError::CycleDetected {
            variables: stack
                .iter()
                .filter_map(|frame| self.functions[frame.function.index()].outputs().first())
                .map(|v| self.variables[v.index()].name().to_string())
                .collect(),
        }
        .into()
    }
}
