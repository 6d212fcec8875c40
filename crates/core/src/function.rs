//! Producer functions
//!
//! A function reads an ordered list of input variables and writes an ordered
//! list of outputs through a [`Compute`] routine. Which of several candidate
//! functions actually produces a variable is decided by each function's
//! activation [`Condition`] against the current configuration.

use crate::config::Condition;
use crate::graph::VarId;
use std::fmt;

/// One input or output value, in native units for continuous variables
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Number(f64),
    /// Active item index of a discrete variable
    Item(usize),
}

impl Sample {
    pub fn as_number(self) -> f64 {
        match self {
            Sample::Number(v) => v,
            Sample::Item(i) => i as f64,
        }
    }

    pub fn as_item(self) -> usize {
        match self {
            Sample::Item(i) => i,
            Sample::Number(v) => v.max(0.0) as usize,
        }
    }
}

/// Read-only view of a function's input values, indexed by slot
pub struct Inputs<'a> {
    values: &'a [Sample],
}

impl<'a> Inputs<'a> {
    pub fn new(values: &'a [Sample]) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Numeric value of a slot
    #[inline]
    pub fn number(&self, slot: usize) -> f64 {
        self.values[slot].as_number()
    }

    /// Item index of a discrete slot
    #[inline]
    pub fn item(&self, slot: usize) -> usize {
        self.values[slot].as_item()
    }
}

/// Output values written by a routine, indexed by slot.
///
/// Slots a routine leaves unwritten keep the variable's previous value.
pub struct Outputs {
    values: Vec<Option<Sample>>,
}

impl Outputs {
    pub fn new(len: usize) -> Self {
        Self {
            values: vec![None; len],
        }
    }

    #[inline]
    pub fn set_number(&mut self, slot: usize, value: f64) {
        self.values[slot] = Some(Sample::Number(value));
    }

    #[inline]
    pub fn set_item(&mut self, slot: usize, index: usize) {
        self.values[slot] = Some(Sample::Item(index));
    }

    pub fn get(&self, slot: usize) -> Option<Sample> {
        self.values.get(slot).copied().flatten()
    }

    pub(crate) fn into_values(self) -> Vec<Option<Sample>> {
        self.values
    }
}

/// A native routine bound to a function
pub trait Compute: Send + Sync {
    fn compute(&self, inputs: &Inputs<'_>, outputs: &mut Outputs);
}

impl<F> Compute for F
where
    F: Fn(&Inputs<'_>, &mut Outputs) + Send + Sync,
{
    fn compute(&self, inputs: &Inputs<'_>, outputs: &mut Outputs) {
        self(inputs, outputs);
    }
}

/// A candidate producer of one or more variables
pub struct Function {
    name: String,
    inputs: Vec<VarId>,
    outputs: Vec<VarId>,
    /// One bit per input slot, set when that input changed since the last run
    dirty: Vec<bool>,
    /// Set until the routine runs once after (re)configuration
    stale: bool,
    routine: Box<dyn Compute>,
    activation: Condition,
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("dirty", &self.dirty)
            .field("stale", &self.stale)
            .field("activation", &self.activation)
            .finish_non_exhaustive()
    }
}

impl Function {
    pub fn new(
        name: &str,
        inputs: Vec<VarId>,
        outputs: Vec<VarId>,
        activation: Condition,
        routine: Box<dyn Compute>,
    ) -> Self {
        let dirty = vec![true; inputs.len()];
        Self {
            name: name.to_string(),
            inputs,
            outputs,
            dirty,
            stale: true,
            routine,
            activation,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[VarId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[VarId] {
        &self.outputs
    }

    pub fn activation(&self) -> &Condition {
        &self.activation
    }

    pub fn is_dirty(&self, slot: usize) -> bool {
        self.dirty[slot]
    }

    pub fn any_dirty(&self) -> bool {
        self.dirty.iter().any(|&d| d)
    }

    /// True when the routine must run before its outputs can be trusted
    pub fn needs_run(&self) -> bool {
        self.stale || self.any_dirty()
    }

    pub(crate) fn is_stale(&self) -> bool {
        self.stale
    }

    pub(crate) fn mark_dirty(&mut self, slot: usize) {
        self.dirty[slot] = true;
    }

    pub(crate) fn clear_dirty(&mut self, slot: usize) {
        self.dirty[slot] = false;
    }

    pub(crate) fn mark_all_dirty(&mut self) {
        self.dirty.fill(true);
        self.stale = true;
    }

    /// Slots that read `variable`
    pub(crate) fn slots_of(&self, variable: VarId) -> impl Iterator<Item = usize> + '_ {
        self.inputs
            .iter()
            .enumerate()
            .filter(move |&(_, &v)| v == variable)
            .map(|(slot, _)| slot)
    }

    /// Run the routine over gathered input values
    pub(crate) fn invoke(&mut self, values: &[Sample]) -> Vec<Option<Sample>> {
        let mut outputs = Outputs::new(self.outputs.len());
        self.routine.compute(&Inputs::new(values), &mut outputs);
        self.stale = false;
        outputs.into_values()
    }
}
