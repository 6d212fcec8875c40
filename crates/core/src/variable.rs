//! Physical-quantity variables
//!
//! A continuous variable holds one value in two representations: the native
//! value the models compute with, and the display value the user reads and
//! types. Display is always derived from native through the units registry,
//! so switching display units never perturbs model state.
//!
//! Discrete variables hold an index into an ordered item list and never
//! convert. Text variables hold a string.
//!
//! Every variable also keeps its raw **store**: the last text entered for
//! it. A store may hold several values (`"0 5 10"` or `"0 to 10 by 5"`),
//! which is how a leaf becomes a ranging variable.

use crate::config::UnitSystem;
use crate::function::Sample;
use crate::units::{Conversion, UnitError, UnitsRegistry};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on values generated from one from/thru/step store
pub const MAX_RANGE_VALUES: usize = 10_000;

/// Relative slack on bounds checks so display rounding cannot reject a bound itself
const BOUNDS_TOLERANCE: f64 = 1e-9;

/// Relative error allowed when a rounded store must reproduce its native value
const STORE_TOLERANCE: f64 = 1e-12;

/// Display units and decimal count for one unit system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySpec {
    pub units: String,
    pub decimals: u8,
}

impl DisplaySpec {
    pub fn new(units: &str, decimals: u8) -> Self {
        Self {
            units: units.to_string(),
            decimals,
        }
    }
}

/// Master definition of a continuous variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuousSpec {
    pub native_units: String,
    pub minimum: f64,
    pub maximum: f64,
    pub default: f64,
    pub english: DisplaySpec,
    pub metric: DisplaySpec,
}

impl ContinuousSpec {
    /// Spec displaying in native units with two decimals until told otherwise
    pub fn new(native_units: &str, minimum: f64, maximum: f64, default: f64) -> Self {
        Self {
            native_units: native_units.to_string(),
            minimum,
            maximum,
            default,
            english: DisplaySpec::new(native_units, 2),
            metric: DisplaySpec::new(native_units, 2),
        }
    }

    pub fn english(mut self, units: &str, decimals: u8) -> Self {
        self.english = DisplaySpec::new(units, decimals);
        self
    }

    pub fn metric(mut self, units: &str, decimals: u8) -> Self {
        self.metric = DisplaySpec::new(units, decimals);
        self
    }
}

/// Errors raised when mutating a variable directly
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VariableError {
    #[error("{variable}: {value} is outside [{minimum}, {maximum}]")]
    OutOfRange {
        variable: String,
        value: f64,
        minimum: f64,
        maximum: f64,
    },

    #[error("{variable}: '{item}' is not one of its items")]
    UnknownItem { variable: String, item: String },

    #[error("{variable}: expected a {expected} variable")]
    KindMismatch {
        variable: String,
        expected: &'static str,
    },

    #[error("{variable}: {source}")]
    Units {
        variable: String,
        #[source]
        source: UnitError,
    },
}

/// Why a raw store was rejected, with the character span to highlight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafParseError {
    /// Character offset of the offending token in the raw text
    pub position: usize,
    /// Character length of the offending token
    pub length: usize,
    pub reason: String,
}

/// Values parsed out of a raw store
#[derive(Debug, Clone, PartialEq)]
pub enum LeafValues {
    /// Display-unit values for a continuous variable
    Numbers(Vec<f64>),
    /// Item indices for a discrete variable
    Items(Vec<usize>),
    Text(String),
}

impl LeafValues {
    pub fn len(&self) -> usize {
        match self {
            LeafValues::Numbers(v) => v.len(),
            LeafValues::Items(v) => v.len(),
            LeafValues::Text(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Native and display state of a continuous quantity
#[derive(Debug, Clone, PartialEq)]
pub struct Continuous {
    native_value: f64,
    native_units: String,
    minimum: f64,
    maximum: f64,
    default: f64,
    display_units: String,
    display_decimals: u8,
    display_value: f64,
    to_display: Conversion,
    english: DisplaySpec,
    metric: DisplaySpec,
}

impl Continuous {
    pub fn native_value(&self) -> f64 {
        self.native_value
    }

    pub fn native_units(&self) -> &str {
        &self.native_units
    }

    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    pub fn default_value(&self) -> f64 {
        self.default
    }

    pub fn display_value(&self) -> f64 {
        self.display_value
    }

    pub fn display_units(&self) -> &str {
        &self.display_units
    }

    pub fn display_decimals(&self) -> u8 {
        self.display_decimals
    }

    /// Native to display conversion currently in effect
    pub fn conversion(&self) -> Conversion {
        self.to_display
    }

    fn in_bounds(&self, native: f64) -> bool {
        let slack = BOUNDS_TOLERANCE * self.minimum.abs().max(self.maximum.abs()).max(1.0);
        native.is_finite() && native >= self.minimum - slack && native <= self.maximum + slack
    }

    /// Display text for a native value that parses back to the same value.
    ///
    /// Uses the display decimals when the rounded text converts back within
    /// `STORE_TOLERANCE`, otherwise the shortest text that round-trips.
    pub fn store_text(&self, native: f64) -> String {
        let display = self.to_display.apply(native);
        let rounded = format!("{:.*}", usize::from(self.display_decimals), display);
        let exact = rounded.parse::<f64>().is_ok_and(|r| {
            let back = self.to_display.invert(r);
            (back - native).abs() <= STORE_TOLERANCE * native.abs().max(1.0)
        });
        if exact {
            rounded
        } else {
            format!("{display}")
        }
    }

    fn refresh_display(&mut self) {
        self.display_value = round_to(self.to_display.apply(self.native_value), self.display_decimals);
    }
}

/// Ordered item list with one active item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discrete {
    items: Vec<String>,
    active: usize,
}

impl Discrete {
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_item(&self) -> &str {
        &self.items[self.active]
    }

    /// Index of an item, matched case-insensitively
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|i| i.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VariableKind {
    Continuous(Continuous),
    Discrete(Discrete),
    Text(String),
}

/// A named physical quantity, item choice or text
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    kind: VariableKind,
    store: String,
    valid: bool,
}

/// Round to a number of decimal places
pub(crate) fn round_to(value: f64, decimals: u8) -> f64 {
    let scale = 10f64.powi(i32::from(decimals));
    (value * scale).round() / scale
}

/// Ascending values `from, from + step, ...` not exceeding `thru`
pub(crate) fn stepped_values(from: f64, thru: f64, step: f64) -> Result<Vec<f64>, String> {
    if !(from.is_finite() && thru.is_finite() && step.is_finite()) {
        return Err("range bounds must be finite".to_string());
    }
    if step <= 0.0 {
        return Err(format!("step {step} must be positive"));
    }
    if thru < from {
        return Err(format!("range end {thru} is below its start {from}"));
    }
    let count = ((thru - from) / step + 1e-9).floor() + 1.0;
    if count > MAX_RANGE_VALUES as f64 {
        return Err(format!("range produces more than {MAX_RANGE_VALUES} values"));
    }
    Ok((0..count as usize).map(|i| from + i as f64 * step).collect())
}

/// Split raw text on whitespace and commas, keeping character offsets
fn words_with_offsets(text: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut start: Option<(usize, usize)> = None;
    for (char_pos, (byte_pos, c)) in text.char_indices().enumerate() {
        let separator = c.is_whitespace() || c == ',';
        match (separator, start) {
            (true, Some((chars, bytes))) => {
                words.push((chars, &text[bytes..byte_pos]));
                start = None;
            }
            (false, None) => start = Some((char_pos, byte_pos)),
            _ => {}
        }
    }
    if let Some((chars, bytes)) = start {
        words.push((chars, &text[bytes..]));
    }
    words
}

impl Variable {
    /// Create a continuous variable at its default value.
    pub fn continuous(
        name: &str,
        spec: ContinuousSpec,
        units: &UnitsRegistry,
    ) -> Result<Self, VariableError> {
        let wrap = |source| VariableError::Units {
            variable: name.to_string(),
            source,
        };
        // Both unit systems must be reachable from native
        units
            .conversion_factor_offset(&spec.native_units, &spec.metric.units)
            .map_err(wrap)?;
        let to_display = units
            .conversion_factor_offset(&spec.native_units, &spec.english.units)
            .map_err(wrap)?;

        let mut continuous = Continuous {
            native_value: spec.default,
            native_units: spec.native_units,
            minimum: spec.minimum,
            maximum: spec.maximum,
            default: spec.default,
            display_units: spec.english.units.clone(),
            display_decimals: spec.english.decimals,
            display_value: 0.0,
            to_display,
            english: spec.english,
            metric: spec.metric,
        };
        if !continuous.in_bounds(spec.default) {
            return Err(VariableError::OutOfRange {
                variable: name.to_string(),
                value: spec.default,
                minimum: spec.minimum,
                maximum: spec.maximum,
            });
        }
        continuous.refresh_display();

        let mut variable = Self {
            name: name.to_string(),
            kind: VariableKind::Continuous(continuous),
            store: String::new(),
            valid: true,
        };
        variable.store = variable.format_store();
        Ok(variable)
    }

    /// Create a discrete variable with `default` as the active item
    pub fn discrete(name: &str, items: &[&str], default: usize) -> Result<Self, VariableError> {
        if default >= items.len() {
            return Err(VariableError::UnknownItem {
                variable: name.to_string(),
                item: default.to_string(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            kind: VariableKind::Discrete(Discrete {
                items: items.iter().map(|s| (*s).to_string()).collect(),
                active: default,
            }),
            store: items[default].to_string(),
            valid: true,
        })
    }

    pub fn text(name: &str, default: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: VariableKind::Text(default.to_string()),
            store: default.to_string(),
            valid: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &VariableKind {
        &self.kind
    }

    /// Raw text last entered for this variable
    pub fn store(&self) -> &str {
        &self.store
    }

    /// False after a rejected entry, until a valid one replaces it
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub(crate) fn set_store(&mut self, text: &str, valid: bool) {
        self.store = text.to_string();
        self.valid = valid;
    }

    pub fn continuous_state(&self) -> Option<&Continuous> {
        match &self.kind {
            VariableKind::Continuous(c) => Some(c),
            _ => None,
        }
    }

    pub fn discrete_state(&self) -> Option<&Discrete> {
        match &self.kind {
            VariableKind::Discrete(d) => Some(d),
            _ => None,
        }
    }

    pub fn native_value(&self) -> Option<f64> {
        self.continuous_state().map(Continuous::native_value)
    }

    pub fn display_value(&self) -> Option<f64> {
        self.continuous_state().map(Continuous::display_value)
    }

    pub fn display_units(&self) -> Option<&str> {
        self.continuous_state().map(Continuous::display_units)
    }

    pub fn active_item(&self) -> Option<&str> {
        self.discrete_state().map(Discrete::active_item)
    }

    pub fn text_value(&self) -> Option<&str> {
        match &self.kind {
            VariableKind::Text(t) => Some(t),
            _ => None,
        }
    }

    fn mismatch(&self, expected: &'static str) -> VariableError {
        VariableError::KindMismatch {
            variable: self.name.clone(),
            expected,
        }
    }

    fn continuous_mut(&mut self) -> Result<&mut Continuous, VariableError> {
        match &mut self.kind {
            VariableKind::Continuous(c) => Ok(c),
            _ => Err(VariableError::KindMismatch {
                variable: self.name.clone(),
                expected: "continuous",
            }),
        }
    }

    /// Store a native value and re-derive the display value.
    ///
    /// Values outside `[minimum, maximum]` are rejected and flag the variable
    /// invalid without changing the stored value.
    pub fn set_native_value(&mut self, value: f64) -> Result<(), VariableError> {
        let name = self.name.clone();
        let c = self.continuous_mut()?;
        if !c.in_bounds(value) {
            let (minimum, maximum) = (c.minimum, c.maximum);
            self.valid = false;
            return Err(VariableError::OutOfRange {
                variable: name,
                value,
                minimum,
                maximum,
            });
        }
        c.native_value = value;
        c.refresh_display();
        self.valid = true;
        Ok(())
    }

    /// Convert a display value to native and store both
    pub fn set_display_value(&mut self, value: f64) -> Result<(), VariableError> {
        let c = self.continuous_mut()?;
        let native = c.to_display.invert(value);
        let decimals = c.display_decimals;
        self.set_native_value(native)?;
        if let VariableKind::Continuous(c) = &mut self.kind {
            c.display_value = round_to(value, decimals);
        }
        Ok(())
    }

    /// Store a computed native value without a bounds check
    pub(crate) fn store_native(&mut self, value: f64) -> Result<bool, VariableError> {
        let c = self.continuous_mut()?;
        let changed = c.native_value.to_bits() != value.to_bits();
        c.native_value = value;
        c.refresh_display();
        Ok(changed)
    }

    /// Switch display units; the native value is untouched.
    ///
    /// A valid numeric store is re-expressed in the new units without losing
    /// precision, so the values it stands for are unchanged.
    pub fn set_display_units(
        &mut self,
        units: &str,
        decimals: Option<u8>,
        registry: &UnitsRegistry,
    ) -> Result<(), VariableError> {
        let previous = self.parse_store(&self.store).ok();
        let name = self.name.clone();
        let c = self.continuous_mut()?;
        let to_display = registry
            .conversion_factor_offset(&c.native_units, units)
            .map_err(|source| VariableError::Units {
                variable: name,
                source,
            })?;
        let old = c.to_display;
        c.to_display = to_display;
        c.display_units = units.to_string();
        if let Some(d) = decimals {
            c.display_decimals = d;
        }
        c.refresh_display();

        if let Some(LeafValues::Numbers(values)) = previous {
            if !values.is_empty() {
                let c = &*c;
                let store = values
                    .iter()
                    .map(|&v| c.store_text(old.invert(v)))
                    .collect::<Vec<_>>()
                    .join(" ");
                self.store = store;
            }
        }
        Ok(())
    }

    /// Apply a unit system's display units and decimals; no-op for other kinds
    pub fn apply_unit_system(
        &mut self,
        system: UnitSystem,
        registry: &UnitsRegistry,
    ) -> Result<(), VariableError> {
        let spec = match (&self.kind, system) {
            (VariableKind::Continuous(c), UnitSystem::English) => c.english.clone(),
            (VariableKind::Continuous(c), UnitSystem::Metric) => c.metric.clone(),
            _ => return Ok(()),
        };
        self.set_display_units(&spec.units, Some(spec.decimals), registry)
    }

    pub fn set_item(&mut self, name: &str) -> Result<(), VariableError> {
        let index = self
            .discrete_state()
            .ok_or_else(|| self.mismatch("discrete"))?
            .index_of(name)
            .ok_or_else(|| VariableError::UnknownItem {
                variable: self.name.clone(),
                item: name.to_string(),
            })?;
        self.set_item_index(index)
    }

    pub fn set_item_index(&mut self, index: usize) -> Result<(), VariableError> {
        let variable = self.name.clone();
        match &mut self.kind {
            VariableKind::Discrete(d) if index < d.items.len() => {
                d.active = index;
                self.valid = true;
                Ok(())
            }
            VariableKind::Discrete(_) => Err(VariableError::UnknownItem {
                variable,
                item: index.to_string(),
            }),
            _ => Err(self.mismatch("discrete")),
        }
    }

    pub fn set_text(&mut self, text: &str) -> Result<(), VariableError> {
        match &mut self.kind {
            VariableKind::Text(t) => {
                *t = text.to_string();
                self.store = text.to_string();
                Ok(())
            }
            _ => Err(self.mismatch("text")),
        }
    }

    /// Current value as a function input; `None` for text
    pub fn sample(&self) -> Option<Sample> {
        match &self.kind {
            VariableKind::Continuous(c) => Some(Sample::Number(c.native_value)),
            VariableKind::Discrete(d) => Some(Sample::Item(d.active)),
            VariableKind::Text(_) => None,
        }
    }

    /// Write a function output. Returns whether the value changed.
    pub(crate) fn set_sample(&mut self, sample: Sample) -> Result<bool, VariableError> {
        match sample {
            Sample::Number(v) => self.store_native(v),
            Sample::Item(i) => {
                let before = self.discrete_state().map(Discrete::active_index);
                self.set_item_index(i)?;
                Ok(before != Some(i))
            }
        }
    }

    /// Current value rendered in display units and decimals
    /// Store text for the current value; continuous values keep full precision
    pub fn format_store(&self) -> String {
        match &self.kind {
            VariableKind::Continuous(c) => c.store_text(c.native_value),
            _ => self.format_display(),
        }
    }

    pub fn format_display(&self) -> String {
        match &self.kind {
            VariableKind::Continuous(c) => {
                format!("{:.*}", usize::from(c.display_decimals), c.display_value)
            }
            VariableKind::Discrete(d) => d.active_item().to_string(),
            VariableKind::Text(t) => t.clone(),
        }
    }

    /// Parse raw text into one or more values without storing anything.
    ///
    /// Continuous stores accept numbers separated by spaces or commas, or
    /// `<from> to <thru> by <step>`; numbers are in display units. Discrete
    /// stores accept item names.
    pub fn parse_store(&self, text: &str) -> Result<LeafValues, LeafParseError> {
        let words = words_with_offsets(text);
        match &self.kind {
            VariableKind::Text(_) => Ok(LeafValues::Text(text.to_string())),
            VariableKind::Discrete(d) => words
                .iter()
                .map(|&(position, word)| {
                    d.index_of(word).ok_or_else(|| LeafParseError {
                        position,
                        length: word.chars().count(),
                        reason: format!("'{word}' is not one of {}", d.items.join(", ")),
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(LeafValues::Items),
            VariableKind::Continuous(c) => parse_numbers(c, &words).map(LeafValues::Numbers),
        }
    }
}

fn parse_numbers(c: &Continuous, words: &[(usize, &str)]) -> Result<Vec<f64>, LeafParseError> {
    let number = |&(position, word): &(usize, &str)| -> Result<f64, LeafParseError> {
        let reject = |reason: String| LeafParseError {
            position,
            length: word.chars().count(),
            reason,
        };
        let value = word
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| reject(format!("'{word}' is not a number")))?;
        if !c.in_bounds(c.to_display.invert(value)) {
            let low = c.to_display.apply(c.minimum);
            let high = c.to_display.apply(c.maximum);
            return Err(reject(format!(
                "{value} {} is outside {low} to {high}",
                c.display_units
            )));
        }
        Ok(value)
    };

    let is_range = words.len() == 5
        && matches!(words[1].1, "to" | "thru" | "through")
        && matches!(words[3].1, "by" | "step");
    if !is_range {
        return words.iter().map(number).collect();
    }

    let from = number(&words[0])?;
    let thru = number(&words[2])?;
    let (step_pos, step_word) = words[4];
    let step = step_word
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| LeafParseError {
            position: step_pos,
            length: step_word.chars().count(),
            reason: format!("'{step_word}' is not a number"),
        })?;
    stepped_values(from, thru, step).map_err(|reason| LeafParseError {
        position: words[0].0,
        length: words[4].0 + step_word.chars().count() - words[0].0,
        reason,
    })
}
