//! Configuration properties and cross-validation
//!
//! A `Configuration` is a bag of named flags and choices. Functions carry a
//! [`Condition`] over it that decides whether they are the active producer of
//! their outputs; [`ConflictRule`]s reject combinations that are individually
//! valid but incompatible together, each with an offered resolution.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Display unit system applied to every continuous variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    English,
    Metric,
}

/// Value of one configuration property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Flag(bool),
    Choice(String),
}

/// Predicate over a configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Always,
    /// Flag is set and true
    Flag(String),
    /// Choice property equals the value
    Choice(String, String),
    Not(Box<Condition>),
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

impl Condition {
    pub fn flag(name: &str) -> Self {
        Condition::Flag(name.to_string())
    }

    pub fn choice(name: &str, value: &str) -> Self {
        Condition::Choice(name.to_string(), value.to_string())
    }

    pub fn negate(self) -> Self {
        Condition::Not(Box::new(self))
    }

    /// Evaluate against a configuration. Missing flags read as false and
    /// missing choices match nothing.
    pub fn holds(&self, configuration: &Configuration) -> bool {
        match self {
            Condition::Always => true,
            Condition::Flag(name) => configuration.flag(name),
            Condition::Choice(name, value) => configuration.choice(name) == Some(value.as_str()),
            Condition::Not(inner) => !inner.holds(configuration),
            Condition::All(all) => all.iter().all(|c| c.holds(configuration)),
            Condition::Any(any) => any.iter().any(|c| c.holds(configuration)),
        }
    }
}

/// A named combination of properties that must not hold at once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRule {
    /// Conflict kind reported to the caller
    pub kind: String,
    /// Holds when the conflict is present
    pub when: Condition,
    pub message: String,
    /// Property assignments that clear the conflict
    pub resolution: Vec<(String, PropertyValue)>,
}

/// One detected configuration conflict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub kind: String,
    pub message: String,
    pub resolution: Vec<(String, PropertyValue)>,
}

/// Errors raised while applying a configuration to a graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("configuration conflict '{}': {}", .0.kind, .0.message)]
    ConfigurationConflict(Conflict),

    #[error("variable '{variable}' has more than one active producer: {functions:?}")]
    AmbiguousProducer {
        variable: String,
        functions: Vec<String>,
    },

    #[error("active producers form a cycle through {variables:?}")]
    CycleDetected { variables: Vec<String> },
}

/// Named properties plus the display unit system
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    properties: FxHashMap<String, PropertyValue>,
    #[serde(default)]
    units: UnitSystem,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flag(mut self, name: &str, value: bool) -> Self {
        self.set_flag(name, value);
        self
    }

    pub fn with_choice(mut self, name: &str, value: &str) -> Self {
        self.set_choice(name, value);
        self
    }

    pub fn with_unit_system(mut self, units: UnitSystem) -> Self {
        self.units = units;
        self
    }

    pub fn set_flag(&mut self, name: &str, value: bool) {
        self.properties
            .insert(name.to_string(), PropertyValue::Flag(value));
    }

    pub fn set_choice(&mut self, name: &str, value: &str) {
        self.properties
            .insert(name.to_string(), PropertyValue::Choice(value.to_string()));
    }

    pub fn set(&mut self, name: &str, value: PropertyValue) {
        self.properties.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// True only for a flag explicitly set to true
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.properties.get(name), Some(PropertyValue::Flag(true)))
    }

    pub fn choice(&self, name: &str) -> Option<&str> {
        match self.properties.get(name) {
            Some(PropertyValue::Choice(value)) => Some(value),
            _ => None,
        }
    }

    pub fn unit_system(&self) -> UnitSystem {
        self.units
    }

    pub fn set_unit_system(&mut self, units: UnitSystem) {
        self.units = units;
    }

    /// Every rule whose condition currently holds, in rule order
    pub fn cross_validate(&self, rules: &[ConflictRule]) -> Vec<Conflict> {
        rules
            .iter()
            .filter(|rule| rule.when.holds(self))
            .map(|rule| {
                warn!("Configuration conflict '{}': {}", rule.kind, rule.message);
                Conflict {
                    kind: rule.kind.clone(),
                    message: rule.message.clone(),
                    resolution: rule.resolution.clone(),
                }
            })
            .collect()
    }

    /// Apply the offered resolution of a conflict
    pub fn apply_resolution(&mut self, conflict: &Conflict) {
        for (name, value) in &conflict.resolution {
            self.set(name, value.clone());
        }
    }

    /// Cross-validate, then apply resolutions until no rule holds.
    ///
    /// Returns the conflicts that were resolved. Stops after one pass per rule
    /// so rules that keep re-triggering each other cannot loop.
    pub fn resolve_all(&mut self, rules: &[ConflictRule]) -> Vec<Conflict> {
        let mut resolved = Vec::new();
        for _ in 0..=rules.len() {
            let conflicts = self.cross_validate(rules);
            let Some(first) = conflicts.into_iter().next() else {
                break;
            };
            self.apply_resolution(&first);
            resolved.push(first);
        }
        resolved
    }
}
