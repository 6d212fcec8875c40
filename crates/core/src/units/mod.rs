//! Units-of-measure engine
//!
//! Parses free-form unit phrases (`"lb/ft2"`, `"kg per m3"`, `"degrees F"`),
//! reduces them to exponent vectors over eleven base dimensions, checks
//! dimensional compatibility and produces conversion coefficients.
//!
//! # Conversions
//! Every conversion is `value' = offset + value * factor`. The factor is the
//! ratio of the two phrases' accumulated scalar factors. The offset is
//! non-zero only when both phrases are a single bare temperature scale
//! (Celsius, Fahrenheit or Kelvin); `oF/h` to `oC/h` is purely multiplicative.
//!
//! # Usage
//! ```
//! use fire_behavior_core::units::UnitsRegistry;
//!
//! let units = UnitsRegistry::standard();
//! let celsius = units.convert(100.0, "oF", "oC").unwrap();
//! assert!((celsius - 37.7778).abs() < 1e-3);
//! ```

mod phrase;
mod table;

use phrase::{singular, split_exponent, tokenize, Token};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, trace};

/// Number of base dimensions in an exponent vector
pub const DIMENSIONS: usize = 11;

/// Exponent of each base dimension, indexed by [`Dimension::index`]
pub type Exponents = [i32; DIMENSIONS];

/// The orthogonal base dimensions used to verify compatibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Class,
    Length,
    Mass,
    Time,
    Current,
    Temperature,
    Luminosity,
    Substance,
    PlaneAngle,
    SolidAngle,
    Ratio,
}

impl Dimension {
    /// All dimensions in exponent-vector order
    pub const ALL: [Dimension; DIMENSIONS] = [
        Dimension::Class,
        Dimension::Length,
        Dimension::Mass,
        Dimension::Time,
        Dimension::Current,
        Dimension::Temperature,
        Dimension::Luminosity,
        Dimension::Substance,
        Dimension::PlaneAngle,
        Dimension::SolidAngle,
        Dimension::Ratio,
    ];

    /// Position in an [`Exponents`] vector
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Word used when describing a reduced phrase
    pub const fn label(self) -> &'static str {
        match self {
            Dimension::Class => "class",
            Dimension::Length => "distance",
            Dimension::Mass => "mass",
            Dimension::Time => "time",
            Dimension::Current => "current",
            Dimension::Temperature => "temperature",
            Dimension::Luminosity => "luminous intensity",
            Dimension::Substance => "substance",
            Dimension::PlaneAngle => "angle",
            Dimension::SolidAngle => "solid angle",
            Dimension::Ratio => "ratio",
        }
    }
}

/// Build an exponent vector from `(dimension, exponent)` pairs
pub fn exponents(pairs: &[(Dimension, i32)]) -> Exponents {
    let mut out = [0; DIMENSIONS];
    for &(dimension, exponent) in pairs {
        out[dimension.index()] += exponent;
    }
    out
}

/// One registered unit. Immutable once registered.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDescriptor {
    key: String,
    base: String,
    exponents: Exponents,
    factor: f64,
}

impl UnitDescriptor {
    /// Unique description key (e.g. `"foot"`)
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Key of the unit this one is a multiple of
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn exponents(&self) -> &Exponents {
        &self.exponents
    }

    /// Multiplier to the SI base of this signature
    pub fn factor(&self) -> f64 {
        self.factor
    }
}

/// Which phrase of a conversion request is being compiled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Source,
    Destination,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => write!(f, "source"),
            Side::Destination => write!(f, "destination"),
        }
    }
}

/// Errors raised by the units engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    #[error("unknown {side} unit '{token}' in \"{phrase}\"")]
    UnknownUnitAlias {
        side: Side,
        token: String,
        phrase: String,
    },

    #[error("malformed {side} unit term '{token}' in \"{phrase}\"")]
    MalformedTerm {
        side: Side,
        token: String,
        phrase: String,
    },

    #[error("cannot convert \"{from}\" to \"{to}\": {explanation}")]
    IncompatibleDimensions {
        from: String,
        to: String,
        explanation: String,
    },

    #[error("duplicate unit registration '{key}'")]
    DuplicateUnitRegistration { key: String },
}

/// A resolved `(unit, prefix, exponent)` term of a compiled phrase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Term {
    /// Index of the descriptor in the registry
    pub unit: usize,
    /// SI prefix multiplier, 1.0 when absent
    pub prefix: f64,
    /// Signed exponent after divisor flipping
    pub exponent: i32,
}

/// Result of compiling one unit phrase
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPhrase {
    phrase: String,
    terms: Vec<Term>,
    factor: f64,
    exponents: Exponents,
}

impl CompiledPhrase {
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Accumulated scalar factor to the SI base signature
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Summed base-dimension exponents across all terms
    pub fn exponents(&self) -> &Exponents {
        &self.exponents
    }

    /// Human-readable base-dimension phrase, e.g. `distance/time`
    pub fn reduced(&self) -> String {
        reduced_phrase(&self.exponents)
    }
}

/// Multiplicative factor and additive offset of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub factor: f64,
    pub offset: f64,
}

impl Conversion {
    pub const IDENTITY: Conversion = Conversion {
        factor: 1.0,
        offset: 0.0,
    };

    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        self.offset + value * self.factor
    }

    /// Undo [`Conversion::apply`]
    #[inline]
    pub fn invert(&self, value: f64) -> f64 {
        (value - self.offset) / self.factor
    }

    /// Factor within `tolerance` of 1 and offset within `tolerance` of 0
    pub fn is_identity(&self, tolerance: f64) -> bool {
        (self.factor - 1.0).abs() <= tolerance && self.offset.abs() <= tolerance
    }
}

/// SI prefixes, longest spelling first so `da` wins over `d`
const PREFIXES: &[(&str, f64)] = &[
    ("micro", 1e-6),
    ("milli", 1e-3),
    ("centi", 1e-2),
    ("hecto", 1e2),
    ("deka", 1e1),
    ("deca", 1e1),
    ("deci", 1e-1),
    ("kilo", 1e3),
    ("mega", 1e6),
    ("giga", 1e9),
    ("tera", 1e12),
    ("nano", 1e-9),
    ("pico", 1e-12),
    ("da", 1e1),
    ("h", 1e2),
    ("k", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("d", 1e-1),
    ("c", 1e-2),
    ("m", 1e-3),
    ("u", 1e-6),
    ("n", 1e-9),
    ("p", 1e-12),
];

/// Tolerance used by [`UnitsRegistry::equivalent`]
const EQUIVALENCE_TOLERANCE: f64 = 1e-5;

/// Describe an exponent vector in words, e.g. `mass/distance^2`
pub fn reduced_phrase(exponents: &Exponents) -> String {
    let power = |label: &str, e: i32| {
        if e == 1 {
            label.to_string()
        } else {
            format!("{label}^{e}")
        }
    };
    let numerator: Vec<String> = Dimension::ALL
        .iter()
        .zip(exponents)
        .filter(|(_, &e)| e > 0)
        .map(|(d, &e)| power(d.label(), e))
        .collect();
    let denominator: Vec<String> = Dimension::ALL
        .iter()
        .zip(exponents)
        .filter(|(_, &e)| e < 0)
        .map(|(d, &e)| power(d.label(), -e))
        .collect();

    if numerator.is_empty() && denominator.is_empty() {
        return "dimensionless".to_string();
    }
    let mut text = if numerator.is_empty() {
        "1".to_string()
    } else {
        numerator.join("*")
    };
    for term in denominator {
        text.push('/');
        text.push_str(&term);
    }
    text
}

/// Name of the first derived unit whose signature matches exactly, e.g. `velocity (m/s)`
pub fn derived_name(exponents: &Exponents) -> Option<String> {
    table::DERIVED_UNITS
        .iter()
        .find(|d| self::exponents(d.signature) == *exponents)
        .map(|d| format!("{} ({})", d.name, d.units))
}

fn describe(exponents: &Exponents) -> String {
    let reduced = reduced_phrase(exponents);
    match derived_name(exponents) {
        Some(name) => format!("{reduced}, a {name}"),
        None => reduced,
    }
}

/// The universe of known units and their aliases.
///
/// Built once, then shared read-only (typically behind an `Arc`) by every
/// graph that converts values.
#[derive(Debug, Clone)]
pub struct UnitsRegistry {
    units: Vec<UnitDescriptor>,
    keys: FxHashMap<String, usize>,
    aliases: FxHashMap<String, usize>,
    identity: usize,
}

impl Default for UnitsRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl UnitsRegistry {
    /// Key of the dimensionless identity unit that an empty phrase compiles to
    pub const DIMENSIONLESS: &'static str = "dimensionless";

    /// Registry holding only the dimensionless identity unit
    pub fn empty() -> Self {
        let identity = UnitDescriptor {
            key: Self::DIMENSIONLESS.to_string(),
            base: Self::DIMENSIONLESS.to_string(),
            exponents: [0; DIMENSIONS],
            factor: 1.0,
        };
        let mut keys = FxHashMap::default();
        keys.insert(identity.key.clone(), 0);
        Self {
            units: vec![identity],
            keys,
            aliases: FxHashMap::default(),
            identity: 0,
        }
    }

    /// Registry carrying the standard fire behavior unit table.
    ///
    /// A duplicate inside the fixed table is a defect in this crate, not bad
    /// input, so it aborts construction.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        if let Err(e) = table::register_standard(&mut registry) {
            panic!("standard unit table is inconsistent: {e}");
        }
        debug!(
            "Units registry built: {} units, {} aliases",
            registry.units.len(),
            registry.aliases.len()
        );
        registry
    }

    /// Register one unit and its aliases.
    ///
    /// Nothing is registered when the key or any alias already exists.
    pub fn define(
        &mut self,
        key: &str,
        base: &str,
        exponents: Exponents,
        factor: f64,
        aliases: &[&str],
    ) -> Result<(), UnitError> {
        if self.keys.contains_key(key) {
            return Err(UnitError::DuplicateUnitRegistration {
                key: key.to_string(),
            });
        }
        for (i, alias) in aliases.iter().enumerate() {
            if self.aliases.contains_key(*alias) || aliases[..i].contains(alias) {
                return Err(UnitError::DuplicateUnitRegistration {
                    key: (*alias).to_string(),
                });
            }
        }

        let index = self.units.len();
        self.units.push(UnitDescriptor {
            key: key.to_string(),
            base: base.to_string(),
            exponents,
            factor,
        });
        self.keys.insert(key.to_string(), index);
        for alias in aliases {
            self.aliases.insert((*alias).to_string(), index);
        }
        Ok(())
    }

    /// Number of registered units, the identity included
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Descriptor registered under `key`
    pub fn unit(&self, key: &str) -> Option<&UnitDescriptor> {
        self.keys.get(key).map(|&i| &self.units[i])
    }

    /// Descriptor a term points at
    pub fn descriptor(&self, term: &Term) -> &UnitDescriptor {
        &self.units[term.unit]
    }

    /// Descriptor an alias (with optional prefix or plural) resolves to
    pub fn lookup(&self, alias: &str) -> Option<(&UnitDescriptor, f64)> {
        self.resolve(alias).map(|(i, prefix)| (&self.units[i], prefix))
    }

    /// Resolve an alias stem to `(unit index, prefix multiplier)`.
    ///
    /// Order: exact alias, plural stem, then SI prefix on either. Tokens
    /// beginning `kilog` never take a prefix so `kilogram` stays a unit.
    fn resolve(&self, stem: &str) -> Option<(usize, f64)> {
        let exact = |s: &str| {
            self.aliases
                .get(s)
                .copied()
                .or_else(|| singular(s).and_then(|base| self.aliases.get(base).copied()))
        };
        if let Some(index) = exact(stem) {
            return Some((index, 1.0));
        }
        if stem.starts_with("kilog") {
            return None;
        }
        PREFIXES.iter().find_map(|&(prefix, multiplier)| {
            let rest = stem.strip_prefix(prefix).filter(|r| !r.is_empty())?;
            exact(rest).map(|index| (index, multiplier))
        })
    }

    /// Compile a unit phrase into terms, exponents and a scalar factor.
    pub fn compile(&self, phrase: &str, side: Side) -> Result<CompiledPhrase, UnitError> {
        let tokens = tokenize(phrase);
        let mut compiled = CompiledPhrase {
            phrase: phrase.to_string(),
            terms: Vec::with_capacity(tokens.len()),
            factor: 1.0,
            exponents: [0; DIMENSIONS],
        };

        if tokens.iter().all(|t| *t == Token::Divisor) {
            compiled.terms.push(Term {
                unit: self.identity,
                prefix: 1.0,
                exponent: 1,
            });
            return Ok(compiled);
        }

        let malformed = |token: &str| UnitError::MalformedTerm {
            side,
            token: token.to_string(),
            phrase: phrase.to_string(),
        };

        let mut divided = false;
        for token in tokens {
            let word = match token {
                Token::Divisor => {
                    divided = true;
                    continue;
                }
                Token::Word(word) => word,
            };
            let sign = if divided { -1 } else { 1 };

            // Bare integers scale the phrase, "1000 m" or "1/s"
            if let Ok(count) = word.parse::<i64>() {
                if count <= 0 {
                    return Err(malformed(&word));
                }
                let scalar = count as f64;
                compiled.factor *= if divided { 1.0 / scalar } else { scalar };
                continue;
            }

            let parts = split_exponent(&word)
                .filter(|p| !p.stem.is_empty())
                .ok_or_else(|| malformed(&word))?;
            let (unit, prefix) =
                self.resolve(parts.stem)
                    .ok_or_else(|| UnitError::UnknownUnitAlias {
                        side,
                        token: parts.stem.to_string(),
                        phrase: phrase.to_string(),
                    })?;

            let exponent = parts
                .exponent
                .checked_mul(sign)
                .ok_or_else(|| malformed(&word))?;
            let descriptor = &self.units[unit];
            let mut exponents = compiled.exponents;
            for (sum, e) in exponents.iter_mut().zip(descriptor.exponents) {
                *sum = e
                    .checked_mul(exponent)
                    .and_then(|term| sum.checked_add(term))
                    .ok_or_else(|| malformed(&word))?;
            }
            compiled.exponents = exponents;
            compiled.factor *= (prefix * descriptor.factor).powi(exponent);
            trace!(
                "Compiled '{}' as {} x{} ^{}",
                word,
                descriptor.key,
                prefix,
                exponent
            );
            compiled.terms.push(Term {
                unit,
                prefix,
                exponent,
            });
        }
        Ok(compiled)
    }

    /// True when every summed base-dimension exponent matches
    pub fn compatible(&self, source: &CompiledPhrase, destination: &CompiledPhrase) -> bool {
        source.exponents == destination.exponents
    }

    /// Explain why two phrases cannot be converted, naming both reduced signatures
    pub fn explain_incompatibility(
        &self,
        source: &CompiledPhrase,
        destination: &CompiledPhrase,
    ) -> String {
        format!(
            "\"{}\" is {} but \"{}\" is {}",
            source.phrase,
            describe(&source.exponents),
            destination.phrase,
            describe(&destination.exponents)
        )
    }

    /// Index into the temperature offset table, for a lone bare temperature scale
    fn temperature_scale(&self, phrase: &CompiledPhrase) -> Option<usize> {
        let [term] = phrase.terms.as_slice() else {
            return None;
        };
        if term.exponent != 1 || term.prefix != 1.0 {
            return None;
        }
        match self.units[term.unit].key.as_str() {
            table::CELSIUS => Some(0),
            table::FAHRENHEIT => Some(1),
            table::KELVIN => Some(2),
            _ => None,
        }
    }

    /// Conversion coefficients between two phrases
    pub fn conversion_factor_offset(
        &self,
        source: &str,
        destination: &str,
    ) -> Result<Conversion, UnitError> {
        let src = self.compile(source, Side::Source)?;
        let dst = self.compile(destination, Side::Destination)?;
        if !self.compatible(&src, &dst) {
            return Err(UnitError::IncompatibleDimensions {
                from: source.to_string(),
                to: destination.to_string(),
                explanation: self.explain_incompatibility(&src, &dst),
            });
        }

        let factor = src.factor / dst.factor;
        let offset = match (self.temperature_scale(&src), self.temperature_scale(&dst)) {
            (Some(s), Some(d)) => table::TEMPERATURE_OFFSETS[s][d],
            _ => 0.0,
        };
        Ok(Conversion { factor, offset })
    }

    /// Convert `value` from `source` units into `destination` units
    pub fn convert(&self, value: f64, source: &str, destination: &str) -> Result<f64, UnitError> {
        self.conversion_factor_offset(source, destination)
            .map(|c| c.apply(value))
    }

    /// True when both phrases name the same unit up to 1e-5
    pub fn equivalent(&self, units1: &str, units2: &str) -> bool {
        self.conversion_factor_offset(units1, units2)
            .is_ok_and(|c| c.is_identity(EQUIVALENCE_TOLERANCE))
    }
}
