//! Named generation parameters.
//!
//! A [`GenerationParams`] is an ordered map from parameter name to
//! [`ParamValue`]. Generators read their parameters through the typed
//! accessors, which fall back to a default when the name is absent and
//! report [`GenerationError::WrongKind`] when the value has another kind.

use crate::error::GenerationError;
use indexmap::IndexMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive bounds of a [`ParamValue::Range`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinMax {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl MinMax {
    /// Bounds `min..=max`.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Draw a value uniformly from the bounds.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max <= self.min {
            self.min
        } else {
            rng.random_range(self.min..=self.max)
        }
    }
}

/// One parameter value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ParamValue {
    /// Integer parameter.
    Int(i64),
    /// Floating-point parameter.
    Float(f64),
    /// Boolean parameter.
    Bool(bool),
    /// Named option, e.g. a direction name.
    Enum(String),
    /// Value drawn from a range when the generator runs.
    Range(MinMax),
}

impl ParamValue {
    /// Kind name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Enum(_) => "enum",
            Self::Range(_) => "range",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Enum(v) => f.write_str(v),
            Self::Range(r) => write!(f, "{}..={}", r.min, r.max),
        }
    }
}

/// Parameters passed to a [`GenerationMethod`](crate::GenerationMethod).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationParams {
    values: IndexMap<String, ParamValue>,
}

impl GenerationParams {
    /// No parameters; every generator falls back to its defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.set(name, value);
        self
    }

    /// Set or replace a parameter.
    pub fn set(&mut self, name: impl Into<String>, value: ParamValue) {
        self.values.insert(name.into(), value);
    }

    /// The raw value of a parameter.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// An integer parameter.
    pub fn int(&self, name: &str, default: i64) -> Result<i64, GenerationError> {
        match self.values.get(name) {
            None => Ok(default),
            Some(ParamValue::Int(v)) => Ok(*v),
            Some(other) => Err(wrong_kind(name, "int", other)),
        }
    }

    /// A boolean parameter.
    pub fn bool(&self, name: &str, default: bool) -> Result<bool, GenerationError> {
        match self.values.get(name) {
            None => Ok(default),
            Some(ParamValue::Bool(v)) => Ok(*v),
            Some(other) => Err(wrong_kind(name, "bool", other)),
        }
    }

    /// An enum parameter, returned as its option name.
    pub fn enum_name<'a>(&'a self, name: &str, default: &'a str) -> Result<&'a str, GenerationError> {
        match self.values.get(name) {
            None => Ok(default),
            Some(ParamValue::Enum(v)) => Ok(v.as_str()),
            Some(other) => Err(wrong_kind(name, "enum", other)),
        }
    }

    /// A numeric parameter. Ranges are sampled with `rng`, integers are
    /// widened.
    pub fn number<R: Rng + ?Sized>(
        &self,
        name: &str,
        default: f64,
        rng: &mut R,
    ) -> Result<f64, GenerationError> {
        match self.values.get(name) {
            None => Ok(default),
            Some(ParamValue::Float(v)) => Ok(*v),
            Some(ParamValue::Int(v)) => Ok(*v as f64),
            Some(ParamValue::Range(r)) => Ok(r.sample(rng)),
            Some(other) => Err(wrong_kind(name, "float or range", other)),
        }
    }

    /// An integer parameter that may also be given as a range, in which
    /// case it is sampled with `rng` and rounded down.
    pub fn int_or_range<R: Rng + ?Sized>(
        &self,
        name: &str,
        default: i64,
        rng: &mut R,
    ) -> Result<i64, GenerationError> {
        match self.values.get(name) {
            Some(ParamValue::Range(r)) => Ok(r.sample(rng).floor() as i64),
            _ => self.int(name, default),
        }
    }
}

fn wrong_kind(name: &str, expected: &'static str, found: &ParamValue) -> GenerationError {
    GenerationError::WrongKind {
        name: name.to_string(),
        expected,
        found: found.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn missing_parameters_use_defaults() {
        let params = GenerationParams::new();
        assert_eq!(params.int("gap", 2).unwrap(), 2);
        assert!(params.bool("expanded", true).unwrap());
        assert_eq!(params.enum_name("direction", "E").unwrap(), "E");
    }

    #[test]
    fn wrong_kind_is_reported() {
        let params = GenerationParams::new().with("gap", ParamValue::Bool(true));
        assert_eq!(
            params.int("gap", 0),
            Err(GenerationError::WrongKind {
                name: "gap".into(),
                expected: "int",
                found: "bool",
            })
        );
    }

    #[test]
    fn ranges_sample_within_bounds() {
        let params = GenerationParams::new().with("fraction", ParamValue::Range(MinMax::new(0.25, 0.5)));
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..50 {
            let v = params.number("fraction", 0.0, &mut rng).unwrap();
            assert!((0.25..=0.5).contains(&v));
        }
    }

    #[test]
    fn degenerate_range_is_its_minimum() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(MinMax::new(2.0, 1.0).sample(&mut rng), 2.0);
    }

    #[test]
    fn params_serialize_in_order() {
        let params = GenerationParams::new()
            .with("b", ParamValue::Int(1))
            .with("a", ParamValue::Enum("NNE".into()));
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(
            json,
            r#"{"b":{"type":"int","value":1},"a":{"type":"enum","value":"NNE"}}"#
        );
        let back: GenerationParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
