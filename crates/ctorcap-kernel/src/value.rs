//! Argument values and the locals mapping handed to normalisation.
//!
//! Values are JSON-shaped so that every captured call can be written out
//! as a [`ReconstructionState`](crate::state::ReconstructionState) without
//! per-type glue.

use crate::error::SerializableError;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

pub use serde_json::Value;

/// Positional arguments of a call.
pub type Args = Vec<Value>;

/// Keyword arguments of a call. Ordered only for deterministic output.
pub type Kwargs = BTreeMap<String, Value>;

/// A constructor's effective parameter values, keyed by parameter name.
///
/// Variadic slots are stored as a JSON array (positional splat) or a JSON
/// object (keyword splat).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Locals(BTreeMap<String, Value>);

impl Locals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw value bound to `name`.
    pub fn raw(&self, name: &str) -> Result<&Value, SerializableError> {
        self.0
            .get(name)
            .ok_or_else(|| SerializableError::MissingLocal {
                name: name.to_string(),
            })
    }

    /// The value bound to `name`, deserialised into `T`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, SerializableError> {
        let raw = self.raw(name)?;
        serde_json::from_value(raw.clone()).map_err(|err| SerializableError::InvalidLocal {
            name: name.to_string(),
            reason: err.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<BTreeMap<String, Value>> for Locals {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Locals {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Short name of a JSON value's type, for diagnostics.
pub(crate) fn type_label(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
