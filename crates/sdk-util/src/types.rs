use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, SdkUtilError};

/// Text used for the absent marker once a template has been substituted.
pub const ABSENT_MARKER: &str = "null";

/// A loosely typed replacement value.
///
/// Variant order matters for untagged deserialization: booleans and integers
/// must be tried before floats, and everything else falls back to text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => formatter.write_str(text),
            Value::Boolean(flag) => write!(formatter, "{flag}"),
            Value::Integer(number) => write!(formatter, "{number}"),
            Value::Float(number) if number.is_finite() && number.fract() == 0.0 => {
                write!(formatter, "{number}.0")
            }
            Value::Float(number) => write!(formatter, "{number}"),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Boolean(flag)
    }
}

impl From<i32> for Value {
    fn from(number: i32) -> Self {
        Value::Integer(i64::from(number))
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Value::Integer(number)
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Value::Float(number)
    }
}

/// Renders a possibly absent value the way it appears in a formatted template.
pub fn render_value(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        Some(Value::Text(text)) => Cow::Borrowed(text.as_str()),
        Some(other) => Cow::Owned(other.to_string()),
        None => Cow::Borrowed(ABSENT_MARKER),
    }
}

pub type NamedValues = HashMap<String, Option<Value>>;

/// Replacement values for a URI template.
///
/// A JSON or TOML array deserializes to `Positional`, a table or object to
/// `Named`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplacementSet {
    Positional(Vec<Option<Value>>),
    Named(NamedValues),
}

impl ReplacementSet {
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<V>>,
        V: Into<Value>,
    {
        ReplacementSet::Positional(
            values
                .into_iter()
                .map(|value| value.map(Into::into))
                .collect(),
        )
    }

    pub fn named<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        ReplacementSet::Named(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), Some(value.into())))
                .collect(),
        )
    }

    /// Parses a JSON array (positional, `null` is absent) or object (named).
    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(|error| SdkUtilError::JsonParse {
            message: error.to_string(),
        })
    }
}

impl Default for ReplacementSet {
    fn default() -> Self {
        ReplacementSet::Positional(Vec::new())
    }
}
