// SPDX-License-Identifier: PMPL-1.0-or-later
//! Bound query parameters.
//!
//! Literal values never appear in condition text; handlers bind them here and
//! reference them by placeholder name.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

/// A value bound to a named placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamValue {
    /// A UTF-8 string value.
    String(String),
    /// A signed 64-bit integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A boolean value.
    Bool(bool),
    /// An explicit SQL-style NULL.
    Null,
}

impl ParamValue {
    /// The JSON form used when comparing against stored rows.
    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::String(s) => Value::String(s.clone()),
            ParamValue::Int(i) => Value::from(*i),
            ParamValue::Float(v) => Value::from(*v),
            ParamValue::Bool(b) => Value::Bool(*b),
            ParamValue::Null => Value::Null,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::String(s) => write!(f, "\"{}\"", s),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Null => write!(f, "NULL"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

/// Named parameters in binding order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    entries: Vec<(String, ParamValue)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` under a fresh name derived from `hint` and return it.
    ///
    /// Names are `{hint}_{n}` where `n` starts at the number of parameters
    /// already bound, so the same translation order always yields the same
    /// names. Characters of `hint` outside `[A-Za-z0-9_]` become `_`; an
    /// empty hint becomes `param`.
    pub fn bind(&mut self, hint: &str, value: ParamValue) -> String {
        let hint = placeholder_hint(hint);
        let mut ordinal = self.entries.len();
        let mut name = format!("{}_{}", hint, ordinal);
        while self.contains(&name) {
            ordinal += 1;
            name = format!("{}_{}", hint, ordinal);
        }
        trace!(parameter = %name, "Binding parameter");
        self.entries.push((name.clone(), value));
        name
    }

    /// Set `name` explicitly, replacing any previous value under that name.
    pub fn set(&mut self, name: impl Into<String>, value: ParamValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

fn placeholder_hint(hint: &str) -> String {
    if hint.is_empty() {
        return "param".to_string();
    }
    hint.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Order two JSON scalars the way a SQL comparison would.
///
/// Returns `None` when either side is NULL or the types are not comparable,
/// which makes every comparison operator evaluate to false.
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
        },
        _ => None,
    }
}
