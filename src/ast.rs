//! Task and parameter definitions shared by the discovery, binding and resolution stages

use crate::error::TaskError;
use crate::registry::BoundFn;
use serde::Serialize;
use std::fmt;

/// A command discovered from a top-level function declaration.
#[derive(Clone, Serialize)]
pub struct Task {
    pub name: String,
    pub doc: String,
    pub params: Vec<Parameter>,
    /// Handler attached by the binder. `None` means help-only.
    #[serde(skip)]
    pub bound: Option<BoundFn>,
}

impl Task {
    pub fn new(name: impl Into<String>, doc: impl Into<String>, params: Vec<Parameter>) -> Self {
        Self {
            name: name.into(),
            doc: doc.into(),
            params,
            bound: None,
        }
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    /// Parameters bound from flags, in declaration order
    pub fn optional_params(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter().filter(|p| p.optional)
    }

    /// Parameters bound positionally, in declaration order
    pub fn required_params(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter().filter(|p| !p.optional)
    }

    /// Resolved values in declaration order, as handed to the bound function.
    #[must_use]
    pub fn values(&self) -> Vec<Option<ArgValue>> {
        self.params.iter().map(|p| p.value.clone()).collect()
    }

    pub(crate) fn clear_values(&mut self) {
        for param in &mut self.params {
            param.value = None;
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("doc", &self.doc)
            .field("params", &self.params)
            .field("bound", &self.bound.is_some())
            .finish()
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.doc == other.doc && self.params == other.params
    }
}

/// One formal argument of a task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ArgType,
    /// Declared as `Option<T>`: supplied as a flag rather than positionally.
    pub optional: bool,
    #[serde(skip)]
    pub value: Option<ArgValue>,
}

impl Parameter {
    pub fn required(name: impl Into<String>, param_type: ArgType) -> Self {
        Self {
            name: name.into(),
            param_type,
            optional: false,
            value: None,
        }
    }

    pub fn optional(name: impl Into<String>, param_type: ArgType) -> Self {
        Self {
            name: name.into(),
            param_type,
            optional: true,
            value: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    String,
    #[serde(rename = "int")]
    Integer,
    #[serde(rename = "bool")]
    Boolean,
}

const INTEGER_TYPES: &[&str] = &[
    "i8", "i16", "i32", "i64", "isize", "u8", "u16", "u32", "u64", "usize",
];

impl ArgType {
    /// Classify a bare Rust type name (`String`, `i64`, `bool`, ...).
    ///
    /// # Errors
    ///
    /// Returns `TaskError::UnsupportedType` for anything outside the three
    /// primitive kinds.
    pub fn from_rust_type(ty: &str) -> Result<Self, TaskError> {
        match ty {
            "String" => Ok(Self::String),
            "bool" => Ok(Self::Boolean),
            t if INTEGER_TYPES.contains(&t) => Ok(Self::Integer),
            other => Err(TaskError::UnsupportedType {
                ty: other.to_string(),
            }),
        }
    }

    /// Short name used in usage listings
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "int",
            Self::Boolean => "bool",
        }
    }

    /// JSON schema type name used by `--inspect`
    #[must_use]
    pub fn json_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A resolved, typed argument value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    String(String),
    Integer(i64),
    Boolean(bool),
}

impl ArgValue {
    #[must_use]
    pub fn arg_type(&self) -> ArgType {
        match self {
            Self::String(_) => ArgType::String,
            Self::Integer(_) => ArgType::Integer,
            Self::Boolean(_) => ArgType::Boolean,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}
