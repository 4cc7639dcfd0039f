use std::fmt;

use serde::{Deserialize, Serialize};

/// A single template variable.
///
/// Variant order matters for untagged deserialization: `true` must not become
/// a string and `2` must not become a float.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for TemplateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateValue::Bool(b) => write!(f, "{}", b),
            TemplateValue::Integer(i) => write!(f, "{}", i),
            TemplateValue::Float(x) => write!(f, "{}", x),
            TemplateValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for TemplateValue {
    fn from(s: &str) -> Self {
        TemplateValue::String(s.to_string())
    }
}

impl From<String> for TemplateValue {
    fn from(s: String) -> Self {
        TemplateValue::String(s)
    }
}

impl From<u32> for TemplateValue {
    fn from(n: u32) -> Self {
        TemplateValue::Integer(i64::from(n))
    }
}

impl From<i64> for TemplateValue {
    fn from(n: i64) -> Self {
        TemplateValue::Integer(n)
    }
}

impl From<bool> for TemplateValue {
    fn from(b: bool) -> Self {
        TemplateValue::Bool(b)
    }
}
