use core::fmt;

use serde::{Deserialize, Serialize};

use crate::String;

/// A dynamically typed VM value.
///
/// Measurement outcomes, consciousness metrics and arithmetic results are
/// numbers; gene payloads and genome keys are strings; logical instructions
/// produce booleans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
}

impl Value {
    /// Human-readable name of the value's kind, used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Zero, `false` and the empty string are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
        }
    }

    /// Appends the value as plain text: strings verbatim, everything else in
    /// literal form. Used for string concatenation.
    pub fn write_text(&self, out: &mut String) {
        use core::fmt::Write;
        match self {
            Value::Str(s) => out.push_str(s),
            other => {
                // Writing to a String cannot fail.
                let _ = write!(out, "{}", other);
            }
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(String::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

/// Literal representation: integral numbers without a fractional part,
/// strings double-quoted and escaped.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => format_number(f, *n),
            Value::Str(s) => write!(f, "\"{}\"", s.escape_debug()),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

fn format_number(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_nan() {
        write!(f, "nan")
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            write!(f, "inf")
        } else {
            write!(f, "-inf")
        }
    } else if value > -1e15 && value < 1e15 && value == (value as i64) as f64 {
        write!(f, "{}", value as i64)
    } else {
        write!(f, "{}", value)
    }
}
