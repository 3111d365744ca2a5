use std::fmt;

use clap::{Arg, ArgAction};
use serde::{Deserialize, Serialize};

/// A parsed leaf value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "-"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

/// How clap coerces a field and how its value is read back from the matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// `SetTrue`/`SetFalse` switch, read as [`Value::Bool`].
    Flag,
    /// Occurrence counter, read as [`Value::Int`].
    Count,
    /// Strings; keeps any value parser already set on the arg (e.g. choices).
    #[default]
    Text,
    Integer,
    Float,
}

impl ValueKind {
    /// Installs the action or value parser this kind needs.
    pub(crate) fn configure(self, arg: Arg) -> Arg {
        match self {
            ValueKind::Flag => match arg.get_action() {
                ArgAction::SetTrue | ArgAction::SetFalse => arg,
                _ => arg.action(ArgAction::SetTrue),
            },
            ValueKind::Count => arg.action(ArgAction::Count),
            ValueKind::Text => arg,
            ValueKind::Integer => arg.value_parser(clap::value_parser!(i64)),
            ValueKind::Float => arg.value_parser(clap::value_parser!(f64)),
        }
    }

    /// Reads a raw default string the way clap would coerce it; text that does
    /// not parse is kept as a string.
    pub(crate) fn coerce(self, raw: &str) -> Value {
        let parsed = match self {
            ValueKind::Flag => raw.parse().ok().map(Value::Bool),
            ValueKind::Count | ValueKind::Integer => raw.parse().ok().map(Value::Int),
            ValueKind::Float => raw.parse().ok().map(Value::Float),
            ValueKind::Text => None,
        };
        parsed.unwrap_or_else(|| Value::Str(raw.to_string()))
    }
}
