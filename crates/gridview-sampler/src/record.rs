//! Typed row data and cell formatting.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

/// A single field value. The protocol renders everything to strings; this
/// enum exists so delta computation can tell numbers from the rest.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Time(DateTime<Utc>),
}

impl Value {
    /// Numeric view of the value, used by rate computation. Only integers
    /// and floats convert; everything else is non-numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "boolean",
            Value::Time(_) => "timestamp",
        }
    }

    /// Whether two values share an underlying type for delta purposes.
    /// Integers and floats are interchangeable (both numeric).
    pub(crate) fn compatible_with(&self, other: &Value) -> bool {
        self.as_f64().is_some() && other.as_f64().is_some() || self.kind() == other.kind()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Time(t) => f.write_str(&t.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
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

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Time(t)
    }
}

/// An ordered tuple of named field values whose keys match a column set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Record::default()
    }

    /// Appends a field (builder style, declaration order is column order).
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }
}

/// Renders a value against a printf-style format spec.
///
/// Supported verbs: `%v` (generic stringify, the default), `%s`, `%d`,
/// `%f` (six decimals) and `%.Nf`. Anything else falls back to generic
/// stringification, as does a numeric verb applied to a non-numeric value.
pub fn format_value(spec: &str, value: &Value) -> String {
    match spec {
        "" | "%v" | "%s" => value.to_string(),
        "%d" => match value.as_f64() {
            Some(x) => format!("{}", x.trunc() as i64),
            None => value.to_string(),
        },
        _ => match value.as_f64() {
            Some(x) => format_float(spec, x),
            None => value.to_string(),
        },
    }
}

/// Renders an already-numeric cell (e.g. a computed rate) against a spec.
pub fn format_float(spec: &str, x: f64) -> String {
    if spec == "%f" {
        return format!("{x:.6}");
    }
    if let Some(precision) = parse_precision(spec) {
        return format!("{x:.precision$}");
    }
    if spec == "%d" {
        return format!("{}", x.trunc() as i64);
    }
    format!("{x}")
}

fn parse_precision(spec: &str) -> Option<usize> {
    spec.strip_prefix("%.")?.strip_suffix('f')?.parse().ok()
}
