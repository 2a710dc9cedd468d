//! Method-call envelope types.
//!
//! One request per operation: a [`MethodCall`] naming the fully-qualified
//! remote method plus a positional argument list, answered by a
//! [`MethodReply`] carrying either a single value or a fault list.
//!
//! Argument kinds are fixed by the protocol: string, non-zero integer,
//! ordered sequence of strings, and ordered sequence of string sequences
//! (a table). Anything else is rejected by [`marshal_params`] before any
//! network I/O happens.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{GridviewError, Result};

/// Fully-qualified remote method name, e.g. `"probe.cpu.group-view.addTableRow"`.
pub type MethodName = String;

/// A single method call sent to the monitoring agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MethodCall {
    /// Name of the remote method to invoke
    pub method: MethodName,
    /// Positional, kind-wrapped argument list
    pub params: Vec<CallParam>,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, params: Vec<CallParam>) -> Self {
        MethodCall {
            method: method.into(),
            params,
        }
    }
}

/// A kind-wrapped call argument.
///
/// The wire form is `{"kind": "...", "value": ...}` so the agent never has
/// to guess at argument types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum CallParam {
    String(String),
    Int(i64),
    StringList(Vec<String>),
    Table(Vec<Vec<String>>),
}

/// Converts loose `serde_json::Value` arguments into kind-wrapped params.
///
/// Supported kinds:
/// - string
/// - non-zero integer (a duration in seconds; zero means "absent" and is
///   dropped, a documented quirk of the protocol)
/// - array of strings
/// - array of string arrays (a table)
///
/// Any other kind fails with [`GridviewError::Marshal`]. Callers rely on
/// this check running before any request is issued.
pub fn marshal_params(args: &[Value]) -> Result<Vec<CallParam>> {
    let mut params = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            Value::String(s) => params.push(CallParam::String(s.clone())),
            Value::Number(n) => {
                let n = n.as_i64().ok_or_else(|| {
                    GridviewError::Marshal(format!("unsupported numeric argument: {n}"))
                })?;
                // Zero is indistinguishable from "absent" on the wire.
                if n != 0 {
                    params.push(CallParam::Int(n));
                }
            }
            Value::Array(items) => params.push(marshal_sequence(items)?),
            other => {
                return Err(GridviewError::Marshal(format!(
                    "unsupported argument kind: {}",
                    kind_name(other)
                )))
            }
        }
    }
    Ok(params)
}

fn marshal_sequence(items: &[Value]) -> Result<CallParam> {
    if items.iter().all(|v| v.is_string()) {
        let strings = items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect();
        return Ok(CallParam::StringList(strings));
    }
    if items.iter().all(|v| v.is_array()) {
        let mut table = Vec::with_capacity(items.len());
        for row in items {
            let cells = row.as_array().map(Vec::as_slice).unwrap_or(&[]);
            if !cells.iter().all(|c| c.is_string()) {
                return Err(GridviewError::Marshal(
                    "table rows must contain only strings".into(),
                ));
            }
            table.push(
                cells
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect(),
            );
        }
        return Ok(CallParam::Table(table));
    }
    Err(GridviewError::Marshal(
        "sequence arguments must be all-strings or all-rows".into(),
    ))
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A fault reported by the remote agent, distinct from a transport failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fault {
    pub code: i32,
    pub message: String,
}

/// A reply to a [`MethodCall`].
///
/// A well-formed reply carries at most one positional value; a non-empty
/// fault list always wins over `result`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MethodReply {
    #[serde(default)]
    pub result: Option<ReplyValue>,
    #[serde(default)]
    pub faults: Vec<Fault>,
}

impl MethodReply {
    /// Creates a success reply carrying `value`.
    pub fn success(value: ReplyValue) -> Self {
        MethodReply {
            result: Some(value),
            faults: Vec::new(),
        }
    }

    /// Creates an empty success reply (operations with no return value).
    pub fn empty() -> Self {
        MethodReply {
            result: None,
            faults: Vec::new(),
        }
    }

    /// Creates a fault reply.
    pub fn fault(code: i32, message: impl Into<String>) -> Self {
        MethodReply {
            result: None,
            faults: vec![Fault {
                code,
                message: message.into(),
            }],
        }
    }

    /// Extracts the positional value, turning any fault into an error.
    pub fn into_result(self) -> Result<Option<ReplyValue>> {
        if let Some(fault) = self.faults.into_iter().next() {
            return Err(GridviewError::Fault {
                code: fault.code,
                message: fault.message,
            });
        }
        Ok(self.result)
    }
}

/// The positional value carried by a reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ReplyValue {
    Bool(bool),
    Int(i64),
    Str(String),
    StringList(Vec<String>),
}

impl ReplyValue {
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            ReplyValue::Bool(b) => Ok(*b),
            other => Err(GridviewError::InvalidReply(format!(
                "expected boolean, got {other:?}"
            ))),
        }
    }

    pub fn as_int(&self) -> Result<i64> {
        match self {
            ReplyValue::Int(n) => Ok(*n),
            other => Err(GridviewError::InvalidReply(format!(
                "expected integer, got {other:?}"
            ))),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            ReplyValue::Str(s) => Ok(s),
            other => Err(GridviewError::InvalidReply(format!(
                "expected string, got {other:?}"
            ))),
        }
    }

    pub fn into_string_list(self) -> Result<Vec<String>> {
        match self {
            ReplyValue::StringList(items) => Ok(items),
            other => Err(GridviewError::InvalidReply(format!(
                "expected string list, got {other:?}"
            ))),
        }
    }
}
