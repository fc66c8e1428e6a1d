//! Tool descriptor and invocation envelope types shared by the HTTP and
//! stdio transports.
//!
//! Grounded in the original `base_server.py`: `ToolRequest` aliasing
//! `arguments`/`parameters`, and a uniform `{success, result, error}`
//! response envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool's static description, returned from `/mcp/tools`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// An incoming tool invocation. Accepts either `arguments` or the legacy
/// `parameters` key; `get_args()` returns whichever was supplied.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolRequest {
    pub tool: String,
    #[serde(default)]
    pub arguments: Option<Value>,
    #[serde(default)]
    pub parameters: Option<Value>,
}

impl ToolRequest {
    #[must_use]
    pub fn get_args(&self) -> Value {
        self.arguments
            .clone()
            .or_else(|| self.parameters.clone())
            .unwrap_or(Value::Object(serde_json::Map::new()))
    }
}

/// The uniform response envelope every tool invocation returns, success
/// or failure, never a raw panic or bare HTTP error body.
#[derive(Debug, Clone, Serialize)]
pub struct ToolResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResponse {
    #[must_use]
    pub fn ok(result: Value) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    #[must_use]
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(message.into()),
        }
    }

    /// Build the envelope from a handler's dispatch outcome (§4.1): an
    /// `Err` is always an envelope failure; an `Ok` value that is a JSON
    /// object carrying its own `success` field has that value surface as
    /// the envelope's `success` (and its `error` field, if any, surfaces
    /// too) — otherwise the call is a plain envelope success.
    #[must_use]
    pub fn from_dispatch(outcome: crate::Result<Value>) -> Self {
        match outcome {
            Err(e) => Self::err(e.to_string()),
            Ok(value) => {
                let handler_success = value.as_object().and_then(|obj| obj.get("success")).and_then(Value::as_bool);
                match handler_success {
                    Some(false) => {
                        let error = value
                            .as_object()
                            .and_then(|obj| obj.get("error"))
                            .and_then(Value::as_str)
                            .map(str::to_string);
                        Self {
                            success: false,
                            result: Some(value),
                            error,
                        }
                    }
                    _ => Self::ok(value),
                }
            }
        }
    }
}
