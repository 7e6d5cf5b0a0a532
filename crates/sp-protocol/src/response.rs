//! RPC response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RpcErrorObject;
use crate::JSONRPC_VERSION;

/// JSON-RPC 2.0 response envelope.
///
/// Every field is optional so that a non-conforming server response can still
/// be decoded and classified instead of rejected outright.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    /// Protocol version echoed by the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<Value>,
    /// Request ID echoed from the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Success payload. A `result` key holding `null` decodes as
    /// `Some(Value::Null)`, a missing key as `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error payload, kept verbatim; servers disagree on its shape.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl RpcResponse {
    /// Create a success response.
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: Some(Value::from(JSONRPC_VERSION)),
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Value, error: RpcErrorObject) -> Self {
        Self {
            jsonrpc: Some(Value::from(JSONRPC_VERSION)),
            id: Some(id),
            result: None,
            error: serde_json::to_value(error).ok(),
        }
    }

    /// Decode a response from an already-parsed JSON value.
    ///
    /// Returns `None` unless `value` is a JSON object. Any object decodes,
    /// whatever the types of its members. `null` envelope members count as
    /// absent, except `result`, which is kept as sent.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let member = |key: &str| object.get(key).filter(|v| !v.is_null()).cloned();
        Some(Self {
            jsonrpc: member("jsonrpc"),
            id: member("id"),
            result: object.get("result").cloned(),
            error: member("error"),
        })
    }

    /// The result payload whenever the `result` key is present, `null` included.
    pub fn result_value(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// Whether the envelope declares JSON-RPC 2.0.
    pub fn is_jsonrpc_2(&self) -> bool {
        self.jsonrpc.as_ref().and_then(Value::as_str) == Some(JSONRPC_VERSION)
    }

    /// Serialize to a compact JSON line terminated by a single `\n`.
    pub fn to_line(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}
