//! RPC request types.

use serde::{Deserialize, Serialize};

use crate::JSONRPC_VERSION;

/// JSON-RPC 2.0 request envelope.
///
/// Field order is the serialization order: `jsonrpc`, `id`, `method`, `params`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Always "2.0".
    pub jsonrpc: String,
    /// Request ID echoed back by the server.
    pub id: u64,
    /// Method name.
    pub method: String,
    /// Positional parameters.
    pub params: serde_json::Value,
}

impl RpcRequest {
    /// Create a request for `method` with positional `params`.
    pub fn new(id: u64, method: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }

    /// Serialize to a compact JSON line terminated by a single `\n`.
    pub fn to_line(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_line_is_compact_and_newline_terminated() {
        let request = RpcRequest::new(1, "server.ping", json!([]));
        let line = request.to_line().unwrap();
        assert_eq!(
            line,
            b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"server.ping\",\"params\":[]}\n"
        );
        assert_eq!(line.iter().filter(|b| **b == b'\n').count(), 1);
    }
}
