//! JSON-RPC error objects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Standard JSON-RPC 2.0 error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid JSON was received.
    ParseError,
    /// The JSON sent is not a valid request object.
    InvalidRequest,
    /// The method does not exist or is not available.
    MethodNotFound,
    /// Invalid method parameters.
    InvalidParams,
    /// Internal server error.
    InternalError,
}

impl ErrorCode {
    /// Numeric code as carried on the wire.
    pub fn code(&self) -> i64 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
        }
    }

    /// Map a wire code back to a standard code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            -32700 => Some(Self::ParseError),
            -32600 => Some(Self::InvalidRequest),
            -32601 => Some(Self::MethodNotFound),
            -32602 => Some(Self::InvalidParams),
            -32603 => Some(Self::InternalError),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::InvalidRequest => write!(f, "INVALID_REQUEST"),
            Self::MethodNotFound => write!(f, "METHOD_NOT_FOUND"),
            Self::InvalidParams => write!(f, "INVALID_PARAMS"),
            Self::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    /// Numeric error code.
    pub code: i64,
    /// Human-readable, single-line error message.
    pub message: String,
    /// Optional machine-readable details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcErrorObject {
    /// Create a new error object with a standard code.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }

    /// Create a new error object with additional data.
    pub fn with_data(code: ErrorCode, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: Some(data),
        }
    }

    /// Create a METHOD_NOT_FOUND error.
    pub fn method_not_found(method: &str) -> Self {
        Self::with_data(
            ErrorCode::MethodNotFound,
            format!("unknown method: {}", method),
            serde_json::json!({ "method": method }),
        )
    }

    /// Create an INVALID_PARAMS error.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParams, message)
    }

    /// Standard code for this error, if it is one.
    pub fn standard_code(&self) -> Option<ErrorCode> {
        ErrorCode::from_code(self.code)
    }
}

impl fmt::Display for RpcErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.standard_code() {
            Some(code) => write!(f, "{} ({}): {}", code, self.code, self.message),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

impl std::error::Error for RpcErrorObject {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trips_through_wire_value() {
        for code in [
            ErrorCode::ParseError,
            ErrorCode::InvalidRequest,
            ErrorCode::MethodNotFound,
            ErrorCode::InvalidParams,
            ErrorCode::InternalError,
        ] {
            assert_eq!(ErrorCode::from_code(code.code()), Some(code));
        }
        assert_eq!(ErrorCode::from_code(-1), None);
    }

    #[test]
    fn test_display_includes_symbolic_code_when_known() {
        let err = RpcErrorObject::method_not_found("blockchain.silentpayments.subscribe");
        assert_eq!(
            err.to_string(),
            "METHOD_NOT_FOUND (-32601): unknown method: blockchain.silentpayments.subscribe"
        );

        let custom = RpcErrorObject {
            code: 42,
            message: "scan key rejected".to_string(),
            data: None,
        };
        assert_eq!(custom.to_string(), "42: scan key rejected");
    }
}
