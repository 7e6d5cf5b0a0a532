//! Outcome taxonomy and stable exit codes

use serde::{Deserialize, Serialize};

/// Outcome kind - categorizes the result of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    /// Result matched the expected address
    Success,
    /// Result differed from the expected address
    Mismatch,
    /// Valid JSON without a usable result
    ProtocolError,
    /// Response was not UTF-8 JSON
    DecodeError,
    /// Transport or handshake failure
    ConnectionError,
}

impl OutcomeKind {
    /// Get the stable exit code for this outcome
    pub fn exit_code(&self) -> ExitCode {
        match self {
            OutcomeKind::Success => ExitCode::Success,
            OutcomeKind::Mismatch => ExitCode::Mismatch,
            OutcomeKind::ProtocolError => ExitCode::ProtocolError,
            OutcomeKind::DecodeError => ExitCode::DecodeError,
            OutcomeKind::ConnectionError => ExitCode::ConnectionFailed,
        }
    }

    /// Marker line prefix shown to the operator
    pub fn marker(&self) -> &'static str {
        match self {
            OutcomeKind::Success => "✓ SUCCESS",
            OutcomeKind::Mismatch => "✗ MISMATCH",
            OutcomeKind::ProtocolError => "✗ PROTOCOL ERROR",
            OutcomeKind::DecodeError => "✗ DECODE ERROR",
            OutcomeKind::ConnectionError => "✗ CONNECTION FAILED",
        }
    }
}

/// Stable exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ExitCode {
    /// Result matched the test vector
    Success = 0,
    /// Built-in vector invalid or report output failed
    Internal = 1,
    /// Invalid flags or configuration
    Usage = 2,
    /// Result did not match
    Mismatch = 10,
    /// Server returned no result
    ProtocolError = 11,
    /// Response could not be decoded
    DecodeError = 12,
    /// Connection or TLS handshake failed
    ConnectionFailed = 20,
}

impl ExitCode {
    /// Get the integer value of the exit code
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }
}
