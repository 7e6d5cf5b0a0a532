//! Subscribe conformance check
//!
//! Validates a server's `blockchain.silentpayments.subscribe` response against
//! the BIP 352 test vector. Every failure path is an [`Outcome`] value; the
//! check never panics on server misbehavior.

mod runner;
mod validate;

pub use runner::Harness;
pub use validate::validate_response;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::summary::OutcomeKind;

/// Result of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The server returned exactly the expected address
    Success { address: String },
    /// The server returned a different result
    Mismatch { expected: String, actual: String },
    /// Valid JSON without a usable `result`
    ProtocolError {
        detail: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<Value>,
    },
    /// Response bytes were not UTF-8 JSON
    DecodeError { reason: String, raw: String },
    /// Transport failure before or during the exchange
    ConnectionError { reason: String },
}

impl Outcome {
    /// Outcome kind
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Success { .. } => OutcomeKind::Success,
            Outcome::Mismatch { .. } => OutcomeKind::Mismatch,
            Outcome::ProtocolError { .. } => OutcomeKind::ProtocolError,
            Outcome::DecodeError { .. } => OutcomeKind::DecodeError,
            Outcome::ConnectionError { .. } => OutcomeKind::ConnectionError,
        }
    }

    /// Returns true only for an exact match
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}
