//! Run report (JSON form of a single run)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;

use crate::config::{HarnessConfig, TransportKind};
use crate::conformance::Outcome;
use crate::vector::TestVector;
use sp_protocol::METHOD_SILENTPAYMENTS_SUBSCRIBE;

use super::failure::{ExitCode, OutcomeKind};

/// Schema version for run reports
pub const RUN_REPORT_SCHEMA_VERSION: u32 = 1;

/// Schema identifier for run reports
pub const RUN_REPORT_SCHEMA_ID: &str = "sp-subscribe-check/run_report@1";

/// Report for one request/response cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// Run identifier (ULID)
    pub run_id: String,

    /// When the run started
    pub created_at: DateTime<Utc>,

    /// Target `host:port`
    pub endpoint: String,

    /// Transport used
    pub transport: TransportKind,

    /// Whether the server certificate was verified (TLS only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_verification: Option<bool>,

    /// Negotiated cipher suite (TLS only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cipher_suite: Option<String>,

    /// Method under test
    pub method: String,

    /// Address the server must return
    pub expected_address: String,

    /// SHA-256 of the exact request line
    pub request_sha256: String,

    /// Raw response text, if any was received
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,

    /// Outcome kind
    pub kind: OutcomeKind,

    /// Outcome with detail
    pub outcome: Outcome,

    /// Whether the run passed
    pub passed: bool,

    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

impl RunReport {
    /// Start a report for `config`/`vector`; `request_line` is hashed as sent
    pub fn start(config: &HarnessConfig, vector: &TestVector, request_line: &[u8]) -> Self {
        Self {
            schema_version: RUN_REPORT_SCHEMA_VERSION,
            schema_id: RUN_REPORT_SCHEMA_ID.to_string(),
            run_id: ulid::Ulid::new().to_string(),
            created_at: Utc::now(),
            endpoint: config.endpoint(),
            transport: config.transport().kind(),
            certificate_verification: config.transport().tls_policy().map(|p| p.verifies()),
            cipher_suite: None,
            method: METHOD_SILENTPAYMENTS_SUBSCRIBE.to_string(),
            expected_address: vector.expected_address.to_string(),
            request_sha256: hex::encode(Sha256::digest(request_line)),
            response: None,
            kind: OutcomeKind::ConnectionError,
            outcome: Outcome::ConnectionError {
                reason: "not connected".to_string(),
            },
            passed: false,
            duration_ms: 0,
        }
    }

    /// Record the final outcome and elapsed time
    pub fn finish(mut self, outcome: Outcome, elapsed: Duration) -> Self {
        self.kind = outcome.kind();
        self.passed = outcome.is_success();
        self.outcome = outcome;
        self.duration_ms = elapsed.as_millis() as u64;
        self
    }

    /// Exit code for the recorded outcome
    pub fn exit_code(&self) -> ExitCode {
        self.kind.exit_code()
    }

    /// Convert to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
