//! Operator-facing text

use std::fmt;

use crate::config::HarnessConfig;
use crate::conformance::Outcome;
use crate::vector::TestVector;
use sp_protocol::METHOD_SILENTPAYMENTS_SUBSCRIBE;

/// Width of the rule closing the header
pub const RULE_WIDTH: usize = 70;

/// Header printed before the request is sent.
///
/// Carries everything needed to check the test intent without reading source:
/// transport, endpoint, the three inputs and the expected address.
pub fn header_text(config: &HarnessConfig, vector: &TestVector) -> String {
    Header { config, vector }.to_string()
}

struct Header<'a> {
    config: &'a HarnessConfig,
    vector: &'a TestVector,
}

impl fmt::Display for Header<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Header { config, vector } = self;
        let kind = config.transport().kind();
        let policy = config.transport().tls_policy();

        writeln!(f, "=== BIP 352 Silent Payments {} Test ===", kind)?;
        writeln!(
            f,
            "Testing: {} RPC method over {}",
            METHOD_SILENTPAYMENTS_SUBSCRIBE,
            if policy.is_some() { "TLS" } else { "plain TCP" }
        )?;
        writeln!(f, "Validates: Silent Payments address generation from scan+spend keys")?;
        writeln!(f, "Test Vector Source: {}", vector.source_url)?;
        writeln!(f, "Connecting to: {} ({})", config.endpoint(), kind)?;
        if let Some(policy) = policy {
            writeln!(
                f,
                "Certificate verification: {}",
                if policy.verifies() { "enabled" } else { "disabled" }
            )?;
        }
        writeln!(f, "Scan Private Key:  {}", vector.scan_private_key)?;
        writeln!(f, "Spend Public Key:  {}", vector.spend_public_key)?;
        writeln!(f, "Start Height:      {}", vector.start_height)?;
        writeln!(f, "Expected Address:  {}", vector.expected_address)?;
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))
    }
}

/// Outcome lines printed after validation
pub fn outcome_text(outcome: &Outcome) -> String {
    let marker = outcome.kind().marker();
    match outcome {
        Outcome::Success { .. } => {
            format!("{}: response matches the expected BIP 352 test vector", marker)
        }
        Outcome::Mismatch { expected, actual } => format!(
            "{}: response does not match the expected address\nExpected: {}\nActual:   {}",
            marker, expected, actual
        ),
        Outcome::ProtocolError { detail, error } => match error {
            Some(error) => format!("{}: {}\nServer error: {}", marker, detail, error),
            None => format!("{}: {}", marker, detail),
        },
        Outcome::DecodeError { reason, raw } => {
            format!("{}: {}\nRaw response: {:?}", marker, reason, raw)
        }
        Outcome::ConnectionError { reason } => format!("{}: {}", marker, reason),
    }
}
