//! Sequential run: connect, announce, send, receive, validate, close.

use std::io::{self, Write};
use std::time::Instant;

use tracing::{info, warn};

use crate::config::HarnessConfig;
use crate::host::rpc::{exchange, request_line};
use crate::host::transport::connect;
use crate::summary::{header_text, outcome_text, RunReport};
use crate::vector::TestVector;

use super::validate::validate_response;
use super::Outcome;

/// Runs the subscribe check once against one server
#[derive(Debug, Clone)]
pub struct Harness {
    config: HarnessConfig,
    vector: TestVector,
}

impl Harness {
    /// Create a harness for `config` checking `vector`
    pub fn new(config: HarnessConfig, vector: TestVector) -> Self {
        Self { config, vector }
    }

    /// Execute one request/response cycle, writing operator lines to `out`.
    ///
    /// Only failures to write to `out` are returned as errors; everything
    /// that can go wrong with the server ends up in the report's outcome.
    pub fn run<W: Write>(&self, out: &mut W) -> io::Result<RunReport> {
        let started = Instant::now();
        let line = request_line(&self.vector)?;
        let report = RunReport::start(&self.config, &self.vector, &line);

        let mut connection = match connect(&self.config) {
            Ok(connection) => connection,
            Err(e) => {
                warn!(endpoint = %self.config.endpoint(), error = %e, "connection failed");
                let outcome = Outcome::ConnectionError {
                    reason: format!("{} connection failed: {}", self.config.transport().kind(), e),
                };
                writeln!(out, "{}", outcome_text(&outcome))?;
                return Ok(report.finish(outcome, started.elapsed()));
            }
        };

        let mut report = RunReport {
            cipher_suite: connection.cipher_suite(),
            ..report
        };

        writeln!(out, "✓ {}", connection.describe())?;
        write!(out, "{}", header_text(&self.config, &self.vector))?;

        let exchanged = exchange(&mut connection, &line);
        connection.close();

        let outcome = match exchanged {
            Ok(raw) => {
                let text = String::from_utf8_lossy(&raw).into_owned();
                writeln!(out, "Response: {}", text.trim_end())?;
                report.response = Some(text);
                validate_response(&raw, self.vector.expected_address)
            }
            Err(e) => {
                warn!(error = %e, "exchange failed");
                Outcome::ConnectionError {
                    reason: e.to_string(),
                }
            }
        };

        writeln!(out, "{}", outcome_text(&outcome))?;
        info!(outcome = ?outcome.kind(), "run complete");
        Ok(report.finish(outcome, started.elapsed()))
    }
}
