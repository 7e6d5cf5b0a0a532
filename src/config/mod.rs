//! Harness configuration
//!
//! A [`HarnessConfig`] is assembled once from command-line flags and passed
//! by reference to the connector. It is never mutated after construction.

mod defaults;

pub use defaults::{DEFAULT_HOST, DEFAULT_TCP_PORT, DEFAULT_TLS_PORT, MAX_TIMEOUT_SECONDS};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Transport family, used for reporting and port defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Unencrypted TCP stream
    PlainTcp,
    /// TLS over TCP
    Tls,
}

impl TransportKind {
    /// Port used when none is given
    pub fn default_port(&self) -> u16 {
        match self {
            TransportKind::PlainTcp => DEFAULT_TCP_PORT,
            TransportKind::Tls => DEFAULT_TLS_PORT,
        }
    }

    /// Short label for headers ("TCP" / "TLS")
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::PlainTcp => "TCP",
            TransportKind::Tls => "TLS",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server certificate policy for TLS connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsPolicy {
    /// Accept any certificate and skip hostname checks.
    ///
    /// Only for test servers with self-signed certificates.
    Insecure,
    /// Full chain and hostname validation against the bundled web roots,
    /// plus an optional PEM bundle of extra trust anchors.
    Verified { ca_cert: Option<PathBuf> },
}

impl TlsPolicy {
    /// Whether certificates are checked at all
    pub fn verifies(&self) -> bool {
        matches!(self, TlsPolicy::Verified { .. })
    }
}

/// Transport selection.
///
/// The certificate policy only exists for TLS, so a plain connection can
/// never carry one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    Plain,
    Tls(TlsPolicy),
}

impl Transport {
    /// Transport family
    pub fn kind(&self) -> TransportKind {
        match self {
            Transport::Plain => TransportKind::PlainTcp,
            Transport::Tls(_) => TransportKind::Tls,
        }
    }

    /// Certificate policy, `None` for plain TCP
    pub fn tls_policy(&self) -> Option<&TlsPolicy> {
        match self {
            Transport::Plain => None,
            Transport::Tls(policy) => Some(policy),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("host must not be empty")]
    EmptyHost,

    #[error("port must be in 1..=65535, got 0")]
    ZeroPort,

    #[error("timeout must be in (0, {max}] seconds, got {value:?}")]
    TimeoutOutOfBounds { value: Duration, max: u64 },

    #[error("CA bundle not found: {}", .0.display())]
    CaBundleMissing(PathBuf),
}

/// Immutable run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    host: String,
    port: Option<u16>,
    transport: Transport,
    timeout: Option<Duration>,
}

impl HarnessConfig {
    /// Create a configuration for `host` using `transport` and the default port
    pub fn new(host: impl Into<String>, transport: Transport) -> Self {
        Self {
            host: host.into(),
            port: None,
            transport,
            timeout: None,
        }
    }

    /// Use an explicit port instead of the transport default
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Bound connect, read and write with `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Target host
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Target port, falling back to the transport default
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.transport.kind().default_port())
    }

    /// `host:port` as shown in reports
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port())
    }

    /// Transport selection
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// I/O timeout, `None` keeps the operating system defaults
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Validate the configuration before connecting
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }

        if self.port == Some(0) {
            return Err(ConfigError::ZeroPort);
        }

        if let Some(timeout) = self.timeout {
            if timeout.is_zero() || timeout > Duration::from_secs(MAX_TIMEOUT_SECONDS) {
                return Err(ConfigError::TimeoutOutOfBounds {
                    value: timeout,
                    max: MAX_TIMEOUT_SECONDS,
                });
            }
        }

        if let Some(TlsPolicy::Verified { ca_cert: Some(path) }) = self.transport.tls_policy() {
            if !Path::new(path).is_file() {
                return Err(ConfigError::CaBundleMissing(path.clone()));
            }
        }

        Ok(())
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, Transport::Tls(TlsPolicy::Insecure))
    }
}
