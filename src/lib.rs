//! Silent Payments subscribe check
//!
//! Connects to a server over plain TCP or TLS, sends one
//! `blockchain.silentpayments.subscribe` request carrying the BIP 352 test
//! vector, and checks that the returned address matches exactly.

pub mod config;
pub mod conformance;
pub mod host;
pub mod mock;
pub mod summary;
pub mod telemetry;
pub mod vector;

pub use config::{ConfigError, HarnessConfig, TlsPolicy, Transport, TransportKind};
pub use conformance::{validate_response, Harness, Outcome};
pub use host::{connect, ConnectError, Connection};
pub use summary::{ExitCode, OutcomeKind, RunReport};
pub use vector::TestVector;
