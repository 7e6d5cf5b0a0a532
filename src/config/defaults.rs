//! Built-in defaults
//!
//! Hardcoded defaults for values not given on the command line.

/// Default target host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port for TLS connections
pub const DEFAULT_TLS_PORT: u16 = 57002;

/// Default port for plain TCP connections
pub const DEFAULT_TCP_PORT: u16 = 57001;

/// Largest accepted I/O timeout in seconds
pub const MAX_TIMEOUT_SECONDS: u64 = 300;
