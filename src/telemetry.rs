//! Diagnostic logging
//!
//! Operator output goes to stdout; `tracing` diagnostics go to stderr at a
//! level chosen by `-v` flags.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Level name for a `-v` count
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the stderr subscriber. A second call is a no-op.
pub fn init_tracing(verbose: u8) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level_for_verbosity(verbose)))
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    let _ = subscriber.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for_verbosity(0), "warn");
        assert_eq!(level_for_verbosity(1), "info");
        assert_eq!(level_for_verbosity(2), "debug");
        assert_eq!(level_for_verbosity(3), "trace");
        assert_eq!(level_for_verbosity(200), "trace");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_tracing(0);
        init_tracing(2);
    }
}
