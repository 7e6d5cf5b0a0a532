//! Silent Payments subscribe check CLI
//!
//! Entry point for the `sp-subscribe-check` command-line tool.

use clap::Parser;
use sp_subscribe_check::config::{ConfigError, DEFAULT_HOST};
use sp_subscribe_check::telemetry::init_tracing;
use sp_subscribe_check::{ExitCode, Harness, HarnessConfig, TestVector, TlsPolicy, Transport};
use std::io;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "sp-subscribe-check")]
#[command(
    about = "Check blockchain.silentpayments.subscribe against the BIP 352 test vector",
    version
)]
struct Cli {
    /// Server host
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Server port (default: 57002 for TLS, 57001 for plain TCP)
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    port: Option<u16>,

    /// Use plain TCP instead of TLS
    #[arg(long)]
    plain_tcp: bool,

    /// Verify the server certificate (TLS only; disabled by default for test servers)
    #[arg(long)]
    verify_cert: bool,

    /// Extra PEM CA bundle to trust when verifying
    #[arg(long, value_name = "PATH", requires = "verify_cert")]
    ca_cert: Option<PathBuf>,

    /// Connect/read/write timeout in seconds (default: system defaults)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Print the run report as JSON instead of the human-readable report
    #[arg(long)]
    json: bool,

    /// Increase diagnostic output on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(ExitCode::Usage.as_i32());
        }
    };

    let vector = TestVector::BIP352;
    if let Err(e) = vector.validate() {
        eprintln!("Built-in test vector is invalid: {}", e);
        process::exit(ExitCode::Internal.as_i32());
    }

    let harness = Harness::new(config, vector);
    let report = if cli.json {
        harness.run(&mut io::sink())
    } else {
        harness.run(&mut io::stdout().lock())
    };

    let report = match report {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error writing report: {}", e);
            process::exit(ExitCode::Internal.as_i32());
        }
    };

    if cli.json {
        match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing report: {}", e);
                process::exit(ExitCode::Internal.as_i32());
            }
        }
    }

    process::exit(report.exit_code().as_i32());
}

fn build_config(cli: &Cli) -> Result<HarnessConfig, ConfigError> {
    let transport = if cli.plain_tcp {
        if cli.verify_cert {
            tracing::warn!("--verify-cert has no effect with --plain-tcp");
        }
        Transport::Plain
    } else if cli.verify_cert {
        Transport::Tls(TlsPolicy::Verified {
            ca_cert: cli.ca_cert.clone(),
        })
    } else {
        Transport::Tls(TlsPolicy::Insecure)
    };

    let mut config = HarnessConfig::new(cli.host.clone(), transport);
    if let Some(port) = cli.port {
        config = config.with_port(port);
    }
    if let Some(seconds) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(seconds));
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["sp-subscribe-check"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_select_insecure_tls() {
        let config = build_config(&parse(&[])).unwrap();
        assert_eq!(config.host(), "127.0.0.1");
        assert_eq!(config.port(), 57002);
        assert_eq!(config.transport(), &Transport::Tls(TlsPolicy::Insecure));
    }

    #[test]
    fn test_plain_tcp_uses_plain_default_port() {
        let config = build_config(&parse(&["--plain-tcp"])).unwrap();
        assert_eq!(config.port(), 57001);
        assert_eq!(config.transport(), &Transport::Plain);
    }

    #[test]
    fn test_verify_cert_is_ignored_for_plain_tcp() {
        let config = build_config(&parse(&["--plain-tcp", "--verify-cert"])).unwrap();
        assert_eq!(config.transport(), &Transport::Plain);
    }

    #[test]
    fn test_explicit_port_and_timeout() {
        let config =
            build_config(&parse(&["--host", "electrum.local", "--port", "50002", "--timeout", "5"]))
                .unwrap();
        assert_eq!(config.endpoint(), "electrum.local:50002");
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_ca_cert_requires_verify_cert() {
        let result = Cli::try_parse_from(["sp-subscribe-check", "--ca-cert", "ca.pem"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_port_zero_is_rejected_by_parser() {
        let result = Cli::try_parse_from(["sp-subscribe-check", "--port", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_timeout_is_a_config_error() {
        let err = build_config(&parse(&["--timeout", "0"])).unwrap_err();
        assert!(matches!(err, ConfigError::TimeoutOutOfBounds { .. }));
    }
}
