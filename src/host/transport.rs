//! Connector
//!
//! Opens the byte stream to the server under test: plain TCP, or TCP wrapped
//! in TLS. One connection per run; it is closed explicitly with
//! [`Connection::close`] or released on drop.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::{HarnessConfig, Transport, TransportKind};

use super::tls::{self, TlsStream};

/// Connection errors. Any of these ends the run before a request is sent.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    #[error("timed out connecting to {endpoint} after {timeout:?}")]
    Timeout { endpoint: String, timeout: Duration },

    #[error("invalid TLS server name '{host}': {reason}")]
    InvalidServerName { host: String, reason: String },

    #[error("TLS configuration error: {0}")]
    TlsConfig(rustls::Error),

    #[error("failed to load CA bundle {}: {reason}", .path.display())]
    CaBundle { path: PathBuf, reason: String },

    #[error("TLS handshake failed: {0}")]
    Handshake(String),
}

/// An open connection to the server under test
#[derive(Debug)]
pub enum Connection {
    Plain(TcpStream),
    Tls(Box<TlsStream>),
}

impl Connection {
    /// Transport family of this connection
    pub fn kind(&self) -> TransportKind {
        match self {
            Connection::Plain(_) => TransportKind::PlainTcp,
            Connection::Tls(_) => TransportKind::Tls,
        }
    }

    /// Negotiated cipher suite name, TLS only
    pub fn cipher_suite(&self) -> Option<String> {
        match self {
            Connection::Plain(_) => None,
            Connection::Tls(stream) => stream
                .conn
                .negotiated_cipher_suite()
                .map(|suite| format!("{:?}", suite.suite())),
        }
    }

    /// Operator-facing line announcing the established connection
    pub fn describe(&self) -> String {
        match self {
            Connection::Plain(_) => "Plain TCP connection established".to_string(),
            Connection::Tls(_) => format!(
                "TLS connection established (cipher: {})",
                self.cipher_suite().unwrap_or_else(|| "unknown".to_string())
            ),
        }
    }

    /// Address of the connected peer
    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        match self {
            Connection::Plain(stream) => stream.peer_addr(),
            Connection::Tls(stream) => stream.sock.peer_addr(),
        }
    }

    /// Close the connection, sending a TLS close_notify first when encrypted
    pub fn close(self) {
        match self {
            Connection::Plain(stream) => {
                if let Err(e) = stream.shutdown(Shutdown::Both) {
                    debug!(error = %e, "shutdown after close");
                }
            }
            Connection::Tls(mut stream) => {
                stream.conn.send_close_notify();
                while stream.conn.wants_write() {
                    if let Err(e) = stream.conn.write_tls(&mut stream.sock) {
                        debug!(error = %e, "failed to flush close_notify");
                        break;
                    }
                }
                if let Err(e) = stream.sock.shutdown(Shutdown::Both) {
                    debug!(error = %e, "shutdown after close");
                }
            }
        }
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Connection::Plain(stream) => stream.read(buf),
            Connection::Tls(stream) => stream.read(buf),
        }
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Connection::Plain(stream) => stream.write(buf),
            Connection::Tls(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Connection::Plain(stream) => stream.flush(),
            Connection::Tls(stream) => stream.flush(),
        }
    }
}

/// Connect to the configured endpoint.
///
/// No retries: the first failure is returned.
pub fn connect(config: &HarnessConfig) -> Result<Connection, ConnectError> {
    let tcp = open_tcp(config)?;

    let connection = match config.transport() {
        Transport::Plain => Connection::Plain(tcp),
        Transport::Tls(policy) => {
            Connection::Tls(Box::new(tls::handshake(tcp, config.host(), policy)?))
        }
    };

    info!(
        endpoint = %config.endpoint(),
        peer = ?connection.peer_addr().ok(),
        transport = %connection.kind(),
        cipher = connection.cipher_suite().as_deref().unwrap_or("-"),
        "connected"
    );
    Ok(connection)
}

fn open_tcp(config: &HarnessConfig) -> Result<TcpStream, ConnectError> {
    let endpoint = config.endpoint();
    let addrs: Vec<SocketAddr> = (config.host(), config.port())
        .to_socket_addrs()
        .map_err(|source| ConnectError::Resolve {
            host: config.host().to_string(),
            source,
        })?
        .collect();

    if addrs.is_empty() {
        return Err(ConnectError::Resolve {
            host: config.host().to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no addresses returned"),
        });
    }

    let mut last_error = None;
    for addr in &addrs {
        debug!(%addr, "connecting");
        let attempt = match config.timeout() {
            Some(timeout) => TcpStream::connect_timeout(addr, timeout),
            None => TcpStream::connect(addr),
        };
        match attempt {
            Ok(stream) => {
                stream
                    .set_read_timeout(config.timeout())
                    .and_then(|_| stream.set_write_timeout(config.timeout()))
                    .and_then(|_| stream.set_nodelay(true))
                    .map_err(|source| ConnectError::Connect {
                        endpoint: endpoint.clone(),
                        source,
                    })?;
                return Ok(stream);
            }
            Err(e) => {
                debug!(%addr, error = %e, "connect attempt failed");
                last_error = Some(e);
            }
        }
    }

    let source = last_error
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no address attempted"));
    match (source.kind(), config.timeout()) {
        (io::ErrorKind::TimedOut, Some(timeout)) => {
            Err(ConnectError::Timeout { endpoint, timeout })
        }
        _ => Err(ConnectError::Connect { endpoint, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TlsPolicy;
    use std::net::TcpListener;

    fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        port
    }

    #[test]
    fn test_plain_connect_to_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let config = HarnessConfig::new("127.0.0.1", Transport::Plain).with_port(port);
        let connection = connect(&config).unwrap();
        assert_eq!(connection.kind(), TransportKind::PlainTcp);
        assert_eq!(connection.describe(), "Plain TCP connection established");
        assert!(connection.cipher_suite().is_none());
        assert_eq!(connection.peer_addr().unwrap().port(), port);
        connection.close();
    }

    #[test]
    fn test_refused_connection_is_connect_error() {
        let config = HarnessConfig::new("127.0.0.1", Transport::Plain)
            .with_port(closed_port())
            .with_timeout(Duration::from_secs(5));
        let err = connect(&config).unwrap_err();
        assert!(matches!(err, ConnectError::Connect { .. }), "got {:?}", err);
        assert!(err.to_string().contains("127.0.0.1"));
    }

    #[test]
    fn test_unresolvable_host_is_resolve_error() {
        let config = HarnessConfig::new("host.invalid", Transport::Plain).with_port(57001);
        let err = connect(&config).unwrap_err();
        assert!(matches!(err, ConnectError::Resolve { .. }), "got {:?}", err);
    }

    #[test]
    fn test_tls_handshake_against_plain_peer_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let peer = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 512];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(b"this is not tls\n");
        });

        let config = HarnessConfig::new("127.0.0.1", Transport::Tls(TlsPolicy::Insecure))
            .with_port(port)
            .with_timeout(Duration::from_secs(5));
        let err = connect(&config).unwrap_err();
        assert!(matches!(err, ConnectError::Handshake(_)), "got {:?}", err);
        peer.join().unwrap();
    }
}
