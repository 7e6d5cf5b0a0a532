//! Loopback server driving scripted replies

use std::io::{self, BufReader, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::{ServerConfig, ServerConnection, StreamOwned};
use sp_protocol::{read_message, MAX_MESSAGE_BYTES};
use tracing::{debug, warn};

use crate::host::tls::crypto_provider;

use super::reply::MockReply;

/// Read timeout for requests reaching the mock
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Mock server errors
#[derive(Debug, thiserror::Error)]
pub enum MockError {
    #[error("failed to bind mock server: {0}")]
    Bind(#[from] io::Error),

    #[error("failed to generate certificate: {0}")]
    Certificate(#[from] rcgen::Error),

    #[error("TLS configuration error: {0}")]
    Tls(#[from] rustls::Error),
}

/// Self-signed identity served by a TLS mock
struct Identity {
    cert_pem: String,
    config: Arc<ServerConfig>,
}

impl Identity {
    /// Self-signed certificate valid for exactly `names`
    fn generate(names: Vec<String>) -> Result<Self, MockError> {
        let certified = rcgen::generate_simple_self_signed(names)?;
        let cert: CertificateDer<'static> = certified.cert.der().clone();
        let key_der = PrivatePkcs8KeyDer::from(certified.key_pair.serialize_der());
        let key = PrivateKeyDer::Pkcs8(key_der);

        let config = ServerConfig::builder_with_provider(crypto_provider())
            .with_safe_default_protocol_versions()?
            .with_no_client_auth()
            .with_single_cert(vec![cert], key)?;

        Ok(Self {
            cert_pem: certified.cert.pem(),
            config: Arc::new(config),
        })
    }
}

/// Scripted JSON-RPC server on a loopback port
pub struct MockServer {
    addr: SocketAddr,
    cert_pem: Option<String>,
    received: Arc<Mutex<Vec<Vec<u8>>>>,
    handle: Option<JoinHandle<()>>,
}

impl MockServer {
    /// Serve `replies` over plain TCP, one connection each, in order
    pub fn plain(replies: Vec<MockReply>) -> Result<Self, MockError> {
        Self::start(replies, None)
    }

    /// Serve `replies` over TLS with a fresh self-signed certificate for
    /// `localhost` and `127.0.0.1`
    pub fn tls(replies: Vec<MockReply>) -> Result<Self, MockError> {
        Self::tls_for(&["localhost", "127.0.0.1"], replies)
    }

    /// Serve `replies` over TLS with a self-signed certificate valid only for
    /// `names`
    pub fn tls_for(names: &[&str], replies: Vec<MockReply>) -> Result<Self, MockError> {
        let names = names.iter().map(|name| name.to_string()).collect();
        Self::start(replies, Some(Identity::generate(names)?))
    }

    fn start(replies: Vec<MockReply>, identity: Option<Identity>) -> Result<Self, MockError> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        let received = Arc::new(Mutex::new(Vec::new()));
        let cert_pem = identity.as_ref().map(|i| i.cert_pem.clone());
        let tls = identity.map(|i| i.config);

        let log = Arc::clone(&received);
        let handle = thread::Builder::new()
            .name(format!("mock-server-{}", addr.port()))
            .spawn(move || serve(listener, replies, tls, log))?;

        debug!(%addr, tls = cert_pem.is_some(), "mock server listening");
        Ok(Self {
            addr,
            cert_pem,
            received,
            handle: Some(handle),
        })
    }

    /// Bound address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Bound port
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// PEM of the served certificate, TLS mocks only
    pub fn certificate_pem(&self) -> Option<&str> {
        self.cert_pem.as_deref()
    }

    /// Request lines received so far
    pub fn received(&self) -> Vec<Vec<u8>> {
        match self.received.lock() {
            Ok(received) => received.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Wait until every scripted reply was served, then return the requests
    pub fn join(mut self) -> Vec<Vec<u8>> {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("mock server thread panicked");
            }
        }
        self.received()
    }
}

fn serve(
    listener: TcpListener,
    replies: Vec<MockReply>,
    tls: Option<Arc<ServerConfig>>,
    received: Arc<Mutex<Vec<Vec<u8>>>>,
) {
    for reply in replies {
        let stream = match listener.accept() {
            Ok((stream, peer)) => {
                debug!(%peer, "mock accepted connection");
                stream
            }
            Err(e) => {
                warn!(error = %e, "mock accept failed");
                return;
            }
        };

        let served = match &tls {
            None => serve_plain(stream, &reply, &received),
            Some(config) => serve_tls(stream, Arc::clone(config), &reply, &received),
        };
        if let Err(e) = served {
            debug!(error = %e, "mock connection ended with error");
        }
    }
}

fn serve_plain(
    mut stream: TcpStream,
    reply: &MockReply,
    received: &Mutex<Vec<Vec<u8>>>,
) -> io::Result<()> {
    stream.set_read_timeout(Some(REQUEST_TIMEOUT))?;
    respond(&mut stream, reply, received)?;
    if !reply.closes_cleanly() {
        return Ok(());
    }
    stream.shutdown(Shutdown::Both)
}

fn serve_tls(
    tcp: TcpStream,
    config: Arc<ServerConfig>,
    reply: &MockReply,
    received: &Mutex<Vec<Vec<u8>>>,
) -> io::Result<()> {
    tcp.set_read_timeout(Some(REQUEST_TIMEOUT))?;
    let conn = ServerConnection::new(config).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let mut stream = StreamOwned::new(conn, tcp);
    while stream.conn.is_handshaking() {
        stream.conn.complete_io(&mut stream.sock)?;
    }

    respond(&mut stream, reply, received)?;
    if !reply.closes_cleanly() {
        debug!("dropping TLS connection without close_notify");
        return Ok(());
    }

    stream.conn.send_close_notify();
    while stream.conn.wants_write() {
        stream.conn.write_tls(&mut stream.sock)?;
    }
    stream.sock.shutdown(Shutdown::Both)
}

/// Read one request line, record it, and write the scripted reply
fn respond<S: Read + Write>(
    stream: &mut S,
    reply: &MockReply,
    received: &Mutex<Vec<Vec<u8>>>,
) -> io::Result<()> {
    let request = {
        let mut reader = BufReader::new(&mut *stream);
        read_message(&mut reader, MAX_MESSAGE_BYTES)?
    };
    match received.lock() {
        Ok(mut log) => log.push(request.clone()),
        Err(poisoned) => poisoned.into_inner().push(request.clone()),
    }
    reply.write_to(&request, stream)
}
