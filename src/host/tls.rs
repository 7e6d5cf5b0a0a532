//! TLS client setup
//!
//! Builds `rustls` client configurations for the two certificate policies and
//! drives the handshake over a blocking TCP stream.

use std::fs::File;
use std::io::BufReader;
use std::net::TcpStream;
use std::path::Path;
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{
    verify_tls12_signature, verify_tls13_signature, CryptoProvider, WebPkiSupportedAlgorithms,
};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{
    ClientConfig, ClientConnection, DigitallySignedStruct, RootCertStore, SignatureScheme,
    StreamOwned,
};
use tracing::debug;

use crate::config::TlsPolicy;

use super::transport::ConnectError;

/// Blocking TLS stream over TCP
pub type TlsStream = StreamOwned<ClientConnection, TcpStream>;

/// Crypto provider shared by client and mock server
pub fn crypto_provider() -> Arc<CryptoProvider> {
    Arc::new(rustls::crypto::ring::default_provider())
}

/// Build the client configuration for `policy`
pub fn client_config(policy: &TlsPolicy) -> Result<Arc<ClientConfig>, ConnectError> {
    let provider = crypto_provider();
    let builder = ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .map_err(ConnectError::TlsConfig)?;

    let config = match policy {
        TlsPolicy::Insecure => builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert::new(&provider)))
            .with_no_client_auth(),
        TlsPolicy::Verified { ca_cert } => {
            let mut roots = RootCertStore::empty();
            roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            if let Some(path) = ca_cert {
                for cert in load_ca_bundle(path)? {
                    roots.add(cert).map_err(ConnectError::TlsConfig)?;
                }
            }
            debug!(roots = roots.len(), "built TLS trust store");
            builder.with_root_certificates(roots).with_no_client_auth()
        }
    };

    Ok(Arc::new(config))
}

/// Read every certificate from a PEM bundle
pub fn load_ca_bundle(path: &Path) -> Result<Vec<CertificateDer<'static>>, ConnectError> {
    let ca_error = |reason: String| ConnectError::CaBundle {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path).map_err(|e| ca_error(e.to_string()))?;
    let certs = rustls_pemfile::certs(&mut BufReader::new(file))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ca_error(e.to_string()))?;

    if certs.is_empty() {
        return Err(ca_error("no certificates found".to_string()));
    }
    Ok(certs)
}

/// Wrap `tcp` in TLS and complete the handshake.
///
/// `host` is the expected peer identity (SNI and, when verifying, the name
/// checked against the certificate).
pub fn handshake(
    tcp: TcpStream,
    host: &str,
    policy: &TlsPolicy,
) -> Result<TlsStream, ConnectError> {
    let config = client_config(policy)?;
    let server_name = ServerName::try_from(host.to_string()).map_err(|e| {
        ConnectError::InvalidServerName {
            host: host.to_string(),
            reason: e.to_string(),
        }
    })?;

    let conn = ClientConnection::new(config, server_name).map_err(ConnectError::TlsConfig)?;
    let mut stream = StreamOwned::new(conn, tcp);

    while stream.conn.is_handshaking() {
        stream
            .conn
            .complete_io(&mut stream.sock)
            .map_err(|e| ConnectError::Handshake(e.to_string()))?;
    }

    debug!(
        protocol = ?stream.conn.protocol_version(),
        cipher = ?stream.conn.negotiated_cipher_suite().map(|s| s.suite()),
        "TLS handshake complete"
    );
    Ok(stream)
}

/// Accepts any server certificate without chain or hostname checks.
///
/// Handshake signatures are still verified, so the peer must hold the key
/// for the certificate it presents.
#[derive(Debug)]
struct AcceptAnyServerCert {
    algorithms: WebPkiSupportedAlgorithms,
}

impl AcceptAnyServerCert {
    fn new(provider: &CryptoProvider) -> Self {
        Self {
            algorithms: provider.signature_verification_algorithms,
        }
    }
}

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.algorithms.supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_builds_config_for_both_policies() {
        assert!(client_config(&TlsPolicy::Insecure).is_ok());
        assert!(client_config(&TlsPolicy::Verified { ca_cert: None }).is_ok());
    }

    #[test]
    fn test_missing_ca_bundle_is_reported_with_path() {
        let policy = TlsPolicy::Verified {
            ca_cert: Some(PathBuf::from("/nonexistent/bundle.pem")),
        };
        let err = client_config(&policy).unwrap_err();
        assert!(matches!(err, ConnectError::CaBundle { .. }));
        assert!(err.to_string().contains("/nonexistent/bundle.pem"));
    }

    #[test]
    fn test_empty_ca_bundle_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pem");
        std::fs::write(&path, "not a certificate\n").unwrap();

        let err = load_ca_bundle(&path).unwrap_err();
        assert!(err.to_string().contains("no certificates found"));
    }

    #[test]
    fn test_loads_generated_certificate() {
        let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ca.pem");
        std::fs::write(&path, cert.cert.pem()).unwrap();

        let certs = load_ca_bundle(&path).unwrap();
        assert_eq!(certs.len(), 1);
        assert_eq!(certs[0].as_ref(), cert.cert.der().as_ref());
    }
}
