//! Request builder and exchange
//!
//! Builds the single subscribe request and performs the one send/receive
//! cycle of a run.

use std::io::{self, BufReader, Read, Write};

use sp_protocol::{read_message, RpcRequest, MAX_MESSAGE_BYTES, METHOD_SILENTPAYMENTS_SUBSCRIBE};
use tracing::debug;

use crate::vector::TestVector;

/// Request ID of the only request sent on a connection
pub const REQUEST_ID: u64 = 1;

/// Exchange errors (the connection failed after it was established)
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("failed to send request: {0}")]
    Send(#[source] io::Error),

    #[error("failed to receive response: {0}")]
    Receive(#[source] io::Error),
}

/// Build the subscribe request for `vector`
pub fn build_request(vector: &TestVector) -> RpcRequest {
    RpcRequest::new(REQUEST_ID, METHOD_SILENTPAYMENTS_SUBSCRIBE, vector.params())
}

/// Exact bytes sent on the wire for `vector`, newline included
pub fn request_line(vector: &TestVector) -> Result<Vec<u8>, serde_json::Error> {
    build_request(vector).to_line()
}

/// Send `line` and read back one newline-delimited response.
///
/// The response is bounded by [`MAX_MESSAGE_BYTES`]; partial reads are
/// accumulated until the newline or end of stream.
pub fn exchange<S: Read + Write>(stream: &mut S, line: &[u8]) -> Result<Vec<u8>, ExchangeError> {
    stream.write_all(line).map_err(ExchangeError::Send)?;
    stream.flush().map_err(ExchangeError::Send)?;
    debug!(bytes = line.len(), "request sent");

    let mut reader = BufReader::new(stream);
    let response = read_message(&mut reader, MAX_MESSAGE_BYTES).map_err(ExchangeError::Receive)?;
    debug!(bytes = response.len(), "response received");
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// In-memory duplex: reads come from `input`, writes land in `output`.
    struct Duplex {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl Duplex {
        fn new(input: &[u8]) -> Self {
            Self {
                input: Cursor::new(input.to_vec()),
                output: Vec::new(),
            }
        }
    }

    impl Read for Duplex {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for Duplex {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct BrokenPipe;

    impl Read for BrokenPipe {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_request_line_matches_wire_format() {
        let line = request_line(&TestVector::BIP352).unwrap();
        let expected = concat!(
            "{\"jsonrpc\":\"2.0\",\"id\":1,",
            "\"method\":\"blockchain.silentpayments.subscribe\",",
            "\"params\":[\"0f694e068028a717f8af6b9411f9a133dd3565258714cc226594b34db90c1f2c\",",
            "\"025cc9856d6f8375350e123978daac200c260cb5b5ae83106cab90484dcd8fcf36\",",
            "709632]}\n"
        );
        assert_eq!(String::from_utf8(line).unwrap(), expected);
    }

    #[test]
    fn test_request_is_deterministic() {
        assert_eq!(
            request_line(&TestVector::BIP352).unwrap(),
            request_line(&TestVector::BIP352).unwrap()
        );
        let request = build_request(&TestVector::BIP352);
        assert_eq!(request.id, REQUEST_ID);
        assert_eq!(request.method, METHOD_SILENTPAYMENTS_SUBSCRIBE);
    }

    #[test]
    fn test_exchange_writes_line_and_reads_one_message() {
        let mut duplex = Duplex::new(b"{\"result\":\"sp1x\"}\n{\"result\":\"extra\"}\n");
        let response = exchange(&mut duplex, b"ping\n").unwrap();
        assert_eq!(duplex.output, b"ping\n");
        assert_eq!(response, b"{\"result\":\"sp1x\"}\n");
    }

    #[test]
    fn test_exchange_bounds_response_size() {
        let mut duplex = Duplex::new(&vec![b'a'; MAX_MESSAGE_BYTES * 2]);
        let response = exchange(&mut duplex, b"ping\n").unwrap();
        assert_eq!(response.len(), MAX_MESSAGE_BYTES);
    }

    #[test]
    fn test_exchange_maps_send_failure() {
        let err = exchange(&mut BrokenPipe, b"ping\n").unwrap_err();
        assert!(matches!(err, ExchangeError::Send(_)));
    }
}
