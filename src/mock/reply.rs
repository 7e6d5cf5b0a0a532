//! Scripted replies for the mock server

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use serde_json::Value;
use sp_protocol::{RpcErrorObject, RpcRequest, RpcResponse, METHOD_SILENTPAYMENTS_SUBSCRIBE};

use crate::vector::TestVector;

/// Pause between pieces of a chunked reply
const CHUNK_PAUSE: Duration = Duration::from_millis(20);

/// What the mock server does with one connection
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Answer like a correct server holding the BIP 352 vector
    Subscribe,
    /// Success envelope with this result
    Result(Value),
    /// Error envelope with this error object
    Error(RpcErrorObject),
    /// These exact bytes
    Raw(Vec<u8>),
    /// These pieces, written and flushed one at a time
    Chunked(Vec<Vec<u8>>),
    /// No reply; the connection is closed after the request is read
    Close,
    /// These exact bytes, then the socket is dropped without a clean
    /// shutdown (no TLS close_notify)
    Abort(Vec<u8>),
    /// Wait, then run the inner reply
    Delayed(Duration, Box<MockReply>),
}

impl MockReply {
    /// Success envelope carrying a string result
    pub fn address(address: impl Into<String>) -> Self {
        MockReply::Result(Value::String(address.into()))
    }

    /// Split `bytes` into pieces of `size` bytes
    pub fn chunked(bytes: &[u8], size: usize) -> Self {
        MockReply::Chunked(bytes.chunks(size.max(1)).map(<[u8]>::to_vec).collect())
    }

    /// Whether the connection ends with an orderly shutdown
    pub(crate) fn closes_cleanly(&self) -> bool {
        match self {
            MockReply::Abort(_) => false,
            MockReply::Delayed(_, inner) => inner.closes_cleanly(),
            _ => true,
        }
    }

    /// Write the reply for `request` (the raw request line) to `stream`
    pub(crate) fn write_to<W: Write>(&self, request: &[u8], stream: &mut W) -> io::Result<()> {
        match self {
            MockReply::Subscribe => write_line(stream, &subscribe_response(request)),
            MockReply::Result(result) => {
                write_line(stream, &RpcResponse::success(request_id(request), result.clone()))
            }
            MockReply::Error(error) => {
                write_line(stream, &RpcResponse::error(request_id(request), error.clone()))
            }
            MockReply::Raw(bytes) | MockReply::Abort(bytes) => {
                stream.write_all(bytes)?;
                stream.flush()
            }
            MockReply::Chunked(pieces) => {
                for piece in pieces {
                    stream.write_all(piece)?;
                    stream.flush()?;
                    thread::sleep(CHUNK_PAUSE);
                }
                Ok(())
            }
            MockReply::Close => Ok(()),
            MockReply::Delayed(delay, inner) => {
                thread::sleep(*delay);
                inner.write_to(request, stream)
            }
        }
    }
}

fn write_line<W: Write>(stream: &mut W, response: &RpcResponse) -> io::Result<()> {
    let line = response.to_line()?;
    stream.write_all(&line)?;
    stream.flush()
}

/// ID of the request, or `null` when it cannot be parsed
fn request_id(request: &[u8]) -> Value {
    serde_json::from_slice::<Value>(request)
        .ok()
        .and_then(|v| v.get("id").cloned())
        .unwrap_or(Value::Null)
}

/// Response of a server that knows exactly one vector
fn subscribe_response(request: &[u8]) -> RpcResponse {
    let request: RpcRequest = match serde_json::from_slice(request) {
        Ok(request) => request,
        Err(e) => {
            return RpcResponse::error(
                Value::Null,
                RpcErrorObject::new(sp_protocol::ErrorCode::ParseError, e.to_string()),
            )
        }
    };
    let id = Value::from(request.id);

    if request.method != METHOD_SILENTPAYMENTS_SUBSCRIBE {
        return RpcResponse::error(id, RpcErrorObject::method_not_found(&request.method));
    }

    let vector = TestVector::BIP352;
    if request.params != vector.params() {
        return RpcResponse::error(
            id,
            RpcErrorObject::invalid_params("no address known for these keys"),
        );
    }

    RpcResponse::success(id, Value::from(vector.expected_address))
}
