//! Newline-delimited message reader.

use std::io::{self, BufRead, Read};

/// Read one newline-delimited message.
///
/// Reads until the first `\n` (kept in the returned buffer), end of stream, or
/// `max_bytes`, whichever comes first. Partial reads from the underlying
/// stream are accumulated. An empty buffer means the peer closed before
/// sending anything.
///
/// An abrupt close (`UnexpectedEof`, e.g. TLS without close_notify) ends the
/// message like a clean end of stream, keeping the bytes already read.
pub fn read_message<R: BufRead>(reader: &mut R, max_bytes: usize) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let read = reader
        .by_ref()
        .take(max_bytes as u64)
        .read_until(b'\n', &mut buffer);

    match read {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            tracing::debug!(bytes = buffer.len(), error = %e, "stream ended abruptly");
        }
        Err(e) => return Err(e),
    }

    if buffer.len() >= max_bytes && buffer.last() != Some(&b'\n') {
        tracing::warn!(max_bytes, "message reached size limit before newline");
    }

    Ok(buffer)
}
