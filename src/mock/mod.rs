//! Mock Silent Payments Server
//!
//! A scripted JSON-RPC peer for exercising the subscribe check end to end.
//! It listens on a loopback port, serves one connection per scripted reply
//! on a background thread, and records every request line it received.
//!
//! # Replies
//!
//! - `Subscribe`: behave like a correct server for the BIP 352 vector
//! - `Result` / `Error`: fixed JSON-RPC success or error envelopes
//! - `Raw` / `Chunked`: arbitrary bytes, optionally split across writes
//! - `Close`: read the request, then hang up without replying
//! - `Delayed`: wait before running another reply

mod reply;
mod server;

pub use reply::MockReply;
pub use server::{MockError, MockServer};
