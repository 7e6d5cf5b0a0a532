//! Client-side connection and request handling
//!
//! Opens the transport to the server under test and performs the single
//! request/response exchange.

pub mod rpc;
pub mod tls;
pub mod transport;

pub use rpc::{build_request, exchange, request_line, ExchangeError, REQUEST_ID};
pub use transport::{connect, ConnectError, Connection};
