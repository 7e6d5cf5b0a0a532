//! Silent Payments RPC Protocol Types
//!
//! Defines the JSON-RPC 2.0 envelope spoken between the subscribe check and
//! the server under test. Messages are single JSON objects terminated by a
//! newline.

pub mod error;
pub mod reader;
pub mod request;
pub mod response;

pub use error::{ErrorCode, RpcErrorObject};
pub use reader::read_message;
pub use request::RpcRequest;
pub use response::RpcResponse;

/// JSON-RPC version string carried in every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// Method that derives a silent payments address from scan/spend keys.
pub const METHOD_SILENTPAYMENTS_SUBSCRIBE: &str = "blockchain.silentpayments.subscribe";

/// Upper bound on a single newline-delimited message, in bytes.
pub const MAX_MESSAGE_BYTES: usize = 4096;
