//! i-doit Protocol Types
//!
//! Defines the JSON-RPC envelope, the typed request shapes and the object /
//! category model used by the i-doit CMDB client.

pub mod batch;
pub mod de;
pub mod envelope;
pub mod error;
pub mod model;
pub mod ops;
pub mod request;

pub use batch::{Batch, BatchResponse};
pub use envelope::{JsonRpcRequest, JsonRpcResponse};
pub use error::BatchError;
pub use model::{CategoryId, Dialog, IdoitCategory, IdoitObject, ObjectId};
pub use request::{clean_result, IdoitRequest};

/// JSON-RPC version string sent on every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// Correlation id used for unbatched calls.
pub const SINGLE_REQUEST_ID: &str = "0";

/// Parameter name carrying the API key on every request.
pub const API_KEY_PARAM: &str = "apikey";

/// Auth header names.
pub mod headers {
    pub const USERNAME: &str = "X-RPC-Auth-Username";
    pub const PASSWORD: &str = "X-RPC-Auth-Password";
    pub const SESSION: &str = "X-RPC-Auth-Session";
}
