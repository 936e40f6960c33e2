//! Client-Side Components
//!
//! The protocol engine, the authenticated session on top of it, the
//! two-phase object reader, and the transports they run over.

pub mod objects;
pub mod rpc;
pub mod session;
pub mod transport;

pub use objects::{ObjectsReader, CATEGORY_KEY_PREFIX};
pub use rpc::{FailureKind, IdoitError, IdoitResult, JsonRpcClient};
pub use session::{Credentials, IdoitSession};
pub use transport::{HttpConfig, HttpTransport, MockTransport, RecordedCall, Transport, TransportError};
