//! i-doit CMDB client
//!
//! Talks to the i-doit JSON-RPC API: authenticates a session, sends single
//! or batched requests, and reads typed objects together with their category
//! data.

pub mod client;
pub mod config;
pub mod mock;
pub mod model;

pub use client::{
    Credentials, FailureKind, HttpTransport, IdoitError, IdoitResult, IdoitSession, JsonRpcClient,
    MockTransport, ObjectsReader, Transport, TransportError,
};
pub use config::{ClientConfig, ConfigError};
pub use idoit_protocol as protocol;
pub use mock::{FailureConfig, MockCmdb, ReplyOrder};
