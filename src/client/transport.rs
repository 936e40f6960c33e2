//! Transport Layer for the JSON-RPC Client
//!
//! Abstracts the HTTP connection for testability. Provides:
//! - Transport trait: send request bytes with auth headers, get reply bytes
//! - MockTransport: in-process mock CMDB for unit tests
//! - HttpTransport: blocking HTTP POST for production

use std::sync::Mutex;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::mock::MockCmdb;

/// Transport trait for JSON-RPC communication
pub trait Transport: Send + Sync {
    /// POST one encoded JSON-RPC payload (single envelope or array) and
    /// return the raw reply body.
    fn send(&self, headers: &[(&'static str, String)], body: &[u8]) -> Result<Vec<u8>, TransportError>;
}

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection timeout")]
    ConnectionTimeout,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::ConnectionTimeout
        } else if e.is_connect() {
            TransportError::ConnectionFailed(e.to_string())
        } else {
            TransportError::Http(e.to_string())
        }
    }
}

/// One call observed by [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl RecordedCall {
    /// Value of a header, if it was sent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Header names in the order they were sent.
    pub fn header_names(&self) -> Vec<&str> {
        self.headers.iter().map(|(n, _)| n.as_str()).collect()
    }
}

/// Mock transport for testing - connects directly to MockCmdb in-process
pub struct MockTransport {
    cmdb: MockCmdb,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    /// Create a new mock transport with a fresh mock CMDB
    pub fn new() -> Self {
        Self::with_cmdb(MockCmdb::new())
    }

    /// Create a mock transport with a pre-configured CMDB
    pub fn with_cmdb(cmdb: MockCmdb) -> Self {
        Self {
            cmdb,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Get a reference to the underlying mock CMDB for test configuration
    pub fn cmdb(&self) -> &MockCmdb {
        &self.cmdb
    }

    /// Every call made so far, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls.lock().ok().and_then(|c| c.last().cloned())
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    fn send(&self, headers: &[(&'static str, String)], body: &[u8]) -> Result<Vec<u8>, TransportError> {
        let request: Value = serde_json::from_slice(body)?;

        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                headers: headers.iter().map(|(n, v)| (n.to_string(), v.clone())).collect(),
                body: request.clone(),
            });
        }

        let reply = self.cmdb.handle(headers, &request);
        Ok(serde_json::to_vec(&reply)?)
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// JSON-RPC endpoint, e.g. `https://cmdb.example.com/src/jsonrpc.php`
    pub url: String,
    /// Whole-request timeout in seconds
    pub timeout_seconds: u64,
    /// Connection timeout in seconds
    pub connect_timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_seconds: 60,
            connect_timeout_seconds: 10,
        }
    }
}

impl From<&ClientConfig> for HttpConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            url: config.url.clone(),
            timeout_seconds: config.timeout_seconds,
            ..Self::default()
        }
    }
}

/// HTTP transport for production use
///
/// POSTs each payload to the configured endpoint. No retries; a non-2xx
/// status is an error.
pub struct HttpTransport {
    config: HttpConfig,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration
    pub fn new(config: HttpConfig) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }
}

impl Transport for HttpTransport {
    fn send(&self, headers: &[(&'static str, String)], body: &[u8]) -> Result<Vec<u8>, TransportError> {
        let mut request = self
            .client
            .post(&self.config.url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");

        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        let response = request.body(body.to_vec()).send()?;
        let status = response.status();
        let bytes = response.bytes()?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        Ok(bytes.to_vec())
    }
}
