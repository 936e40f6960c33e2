//! JSON-RPC Protocol Engine
//!
//! Wraps typed requests in envelopes, dispatches single or batched calls over
//! a transport, correlates batched replies by id, and maps failures to
//! domain errors.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use idoit_protocol::{
    clean_result, Batch, BatchError, BatchResponse, IdoitRequest, JsonRpcRequest, JsonRpcResponse,
    API_KEY_PARAM, SINGLE_REQUEST_ID,
};

use super::session::Credentials;
use super::transport::{Transport, TransportError};
use crate::config::ConfigError;

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum IdoitError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Failed to encode request <{request}>: {source}")]
    Encode {
        request: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to decode result for request <{request}>: {source}")]
    Decode {
        request: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<BatchError> for IdoitError {
    fn from(e: BatchError) -> Self {
        IdoitError::InvalidArgument(e.to_string())
    }
}

/// Failure kind for exit code mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Bad configuration or arguments (exit code 2)
    Usage = 2,
    /// Network/HTTP failures (exit code 20)
    Transport = 20,
    /// Error replies and malformed exchanges (exit code 30)
    Protocol = 30,
    /// Results that do not match the declared type (exit code 31)
    Decode = 31,
}

impl IdoitError {
    /// Map error to failure kind for exit code
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            IdoitError::InvalidArgument(_) => FailureKind::Usage,
            IdoitError::Config(_) => FailureKind::Usage,
            IdoitError::Encode { .. } => FailureKind::Usage,
            IdoitError::Protocol(_) => FailureKind::Protocol,
            IdoitError::Decode { .. } => FailureKind::Decode,
            IdoitError::Transport(_) => FailureKind::Transport,
        }
    }

    /// Get exit code for this error
    pub fn exit_code(&self) -> i32 {
        self.failure_kind() as i32
    }
}

/// Result type for client operations
pub type IdoitResult<T> = Result<T, IdoitError>;

/// JSON-RPC protocol engine
pub struct JsonRpcClient {
    transport: Arc<dyn Transport>,
    api_key: String,
}

impl JsonRpcClient {
    /// Create a new engine sending every request with `api_key`
    pub fn new(transport: Arc<dyn Transport>, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            api_key: api_key.into(),
        }
    }

    /// Send one request with the fixed id "0".
    pub fn send<R: IdoitRequest>(&self, credentials: &Credentials, request: &R) -> IdoitResult<R::Response> {
        let envelope = self.envelope(SINGLE_REQUEST_ID, request)?;
        debug!(method = request.method(), "sending request");

        let reply = self.exchange(credentials, &envelope)?;
        let response: JsonRpcResponse = serde_json::from_value(reply)
            .map_err(|e| IdoitError::Protocol(format!("Invalid response envelope: {}", e)))?;

        parse_result(response, request)
    }

    /// Send all requests of `batch` in one round trip.
    ///
    /// Results come back in batch order whatever order the replies arrive
    /// in. An empty batch makes no remote call.
    pub fn send_batch<R: IdoitRequest>(
        &self,
        credentials: &Credentials,
        batch: &Batch<R>,
    ) -> IdoitResult<BatchResponse<R::Response>> {
        if batch.is_empty() {
            debug!("empty batch, skipping remote call");
            return Ok(BatchResponse::new());
        }

        let envelopes = batch
            .iter()
            .map(|(key, request)| self.envelope(key, request))
            .collect::<IdoitResult<Vec<_>>>()?;
        debug!(requests = envelopes.len(), "sending batch");

        let replies = match self.exchange(credentials, &envelopes)? {
            Value::Array(replies) => replies,
            other => return Err(non_array_batch_reply(other, batch.len())),
        };

        let mut by_id: HashMap<String, JsonRpcResponse> = HashMap::with_capacity(replies.len());
        for reply in replies {
            let response: JsonRpcResponse = serde_json::from_value(reply)
                .map_err(|e| IdoitError::Protocol(format!("Invalid response envelope: {}", e)))?;
            let id = response.id_str().to_string();

            if !batch.contains_key(&id) {
                return Err(IdoitError::Protocol(format!(
                    "Received response with unknown id <{}>",
                    id
                )));
            }
            if by_id.insert(id.clone(), response).is_some() {
                return Err(IdoitError::Protocol(format!(
                    "Received more than one response for id <{}>",
                    id
                )));
            }
        }

        let mut results = BatchResponse::with_capacity(batch.len());
        for (key, request) in batch.iter() {
            let response = by_id.remove(key).ok_or_else(|| {
                IdoitError::Protocol(format!("No response for id <{}> (request <{:?}>)", key, request))
            })?;
            results.push(key, parse_result(response, request)?);
        }

        Ok(results)
    }

    /// Build the outbound envelope, adding the API key to the parameters.
    fn envelope<R: IdoitRequest>(&self, id: &str, request: &R) -> IdoitResult<JsonRpcRequest> {
        let mut params = request.params().map_err(|source| IdoitError::Encode {
            request: format!("{:?}", request),
            source,
        })?;
        params.insert(API_KEY_PARAM.to_string(), Value::String(self.api_key.clone()));

        Ok(JsonRpcRequest::new(id, request.method(), params))
    }

    /// One transport round trip: encode, send with auth headers, decode JSON.
    fn exchange<T: serde::Serialize>(&self, credentials: &Credentials, payload: &T) -> IdoitResult<Value> {
        let body = serde_json::to_vec(payload).map_err(TransportError::from)?;
        let reply = self.transport.send(&credentials.headers(), &body)?;

        serde_json::from_slice(&reply)
            .map_err(|e| IdoitError::Protocol(format!("Invalid response JSON: {}", e)))
    }
}

/// Turn one reply into the request's typed result, or a protocol error.
fn parse_result<R: IdoitRequest>(response: JsonRpcResponse, request: &R) -> IdoitResult<R::Response> {
    if response.has_error() {
        let error = response.error.as_ref().map(render_error).unwrap_or_default();
        return Err(IdoitError::Protocol(format!(
            "Received error <{}> for request <{:?}>",
            error, request
        )));
    }

    match response.result {
        None | Some(Value::Null) => Err(IdoitError::Protocol(format!(
            "Result is null for request <{:?}>",
            request
        ))),
        Some(raw) => clean_result(request, raw).map_err(|source| IdoitError::Decode {
            request: format!("{:?}", request),
            source,
        }),
    }
}

/// Strings print bare; anything else as compact JSON.
fn render_error(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The server answered a batch with a single envelope, usually a
/// request-level error.
fn non_array_batch_reply(reply: Value, size: usize) -> IdoitError {
    match serde_json::from_value::<JsonRpcResponse>(reply) {
        Ok(response) if response.has_error() => IdoitError::Protocol(format!(
            "Received error <{}> for batch of {} requests",
            response.error.as_ref().map(render_error).unwrap_or_default(),
            size
        )),
        _ => IdoitError::Protocol(format!(
            "Expected an array of responses for batch of {} requests",
            size
        )),
    }
}
