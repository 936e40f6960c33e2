//! JSON-RPC envelope types.
//!
//! Outbound: `{ jsonrpc, id, method, params }`. Inbound: `{ id, result | error }`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::de;
use crate::JSONRPC_VERSION;

/// Outbound JSON-RPC request envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Always "2.0".
    pub jsonrpc: String,
    /// Correlation id: the batch key, or "0" for unbatched calls.
    pub id: String,
    /// Remote method name.
    pub method: String,
    /// Method parameters, including the API key.
    pub params: Map<String, Value>,
}

impl JsonRpcRequest {
    /// Create a new request envelope.
    pub fn new(id: impl Into<String>, method: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: id.into(),
            method: method.into(),
            params,
        }
    }
}

/// Inbound JSON-RPC response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Echoed correlation id. Numeric ids are normalised to strings.
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub id: Option<String>,

    /// Success payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error payload, kept raw for diagnosis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl JsonRpcResponse {
    /// Create a successful response.
    pub fn success(id: impl Into<String>, result: Value) -> Self {
        Self {
            id: Some(id.into()),
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: impl Into<String>, error: Value) -> Self {
        Self {
            id: Some(id.into()),
            result: None,
            error: Some(error),
        }
    }

    /// Whether the reply carries a non-null error payload.
    pub fn has_error(&self) -> bool {
        self.error.as_ref().is_some_and(|e| !e.is_null())
    }

    /// The id, or an empty string when the reply had none.
    pub fn id_str(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let mut params = Map::new();
        params.insert("apikey".to_string(), json!("secret"));
        let req = JsonRpcRequest::new("0", "idoit.login", params);

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["id"], "0");
        assert_eq!(value["method"], "idoit.login");
        assert_eq!(value["params"]["apikey"], "secret");
    }

    #[test]
    fn test_response_parsing_with_numeric_id() {
        let json = r#"{"jsonrpc": "2.0", "id": 7, "result": {"ok": true}}"#;

        let resp: JsonRpcResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.id.as_deref(), Some("7"));
        assert!(!resp.has_error());
        assert_eq!(resp.result.unwrap()["ok"], true);
    }

    #[test]
    fn test_response_null_result_and_error() {
        let json = r#"{"id": "0", "result": null, "error": null}"#;

        let resp: JsonRpcResponse = serde_json::from_str(json).unwrap();
        assert!(resp.result.is_none());
        assert!(!resp.has_error());
    }

    #[test]
    fn test_response_error() {
        let resp = JsonRpcResponse::error("id", json!({"code": -32603, "message": "Internal error"}));

        assert!(resp.has_error());
        assert!(resp.result.is_none());
        assert_eq!(resp.id_str(), "id");
    }
}
