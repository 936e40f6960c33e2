//! Untyped escape hatch for methods without a dedicated shape.

use serde_json::{Map, Value};

use crate::request::IdoitRequest;

/// Call any method with hand-built parameters; the result stays raw JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRequest {
    method: String,
    params: Map<String, Value>,
}

impl RawRequest {
    pub fn new(method: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

impl IdoitRequest for RawRequest {
    type Response = Value;

    fn method(&self) -> &str {
        &self.method
    }

    fn params(&self) -> serde_json::Result<Map<String, Value>> {
        Ok(self.params.clone())
    }

    fn clean(&self, raw: Value) -> serde_json::Result<Value> {
        Ok(raw)
    }
}
