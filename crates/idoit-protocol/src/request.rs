//! Typed request trait and response cleaning.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// A remote call with a fixed method name and a declared result type.
///
/// The `Debug` rendering is used in error messages, so it should identify the
/// request without leaking credentials.
pub trait IdoitRequest: fmt::Debug {
    /// Type the raw `result` payload is converted into.
    type Response;

    /// Remote method name, e.g. `cmdb.objects.read`.
    fn method(&self) -> &str;

    /// Parameters, without the API key (the engine adds it).
    fn params(&self) -> serde_json::Result<Map<String, Value>>;

    /// Convert the raw result payload into the declared response type.
    fn clean(&self, raw: Value) -> serde_json::Result<Self::Response>;
}

/// Response cleaner: turn a loosely-typed result into `request`'s response type.
///
/// Pure with respect to the request; no I/O.
pub fn clean_result<R: IdoitRequest + ?Sized>(request: &R, raw: Value) -> serde_json::Result<R::Response> {
    request.clean(raw)
}

/// Serialize a parameter struct into a JSON object.
pub fn to_params<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Map<String, Value>> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(serde::ser::Error::custom(format!(
            "request parameters must serialize to an object, got {other}"
        ))),
    }
}

/// Decode a raw result with plain serde rules.
pub fn from_result<T: DeserializeOwned>(raw: Value) -> serde_json::Result<T> {
    serde_json::from_value(raw)
}
