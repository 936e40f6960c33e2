//! Session operations.
//!
//! Credentials travel in headers, so both requests carry no parameters of
//! their own.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::names;
use crate::de;
use crate::request::{from_result, IdoitRequest};

/// `idoit.login`: trade username/password headers for a session id.
#[derive(Debug, Clone, Default)]
pub struct Login;

/// Login response payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default, deserialize_with = "de::lenient_bool")]
    pub result: bool,

    #[serde(default, rename = "userid", deserialize_with = "de::opt_string_or_number")]
    pub user_id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub mail: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    /// Token sent as `X-RPC-Auth-Session` from now on.
    #[serde(default, rename = "session-id")]
    pub session_id: String,

    #[serde(default, rename = "client-id", deserialize_with = "de::opt_string_or_number")]
    pub client_id: Option<String>,

    #[serde(default, rename = "client-name")]
    pub client_name: Option<String>,
}

impl IdoitRequest for Login {
    type Response = LoginResponse;

    fn method(&self) -> &str {
        names::LOGIN
    }

    fn params(&self) -> serde_json::Result<Map<String, Value>> {
        Ok(Map::new())
    }

    fn clean(&self, raw: Value) -> serde_json::Result<LoginResponse> {
        from_result(raw)
    }
}

/// `idoit.logout`: invalidate the current session.
#[derive(Debug, Clone, Default)]
pub struct Logout;

/// Generic `{ result, message }` acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleSuccessResponse {
    #[serde(default, deserialize_with = "de::lenient_bool")]
    pub result: bool,

    #[serde(default)]
    pub message: String,
}

impl IdoitRequest for Logout {
    type Response = SimpleSuccessResponse;

    fn method(&self) -> &str {
        names::LOGOUT
    }

    fn params(&self) -> serde_json::Result<Map<String, Value>> {
        Ok(Map::new())
    }

    fn clean(&self, raw: Value) -> serde_json::Result<SimpleSuccessResponse> {
        from_result(raw)
    }
}
