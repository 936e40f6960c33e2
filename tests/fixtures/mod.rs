//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use idoit_client::{IdoitSession, JsonRpcClient, MockTransport};
use serde_json::Value;

/// Path to a file under tests/fixtures
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

/// Parse a JSON fixture
pub fn load_json(name: &str) -> Value {
    let text = std::fs::read_to_string(fixture_path(name)).expect("fixture readable");
    serde_json::from_str(&text).expect("fixture is valid JSON")
}

/// A mock transport and an engine wired to it with the mock's API key
pub fn mock_client() -> (Arc<MockTransport>, JsonRpcClient) {
    let transport = Arc::new(MockTransport::new());
    let api_key = transport.cmdb().api_key().to_string();
    let client = JsonRpcClient::new(transport.clone(), api_key);
    (transport, client)
}

/// A session for admin/admin that has not logged in yet
pub fn mock_session() -> (Arc<MockTransport>, IdoitSession) {
    let (transport, client) = mock_client();
    (transport, IdoitSession::new(client, "admin", "admin"))
}
