//! Protocol engine integration tests
//!
//! Drive `JsonRpcClient` against the in-process mock CMDB and against fixed
//! reply stubs.

mod fixtures;

use std::sync::{Arc, Mutex};

use idoit_client::mock::{FailureConfig, ReplyOrder};
use idoit_client::model::{CategoryContactAssignment, CategoryGlobal, ClientCategory};
use idoit_client::protocol::ops::{CategoryRead, CategorySave, ObjectsRead, RawRequest};
use idoit_client::protocol::{Batch, ObjectId};
use idoit_client::{Credentials, FailureKind, IdoitError, JsonRpcClient, Transport, TransportError};
use serde_json::{json, Map, Value};

use fixtures::{load_json, mock_client};

// =============================================================================
// Test Helpers
// =============================================================================

/// Answers every call with the same reply and counts calls.
struct FixedReply {
    reply: Value,
    calls: Mutex<usize>,
}

impl FixedReply {
    fn new(reply: Value) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: Mutex::new(0),
        })
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl Transport for FixedReply {
    fn send(
        &self,
        _headers: &[(&'static str, String)],
        _body: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        *self.calls.lock().unwrap() += 1;
        Ok(serde_json::to_vec(&self.reply)?)
    }
}

struct Unreachable;

impl Transport for Unreachable {
    fn send(
        &self,
        _headers: &[(&'static str, String)],
        _body: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        Err(TransportError::ConnectionFailed("connection refused".to_string()))
    }
}

fn basic() -> Credentials {
    Credentials::basic("admin", "admin")
}

fn echo(value: i64) -> RawRequest {
    let mut params = Map::new();
    params.insert("value".to_string(), json!(value));
    RawRequest::new("test.echo", params)
}

fn echo_client() -> (Arc<idoit_client::MockTransport>, JsonRpcClient) {
    let (transport, client) = mock_client();
    transport.cmdb().register_handler("test.echo", |params| {
        params.get("value").cloned().unwrap_or(Value::Null)
    });
    (transport, client)
}

// =============================================================================
// Batches
// =============================================================================

#[test]
fn test_empty_batch_performs_no_transport_call() {
    let transport = FixedReply::new(json!([]));
    let client = JsonRpcClient::new(transport.clone(), "key");

    let results = client.send_batch(&basic(), &Batch::<RawRequest>::new()).unwrap();

    assert!(results.is_empty());
    assert_eq!(transport.calls(), 0);
}

#[test]
fn test_batch_results_follow_insertion_order() {
    let (transport, client) = echo_client();
    transport.cmdb().set_reply_order(ReplyOrder::Reversed);

    let mut batch = Batch::new();
    for key in ["42", "41", "99"] {
        batch.add(key, echo(key.parse().unwrap())).unwrap();
    }

    let results = client.send_batch(&basic(), &batch).unwrap();

    let sent = transport.last_call().unwrap().body;
    let sent_ids: Vec<_> = sent
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(sent_ids, vec!["42", "41", "99"]);

    assert_eq!(results.keys().collect::<Vec<_>>(), vec!["42", "41", "99"]);
    assert_eq!(
        results.values().cloned().collect::<Vec<_>>(),
        vec![json!(42), json!(41), json!(99)]
    );
}

#[test]
fn test_batch_entries_decode_with_their_own_request() {
    let (transport, client) = mock_client();
    transport.cmdb().set_reply_order(ReplyOrder::Reversed);
    transport.cmdb().add_object(1, "C__OBJTYPE__CLIENT", "ws-001");
    transport.cmdb().add_category_entry(
        1,
        CategoryContactAssignment::CLASS,
        json!({"contact": {"id": "17", "title": "Jane Doe"}, "role": "Administrator"}),
    );

    let global = CategoryRead::<ClientCategory>::new(ObjectId(1), CategoryGlobal::CLASS);
    let contact =
        CategoryRead::<ClientCategory>::new(ObjectId(1), CategoryContactAssignment::CLASS);

    let mut batch = Batch::new();
    batch.add("global", global).unwrap();
    batch.add("contact", contact).unwrap();

    let results = client.send_batch(&basic(), &batch).unwrap();

    match results.get("global").unwrap().as_slice() {
        [ClientCategory::Global(global)] => assert_eq!(global.title, "ws-001"),
        other => panic!("unexpected global payload: {other:?}"),
    }
    match results.get("contact").unwrap().as_slice() {
        [ClientCategory::Contact(contact)] => {
            assert_eq!(contact.contact, ObjectId(17));
            assert_eq!(contact.role.as_ref().unwrap().title, "Administrator");
        }
        other => panic!("unexpected contact payload: {other:?}"),
    }
}

#[test]
fn test_duplicate_batch_key_rejected_before_sending() {
    let mut batch = Batch::new();
    batch.add("a", echo(1)).unwrap();

    let err: IdoitError = batch.add("a", echo(2)).unwrap_err().into();
    assert_eq!(err.failure_kind(), FailureKind::Usage);
    assert_eq!(batch.len(), 1);
}

#[test]
fn test_unmatched_reply_id_is_protocol_error() {
    let transport = FixedReply::new(json!([
        {"jsonrpc": "2.0", "id": "a", "result": 1},
        {"jsonrpc": "2.0", "id": "stranger", "result": 2}
    ]));
    let client = JsonRpcClient::new(transport, "key");

    let mut batch = Batch::new();
    batch.add("a", echo(1)).unwrap();
    batch.add("b", echo(2)).unwrap();

    let err = client.send_batch(&basic(), &batch).unwrap_err();
    assert_eq!(err.exit_code(), 30);
    assert!(err.to_string().contains("stranger"));
}

#[test]
fn test_duplicate_reply_id_is_protocol_error() {
    let transport = FixedReply::new(json!([
        {"jsonrpc": "2.0", "id": "a", "result": 1},
        {"jsonrpc": "2.0", "id": "a", "result": 1}
    ]));
    let client = JsonRpcClient::new(transport, "key");

    let mut batch = Batch::new();
    batch.add("a", echo(1)).unwrap();

    let err = client.send_batch(&basic(), &batch).unwrap_err();
    assert!(matches!(err, IdoitError::Protocol(ref m) if m.contains("more than one response")));
}

#[test]
fn test_request_level_error_for_batch() {
    let transport = FixedReply::new(json!({
        "jsonrpc": "2.0",
        "id": null,
        "error": {"code": -32600, "message": "Invalid Request"}
    }));
    let client = JsonRpcClient::new(transport, "key");

    let mut batch = Batch::new();
    batch.add("a", echo(1)).unwrap();

    let err = client.send_batch(&basic(), &batch).unwrap_err();
    assert!(matches!(err, IdoitError::Protocol(ref m) if m.contains("Invalid Request")));
}

#[test]
fn test_one_failing_entry_fails_the_batch() {
    let (transport, client) = echo_client();
    transport
        .cmdb()
        .inject("test.echo", FailureConfig::error(-32099, "boom").with_fail_count(1));

    let mut batch = Batch::new();
    batch.add("first", echo(1)).unwrap();
    batch.add("second", echo(2)).unwrap();

    let err = client.send_batch(&basic(), &batch).unwrap_err();
    assert!(matches!(err, IdoitError::Protocol(ref m) if m.contains("boom")));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_error_message_names_error_and_request() {
    let transport = FixedReply::new(json!({
        "jsonrpc": "2.0",
        "id": "id",
        "result": null,
        "error": "boom"
    }));
    let client = JsonRpcClient::new(transport, "key");

    let err = client.send(&basic(), &echo(7)).unwrap_err();
    let message = err.to_string();

    assert!(message.contains("boom"));
    assert!(message.contains(&format!("{:?}", echo(7))));
}

#[test]
fn test_null_result_fails_distinctly() {
    let transport = FixedReply::new(json!({"jsonrpc": "2.0", "id": "0"}));
    let client = JsonRpcClient::new(transport, "key");

    let err = client.send(&basic(), &echo(7)).unwrap_err();

    assert_eq!(err.failure_kind(), FailureKind::Protocol);
    assert!(err.to_string().contains("Result is null"));
    assert!(!err.to_string().contains("Received error"));
}

#[test]
fn test_structured_error_rendered_as_json() {
    let (transport, client) = mock_client();
    transport.cmdb().add_object(12, "C__OBJTYPE__CLIENT", "ws-012");
    let violation = load_json("constraint_violation_error.json");
    transport
        .cmdb()
        .inject("cmdb.category.save", FailureConfig::error_value(violation));

    let fields = json!({"sysid": "CLIENT_000012"});
    let save = CategorySave::new(ObjectId(12), CategoryGlobal::CLASS, &fields).unwrap();
    let err = client.send(&basic(), &save).unwrap_err();

    let message = err.to_string();
    assert!(message.contains("\"code\":-32099"));
    assert!(message.contains("Integrity constraint violation"));
    assert!(message.contains("CategorySave"));
}

#[test]
fn test_result_of_wrong_shape_is_decode_error() {
    let transport = FixedReply::new(json!({
        "jsonrpc": "2.0",
        "id": "0",
        "result": {"unexpected": true}
    }));
    let client = JsonRpcClient::new(transport, "key");

    let err = client.send(&basic(), &ObjectsRead::new()).unwrap_err();
    assert!(matches!(err, IdoitError::Decode { .. }));
    assert_eq!(err.exit_code(), 31);
}

#[test]
fn test_transport_failure_maps_to_transport_kind() {
    let client = JsonRpcClient::new(Arc::new(Unreachable), "key");

    let err = client.send(&basic(), &echo(1)).unwrap_err();
    assert_eq!(err.failure_kind(), FailureKind::Transport);
    assert_eq!(err.exit_code(), 20);
}

#[test]
fn test_invalid_reply_json_is_protocol_error() {
    struct Garbage;
    impl Transport for Garbage {
        fn send(&self, _: &[(&'static str, String)], _: &[u8]) -> Result<Vec<u8>, TransportError> {
            Ok(b"<html>Maintenance</html>".to_vec())
        }
    }
    let client = JsonRpcClient::new(Arc::new(Garbage), "key");

    let err = client.send(&basic(), &echo(1)).unwrap_err();
    assert!(matches!(err, IdoitError::Protocol(ref m) if m.contains("Invalid response JSON")));
}

// =============================================================================
// Typed requests against the mock
// =============================================================================

#[test]
fn test_category_save_then_read() {
    let (transport, client) = mock_client();
    transport.cmdb().add_object(5, "C__OBJTYPE__CLIENT", "ws-005");

    let contact = CategoryContactAssignment {
        id: None,
        obj_id: ObjectId(5),
        contact: ObjectId(17),
        role: Some("Administrator".into()),
        primary: None,
    };
    let save = CategorySave::new(ObjectId(5), CategoryContactAssignment::CLASS, &contact).unwrap();
    let saved = client.send(&basic(), &save).unwrap();
    assert!(saved.success);
    let entry = saved.entry.unwrap();

    let read = CategoryRead::<CategoryContactAssignment>::new(
        ObjectId(5),
        CategoryContactAssignment::CLASS,
    );
    let entries = client.send(&basic(), &read).unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, Some(entry));
    assert_eq!(entries[0].contact, ObjectId(17));
}

#[test]
fn test_objects_read_with_window() {
    let (transport, client) = mock_client();
    for id in 1..=5 {
        transport.cmdb().add_object(id, "C__OBJTYPE__SERVER", &format!("srv-{id:02}"));
    }

    let request = ObjectsRead::new().filter_type_name("C__OBJTYPE__SERVER").window(1, 2);
    let objects = client.send(&basic(), &request).unwrap();

    let titles: Vec<_> = objects.iter().map(|o| o.title.as_str()).collect();
    assert_eq!(titles, vec!["srv-02", "srv-03"]);
    assert!(objects[0].created.is_some());
}
