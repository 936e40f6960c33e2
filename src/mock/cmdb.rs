//! Mock CMDB Implementation
//!
//! Answers JSON-RPC envelopes (single or batched) the way an i-doit server
//! does, against an in-memory object store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{json, Map, Value};

use idoit_protocol::headers;
use idoit_protocol::ops::names;
use idoit_protocol::{API_KEY_PARAM, JSONRPC_VERSION};

use super::failure::{FailureConfig, FailureInjector, FailureMode};
use super::state::{MockObject, MockState};

/// JSON-RPC error codes used by the mock.
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const AUTH_ERROR: i64 = -32604;

/// Order in which batch replies are written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyOrder {
    /// Same order as the requests
    #[default]
    Natural,
    /// Last request answered first
    Reversed,
}

type Handler = Arc<dyn Fn(&Map<String, Value>) -> Value + Send + Sync>;

/// Outcome of one call: a result value or a JSON-RPC error object.
type Outcome = Result<Value, Value>;

/// Credentials presented by the caller's headers.
enum Auth {
    Basic { username: String, password: String },
    Session(String),
    Anonymous,
}

/// Configurable mock CMDB for testing
pub struct MockCmdb {
    api_key: String,
    username: String,
    password: String,
    state: Arc<Mutex<MockState>>,
    failures: Arc<Mutex<FailureInjector>>,
    handlers: Arc<Mutex<HashMap<String, Handler>>>,
    reply_order: Arc<Mutex<ReplyOrder>>,
}

impl MockCmdb {
    /// Mock with API key `test-api-key` and user `admin` / `admin`
    pub fn new() -> Self {
        Self::with_credentials("test-api-key", "admin", "admin")
    }

    pub fn with_credentials(
        api_key: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            username: username.into(),
            password: password.into(),
            state: Arc::new(Mutex::new(MockState::new())),
            failures: Arc::new(Mutex::new(FailureInjector::new())),
            handlers: Arc::new(Mutex::new(HashMap::new())),
            reply_order: Arc::new(Mutex::new(ReplyOrder::default())),
        }
    }

    // === Public API for test configuration ===

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Add an object; its SYSID is derived from the id.
    pub fn add_object(&self, id: i64, type_name: &str, title: &str) {
        let mut state = self.state.lock().unwrap();
        state.add_object(MockObject {
            id,
            type_name: type_name.to_string(),
            title: title.to_string(),
            sysid: format!("SYSID_{id:010}"),
        });
    }

    /// Store a category entry for an object. Returns the entry id.
    pub fn add_category_entry(&self, object_id: i64, category: &str, entry: Value) -> String {
        let fields = match entry {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        let mut state = self.state.lock().unwrap();
        state.add_entry(object_id, category, fields)
    }

    /// Stored entries of a category (for test assertions)
    pub fn category_entries(&self, object_id: i64, category: &str) -> Vec<Value> {
        let state = self.state.lock().unwrap();
        state.entries(object_id, category)
    }

    /// Inject a failure configuration for a method
    pub fn inject(&self, method: &str, config: FailureConfig) {
        let mut failures = self.failures.lock().unwrap();
        failures.inject(method, config);
    }

    /// Clear all failure injections
    pub fn clear_failures(&self) {
        let mut failures = self.failures.lock().unwrap();
        failures.clear();
    }

    pub fn set_reply_order(&self, order: ReplyOrder) {
        *self.reply_order.lock().unwrap() = order;
    }

    /// Serve `method` with `handler`. The handler sees the request params,
    /// API key included, and returns the result value.
    pub fn register_handler<F>(&self, method: &str, handler: F)
    where
        F: Fn(&Map<String, Value>) -> Value + Send + Sync + 'static,
    {
        let mut handlers = self.handlers.lock().unwrap();
        handlers.insert(method.to_string(), Arc::new(handler));
    }

    /// Number of sessions opened by login and not yet logged out
    pub fn active_sessions(&self) -> usize {
        self.state.lock().unwrap().session_count()
    }

    // === Request handling ===

    /// Answer one decoded request body: an envelope or an array of them.
    ///
    /// A dropped single reply is rendered as `null`.
    pub fn handle(&self, headers: &[(&'static str, String)], body: &Value) -> Value {
        let auth = auth_from(headers);

        match body {
            Value::Array(requests) if requests.is_empty() => {
                error_reply(Value::Null, rpc_error(INVALID_REQUEST, "Invalid Request"))
            }
            Value::Array(requests) => {
                let mut replies: Vec<Value> = requests
                    .iter()
                    .filter_map(|request| self.handle_one(&auth, request))
                    .collect();
                if *self.reply_order.lock().unwrap() == ReplyOrder::Reversed {
                    replies.reverse();
                }
                Value::Array(replies)
            }
            request => self.handle_one(&auth, request).unwrap_or(Value::Null),
        }
    }

    fn handle_one(&self, auth: &Auth, request: &Value) -> Option<Value> {
        let id = request.get("id").cloned().unwrap_or(Value::Null);
        let Some(method) = request.get("method").and_then(Value::as_str) else {
            return Some(error_reply(id, rpc_error(INVALID_REQUEST, "Invalid Request")));
        };
        let params = match request.get("params") {
            Some(Value::Object(params)) => params.clone(),
            _ => Map::new(),
        };

        let failure = self.failures.lock().unwrap().check(method);
        match failure {
            Some(FailureMode::Error(error)) => Some(error_reply(id, error)),
            Some(FailureMode::NullResult) => Some(result_reply(id, Value::Null)),
            Some(FailureMode::DropReply) => None,
            Some(FailureMode::ForeignId(foreign)) => {
                Some(reply(Value::String(foreign), self.dispatch(auth, method, &params)))
            }
            None => Some(reply(id, self.dispatch(auth, method, &params))),
        }
    }

    fn dispatch(&self, auth: &Auth, method: &str, params: &Map<String, Value>) -> Outcome {
        if params.get(API_KEY_PARAM).and_then(Value::as_str) != Some(self.api_key.as_str()) {
            return Err(rpc_error(INVALID_PARAMS, "Invalid parameters: missing or invalid apikey"));
        }

        if method == names::LOGIN {
            return self.handle_login(auth);
        }
        self.authenticate(auth)?;

        let handler = self.handlers.lock().unwrap().get(method).cloned();
        if let Some(handler) = handler {
            return Ok(handler(params));
        }

        match method {
            names::LOGOUT => self.handle_logout(auth),
            names::OBJECTS_READ => self.handle_objects_read(params),
            names::CATEGORY_READ => self.handle_category_read(params),
            names::CATEGORY_SAVE => self.handle_category_save(params),
            other => Err(rpc_error(METHOD_NOT_FOUND, &format!("Method not found: {other}"))),
        }
    }

    fn authenticate(&self, auth: &Auth) -> Result<(), Value> {
        let valid = match auth {
            Auth::Basic { username, password } => self.valid_user(username, password),
            Auth::Session(token) => self.state.lock().unwrap().has_session(token),
            Auth::Anonymous => false,
        };

        if valid {
            Ok(())
        } else {
            Err(rpc_error(AUTH_ERROR, "Authentication error"))
        }
    }

    fn valid_user(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }

    // === Method handlers ===

    fn handle_login(&self, auth: &Auth) -> Outcome {
        match auth {
            Auth::Basic { username, password } if self.valid_user(username, password) => {
                let token = self.state.lock().unwrap().open_session();
                Ok(json!({
                    "result": true,
                    "userid": "9",
                    "name": "i-doit Systemadministrator ",
                    "mail": "admin@example.com",
                    "username": username,
                    "session-id": token,
                    "client-id": "1",
                    "client-name": "Mock Tenant",
                }))
            }
            _ => Err(rpc_error(AUTH_ERROR, "Authentication error")),
        }
    }

    fn handle_logout(&self, auth: &Auth) -> Outcome {
        if let Auth::Session(token) = auth {
            self.state.lock().unwrap().close_session(token);
        }
        Ok(json!({"message": "Logout successfull", "result": true}))
    }

    fn handle_objects_read(&self, params: &Map<String, Value>) -> Outcome {
        let filter = match params.get("filter") {
            Some(Value::Object(filter)) => filter.clone(),
            _ => Map::new(),
        };
        let ids = match filter.get("ids") {
            Some(Value::Array(ids)) => Some(
                ids.iter()
                    .map(as_id)
                    .collect::<Option<Vec<i64>>>()
                    .ok_or_else(|| rpc_error(INVALID_PARAMS, "Invalid parameters: filter.ids"))?,
            ),
            _ => None,
        };
        let type_name = filter.get("type").and_then(Value::as_str);
        let title = filter.get("title").and_then(Value::as_str);
        let sysid = filter.get("sysid").and_then(Value::as_str);

        let state = self.state.lock().unwrap();
        let mut objects: Vec<&MockObject> = state
            .objects()
            .filter(|o| type_name.map_or(true, |t| o.type_name == t))
            .filter(|o| ids.as_ref().map_or(true, |ids| ids.contains(&o.id)))
            .filter(|o| title.map_or(true, |t| o.title == t))
            .filter(|o| sysid.map_or(true, |s| o.sysid == s))
            .collect();

        match params.get("order_by").and_then(Value::as_str) {
            Some("title") => objects.sort_by(|a, b| a.title.cmp(&b.title)),
            Some("sysid") => objects.sort_by(|a, b| a.sysid.cmp(&b.sysid)),
            _ => objects.sort_by_key(|o| o.id),
        }
        if params.get("sort").and_then(Value::as_str) == Some("DESC") {
            objects.reverse();
        }

        let (offset, count) = parse_limit(params.get("limit"))?;
        let rows: Vec<Value> = objects
            .into_iter()
            .skip(offset)
            .take(count.unwrap_or(usize::MAX))
            .map(MockObject::descriptor)
            .collect();

        Ok(Value::Array(rows))
    }

    fn handle_category_read(&self, params: &Map<String, Value>) -> Outcome {
        let object_id = params
            .get("objID")
            .and_then(as_id)
            .ok_or_else(|| rpc_error(INVALID_PARAMS, "Invalid parameters: objID"))?;
        let category = params
            .get("category")
            .and_then(Value::as_str)
            .ok_or_else(|| rpc_error(INVALID_PARAMS, "Invalid parameters: category"))?;

        let state = self.state.lock().unwrap();
        Ok(Value::Array(state.entries(object_id, category)))
    }

    fn handle_category_save(&self, params: &Map<String, Value>) -> Outcome {
        let object_id = params
            .get("objID")
            .and_then(as_id)
            .ok_or_else(|| rpc_error(INVALID_PARAMS, "Invalid parameters: objID"))?;
        let category = params
            .get("category")
            .and_then(Value::as_str)
            .ok_or_else(|| rpc_error(INVALID_PARAMS, "Invalid parameters: category"))?;
        let data = match params.get("data") {
            Some(Value::Object(data)) => data.clone(),
            _ => return Err(rpc_error(INVALID_PARAMS, "Invalid parameters: data")),
        };

        let mut state = self.state.lock().unwrap();
        if state.get_object(object_id).is_none() {
            return Err(rpc_error(INVALID_PARAMS, &format!("Object with id {object_id} does not exist")));
        }

        let entry_id = match params.get("entry").and_then(as_id) {
            Some(entry) => {
                let entry = entry.to_string();
                if !state.update_entry(object_id, category, &entry, &data) {
                    return Err(rpc_error(INVALID_PARAMS, &format!("Entry {entry} does not exist")));
                }
                entry
            }
            None => state.add_entry(object_id, category, data),
        };

        Ok(json!({
            "success": true,
            "message": "Category entry successfully saved",
            "entry": entry_id.parse::<i64>().map(Value::from).unwrap_or(Value::String(entry_id)),
        }))
    }
}

impl Default for MockCmdb {
    fn default() -> Self {
        Self::new()
    }
}

fn auth_from(headers: &[(&'static str, String)]) -> Auth {
    let find = |name: &str| {
        headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    };

    if let Some(token) = find(headers::SESSION) {
        return Auth::Session(token);
    }
    match (find(headers::USERNAME), find(headers::PASSWORD)) {
        (Some(username), Some(password)) => Auth::Basic { username, password },
        _ => Auth::Anonymous,
    }
}

/// Ids arrive as numbers or numeric strings.
fn as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// `limit` is a count or an `"offset,count"` string.
fn parse_limit(limit: Option<&Value>) -> Result<(usize, Option<usize>), Value> {
    let invalid = || rpc_error(INVALID_PARAMS, "Invalid parameters: limit");
    match limit {
        None | Some(Value::Null) => Ok((0, None)),
        Some(Value::Number(n)) => n.as_u64().map(|c| (0, Some(c as usize))).ok_or_else(invalid),
        Some(Value::String(s)) => {
            let (offset, count) = s.split_once(',').ok_or_else(invalid)?;
            let offset = offset.trim().parse().map_err(|_| invalid())?;
            let count = count.trim().parse().map_err(|_| invalid())?;
            Ok((offset, Some(count)))
        }
        Some(_) => Err(invalid()),
    }
}

fn rpc_error(code: i64, message: &str) -> Value {
    json!({"code": code, "message": message, "data": null})
}

fn reply(id: Value, outcome: Outcome) -> Value {
    match outcome {
        Ok(result) => result_reply(id, result),
        Err(error) => error_reply(id, error),
    }
}

fn result_reply(id: Value, result: Value) -> Value {
    json!({"jsonrpc": JSONRPC_VERSION, "id": id, "result": result})
}

fn error_reply(id: Value, error: Value) -> Value {
    json!({"jsonrpc": JSONRPC_VERSION, "id": id, "error": error})
}
