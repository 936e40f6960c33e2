//! Mock CMDB State Management
//!
//! Holds objects, category entries and open sessions for the mock CMDB.

use std::collections::{HashMap, HashSet};

use serde_json::{json, Map, Value};

/// Timestamp stamped on every mock object.
const MOCK_TIMESTAMP: &str = "2024-01-15 09:30:00";

/// An object known to the mock CMDB
#[derive(Debug, Clone, PartialEq)]
pub struct MockObject {
    pub id: i64,
    /// Object type constant, e.g. `C__OBJTYPE__CLIENT`
    pub type_name: String,
    pub title: String,
    pub sysid: String,
}

impl MockObject {
    /// The row `cmdb.objects.read` returns for this object. Numbers are
    /// rendered as strings the way the server does.
    pub fn descriptor(&self) -> Value {
        json!({
            "id": self.id.to_string(),
            "title": self.title,
            "sysid": self.sysid,
            "type": self.type_name,
            "type_title": self.type_name,
            "status": "2",
            "cmdb_status_title": "in operation",
            "created": MOCK_TIMESTAMP,
            "updated": MOCK_TIMESTAMP,
        })
    }

    /// The `C__CATG__GLOBAL` entry derived from this object.
    fn global_entry(&self) -> Value {
        json!({
            "id": self.id.to_string(),
            "objID": self.id.to_string(),
            "title": self.title,
            "sysid": self.sysid,
            "type": {"id": "0", "title": self.type_name, "const": self.type_name},
            "cmdb_status": {"id": "6", "title": "in operation", "const": "C__CMDB_STATUS__IN_OPERATION"},
            "created": MOCK_TIMESTAMP,
            "changed": MOCK_TIMESTAMP,
            "description": "",
        })
    }
}

/// Mock CMDB state
#[derive(Debug, Default)]
pub struct MockState {
    objects: Vec<MockObject>,
    /// Category entries keyed by (object id, category constant)
    entries: HashMap<(i64, String), Vec<Value>>,
    sessions: HashSet<String>,
    next_session: u64,
    next_entry: i64,
}

impl MockState {
    pub fn new() -> Self {
        Self {
            next_entry: 1000,
            ..Self::default()
        }
    }

    // === Objects ===

    /// Add or replace an object
    pub fn add_object(&mut self, object: MockObject) {
        match self.objects.iter_mut().find(|o| o.id == object.id) {
            Some(existing) => *existing = object,
            None => self.objects.push(object),
        }
    }

    pub fn get_object(&self, id: i64) -> Option<&MockObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn objects(&self) -> impl Iterator<Item = &MockObject> {
        self.objects.iter()
    }

    // === Category entries ===

    /// Append an entry, filling in `id` and `objID` when absent. Returns the
    /// entry id.
    pub fn add_entry(&mut self, object_id: i64, category: &str, entry: Map<String, Value>) -> String {
        let mut entry = entry;
        let entry_id = match entry.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => {
                self.next_entry += 1;
                let id = self.next_entry.to_string();
                entry.insert("id".to_string(), Value::String(id.clone()));
                id
            }
        };
        entry
            .entry("objID".to_string())
            .or_insert_with(|| Value::String(object_id.to_string()));

        self.entries
            .entry((object_id, category.to_string()))
            .or_default()
            .push(Value::Object(entry));
        entry_id
    }

    /// Merge `data` into an existing entry. Returns false if there is none.
    pub fn update_entry(&mut self, object_id: i64, category: &str, entry_id: &str, data: &Map<String, Value>) -> bool {
        let Some(entries) = self.entries.get_mut(&(object_id, category.to_string())) else {
            return false;
        };
        let target = entries.iter_mut().find_map(|e| match e {
            Value::Object(fields) if id_matches(fields.get("id"), entry_id) => Some(fields),
            _ => None,
        });

        match target {
            Some(fields) => {
                for (key, value) in data {
                    fields.insert(key.clone(), value.clone());
                }
                true
            }
            None => false,
        }
    }

    /// Entries of `category` for `object_id`. The global category is
    /// synthesized from the object itself unless entries were stored.
    pub fn entries(&self, object_id: i64, category: &str) -> Vec<Value> {
        if let Some(stored) = self.entries.get(&(object_id, category.to_string())) {
            return stored.clone();
        }
        match (category, self.get_object(object_id)) {
            ("C__CATG__GLOBAL", Some(object)) => vec![object.global_entry()],
            _ => Vec::new(),
        }
    }

    // === Sessions ===

    /// Open a session and return its token
    pub fn open_session(&mut self) -> String {
        self.next_session += 1;
        let token = format!("mock-session-{:04}", self.next_session);
        self.sessions.insert(token.clone());
        token
    }

    pub fn close_session(&mut self, token: &str) -> bool {
        self.sessions.remove(token)
    }

    pub fn has_session(&self, token: &str) -> bool {
        self.sessions.contains(token)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

fn id_matches(value: Option<&Value>, id: &str) -> bool {
    match value {
        Some(Value::String(s)) => s == id,
        Some(Value::Number(n)) => n.to_string() == id,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(id: i64, title: &str) -> MockObject {
        MockObject {
            id,
            type_name: "C__OBJTYPE__SERVER".to_string(),
            title: title.to_string(),
            sysid: format!("SRV_{id:06}"),
        }
    }

    #[test]
    fn test_add_object_replaces_same_id() {
        let mut state = MockState::new();
        state.add_object(object(1, "a"));
        state.add_object(object(1, "b"));

        assert_eq!(state.objects().count(), 1);
        assert_eq!(state.get_object(1).unwrap().title, "b");
    }

    #[test]
    fn test_entries_fill_ids() {
        let mut state = MockState::new();
        let id = state.add_entry(7, "C__CATG__CONTACT", Map::new());

        let entries = state.entries(7, "C__CATG__CONTACT");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["id"], Value::String(id));
        assert_eq!(entries[0]["objID"], "7");
    }

    #[test]
    fn test_global_synthesized_from_object() {
        let mut state = MockState::new();
        state.add_object(object(3, "db-01"));

        let entries = state.entries(3, "C__CATG__GLOBAL");
        assert_eq!(entries[0]["title"], "db-01");
        assert!(state.entries(4, "C__CATG__GLOBAL").is_empty());
    }

    #[test]
    fn test_update_entry_merges() {
        let mut state = MockState::new();
        let id = state.add_entry(7, "C__CATG__CONTACT", Map::new());
        let mut data = Map::new();
        data.insert("contact".to_string(), json!(17));

        assert!(state.update_entry(7, "C__CATG__CONTACT", &id, &data));
        assert!(!state.update_entry(7, "C__CATG__CONTACT", "nope", &data));
        assert_eq!(state.entries(7, "C__CATG__CONTACT")[0]["contact"], 17);
    }

    #[test]
    fn test_sessions() {
        let mut state = MockState::new();
        let token = state.open_session();
        assert!(state.has_session(&token));
        assert_eq!(state.session_count(), 1);

        assert!(state.close_session(&token));
        assert!(!state.close_session(&token));
        assert_eq!(state.session_count(), 0);
    }
}
