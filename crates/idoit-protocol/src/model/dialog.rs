//! Dialog (drop-down) field values.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// A dialog value. Reads accept a bare title or the full
/// `{ id, title, const }` object; writes send the title, which i-doit
/// resolves (creating the entry if needed).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dialog {
    pub id: Option<String>,
    pub title: String,
    pub constant: Option<String>,
}

impl Dialog {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

impl From<&str> for Dialog {
    fn from(title: &str) -> Self {
        Self::new(title)
    }
}

impl Serialize for Dialog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.title)
    }
}

impl<'de> Deserialize<'de> for Dialog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(title) => Ok(Self::new(title)),
            Value::Number(n) => Ok(Self {
                id: Some(n.to_string()),
                ..Self::default()
            }),
            Value::Object(map) => {
                let text = |key: &str| match map.get(key) {
                    Some(Value::String(s)) => Some(s.clone()),
                    Some(Value::Number(n)) => Some(n.to_string()),
                    _ => None,
                };
                Ok(Self {
                    id: text("id"),
                    title: text("title").unwrap_or_default(),
                    constant: text("const"),
                })
            }
            other => Err(de::Error::custom(format!("invalid dialog value: {other}"))),
        }
    }
}
