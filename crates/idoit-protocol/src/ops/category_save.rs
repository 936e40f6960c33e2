//! `cmdb.category.save`: create or update a category entry.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::names;
use crate::de;
use crate::model::{CategoryId, ObjectId};
use crate::request::{from_result, IdoitRequest};

/// Save category data for an object.
///
/// Without `entry`, multi-value categories always get a new entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySave {
    object_id: ObjectId,
    category: String,
    data: Value,
    entry: Option<CategoryId>,
}

impl CategorySave {
    pub fn new<T: Serialize>(
        object_id: ObjectId,
        category: impl Into<String>,
        data: &T,
    ) -> serde_json::Result<Self> {
        Ok(Self {
            object_id,
            category: category.into(),
            data: serde_json::to_value(data)?,
            entry: None,
        })
    }

    /// Update an existing entry instead of creating one.
    pub fn entry(mut self, entry: CategoryId) -> Self {
        self.entry = Some(entry);
        self
    }

    pub fn object_id(&self) -> ObjectId {
        self.object_id
    }

    pub fn category(&self) -> &str {
        &self.category
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySaveResponse {
    #[serde(default, deserialize_with = "de::lenient_bool")]
    pub success: bool,

    #[serde(default)]
    pub message: String,

    /// Id of the saved entry.
    #[serde(default, alias = "id")]
    pub entry: Option<CategoryId>,
}

impl IdoitRequest for CategorySave {
    type Response = CategorySaveResponse;

    fn method(&self) -> &str {
        names::CATEGORY_SAVE
    }

    fn params(&self) -> serde_json::Result<Map<String, Value>> {
        let mut params = Map::new();
        params.insert("objID".to_string(), json!(self.object_id));
        params.insert("category".to_string(), json!(self.category));
        params.insert("data".to_string(), self.data.clone());
        if let Some(entry) = self.entry {
            params.insert("entry".to_string(), json!(entry));
        }
        Ok(params)
    }

    fn clean(&self, raw: Value) -> serde_json::Result<CategorySaveResponse> {
        from_result(raw)
    }
}
