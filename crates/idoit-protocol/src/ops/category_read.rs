//! `cmdb.category.read`: entries of one category class for one object.

use std::fmt;
use std::marker::PhantomData;

use serde_json::{json, Map, Value};

use super::names;
use crate::model::{IdoitCategory, ObjectId};
use crate::request::IdoitRequest;

/// Read all entries of `category` attached to `object_id`, decoded as `C`.
///
/// Single-value categories come back as a one-element list; an object
/// without data for the class yields an empty list.
pub struct CategoryRead<C> {
    object_id: ObjectId,
    category: &'static str,
    _category: PhantomData<fn() -> C>,
}

impl<C> CategoryRead<C> {
    pub fn new(object_id: ObjectId, category: &'static str) -> Self {
        Self {
            object_id,
            category,
            _category: PhantomData,
        }
    }

    pub fn object_id(&self) -> ObjectId {
        self.object_id
    }

    pub fn category(&self) -> &'static str {
        self.category
    }
}

impl<C> Clone for CategoryRead<C> {
    fn clone(&self) -> Self {
        Self::new(self.object_id, self.category)
    }
}

impl<C> fmt::Debug for CategoryRead<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoryRead")
            .field("object_id", &self.object_id)
            .field("category", &self.category)
            .finish()
    }
}

impl<C: IdoitCategory> IdoitRequest for CategoryRead<C> {
    type Response = Vec<C>;

    fn method(&self) -> &str {
        names::CATEGORY_READ
    }

    fn params(&self) -> serde_json::Result<Map<String, Value>> {
        let mut params = Map::new();
        params.insert("objID".to_string(), json!(self.object_id));
        params.insert("category".to_string(), json!(self.category));
        Ok(params)
    }

    fn clean(&self, raw: Value) -> serde_json::Result<Vec<C>> {
        match raw {
            Value::Null => Ok(Vec::new()),
            Value::Array(entries) => entries
                .into_iter()
                .filter(|entry| !entry.is_null())
                .map(|entry| C::decode(self.category, entry))
                .collect(),
            entry => Ok(vec![C::decode(self.category, entry)?]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Note {
        #[serde(rename = "objID")]
        obj_id: ObjectId,
        text: String,
    }

    impl IdoitCategory for Note {
        fn decode(class: &str, raw: Value) -> serde_json::Result<Self> {
            match class {
                "C__CATG__NOTE" => serde_json::from_value(raw),
                other => Err(crate::model::object::unknown_category(other)),
            }
        }

        fn object_id(&self) -> ObjectId {
            self.obj_id
        }
    }

    fn read() -> CategoryRead<Note> {
        CategoryRead::new(ObjectId(7), "C__CATG__NOTE")
    }

    #[test]
    fn test_params() {
        let params = read().params().unwrap();
        assert_eq!(params["objID"], json!(7));
        assert_eq!(params["category"], json!("C__CATG__NOTE"));
    }

    #[test]
    fn test_clean_list_of_entries() {
        let entries = read()
            .clean(json!([
                {"id": "1", "objID": "7", "text": "first"},
                {"id": "2", "objID": "7", "text": "second"}
            ]))
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].text, "second");
        assert_eq!(entries[0].object_id(), ObjectId(7));
    }

    #[test]
    fn test_clean_empty_list() {
        assert!(read().clean(json!([])).unwrap().is_empty());
    }

    #[test]
    fn test_clean_unknown_class_fails() {
        let request: CategoryRead<Note> = CategoryRead::new(ObjectId(7), "C__CATG__OTHER");
        assert!(request.clean(json!([{"objID": 7, "text": "x"}])).is_err());
    }

    #[test]
    fn test_debug_names_object_and_class() {
        let rendered = format!("{:?}", read());
        assert!(rendered.contains("object_id: ObjectId(7)"));
        assert!(rendered.contains("C__CATG__NOTE"));
    }
}
