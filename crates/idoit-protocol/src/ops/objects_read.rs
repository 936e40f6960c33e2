//! `cmdb.objects.read`: list objects matching a filter.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::names;
use crate::de;
use crate::model::{IdoitObject, ObjectId};
use crate::request::{from_result, to_params, IdoitRequest};

/// Field to order the result set by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ordering {
    Email,
    FirstName,
    Id,
    LastName,
    Sysid,
    Title,
    Type,
    TypeTitle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Maximum number of objects, either a plain count or an `"offset,count"`
/// window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Limit {
    Count(u32),
    Window(String),
}

/// Filter block. Unset fields are omitted from the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Filter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<ObjectId>>,

    /// Object type constant (e.g. `C__OBJTYPE__SERVER`) or numeric type id.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Translated type name; depends on the request language.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sysid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Object list request, built with the `filter_*` methods.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObjectsRead {
    filter: Filter,

    #[serde(skip_serializing_if = "Option::is_none")]
    order_by: Option<Ordering>,

    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<SortDirection>,

    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<Limit>,
}

impl ObjectsRead {
    pub fn new() -> Self {
        Self::default()
    }

    /// All objects of type `T`.
    pub fn of_type<T: IdoitObject>() -> Self {
        Self::new().filter_type::<T>()
    }

    pub fn filter_type<T: IdoitObject>(self) -> Self {
        self.filter_type_name(T::TYPE_NAME)
    }

    pub fn filter_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.filter.type_name = Some(type_name.into());
        self
    }

    pub fn filter_id(mut self, id: impl Into<ObjectId>) -> Self {
        self.filter.ids.get_or_insert_with(Vec::new).push(id.into());
        self
    }

    /// An empty list leaves the id filter unset.
    pub fn filter_ids<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ObjectId>,
    {
        for id in ids {
            self = self.filter_id(id);
        }
        self
    }

    pub fn filter_title(mut self, title: impl Into<String>) -> Self {
        self.filter.title = Some(title.into());
        self
    }

    pub fn filter_type_title(mut self, type_title: impl Into<String>) -> Self {
        self.filter.type_title = Some(type_title.into());
        self
    }

    pub fn filter_sysid(mut self, sysid: impl Into<String>) -> Self {
        self.filter.sysid = Some(sysid.into());
        self
    }

    pub fn filter_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.filter.first_name = Some(first_name.into());
        self
    }

    pub fn filter_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.filter.last_name = Some(last_name.into());
        self
    }

    pub fn filter_email(mut self, email: impl Into<String>) -> Self {
        self.filter.email = Some(email.into());
        self
    }

    pub fn order_by(mut self, ordering: Ordering) -> Self {
        self.order_by = Some(ordering);
        self
    }

    pub fn sort(mut self, direction: SortDirection) -> Self {
        self.sort = Some(direction);
        self
    }

    pub fn limit(mut self, count: u32) -> Self {
        self.limit = Some(Limit::Count(count));
        self
    }

    /// Skip `offset` objects, then return at most `count`.
    pub fn window(mut self, offset: u32, count: u32) -> Self {
        self.limit = Some(Limit::Window(format!("{offset},{count}")));
        self
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// The object type this request is restricted to, if any.
    pub fn type_name(&self) -> Option<&str> {
        self.filter.type_name.as_deref()
    }
}

/// One object as listed by `cmdb.objects.read`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    pub id: ObjectId,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub sysid: Option<String>,

    /// Numeric object type id.
    #[serde(default, rename = "type", deserialize_with = "de::opt_string_or_number")]
    pub type_id: Option<String>,

    #[serde(default)]
    pub type_title: Option<String>,

    #[serde(default)]
    pub type_group_title: Option<String>,

    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub status: Option<String>,

    #[serde(default)]
    pub cmdb_status_title: Option<String>,

    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub created: Option<NaiveDateTime>,

    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub updated: Option<NaiveDateTime>,
}

impl IdoitRequest for ObjectsRead {
    type Response = Vec<ObjectDescriptor>;

    fn method(&self) -> &str {
        names::OBJECTS_READ
    }

    fn params(&self) -> serde_json::Result<Map<String, Value>> {
        to_params(self)
    }

    fn clean(&self, raw: Value) -> serde_json::Result<Vec<ObjectDescriptor>> {
        from_result(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_params_omit_unset_fields() {
        let request = ObjectsRead::new()
            .filter_type_name("C__OBJTYPE__SERVER")
            .filter_title("My little server")
            .order_by(Ordering::TypeTitle)
            .sort(SortDirection::Desc);

        let params = request.params().unwrap();
        assert_eq!(
            Value::Object(params),
            json!({
                "filter": {"type": "C__OBJTYPE__SERVER", "title": "My little server"},
                "order_by": "type_title",
                "sort": "DESC"
            })
        );
    }

    #[test]
    fn test_ids_filter_and_window() {
        let request = ObjectsRead::new().filter_ids([1, 2, 3]).window(1000, 1000);

        let params = request.params().unwrap();
        assert_eq!(params["filter"]["ids"], json!([1, 2, 3]));
        assert_eq!(params["limit"], json!("1000,1000"));
        assert!(request.type_name().is_none());
    }

    #[test]
    fn test_empty_ids_leave_filter_unset() {
        let request = ObjectsRead::new().filter_ids(Vec::<i64>::new());
        assert!(request.filter().ids.is_none());
    }

    #[test]
    fn test_descriptor_parsing() {
        let raw = json!([{
            "id": "1234",
            "title": "My server",
            "sysid": "SRV_101010",
            "type": "5",
            "created": "2019-07-29 10:52:29",
            "updated": "2019-07-29 11:07:13",
            "type_title": "Server",
            "type_group_title": "Infrastructure",
            "status": "2",
            "cmdb_status": "6",
            "cmdb_status_title": "in operation"
        }]);

        let objects = ObjectsRead::new().clean(raw).unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].id, ObjectId(1234));
        assert_eq!(objects[0].type_id.as_deref(), Some("5"));
        assert!(objects[0].created.is_some());
    }
}
