//! Category payloads.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use idoit_protocol::de;
use idoit_protocol::model::object::unknown_category;
use idoit_protocol::{CategoryId, Dialog, IdoitCategory, ObjectId};

/// `C__CATG__GLOBAL`: title, SYSID, status and bookkeeping of an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryGlobal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CategoryId>,

    #[serde(rename = "objID")]
    pub obj_id: ObjectId,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sysid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<Dialog>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmdb_status: Option<Dialog>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub object_type: Option<Dialog>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "de::opt_datetime", skip_serializing_if = "Option::is_none")]
    pub created: Option<NaiveDateTime>,

    #[serde(default, deserialize_with = "de::opt_datetime", skip_serializing_if = "Option::is_none")]
    pub changed: Option<NaiveDateTime>,
}

impl CategoryGlobal {
    pub const CLASS: &'static str = "C__CATG__GLOBAL";
}

impl IdoitCategory for CategoryGlobal {
    fn decode(class: &str, raw: Value) -> serde_json::Result<Self> {
        match class {
            Self::CLASS => serde_json::from_value(raw),
            other => Err(unknown_category(other)),
        }
    }

    fn object_id(&self) -> ObjectId {
        self.obj_id
    }
}

/// `C__CATG__CONTACT`: a person or group assigned to an object. Multi-value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryContactAssignment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CategoryId>,

    #[serde(rename = "objID")]
    pub obj_id: ObjectId,

    /// The assigned person, group or organization object.
    pub contact: ObjectId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Dialog>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<Dialog>,
}

impl CategoryContactAssignment {
    pub const CLASS: &'static str = "C__CATG__CONTACT";
}

impl IdoitCategory for CategoryContactAssignment {
    fn decode(class: &str, raw: Value) -> serde_json::Result<Self> {
        match class {
            Self::CLASS => serde_json::from_value(raw),
            other => Err(unknown_category(other)),
        }
    }

    fn object_id(&self) -> ObjectId {
        self.obj_id
    }
}

/// `C__CATG__ACCOUNTING`: purchase bookkeeping. Dates arrive as plain
/// `YYYY-MM-DD` or wrapped in `{ "title": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAccounting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CategoryId>,

    #[serde(rename = "objID")]
    pub obj_id: ObjectId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_no: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_no: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_no: Option<String>,

    #[serde(default, deserialize_with = "de::opt_date", skip_serializing_if = "Option::is_none")]
    pub acquirementdate: Option<NaiveDate>,

    #[serde(default, deserialize_with = "de::opt_date", skip_serializing_if = "Option::is_none")]
    pub order_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "de::opt_date", skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<NaiveDate>,
}

impl CategoryAccounting {
    pub const CLASS: &'static str = "C__CATG__ACCOUNTING";
}

/// Categories carried by [`super::Client`].
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCategory {
    Global(CategoryGlobal),
    Contact(CategoryContactAssignment),
    Accounting(CategoryAccounting),
}

impl IdoitCategory for ClientCategory {
    fn decode(class: &str, raw: Value) -> serde_json::Result<Self> {
        match class {
            CategoryGlobal::CLASS => serde_json::from_value(raw).map(ClientCategory::Global),
            CategoryContactAssignment::CLASS => serde_json::from_value(raw).map(ClientCategory::Contact),
            CategoryAccounting::CLASS => serde_json::from_value(raw).map(ClientCategory::Accounting),
            other => Err(unknown_category(other)),
        }
    }

    fn object_id(&self) -> ObjectId {
        match self {
            ClientCategory::Global(global) => global.obj_id,
            ClientCategory::Contact(contact) => contact.obj_id,
            ClientCategory::Accounting(accounting) => accounting.obj_id,
        }
    }
}
