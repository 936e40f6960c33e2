//! Object and category traits.
//!
//! Each object type declares, statically, the object-type constant it maps to
//! and the category classes it carries. Instances are built through
//! [`IdoitObject::with_id`] rather than by reflection.

use std::fmt;

use serde_json::Value;

use super::ObjectId;

/// A set of category payloads an object type can carry, usually an enum with
/// one variant per category class.
pub trait IdoitCategory: fmt::Debug + Sized {
    /// Decode one raw category entry of the given class constant.
    fn decode(class: &str, raw: Value) -> serde_json::Result<Self>;

    /// The object this entry belongs to.
    fn object_id(&self) -> ObjectId;
}

/// A CMDB object type.
pub trait IdoitObject: fmt::Debug + Sized {
    /// Category payloads this type accepts.
    type Category: IdoitCategory;

    /// Object type constant, e.g. `C__OBJTYPE__SERVER`.
    const TYPE_NAME: &'static str;

    /// Category class constants read for every object of this type.
    const CATEGORIES: &'static [&'static str];

    /// Build an empty object with the given id.
    fn with_id(id: ObjectId) -> Self;

    fn id(&self) -> ObjectId;

    /// Attach one decoded category entry.
    fn set_category(&mut self, category: Self::Category);
}

/// Error for a class constant an [`IdoitCategory`] does not know.
pub fn unknown_category(class: &str) -> serde_json::Error {
    serde::de::Error::custom(format!("unknown category class '{class}'"))
}
