//! Numeric identifiers as sent by i-doit.
//!
//! Ids arrive as integers, numeric strings, or objects carrying an `id`
//! field (object references inside categories). They always serialize as
//! integers.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

fn parse_id<E: de::Error>(value: Value) -> Result<i64, E> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| E::custom(format!("id out of range: {n}"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| E::custom(format!("invalid id: '{s}'"))),
        Value::Object(mut map) => match map.remove("id") {
            Some(inner) => parse_id(inner),
            None => Err(E::custom("id object without 'id' field")),
        },
        other => Err(E::custom(format!("invalid id: {other}"))),
    }
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(i64::from(id))
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_i64(self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                parse_id(Value::deserialize(deserializer)?).map(Self)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a CMDB object.
    ObjectId
);

numeric_id!(
    /// Identifier of a category entry.
    CategoryId
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_id_from_number_and_string() {
        let a: ObjectId = serde_json::from_value(json!(42)).unwrap();
        let b: ObjectId = serde_json::from_value(json!("42")).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.get(), 42);
    }

    #[test]
    fn test_object_id_from_reference_object() {
        let id: ObjectId = serde_json::from_value(json!({"id": "17", "title": "Jane Doe"})).unwrap();
        assert_eq!(id, ObjectId(17));
    }

    #[test]
    fn test_category_id_serializes_as_integer() {
        assert_eq!(serde_json::to_value(CategoryId(5)).unwrap(), json!(5));
    }

    #[test]
    fn test_invalid_id_rejected() {
        assert!(serde_json::from_value::<ObjectId>(json!("abc")).is_err());
        assert!(serde_json::from_value::<ObjectId>(json!(null)).is_err());
    }
}
