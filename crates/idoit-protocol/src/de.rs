//! Lenient field decoders.
//!
//! i-doit is loose about scalar types: ids arrive as numbers or strings,
//! booleans as "1"/"0", dates either bare or wrapped in `{ "title": ... }`.

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::{self, Deserialize, Deserializer};
use serde_json::Value;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Optional string that may be sent as a number.
pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(de::Error::custom(format!("expected string or number, got {other}"))),
    }
}

/// Boolean that may be sent as "1"/"0", 1/0 or "true"/"false".
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_i64().unwrap_or(0) != 0),
        Value::String(s) => match s.as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" | "" => Ok(false),
            _ => Err(de::Error::custom(format!("invalid boolean: {s}"))),
        },
        other => Err(de::Error::custom(format!("invalid boolean: {other}"))),
    }
}

/// Optional date, bare or wrapped in `{ "title": ... }`.
pub fn opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(text) =
        date_text(Value::deserialize(deserializer)?).map_err(<D::Error as de::Error>::custom)?
    else {
        return Ok(None);
    };
    parse_date(&text).map(Some).map_err(de::Error::custom)
}

/// Optional timestamp, bare or wrapped in `{ "title": ... }`. A bare date
/// maps to midnight.
pub fn opt_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(text) =
        date_text(Value::deserialize(deserializer)?).map_err(<D::Error as de::Error>::custom)?
    else {
        return Ok(None);
    };
    parse_datetime(&text).map(Some).map_err(de::Error::custom)
}

fn date_text(value: Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.trim().to_string())),
        Value::Object(mut map) => match map.remove("title") {
            Some(title) => date_text(title),
            None => Err("date object without title".to_string()),
        },
        other => Err(format!("expected date, got {other}")),
    }
}

/// Parse an i-doit date, accepting a trailing time component.
fn parse_date(text: &str) -> Result<NaiveDate, String> {
    let date_part = text.split_whitespace().next().unwrap_or(text);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT)
        .map_err(|e| format!("invalid date '{text}': {e}"))
}

/// Parse an i-doit timestamp, accepting a bare date.
fn parse_datetime(text: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT).or_else(|_| {
        parse_date(text)?
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| format!("invalid timestamp '{text}'"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "opt_string_or_number")]
        id: Option<String>,
        #[serde(default, deserialize_with = "lenient_bool")]
        flag: bool,
        #[serde(default, deserialize_with = "opt_date")]
        day: Option<NaiveDate>,
        #[serde(default, deserialize_with = "opt_datetime")]
        at: Option<NaiveDateTime>,
    }

    #[test]
    fn test_numeric_id_becomes_string() {
        let s: Sample = serde_json::from_value(json!({"id": 42})).unwrap();
        assert_eq!(s.id.as_deref(), Some("42"));
    }

    #[test]
    fn test_lenient_bool_variants() {
        for (input, expected) in [(json!("1"), true), (json!("0"), false), (json!(true), true), (json!(0), false)] {
            let s: Sample = serde_json::from_value(json!({ "flag": input })).unwrap();
            assert_eq!(s.flag, expected);
        }
    }

    #[test]
    fn test_date_wrapped_in_title_object() {
        let s: Sample = serde_json::from_value(json!({"day": {"title": "2020-02-13"}})).unwrap();
        assert_eq!(s.day, NaiveDate::from_ymd_opt(2020, 2, 13));
    }

    #[test]
    fn test_datetime_and_bare_date() {
        let s: Sample = serde_json::from_value(json!({"at": "2019-05-06 10:36:54"})).unwrap();
        assert_eq!(s.at.unwrap().to_string(), "2019-05-06 10:36:54");

        let s: Sample = serde_json::from_value(json!({"at": "2019-05-06"})).unwrap();
        assert_eq!(s.at.unwrap().to_string(), "2019-05-06 00:00:00");
    }

    #[test]
    fn test_empty_date_is_none() {
        let s: Sample = serde_json::from_value(json!({"day": "", "at": null})).unwrap();
        assert!(s.day.is_none());
        assert!(s.at.is_none());
    }

    #[test]
    fn test_invalid_date_is_error() {
        let result: Result<Sample, _> = serde_json::from_value(json!({"day": "13.02.2020"}));
        assert!(result.is_err());
    }
}
