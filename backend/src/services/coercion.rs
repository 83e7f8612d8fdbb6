//! Conversion of loosely-typed JSON input into typed record fields.
//!
//! Dates must match `YYYY-MM-DD`. Numeric fields accept JSON numbers and
//! numeric strings; anything that does not yield a finite `f64` is rejected.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A JSON number or a string expected to hold one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
}

/// A JSON string or a number standing in for one (e.g. a numeric ticker).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum LooseText {
    Text(String),
    Number(Number),
}

impl From<LooseText> for String {
    fn from(raw: LooseText) -> Self {
        match raw {
            LooseText::Text(s) => s,
            LooseText::Number(n) => n.to_string(),
        }
    }
}

/// `deserialize_with` helper accepting a string or a number as text.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    LooseText::deserialize(deserializer).map(String::from)
}

/// Like [`text`] for optional fields; pair with `#[serde(default)]`.
pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<LooseText>::deserialize(deserializer)?.map(String::from))
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoercionError {
    InvalidDate(String),
    InvalidNumber(String),
}

impl std::fmt::Display for CoercionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate(raw) => write!(f, "invalid date {raw:?}, expected YYYY-MM-DD"),
            Self::InvalidNumber(raw) => write!(f, "invalid number {raw}"),
        }
    }
}

impl std::error::Error for CoercionError {}

pub fn parse_date(raw: &str) -> Result<NaiveDate, CoercionError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| CoercionError::InvalidDate(raw.to_string()))
}

pub fn parse_number(raw: &LooseNumber) -> Result<f64, CoercionError> {
    match raw {
        LooseNumber::Number(n) => finite(*n, || n.to_string()),
        LooseNumber::Text(s) => parse_numeric_str(s),
    }
}

/// Importer entry point: like [`parse_number`] but over an arbitrary JSON value.
pub fn parse_json_number(value: &Value) -> Result<f64, CoercionError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| CoercionError::InvalidNumber(n.to_string())),
        Value::String(s) => parse_numeric_str(s),
        other => Err(CoercionError::InvalidNumber(other.to_string())),
    }
}

fn parse_numeric_str(s: &str) -> Result<f64, CoercionError> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| CoercionError::InvalidNumber(format!("{s:?}")))
        .and_then(|n| finite(n, || format!("{s:?}")))
}

fn finite(n: f64, describe: impl FnOnce() -> String) -> Result<f64, CoercionError> {
    if n.is_finite() {
        Ok(n)
    } else {
        Err(CoercionError::InvalidNumber(describe()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_date_valid() {
        assert_eq!(
            parse_date("2012-01-05").unwrap(),
            NaiveDate::from_ymd_opt(2012, 1, 5).unwrap()
        );
    }

    #[test]
    fn test_parse_date_rejects_other_formats() {
        assert!(parse_date("05/01/2012").is_err());
        assert!(parse_date("2012-13-01").is_err());
        assert!(parse_date("20120105").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_loose_number_deserializes_both_shapes() {
        let n: LooseNumber = serde_json::from_value(json!(10)).unwrap();
        assert_eq!(n, LooseNumber::Number(10.0));
        let s: LooseNumber = serde_json::from_value(json!("123.4")).unwrap();
        assert_eq!(s, LooseNumber::Text("123.4".to_string()));
        assert!(serde_json::from_value::<LooseNumber>(json!(true)).is_err());
        assert!(serde_json::from_value::<LooseNumber>(json!(null)).is_err());
    }

    #[derive(Deserialize)]
    struct Ticker {
        #[serde(deserialize_with = "text")]
        code: String,
        #[serde(default, deserialize_with = "optional_text")]
        alias: Option<String>,
    }

    #[test]
    fn test_text_accepts_strings_and_numbers() {
        let t: Ticker = serde_json::from_value(json!({"code": 1234, "alias": "ABC"})).unwrap();
        assert_eq!(t.code, "1234");
        assert_eq!(t.alias.as_deref(), Some("ABC"));

        let t: Ticker = serde_json::from_value(json!({"code": "ABC", "alias": 7})).unwrap();
        assert_eq!(t.code, "ABC");
        assert_eq!(t.alias.as_deref(), Some("7"));

        let t: Ticker = serde_json::from_value(json!({"code": "ABC"})).unwrap();
        assert!(t.alias.is_none());

        assert!(serde_json::from_value::<Ticker>(json!({"code": true})).is_err());
    }

    #[test]
    fn test_parse_number_from_string() {
        assert_eq!(parse_number(&LooseNumber::Text("123.4".into())).unwrap(), 123.4);
        assert_eq!(parse_number(&LooseNumber::Text(" 7 ".into())).unwrap(), 7.0);
        assert_eq!(parse_number(&LooseNumber::Number(2.5)).unwrap(), 2.5);
    }

    #[test]
    fn test_parse_number_rejects_garbage_and_non_finite() {
        assert!(parse_number(&LooseNumber::Text("not-a-number".into())).is_err());
        assert!(parse_number(&LooseNumber::Text("".into())).is_err());
        assert!(parse_number(&LooseNumber::Text("NaN".into())).is_err());
        assert!(parse_number(&LooseNumber::Text("inf".into())).is_err());
    }

    #[test]
    fn test_parse_json_number() {
        assert_eq!(parse_json_number(&json!("1000")).unwrap(), 1000.0);
        assert!(parse_json_number(&json!("1,000")).is_err());
        assert_eq!(parse_json_number(&json!(42)).unwrap(), 42.0);
        assert!(parse_json_number(&json!(null)).is_err());
        assert!(parse_json_number(&json!([1])).is_err());
        assert!(parse_json_number(&json!("-")).is_err());
    }
}
