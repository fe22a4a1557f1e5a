//! Submitted form fields
//!
//! Handlers receive either URL-encoded forms or JSON objects. Both are
//! normalised into [`FormData`]: a flat map of field name to text, where JSON
//! numbers and booleans are stringified and `null` means "not submitted".

use crate::domain::{Result, ShasthoError};
use chrono::NaiveDate;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormData(BTreeMap<String, String>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and internal callers
    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.0.insert(field.to_string(), value.into());
    }

    /// Raw submitted value, untrimmed
    pub fn raw(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Trimmed value, `None` when absent or blank
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn get_string(&self, field: &str) -> Option<String> {
        self.get(field).map(str::to_string)
    }

    /// Value of a field that validation has already required
    pub fn require(&self, field: &str) -> Result<&str> {
        self.get(field).ok_or_else(|| ShasthoError::required(field))
    }

    /// Parses an optional field, reporting parse failures against the field
    pub fn parse<T>(&self, field: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.get(field) {
            None => Ok(None),
            Some(v) => v
                .parse::<T>()
                .map(Some)
                .map_err(|e| ShasthoError::invalid_field(field, e.to_string())),
        }
    }

    /// Parses a field that must be present
    pub fn parse_required<T>(&self, field: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.parse(field)?
            .ok_or_else(|| ShasthoError::required(field))
    }

    pub fn date(&self, field: &str) -> Result<Option<NaiveDate>> {
        match self.get(field) {
            None => Ok(None),
            Some(v) => parse_date(v)
                .map(Some)
                .ok_or_else(|| ShasthoError::invalid_field(field, INVALID_DATE)),
        }
    }

    pub fn date_required(&self, field: &str) -> Result<NaiveDate> {
        self.date(field)?
            .ok_or_else(|| ShasthoError::required(field))
    }

    /// Checkbox-style flag; absent means `default`
    pub fn flag(&self, field: &str, default: bool) -> bool {
        match self.get(field) {
            None => default,
            Some(v) => matches!(v.to_ascii_lowercase().as_str(), "true" | "on" | "1" | "yes"),
        }
    }
}

pub(crate) const INVALID_DATE: &str = "Invalid date format. Use YYYY-MM-DD";

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for FormData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct FormVisitor;

        impl<'de> Visitor<'de> for FormVisitor {
            type Value = FormData;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of form fields")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<FormData, A::Error> {
                let mut fields = BTreeMap::new();
                while let Some((key, value)) = map.next_entry::<String, serde_json::Value>()? {
                    let text = match value {
                        serde_json::Value::Null => continue,
                        serde_json::Value::String(s) => s,
                        serde_json::Value::Bool(b) => b.to_string(),
                        serde_json::Value::Number(n) => n.to_string(),
                        other => serde_json::to_string(&other).map_err(de::Error::custom)?,
                    };
                    fields.insert(key, text);
                }
                Ok(FormData(fields))
            }
        }

        deserializer.deserialize_map(FormVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_values_are_stringified() {
        let form: FormData = serde_json::from_value(serde_json::json!({
            "pulse": 72,
            "is_available": true,
            "note_text": "  stable  ",
            "end_date": null
        }))
        .unwrap();
        assert_eq!(form.get("pulse"), Some("72"));
        assert_eq!(form.get("is_available"), Some("true"));
        assert_eq!(form.get("note_text"), Some("stable"));
        assert_eq!(form.get("end_date"), None);
    }

    #[test]
    fn test_blank_counts_as_missing() {
        let form = FormData::new().with("full_name", "   ");
        assert!(form.get("full_name").is_none());
        assert!(form.require("full_name").is_err());
    }

    #[test]
    fn test_parse_reports_field() {
        let form = FormData::new().with("pulse", "fast");
        let err = form.parse::<i32>("pulse").unwrap_err();
        assert!(err.to_string().contains("pulse"));
    }

    #[test]
    fn test_date_parsing() {
        let form = FormData::new()
            .with("good", "2024-02-29")
            .with("bad", "29/02/2024");
        assert_eq!(
            form.date("good").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert!(form.date("bad").is_err());
        assert_eq!(form.date("absent").unwrap(), None);
    }
}
