//! Shared value types used by the models and the client surface.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! behaviour: [`Text`] absorbs the backend's habit of returning the same field
//! as a string on one endpoint and a number on another, and [`ListQuery`]
//! describes one page request for any "get many" operation.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Lenient scalar
// ---------------------------------------------------------------------------

/// A scalar field value as reported by the backend.
///
/// Accepts JSON strings, numbers and booleans and always stores the textual
/// form. Serializes back as a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Text(String);

impl Text {
    /// Creates a [`Text`] from any string-like value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the value as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the value is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Parses the value as a decimal using `.` as the decimal separator.
    ///
    /// Thousands separators (`,`) are ignored. Returns `None` when the value is
    /// not numeric.
    pub fn as_f64(&self) -> Option<f64> {
        let trimmed = self.0.trim();
        trimmed
            .parse::<f64>()
            .ok()
            .or_else(|| trimmed.replace(',', "").parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }

    /// Returns `true` for the backend's flag spellings `"1"` and `"true"`
    /// (any case).
    pub fn is_truthy(&self) -> bool {
        let v = self.0.trim();
        v == "1" || v.eq_ignore_ascii_case("true")
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Text {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Text {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Serialize for Text {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Text {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TextVisitor;

        impl Visitor<'_> for TextVisitor {
            type Value = Text;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string, number or boolean")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Text, E> {
                Ok(Text(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Text, E> {
                Ok(Text(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Text, E> {
                Ok(Text(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Text, E> {
                Ok(Text(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Text, E> {
                Ok(Text(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Text, E> {
                Ok(Text(v.to_string()))
            }
        }

        deserializer.deserialize_any(TextVisitor)
    }
}

// ---------------------------------------------------------------------------
// Paging
// ---------------------------------------------------------------------------

/// Page request accepted by every "get many" operation.
///
/// `page_size` is sent as `limit` on both endpoint generations. `page` and
/// `search` are only understood by the JSON endpoints and are sent there as
/// query parameters. `filters` are passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Maximum number of records to return.
    pub page_size: u32,
    /// One-based page number.
    pub page: u32,
    /// Free-text search term.
    pub search: Option<String>,
    /// Additional backend filter fields.
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    /// Creates a query for the first page with the given page size.
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    /// Sets the one-based page number. Zero is clamped to one.
    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Sets the search term.
    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Adds a filter field.
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Returns `true` if this query targets the first page.
    pub fn is_first_page(&self) -> bool {
        self.page <= 1
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page_size: 50,
            page: 1,
            search: None,
            filters: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_accepts_numbers_and_booleans() {
        let values: Vec<Text> = serde_json::from_str(r#"["12.50", 7, 3.25, true]"#).unwrap();
        let raw: Vec<&str> = values.iter().map(Text::as_str).collect();
        assert_eq!(raw, vec!["12.50", "7", "3.25", "true"]);
    }

    #[test]
    fn test_text_rejects_structured_values() {
        assert!(serde_json::from_str::<Text>(r#"{"a":1}"#).is_err());
    }

    #[test]
    fn test_text_numeric_and_flag_helpers() {
        assert_eq!(Text::from("1,250.75").as_f64(), Some(1250.75));
        assert_eq!(Text::from("n/a").as_f64(), None);
        assert!(Text::from("TRUE").is_truthy());
        assert!(Text::from("1").is_truthy());
        assert!(!Text::from("0").is_truthy());
    }

    #[test]
    fn test_list_query_defaults_to_first_page() {
        let q = ListQuery::with_page_size(20).page(0);
        assert_eq!(q.page, 1);
        assert_eq!(q.page_size, 20);
        assert!(q.is_first_page());
    }
}
