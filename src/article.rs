// src/article.rs
// Raw (upstream) and clean (normalized) article records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Article as returned by the NewsAPI `everything` endpoint.
///
/// Every field is lenient on purpose: the upstream payload is not trusted, and
/// validation belongs to the processor, which rejects the whole batch rather
/// than letting half-populated rows through.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawArticle {
    pub title: Option<String>,
    /// Nullable upstream. The nested `Option` keeps "key absent" distinct
    /// from an explicit `null`: absent is a shape error, `null` is a valid
    /// empty description.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    pub source: Option<RawSource>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    pub url: Option<String>,
}

/// Marks a key as present even when its value is `null`, so `#[serde(default)]`
/// only fires when the key is truly absent.
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// The upstream `source` field is polymorphic: most responses carry a
/// structured `{"id": ..., "name": ...}` object, but older payloads ship a
/// plain string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawSource {
    Plain(String),
    Structured(StructuredSource),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StructuredSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl RawSource {
    /// Resolve to the publisher display name. Structured sources use `name`,
    /// falling back to the object's JSON form when `name` is absent; plain
    /// strings pass through unchanged.
    pub fn display_name(&self) -> String {
        match self {
            RawSource::Plain(s) => s.clone(),
            RawSource::Structured(s) => match &s.name {
                Some(name) => name.clone(),
                None => serde_json::to_string(s).unwrap_or_default(),
            },
        }
    }
}

/// Normalized article row used by all downstream aggregates.
///
/// Collection invariants (maintained by `processor::process`):
/// - no two rows share the same `(title, source)` pair,
/// - rows are sorted by `published_at` descending,
/// - `published_at` is always UTC.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CleanArticle {
    pub title: String,
    pub description: Option<String>,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_object_and_string_forms_both_parse() {
        let structured: RawSource = serde_json::from_str(r#"{"id":null,"name":"Reuters"}"#).unwrap();
        let plain: RawSource = serde_json::from_str(r#""Reuters""#).unwrap();
        assert_eq!(structured.display_name(), "Reuters");
        assert_eq!(plain.display_name(), "Reuters");
    }

    #[test]
    fn structured_source_without_name_falls_back_to_json_form() {
        let src: RawSource = serde_json::from_str(r#"{"id":"coindesk"}"#).unwrap();
        assert_eq!(src.display_name(), r#"{"id":"coindesk","name":null}"#);
    }

    #[test]
    fn absent_description_key_is_distinct_from_null() {
        let with_null: RawArticle =
            serde_json::from_str(r#"{"title":"t","description":null}"#).unwrap();
        let without_key: RawArticle = serde_json::from_str(r#"{"title":"t"}"#).unwrap();
        assert_eq!(with_null.description, Some(None));
        assert_eq!(without_key.description, None);
    }

    #[test]
    fn full_newsapi_article_parses() {
        let json = r#"{
            "source": {"id": null, "name": "CoinDesk"},
            "author": "John Doe",
            "title": "Bitcoin Hits New High",
            "description": "Bitcoin reached a new all-time high today",
            "url": "https://coindesk.com/bitcoin-high",
            "urlToImage": "https://coindesk.com/image.jpg",
            "publishedAt": "2024-01-15T10:00:00Z",
            "content": "Full article content here..."
        }"#;
        let article: RawArticle = serde_json::from_str(json).unwrap();
        assert_eq!(article.title.as_deref(), Some("Bitcoin Hits New High"));
        assert_eq!(
            article.source.as_ref().map(|s| s.display_name()).as_deref(),
            Some("CoinDesk")
        );
        assert_eq!(article.published_at.as_deref(), Some("2024-01-15T10:00:00Z"));
    }
}
