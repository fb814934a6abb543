use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source label given to cleaned records that arrived without one.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// One scraped/curated item as handed over by acquisition or the record store.
/// Every field but `title` may be missing; the cleaner decides what survives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>, // absent => excluded from the timeline only
}

impl RawRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }
}

/// A record that passed cleaning: title >= 5 chars, content never empty,
/// source always set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanedRecord {
    pub title: String,
    pub content: String,
    pub url: Option<String>,
    pub source: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<CleanedRecord> for RawRecord {
    fn from(r: CleanedRecord) -> Self {
        RawRecord {
            title: r.title,
            content: Some(r.content),
            url: r.url,
            source: Some(r.source),
            created_at: r.created_at,
        }
    }
}
