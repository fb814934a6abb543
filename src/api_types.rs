use serde::{Deserialize, Serialize};

/// Compact view of the report sent as the user prompt payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPayload {
    pub title: String,
    pub generated_at: String, // "YYYY-MM-DD HH:MM:SS"
    pub record_count: usize,
    pub heading: String,
    pub sections: Vec<PayloadSection>,
    pub keyword_highlights: String,
    pub sample_records: Vec<PayloadRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadSection {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadRecord {
    pub title: String,
    pub source: String,
    #[serde(default)]
    pub url: Option<String>,
}
