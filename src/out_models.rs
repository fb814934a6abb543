use serde::{Deserialize, Serialize};

use crate::models::CleanedRecord;

/* Signals */

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCount {
    pub term: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordSignal {
    pub top_keywords: Vec<TermCount>, // <= top_n, count desc, first-seen wins ties
    pub frequencies: Vec<TermCount>,  // every term, same ordering
    pub total_unique_words: usize,
    pub report: String, // grouped "term(count)" lines, 5 per line
}

impl KeywordSignal {
    pub fn top_terms(&self, n: usize) -> Vec<&str> {
        self.top_keywords.iter().take(n).map(|k| k.term.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: String, // YYYY-MM-DD
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceShare {
    pub source: String,
    pub count: usize,
    pub percentage: f64, // 1 decimal, half-up
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LengthStats {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    pub median: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LengthSignal {
    pub title_stats: Option<LengthStats>,
    pub content_stats: Option<LengthStats>,
}

/* Insights */

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    pub content: String,
}

/// Same shape as an insight, advisory tone.
pub type Suggestion = Insight;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightSet {
    pub insights: Vec<Insight>,
    pub suggestions: Vec<Suggestion>,
    pub formatted_insights: String,
    pub formatted_suggestions: String,
}

/* Assembled report */

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: String,
    pub content: String,
}

/// Compact strings for embedding the report into other layouts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlights {
    pub quality_summary: String,
    pub keyword_highlights: String,
    pub main_insights: String,
    pub key_suggestions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembledReport {
    pub title: String,
    pub sections: Vec<ReportSection>,
    pub highlights: Highlights,
}

/// Everything one pipeline run produced, so callers can pick the layer to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub raw_count: usize,
    pub cleaned_count: usize,
    pub cleaned: Vec<CleanedRecord>,
    pub keywords: KeywordSignal,
    pub time_distribution: Vec<DailyCount>,
    pub source_distribution: Vec<SourceShare>,
    pub text_length_stats: LengthSignal,
    pub key_summaries: Vec<CleanedRecord>,
    pub insights: InsightSet,
    pub report: AssembledReport,
}
