use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::clean::clean;
use crate::models::RawRecord;
use crate::out_models::{AnalysisResult, AssembledReport, Highlights, InsightSet, KeywordSignal, ReportSection};
use crate::signals::{
    analyze_keywords, analyze_source_distribution, analyze_text_length, analyze_time_distribution,
    extract_key_summaries, format_term_counts, percentage, DEFAULT_MAX_SUMMARIES, DEFAULT_TOP_N,
    DEFAULT_WINDOW_DAYS,
};
use crate::insights::synthesize;
use crate::tokenize::{Segmentation, Tokenizer};

pub const REPORT_HEADING: &str = "Comprehensive Data Analysis Report";
const HIGHLIGHT_KEYWORDS: usize = 5;
const TITLE_PREFIX_CHARS: usize = 30;

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub top_n: usize,
    pub window_days: u32,
    pub max_summaries: usize,
    pub segmentation: Segmentation,
    pub timezone: Tz,
    pub today: NaiveDate, // last day of the timeline window
}

impl AnalysisOptions {
    pub fn new(today: NaiveDate, timezone: Tz) -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            window_days: DEFAULT_WINDOW_DAYS,
            max_summaries: DEFAULT_MAX_SUMMARIES,
            segmentation: Segmentation::default(),
            timezone,
            today,
        }
    }

    /// Options anchored at the current date in `timezone`.
    pub fn today_in(timezone: Tz) -> Self {
        Self::new(Utc::now().with_timezone(&timezone).date_naive(), timezone)
    }
}

/// Runs clean -> extract -> synthesize -> assemble over one batch of records.
/// Holds no state between calls; share it freely across threads.
#[derive(Debug, Clone)]
pub struct Analyzer {
    options: AnalysisOptions,
    tokenizer: Tokenizer,
}

impl Analyzer {
    pub fn new(options: AnalysisOptions) -> Self {
        let tokenizer = Tokenizer::new(options.segmentation);
        Self { options, tokenizer }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub fn analyze(&self, raw: &[RawRecord]) -> AnalysisResult {
        let o = &self.options;
        let cleaned = clean(raw);

        let keywords = analyze_keywords(&cleaned, &self.tokenizer, o.top_n);
        let time_distribution = analyze_time_distribution(&cleaned, o.today, o.timezone, o.window_days);
        let source_distribution = analyze_source_distribution(&cleaned);
        let text_length_stats = analyze_text_length(&cleaned);
        let key_summaries = extract_key_summaries(&cleaned, o.max_summaries);

        let insights = synthesize(&cleaned, &keywords, &source_distribution);
        let report = assemble_report(raw.len(), cleaned.len(), &keywords, &insights);

        debug!(
            "Analysis completed - raw={}, cleaned={}, unique_terms={}, sources={}, insights={}",
            raw.len(),
            cleaned.len(),
            keywords.total_unique_words,
            source_distribution.len(),
            insights.insights.len()
        );

        AnalysisResult {
            raw_count: raw.len(),
            cleaned_count: cleaned.len(),
            cleaned,
            keywords,
            time_distribution,
            source_distribution,
            text_length_stats,
            key_summaries,
            insights,
            report,
        }
    }

    /// Only the assembled report of [`Analyzer::analyze`].
    pub fn assemble(&self, raw: &[RawRecord]) -> AssembledReport {
        self.analyze(raw).report
    }
}

/// Share of raw records lost to cleaning, 0 for an empty batch.
pub fn cleaning_loss_pct(raw_count: usize, cleaned_count: usize) -> f64 {
    percentage(raw_count.saturating_sub(cleaned_count), raw_count)
}

pub fn assemble_report(
    raw_count: usize,
    cleaned_count: usize,
    keywords: &KeywordSignal,
    insights: &InsightSet,
) -> AssembledReport {
    let loss = cleaning_loss_pct(raw_count, cleaned_count);

    let sections = vec![
        ReportSection {
            title: "1. Data Quality Overview".to_string(),
            content: format!(
                "Processing summary:\n- Raw records: {}\n- Valid after cleaning: {}\n- Cleaning loss: {:.1}%",
                raw_count, cleaned_count, loss
            ),
        },
        ReportSection {
            title: "2. Keyword Analysis".to_string(),
            content: keywords.report.clone(),
        },
        ReportSection {
            title: "3. Data Insights".to_string(),
            content: insights.formatted_insights.clone(),
        },
        ReportSection {
            title: "4. Recommendations".to_string(),
            content: insights.formatted_suggestions.clone(),
        },
    ];

    let top = &keywords.top_keywords[..keywords.top_keywords.len().min(HIGHLIGHT_KEYWORDS)];
    let highlights = Highlights {
        quality_summary: format!(
            "{} raw records, {} valid after cleaning, cleaning loss {:.1}%",
            raw_count, cleaned_count, loss
        ),
        keyword_highlights: format_term_counts(top),
        main_insights: insights.formatted_insights.clone(),
        key_suggestions: insights.formatted_suggestions.clone(),
    };

    AssembledReport {
        title: REPORT_HEADING.to_string(),
        sections,
        highlights,
    }
}

/// Human title for a report over `records`.
pub fn report_title(records: &[RawRecord]) -> String {
    match records {
        [] => "Report: (no records)".to_string(),
        [only] => format!("Report: {}", only.title.trim()),
        [first, ..] => {
            let prefix: String = first.title.trim().chars().take(TITLE_PREFIX_CHARS).collect();
            format!("Report: {}... and {} items", prefix, records.len())
        }
    }
}
