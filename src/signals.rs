use chrono::{Days, NaiveDate};
use chrono_tz::Tz;
use itertools::Itertools;
use std::collections::{BTreeMap, HashMap};

use crate::models::CleanedRecord;
use crate::out_models::{DailyCount, KeywordSignal, LengthSignal, LengthStats, SourceShare, TermCount};
use crate::tokenize::Tokenizer;

pub const DEFAULT_TOP_N: usize = 20;
pub const DEFAULT_WINDOW_DAYS: u32 = 7;
pub const MAX_WINDOW_DAYS: u32 = 366;
pub const DEFAULT_MAX_SUMMARIES: usize = 5;
const KEYWORDS_PER_LINE: usize = 5;
const SUMMARY_MIN_CHARS: usize = 20;

/// Round to one decimal, halves away from zero (half-up for the
/// non-negative values this is used on).
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Percentage of `part` in `total` to one decimal, halves rounded up;
/// 0 when `total` is 0. Rounded in integer tenths so exact halves such as
/// 23/80 = 28.75% are not lost to float error.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let (part, total) = (part as u128, total as u128);
    let tenths = (part * 2000 + total) / (2 * total);
    tenths as f64 / 10.0
}

/// Count occurrences, most frequent first. Equal counts keep the order in
/// which the items were first seen.
fn count_in_order<I, S>(items: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for item in items {
        let item = item.as_ref();
        match index.get(item) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(item.to_string(), counts.len());
                counts.push((item.to_string(), 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1)); // stable
    counts
}

/* ------------------------------- Keywords --------------------------------- */

pub fn analyze_keywords(records: &[CleanedRecord], tokenizer: &Tokenizer, top_n: usize) -> KeywordSignal {
    if records.is_empty() {
        return KeywordSignal {
            report: "No data available".to_string(),
            ..Default::default()
        };
    }

    let mut all_text = String::new();
    for r in records {
        all_text.push_str(&r.title);
        all_text.push(' ');
        all_text.push_str(&r.content);
        all_text.push(' ');
    }

    let frequencies: Vec<TermCount> = count_in_order(tokenizer.tokenize(&all_text))
        .into_iter()
        .map(|(term, count)| TermCount { term, count })
        .collect();
    let top_keywords: Vec<TermCount> = frequencies.iter().take(top_n).cloned().collect();

    KeywordSignal {
        report: keyword_report(&top_keywords),
        total_unique_words: frequencies.len(),
        top_keywords,
        frequencies,
    }
}

pub fn format_term_counts(terms: &[TermCount]) -> String {
    terms.iter().map(|k| format!("{}({})", k.term, k.count)).join(", ")
}

fn keyword_report(top: &[TermCount]) -> String {
    if top.is_empty() {
        return "No keywords extracted".to_string();
    }
    let mut report = String::from("High-frequency keywords (by frequency):\n");
    for group in top.chunks(KEYWORDS_PER_LINE) {
        report.push_str(&format!("  - {}\n", format_term_counts(group)));
    }
    report
}

/* ------------------------------- Timeline --------------------------------- */

/// Per-day counts for the `days` calendar days ending at `today` (inclusive),
/// zero-filled, oldest first. Dates are taken in `tz`. The window is clamped
/// to [`MAX_WINDOW_DAYS`] and stops at the earliest representable date.
pub fn analyze_time_distribution(
    records: &[CleanedRecord],
    today: NaiveDate,
    tz: Tz,
    days: u32,
) -> Vec<DailyCount> {
    let mut buckets: BTreeMap<NaiveDate, usize> = (0..days.min(MAX_WINDOW_DAYS))
        .map_while(|i| today.checked_sub_days(Days::new(u64::from(i))))
        .map(|day| (day, 0))
        .collect();

    for r in records {
        if let Some(at) = r.created_at {
            let day = at.with_timezone(&tz).date_naive();
            if let Some(count) = buckets.get_mut(&day) {
                *count += 1;
            }
        }
    }

    buckets
        .into_iter()
        .map(|(day, count)| DailyCount {
            date: day.format("%Y-%m-%d").to_string(),
            count,
        })
        .collect()
}

/* -------------------------------- Sources --------------------------------- */

pub fn analyze_source_distribution(records: &[CleanedRecord]) -> Vec<SourceShare> {
    let total = records.len();
    count_in_order(records.iter().map(|r| r.source.as_str()))
        .into_iter()
        .map(|(source, count)| SourceShare {
            source,
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

/* -------------------------------- Lengths --------------------------------- */

fn median(sorted: &[usize]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2] as f64
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) as f64 / 2.0
    }
}

fn summarize(values: &[usize], max: usize) -> Option<LengthStats> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mean = sorted.iter().sum::<usize>() as f64 / sorted.len() as f64;
    Some(LengthStats {
        min: sorted[0],
        max,
        mean: round1(mean),
        median: round1(median(&sorted)),
    })
}

/// Character-length statistics for titles and contents. Content min, mean
/// and median skip empty contents; max looks at all of them.
pub fn analyze_text_length(records: &[CleanedRecord]) -> LengthSignal {
    let titles: Vec<usize> = records.iter().map(|r| r.title.chars().count()).collect();
    let contents: Vec<usize> = records.iter().map(|r| r.content.chars().count()).collect();
    let non_empty: Vec<usize> = contents.iter().copied().filter(|&n| n > 0).collect();

    LengthSignal {
        title_stats: summarize(&titles, titles.iter().copied().max().unwrap_or(0)),
        content_stats: summarize(&non_empty, contents.iter().copied().max().unwrap_or(0)),
    }
}

/* ------------------------------- Summaries -------------------------------- */

/// The records carrying the most text, longest first.
pub fn extract_key_summaries(records: &[CleanedRecord], max: usize) -> Vec<CleanedRecord> {
    records
        .iter()
        .filter(|r| r.content.chars().count() > SUMMARY_MIN_CHARS)
        .sorted_by_key(|r| std::cmp::Reverse(r.content.chars().count()))
        .take(max)
        .cloned()
        .collect()
}
