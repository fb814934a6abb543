use itertools::Itertools;

use crate::models::CleanedRecord;
use crate::out_models::{Insight, InsightSet, KeywordSignal, SourceShare, Suggestion};
use crate::signals::format_term_counts;

const THEME_TERMS: usize = 3;
const CONCENTRATION_PCT: f64 = 50.0;

fn insight(title: &str, content: String) -> Insight {
    Insight {
        title: title.to_string(),
        content,
    }
}

/// Turn extracted signals into observations and advice. Rules whose data
/// is missing are skipped.
pub fn synthesize(records: &[CleanedRecord], keywords: &KeywordSignal, sources: &[SourceShare]) -> InsightSet {
    let mut insights = Vec::new();
    let mut suggestions = Vec::new();

    if !keywords.top_keywords.is_empty() {
        let top = &keywords.top_keywords[..keywords.top_keywords.len().min(THEME_TERMS)];
        insights.push(insight(
            "Core themes",
            format!("The data centers on {} as its core themes.", format_term_counts(top)),
        ));
    }

    if sources.len() > 1 {
        let primary = &sources[0];
        if primary.percentage > CONCENTRATION_PCT {
            insights.push(insight(
                "Source concentration",
                format!(
                    "Over {}% of the data comes from {}; consider adding other sources for a more complete view.",
                    primary.percentage, primary.source
                ),
            ));
        }
    }

    insights.push(volume_assessment(records.len()));

    if let Some(c) = complexity(records) {
        insights.push(c);
    }

    suggestions.push(insight(
        "Recommended actions",
        "Based on the current analysis:\n\
         1. Refresh the data regularly to keep it current\n\
         2. Tune the acquisition strategy using the keyword findings\n\
         3. Dig deeper into the high-frequency themes\n\
         4. Cross-reference other data dimensions"
            .to_string(),
    ));

    if !records.is_empty() {
        let content = if keywords.total_unique_words > 0 {
            format!(
                "{} unique keywords were identified; consider a focused study of core terms such as {}.",
                keywords.total_unique_words,
                keywords.top_terms(THEME_TERMS).join(", ")
            )
        } else {
            "0 unique keywords were identified; broaden collection or review segmentation before a focused study."
                .to_string()
        };
        suggestions.push(insight("Deepen topic analysis", content));
    }

    InsightSet {
        formatted_insights: bulleted(&insights),
        formatted_suggestions: bulleted(&suggestions),
        insights,
        suggestions,
    }
}

fn volume_assessment(n: usize) -> Insight {
    let verdict = match n {
        0..=9 => "small sample, representativeness may be limited",
        10..=49 => "moderate sample, supports basic trend analysis",
        _ => "sufficient sample, high-confidence results",
    };
    insight("Volume assessment", format!("{} valid records: {}.", n, verdict))
}

fn complexity(records: &[CleanedRecord]) -> Option<Insight> {
    let lengths: Vec<usize> = records
        .iter()
        .map(|r| {
            if r.content.is_empty() {
                r.title.chars().count()
            } else {
                r.content.chars().count()
            }
        })
        .collect();
    if lengths.is_empty() {
        return None;
    }

    let mean = lengths.iter().sum::<usize>() as f64 / lengths.len() as f64;
    let verdict = if mean < 200.0 {
        "concise"
    } else if mean < 500.0 {
        "moderately detailed"
    } else {
        "extensive"
    };
    Some(insight(
        "Content complexity",
        format!("Average text length is {:.0} characters; content is {}.", mean, verdict),
    ))
}

fn bulleted(items: &[Suggestion]) -> String {
    items.iter().map(|i| format!("• {}: {}", i.title, i.content)).join("\n")
}
