// src/export.rs
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use std::{fs, path::Path};

use crate::out_models::{AnalysisResult, DailyCount, LengthStats, SourceShare, TermCount};

const CLOUD_TERMS: usize = 50;

pub const VIZ_FILES: [&str; 4] = [
    "viz.timeline.json",
    "viz.sources.json",
    "viz.keywords.json",
    "viz.lengths.json",
];

/* -------------------------------------------------------------------------- */
/* Entry point                                                                */
/* -------------------------------------------------------------------------- */

/// Write chart-ready JSON for one report into `report_dir`.
pub fn write_all_viz(report_dir: &Path, date: &str, result: &AnalysisResult) -> Result<()> {
    fs::create_dir_all(report_dir).with_context(|| format!("create {:?}", report_dir))?;

    write_json(report_dir.join("viz.timeline.json"), &build_timeline(&result.time_distribution))?;
    write_json(report_dir.join("viz.sources.json"), &build_sources(&result.source_distribution))?;
    write_json(
        report_dir.join("viz.keywords.json"),
        &build_keywords(&result.keywords.frequencies, result.keywords.total_unique_words),
    )?;
    write_json(
        report_dir.join("viz.lengths.json"),
        &VLengths {
            title: result.text_length_stats.title_stats.clone(),
            content: result.text_length_stats.content_stats.clone(),
        },
    )?;

    let idx = json!({
        "date": date,
        "version": 1,
        "counts": {
            "raw": result.raw_count,
            "cleaned": result.cleaned_count,
            "sources": result.source_distribution.len(),
            "unique_terms": result.keywords.total_unique_words,
        },
        "files": VIZ_FILES,
    });
    write_json(report_dir.join("viz.index.json"), &idx)?;

    Ok(())
}

pub fn write_json<P: AsRef<Path>, T: ?Sized + Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, serde_json::to_vec_pretty(value)?).with_context(|| format!("write {:?}", path))
}

/* -------------------------------------------------------------------------- */
/* Timeline                                                                   */
/* -------------------------------------------------------------------------- */

#[derive(Serialize)]
struct VTimeline {
    days: Vec<VDay>,
    total: usize,
    peak: Option<String>, // busiest date, earliest on ties
}

#[derive(Serialize)]
struct VDay {
    date: String,
    count: usize,
}

fn build_timeline(days: &[DailyCount]) -> VTimeline {
    let peak = days
        .iter()
        .filter(|d| d.count > 0)
        .fold(None::<&DailyCount>, |best, d| match best {
            Some(b) if b.count >= d.count => Some(b),
            _ => Some(d),
        })
        .map(|d| d.date.clone());

    VTimeline {
        days: days.iter().map(|d| VDay { date: d.date.clone(), count: d.count }).collect(),
        total: days.iter().map(|d| d.count).sum(),
        peak,
    }
}

/* -------------------------------------------------------------------------- */
/* Sources                                                                    */
/* -------------------------------------------------------------------------- */

#[derive(Serialize)]
struct VSources {
    slices: Vec<VSlice>,
    total: usize,
}

#[derive(Serialize)]
struct VSlice {
    label: String,
    value: usize,
    percentage: f64,
}

fn build_sources(shares: &[SourceShare]) -> VSources {
    VSources {
        slices: shares
            .iter()
            .map(|s| VSlice { label: s.source.clone(), value: s.count, percentage: s.percentage })
            .collect(),
        total: shares.iter().map(|s| s.count).sum(),
    }
}

/* -------------------------------------------------------------------------- */
/* Keyword cloud                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Serialize)]
struct VKeywords {
    cloud: Vec<VWord>,
    total_unique: usize,
}

#[derive(Serialize)]
struct VWord {
    text: String,
    weight: usize,
    size: f32, // 0..1 relative to the most frequent term
}

fn build_keywords(freqs: &[TermCount], total_unique: usize) -> VKeywords {
    let max = freqs.first().map_or(1, |t| t.count.max(1)) as f32;
    VKeywords {
        cloud: freqs
            .iter()
            .take(CLOUD_TERMS)
            .map(|t| VWord { text: t.term.clone(), weight: t.count, size: t.count as f32 / max })
            .collect(),
        total_unique,
    }
}

/* -------------------------------------------------------------------------- */
/* Lengths                                                                    */
/* -------------------------------------------------------------------------- */

#[derive(Serialize)]
struct VLengths {
    title: Option<LengthStats>,
    content: Option<LengthStats>,
}
