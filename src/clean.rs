use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

use crate::models::{CleanedRecord, RawRecord, UNKNOWN_SOURCE};

pub const MIN_TITLE_CHARS: usize = 5;

/// Identity of a record for deduplication. The sentinel source counts as
/// no source, so cleaning an already-cleaned set keys it the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DedupKey {
    TitleUrl(String, String),
    TitleSource(String, String),
    Title(String),
}

fn present(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

fn dedup_key(r: &RawRecord) -> DedupKey {
    let title = r.title.trim().to_string();
    if let Some(url) = present(&r.url) {
        DedupKey::TitleUrl(title, url.to_string())
    } else if let Some(src) = present(&r.source).filter(|s| *s != UNKNOWN_SOURCE) {
        DedupKey::TitleSource(title, src.to_string())
    } else {
        DedupKey::Title(title)
    }
}

pub fn placeholder_content(title: &str) -> String {
    format!("{} - no detailed content", title)
}

/// Deduplicate, validate and default a batch of raw records.
///
/// Output keeps the position where each key was first seen, holding the
/// last record seen for that key. Invalid records are dropped, never
/// reported as errors.
pub fn clean(records: &[RawRecord]) -> Vec<CleanedRecord> {
    let mut slot_of: HashMap<DedupKey, usize> = HashMap::new();
    let mut unique: Vec<&RawRecord> = Vec::with_capacity(records.len());

    for r in records {
        match slot_of.entry(dedup_key(r)) {
            Entry::Occupied(slot) => unique[*slot.get()] = r,
            Entry::Vacant(slot) => {
                slot.insert(unique.len());
                unique.push(r);
            }
        }
    }
    let duplicates = records.len() - unique.len();

    let cleaned: Vec<CleanedRecord> = unique.into_iter().filter_map(repair).collect();

    debug!(
        "Cleaning completed - raw={}, duplicates={}, dropped={}, retained={}",
        records.len(),
        duplicates,
        records.len() - duplicates - cleaned.len(),
        cleaned.len()
    );
    cleaned
}

fn repair(r: &RawRecord) -> Option<CleanedRecord> {
    let title = r.title.trim();
    if title.chars().count() < MIN_TITLE_CHARS {
        debug!("Dropping record - reason=short_title, title={:?}", title);
        return None;
    }

    let content = present(&r.content);
    let url = present(&r.url);
    if content.is_none() && url.is_none() {
        debug!("Dropping record - reason=no_content_or_url, title={:?}", title);
        return None;
    }

    Some(CleanedRecord {
        title: title.to_string(),
        content: content
            .map(str::to_string)
            .unwrap_or_else(|| placeholder_content(title)),
        url: url.map(str::to_string),
        source: present(&r.source).unwrap_or(UNKNOWN_SOURCE).to_string(),
        created_at: r.created_at,
    })
}
