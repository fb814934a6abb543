use tracing::info;

use crate::models::RawRecord;

pub fn approx_tokens(s: &str) -> usize {
    // heuristic ~4 chars/token
    (s.chars().count() + 3) / 4
}

/// Trim `s` from the end until it fits `max_tokens`.
pub fn cap_prompt(s: &str, max_tokens: usize) -> String {
    if approx_tokens(s) <= max_tokens {
        return s.to_string();
    }
    s.chars().take(max_tokens * 4).collect()
}

/// Bound a record batch before it enters the analyzer. Keeps the first `max`.
pub fn cap_records(mut records: Vec<RawRecord>, max: usize) -> Vec<RawRecord> {
    if records.len() > max {
        info!("Record cap applied - received={}, kept={}", records.len(), max);
        records.truncate(max);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_estimate_rounds_up() {
        assert_eq!(approx_tokens(""), 0);
        assert_eq!(approx_tokens("abc"), 1);
        assert_eq!(approx_tokens("abcde"), 2);
        assert_eq!(approx_tokens("人工智能"), 1);
    }

    #[test]
    fn prompt_cap_counts_characters() {
        let s = "字".repeat(100);
        assert_eq!(cap_prompt(&s, 100), s);
        let capped = cap_prompt(&s, 10);
        assert_eq!(capped.chars().count(), 40);
        assert!(approx_tokens(&capped) <= 10);
    }

    #[test]
    fn record_cap_keeps_leading_records() {
        let records: Vec<RawRecord> = (0..5).map(|i| RawRecord::new(format!("record {i}"))).collect();
        let kept = cap_records(records.clone(), 3);
        assert_eq!(kept, records[..3].to_vec());
        assert_eq!(cap_records(records.clone(), 10).len(), 5);
    }
}
