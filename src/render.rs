use chrono::{DateTime, Utc};

use crate::models::CleanedRecord;
use crate::out_models::AssembledReport;

const TABLE_ROWS: usize = 10;

fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let head: String = s.chars().take(max).collect();
    format!("{}...", head)
}

fn cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

pub fn render_report_markdown(
    title: &str,
    report: &AssembledReport,
    records: &[CleanedRecord],
    generated_at: DateTime<Utc>,
) -> String {
    let mut md = String::new();
    md.push_str(&format!("# {}\n\n", title.trim()));
    md.push_str(&format!(
        "_{}, generated {}_\n\n",
        report.title,
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    md.push_str("## Highlights\n");
    md.push_str(&format!("- **Quality:** {}\n", report.highlights.quality_summary));
    if !report.highlights.keyword_highlights.is_empty() {
        md.push_str(&format!("- **Keywords:** {}\n", report.highlights.keyword_highlights));
    }
    md.push('\n');

    for s in &report.sections {
        md.push_str(&format!("## {}\n", s.title));
        md.push_str(&format!("{}\n\n", s.content.trim()));
    }

    if !records.is_empty() {
        md.push_str(&format!("## Records ({} total)\n", records.len()));
        md.push_str("| No. | Title | Source | URL |\n");
        md.push_str("|---|---|---|---|\n");
        for (i, r) in records.iter().take(TABLE_ROWS).enumerate() {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                i + 1,
                cell(&clip(&r.title, 50)),
                cell(&r.source),
                cell(&clip(r.url.as_deref().unwrap_or("-"), 60))
            ));
        }
        md.push('\n');
    }

    md
}

pub fn render_key_summaries_markdown(summaries: &[CleanedRecord]) -> String {
    if summaries.is_empty() {
        return String::new();
    }
    let mut md = String::from("## Key Summaries\n");
    for s in summaries {
        md.push_str(&format!("- **{}** ({}): {}\n", s.title, s.source, clip(&s.content, 120)));
    }
    md.push('\n');
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::out_models::{Highlights, ReportSection};
    use chrono::TimeZone;

    fn record(i: usize) -> CleanedRecord {
        CleanedRecord {
            title: format!("记录标题 {} | pipe", i),
            content: "内容".repeat(80),
            url: Some(format!("https://example.com/{}", "x".repeat(80))),
            source: "Baidu".into(),
            created_at: None,
        }
    }

    #[test]
    fn markdown_has_sections_and_capped_table() {
        let report = AssembledReport {
            title: "Comprehensive Data Analysis Report".into(),
            sections: vec![ReportSection { title: "1. Data Quality Overview".into(), content: "Processing summary:".into() }],
            highlights: Highlights { quality_summary: "q".into(), ..Default::default() },
        };
        let records: Vec<CleanedRecord> = (0..12).map(record).collect();
        let md = render_report_markdown("Report: x", &report, &records, Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap());

        assert!(md.starts_with("# Report: x\n"));
        assert!(md.contains("## 1. Data Quality Overview\nProcessing summary:\n"));
        assert!(!md.contains("**Keywords:**"));
        assert!(md.contains("## Records (12 total)"));
        assert!(md.contains("| 10 | "));
        assert!(!md.contains("| 11 | "));
        assert!(md.contains("记录标题 0 \\| pipe"));
        assert!(md.contains("..."));
    }

    #[test]
    fn summaries_are_clipped() {
        let md = render_key_summaries_markdown(&[record(1)]);
        assert!(md.starts_with("## Key Summaries\n- **记录标题 1 | pipe** (Baidu): "));
        assert!(md.trim_end().ends_with("..."));
        assert_eq!(render_key_summaries_markdown(&[]), "");
    }
}
