use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{debug, info};
use url::Url;

use crate::models::RawRecord;

pub const MOCK_SOURCE: &str = "Baidu";

enum Link {
    Path(&'static str),                 // keyword appended as a path segment
    Query(&'static str, &'static str), // base, param name
}

struct Template {
    title: &'static str,
    content: &'static str,
    link: Link,
}

const TEMPLATES: &[Template] = &[
    Template {
        title: "{keyword} - 百度百科",
        content: "这是关于{keyword}的百度百科条目，包含详细的信息和全面的介绍。",
        link: Link::Path("https://baike.baidu.com/item"),
    },
    Template {
        title: "{keyword} 最新新闻资讯",
        content: "关于{keyword}的最新新闻报道，涵盖行业动态、技术发展和市场分析。",
        link: Link::Query("https://news.baidu.com/search", "q"),
    },
    Template {
        title: "{keyword} 产品与解决方案",
        content: "与{keyword}相关的综合产品信息和解决方案，包括规格、功能和价格。",
        link: Link::Path("https://example.com/products"),
    },
    Template {
        title: "{keyword} 技术文档",
        content: "{keyword}的官方技术文档，包括API参考、用户指南和安装说明。",
        link: Link::Path("https://example.com/docs"),
    },
    Template {
        title: "{keyword} 社区讨论",
        content: "关于{keyword}的在线论坛和社区讨论，用户分享经验和提问交流。",
        link: Link::Query("https://tieba.baidu.com/f", "kw"),
    },
    Template {
        title: "{keyword} 研究论文",
        content: "关于{keyword}的学术研究论文和出版物，涵盖理论基础和实验结果。",
        link: Link::Query("https://xueshu.baidu.com/s", "wd"),
    },
    Template {
        title: "{keyword} 市场分析报告",
        content: "{keyword}的详细市场分析和预测，包括增长趋势和竞争格局。",
        link: Link::Path("https://example.com/reports"),
    },
    Template {
        title: "{keyword} 教程与指南",
        content: "学习和有效使用{keyword}的分步教程和综合指南。",
        link: Link::Path("https://example.com/guides"),
    },
    Template {
        title: "{keyword} 案例研究",
        content: "展示{keyword}成功实施和应用的真实案例研究。",
        link: Link::Path("https://example.com/case-studies"),
    },
    Template {
        title: "{keyword} 行业活动与会议",
        content: "专注于{keyword}和相关技术的即将举行的活动、会议和网络研讨会。",
        link: Link::Path("https://example.com/events"),
    },
    Template {
        title: "{keyword} 最佳实践",
        content: "实施和优化{keyword}的推荐最佳实践和指南。",
        link: Link::Path("https://example.com/best-practices"),
    },
    Template {
        title: "{keyword} 比较指南",
        content: "{keyword}与市场上类似产品和技术的比较分析。",
        link: Link::Path("https://example.com/comparison"),
    },
];

fn build_url(link: &Link, keyword: &str) -> Result<String> {
    let url = match link {
        Link::Path(base) => {
            let mut u = Url::parse(base).with_context(|| format!("Invalid base url {}", base))?;
            u.path_segments_mut()
                .map_err(|_| anyhow!("Base url {} cannot take path segments", base))?
                .pop_if_empty()
                .push(keyword);
            u
        }
        Link::Query(base, param) => Url::parse_with_params(base, &[(*param, keyword)])
            .with_context(|| format!("Invalid base url {}", base))?,
    };
    Ok(url.to_string())
}

/// Templated search results for `keyword`; stands in for a live crawl.
pub fn mock_search(keyword: &str, now: DateTime<Utc>) -> Result<Vec<RawRecord>> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        debug!("Mock search skipped - empty keyword");
        return Ok(Vec::new());
    }

    let records = TEMPLATES
        .iter()
        .map(|t| {
            Ok(RawRecord::new(t.title.replace("{keyword}", keyword))
                .with_content(t.content.replace("{keyword}", keyword))
                .with_url(build_url(&t.link, keyword)?)
                .with_source(MOCK_SOURCE)
                .with_created_at(now))
        })
        .collect::<Result<Vec<_>>>()?;

    info!("Mock search completed - keyword={}, records={}", keyword, records.len());
    Ok(records)
}

/// Read a JSON array of records from the record store export at `path`.
pub fn load_records(path: &Path) -> Result<Vec<RawRecord>> {
    let start = std::time::Instant::now();
    let bytes = std::fs::read(path).with_context(|| format!("Reading records from {}", path.display()))?;
    let records: Vec<RawRecord> =
        serde_json::from_slice(&bytes).with_context(|| format!("Decoding JSON records in {}", path.display()))?;
    info!(
        "Records loaded - path={}, records={}, duration={:.2}s",
        path.display(),
        records.len(),
        start.elapsed().as_secs_f32()
    );
    Ok(records)
}

/// Records whose title or content mentions `term`.
pub fn filter_by_term(records: Vec<RawRecord>, term: &str) -> Vec<RawRecord> {
    let before = records.len();
    let kept: Vec<RawRecord> = records
        .into_iter()
        .filter(|r| r.title.contains(term) || r.content.as_deref().is_some_and(|c| c.contains(term)))
        .collect();
    debug!("Search filter - term={}, before={}, after={}", term, before, kept.len());
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap()
    }

    #[test]
    fn mock_search_fills_every_template() {
        let records = mock_search("人工智能", now()).unwrap();
        assert_eq!(records.len(), 12);
        assert!(records.iter().all(|r| r.source.as_deref() == Some(MOCK_SOURCE)));
        assert!(records.iter().all(|r| r.created_at == Some(now())));
        assert_eq!(records[0].title, "人工智能 - 百度百科");
        assert!(records[1].content.as_deref().unwrap().contains("人工智能"));
    }

    #[test]
    fn mock_urls_encode_the_keyword() {
        let records = mock_search("机器 学习", now()).unwrap();
        let encyclopedia = records[0].url.as_deref().unwrap();
        assert!(encyclopedia.starts_with("https://baike.baidu.com/item/%E6%9C%BA"));
        assert!(!encyclopedia.contains(' '));
        let news = records[1].url.as_deref().unwrap();
        assert!(news.starts_with("https://news.baidu.com/search?q="));
        assert!(!news.contains(' '));
    }

    #[test]
    fn blank_keyword_yields_nothing() {
        assert!(mock_search("   ", now()).unwrap().is_empty());
    }

    #[test]
    fn loads_partial_records_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"title": "完整的记录标题", "content": "内容", "url": "http://a", "source": "S1", "createdAt": "2026-10-15T09:30:00Z"}},
                {{"content": "no title at all"}},
                {{"title": "Only a title"}}
            ]"#
        )
        .unwrap();

        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].created_at, Some(Utc.with_ymd_and_hms(2026, 10, 15, 9, 30, 0).unwrap()));
        assert_eq!(records[1].title, "");
        assert!(records[2].content.is_none());
    }

    #[test]
    fn load_reports_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let err = load_records(file.path()).unwrap_err();
        assert!(err.to_string().contains("Decoding JSON records"));
    }

    #[test]
    fn filter_matches_title_or_content() {
        let records = vec![
            RawRecord::new("经济发展报告"),
            RawRecord::new("other title").with_content("市场经济"),
            RawRecord::new("unrelated"),
        ];
        let kept = filter_by_term(records, "经济");
        assert_eq!(kept.len(), 2);
    }
}
