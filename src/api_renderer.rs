use async_trait::async_trait;
use awful_aj::{api::ask, config::AwfulJadeConfig, template::ChatTemplate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::api_types::{PayloadRecord, PayloadSection, ReportPayload};
use crate::budget::{approx_tokens, cap_prompt};
use crate::config::ApiRendererConfig;
use crate::error::RenderError;
use crate::prompts::user_html_report;
use crate::renderer::{Artifact, ArtifactFormat, RenderRequest, Renderer};

const SAMPLE_RECORDS: usize = 10;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*```[A-Za-z]*\s*\n(.*?)\n?\s*```\s*$").expect("static regex"));

/// Models like to wrap documents in a markdown fence; unwrap it.
pub fn strip_code_fence(s: &str) -> &str {
    match CODE_FENCE.captures(s).and_then(|c| c.get(1)) {
        Some(m) => m.as_str().trim(),
        None => s.trim(),
    }
}

/// Locate the awful_aj config file. An explicit path wins, then `$AJ_CONFIG`,
/// then `config.yaml` under `$AJ_CONFIG_DIR` or the awful_aj config dir.
/// Points the template loader at `<base>/templates` unless `$AJ_TEMPLATE_DIR`
/// is already set.
pub fn resolve_aj_config(explicit: Option<&Path>) -> Result<PathBuf, RenderError> {
    let base_dir = match std::env::var("AJ_CONFIG_DIR") {
        Ok(dir) => Some(PathBuf::from(dir)),
        Err(_) => awful_aj::config_dir().ok(),
    };

    if std::env::var("AJ_TEMPLATE_DIR").is_err() {
        if let Some(base) = &base_dir {
            std::env::set_var("AJ_TEMPLATE_DIR", base.join("templates"));
        }
    }

    if let Some(p) = explicit {
        return Ok(p.to_path_buf());
    }
    if let Ok(p) = std::env::var("AJ_CONFIG") {
        return Ok(PathBuf::from(p));
    }
    base_dir
        .map(|b| b.join("config.yaml"))
        .ok_or_else(|| RenderError::Unavailable("no awful_aj config dir".to_string()))
}

pub fn payload(req: &RenderRequest<'_>) -> ReportPayload {
    ReportPayload {
        title: req.title.to_string(),
        generated_at: req.generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        record_count: req.records.len(),
        heading: req.report.title.clone(),
        sections: req
            .report
            .sections
            .iter()
            .map(|s| PayloadSection { title: s.title.clone(), content: s.content.clone() })
            .collect(),
        keyword_highlights: req.report.highlights.keyword_highlights.clone(),
        sample_records: req
            .records
            .iter()
            .take(SAMPLE_RECORDS)
            .map(|r| PayloadRecord { title: r.title.clone(), source: r.source.clone(), url: r.url.clone() })
            .collect(),
    }
}

/// User prompt for one report, capped to `max_tokens`.
pub fn build_prompt(req: &RenderRequest<'_>, max_tokens: usize) -> Result<String, RenderError> {
    let payload_json = serde_json::to_string_pretty(&payload(req))
        .map_err(|e| RenderError::Unavailable(format!("payload encoding failed: {}", e)))?;
    Ok(cap_prompt(&user_html_report(&payload_json), max_tokens))
}

/// Asks the model behind an awful_aj config to lay the report out as HTML.
/// The system prompt lives in the chat template.
pub struct ChatApiRenderer {
    aj: AwfulJadeConfig,
    template: ChatTemplate,
    cfg: ApiRendererConfig,
}

impl ChatApiRenderer {
    /// Load the awful_aj config and chat template once.
    pub async fn load(cfg: ApiRendererConfig) -> Result<Self, RenderError> {
        let path = resolve_aj_config(cfg.aj_config.as_deref())?;
        if !path.exists() {
            return Err(RenderError::Unavailable(format!(
                "awful_aj config not found at {}",
                path.display()
            )));
        }
        let path_str = path
            .to_str()
            .ok_or_else(|| RenderError::Unavailable(format!("invalid config path {}", path.display())))?;

        let aj = awful_aj::config::load_config(path_str).map_err(|e| RenderError::Unavailable(e.to_string()))?;
        let template = awful_aj::template::load_template(&cfg.template)
            .await
            .map_err(|e| RenderError::Unavailable(format!("template {}: {}", cfg.template, e)))?;

        debug!("API renderer ready - config={}, template={}", path.display(), cfg.template);
        Ok(Self { aj, template, cfg })
    }
}

#[async_trait(?Send)]
impl Renderer for ChatApiRenderer {
    fn name(&self) -> &str {
        "api"
    }

    async fn render(&self, req: &RenderRequest<'_>) -> Result<Artifact, RenderError> {
        let start = std::time::Instant::now();
        let user = build_prompt(req, self.cfg.max_prompt_tokens)?;
        debug!(
            "API render starting - template={}, prompt_tokens~{}",
            self.cfg.template,
            approx_tokens(&user)
        );

        let call = ask(&self.aj, user, &self.template, None, None, false);
        let answer = tokio::time::timeout(Duration::from_secs(self.cfg.timeout_secs), call)
            .await
            .map_err(|_| RenderError::Timeout { secs: self.cfg.timeout_secs })?
            .map_err(|e| RenderError::Api(e.to_string()))?;

        let html = strip_code_fence(&answer);
        if html.is_empty() {
            return Err(RenderError::EmptyResponse);
        }

        info!(
            "API render completed - duration={:.2}s, response_length={} chars",
            start.elapsed().as_secs_f32(),
            html.len()
        );
        Ok(Artifact {
            format: ArtifactFormat::Html,
            bytes: html.as_bytes().to_vec(),
            renderer: self.name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CleanedRecord;
    use crate::out_models::{AssembledReport, Highlights, ReportSection};
    use chrono::Utc;

    fn report() -> AssembledReport {
        AssembledReport {
            title: "Comprehensive Data Analysis Report".into(),
            sections: vec![ReportSection {
                title: "1. Data Overview".into(),
                content: "12 records after cleaning".into(),
            }],
            highlights: Highlights::default(),
        }
    }

    #[test]
    fn fences_are_stripped() {
        assert_eq!(strip_code_fence("```html\n<html></html>\n```"), "<html></html>");
        assert_eq!(strip_code_fence("  <html></html>  "), "<html></html>");
        assert_eq!(strip_code_fence("```\n<!DOCTYPE html><html></html>```\n"), "<!DOCTYPE html><html></html>");
    }

    #[test]
    fn prompt_carries_the_report_and_is_capped() {
        let r = report();
        let records: Vec<CleanedRecord> = (0..15)
            .map(|i| CleanedRecord {
                title: format!("记录标题 {}", i),
                content: "内容".into(),
                url: None,
                source: "S".into(),
                created_at: None,
            })
            .collect();
        let req = RenderRequest { title: "Report: x", report: &r, records: &records, generated_at: Utc::now() };

        let p = payload(&req);
        assert_eq!(p.record_count, 15);
        assert_eq!(p.sample_records.len(), SAMPLE_RECORDS);
        assert_eq!(p.sections[0].title, "1. Data Overview");

        let full = build_prompt(&req, 100_000).unwrap();
        assert!(full.contains("\"title\": \"Report: x\""));
        assert!(full.contains("<!DOCTYPE html>"));

        let capped = build_prompt(&req, 50).unwrap();
        assert!(approx_tokens(&capped) <= 50);
    }

    #[test]
    fn explicit_aj_config_path_wins() {
        let p = Path::new("/tmp/aj/config.yaml");
        assert_eq!(resolve_aj_config(Some(p)).unwrap(), p.to_path_buf());
    }

    #[tokio::test]
    async fn missing_aj_config_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ApiRendererConfig {
            aj_config: Some(dir.path().join("absent.yaml")),
            ..Default::default()
        };
        match ChatApiRenderer::load(cfg).await {
            Err(RenderError::Unavailable(msg)) => assert!(msg.contains("not found")),
            Err(e) => panic!("unexpected error {}", e),
            Ok(_) => panic!("renderer loaded without a config"),
        }
    }
}
