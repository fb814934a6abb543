use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::api_renderer::ChatApiRenderer;
use crate::config::{RenderConfig, RendererKind};
use crate::error::{PipelineError, RenderAttempt, RenderError};
use crate::font_pdf::FontPdfRenderer;
use crate::models::CleanedRecord;
use crate::out_models::AssembledReport;
use crate::pdf::PlaceholderPdfRenderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    Pdf,
    Html,
}

impl ArtifactFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactFormat::Pdf => "pdf",
            ArtifactFormat::Html => "html",
        }
    }

    /// Cheap structural check on the document's leading and trailing markers.
    pub fn validate(self, bytes: &[u8]) -> Result<(), RenderError> {
        let reject = |reason: &str| {
            Err(RenderError::InvalidArtifact {
                format: self,
                reason: reason.to_string(),
            })
        };
        if bytes.is_empty() {
            return reject("empty document");
        }
        match self {
            ArtifactFormat::Pdf => {
                if !bytes.starts_with(b"%PDF-") {
                    return reject("missing %PDF- header");
                }
                if !trim_end_ascii(bytes).ends_with(b"%%EOF") {
                    return reject("missing %%EOF trailer");
                }
            }
            ArtifactFormat::Html => {
                let text = String::from_utf8_lossy(bytes).trim().to_ascii_lowercase();
                if !(text.starts_with("<!doctype html") || text.starts_with("<html")) {
                    return reject("does not start with an html document");
                }
                if !text.ends_with("</html>") {
                    return reject("missing closing </html>");
                }
            }
        }
        Ok(())
    }
}

fn trim_end_ascii(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    &bytes[..end]
}

#[derive(Debug, Clone)]
pub struct Artifact {
    pub format: ArtifactFormat,
    pub bytes: Vec<u8>,
    pub renderer: String,
}

/// Everything a renderer may draw on for one report.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub title: &'a str,
    pub report: &'a AssembledReport,
    pub records: &'a [CleanedRecord],
    pub generated_at: DateTime<Utc>,
}

/// Renderers run on the caller's task, one request at a time per chain.
#[async_trait(?Send)]
pub trait Renderer {
    fn name(&self) -> &str;
    async fn render(&self, req: &RenderRequest<'_>) -> Result<Artifact, RenderError>;
}

/// Renderers tried in order until one yields a valid artifact.
pub struct RendererChain {
    renderers: Vec<Box<dyn Renderer>>,
}

impl RendererChain {
    pub fn new(renderers: Vec<Box<dyn Renderer>>) -> Self {
        Self { renderers }
    }

    /// Build the chain from config. A renderer whose setup fails is logged and
    /// left out. The placeholder renderer always closes the chain, so a
    /// fallback is attempted even if the config omits it.
    pub async fn from_config(cfg: &RenderConfig) -> Self {
        let mut renderers: Vec<Box<dyn Renderer>> = Vec::new();
        let mut has_placeholder = false;

        for kind in &cfg.order {
            match kind {
                RendererKind::Api => match &cfg.api {
                    Some(api) => match ChatApiRenderer::load(api.clone()).await {
                        Ok(r) => renderers.push(Box::new(r)),
                        Err(e) => warn!("Renderer skipped - name=api, error={}", e),
                    },
                    None => debug!("Renderer skipped - name=api, reason=not configured"),
                },
                RendererKind::Pdf => match &cfg.pdf {
                    Some(pdf) => match FontPdfRenderer::load(pdf) {
                        Ok(r) => renderers.push(Box::new(r)),
                        Err(e) => warn!("Renderer skipped - name=pdf, error={}", e),
                    },
                    None => debug!("Renderer skipped - name=pdf, reason=not configured"),
                },
                RendererKind::Placeholder if !has_placeholder => {
                    renderers.push(Box::new(PlaceholderPdfRenderer::new()));
                    has_placeholder = true;
                }
                RendererKind::Placeholder => {}
            }
        }
        if !has_placeholder {
            renderers.push(Box::new(PlaceholderPdfRenderer::new()));
        }

        Self::new(renderers)
    }

    pub fn names(&self) -> Vec<&str> {
        self.renderers.iter().map(|r| r.name()).collect()
    }

    pub async fn render(&self, req: &RenderRequest<'_>) -> Result<Artifact, PipelineError> {
        let mut attempts = Vec::new();

        for r in &self.renderers {
            let start = std::time::Instant::now();
            let outcome = match r.render(req).await {
                Ok(artifact) => artifact.format.validate(&artifact.bytes).map(|_| artifact),
                Err(e) => Err(e),
            };
            match outcome {
                Ok(artifact) => {
                    info!(
                        "Render completed - renderer={}, format={}, bytes={}, duration={:.2}s",
                        r.name(),
                        artifact.format.extension(),
                        artifact.bytes.len(),
                        start.elapsed().as_secs_f32()
                    );
                    return Ok(artifact);
                }
                Err(e) => {
                    warn!("Renderer failed - renderer={}, error={}", r.name(), e);
                    attempts.push(RenderAttempt {
                        renderer: r.name().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        error!("All renderers failed - title={}, attempted={}", req.title, attempts.len());
        Err(PipelineError::RenderExhausted { attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiRendererConfig, PdfRendererConfig};
    use crate::out_models::Highlights;

    struct Fixed {
        name: &'static str,
        result: std::result::Result<(ArtifactFormat, &'static [u8]), &'static str>,
    }

    #[async_trait(?Send)]
    impl Renderer for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        async fn render(&self, _req: &RenderRequest<'_>) -> Result<Artifact, RenderError> {
            match self.result {
                Ok((format, bytes)) => Ok(Artifact {
                    format,
                    bytes: bytes.to_vec(),
                    renderer: self.name.to_string(),
                }),
                Err(msg) => Err(RenderError::Unavailable(msg.to_string())),
            }
        }
    }

    fn report() -> AssembledReport {
        AssembledReport {
            title: "Comprehensive Data Analysis Report".into(),
            sections: vec![],
            highlights: Highlights::default(),
        }
    }

    const GOOD_HTML: &[u8] = b"<!DOCTYPE html><html><body>ok</body></html>\n";
    const GOOD_PDF: &[u8] = b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\n%%EOF\n";

    #[test]
    fn pdf_and_html_markers() {
        assert!(ArtifactFormat::Pdf.validate(GOOD_PDF).is_ok());
        assert!(ArtifactFormat::Pdf.validate(b"%PDF-1.4\n1 0 obj").is_err());
        assert!(ArtifactFormat::Pdf.validate(b"").is_err());
        assert!(ArtifactFormat::Html.validate(GOOD_HTML).is_ok());
        assert!(ArtifactFormat::Html.validate(b"  <HTML><p>x</p></HTML>").is_ok());
        assert!(ArtifactFormat::Html.validate(b"Here is your report: <html>").is_err());
        assert!(ArtifactFormat::Html.validate(GOOD_PDF).is_err());
    }

    #[tokio::test]
    async fn first_valid_artifact_wins() {
        let chain = RendererChain::new(vec![
            Box::new(Fixed { name: "down", result: Err("connection refused") }),
            Box::new(Fixed { name: "truncated", result: Ok((ArtifactFormat::Pdf, &b"%PDF-1.4\nstream"[..])) }),
            Box::new(Fixed { name: "html", result: Ok((ArtifactFormat::Html, GOOD_HTML)) }),
            Box::new(Fixed { name: "pdf", result: Ok((ArtifactFormat::Pdf, GOOD_PDF)) }),
        ]);
        let r = report();
        let req = RenderRequest { title: "t", report: &r, records: &[], generated_at: Utc::now() };

        let artifact = chain.render(&req).await.unwrap();
        assert_eq!(artifact.renderer, "html");
        assert_eq!(artifact.format, ArtifactFormat::Html);
    }

    #[tokio::test]
    async fn exhaustion_lists_every_attempt() {
        let chain = RendererChain::new(vec![
            Box::new(Fixed { name: "a", result: Err("boom") }),
            Box::new(Fixed { name: "b", result: Ok((ArtifactFormat::Html, &b"plain text"[..])) }),
        ]);
        let r = report();
        let req = RenderRequest { title: "t", report: &r, records: &[], generated_at: Utc::now() };

        match chain.render(&req).await {
            Err(PipelineError::RenderExhausted { attempts }) => {
                let names: Vec<&str> = attempts.iter().map(|a| a.renderer.as_str()).collect();
                assert_eq!(names, vec!["a", "b"]);
                assert!(attempts[0].error.contains("boom"));
            }
            other => panic!("expected exhaustion, got {:?}", other.map(|a| a.renderer)),
        }
    }

    #[tokio::test]
    async fn placeholder_always_closes_the_chain() {
        let cfg = RenderConfig {
            order: vec![RendererKind::Api],
            api: None,
            pdf: None,
        };
        let chain = RendererChain::from_config(&cfg).await;
        assert_eq!(chain.names(), vec!["placeholder"]);

        let default_chain = RendererChain::from_config(&RenderConfig::default()).await;
        assert_eq!(default_chain.names(), vec!["placeholder"]);
    }

    #[tokio::test]
    async fn failed_setup_skips_the_renderer() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = RenderConfig {
            order: vec![RendererKind::Api, RendererKind::Pdf, RendererKind::Placeholder],
            api: Some(ApiRendererConfig {
                aj_config: Some(dir.path().join("missing-aj.yaml")),
                ..Default::default()
            }),
            pdf: Some(PdfRendererConfig { font_path: dir.path().join("missing.ttf") }),
        };
        let chain = RendererChain::from_config(&cfg).await;
        assert_eq!(chain.names(), vec!["placeholder"]);

        let r = report();
        let req = RenderRequest { title: "t", report: &r, records: &[], generated_at: Utc::now() };
        let artifact = chain.render(&req).await.unwrap();
        assert_eq!(artifact.renderer, "placeholder");
    }
}
