use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use corpus_report::config::{ApiRendererConfig, PdfRendererConfig, RenderConfig, RendererKind};
use corpus_report::error::{PipelineError, RenderError};
use corpus_report::pdf::PlaceholderPdfRenderer;
use corpus_report::renderer::{Artifact, ArtifactFormat, RenderRequest, Renderer, RendererChain};
use corpus_report::scrape::mock_search;
use corpus_report::{AnalysisOptions, AnalysisResult, Analyzer};
use std::path::PathBuf;

fn analysis() -> AnalysisResult {
    let now = Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap();
    let records = mock_search("人工智能", now).unwrap();
    let options = AnalysisOptions::new(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(), chrono_tz::UTC);
    Analyzer::new(options).analyze(&records)
}

fn request(result: &AnalysisResult) -> RenderRequest<'_> {
    RenderRequest {
        title: "Report: AI",
        report: &result.report,
        records: &result.cleaned,
        generated_at: Utc::now(),
    }
}

fn system_font() -> Option<PathBuf> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .find(|p| p.exists())
}

/// Stands in for a model that answers with the given text.
struct Canned {
    name: &'static str,
    answer: &'static str,
}

#[async_trait(?Send)]
impl Renderer for Canned {
    fn name(&self) -> &str {
        self.name
    }

    async fn render(&self, _req: &RenderRequest<'_>) -> Result<Artifact, RenderError> {
        if self.answer.is_empty() {
            return Err(RenderError::EmptyResponse);
        }
        Ok(Artifact {
            format: ArtifactFormat::Html,
            bytes: self.answer.as_bytes().to_vec(),
            renderer: self.name.to_string(),
        })
    }
}

#[tokio::test]
async fn unusable_renderers_fall_back_to_placeholder_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = RenderConfig {
        order: vec![RendererKind::Api, RendererKind::Pdf],
        api: Some(ApiRendererConfig {
            aj_config: Some(dir.path().join("aj-config.yaml")),
            ..Default::default()
        }),
        pdf: Some(PdfRendererConfig { font_path: dir.path().join("NotoSansSC.ttf") }),
    };
    let chain = RendererChain::from_config(&cfg).await;
    assert_eq!(chain.names(), vec!["placeholder"]);

    let result = analysis();
    let artifact = chain.render(&request(&result)).await.unwrap();
    assert_eq!(artifact.renderer, "placeholder");
    assert_eq!(artifact.format, ArtifactFormat::Pdf);
    assert!(ArtifactFormat::Pdf.validate(&artifact.bytes).is_ok());
}

#[tokio::test]
async fn font_pdf_runs_ahead_of_placeholder() {
    let Some(font_path) = system_font() else {
        return;
    };
    let cfg = RenderConfig {
        pdf: Some(PdfRendererConfig { font_path }),
        ..Default::default()
    };
    let chain = RendererChain::from_config(&cfg).await;
    assert_eq!(chain.names(), vec!["pdf", "placeholder"]);

    let result = analysis();
    let artifact = chain.render(&request(&result)).await.unwrap();
    assert_eq!(artifact.renderer, "pdf");
    assert!(ArtifactFormat::Pdf.validate(&artifact.bytes).is_ok());
}

#[tokio::test]
async fn html_answer_wins() {
    let chain = RendererChain::new(vec![
        Box::new(Canned { name: "api", answer: "<!DOCTYPE html><html><body><h1>Report</h1></body></html>" }) as Box<dyn Renderer>,
        Box::new(PlaceholderPdfRenderer::new()),
    ]);
    let result = analysis();
    let artifact = chain.render(&request(&result)).await.unwrap();
    assert_eq!(artifact.renderer, "api");
    assert_eq!(artifact.format, ArtifactFormat::Html);
}

#[tokio::test]
async fn prose_instead_of_html_is_rejected() {
    let chain = RendererChain::new(vec![
        Box::new(Canned { name: "api", answer: "Sure! Here is a summary of the report." }) as Box<dyn Renderer>,
        Box::new(PlaceholderPdfRenderer::new()),
    ]);
    let result = analysis();
    let artifact = chain.render(&request(&result)).await.unwrap();
    assert_eq!(artifact.renderer, "placeholder");
}

#[tokio::test]
async fn api_only_chain_reports_every_failure() {
    let chain = RendererChain::new(vec![Box::new(Canned { name: "api", answer: "" })]);
    let result = analysis();
    match chain.render(&request(&result)).await {
        Err(PipelineError::RenderExhausted { attempts }) => {
            assert_eq!(attempts.len(), 1);
            assert_eq!(attempts[0].renderer, "api");
            assert!(attempts[0].error.contains("no content"));
        }
        other => panic!("expected exhaustion, got {:?}", other.map(|a| a.renderer)),
    }
}
