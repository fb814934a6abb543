use async_trait::async_trait;
use tracing::debug;

use crate::error::RenderError;
use crate::renderer::{Artifact, ArtifactFormat, RenderRequest, Renderer};

const PAGE_WIDTH: u32 = 612;
const PAGE_HEIGHT: u32 = 792;
const MARGIN: u32 = 56;
const MAX_LINE_CHARS: usize = 90;
const RECORD_ROWS: usize = 10;

/// One line of text at a font size.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfLine {
    pub size: u32,
    pub text: String,
}

impl PdfLine {
    pub fn new(size: u32, text: impl Into<String>) -> Self {
        Self { size, text: text.into() }
    }
}

/// Last-resort renderer: a single-page PDF in the built-in Helvetica font,
/// needing neither network nor font files. Glyphs outside ASCII print as `?`.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderPdfRenderer;

impl PlaceholderPdfRenderer {
    pub fn new() -> Self {
        Self
    }
}

/// The report as a flat list of lines, shared by both PDF renderers.
pub fn layout(req: &RenderRequest<'_>) -> Vec<PdfLine> {
    let mut lines = vec![
        PdfLine::new(16, "DATA ANALYSIS REPORT"),
        PdfLine::new(12, req.title),
        PdfLine::new(9, format!("Generated: {}", req.generated_at.format("%Y-%m-%d %H:%M:%S UTC"))),
        PdfLine::new(9, ""),
        PdfLine::new(10, req.report.highlights.quality_summary.as_str()),
        PdfLine::new(10, format!("Top keywords: {}", req.report.highlights.keyword_highlights)),
    ];

    for section in &req.report.sections {
        lines.push(PdfLine::new(9, ""));
        lines.push(PdfLine::new(11, section.title.as_str()));
        for l in section.content.lines().filter(|l| !l.trim().is_empty()) {
            lines.push(PdfLine::new(9, l.replace('•', "-")));
        }
    }

    if !req.records.is_empty() {
        lines.push(PdfLine::new(9, ""));
        lines.push(PdfLine::new(11, format!("Records ({} total)", req.records.len())));
        for (i, r) in req.records.iter().take(RECORD_ROWS).enumerate() {
            lines.push(PdfLine::new(9, format!("{}. {} [{}]", i + 1, r.title, r.source)));
        }
    }
    lines
}

#[async_trait(?Send)]
impl Renderer for PlaceholderPdfRenderer {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn render(&self, req: &RenderRequest<'_>) -> Result<Artifact, RenderError> {
        let lines = layout(req);
        let bytes = build_pdf(&lines);
        debug!("Placeholder PDF built - lines={}, bytes={}", lines.len(), bytes.len());
        Ok(Artifact {
            format: ArtifactFormat::Pdf,
            bytes,
            renderer: self.name().to_string(),
        })
    }
}

/// Printable ASCII with PDF string escapes, clipped to one line.
fn pdf_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars().take(MAX_LINE_CHARS) {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

fn content_stream(lines: &[PdfLine]) -> String {
    let mut out = String::new();
    let mut y = PAGE_HEIGHT - MARGIN;
    for l in lines {
        let leading = l.size + 4;
        if y < MARGIN + leading {
            break;
        }
        y -= leading;
        if l.text.is_empty() {
            continue;
        }
        out.push_str(&format!(
            "BT /F1 {} Tf {} {} Td ({}) Tj ET\n",
            l.size,
            MARGIN,
            y,
            pdf_text(&l.text)
        ));
    }
    out
}

/// Serialize a one-page document with a correct cross-reference table.
pub fn build_pdf(lines: &[PdfLine]) -> Vec<u8> {
    let stream = content_stream(lines);
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>",
            PAGE_WIDTH, PAGE_HEIGHT
        ),
        format!("<< /Length {} >>\nstream\n{}endstream", stream.len(), stream),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_string(),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref_at = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for off in &offsets {
        pdf.push_str(&format!("{:010} 00000 n \n", off));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    ));
    pdf.into_bytes()
}
