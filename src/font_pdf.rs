use async_trait::async_trait;
use printpdf::{Mm, PdfDocument};
use tracing::{debug, info};

use crate::config::PdfRendererConfig;
use crate::error::RenderError;
use crate::pdf::{layout, PdfLine};
use crate::renderer::{Artifact, ArtifactFormat, RenderRequest, Renderer};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 18.0;
const PT_TO_MM: f32 = 0.3528;
const LINE_SPACING: f32 = 1.4;

/// Paginated A4 PDF in a TrueType font read from disk, so CJK text keeps its
/// glyphs. Needs a font with CJK coverage to be useful for Chinese corpora.
pub struct FontPdfRenderer {
    font: Vec<u8>,
    font_label: String,
}

impl FontPdfRenderer {
    /// Read the font file once and check that it parses.
    pub fn load(cfg: &PdfRendererConfig) -> Result<Self, RenderError> {
        let font_label = cfg.font_path.display().to_string();
        let font = std::fs::read(&cfg.font_path)
            .map_err(|e| RenderError::Unavailable(format!("font {}: {}", font_label, e)))?;
        PdfDocument::empty("font check")
            .add_external_font(font.as_slice())
            .map_err(|e| RenderError::Pdf(format!("font {}: {}", font_label, e)))?;

        debug!("PDF font loaded - font={}, bytes={}", font_label, font.len());
        Ok(Self { font, font_label })
    }

    fn build_document(&self, title: &str, lines: &[PdfLine]) -> Result<Vec<u8>, RenderError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "text");
        let font = doc
            .add_external_font(self.font.as_slice())
            .map_err(|e| RenderError::Pdf(e.to_string()))?;

        let mut current = doc.get_page(page).get_layer(layer);
        let mut y = PAGE_HEIGHT_MM - MARGIN_MM;
        let mut pages = 1;
        for line in lines {
            let size = line.size as f32;
            let leading = size * PT_TO_MM * LINE_SPACING;
            for text in wrap(&line.text, max_units(size)) {
                if y - leading < MARGIN_MM {
                    let (p, l) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "text");
                    current = doc.get_page(p).get_layer(l);
                    y = PAGE_HEIGHT_MM - MARGIN_MM;
                    pages += 1;
                }
                y -= leading;
                if !text.is_empty() {
                    current.use_text(text, size, Mm(MARGIN_MM), Mm(y), &font);
                }
            }
        }

        debug!("Font PDF laid out - font={}, lines={}, pages={}", self.font_label, lines.len(), pages);
        doc.save_to_bytes().map_err(|e| RenderError::Pdf(e.to_string()))
    }
}

/// Line width budget in half-em units at `size` points.
fn max_units(size: f32) -> usize {
    let usable = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    ((usable / (size * PT_TO_MM * 0.5)) as usize).max(1)
}

/// Break on width, counting ASCII as one unit and everything else as two.
fn wrap(text: &str, max_units: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = if c.is_ascii() { 1 } else { 2 };
        if used + w > max_units && !current.is_empty() {
            out.push(std::mem::take(&mut current));
            used = 0;
        }
        current.push(c);
        used += w;
    }
    out.push(current);
    out
}

#[async_trait(?Send)]
impl Renderer for FontPdfRenderer {
    fn name(&self) -> &str {
        "pdf"
    }

    async fn render(&self, req: &RenderRequest<'_>) -> Result<Artifact, RenderError> {
        let start = std::time::Instant::now();
        let lines = layout(req);
        let bytes = self.build_document(req.title, &lines)?;
        info!(
            "Font PDF built - duration={:.2}s, bytes={}",
            start.elapsed().as_secs_f32(),
            bytes.len()
        );
        Ok(Artifact {
            format: ArtifactFormat::Pdf,
            bytes,
            renderer: self.name().to_string(),
        })
    }
}
