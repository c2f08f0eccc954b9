//! PDF output for a flowed [`Layout`].
//!
//! Writes one A4 page per layout page with the masthead repeated on each,
//! using the built-in Times and Helvetica fonts.

use super::layout::{self, Layout, PAGE_HEIGHT, PAGE_WIDTH, TextRun};
use super::metrics::Font;
use crate::error::RenderError;
use crate::models::{Article, Edition};
use crate::utils::{document_filename, ensure_writable_dir};
use printpdf::{IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Point};
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::{info, instrument};

fn mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}

fn pdf_err(e: impl std::fmt::Display) -> RenderError {
    RenderError::Pdf(e.to_string())
}

struct Fonts {
    helvetica: IndirectFontRef,
    times_bold: IndirectFontRef,
    times_italic: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self, RenderError> {
        Ok(Self {
            helvetica: doc.add_builtin_font(Font::Helvetica.builtin()).map_err(pdf_err)?,
            times_bold: doc.add_builtin_font(Font::TimesBold.builtin()).map_err(pdf_err)?,
            times_italic: doc.add_builtin_font(Font::TimesItalic.builtin()).map_err(pdf_err)?,
        })
    }

    fn get(&self, font: Font) -> &IndirectFontRef {
        match font {
            Font::Helvetica => &self.helvetica,
            Font::TimesBold => &self.times_bold,
            Font::TimesItalic => &self.times_italic,
        }
    }
}

fn draw_run(layer: &PdfLayerReference, fonts: &Fonts, run: &TextRun) {
    layer.use_text(run.text.as_str(), run.size, mm(run.x), mm(run.y), fonts.get(run.font));
}

fn draw_page(layer: &PdfLayerReference, fonts: &Fonts, layout: &Layout, page: &layout::Page) {
    let masthead = &layout.masthead;
    draw_run(layer, fonts, &masthead.name);
    draw_run(layer, fonts, &masthead.strapline);

    let (x1, x2, y) = masthead.rule;
    layer.set_outline_thickness(1.0);
    layer.add_line(Line {
        points: vec![(Point::new(mm(x1), mm(y)), false), (Point::new(mm(x2), mm(y)), false)],
        is_closed: false,
    });

    for line in &page.lines {
        let font = fonts.get(line.font);
        for word in &line.words {
            layer.use_text(word.text.as_str(), line.size, mm(word.x), mm(line.baseline), font);
        }
    }
}

/// Serialize a layout to PDF bytes.
pub fn render(layout: &Layout, title: &str) -> Result<Vec<u8>, RenderError> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
    let fonts = Fonts::load(&doc)?;

    for (index, page) in layout.pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) = doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
            doc.get_page(page_index).get_layer(layer_index)
        };
        draw_page(&layer, &fonts, layout, page);
    }

    let mut writer = BufWriter::new(Vec::new());
    doc.save(&mut writer).map_err(pdf_err)?;
    writer.into_inner().map_err(pdf_err)
}

/// Lay out and write the edition to `<output_dir>/DD_MM_YYYY.pdf`.
///
/// With no articles the edition carries the "no new content" placeholder.
/// An existing file for the same date is overwritten.
///
/// # Arguments
///
/// * `articles` - Articles in run order
/// * `edition` - Number and date for the masthead and file name
/// * `output_dir` - Directory to write into, created when missing
///
/// # Returns
///
/// The path of the written document.
///
/// # Errors
///
/// [`RenderError::Io`] when the directory is not writable or the write
/// fails, [`RenderError::Pdf`] when the PDF cannot be serialized.
#[instrument(level = "info", skip(articles), fields(articles = articles.len()))]
pub async fn compose(
    articles: &[Article],
    edition: &Edition,
    output_dir: &str,
) -> Result<PathBuf, RenderError> {
    info!("Creating pdf");
    ensure_writable_dir(output_dir)
        .await
        .map_err(|source| RenderError::Io {
            path: output_dir.to_string(),
            source,
        })?;

    let layout = layout::flow(articles, edition);
    let filename = document_filename(edition.date);
    let bytes = render(&layout, &filename)?;

    let path = PathBuf::from(output_dir).join(&filename);
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|source| RenderError::Io {
            path: path.display().to_string(),
            source,
        })?;
    info!(
        path = %path.display(),
        pages = layout.pages.len(),
        bytes = bytes.len(),
        "Wrote edition"
    );
    Ok(path)
}
