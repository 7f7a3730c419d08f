//! The page metrics collector: per-page extraction with OCR fallback.
//!
//! [`collect_pages`] is generic over the [`PageAnalyzer`] capability so the
//! whole per-page contract — direct text, OCR fallback, tables, images,
//! warnings — is unit-testable with fakes. The pdfium-backed analyzer lives
//! in [`crate::pipeline::pdfium`].
//!
//! ## Failure semantics
//!
//! A single page's failure is never fatal: extraction errors, rasterisation
//! errors, and OCR errors become per-page warnings and processing continues
//! with the next page. Each page yields an independent
//! [`PageRecord`]; the reducer in [`crate::metrics`] merges them in page
//! order so warnings stay deterministic.

use image::DynamicImage;
use thiserror::Error;
use tracing::{debug, warn};

use crate::metrics::PageRecord;
use crate::pipeline::markdown::{self, Table};
use crate::pipeline::ocr::OcrEngine;
use crate::progress::ExtractionProgressCallback;

/// Raw per-page extraction result from an analyzer.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// Text from the page's embedded text layer, if any.
    pub text: Option<String>,
    /// Tables detected on the page.
    pub tables: Vec<Table>,
    /// Images detected/referenced on the page.
    pub image_count: usize,
}

/// A page analyzer failed on one page.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct AnalyzeError(pub String);

/// Per-page extraction capability over an open document.
///
/// Implementations wrap the actual PDF parsing library. Methods take a
/// 0-indexed page; all reporting uses 1-indexed page numbers.
pub trait PageAnalyzer {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Extract text, tables, and the image count for one page.
    fn analyze_page(&self, index: usize) -> Result<PageContent, AnalyzeError>;

    /// Rasterise one page for the OCR fallback. The longest edge is capped
    /// at `max_pixels`.
    fn rasterize_page(&self, index: usize, max_pixels: u32) -> Result<DynamicImage, AnalyzeError>;
}

/// Run the full per-page collection contract over a document.
///
/// For each page: attempt direct text extraction; if empty, attempt the OCR
/// fallback (rasterise → recognise); convert tables; reference images. A
/// page with none of these yields a "no content" warning.
pub fn collect_pages<A: PageAnalyzer + ?Sized>(
    analyzer: &A,
    ocr: Option<&dyn OcrEngine>,
    max_pixels: u32,
    progress: Option<&dyn ExtractionProgressCallback>,
) -> Vec<PageRecord> {
    let total = analyzer.page_count();
    if let Some(cb) = progress {
        cb.on_extraction_start(total);
    }

    let mut records = Vec::with_capacity(total);
    for index in 0..total {
        let record = collect_page(analyzer, ocr, max_pixels, index);
        if let Some(cb) = progress {
            for w in &record.warnings {
                cb.on_page_warning(record.page_num, total, w);
            }
            cb.on_page_complete(record.page_num, total, record.ocr_text);
        }
        records.push(record);
    }

    if let Some(cb) = progress {
        let with_content = records
            .iter()
            .filter(|r| r.direct_text || r.ocr_text)
            .count();
        cb.on_extraction_complete(total, with_content);
    }

    records
}

/// Extract a single page into an independent record.
fn collect_page<A: PageAnalyzer + ?Sized>(
    analyzer: &A,
    ocr: Option<&dyn OcrEngine>,
    max_pixels: u32,
    index: usize,
) -> PageRecord {
    let page_num = index + 1;
    let mut record = PageRecord {
        page_num,
        ..PageRecord::default()
    };
    let mut parts = vec![format!("<!-- Page {page_num} -->")];

    let content = match analyzer.analyze_page(index) {
        Ok(content) => content,
        Err(e) => {
            warn!("page {page_num}: extraction failed - {e}");
            record
                .warnings
                .push(format!("page {page_num}: extraction failed - {e}"));
            record.markdown = parts.join("\n\n");
            return record;
        }
    };

    // 1. Direct text, else OCR fallback.
    match content.text.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => {
            record.direct_text = true;
            parts.push(markdown::format_text(text));
        }
        _ => {
            if let Some(engine) = ocr {
                match try_ocr(analyzer, engine, max_pixels, index) {
                    Ok(Some(text)) => {
                        record.ocr_text = true;
                        parts.push(format!("<!-- OCR extracted -->\n{}", markdown::format_text(&text)));
                    }
                    Ok(None) => {}
                    Err(w) => record.warnings.push(w),
                }
            }
        }
    }

    // 2. Tables, independent of the text outcome.
    for table in &content.tables {
        let md = markdown::table_to_markdown(table);
        if !md.is_empty() {
            record.tables += 1;
            parts.push(md);
        }
    }

    // 3. Image references, named by page and sequence index.
    for seq in 1..=content.image_count {
        record.images += 1;
        parts.push(markdown::image_reference(page_num, seq));
    }

    if !record.direct_text && !record.ocr_text && record.tables == 0 && record.images == 0 {
        record
            .warnings
            .push(format!("page {page_num}: no text or image content found"));
    }

    debug!(
        "page {page_num}: text={} ocr={} tables={} images={}",
        record.direct_text, record.ocr_text, record.tables, record.images
    );

    record.markdown = parts.join("\n\n");
    record
}

/// Rasterise the page and run OCR. `Ok(None)` means OCR ran but found
/// nothing; `Err` carries the warning string to record.
fn try_ocr<A: PageAnalyzer + ?Sized>(
    analyzer: &A,
    engine: &dyn OcrEngine,
    max_pixels: u32,
    index: usize,
) -> Result<Option<String>, String> {
    let page_num = index + 1;
    debug!("page {page_num}: attempting OCR fallback");

    let image = analyzer
        .rasterize_page(index, max_pixels)
        .map_err(|e| format!("page {page_num}: rasterisation failed - {e}"))?;

    let text = engine
        .recognize(&image)
        .map_err(|e| format!("page {page_num}: OCR failed - {e}"))?;

    if text.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}
