//! The pdfium-backed [`PageAnalyzer`]: text layer, image objects, and
//! rasterisation for OCR.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the whole document walk
//! onto a dedicated blocking thread so Tokio worker threads never stall on
//! CPU-heavy parsing or rasterisation.
//!
//! Running the walk on a single thread also keeps page records arriving in
//! page order for free; the reducer still sorts, so callers may substitute a
//! parallel analyzer without breaking warning determinism.

use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::ExtractionConfig;
use crate::error::FetchMdError;
use crate::metrics::PageRecord;
use crate::pipeline::extract::{collect_pages, AnalyzeError, PageAnalyzer, PageContent};
use crate::pipeline::markdown;
use crate::pipeline::ocr::OcrEngine;
use crate::progress::ProgressCallback;

/// Walk every page of the PDF and produce per-page records.
///
/// Returns `(total_pages, records)`. Per-page failures are recorded inside
/// the records as warnings; only document-level problems (corrupt file,
/// wrong password, binding failure) surface as errors.
pub async fn extract_document(
    pdf_path: &Path,
    config: &ExtractionConfig,
) -> Result<(usize, Vec<PageRecord>), FetchMdError> {
    let path = pdf_path.to_path_buf();
    let password = config.password.clone();
    let max_pixels = config.max_rendered_pixels;
    let ocr = config.ocr.clone();
    let progress = config.progress_callback.clone();

    tokio::task::spawn_blocking(move || {
        extract_document_blocking(&path, password.as_deref(), max_pixels, ocr, progress)
    })
    .await
    .map_err(|e| FetchMdError::Internal(format!("Extraction task panicked: {e}")))?
}

fn extract_document_blocking(
    pdf_path: &Path,
    password: Option<&str>,
    max_pixels: u32,
    ocr: Option<Arc<dyn OcrEngine>>,
    progress: Option<ProgressCallback>,
) -> Result<(usize, Vec<PageRecord>), FetchMdError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium
        .load_pdf_from_file(pdf_path, password)
        .map_err(|e| map_load_error(e, pdf_path, password))?;

    let analyzer = PdfiumAnalyzer {
        document: &document,
    };
    let total_pages = analyzer.page_count();
    info!("PDF loaded: {} pages", total_pages);

    let records = collect_pages(
        &analyzer,
        ocr.as_deref(),
        max_pixels,
        progress.as_deref(),
    );

    Ok((total_pages, records))
}

/// Bind to a pdfium library: `PDFIUM_LIB_PATH` override first, then the
/// system library.
fn bind_pdfium() -> Result<Pdfium, FetchMdError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(path) if !path.is_empty() => Pdfium::bind_to_library(PathBuf::from(path)),
        _ => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| FetchMdError::PdfiumBindingFailed(format!("{e:?}")))?;
    Ok(Pdfium::new(bindings))
}

fn map_load_error(e: PdfiumError, pdf_path: &Path, password: Option<&str>) -> FetchMdError {
    let err_str = format!("{e:?}");
    if err_str.contains("Password") || err_str.contains("password") {
        if password.is_some() {
            FetchMdError::WrongPassword {
                path: pdf_path.to_path_buf(),
            }
        } else {
            FetchMdError::PasswordRequired {
                path: pdf_path.to_path_buf(),
            }
        }
    } else {
        FetchMdError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: err_str,
        }
    }
}

/// [`PageAnalyzer`] over an open pdfium document.
struct PdfiumAnalyzer<'a, 'b> {
    document: &'a PdfDocument<'b>,
}

impl PageAnalyzer for PdfiumAnalyzer<'_, '_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn analyze_page(&self, index: usize) -> Result<PageContent, AnalyzeError> {
        let page = self
            .document
            .pages()
            .get(index as u16)
            .map_err(|e| AnalyzeError(format!("{e:?}")))?;

        let text = page
            .text()
            .map(|t| t.all())
            .map_err(|e| AnalyzeError(format!("{e:?}")))?;

        let image_count = page
            .objects()
            .iter()
            .filter(|obj| obj.object_type() == PdfPageObjectType::Image)
            .count();

        // pdfium has no table extractor; tables are recovered from the text
        // layer with the delimiter-alignment heuristic.
        let tables = markdown::detect_tables(&text);

        debug!(
            "page {}: {} chars, {} tables, {} images",
            index + 1,
            text.len(),
            tables.len(),
            image_count
        );

        Ok(PageContent {
            text: if text.trim().is_empty() { None } else { Some(text) },
            tables,
            image_count,
        })
    }

    fn rasterize_page(&self, index: usize, max_pixels: u32) -> Result<DynamicImage, AnalyzeError> {
        let page = self
            .document
            .pages()
            .get(index as u16)
            .map_err(|e| AnalyzeError(format!("{e:?}")))?;

        let render_config = PdfRenderConfig::new()
            .set_target_width(max_pixels as i32)
            .set_maximum_height(max_pixels as i32);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| AnalyzeError(format!("{e:?}")))?;

        Ok(bitmap.as_image())
    }
}
