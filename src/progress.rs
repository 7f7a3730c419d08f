//! Progress-callback trait for per-page extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the collector processes each page.
//!
//! Callbacks are the least-invasive integration point: callers can forward
//! events to a terminal progress bar, a log, or a channel without the
//! library knowing how the host application communicates. The trait is
//! `Send + Sync` because extraction runs on a blocking worker thread and
//! batch mode converts documents concurrently.

use std::sync::Arc;

/// Called by the extraction pipeline as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once before any page is processed.
    fn on_extraction_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after each page's record is complete.
    ///
    /// `used_ocr` is true when the page was recovered via the OCR fallback.
    fn on_page_complete(&self, page_num: usize, total_pages: usize, used_ocr: bool) {
        let _ = (page_num, total_pages, used_ocr);
    }

    /// Called for each per-page warning as it is recorded.
    fn on_page_warning(&self, page_num: usize, total_pages: usize, warning: &str) {
        let _ = (page_num, total_pages, warning);
    }

    /// Called once after all pages have been attempted.
    ///
    /// `pages_with_content` counts pages that yielded text directly or via OCR.
    fn on_extraction_complete(&self, total_pages: usize, pages_with_content: usize) {
        let _ = (total_pages, pages_with_content);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
