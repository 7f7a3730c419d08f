//! Extraction metrics: per-page result records and their merged aggregate.
//!
//! The collector processes pages independently and produces one
//! [`PageRecord`] per page (the fan-out half). [`merge_records`] is the
//! single-threaded reducer (the merge half): it folds records into one
//! [`ExtractionMetrics`] in page order so warnings always appear in the same
//! order regardless of how page work was scheduled.

use serde::{Deserialize, Serialize};

use crate::error::FetchMdError;

/// Accumulated extraction quality metrics for one document.
///
/// Built incrementally from [`PageRecord`]s, finalised after the optional
/// enhancement step, then passed immutably into
/// [`crate::score::calculate_score`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionMetrics {
    /// Count of pages in the source document.
    pub total_pages: usize,
    /// Pages where direct text extraction returned non-empty content.
    /// Does NOT include pages recovered only via OCR.
    pub pages_with_text: usize,
    /// Pages that required the OCR fallback and where OCR yielded text.
    pub ocr_pages: usize,
    /// Tables detected across all pages.
    pub tables_extracted: usize,
    /// Images detected/referenced across all pages.
    pub images_extracted: usize,
    /// Whether the enhancement pass ran and completed without error.
    pub llm_enhanced: bool,
    /// Ordered per-page diagnostics plus any enhancement warning.
    pub warnings: Vec<String>,
}

impl ExtractionMetrics {
    /// Reject counts that cannot occur in a real extraction.
    ///
    /// Note that `pages_with_text + ocr_pages` may legitimately be less than
    /// `total_pages` (some pages have neither) — only per-field bounds are
    /// checked here.
    pub fn validate(&self) -> Result<(), FetchMdError> {
        if self.pages_with_text > self.total_pages {
            return Err(FetchMdError::InvalidMetrics(format!(
                "pages_with_text ({}) > total_pages ({})",
                self.pages_with_text, self.total_pages
            )));
        }
        if self.ocr_pages > self.total_pages {
            return Err(FetchMdError::InvalidMetrics(format!(
                "ocr_pages ({}) > total_pages ({})",
                self.ocr_pages, self.total_pages
            )));
        }
        Ok(())
    }
}

/// Outcome of extracting a single page.
///
/// Records are independent: producing them can be parallelised freely, and
/// the reducer re-establishes page order before accumulating anything.
#[derive(Debug, Clone, Default)]
pub struct PageRecord {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Assembled Markdown block for this page (may be empty).
    pub markdown: String,
    /// Direct text extraction returned non-empty content.
    pub direct_text: bool,
    /// OCR was invoked and yielded non-empty text.
    pub ocr_text: bool,
    /// Tables found on this page.
    pub tables: usize,
    /// Images found/referenced on this page.
    pub images: usize,
    /// Diagnostics raised while processing this page.
    pub warnings: Vec<String>,
}

/// Merge per-page records into document metrics and ordered page blocks.
///
/// Records are sorted by page number first, so the returned Markdown blocks
/// and warning sequence are deterministic even when the records were
/// produced out of order.
pub fn merge_records(
    total_pages: usize,
    mut records: Vec<PageRecord>,
) -> (Vec<String>, ExtractionMetrics) {
    records.sort_by_key(|r| r.page_num);

    let mut metrics = ExtractionMetrics {
        total_pages,
        ..ExtractionMetrics::default()
    };
    let mut blocks = Vec::with_capacity(records.len());

    for record in records {
        if record.direct_text {
            metrics.pages_with_text += 1;
        }
        if record.ocr_text {
            metrics.ocr_pages += 1;
        }
        metrics.tables_extracted += record.tables;
        metrics.images_extracted += record.images;
        metrics.warnings.extend(record.warnings);
        if !record.markdown.trim().is_empty() {
            blocks.push(record.markdown);
        }
    }

    (blocks, metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(page_num: usize) -> PageRecord {
        PageRecord {
            page_num,
            markdown: format!("<!-- Page {page_num} -->\n\ntext"),
            direct_text: true,
            ..PageRecord::default()
        }
    }

    #[test]
    fn validate_accepts_partial_coverage() {
        // Pages with neither text nor OCR are allowed.
        let m = ExtractionMetrics {
            total_pages: 10,
            pages_with_text: 4,
            ocr_pages: 3,
            ..ExtractionMetrics::default()
        };
        assert!(m.validate().is_ok());
    }

    #[test]
    fn validate_rejects_text_overflow() {
        let m = ExtractionMetrics {
            total_pages: 5,
            pages_with_text: 7,
            ..ExtractionMetrics::default()
        };
        assert!(matches!(
            m.validate(),
            Err(FetchMdError::InvalidMetrics(_))
        ));
    }

    #[test]
    fn validate_rejects_ocr_overflow() {
        let m = ExtractionMetrics {
            total_pages: 5,
            ocr_pages: 6,
            ..ExtractionMetrics::default()
        };
        assert!(m.validate().is_err());
    }

    #[test]
    fn merge_restores_page_order() {
        let mut r3 = record(3);
        r3.warnings.push("page 3: no text or image content found".into());
        let records = vec![r3, record(1), record(2)];

        let (blocks, metrics) = merge_records(3, records);

        assert_eq!(blocks.len(), 3);
        assert!(blocks[0].contains("Page 1"));
        assert!(blocks[2].contains("Page 3"));
        assert_eq!(metrics.pages_with_text, 3);
        assert_eq!(metrics.warnings, vec!["page 3: no text or image content found"]);
    }

    #[test]
    fn merge_accumulates_counts() {
        let mut a = record(1);
        a.tables = 2;
        a.images = 1;
        let mut b = record(2);
        b.direct_text = false;
        b.ocr_text = true;
        b.images = 3;

        let (_, metrics) = merge_records(2, vec![a, b]);
        assert_eq!(metrics.pages_with_text, 1);
        assert_eq!(metrics.ocr_pages, 1);
        assert_eq!(metrics.tables_extracted, 2);
        assert_eq!(metrics.images_extracted, 4);
    }

    #[test]
    fn merge_drops_empty_blocks() {
        let mut empty = PageRecord {
            page_num: 2,
            ..PageRecord::default()
        };
        empty
            .warnings
            .push("page 2: no text or image content found".into());

        let (blocks, metrics) = merge_records(2, vec![record(1), empty]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(metrics.warnings.len(), 1);
    }
}
