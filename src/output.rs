//! The result bundle handed back by a conversion.

use serde::Serialize;

use crate::metrics::ExtractionMetrics;
use crate::score::FetchScore;

/// Everything a conversion produces: the document, its grade, and the raw
/// metrics the grade was computed from.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutput {
    /// Final Markdown, report section included, ending in a single newline.
    pub markdown: String,
    /// The fetch score computed from `metrics`.
    pub score: FetchScore,
    /// Finalised per-document metrics.
    pub metrics: ExtractionMetrics,
    /// Wall-clock timings for the run.
    pub stats: ExtractionStats,
}

/// Wall-clock statistics for one conversion.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionStats {
    pub total_pages: usize,
    /// Time spent walking the PDF (load through last page), in milliseconds.
    pub extract_duration_ms: u64,
    /// Time spent in the enhancement call, 0 when the pass did not run.
    pub enhance_duration_ms: u64,
    pub total_duration_ms: u64,
}
