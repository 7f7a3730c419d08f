//! The fetch score calculator: pure, deterministic, no I/O.
//!
//! `score = f(metrics, weights, tuning)` — given the same inputs the same
//! [`FetchScore`] comes out, which is what makes the grade auditable: every
//! point lost traces back to a metric or a warning the report shows.
//!
//! Three sub-scores exist because extraction quality is multi-dimensional:
//! a document can have perfect text coverage but mangled tables, or clean
//! structure recovered entirely through low-confidence OCR. Collapsing that
//! into one yes/no signal would hide exactly the failures callers care about.
//!
//! Grading uses the *exact* overall value, not the display-rounded one:
//! 89.999 is a B even though it prints as 90.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{ScoreTuning, ScoreWeights};
use crate::error::FetchMdError;
use crate::metrics::ExtractionMetrics;

/// Letter grade derived from the overall score via fixed thresholds.
///
/// A: [90,100], B: [80,90), C: [70,80), D: [60,70), F: [0,60).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Grade for an exact (unrounded) overall score.
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Grade::A
        } else if score >= 80.0 {
            Grade::B
        } else if score >= 70.0 {
            Grade::C
        } else if score >= 60.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    /// The bare letter, as used in JSON output.
    pub fn letter(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::A => "A - Excellent",
            Grade::B => "B - Good",
            Grade::C => "C - Acceptable",
            Grade::D => "D - Fair",
            Grade::F => "F - Poor",
        };
        f.write_str(s)
    }
}

/// The composite 0–100 quality metric for a PDF-to-Markdown extraction.
///
/// Computed once per document by [`calculate_score`] and immutable
/// thereafter. All scores are exact values; rounding happens only when the
/// report renderer or the CLI formats them for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchScore {
    /// Text-coverage sub-score in [0, 100].
    pub text_score: f64,
    /// Structural-richness sub-score in [0, 100].
    pub structure_score: f64,
    /// Completeness sub-score in [0, 100].
    pub completeness_score: f64,
    /// Weighted combination in [0, 100]. Round for display only.
    pub overall_score: f64,
    /// Letter grade from the exact overall score.
    pub grade: Grade,
    /// Metrics warnings, possibly followed by score-derived warnings.
    pub warnings: Vec<String>,
}

fn clamp_score(v: f64) -> f64 {
    v.clamp(0.0, 100.0)
}

/// Compute the fetch score for finalised extraction metrics.
///
/// # Errors
/// Returns [`FetchMdError::InvalidMetrics`] for counts that cannot occur
/// (e.g. `pages_with_text > total_pages`) and
/// [`FetchMdError::InvalidConfig`] for weights that do not sum to 1.0 —
/// malformed input is never masked as a low score.
pub fn calculate_score(
    metrics: &ExtractionMetrics,
    weights: &ScoreWeights,
    tuning: &ScoreTuning,
) -> Result<FetchScore, FetchMdError> {
    metrics.validate()?;
    weights.validate()?;
    tuning.validate()?;

    let mut warnings = metrics.warnings.clone();

    // ── Text extraction ─────────────────────────────────────────────────
    // OCR-recovered pages earn reduced credit: the text exists, but its
    // fidelity is not that of an embedded text layer.
    let text_score = if metrics.total_pages > 0 {
        let covered =
            metrics.pages_with_text as f64 + tuning.ocr_weight * metrics.ocr_pages as f64;
        clamp_score(100.0 * covered / metrics.total_pages as f64)
    } else {
        warnings.push("document has no pages".to_string());
        0.0
    };

    // ── Structure preservation ──────────────────────────────────────────
    // Presence bonuses, not count ratios: one recovered table is already
    // evidence the extractor kept structure intact.
    let mut structure_score = tuning.structure_baseline;
    if metrics.tables_extracted > 0 {
        structure_score += tuning.table_bonus;
    }
    if metrics.images_extracted > 0 {
        structure_score += tuning.image_bonus;
    }
    if metrics.llm_enhanced {
        structure_score += tuning.enhance_bonus;
    }
    let structure_score = clamp_score(structure_score);

    // ── Completeness ────────────────────────────────────────────────────
    // The per-warning penalty is computed from the metrics warnings only;
    // the score-derived warnings appended below do not feed back into it.
    let full_ocr = metrics.total_pages > 0 && metrics.ocr_pages == metrics.total_pages;
    let mut completeness_score = 100.0
        - (metrics.warnings.len() as f64 * tuning.warning_penalty).min(tuning.warning_penalty_cap);
    if full_ocr {
        completeness_score -= tuning.full_ocr_penalty;
        warnings.push("entire document required OCR".to_string());
    }
    let completeness_score = clamp_score(completeness_score);

    let overall_score = clamp_score(
        text_score * weights.text
            + structure_score * weights.structure
            + completeness_score * weights.completeness,
    );

    Ok(FetchScore {
        text_score,
        structure_score,
        completeness_score,
        overall_score,
        grade: Grade::from_score(overall_score),
        warnings,
    })
}
