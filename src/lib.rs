//! # fetchmd
//!
//! Convert PDF documents to Markdown with a built-in quality grade.
//!
//! ## Why this crate?
//!
//! PDF extraction fails quietly: a scanned page yields nothing, a table
//! collapses into word soup, and the caller only finds out when a human
//! reads the output. This crate attaches a deterministic 0–100 **fetch
//! score** to every conversion so pipelines can gate on quality — reject
//! below a threshold, route low scores to review, or compare extraction
//! settings A/B — without anyone eyeballing Markdown.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    validate path and %PDF magic
//!  ├─ 2. Extract  per-page text/tables/images via pdfium (spawn_blocking)
//!  │               └─ OCR fallback for pages with no text layer
//!  ├─ 3. Merge    page records → document body + ExtractionMetrics
//!  ├─ 4. Enhance  optional LLM formatting pass (never aborts the run)
//!  ├─ 5. Score    metrics → FetchScore (text / structure / completeness)
//!  └─ 6. Report   append the Extraction Report section
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fetchmd::{convert, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::default();
//!     let output = convert("document.pdf", &config).await?;
//!     println!("{}", output.markdown);
//!     eprintln!("score: {:.0}/100 ({})",
//!         output.score.overall_score,
//!         output.score.grade);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `fetchmd` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! fetchmd = { version = "0.1", default-features = false }
//! ```
//!
//! ## Reading the score
//!
//! | Sub-score | Measures | Driven by |
//! |-----------|----------|-----------|
//! | text | page coverage | pages with a text layer, OCR pages at half credit |
//! | structure | layout recovery | tables, images, LLM enhancement bonuses |
//! | completeness | absence of problems | per-page warnings, full-OCR penalty |
//!
//! The overall score is the weighted combination (default 0.4/0.3/0.3) and
//! maps to a letter grade at fixed thresholds (90/80/70/60). Every point
//! lost is traceable to a metric or a warning listed in the report.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod metrics;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod report;
pub mod score;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, ScoreTuning, ScoreWeights};
pub use convert::{convert, convert_from_bytes, convert_many, convert_sync, convert_to_file};
pub use error::FetchMdError;
pub use metrics::ExtractionMetrics;
pub use output::{ConversionOutput, ExtractionStats};
pub use pipeline::input::default_output_path;
pub use pipeline::ocr::{OcrEngine, OcrError};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use report::{append_report, render_report};
pub use score::{calculate_score, FetchScore, Grade};
