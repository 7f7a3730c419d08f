//! Pipeline stages for PDF-to-Markdown extraction.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap
//! implementations (e.g. plug in a different OCR engine) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ markdown ──▶ enhance
//! (path)    (pdfium +   (blocks,     (optional LLM
//!            OCR)        tables)      cleanup)
//! ```
//!
//! 1. [`input`]    — validate the user-supplied path and PDF magic bytes
//! 2. [`extract`]  — per-page text/table/image collection behind the
//!    [`extract::PageAnalyzer`] capability; OCR fallback via [`ocr::OcrEngine`]
//! 3. [`pdfium`]   — the pdfium-backed analyzer; runs in `spawn_blocking`
//!    because pdfium is not async-safe
//! 4. [`markdown`] — deterministic text-to-Markdown formatting rules
//! 5. [`enhance`]  — the optional LLM cleanup pass; the only stage with
//!    network I/O, and the only one allowed to fail without a trace in the
//!    exit code

pub mod enhance;
pub mod extract;
pub mod input;
pub mod markdown;
pub mod ocr;
pub mod pdfium;
