//! Error types for the fetchmd library.
//!
//! Only *fatal* conditions are modelled as error values: the conversion
//! cannot proceed at all (bad input file, wrong password, enhancement
//! requested but no provider configured). Everything that can go wrong on a
//! single page — extraction glitch, OCR failure, empty page — is recorded as
//! a warning string in [`crate::metrics::ExtractionMetrics::warnings`] and
//! lowers the completeness sub-score instead of aborting the run.
//!
//! The one deliberate exception is [`FetchMdError::InvalidMetrics`]: the
//! score calculator refuses malformed input (e.g. `pages_with_text >
//! total_pages`) rather than silently producing a misleading grade.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the fetchmd library.
#[derive(Debug, Error)]
pub enum FetchMdError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    // ── Enhancement errors ────────────────────────────────────────────────
    /// Enhancement was explicitly requested but no LLM provider could be
    /// resolved. Surfaced before any page processing begins.
    #[error("Enhancement requested but provider '{provider}' is not configured.\n{hint}")]
    EnhancerNotConfigured { provider: String, hint: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Metrics handed to the score calculator are malformed.
    ///
    /// Never downgraded to a low score: a count that cannot occur means a
    /// bug upstream, and a grade computed from it would be meaningless.
    #[error("Invalid extraction metrics: {0}")]
    InvalidMetrics(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium to point at an existing copy.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
