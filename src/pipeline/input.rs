//! Input resolution: validate the user-supplied PDF path.
//!
//! We check the PDF magic bytes (`%PDF`) up front so callers get a
//! meaningful error for a mislabelled file rather than a pdfium parse
//! failure deep inside the extraction walk.

use crate::error::FetchMdError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolve and validate a local PDF path.
///
/// Checks existence, readability, and the `%PDF` magic bytes.
pub fn resolve_input(path: &Path) -> Result<PathBuf, FetchMdError> {
    let path = path.to_path_buf();

    if !path.exists() {
        return Err(FetchMdError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            use std::io::Read;
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(FetchMdError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(FetchMdError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(FetchMdError::FileNotFound { path });
        }
    }

    debug!("Resolved input PDF: {}", path.display());
    Ok(path)
}

/// Default output path: the input with a `.md` extension.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("md")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_fatal() {
        let err = resolve_input(Path::new("/nonexistent/doc.pdf")).unwrap_err();
        assert!(matches!(err, FetchMdError::FileNotFound { .. }));
    }

    #[test]
    fn non_pdf_rejected_by_magic() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"<html>not a pdf</html>").unwrap();
        let err = resolve_input(f.path()).unwrap_err();
        assert!(matches!(err, FetchMdError::NotAPdf { .. }));
    }

    #[test]
    fn pdf_magic_accepted() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"%PDF-1.7\n...").unwrap();
        let resolved = resolve_input(f.path()).unwrap();
        assert_eq!(resolved, f.path());
    }

    #[test]
    fn default_output_swaps_extension() {
        assert_eq!(
            default_output_path(Path::new("/docs/report.pdf")),
            PathBuf::from("/docs/report.md")
        );
        assert_eq!(
            default_output_path(Path::new("notes")),
            PathBuf::from("notes.md")
        );
    }
}
