//! OCR engine capability interface.
//!
//! OCR is an external collaborator: this crate rasterises the page and hands
//! the image over, nothing more. Modelling the engine as a trait keeps the
//! collector unit-testable with fakes and lets callers plug in whatever
//! recogniser they run (a tesseract wrapper, a hosted OCR API, a vision
//! model) without this crate taking the dependency.

use image::DynamicImage;
use thiserror::Error;

/// An OCR engine failed to recognise a page image.
///
/// Always recoverable: the collector records it as a per-page warning and
/// moves on.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct OcrError(pub String);

/// Recognise text from a rasterised page image.
///
/// Implementations must be `Send + Sync`: recognition runs on blocking
/// worker threads and may be shared across concurrent document conversions.
pub trait OcrEngine: Send + Sync {
    /// Extract text from the image. An `Ok` result that is empty or
    /// whitespace-only is treated as "nothing recognised", not an error.
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    struct FixedOcr(&'static str);

    impl OcrEngine for FixedOcr {
        fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn trait_object_usable() {
        let engine: Box<dyn OcrEngine> = Box::new(FixedOcr("recovered text"));
        let img = DynamicImage::ImageRgba8(RgbaImage::new(4, 4));
        assert_eq!(engine.recognize(&img).unwrap(), "recovered text");
    }

    #[test]
    fn error_display() {
        let e = OcrError("engine crashed".into());
        assert_eq!(e.to_string(), "engine crashed");
    }
}
