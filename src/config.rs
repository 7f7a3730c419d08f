//! Configuration types for PDF-to-Markdown extraction and scoring.
//!
//! All behaviour is controlled through [`ExtractionConfig`], built via its
//! [`ExtractionConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across batch conversions and to diff two runs to
//! understand why their scores differ.
//!
//! The scoring weights and bonus/penalty constants live here rather than in
//! the calculator because they are *tunable policy*, not algorithm: a
//! text-heavy corpus and a data-heavy corpus want different
//! [`ScoreWeights`], and the per-warning penalty is a default inherited from
//! the reference scoring rules, not a contract.

use crate::error::FetchMdError;
use crate::pipeline::ocr::OcrEngine;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Weights for combining the three sub-scores into the overall fetch score.
///
/// Must be non-negative and sum to 1.0 (within 1e-6). The presets cover the
/// two documented customisation cases; anything else can be built literally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub text: f64,
    pub structure: f64,
    pub completeness: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            text: 0.4,
            structure: 0.3,
            completeness: 0.3,
        }
    }
}

impl ScoreWeights {
    /// Weighting for prose-dominated documents (reports, books, papers).
    pub fn text_heavy() -> Self {
        Self {
            text: 0.6,
            structure: 0.2,
            completeness: 0.2,
        }
    }

    /// Weighting for table/figure-dominated documents (forms, data sheets).
    pub fn data_heavy() -> Self {
        Self {
            text: 0.2,
            structure: 0.5,
            completeness: 0.3,
        }
    }

    /// Check the sum-to-one invariant.
    pub fn validate(&self) -> Result<(), FetchMdError> {
        for (name, w) in [
            ("text", self.text),
            ("structure", self.structure),
            ("completeness", self.completeness),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(FetchMdError::InvalidConfig(format!(
                    "score weight '{name}' must be a non-negative number, got {w}"
                )));
            }
        }
        let sum = self.text + self.structure + self.completeness;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(FetchMdError::InvalidConfig(format!(
                "score weights must sum to 1.0, got {sum}"
            )));
        }
        Ok(())
    }
}

/// Bonus/penalty constants used by the sub-score formulas.
///
/// Defaults follow the reference scoring rules. All values are in score
/// points (0–100 scale) except `ocr_weight`, which is the credit ratio an
/// OCR-recovered page earns relative to a directly-extracted one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreTuning {
    /// Credit ratio for OCR-recovered pages in the text score. Default: 0.5.
    ///
    /// OCR output carries lower confidence than an embedded text layer, so a
    /// page recovered only via OCR counts as half a page of text coverage.
    pub ocr_weight: f64,
    /// Structure score before any bonuses. Default: 50.
    pub structure_baseline: f64,
    /// Bonus when at least one table was extracted. Default: 25.
    pub table_bonus: f64,
    /// Bonus when at least one image was detected. Default: 15.
    pub image_bonus: f64,
    /// Bonus when the enhancement pass succeeded. Default: 10.
    pub enhance_bonus: f64,
    /// Completeness penalty per warning. Default: 5.
    pub warning_penalty: f64,
    /// Upper bound on the total per-warning penalty. Default: 30.
    pub warning_penalty_cap: f64,
    /// Additional penalty when every page required OCR. Default: 20.
    pub full_ocr_penalty: f64,
}

impl Default for ScoreTuning {
    fn default() -> Self {
        Self {
            ocr_weight: 0.5,
            structure_baseline: 50.0,
            table_bonus: 25.0,
            image_bonus: 15.0,
            enhance_bonus: 10.0,
            warning_penalty: 5.0,
            warning_penalty_cap: 30.0,
            full_ocr_penalty: 20.0,
        }
    }
}

impl ScoreTuning {
    pub fn validate(&self) -> Result<(), FetchMdError> {
        if !self.ocr_weight.is_finite() || !(0.0..=1.0).contains(&self.ocr_weight) {
            return Err(FetchMdError::InvalidConfig(format!(
                "ocr_weight must be within 0.0–1.0, got {}",
                self.ocr_weight
            )));
        }
        for (name, v) in [
            ("structure_baseline", self.structure_baseline),
            ("table_bonus", self.table_bonus),
            ("image_bonus", self.image_bonus),
            ("enhance_bonus", self.enhance_bonus),
            ("warning_penalty", self.warning_penalty),
            ("warning_penalty_cap", self.warning_penalty_cap),
            ("full_ocr_penalty", self.full_ocr_penalty),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(FetchMdError::InvalidConfig(format!(
                    "score tuning '{name}' must be a non-negative number, got {v}"
                )));
            }
        }
        Ok(())
    }
}

/// Configuration for a PDF-to-Markdown extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use fetchmd::{ExtractionConfig, ScoreWeights};
///
/// let config = ExtractionConfig::builder()
///     .enhance(true)
///     .weights(ScoreWeights::text_heavy())
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Run the LLM enhancement pass over the assembled Markdown. Default: false.
    ///
    /// When enabled, the provider is resolved before any page processing so
    /// a missing credential fails fast rather than after minutes of work.
    pub enhance: bool,

    /// LLM model identifier for enhancement, e.g. "gpt-4.1-nano".
    /// If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, the provider is auto-detected from the
    /// environment.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// OCR engine used as the fallback for pages with no text layer.
    ///
    /// None disables the OCR fallback entirely: such pages contribute no
    /// text and may raise a "no content" warning instead.
    pub ocr: Option<Arc<dyn OcrEngine>>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Sub-score weights. Must sum to 1.0.
    pub weights: ScoreWeights,

    /// Bonus/penalty constants for the sub-score formulas.
    pub tuning: ScoreTuning,

    /// Maximum rasterised image dimension (width or height) in pixels when
    /// rendering a page for OCR. Default: 2000.
    ///
    /// A safety cap independent of page size: an A0 poster would otherwise
    /// rasterise to an image large enough to exhaust memory.
    pub max_rendered_pixels: u32,

    /// Timeout for the single enhancement call in seconds. Default: 120.
    /// Expiry is treated as an enhancement failure (warning, original kept).
    pub enhance_timeout_secs: u64,

    /// Character budget for the Markdown sent to the enhancement service.
    /// Longer bodies are truncated with an explicit marker. Default: 100000.
    pub enhance_max_chars: usize,

    /// Sampling temperature for the enhancement completion. Default: 0.1.
    ///
    /// Low temperature keeps the model faithful to the extracted text —
    /// exactly what a formatting cleanup pass wants.
    pub enhance_temperature: f32,

    /// Maximum tokens the enhancement call may generate. Default: 8192.
    pub enhance_max_tokens: usize,

    /// Number of documents converted concurrently by
    /// [`crate::convert::convert_many`]. Default: 4.
    pub concurrency: usize,

    /// Optional progress callback receiving per-page extraction events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            enhance: false,
            model: None,
            provider_name: None,
            provider: None,
            ocr: None,
            password: None,
            weights: ScoreWeights::default(),
            tuning: ScoreTuning::default(),
            max_rendered_pixels: 2000,
            enhance_timeout_secs: 120,
            enhance_max_chars: 100_000,
            enhance_temperature: 0.1,
            enhance_max_tokens: 8192,
            concurrency: 4,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("enhance", &self.enhance)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("ocr", &self.ocr.as_ref().map(|_| "<dyn OcrEngine>"))
            .field("weights", &self.weights)
            .field("tuning", &self.tuning)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("enhance_timeout_secs", &self.enhance_timeout_secs)
            .field("enhance_max_chars", &self.enhance_max_chars)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn enhance(mut self, v: bool) -> Self {
        self.config.enhance = v;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn ocr(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.config.ocr = Some(engine);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn weights(mut self, weights: ScoreWeights) -> Self {
        self.config.weights = weights;
        self
    }

    pub fn tuning(mut self, tuning: ScoreTuning) -> Self {
        self.config.tuning = tuning;
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn enhance_timeout_secs(mut self, secs: u64) -> Self {
        self.config.enhance_timeout_secs = secs;
        self
    }

    pub fn enhance_max_chars(mut self, chars: usize) -> Self {
        self.config.enhance_max_chars = chars;
        self
    }

    pub fn enhance_temperature(mut self, t: f32) -> Self {
        self.config.enhance_temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn enhance_max_tokens(mut self, n: usize) -> Self {
        self.config.enhance_max_tokens = n;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, FetchMdError> {
        let c = &self.config;
        c.weights.validate()?;
        c.tuning.validate()?;
        if c.concurrency == 0 {
            return Err(FetchMdError::InvalidConfig("concurrency must be ≥ 1".into()));
        }
        if c.enhance_timeout_secs == 0 {
            return Err(FetchMdError::InvalidConfig(
                "enhance_timeout_secs must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
