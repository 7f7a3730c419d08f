//! Full-document conversion entry points.
//!
//! The orchestrator owns sequencing and timing only; the stages it calls are
//! where the behaviour lives. Per-page problems never surface here — they
//! arrive as warnings inside the metrics and lower the score instead.

use futures::stream::{self, StreamExt};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::ExtractionConfig;
use crate::error::FetchMdError;
use crate::metrics::merge_records;
use crate::output::{ConversionOutput, ExtractionStats};
use crate::pipeline::{enhance, input, pdfium};
use crate::report::append_report;
use crate::score::calculate_score;
use edgequake_llm::{LLMProvider, ProviderFactory};

/// Separator between page blocks in the assembled document.
const PAGE_SEPARATOR: &str = "\n\n---\n\n";

/// Convert a PDF file to scored Markdown.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Returns `Err(FetchMdError)` only for document-level problems: missing or
/// unreadable file, not a PDF, corrupt PDF, wrong password, or a requested
/// enhancement provider that cannot be resolved. Per-page extraction
/// failures are reported as warnings in `output.metrics.warnings` and show
/// up in the score.
pub async fn convert(
    input_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ConversionOutput, FetchMdError> {
    let total_start = Instant::now();
    let input_path = input_path.as_ref();
    info!("Starting conversion: {}", input_path.display());

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let pdf_path = input::resolve_input(input_path)?;

    // ── Step 2: Resolve the enhancement provider up front ────────────────
    // A missing credential must fail before any page work, not after it.
    let provider = if config.enhance {
        Some(resolve_provider(config)?)
    } else {
        None
    };

    // ── Step 3: Walk the document ────────────────────────────────────────
    let extract_start = Instant::now();
    let (total_pages, records) = pdfium::extract_document(&pdf_path, config).await?;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;
    info!(
        "Extracted {} pages in {}ms",
        total_pages, extract_duration_ms
    );

    // ── Step 4: Merge page records ───────────────────────────────────────
    let (blocks, mut metrics) = merge_records(total_pages, records);
    let mut body = blocks.join(PAGE_SEPARATOR);

    // ── Step 5: Optional LLM enhancement ─────────────────────────────────
    let mut enhance_duration_ms = 0;
    if let Some(ref provider) = provider {
        let doc_name = pdf_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());

        let enhance_start = Instant::now();
        let outcome = enhance::enhance_markdown(provider, &doc_name, &body, config).await;
        enhance_duration_ms = enhance_start.elapsed().as_millis() as u64;

        body = outcome.markdown;
        metrics.llm_enhanced = outcome.enhanced;
        if let Some(warning) = outcome.warning {
            metrics.warnings.push(warning);
        }
        debug!(
            "Enhancement {} in {}ms",
            if metrics.llm_enhanced { "succeeded" } else { "failed" },
            enhance_duration_ms
        );
    }

    // ── Step 6: Score ────────────────────────────────────────────────────
    let score = calculate_score(&metrics, &config.weights, &config.tuning)?;
    info!(
        "Fetch score: {:.0}/100 ({})",
        score.overall_score, score.grade
    );

    // ── Step 7: Append the report ────────────────────────────────────────
    let document = append_report(&body, &score, &metrics);

    let stats = ExtractionStats {
        total_pages,
        extract_duration_ms,
        enhance_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    Ok(ConversionOutput {
        markdown: document,
        score,
        metrics,
        stats,
    })
}

/// Convert a PDF and write the Markdown directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn convert_to_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ConversionOutput, FetchMdError> {
    let output = convert(input_path, config).await?;
    let path = output_path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FetchMdError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        }
    }

    let tmp_path = path.with_extension("md.tmp");
    tokio::fs::write(&tmp_path, &output.markdown)
        .await
        .map_err(|e| FetchMdError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| FetchMdError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    info!("Wrote {}", path.display());
    Ok(output)
}

/// Convert PDF bytes in memory to scored Markdown.
///
/// The bytes are written to a managed [`tempfile`] which is cleaned up
/// automatically on return or panic. Use this when the PDF comes from a
/// database or network buffer rather than a file on disk.
pub async fn convert_from_bytes(
    bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<ConversionOutput, FetchMdError> {
    let mut tmp = tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| FetchMdError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| FetchMdError::Internal(format!("tempfile write: {e}")))?;
    tmp.flush()
        .map_err(|e| FetchMdError::Internal(format!("tempfile flush: {e}")))?;
    // `tmp` is dropped (and the file deleted) when `convert` returns
    convert(tmp.path(), config).await
}

/// Convert several PDFs, up to `config.concurrency` at a time.
///
/// Results come back in input order, one per input, so a failed document
/// never shifts the pairing between paths and results.
pub async fn convert_many(
    inputs: &[PathBuf],
    config: &ExtractionConfig,
) -> Vec<Result<ConversionOutput, FetchMdError>> {
    stream::iter(inputs.iter().map(|path| {
        let config = config.clone();
        let path = path.clone();
        async move { convert(&path, &config).await }
    }))
    .buffered(config.concurrency)
    .collect()
    .await
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ConversionOutput, FetchMdError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| FetchMdError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(convert(input_path, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve the LLM provider for enhancement, most-specific first.
///
/// 1. **Pre-built provider** (`config.provider`) — used as-is. Useful in
///    tests or when the caller wants custom middleware.
/// 2. **Named provider + model** (`config.provider_name`) — instantiated via
///    [`ProviderFactory::create_llm_provider`], which reads the matching API
///    key from the environment.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`) —
///    honoured before full auto-detection so an explicit model choice wins
///    even when several API keys are present.
/// 4. **Full auto-detection** — `OPENAI_API_KEY` first, then
///    [`ProviderFactory::from_env`].
fn resolve_provider(config: &ExtractionConfig) -> Result<Arc<dyn LLMProvider>, FetchMdError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or("gpt-4.1-nano");
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or("gpt-4.1-nano");
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| FetchMdError::EnhancerNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

fn create_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, FetchMdError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        FetchMdError::EnhancerNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_fatal() {
        let config = ExtractionConfig::default();
        let err = convert("/nonexistent/report.pdf", &config).await.unwrap_err();
        assert!(matches!(err, FetchMdError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn non_pdf_bytes_rejected() {
        let config = ExtractionConfig::default();
        let err = convert_from_bytes(b"<html>nope</html>", &config)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchMdError::NotAPdf { .. }));
    }

    #[tokio::test]
    async fn convert_many_preserves_input_order() {
        let config = ExtractionConfig::default();
        let inputs = vec![
            PathBuf::from("/nonexistent/a.pdf"),
            PathBuf::from("/nonexistent/b.pdf"),
        ];
        let results = convert_many(&inputs, &config).await;
        assert_eq!(results.len(), 2);
        for (path, result) in inputs.iter().zip(&results) {
            match result {
                Err(FetchMdError::FileNotFound { path: p }) => assert_eq!(p, path),
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }
}
