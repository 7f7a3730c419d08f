//! The enhancement adapter: optional LLM cleanup of the assembled Markdown.
//!
//! This step never aborts the pipeline. Any failure — network error,
//! authentication, timeout, empty response — leaves the original body
//! unchanged, marks `llm_enhanced = false`, and records exactly one warning.
//! The call/outcome split keeps the decision logic in [`apply_enhancement`]
//! pure and testable without a live provider.

use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use crate::config::ExtractionConfig;
use crate::pipeline::markdown::strip_markdown_fences;
use crate::prompts::{enhancement_prompt, ENHANCEMENT_SYSTEM_PROMPT};

/// Result of the enhancement pass.
#[derive(Debug, Clone)]
pub struct EnhanceOutcome {
    /// The body to use from here on (revised on success, original otherwise).
    pub markdown: String,
    /// Whether the pass completed without error.
    pub enhanced: bool,
    /// The single warning recorded on failure.
    pub warning: Option<String>,
}

/// Run the enhancement call and fold its result into an outcome.
pub async fn enhance_markdown(
    provider: &Arc<dyn LLMProvider>,
    doc_name: &str,
    markdown: &str,
    config: &ExtractionConfig,
) -> EnhanceOutcome {
    let messages = vec![
        ChatMessage::system(ENHANCEMENT_SYSTEM_PROMPT),
        ChatMessage::user(enhancement_prompt(
            doc_name,
            markdown,
            config.enhance_max_chars,
        )),
    ];

    let options = CompletionOptions {
        temperature: Some(config.enhance_temperature),
        max_tokens: Some(config.enhance_max_tokens),
        ..Default::default()
    };

    let response = match timeout(
        Duration::from_secs(config.enhance_timeout_secs),
        provider.chat(&messages, Some(&options)),
    )
    .await
    {
        Ok(Ok(resp)) => {
            debug!(
                "Enhancement response: {} in / {} out tokens",
                resp.prompt_tokens, resp.completion_tokens
            );
            Ok(resp.content)
        }
        Ok(Err(e)) => Err(format!("{e}")),
        Err(_) => Err(format!(
            "timed out after {}s",
            config.enhance_timeout_secs
        )),
    };

    let outcome = apply_enhancement(markdown, response);
    if let Some(ref w) = outcome.warning {
        warn!("{w}");
    }
    outcome
}

/// Decide what to do with an enhancement response.
///
/// Pure: success with a non-empty body replaces the Markdown (after
/// stripping any outer fence the model added); everything else keeps the
/// original and yields one warning.
pub fn apply_enhancement(original: &str, response: Result<String, String>) -> EnhanceOutcome {
    match response {
        Ok(content) if !content.trim().is_empty() => EnhanceOutcome {
            markdown: strip_markdown_fences(&content),
            enhanced: true,
            warning: None,
        },
        Ok(_) => EnhanceOutcome {
            markdown: original.to_string(),
            enhanced: false,
            warning: Some("LLM enhancement failed - empty response".to_string()),
        },
        Err(e) => EnhanceOutcome {
            markdown: original.to_string(),
            enhanced: false,
            warning: Some(format!("LLM enhancement failed - {e}")),
        },
    }
}
