//! Prompts for the optional LLM enhancement pass.
//!
//! Centralising the prompt here keeps the enhancement adapter focused on
//! call mechanics (timeout, error handling) and makes prompt regressions
//! easy to catch in unit tests without a live provider.

/// System prompt for the enhancement pass.
///
/// The instruction set is fixed: the pass improves formatting only and must
/// never summarise or drop content — the fetch score graded the *extraction*,
/// and a lossy rewrite would invalidate it.
pub const ENHANCEMENT_SYSTEM_PROMPT: &str = r#"You are a document formatting expert. You are given Markdown extracted from a PDF and must improve its formatting while preserving ALL content exactly.

Follow these rules precisely:

1. Fix broken formatting (merged lines, incorrect headers, malformed lists)
2. Format headers to match the document hierarchy (#, ##, ###)
3. Fix table formatting where tables appear malformed
4. Preserve all original text - never summarize or remove content
5. Add **bold** and *italic* only where the source clearly intended emphasis
6. Keep page markers as HTML comments: <!-- Page N -->
7. Return ONLY the improved Markdown, no explanations, no code fences"#;

/// Marker appended when the body exceeds the enhancement character budget.
pub const TRUNCATION_MARKER: &str = "\n\n<!-- Content truncated for LLM processing -->";

/// Build the user message for the enhancement call.
///
/// Bodies longer than `max_chars` are cut at a character boundary and marked
/// so the model (and any human reading the request) knows content is missing.
pub fn enhancement_prompt(doc_name: &str, markdown: &str, max_chars: usize) -> String {
    let body = if markdown.len() > max_chars {
        let mut cut = max_chars;
        while !markdown.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}{}", &markdown[..cut], TRUNCATION_MARKER)
    } else {
        markdown.to_string()
    };

    format!("Source PDF: {doc_name}\n\nExtracted content:\n{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_document_and_embeds_body() {
        let p = enhancement_prompt("report.pdf", "# Title\n\nBody", 1000);
        assert!(p.contains("Source PDF: report.pdf"));
        assert!(p.contains("# Title"));
        assert!(!p.contains(TRUNCATION_MARKER));
    }

    #[test]
    fn long_body_truncated_with_marker() {
        let body = "x".repeat(500);
        let p = enhancement_prompt("big.pdf", &body, 100);
        assert!(p.contains(TRUNCATION_MARKER));
        assert!(p.len() < 500);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let body = "é".repeat(100); // 2 bytes each
        let p = enhancement_prompt("utf8.pdf", &body, 101);
        assert!(p.contains(TRUNCATION_MARKER));
    }

    #[test]
    fn system_prompt_forbids_summarisation() {
        assert!(ENHANCEMENT_SYSTEM_PROMPT.contains("never summarize"));
        assert!(ENHANCEMENT_SYSTEM_PROMPT.contains("<!-- Page N -->"));
    }
}
