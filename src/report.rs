//! Report renderer: the "Extraction Report" section appended to the output.
//!
//! Pure string formatting — no external calls, no clock, no randomness —
//! so identical inputs produce byte-identical output and golden tests stay
//! stable. Warnings are rendered verbatim so the grade's provenance is
//! auditable from the document alone.
//!
//! Display rounding happens here and only here: the overall score prints as
//! an integer, sub-scores with one decimal. The exact values stay in
//! [`crate::score::FetchScore`].

use crate::metrics::ExtractionMetrics;
use crate::pipeline::markdown::ensure_final_newline;
use crate::score::FetchScore;

fn yes_no(v: bool) -> &'static str {
    if v {
        "Yes"
    } else {
        "No"
    }
}

/// Render the report section for a scored extraction.
pub fn render_report(score: &FetchScore, metrics: &ExtractionMetrics) -> String {
    let mut out = String::new();

    out.push_str("## Extraction Report\n\n");
    out.push_str("| Metric | Value |\n");
    out.push_str("|--------|-------|\n");
    out.push_str(&format!(
        "| **Overall Score** | {:.0}/100 ({}) |\n",
        score.overall_score, score.grade
    ));
    out.push_str(&format!(
        "| **Text Extraction** | {:.1}/100 |\n",
        score.text_score
    ));
    out.push_str(&format!(
        "| **Structure Preservation** | {:.1}/100 |\n",
        score.structure_score
    ));
    out.push_str(&format!(
        "| **Completeness** | {:.1}/100 |\n",
        score.completeness_score
    ));

    out.push_str("\n### Details\n\n");
    out.push_str(&format!("- **Total Pages**: {}\n", metrics.total_pages));
    out.push_str(&format!("- **Tables Found**: {}\n", metrics.tables_extracted));
    out.push_str(&format!("- **Images Found**: {}\n", metrics.images_extracted));
    out.push_str(&format!(
        "- **OCR Required**: {}\n",
        yes_no(metrics.ocr_pages > 0)
    ));
    out.push_str(&format!(
        "- **LLM Enhanced**: {}\n",
        yes_no(metrics.llm_enhanced)
    ));

    if !score.warnings.is_empty() {
        out.push_str("\n### Warnings\n\n");
        for warning in &score.warnings {
            out.push_str(&format!("- {warning}\n"));
        }
    }

    out
}

/// Append the report section to the document body.
pub fn append_report(body: &str, score: &FetchScore, metrics: &ExtractionMetrics) -> String {
    let mut doc = String::with_capacity(body.len() + 512);
    doc.push_str(body.trim_end());
    doc.push_str("\n\n---\n\n");
    doc.push_str(&render_report(score, metrics));
    ensure_final_newline(&doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ScoreTuning, ScoreWeights};
    use crate::score::calculate_score;

    fn sample() -> (FetchScore, ExtractionMetrics) {
        let metrics = ExtractionMetrics {
            total_pages: 10,
            pages_with_text: 9,
            ocr_pages: 1,
            tables_extracted: 2,
            images_extracted: 3,
            llm_enhanced: false,
            warnings: vec!["page 4: no text or image content found".to_string()],
        };
        let score =
            calculate_score(&metrics, &ScoreWeights::default(), &ScoreTuning::default()).unwrap();
        (score, metrics)
    }

    /// Pull the numeric field back out of a rendered table row.
    fn parse_row(report: &str, label: &str) -> f64 {
        let row = report
            .lines()
            .find(|l| l.contains(label))
            .unwrap_or_else(|| panic!("row '{label}' missing"));
        let value = row
            .split('|')
            .nth(2)
            .unwrap()
            .trim()
            .trim_start_matches("**")
            .split('/')
            .next()
            .unwrap()
            .split(' ')
            .next()
            .unwrap();
        value.parse().unwrap()
    }

    #[test]
    fn report_is_deterministic() {
        let (score, metrics) = sample();
        assert_eq!(
            render_report(&score, &metrics),
            render_report(&score, &metrics)
        );
    }

    #[test]
    fn report_round_trips_scores_within_display_rounding() {
        let (score, metrics) = sample();
        let report = render_report(&score, &metrics);

        assert!((parse_row(&report, "Overall Score") - score.overall_score).abs() <= 0.5);
        assert!((parse_row(&report, "Text Extraction") - score.text_score).abs() <= 0.05);
        assert!(
            (parse_row(&report, "Structure Preservation") - score.structure_score).abs() <= 0.05
        );
        assert!((parse_row(&report, "Completeness") - score.completeness_score).abs() <= 0.05);
    }

    #[test]
    fn report_shows_grade_and_details() {
        let (score, metrics) = sample();
        let report = render_report(&score, &metrics);

        assert!(report.contains(&score.grade.to_string()));
        assert!(report.contains("- **Total Pages**: 10"));
        assert!(report.contains("- **Tables Found**: 2"));
        assert!(report.contains("- **Images Found**: 3"));
        assert!(report.contains("- **OCR Required**: Yes"));
        assert!(report.contains("- **LLM Enhanced**: No"));
    }

    #[test]
    fn warnings_rendered_verbatim() {
        let (score, metrics) = sample();
        let report = render_report(&score, &metrics);
        assert!(report.contains("### Warnings"));
        assert!(report.contains("- page 4: no text or image content found"));
    }

    #[test]
    fn no_warnings_section_when_clean() {
        let metrics = ExtractionMetrics {
            total_pages: 2,
            pages_with_text: 2,
            ..ExtractionMetrics::default()
        };
        let score =
            calculate_score(&metrics, &ScoreWeights::default(), &ScoreTuning::default()).unwrap();
        let report = render_report(&score, &metrics);
        assert!(!report.contains("### Warnings"));
    }

    #[test]
    fn append_separates_body_and_ends_with_newline() {
        let (score, metrics) = sample();
        let doc = append_report("# Body\n\ncontent\n", &score, &metrics);
        assert!(doc.starts_with("# Body"));
        assert!(doc.contains("\n\n---\n\n## Extraction Report"));
        assert!(doc.ends_with('\n'));
        assert!(!doc.ends_with("\n\n"));
    }
}
