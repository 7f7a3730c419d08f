//! End-to-end scoring tests over the in-process pipeline.
//!
//! These drive collect → merge → score → report with scripted analyzers so
//! the whole quality-grading path is exercised without a PDF library or a
//! network. The final assertions parse the rendered report back, confirming
//! the numbers a user sees match the score the library computed.

use fetchmd::pipeline::extract::{collect_pages, AnalyzeError, PageAnalyzer, PageContent};
use fetchmd::pipeline::ocr::{OcrEngine, OcrError};
use fetchmd::{append_report, calculate_score, ExtractionConfig, Grade};
use fetchmd::metrics::merge_records;
use image::{DynamicImage, RgbaImage};

/// Scripted analyzer: one entry per page.
struct ScriptedAnalyzer {
    pages: Vec<PageContent>,
}

impl PageAnalyzer for ScriptedAnalyzer {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn analyze_page(&self, index: usize) -> Result<PageContent, AnalyzeError> {
        Ok(self.pages[index].clone())
    }

    fn rasterize_page(&self, _index: usize, _max_pixels: u32) -> Result<DynamicImage, AnalyzeError> {
        Ok(DynamicImage::ImageRgba8(RgbaImage::new(8, 8)))
    }
}

struct ScriptedOcr(&'static str);

impl OcrEngine for ScriptedOcr {
    fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
        Ok(self.0.to_string())
    }
}

fn text_page(text: &str) -> PageContent {
    PageContent {
        text: Some(text.to_string()),
        ..PageContent::default()
    }
}

fn table_page() -> PageContent {
    PageContent {
        text: Some("Quarterly figures".to_string()),
        tables: vec![vec![
            vec!["Quarter".to_string(), "Revenue".to_string()],
            vec!["Q1".to_string(), "14.2".to_string()],
            vec!["Q2".to_string(), "15.9".to_string()],
        ]],
        image_count: 1,
    }
}

#[test]
fn mixed_document_scores_and_reports_consistently() {
    let analyzer = ScriptedAnalyzer {
        pages: vec![
            text_page("INTRODUCTION\n\nThis report covers the year."),
            table_page(),
            PageContent::default(), // scanned page, OCR recovers it
            text_page("Closing remarks."),
        ],
    };
    let ocr = ScriptedOcr("Scanned appendix text.");
    let config = ExtractionConfig::default();

    let records = collect_pages(&analyzer, Some(&ocr), config.max_rendered_pixels, None);
    let (blocks, metrics) = merge_records(analyzer.page_count(), records);

    assert_eq!(metrics.total_pages, 4);
    assert_eq!(metrics.pages_with_text, 3);
    assert_eq!(metrics.ocr_pages, 1);
    assert_eq!(metrics.tables_extracted, 1);
    assert_eq!(metrics.images_extracted, 1);
    assert!(metrics.warnings.is_empty());

    let body = blocks.join("\n\n---\n\n");
    assert!(body.contains("<!-- Page 1 -->"));
    assert!(body.contains("## Introduction"));
    assert!(body.contains("| Quarter | Revenue |"));
    assert!(body.contains("![Image 2.1](image_p2_1.png)"));
    assert!(body.contains("<!-- OCR extracted -->"));

    let score = calculate_score(&metrics, &config.weights, &config.tuning).unwrap();

    // text: (3 + 0.5*1)/4 = 87.5; structure: 50+25+15 = 90; completeness: 100.
    assert!((score.text_score - 87.5).abs() < 1e-9);
    assert!((score.structure_score - 90.0).abs() < 1e-9);
    assert!((score.completeness_score - 100.0).abs() < 1e-9);
    // overall: 0.4*87.5 + 0.3*90 + 0.3*100 = 92.0
    assert!((score.overall_score - 92.0).abs() < 1e-9);
    assert_eq!(score.grade, Grade::A);

    let doc = append_report(&body, &score, &metrics);
    assert!(doc.contains("## Extraction Report"));
    assert!(doc.contains("| **Overall Score** | 92/100 (A - Excellent) |"));
    assert!(doc.contains("| **Text Extraction** | 87.5/100 |"));
    assert!(doc.contains("- **OCR Required**: Yes"));
    assert!(doc.ends_with('\n'));
}

#[test]
fn fully_scanned_document_is_penalised_end_to_end() {
    let analyzer = ScriptedAnalyzer {
        pages: vec![PageContent::default(), PageContent::default()],
    };
    let ocr = ScriptedOcr("recovered text");
    let config = ExtractionConfig::default();

    let records = collect_pages(&analyzer, Some(&ocr), config.max_rendered_pixels, None);
    let (_, metrics) = merge_records(2, records);

    assert_eq!(metrics.pages_with_text, 0);
    assert_eq!(metrics.ocr_pages, 2);

    let score = calculate_score(&metrics, &config.weights, &config.tuning).unwrap();

    // text: 0.5*2/2 = 50; structure: 50; completeness: 100-20 = 80.
    assert!((score.text_score - 50.0).abs() < 1e-9);
    assert!((score.completeness_score - 80.0).abs() < 1e-9);
    assert!(score
        .warnings
        .iter()
        .any(|w| w == "entire document required OCR"));
    assert_eq!(score.grade, Grade::F); // 0.4*50 + 0.3*50 + 0.3*80 = 59
}

#[test]
fn warnings_flow_from_pages_into_the_report() {
    let analyzer = ScriptedAnalyzer {
        pages: vec![text_page("fine"), PageContent::default()],
    };
    let config = ExtractionConfig::default();

    // No OCR engine configured: the empty page yields only a warning.
    let records = collect_pages(&analyzer, None, config.max_rendered_pixels, None);
    let (blocks, metrics) = merge_records(2, records);

    assert_eq!(
        metrics.warnings,
        vec!["page 2: no text or image content found"]
    );

    let score = calculate_score(&metrics, &config.weights, &config.tuning).unwrap();
    assert!((score.completeness_score - 95.0).abs() < 1e-9);

    let doc = append_report(&blocks.join("\n\n---\n\n"), &score, &metrics);
    assert!(doc.contains("### Warnings"));
    assert!(doc.contains("- page 2: no text or image content found"));
}

#[test]
fn scoring_is_deterministic_across_runs() {
    let make = || {
        let analyzer = ScriptedAnalyzer {
            pages: vec![text_page("alpha"), table_page(), PageContent::default()],
        };
        let config = ExtractionConfig::default();
        let records = collect_pages(&analyzer, None, config.max_rendered_pixels, None);
        let (blocks, metrics) = merge_records(3, records);
        let score = calculate_score(&metrics, &config.weights, &config.tuning).unwrap();
        append_report(&blocks.join("\n\n---\n\n"), &score, &metrics)
    };

    assert_eq!(make(), make());
}
