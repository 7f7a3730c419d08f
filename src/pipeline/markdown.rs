//! Deterministic Markdown formatting rules for extracted page content.
//!
//! PDF text layers carry no semantic markup — headings, bullets, and
//! numbered sections all come out as flat lines. These rules recover the
//! obvious cases with cheap, testable heuristics and convert extracted table
//! grids to GFM pipe format. Every function here is pure (`&str → String`),
//! which is what lets the report renderer promise byte-identical output for
//! identical inputs.

use once_cell::sync::Lazy;
use regex::Regex;

/// A table as raw rows of cell strings, as produced by a page analyzer.
pub type Table = Vec<Vec<String>>;

// ── Text structure heuristics ─────────────────────────────────────────────

static RE_NUMBERED_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\d.]+\s+[A-Z]").unwrap());
static RE_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[•\-\*]\s+(.*)$").unwrap());
static RE_NUMBERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s+").unwrap());

/// Format raw extracted text with basic structure detection.
///
/// Rules, per line:
/// - short ALL-CAPS lines become `##` headings (title-cased)
/// - numbered section headers (`2.1 Results`) become `###` headings
/// - bullet glyphs (`•`, `-`, `*`) become `-` list items
/// - numbered list items pass through unchanged
pub fn format_text(text: &str) -> String {
    let mut formatted = Vec::new();

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() {
            formatted.push(String::new());
            continue;
        }

        if stripped.len() < 80 && is_all_caps(stripped) {
            formatted.push(format!("## {}", title_case(stripped)));
        } else if RE_NUMBERED_HEADER.is_match(stripped) {
            formatted.push(format!("### {stripped}"));
        } else if let Some(caps) = RE_BULLET.captures(stripped) {
            formatted.push(format!("- {}", caps[1].trim()));
        } else if RE_NUMBERED_ITEM.is_match(stripped) {
            formatted.push(stripped.to_string());
        } else {
            formatted.push(stripped.to_string());
        }
    }

    formatted.join("\n")
}

/// True when the line contains letters and every letter is uppercase.
fn is_all_caps(s: &str) -> bool {
    let mut has_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            has_alpha = true;
            if !c.is_uppercase() {
                return false;
            }
        }
    }
    has_alpha
}

/// Title-case a detected heading (first letter of each word uppercase).
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ── Tables ────────────────────────────────────────────────────────────────

static RE_CELL_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\t+| {2,}").unwrap());

/// Detect delimiter-aligned table blocks in extracted text.
///
/// A table row is a line whose cells are separated by tabs or runs of two or
/// more spaces; two or more consecutive such rows form a table. This is a
/// coarse stand-in for a real layout-aware table extractor and deliberately
/// errs on the side of missing tables rather than inventing them.
pub fn detect_tables(text: &str) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut current: Table = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        let cells: Vec<String> = RE_CELL_SPLIT
            .split(trimmed)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        if cells.len() >= 2 {
            current.push(cells);
        } else {
            if current.len() >= 2 {
                tables.push(std::mem::take(&mut current));
            }
            current.clear();
        }
    }
    if current.len() >= 2 {
        tables.push(current);
    }

    tables
}

/// Convert an extracted table to a GFM pipe table.
///
/// Rows are normalised to the widest row; the first row is treated as the
/// header. Returns an empty string for empty input.
pub fn table_to_markdown(table: &Table) -> String {
    let cleaned: Vec<Vec<String>> = table
        .iter()
        .filter(|row| !row.is_empty())
        .map(|row| row.iter().map(|cell| cell.trim().to_string()).collect())
        .collect();

    if cleaned.is_empty() {
        return String::new();
    }

    let max_cols = cleaned.iter().map(|r| r.len()).max().unwrap_or(0);
    let pad = |row: &[String]| -> Vec<String> {
        let mut r = row.to_vec();
        r.resize(max_cols, String::new());
        r
    };

    let mut lines = Vec::with_capacity(cleaned.len() + 1);
    lines.push(format!("| {} |", pad(&cleaned[0]).join(" | ")));
    lines.push(format!("| {} |", vec!["---"; max_cols].join(" | ")));
    for row in &cleaned[1..] {
        lines.push(format!("| {} |", pad(row).join(" | ")));
    }

    lines.join("\n")
}

// ── Page assembly helpers ─────────────────────────────────────────────────

/// Markdown image reference named by page and sequence index.
pub fn image_reference(page_num: usize, seq: usize) -> String {
    format!("![Image {page_num}.{seq}](image_p{page_num}_{seq}.png)")
}

/// Strip an outer ```` ```markdown ```` fence from an LLM response.
///
/// Models occasionally wrap their whole answer in a fence despite the prompt
/// saying not to.
static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:markdown)?\n(.*)\n```\s*$").unwrap());

pub fn strip_markdown_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

/// Ensure the document ends with exactly one newline.
pub fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{trimmed}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_caps_line_becomes_heading() {
        let out = format_text("EXECUTIVE SUMMARY\nbody text");
        assert!(out.starts_with("## Executive Summary"));
        assert!(out.contains("body text"));
    }

    #[test]
    fn long_caps_line_left_alone() {
        let line = "A".repeat(90);
        let out = format_text(&line);
        assert!(!out.starts_with("##"));
    }

    #[test]
    fn numbered_section_becomes_subheading() {
        let out = format_text("2.1 Results");
        assert_eq!(out, "### 2.1 Results");
    }

    #[test]
    fn bullets_normalised() {
        assert_eq!(format_text("• first"), "- first");
        assert_eq!(format_text("* second"), "- second");
        assert_eq!(format_text("- third"), "- third");
    }

    #[test]
    fn numbered_items_pass_through() {
        assert_eq!(format_text("1. step one"), "1. step one");
    }

    #[test]
    fn blank_lines_preserved() {
        assert_eq!(format_text("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn detect_tables_finds_aligned_block() {
        let text = "Intro line\nName    Qty    Price\nWidget  2      4.50\nGadget  1      9.99\nOutro";
        let tables = detect_tables(text);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].len(), 3);
        assert_eq!(tables[0][0], vec!["Name", "Qty", "Price"]);
    }

    #[test]
    fn detect_tables_ignores_single_row() {
        let tables = detect_tables("Name    Qty\nplain prose follows");
        assert!(tables.is_empty());
    }

    #[test]
    fn detect_tables_splits_on_tabs() {
        let tables = detect_tables("a\tb\tc\n1\t2\t3");
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0][1], vec!["1", "2", "3"]);
    }

    #[test]
    fn table_to_markdown_shapes_gfm() {
        let table = vec![
            vec!["Name".to_string(), "Qty".to_string()],
            vec!["Widget".to_string(), "2".to_string()],
        ];
        let md = table_to_markdown(&table);
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines[0], "| Name | Qty |");
        assert_eq!(lines[1], "| --- | --- |");
        assert_eq!(lines[2], "| Widget | 2 |");
    }

    #[test]
    fn table_to_markdown_pads_ragged_rows() {
        let table = vec![
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
            vec!["1".to_string()],
        ];
        let md = table_to_markdown(&table);
        assert!(md.lines().last().unwrap().matches('|').count() == 4);
    }

    #[test]
    fn table_to_markdown_empty_input() {
        assert_eq!(table_to_markdown(&Vec::new()), "");
    }

    #[test]
    fn image_reference_names_by_page_and_seq() {
        assert_eq!(image_reference(7, 2), "![Image 7.2](image_p7_2.png)");
    }

    #[test]
    fn strip_fences_unwraps_response() {
        assert_eq!(
            strip_markdown_fences("```markdown\n# Hello\nWorld\n```"),
            "# Hello\nWorld"
        );
        assert_eq!(strip_markdown_fences("# Hello"), "# Hello");
    }

    #[test]
    fn ensure_final_newline_normalises() {
        assert_eq!(ensure_final_newline("hello"), "hello\n");
        assert_eq!(ensure_final_newline("hello\n\n\n"), "hello\n");
        assert_eq!(ensure_final_newline(""), "\n");
    }
}
