use crate::preprocessors::docx::{DocxDocument, Paragraph, Style};
use crate::types::ViolationKind;
use crate::verdict::Verdict;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

// Dot leader and page number at the end of a contents line
static TOC_LEADER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.{2,}\s*\d+\s*$").unwrap());

const TOC_TITLE_STYLES: [&str; 2] = ["toc heading", "оглавление"];
const TOC_ENTRY_PREFIXES: [&str; 2] = ["toc", "оглавление"];
const HEADING_PREFIXES: [&str; 2] = ["heading", "заголовок"];
const TOC_STOP_WORDS: [&str; 4] = ["ЗАКЛЮЧЕНИЕ", "ПРИЛОЖЕНИЕ", "СПИСОК", "ВВЕДЕНИЕ"];

fn paragraph_style<'d>(doc: &'d DocxDocument, paragraph: &Paragraph) -> Option<&'d Style> {
    paragraph.style_id.as_deref().and_then(|id| doc.styles.get(id))
}

fn style_has_prefix(style: Option<&Style>, prefixes: &[&str]) -> bool {
    style.is_some_and(|s| s.name_starts_with(prefixes))
}

fn clean_entry(line: &str) -> String {
    TOC_LEADER_REGEX
        .replace(line, "")
        .trim_matches(|c: char| c == '.' || c.is_whitespace())
        .to_string()
}

fn normalize(text: &str) -> String {
    text.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Contents entries: styled paragraphs following the contents title
pub fn extract_toc_entries(doc: &DocxDocument) -> Vec<String> {
    let mut entries = Vec::new();
    let mut in_toc = false;

    for paragraph in &doc.paragraphs {
        let style = paragraph_style(doc, paragraph);
        let text = paragraph.text();
        let text = text.trim();

        if !in_toc {
            let title_style = style
                .and_then(|s| s.name.as_deref())
                .is_some_and(|name| {
                    TOC_TITLE_STYLES.contains(&name.trim().to_lowercase().as_str())
                });
            in_toc = title_style || text.to_uppercase().contains("СОДЕРЖАНИЕ");
            continue;
        }

        if style_has_prefix(style, &TOC_ENTRY_PREFIXES) {
            if !text.is_empty() {
                entries.push(clean_entry(text));
            }
            continue;
        }

        if TOC_STOP_WORDS.contains(&text.to_uppercase().as_str()) {
            break;
        }
    }
    entries
}

/// Contents entries that have no heading paragraph with the same text
pub fn missing_headings(doc: &DocxDocument) -> Vec<String> {
    let entries = extract_toc_entries(doc);
    if entries.is_empty() {
        return entries;
    }

    let headings: HashSet<String> = doc
        .paragraphs
        .iter()
        .filter(|p| style_has_prefix(paragraph_style(doc, p), &HEADING_PREFIXES))
        .map(|p| normalize(&p.text()))
        .collect();

    entries
        .into_iter()
        .filter(|entry| !headings.contains(&normalize(entry)))
        .collect()
}

pub fn check_contents(doc: &DocxDocument, verdict: &mut Verdict) {
    let missing = missing_headings(doc);
    if !missing.is_empty() {
        tracing::debug!(count = missing.len(), "contents entries without headings");
        verdict.add_warning(
            ViolationKind::InvalidSectionOrder,
            format!("заголовки из содержания не найдены в тексте: {}", missing.join("; ")),
        );
    }
}
