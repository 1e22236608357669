use super::CheckFlags;
use crate::preprocessors::docx::DocxDocument;
use crate::types::ViolationKind;
use crate::verdict::Verdict;
use regex::Regex;
use std::sync::LazyLock;

// PAGE as the field instruction of a simple field or a complex field
static PAGE_FIELD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:\binstr\s*=\s*"|<w:instrText\b[^>]*>)\s*PAGE\b"#).unwrap()
});

/// True when header or footer markup carries a page-number field
pub fn has_page_field(markup: &str) -> bool {
    PAGE_FIELD_REGEX.is_match(markup)
}

/// Every section needs a page field in at least one header/footer variant
pub fn check_page_numbering(doc: &DocxDocument, verdict: &mut Verdict, flags: &mut CheckFlags) {
    let missing: Vec<String> = doc
        .sections
        .iter()
        .enumerate()
        .filter(|(_, section)| !section.header_footer_markup().any(has_page_field))
        .map(|(index, _)| (index + 1).to_string())
        .collect();

    if !missing.is_empty() {
        verdict.add_error(
            ViolationKind::InvalidPageNumbering,
            format!("нумерация страниц отсутствует в разделах: {}", missing.join(", ")),
        );
        flags.fail("page_numbering_check");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_and_complex_fields() {
        assert!(has_page_field(
            r#"<w:fldSimple w:instr=" PAGE   \* MERGEFORMAT "><w:r><w:t>1</w:t></w:r></w:fldSimple>"#
        ));
        assert!(has_page_field(
            r#"<w:r><w:instrText xml:space="preserve"> PAGE </w:instrText></w:r>"#
        ));
        assert!(has_page_field(r#"<w:instrText>page</w:instrText>"#));
    }

    #[test]
    fn test_other_fields_are_not_page_numbers() {
        assert!(!has_page_field(r#"<w:instrText> NUMPAGES </w:instrText>"#));
        assert!(!has_page_field(r#"<w:instrText> PAGEREF _Toc1 \h </w:instrText>"#));
        assert!(!has_page_field(r#"<w:t>PAGE</w:t>"#));
        assert!(!has_page_field(""));
    }
}
