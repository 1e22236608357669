use super::PagePass;
use crate::config::PdfLayoutPolicy;
use crate::preprocessors::pdf::{PdfBlock, PdfPage};
use crate::types::{PageGeometryBounds, ViolationKind};
use crate::verdict::Verdict;
use regex::Regex;
use std::sync::LazyLock;

static PAGE_NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+$").unwrap());

/// Margins and page numbering.
///
/// Both checks report once per document: the first offending page wins and
/// the scan stops as soon as both errors are recorded, so later pages are
/// never inspected.
pub struct LayoutPass<'a> {
    policy: &'a PdfLayoutPolicy,
}

impl<'a> LayoutPass<'a> {
    pub fn new(policy: &'a PdfLayoutPolicy) -> Self {
        Self { policy }
    }

    pub fn bounds(&self, page: &PdfPage) -> PageGeometryBounds {
        PageGeometryBounds {
            left: self.policy.left_bound_pt,
            right: page.width - self.policy.right_bound_pt,
            top: self.policy.top_bound_pt,
            bottom: page.height - self.policy.bottom_bound_pt,
        }
    }

    fn in_numbering_region(&self, page: &PdfPage, block: &PdfBlock) -> bool {
        (block.bbox.y1 - page.height).abs() < self.policy.numbering_region_pt
    }

    fn is_centered(&self, page: &PdfPage, block: &PdfBlock) -> bool {
        (block.bbox.center_x() - page.width / 2.0).abs() < self.policy.numbering_center_tolerance_pt
    }
}

/// Strict integer literal, positive values only
pub fn parse_page_number(text: &str) -> Option<usize> {
    let text = text.trim();
    if !PAGE_NUMBER_REGEX.is_match(text) {
        return None;
    }
    let number = text.parse::<i64>().ok()?;
    usize::try_from(number).ok().filter(|n| *n > 0)
}

impl PagePass for LayoutPass<'_> {
    fn name(&self) -> &'static str {
        "LayoutPass"
    }

    fn apply(&self, pages: &[PdfPage], verdict: &mut Verdict) {
        let mut margins_flagged = verdict.has_error(ViolationKind::InvalidPageMargins);
        let mut numbering_flagged = verdict.has_error(ViolationKind::InvalidPageNumbering);

        for (index, page) in pages.iter().enumerate() {
            if margins_flagged && numbering_flagged {
                tracing::debug!(page = index + 1, "margins and numbering already failed, stopping");
                break;
            }
            let page_number = index + 1;
            let bounds = self.bounds(page);
            let mut numbered = false;

            for block in page.text_blocks() {
                let text = block.text();

                if !margins_flagged
                    && text.chars().count() > self.policy.margin_check_min_chars
                    && bounds.is_exceeded_by(&block.bbox)
                {
                    verdict.add_error(
                        ViolationKind::InvalidPageMargins,
                        format!("некорректные поля на странице {page_number}"),
                    );
                    margins_flagged = true;
                }

                if !numbered
                    && self.in_numbering_region(page, block)
                    && self.is_centered(page, block)
                    && parse_page_number(&text) == Some(page_number)
                {
                    numbered = true;
                }
            }

            if !numbered && !numbering_flagged {
                verdict.add_error(
                    ViolationKind::InvalidPageNumbering,
                    "некорректная нумерация страниц",
                );
                numbering_flagged = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn scan(pages: &[PdfPage]) -> Verdict {
        let policy = PdfLayoutPolicy::default();
        let mut verdict = Verdict::empty();
        LayoutPass::new(&policy).apply(pages, &mut verdict);
        verdict
    }

    fn long_text() -> String {
        "Текст ".repeat(30)
    }

    #[test]
    fn test_centered_page_number_confirms_numbering() {
        let verdict = scan(&[page(vec![page_number(1)])]);
        assert!(!verdict.has_error(ViolationKind::InvalidPageNumbering));

        let verdict = scan(&[page(vec![])]);
        assert!(verdict.has_error(ViolationKind::InvalidPageNumbering));
    }

    #[test]
    fn test_number_must_match_page_and_be_centered() {
        // Wrong number
        let verdict = scan(&[page(vec![page_number(2)])]);
        assert!(verdict.has_error(ViolationKind::InvalidPageNumbering));

        // Right corner
        let verdict = scan(&[page(vec![text_block([540.0, 800.0, 550.0, 815.0], "1")])]);
        assert!(verdict.has_error(ViolationKind::InvalidPageNumbering));

        // Top of page
        let verdict = scan(&[page(vec![text_block([290.0, 20.0, 305.0, 35.0], "1")])]);
        assert!(verdict.has_error(ViolationKind::InvalidPageNumbering));
    }

    #[test]
    fn test_strict_page_number_literal() {
        assert_eq!(parse_page_number(" 12 "), Some(12));
        assert_eq!(parse_page_number("+3"), Some(3));
        assert_eq!(parse_page_number("0"), None);
        assert_eq!(parse_page_number("-1"), None);
        assert_eq!(parse_page_number("12a"), None);
        assert_eq!(parse_page_number("- 12 -"), None);
        assert_eq!(parse_page_number("IV"), None);
    }

    #[test]
    fn test_margins_only_checked_for_long_blocks() {
        let short = text_block([10.0, 100.0, 500.0, 120.0], "short");
        let verdict = scan(&[page(vec![short, page_number(1)])]);
        assert!(!verdict.has_error(ViolationKind::InvalidPageMargins));

        let long = text_block([10.0, 100.0, 500.0, 300.0], &long_text());
        let verdict = scan(&[page(vec![long, page_number(1)])]);
        assert_eq!(
            verdict.error(ViolationKind::InvalidPageMargins),
            Some("некорректные поля на странице 1")
        );
    }

    #[test]
    fn test_first_offending_page_wins() {
        let pages = vec![
            page(vec![page_number(1)]),
            page(vec![text_block([90.0, 100.0, 580.0, 300.0], &long_text()), page_number(2)]),
            page(vec![text_block([10.0, 100.0, 500.0, 300.0], &long_text()), page_number(3)]),
        ];
        let verdict = scan(&pages);
        assert_eq!(
            verdict.error(ViolationKind::InvalidPageMargins),
            Some("некорректные поля на странице 2")
        );
        assert!(!verdict.has_error(ViolationKind::InvalidPageNumbering));
    }

    #[test]
    fn test_scan_stops_once_both_errors_recorded() {
        let pages = vec![
            page(vec![text_block([10.0, 100.0, 500.0, 300.0], &long_text())]),
            page(vec![text_block([10.0, 100.0, 500.0, 300.0], &long_text())]),
        ];
        let verdict = scan(&pages);
        assert_eq!(
            verdict.error(ViolationKind::InvalidPageMargins),
            Some("некорректные поля на странице 1")
        );
        assert!(verdict.has_error(ViolationKind::InvalidPageNumbering));
    }
}
