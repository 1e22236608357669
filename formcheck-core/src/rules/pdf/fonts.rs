use super::PagePass;
use crate::config::{FontPolicy, PolicyConfig};
use crate::preprocessors::pdf::{PdfPage, PdfSpan};
use crate::rules::font_family_matches;
use crate::types::ViolationKind;
use crate::verdict::Verdict;

pub struct FontPass<'a> {
    font: &'a FontPolicy,
    headings: &'a [String],
}

impl<'a> FontPass<'a> {
    pub fn new(config: &'a PolicyConfig) -> Self {
        Self {
            font: &config.font,
            headings: &config.headings.required,
        }
    }

    /// Blank spans and required headings may use any size
    fn size_exempt(&self, span: &PdfSpan) -> bool {
        let text = span.text.trim();
        text.is_empty() || self.headings.iter().any(|h| *h == text.to_uppercase())
    }
}

impl PagePass for FontPass<'_> {
    fn name(&self) -> &'static str {
        "FontPass"
    }

    fn apply(&self, pages: &[PdfPage], verdict: &mut Verdict) {
        for (index, page) in pages.iter().enumerate() {
            let page_number = index + 1;
            for block in page.text_blocks() {
                let mut font_flagged = false;
                let mut size_flagged = false;

                for span in block.spans() {
                    if !font_flagged && !font_family_matches(&span.font, &self.font.family) {
                        verdict.add_error(
                            ViolationKind::InvalidFont,
                            format!("На странице {page_number} используется шрифт {}", span.font),
                        );
                        font_flagged = true;
                    }
                    let size_ok = self.size_exempt(span) || self.font.size_in_range(span.size);
                    if !size_flagged && !size_ok {
                        verdict.add_error(
                            ViolationKind::InvalidFontSize,
                            format!(
                                "На странице {page_number} размер шрифта {}pt вне диапазона {}-{}pt.",
                                span.size, self.font.min_size_pt, self.font.max_size_pt
                            ),
                        );
                        size_flagged = true;
                    }
                    if font_flagged && size_flagged {
                        break;
                    }
                }
            }
        }
    }
}
