use super::PagePass;
use crate::config::HeadingPolicy;
use crate::preprocessors::pdf::PdfPage;
use crate::types::ViolationKind;
use crate::verdict::Verdict;

/// Required sections must each open a page, in order.
///
/// A cursor walks the required sequence. The first line of each page's
/// topmost text block either matches the expected heading (advance), names
/// another required heading (out of order, stop) or is anything else
/// (ignored).
pub struct HeadingOrderPass<'a> {
    policy: &'a HeadingPolicy,
}

impl<'a> HeadingOrderPass<'a> {
    pub fn new(policy: &'a HeadingPolicy) -> Self {
        Self { policy }
    }
}

impl PagePass for HeadingOrderPass<'_> {
    fn name(&self) -> &'static str {
        "HeadingOrderPass"
    }

    fn apply(&self, pages: &[PdfPage], verdict: &mut Verdict) {
        let required = &self.policy.required;
        let mut cursor = 0;

        for page in pages {
            if cursor == required.len() {
                break;
            }
            let Some(block) = page.topmost_text_block() else {
                continue;
            };
            let heading = block.first_line_text();

            if heading == required[cursor] {
                tracing::debug!(%heading, "required section found");
                cursor += 1;
            } else if required.contains(&heading) {
                verdict.add_error(
                    ViolationKind::InvalidSectionOrder,
                    format!("секция '{heading}' расположена некорректно"),
                );
                return;
            }
        }

        if cursor < required.len() {
            verdict.add_error(
                ViolationKind::InvalidSectionOrder,
                "не все необходимые секции включены в документ",
            );
        }
    }
}
