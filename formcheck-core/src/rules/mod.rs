// Compliance rules - one front-end per document model
// - latex/: LatexRuleDispatcher and the per-macro rule evaluators
// - pdf/: PdfStructuralScanner (font/size, margins/numbering, heading order)
// - docx/: DocModelChecker (style-resolved formatting, numbering fields, contents)
//
// All three report into the same Verdict and share thresholds through PolicyConfig.

pub mod docx;
pub mod latex;
pub mod pdf;

pub use docx::{DocModelChecker, DocxCheckOutcome};
pub use latex::{LatexRuleDispatcher, MacroRule};
pub use pdf::{PagePass, PdfStructuralScanner};

/// Case-insensitive, whitespace-tolerant family match.
///
/// "Times New Roman CE", "TimesNewRomanPS-BoldMT" and "times new roman"
/// all match the family "Times New Roman".
pub fn font_family_matches(font: &str, family: &str) -> bool {
    let squash = |s: &str| -> String {
        s.chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect()
    };
    let family = squash(family);
    !family.is_empty() && squash(font).contains(&family)
}
