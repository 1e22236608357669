use super::resolve::{effective_font, resolve_paragraph_property, resolve_run_property};
use super::CheckFlags;
use crate::config::PolicyConfig;
use crate::preprocessors::docx::{DocxDocument, LineSpacing, Paragraph};
use crate::rules::font_family_matches;
use crate::types::ViolationKind;
use crate::verdict::Verdict;

/// Run and paragraph formatting. Each kind reports its first offender.
pub struct FormattingCheck<'a> {
    config: &'a PolicyConfig,
}

impl<'a> FormattingCheck<'a> {
    pub fn new(config: &'a PolicyConfig) -> Self {
        Self { config }
    }

    pub fn apply(&self, doc: &DocxDocument, verdict: &mut Verdict, flags: &mut CheckFlags) {
        self.check_margins(doc, verdict, flags);
        for paragraph in &doc.paragraphs {
            self.check_runs(doc, paragraph, verdict, flags);
            if !paragraph.text().trim().is_empty() {
                self.check_alignment(doc, paragraph, verdict, flags);
                self.check_line_spacing(doc, paragraph, verdict, flags);
            }
        }
        self.check_font_purity(doc, verdict, flags);
    }

    fn check_margins(&self, doc: &DocxDocument, verdict: &mut Verdict, flags: &mut CheckFlags) {
        let target = self.config.margins.left_mm as f64;
        let tolerance = self.config.margins.tolerance_mm;
        for (index, section) in doc.sections.iter().enumerate() {
            let Some(left) = section.margins.left_mm() else {
                continue;
            };
            if (left - target).abs() > tolerance {
                verdict.add_error(
                    ViolationKind::InvalidPageMargins,
                    format!(
                        "левое поле раздела {} равно {left:.1} мм, требуется {}-{} мм",
                        index + 1,
                        target - tolerance,
                        target + tolerance
                    ),
                );
                flags.fail("page_margins_check");
                return;
            }
        }
    }

    fn is_required_heading(&self, paragraph: &Paragraph) -> bool {
        let text = paragraph.text().trim().to_uppercase();
        self.config.headings.required.iter().any(|h| *h == text)
    }

    fn check_runs(
        &self,
        doc: &DocxDocument,
        paragraph: &Paragraph,
        verdict: &mut Verdict,
        flags: &mut CheckFlags,
    ) {
        let policy = &self.config.font;
        let heading = self.is_required_heading(paragraph);

        for run in paragraph.runs.iter().filter(|run| !run.text.is_empty()) {
            if flags.passed("font_check") {
                if let Some(font) = effective_font(doc, paragraph, run) {
                    if !font_family_matches(&font, &policy.family) {
                        verdict.add_error(
                            ViolationKind::InvalidFont,
                            format!("использован шрифт {font}"),
                        );
                        flags.fail("font_check");
                    }
                }
            }

            if flags.passed("font_size_check") && !heading {
                if let Some(size) = resolve_run_property(doc, paragraph, run, |p| p.size_pt) {
                    if !policy.size_in_range(size) {
                        verdict.add_error(
                            ViolationKind::InvalidFontSize,
                            format!(
                                "размер шрифта {size}pt вне диапазона {}-{}pt",
                                policy.min_size_pt, policy.max_size_pt
                            ),
                        );
                        flags.fail("font_size_check");
                    }
                }
            }

            if flags.passed("color_check") {
                let color = resolve_run_property(doc, paragraph, run, |p| p.color.clone());
                if let Some(color) = color {
                    if !is_black(&color) {
                        verdict.add_error(
                            ViolationKind::InvalidFontColor,
                            format!("использован цвет текста #{color}"),
                        );
                        flags.fail("color_check");
                    }
                }
            }
        }
    }

    fn check_alignment(
        &self,
        doc: &DocxDocument,
        paragraph: &Paragraph,
        verdict: &mut Verdict,
        flags: &mut CheckFlags,
    ) {
        if !flags.passed("alignment_check") {
            return;
        }
        let alignment = resolve_paragraph_property(doc, paragraph, |p| p.alignment.clone());
        let Some(alignment) = alignment else {
            return;
        };
        let allowed = self
            .config
            .paragraph
            .alignments
            .iter()
            .any(|a| a.eq_ignore_ascii_case(alignment.name()));
        if !allowed {
            verdict.add_error(
                ViolationKind::InvalidTextAlignment,
                format!("использовано выравнивание {}", alignment.name()),
            );
            flags.fail("alignment_check");
        }
    }

    fn check_line_spacing(
        &self,
        doc: &DocxDocument,
        paragraph: &Paragraph,
        verdict: &mut Verdict,
        flags: &mut CheckFlags,
    ) {
        if !flags.passed("line_spacing_check") {
            return;
        }
        let Some(spacing) = resolve_paragraph_property(doc, paragraph, |p| p.line_spacing) else {
            return;
        };
        let policy = &self.config.paragraph;
        let message = match spacing {
            LineSpacing::Multiple(m)
                if (m - policy.line_spacing).abs() <= policy.line_spacing_tolerance =>
            {
                return;
            }
            LineSpacing::Multiple(m) => format!("установлен межстрочный интервал {m:.2}"),
            LineSpacing::Exact(pt) => format!("установлен точный межстрочный интервал {pt}pt"),
            LineSpacing::AtLeast(pt) => {
                format!("установлен минимальный межстрочный интервал {pt}pt")
            }
        };
        verdict.add_error(ViolationKind::InvalidLineSpacing, message);
        flags.fail("line_spacing_check");
    }

    /// Stricter document-wide pass: an unresolved font counts against purity
    fn check_font_purity(&self, doc: &DocxDocument, verdict: &mut Verdict, flags: &mut CheckFlags) {
        let family = &self.config.font.family;
        let pure = doc.paragraphs.iter().all(|paragraph| {
            paragraph
                .runs
                .iter()
                .filter(|run| !run.text.is_empty())
                .all(|run| {
                    effective_font(doc, paragraph, run)
                        .is_some_and(|font| font_family_matches(&font, family))
                })
        });
        if !pure {
            flags.fail("font_purity_check");
            if !verdict.has_error(ViolationKind::InvalidFont) {
                verdict.add_warning(
                    ViolationKind::InvalidFont,
                    format!("не для всего текста документа удалось подтвердить шрифт {family}"),
                );
            }
        }
    }
}

fn is_black(color: &str) -> bool {
    color.trim_start_matches('#').eq_ignore_ascii_case("000000")
}
