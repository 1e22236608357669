use super::MacroRule;
use crate::config::FontPolicy;
use crate::preprocessors::latex::MacroNode;
use crate::types::ViolationKind;
use crate::verdict::Verdict;

/// Font family directives.
///
/// A whitelisted package (`\usepackage{times}`) clears the font warning.
/// `\setmainfont` naming the required family is itself a violation, while
/// `\setmainfont` with any other family is accepted as an engine override
/// and clears the warning.
pub struct FontUsageRule<'a> {
    policy: &'a FontPolicy,
}

impl<'a> FontUsageRule<'a> {
    pub fn new(policy: &'a FontPolicy) -> Self {
        Self { policy }
    }
}

impl MacroRule for FontUsageRule<'_> {
    fn name(&self) -> &'static str {
        "FontUsage"
    }

    fn evaluate(&self, node: &MacroNode, verdict: &mut Verdict) {
        match node.name.as_str() {
            "usepackage" => {
                let Some(packages) = node.argument_text(0) else {
                    return;
                };
                let whitelisted = packages
                    .split(',')
                    .map(str::trim)
                    .any(|package| self.policy.latex_packages.iter().any(|p| p == package));
                if whitelisted {
                    tracing::debug!(packages, "font package found");
                    verdict.clear_warning(ViolationKind::InvalidFont);
                }
            }
            "setmainfont" => {
                let Some(family) = node.argument_text(0) else {
                    return;
                };
                if family == self.policy.family.as_str() {
                    verdict.escalate(
                        ViolationKind::InvalidFont,
                        format!("{family} установлен в качестве шрифта по умолчанию"),
                    );
                } else {
                    verdict.clear_warning(ViolationKind::InvalidFont);
                }
            }
            _ => {}
        }
    }
}

/// `\color` and `\textcolor` must name the required color
pub struct FontColorRule<'a> {
    policy: &'a FontPolicy,
}

impl<'a> FontColorRule<'a> {
    pub fn new(policy: &'a FontPolicy) -> Self {
        Self { policy }
    }
}

impl MacroRule for FontColorRule<'_> {
    fn name(&self) -> &'static str {
        "FontColor"
    }

    fn evaluate(&self, node: &MacroNode, verdict: &mut Verdict) {
        if node.name != "color" && node.name != "textcolor" {
            return;
        }
        let Some(color) = node.argument_text(0) else {
            return;
        };
        if color != self.policy.color {
            verdict.add_error(
                ViolationKind::InvalidFontColor,
                format!("использован {color} цвет для текста"),
            );
        }
    }
}

/// Base size selected through `\documentclass` options
pub struct FontSizeRule<'a> {
    policy: &'a FontPolicy,
}

impl<'a> FontSizeRule<'a> {
    pub fn new(policy: &'a FontPolicy) -> Self {
        Self { policy }
    }
}

impl MacroRule for FontSizeRule<'_> {
    fn name(&self) -> &'static str {
        "FontSize"
    }

    fn evaluate(&self, node: &MacroNode, verdict: &mut Verdict) {
        if node.name != "documentclass" {
            return;
        }
        let Some(options) = node.optional_text() else {
            return;
        };
        if self
            .policy
            .latex_size_options
            .iter()
            .any(|size| options.contains(size.as_str()))
        {
            verdict.clear_error(ViolationKind::InvalidFontSize);
        }
    }
}
