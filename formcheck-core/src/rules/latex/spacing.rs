use super::MacroRule;
use crate::config::ParagraphPolicy;
use crate::preprocessors::latex::MacroNode;
use crate::types::ViolationKind;
use crate::units;
use crate::verdict::Verdict;

const INDENT_EPSILON_MM: f64 = 1e-6;

/// `\setlength{\parindent}{...}` must come out at exactly the required indent
pub struct ParagraphIndentRule<'a> {
    policy: &'a ParagraphPolicy,
}

impl<'a> ParagraphIndentRule<'a> {
    pub fn new(policy: &'a ParagraphPolicy) -> Self {
        Self { policy }
    }
}

impl MacroRule for ParagraphIndentRule<'_> {
    fn name(&self) -> &'static str {
        "ParagraphIndent"
    }

    fn evaluate(&self, node: &MacroNode, verdict: &mut Verdict) {
        if node.name != "setlength" {
            return;
        }
        let (Some(register), Some(value)) = (node.argument_text(0), node.argument_text(1)) else {
            return;
        };
        if !register.contains("parindent") {
            return;
        }

        let indent = units::to_mm(value);
        tracing::debug!(value, indent_mm = indent, "paragraph indent");
        if (indent - self.policy.indent_mm).abs() < INDENT_EPSILON_MM {
            verdict.clear_error(ViolationKind::InvalidParagraphIndent);
        } else {
            verdict.add_error(
                ViolationKind::InvalidParagraphIndent,
                format!("установлен абзацный отступ {value}"),
            );
        }
    }
}

/// `\onehalfspacing`, or `\setstretch` with an accepted literal
pub struct LineSpacingRule<'a> {
    policy: &'a ParagraphPolicy,
}

impl<'a> LineSpacingRule<'a> {
    pub fn new(policy: &'a ParagraphPolicy) -> Self {
        Self { policy }
    }
}

impl MacroRule for LineSpacingRule<'_> {
    fn name(&self) -> &'static str {
        "LineSpacing"
    }

    fn evaluate(&self, node: &MacroNode, verdict: &mut Verdict) {
        match node.name.as_str() {
            "onehalfspacing" => verdict.clear_warning(ViolationKind::InvalidLineSpacing),
            "setstretch" => {
                let accepted = node
                    .argument_text(0)
                    .is_some_and(|stretch| self.policy.stretch_values.iter().any(|v| v == stretch));
                if accepted {
                    verdict.clear_warning(ViolationKind::InvalidLineSpacing);
                }
            }
            _ => {}
        }
    }
}
