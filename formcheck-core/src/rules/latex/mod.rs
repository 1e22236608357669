//! LaTeX rule dispatcher
//!
//! Walks the syntax tree in pre-order and hands every macro invocation to
//! each enabled [`MacroRule`]. The verdict starts pessimistic: rules clear
//! defaults when they see compliant directives and record errors for
//! non-compliant ones. Later evidence always overrides earlier evidence.

pub mod fonts;
pub mod geometry;
pub mod spacing;

use crate::config::PolicyConfig;
use crate::preprocessors::latex::{MacroNode, SyntaxNode};
use crate::verdict::Verdict;

pub use fonts::{FontColorRule, FontSizeRule, FontUsageRule};
pub use geometry::GeometryRule;
pub use spacing::{LineSpacingRule, ParagraphIndentRule};

/// Evaluates one macro invocation against the verdict. Never fails.
pub trait MacroRule {
    fn name(&self) -> &'static str;
    fn evaluate(&self, node: &MacroNode, verdict: &mut Verdict);
}

pub struct LatexRuleDispatcher<'a> {
    rules: Vec<Box<dyn MacroRule + 'a>>,
}

impl<'a> LatexRuleDispatcher<'a> {
    /// Build the rule pipeline named in `config.latex.rules`, in order
    pub fn from_config(config: &'a PolicyConfig) -> Self {
        let mut rules: Vec<Box<dyn MacroRule + 'a>> = Vec::new();
        for rule_config in &config.latex.rules {
            if !rule_config.enabled {
                tracing::debug!(rule = %rule_config.name, "skipping disabled rule");
                continue;
            }
            match build_rule(&rule_config.name, config) {
                Some(rule) => rules.push(rule),
                None => tracing::warn!(rule = %rule_config.name, "unknown LaTeX rule, skipping"),
            }
        }
        Self { rules }
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Walk `nodes` starting from the pessimistic defaults
    pub fn dispatch<N: SyntaxNode>(&self, nodes: &[N]) -> Verdict {
        let mut verdict = Verdict::pessimistic();
        self.apply(nodes, &mut verdict);
        verdict
    }

    /// Walk `nodes` into an existing verdict
    pub fn apply<N: SyntaxNode>(&self, nodes: &[N], verdict: &mut Verdict) {
        // Explicit stack keeps deeply nested sources off the call stack
        let mut stack = vec![nodes.iter()];
        while let Some(level) = stack.last_mut() {
            let Some(node) = level.next() else {
                stack.pop();
                continue;
            };
            if let Some(invocation) = node.as_macro() {
                for rule in &self.rules {
                    rule.evaluate(invocation, verdict);
                }
            }
            if let Some(children) = node.children() {
                stack.push(children.iter());
            }
        }
    }
}

fn build_rule<'a>(name: &str, config: &'a PolicyConfig) -> Option<Box<dyn MacroRule + 'a>> {
    let rule: Box<dyn MacroRule + 'a> = match name {
        "FontUsage" => Box::new(FontUsageRule::new(&config.font)),
        "FontColor" => Box::new(FontColorRule::new(&config.font)),
        "FontSize" => Box::new(FontSizeRule::new(&config.font)),
        "ParagraphIndent" => Box::new(ParagraphIndentRule::new(&config.paragraph)),
        "LineSpacing" => Box::new(LineSpacingRule::new(&config.paragraph)),
        "Geometry" => Box::new(GeometryRule::new(&config.margins)),
        _ => return None,
    };
    Some(rule)
}
