use super::MacroRule;
use crate::config::MarginPolicy;
use crate::preprocessors::latex::MacroNode;
use crate::types::{Geometry, ViolationKind};
use crate::units;
use crate::verdict::Verdict;

/// Page margins from `\usepackage[...]{geometry}` or `\geometry{...}`
pub struct GeometryRule<'a> {
    policy: &'a MarginPolicy,
}

impl<'a> GeometryRule<'a> {
    pub fn new(policy: &'a MarginPolicy) -> Self {
        Self { policy }
    }

    /// The option list this macro carries, if it configures geometry at all
    fn options<'n>(&self, node: &'n MacroNode) -> Option<&'n str> {
        match node.name.as_str() {
            "usepackage" => {
                let loads_geometry = node
                    .argument_text(0)?
                    .split(',')
                    .any(|package| package.trim() == "geometry");
                if loads_geometry {
                    node.optional.as_ref().map(|o| o.verbatim.as_str())
                } else {
                    None
                }
            }
            "geometry" | "newgeometry" => node.argument(0).map(|a| a.verbatim.as_str()),
            _ => None,
        }
    }

    fn violations(&self, geometry: &Geometry) -> String {
        let mut message = String::new();
        if !self.policy.right_mm.contains(&(geometry.right as i64)) {
            message.push_str("некорректное правое поле; ");
        }
        if geometry.left as i64 != self.policy.left_mm {
            message.push_str("некорректное левое поле; ");
        }
        if geometry.top as i64 != self.policy.top_mm {
            message.push_str("некорректное верхнее поле; ");
        }
        if geometry.bottom as i64 != self.policy.bottom_mm {
            message.push_str("некорректное нижнее поле; ");
        }
        message
    }
}

/// Parse `key=value` margin options; values are normalized to millimeters
pub fn parse_geometry(options: &str) -> Geometry {
    let mut geometry = Geometry::default();
    let without_comments: String = options
        .lines()
        .map(|line| line.split('%').next().unwrap_or_default())
        .collect::<Vec<_>>()
        .join(" ");

    for option in units::strip_delimiters(&without_comments).split(',') {
        let Some((key, value)) = option.split_once('=') else {
            continue;
        };
        geometry.set(key.trim(), units::to_mm(value));
    }
    geometry
}

impl MacroRule for GeometryRule<'_> {
    fn name(&self) -> &'static str {
        "Geometry"
    }

    fn evaluate(&self, node: &MacroNode, verdict: &mut Verdict) {
        let Some(options) = self.options(node) else {
            return;
        };
        let geometry = parse_geometry(options);
        tracing::debug!(?geometry, "page geometry");

        let message = self.violations(&geometry);
        if message.is_empty() {
            verdict.clear_error(ViolationKind::InvalidPageMargins);
        } else {
            verdict.add_error(ViolationKind::InvalidPageMargins, message);
        }
    }
}
