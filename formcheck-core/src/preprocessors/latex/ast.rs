//! LaTeX syntax tree.
//!
//! Rules only ever ask two things of a node: "are you a macro invocation?"
//! and "do you carry children?". [`SyntaxNode`] exposes exactly that, so the
//! traversal never matches on node kinds and new kinds need no traversal
//! changes.

use serde::{Deserialize, Serialize};

/// Capability view of a syntax-tree node used by the rule dispatcher
pub trait SyntaxNode: Sized {
    fn as_macro(&self) -> Option<&MacroNode>;

    /// Child sequence, if this node has one
    fn children(&self) -> Option<&[Self]>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LatexNode {
    Macro(MacroNode),
    Group(Vec<LatexNode>),
    Environment {
        name: String,
        children: Vec<LatexNode>,
    },
    Text(String),
}

// Children are moved onto a heap stack so dropping a deep tree never recurses
impl Drop for LatexNode {
    fn drop(&mut self) {
        let mut pending = match self {
            LatexNode::Group(children) | LatexNode::Environment { children, .. } => {
                std::mem::take(children)
            }
            _ => return,
        };
        while let Some(mut node) = pending.pop() {
            if let LatexNode::Group(children) | LatexNode::Environment { children, .. } =
                &mut node
            {
                pending.append(children);
            }
        }
    }
}

impl SyntaxNode for LatexNode {
    fn as_macro(&self) -> Option<&MacroNode> {
        match self {
            LatexNode::Macro(node) => Some(node),
            _ => None,
        }
    }

    fn children(&self) -> Option<&[LatexNode]> {
        match self {
            LatexNode::Group(children) | LatexNode::Environment { children, .. } => {
                Some(children)
            }
            _ => None,
        }
    }
}

/// One argument exactly as written, delimiters included (`{times}`, `[12pt,a4paper]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroArgument {
    pub verbatim: String,
}

impl MacroArgument {
    pub fn new(verbatim: impl Into<String>) -> Self {
        Self {
            verbatim: verbatim.into(),
        }
    }

    /// Argument content with one pair of outer `{}` or `[]` removed, trimmed
    pub fn text(&self) -> &str {
        let raw = self.verbatim.trim();
        let inner = raw
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .or_else(|| raw.strip_prefix('[').and_then(|s| s.strip_suffix(']')))
            .unwrap_or(raw);
        inner.trim()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroNode {
    pub name: String,
    /// Mandatory arguments in order
    pub arguments: Vec<MacroArgument>,
    pub optional: Option<MacroArgument>,
}

impl MacroNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            optional: None,
        }
    }

    /// Builder: append a mandatory argument
    pub fn arg(mut self, verbatim: impl Into<String>) -> Self {
        self.arguments.push(MacroArgument::new(verbatim));
        self
    }

    /// Builder: set the optional argument
    pub fn with_optional(mut self, verbatim: impl Into<String>) -> Self {
        self.optional = Some(MacroArgument::new(verbatim));
        self
    }

    pub fn argument(&self, index: usize) -> Option<&MacroArgument> {
        self.arguments.get(index)
    }

    /// Text form of the mandatory argument at `index`
    pub fn argument_text(&self, index: usize) -> Option<&str> {
        self.argument(index).map(MacroArgument::text)
    }

    pub fn optional_text(&self) -> Option<&str> {
        self.optional.as_ref().map(MacroArgument::text)
    }
}
