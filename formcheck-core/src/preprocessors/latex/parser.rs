//! LaTeX source parser
//!
//! Produces a tree of macro / group / environment / text nodes. This is not
//! a TeX engine: macros are never expanded, and how many arguments a macro
//! takes comes from [`argument_shape`]. Unknown macros take none, so their
//! braced arguments appear as ordinary groups and are still walked.

use super::ast::{LatexNode, MacroArgument, MacroNode};
use crate::error::DecodeError;

/// Argument shape of known macros: `[` optional, `{` mandatory, `*` star.
fn argument_shape(name: &str) -> &'static str {
    match name {
        "documentclass" | "usepackage" | "RequirePackage" => "[{",
        "setmainfont" | "setsansfont" | "setmonofont" => "[{",
        "setlength" | "addtolength" | "fontsize" => "{{",
        "color" | "textcolor" | "pagecolor" | "geometry" | "newgeometry" | "setstretch" => "{",
        "chapter" | "section" | "subsection" | "subsubsection" | "paragraph" => "*[{",
        "label" | "ref" | "input" | "include" => "{",
        _ => "",
    }
}

/// Characters that `\` escapes into plain text
const ESCAPED_TEXT: &str = "%{}&$#_";

/// Environments whose body is kept as raw text up to the matching `\end`
const RAW_ENVIRONMENTS: [&str; 6] = [
    "verbatim",
    "verbatim*",
    "lstlisting",
    "comment",
    "minted",
    "Verbatim",
];

/// Parse LaTeX source into a node sequence.
///
/// Stray closers are tolerated: a `}` with no open group is text, a `}` or
/// `\end{x}` inside an environment closes whatever is still open inside it,
/// and an `\end` with no matching `\begin` is kept as text. Groups or
/// environments still open at end of input are a syntax error.
pub fn parse_latex(source: &str) -> Result<Vec<LatexNode>, DecodeError> {
    let mut parser = Parser {
        src: source,
        pos: 0,
        current: Frame::new(FrameKind::Root),
        open: Vec::new(),
    };
    parser.run()
}

#[derive(Debug, PartialEq)]
enum FrameKind {
    Root,
    Group,
    Environment(String),
}

/// A node sequence under construction. Open frames live on an explicit
/// stack so nesting depth never reaches the call stack.
struct Frame {
    kind: FrameKind,
    nodes: Vec<LatexNode>,
    text: String,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            nodes: Vec::new(),
            text: String::new(),
        }
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.nodes.push(LatexNode::Text(std::mem::take(&mut self.text)));
        }
    }

    fn push(&mut self, node: LatexNode) {
        self.flush_text();
        self.nodes.push(node);
    }

    fn into_node(mut self) -> Option<LatexNode> {
        self.flush_text();
        match self.kind {
            FrameKind::Root => None,
            FrameKind::Group => Some(LatexNode::Group(self.nodes)),
            FrameKind::Environment(name) => Some(LatexNode::Environment {
                name,
                children: self.nodes,
            }),
        }
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    current: Frame,
    /// Enclosing frames, outermost first
    open: Vec<Frame>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> DecodeError {
        DecodeError::LatexSyntax {
            position: self.pos,
            message: message.into(),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }

    fn open_frame(&mut self, kind: FrameKind) {
        self.current.flush_text();
        let parent = std::mem::replace(&mut self.current, Frame::new(kind));
        self.open.push(parent);
    }

    fn close_frame(&mut self) {
        let Some(parent) = self.open.pop() else {
            return;
        };
        let child = std::mem::replace(&mut self.current, parent);
        if let Some(node) = child.into_node() {
            self.current.push(node);
        }
    }

    /// Close frames from the innermost outwards until one matching `target`
    /// has been closed. Returns false, closing nothing, when none is open.
    fn close_through(&mut self, target: impl Fn(&FrameKind) -> bool) -> bool {
        let is_open = target(&self.current.kind) || self.open.iter().any(|f| target(&f.kind));
        if !is_open {
            return false;
        }
        loop {
            let matched = target(&self.current.kind);
            if !matched {
                tracing::debug!(position = self.pos, "implicitly closing {:?}", self.current.kind);
            }
            self.close_frame();
            if matched {
                return true;
            }
        }
    }

    fn run(mut self) -> Result<Vec<LatexNode>, DecodeError> {
        while let Some(c) = self.peek() {
            match c {
                '%' => self.skip_comment(),
                '{' => {
                    self.bump();
                    self.open_frame(FrameKind::Group);
                }
                '}' => {
                    self.bump();
                    if !self.close_through(|kind| *kind == FrameKind::Group) {
                        self.current.text.push('}');
                    }
                }
                '\\' => self.control_sequence()?,
                _ => {
                    self.bump();
                    self.current.text.push(c);
                }
            }
        }

        match &self.current.kind {
            FrameKind::Root => {}
            FrameKind::Group => return Err(self.error("unterminated group, missing `}`")),
            FrameKind::Environment(name) => {
                return Err(self.error(format!("missing \\end{{{name}}}")));
            }
        }
        self.current.flush_text();
        Ok(self.current.nodes)
    }

    fn control_sequence(&mut self) -> Result<(), DecodeError> {
        let start = self.pos;
        self.bump();
        let name = self.control_word();
        if name.is_empty() {
            return Err(self.error("dangling `\\` at end of input"));
        }
        if name.len() == 1 && ESCAPED_TEXT.contains(name.as_str()) {
            self.current.text.push_str(&name);
            return Ok(());
        }

        match name.as_str() {
            "begin" => {
                let env = self.environment_name()?;
                if RAW_ENVIRONMENTS.contains(&env.as_str()) {
                    let body = self.raw_until(&format!("\\end{{{env}}}"))?;
                    let children = if body.is_empty() {
                        Vec::new()
                    } else {
                        vec![LatexNode::Text(body.to_string())]
                    };
                    self.current.push(LatexNode::Environment {
                        name: env,
                        children,
                    });
                } else {
                    self.open_frame(FrameKind::Environment(env));
                }
            }
            "end" => {
                let env = self.environment_name()?;
                let closed = self.close_through(|kind| {
                    matches!(kind, FrameKind::Environment(open) if *open == env)
                });
                if !closed {
                    tracing::debug!(position = start, env = %env, "unmatched \\end kept as text");
                    let src = self.src;
                    self.current.text.push_str(&src[start..self.pos]);
                }
            }
            "verb" => {
                if self.peek() == Some('*') {
                    self.bump();
                }
                let Some(delimiter) = self.bump() else {
                    return Err(self.error("\\verb without a delimiter"));
                };
                let body = self.raw_until(&delimiter.to_string())?;
                self.current.text.push_str(body);
            }
            _ => {
                let node = self.macro_arguments(name)?;
                self.current.push(LatexNode::Macro(node));
            }
        }
        Ok(())
    }

    /// Raw source up to `terminator`, which is consumed but not returned
    fn raw_until(&mut self, terminator: &str) -> Result<&'a str, DecodeError> {
        let src = self.src;
        let Some(offset) = src[self.pos..].find(terminator) else {
            return Err(self.error(format!("missing `{terminator}`")));
        };
        let body = &src[self.pos..self.pos + offset];
        self.pos += offset + terminator.len();
        Ok(body)
    }

    /// Name after a backslash: a run of letters, or one other character
    fn control_word(&mut self) -> String {
        let mut name = String::new();
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() => {
                while let Some(c) = self.peek() {
                    if !c.is_ascii_alphabetic() {
                        break;
                    }
                    name.push(c);
                    self.bump();
                }
            }
            Some(c) => {
                name.push(c);
                self.bump();
            }
            None => {}
        }
        name
    }

    fn environment_name(&mut self) -> Result<String, DecodeError> {
        self.skip_whitespace();
        if self.peek() != Some('{') {
            return Err(self.error("expected `{` after \\begin or \\end"));
        }
        let raw = self.balanced('{', '}')?;
        Ok(MacroArgument::new(raw).text().to_string())
    }

    fn macro_arguments(&mut self, name: String) -> Result<MacroNode, DecodeError> {
        let mut node = MacroNode::new(name);
        for shape in argument_shape(&node.name).chars() {
            let checkpoint = self.pos;
            self.skip_whitespace();
            match (shape, self.peek()) {
                ('*', Some('*')) => {
                    self.bump();
                }
                ('[', Some('[')) => {
                    node.optional = Some(MacroArgument::new(self.balanced('[', ']')?));
                }
                ('{', Some('{')) => {
                    node.arguments.push(MacroArgument::new(self.balanced('{', '}')?));
                }
                ('{', Some('\\')) => {
                    let start = self.pos;
                    self.bump();
                    self.control_word();
                    node.arguments.push(MacroArgument::new(&self.src[start..self.pos]));
                }
                ('{', Some(c)) if c != '}' && c != '%' => {
                    self.bump();
                    node.arguments.push(MacroArgument::new(c.to_string()));
                }
                _ => {
                    // Absent optional parts leave the whitespace as text
                    self.pos = checkpoint;
                }
            }
        }
        Ok(node)
    }

    /// Read a delimited span verbatim, nested braces and brackets included
    fn balanced(&mut self, open: char, close: char) -> Result<String, DecodeError> {
        let start = self.pos;
        let mut depth = 0usize;
        let mut braces = 0usize;
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    self.bump();
                }
                '{' if open != '{' => braces += 1,
                '}' if open != '{' => braces = braces.saturating_sub(1),
                c if c == open => depth += 1,
                c if c == close && braces == 0 => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(self.src[start..self.pos].to_string());
                    }
                }
                _ => {}
            }
        }
        Err(DecodeError::LatexSyntax {
            position: start,
            message: format!("unterminated `{open}` argument"),
        })
    }
}
