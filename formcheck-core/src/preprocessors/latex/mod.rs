//! LaTeX Preprocessor
//!
//! Decodes `.tex` source into the syntax tree the LaTeX rule dispatcher walks.

pub mod ast;
pub mod parser;

use crate::error::DecodeError;
use crate::preprocessors::preprocessor::{has_extension, Preprocessor};
use std::path::Path;

pub use ast::{LatexNode, MacroArgument, MacroNode, SyntaxNode};
pub use parser::parse_latex;

#[derive(Debug, Default)]
pub struct LatexPreprocessor;

impl LatexPreprocessor {
    pub fn new() -> Self {
        Self
    }
}

impl Preprocessor for LatexPreprocessor {
    type Output = Vec<LatexNode>;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Output, DecodeError> {
        let source = String::from_utf8_lossy(bytes);
        let nodes = parse_latex(&source)?;
        tracing::debug!(top_level_nodes = nodes.len(), "parsed LaTeX source");
        Ok(nodes)
    }

    fn name(&self) -> &str {
        "LatexPreprocessor"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        has_extension(path, &["tex", "ltx"])
    }
}
