pub mod model;
pub mod reader;

pub use model::{
    Alignment, DocxDocument, HeaderFooterSet, HeaderFooterType, LineSpacing, PageMargins,
    Paragraph, ParagraphProperties, Run, RunProperties, Section, Style, StyleKind, StyleSheet,
};
pub use reader::read_docx;

use super::preprocessor::{has_extension, Preprocessor};
use crate::error::DecodeError;
use std::path::Path;

/// Word documents: zip container plus WordprocessingML parts
#[derive(Debug, Default)]
pub struct DocxPreprocessor;

impl DocxPreprocessor {
    pub fn new() -> Self {
        Self
    }
}

impl Preprocessor for DocxPreprocessor {
    type Output = DocxDocument;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Output, DecodeError> {
        read_docx(bytes)
    }

    fn name(&self) -> &str {
        "DocxPreprocessor"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        has_extension(path, &["docx"])
    }
}
