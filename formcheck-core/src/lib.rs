// Formcheck Core Library
//
// Checks academic documents (LaTeX source, rendered PDF pages, DOCX) against
// one institutional formatting policy and reports a typed verdict.

pub mod config;
pub mod error;
pub mod preprocessors;
pub mod processor;
pub mod rules;
pub mod types;
pub mod units;
pub mod verdict;

// Re-export main types and functions for easy use
pub use config::{PolicyConfig, PolicySource};
pub use error::DecodeError;
pub use preprocessors::{
    CommandBackend, DocxPreprocessor, LatexPreprocessor, PdfBackend, PdfPreprocessor, Preprocessor,
};
pub use processor::DocumentProcessor;
pub use rules::{DocModelChecker, LatexRuleDispatcher, PdfStructuralScanner};
pub use types::*;
pub use verdict::{Phase, PhaseTiming, ValidationReport, Verdict};
