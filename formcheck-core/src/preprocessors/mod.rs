//! Document Preprocessors
//!
//! This module turns raw document bytes into the structures the rule
//! front-ends walk. Each format has its own decoder; nothing after this
//! layer touches file contents.
//!
//! ## Architecture
//!
//! ```text
//! Document (TEX, PDF / page dump, DOCX)
//!     ↓
//! [Format-specific Preprocessor]
//!     ↓
//! LaTeX AST | PDF page model | DOCX document model
//!     ↓
//! [Rule front-end]
//!     ↓
//! Verdict
//! ```
//!
//! ## Available Preprocessors
//!
//! - `LatexPreprocessor` - LaTeX source into macro/group/environment/text nodes
//! - `PdfPreprocessor` - JSON page dumps, or PDFs through a `PdfBackend`
//! - `DocxPreprocessor` - Word documents via zip + XML parts

pub mod preprocessor;
pub mod latex;
pub mod pdf;
pub mod docx;

// Re-export main types
pub use preprocessor::Preprocessor;
pub use latex::LatexPreprocessor;
pub use pdf::{CommandBackend, PdfBackend, PdfPreprocessor};
pub use docx::DocxPreprocessor;
