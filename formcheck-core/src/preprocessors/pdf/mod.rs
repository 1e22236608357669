pub mod backends;
pub mod page_model;

pub use backends::{CommandBackend, PdfBackend};
pub use page_model::{BlockKind, PageDump, PdfBlock, PdfLine, PdfPage, PdfSpan};

use super::preprocessor::{has_extension, Preprocessor};
use crate::error::DecodeError;
use serde::Deserialize;

/// Produces the rendered-page model for the structural scanner.
///
/// Page dumps (`.json`) are read directly. Raw PDF bytes go through the
/// configured [`PdfBackend`].
#[derive(Default)]
pub struct PdfPreprocessor {
    backend: Option<Box<dyn PdfBackend>>,
}

impl PdfPreprocessor {
    pub fn new() -> Self {
        Self { backend: None }
    }

    pub fn with_backend(backend: Box<dyn PdfBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_ref().map(|b| b.name())
    }
}

// Dumps come either wrapped in {"pages": [...]} or as a bare page array
#[derive(Deserialize)]
#[serde(untagged)]
enum DumpShape {
    Wrapped(PageDump),
    Bare(Vec<PdfPage>),
}

/// Parse a JSON page dump
pub fn parse_page_dump(json: &str) -> Result<Vec<PdfPage>, DecodeError> {
    let pages = match serde_json::from_str::<DumpShape>(json) {
        Ok(DumpShape::Wrapped(dump)) => dump.pages,
        Ok(DumpShape::Bare(pages)) => pages,
        // Re-parse against the wrapped shape for a useful error location
        Err(_) => serde_json::from_str::<PageDump>(json)?.pages,
    };
    Ok(pages)
}

fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF")
}

impl Preprocessor for PdfPreprocessor {
    type Output = Vec<PdfPage>;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Output, DecodeError> {
        let json = if looks_like_pdf(bytes) {
            let backend = self.backend.as_ref().ok_or(DecodeError::BackendUnavailable)?;
            if !backend.is_healthy() {
                return Err(DecodeError::BackendUnavailable);
            }
            tracing::debug!(backend = backend.name(), "extracting page dump");
            backend.extract_page_dump(bytes)?
        } else {
            String::from_utf8_lossy(bytes).into_owned()
        };

        let pages = parse_page_dump(&json)?;
        tracing::debug!(pages = pages.len(), "decoded page model");
        Ok(pages)
    }

    fn name(&self) -> &str {
        "PdfPreprocessor"
    }

    fn supports_file_type(&self, path: &std::path::Path) -> bool {
        has_extension(path, &["pdf", "json"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedBackend(&'static str);

    impl PdfBackend for FixedBackend {
        fn extract_page_dump(&self, _pdf_bytes: &[u8]) -> Result<String, DecodeError> {
            Ok(self.0.to_string())
        }

        fn name(&self) -> &str {
            "FixedBackend"
        }

        fn is_healthy(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_json_dump_both_shapes() {
        let preprocessor = PdfPreprocessor::new();
        let wrapped = preprocessor
            .decode(br#"{"pages": [{"width": 595, "height": 842, "blocks": []}]}"#)
            .unwrap();
        let bare = preprocessor
            .decode(br#"[{"width": 595, "height": 842}]"#)
            .unwrap();
        assert_eq!(wrapped.len(), 1);
        assert_eq!(bare.len(), 1);
        assert!(bare[0].blocks.is_empty());
    }

    #[test]
    fn test_pdf_without_backend_is_unavailable() {
        let result = PdfPreprocessor::new().decode(b"%PDF-1.7\n...");
        assert!(matches!(result, Err(DecodeError::BackendUnavailable)));
    }

    #[test]
    fn test_pdf_goes_through_backend() {
        let preprocessor =
            PdfPreprocessor::with_backend(Box::new(FixedBackend(
                r#"{"pages": [{"width": 1, "height": 1}]}"#,
            )));
        assert_eq!(preprocessor.backend_name(), Some("FixedBackend"));
        let pages = preprocessor.decode(b"%PDF-1.7\n...").unwrap();
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_garbage_is_a_page_dump_error() {
        let result = PdfPreprocessor::new().decode(b"not json");
        assert!(matches!(result, Err(DecodeError::PageDump(_))));
    }
}
