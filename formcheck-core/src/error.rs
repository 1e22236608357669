use thiserror::Error;

/// Failures while turning a file into something the rules can walk.
///
/// Rule evaluation itself never fails; these are the only errors the
/// validation pipeline propagates.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid DOCX container: {0}")]
    Container(#[from] zip::result::ZipError),

    #[error("missing part `{0}` in DOCX container")]
    MissingPart(String),

    #[error("malformed XML in `{part}`: {source}")]
    Xml {
        part: String,
        #[source]
        source: quick_xml::Error,
    },

    #[error("malformed page dump: {0}")]
    PageDump(#[from] serde_json::Error),

    #[error("LaTeX syntax error at byte {position}: {message}")]
    LatexSyntax { position: usize, message: String },

    #[error("no PDF backend configured; pass a page dump (.json) or set an extractor command")]
    BackendUnavailable,

    #[error("PDF extractor `{command}` failed: {message}")]
    Extractor { command: String, message: String },

    #[error("unsupported document type: {0}")]
    Unsupported(String),
}

impl DecodeError {
    pub(crate) fn xml(part: &str, source: quick_xml::Error) -> Self {
        DecodeError::Xml {
            part: part.to_string(),
            source,
        }
    }
}
