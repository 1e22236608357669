// Preprocessor abstraction for document decoding
//
// This module defines the boundary between decoding (bytes -> document model)
// and compliance checking (document model -> Verdict). Decoders may fail;
// the rules after this boundary never do.

use crate::error::DecodeError;
use std::path::Path;

/// Preprocessor trait - converts document bytes into a walkable model
///
/// Everything after this point works with the decoded model and is
/// independent of how the file was stored.
pub trait Preprocessor {
    /// The decoded model handed to the rule front-end
    type Output;

    /// Decode raw document bytes
    fn decode(&self, bytes: &[u8]) -> Result<Self::Output, DecodeError>;

    /// Get preprocessor name for logging
    fn name(&self) -> &str;

    /// Check if preprocessor supports the given file type
    fn supports_file_type(&self, path: &Path) -> bool;
}

/// Case-insensitive extension match shared by the preprocessors
pub(crate) fn has_extension(path: &Path, accepted: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| accepted.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
