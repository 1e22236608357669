// All checking happens in formcheck-core
// This CLI only finds inputs and renders reports

// CLI-specific modules
pub mod discovery;
pub mod reporter;

// Re-export core types for convenience
pub use formcheck_core::*;

// Re-export CLI utilities
pub use discovery::collect_inputs;
pub use reporter::{render_failure, render_json, render_text, use_colour};
