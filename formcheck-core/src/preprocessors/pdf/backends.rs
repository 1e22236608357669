//! PDF backends
//!
//! A backend turns raw PDF bytes into the JSON page dump described in
//! [`super::page_model`]. Decoding PDF content streams is left to an
//! external extractor; the dump format is the contract between the two.

use crate::error::DecodeError;
use std::io::Write;
use std::process::{Command, Stdio};

/// Backend trait for PDF extraction
pub trait PdfBackend: Send + Sync {
    /// Extract PDF bytes to a JSON page dump
    fn extract_page_dump(&self, pdf_bytes: &[u8]) -> Result<String, DecodeError>;

    /// Backend identifier for logging/debugging
    fn name(&self) -> &str;

    /// Check if backend is ready to use
    fn is_healthy(&self) -> bool;
}

/// Runs an external extractor: PDF bytes on stdin, page dump JSON on stdout
#[derive(Debug, Clone)]
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
}

impl CommandBackend {
    /// Build from a program followed by its arguments. `None` when empty.
    pub fn new(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// Build from a whitespace-separated command line
    pub fn from_command_line(line: &str) -> Option<Self> {
        let parts: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        Self::new(&parts)
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl PdfBackend for CommandBackend {
    fn extract_page_dump(&self, pdf_bytes: &[u8]) -> Result<String, DecodeError> {
        let extractor_error = |message: String| DecodeError::Extractor {
            command: self.command_line(),
            message,
        };

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| extractor_error(e.to_string()))?;

        // Feed stdin from another thread so a chatty extractor cannot block on a full stdout pipe
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| extractor_error("stdin not captured".to_string()))?;
        let input = pdf_bytes.to_vec();
        let writer = std::thread::spawn(move || stdin.write_all(&input));

        let output = child
            .wait_with_output()
            .map_err(|e| extractor_error(e.to_string()))?;
        if let Ok(Err(e)) = writer.join() {
            tracing::debug!(error = %e, "extractor closed stdin early");
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(extractor_error(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn name(&self) -> &str {
        "CommandBackend"
    }

    fn is_healthy(&self) -> bool {
        !self.program.is_empty()
    }
}
