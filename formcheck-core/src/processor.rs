use crate::config::PolicyConfig;
use crate::error::DecodeError;
use crate::preprocessors::docx::DocxDocument;
use crate::preprocessors::latex::LatexNode;
use crate::preprocessors::{
    CommandBackend, DocxPreprocessor, LatexPreprocessor, PdfBackend, PdfPreprocessor, Preprocessor,
};
use crate::rules::{DocModelChecker, DocxCheckOutcome, LatexRuleDispatcher, PdfStructuralScanner};
use crate::types::DocumentFormat;
use crate::verdict::{Phase, PhaseTiming, ValidationReport, Verdict};
use anyhow::{anyhow, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::{Duration, Instant};

/// Collects phase timings for one document when profiling is enabled
struct PhaseProfiler {
    enabled: bool,
    timings: Vec<PhaseTiming>,
}

impl PhaseProfiler {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    fn measure<F, R>(&mut self, phase: Phase, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }
        let start = Instant::now();
        let result = f();
        self.record(phase, None, start.elapsed());
        result
    }

    fn record(&mut self, phase: Phase, step: Option<&str>, elapsed: Duration) {
        if !self.enabled {
            return;
        }
        tracing::debug!(?phase, step, elapsed_us = elapsed.as_micros() as u64, "phase finished");
        self.timings.push(PhaseTiming {
            phase,
            step: step.map(str::to_string),
            millis: elapsed.as_secs_f64() * 1000.0,
        });
    }

    fn finish(self) -> Option<Vec<PhaseTiming>> {
        self.enabled.then_some(self.timings)
    }
}

/// SHA-256 of the whole document
pub fn calculate_document_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// SHA-256 of the policy serialized as JSON
pub fn calculate_policy_hash(config: &PolicyConfig) -> Result<String> {
    let config_json = serde_json::to_string(config)
        .map_err(|e| anyhow!("Failed to serialize policy for hashing: {}", e))?;
    Ok(calculate_document_hash(config_json.as_bytes()))
}

/// Validates documents of any supported format against one policy
pub struct DocumentProcessor {
    config: PolicyConfig,
    latex: LatexPreprocessor,
    pdf: PdfPreprocessor,
    docx: DocxPreprocessor,
    profiling: bool,
}

impl DocumentProcessor {
    /// The PDF backend comes from `config.pdf.extractor_command` when set
    pub fn new(config: PolicyConfig) -> Self {
        let pdf = match config
            .pdf
            .extractor_command
            .as_deref()
            .and_then(CommandBackend::new)
        {
            Some(backend) => PdfPreprocessor::with_backend(Box::new(backend)),
            None => PdfPreprocessor::new(),
        };
        Self {
            config,
            latex: LatexPreprocessor::new(),
            pdf,
            docx: DocxPreprocessor::new(),
            profiling: false,
        }
    }

    pub fn with_pdf_backend(mut self, backend: Box<dyn PdfBackend>) -> Self {
        self.pdf = PdfPreprocessor::with_backend(backend);
        self
    }

    pub fn with_profiling(mut self, enabled: bool) -> Self {
        self.profiling = enabled;
        self
    }


    pub fn supports_file(&self, path: &Path) -> bool {
        self.latex.supports_file_type(path)
            || self.pdf.supports_file_type(path)
            || self.docx.supports_file_type(path)
    }

    /// Read, fingerprint, decode and check one file
    pub fn validate_file(&self, path: &Path) -> Result<ValidationReport> {
        let format = DocumentFormat::from_path(path)
            .ok_or_else(|| DecodeError::Unsupported(path.display().to_string()))?;
        let mut profiler = PhaseProfiler::new(self.profiling);

        let bytes = profiler.measure(Phase::Read, || std::fs::read(path))?;
        self.validate_bytes_profiled(&path.display().to_string(), format, &bytes, profiler)
    }

    /// Check an in-memory document
    pub fn validate_bytes(
        &self,
        source: &str,
        format: DocumentFormat,
        bytes: &[u8],
    ) -> Result<ValidationReport> {
        let profiler = PhaseProfiler::new(self.profiling);
        self.validate_bytes_profiled(source, format, bytes, profiler)
    }

    fn validate_bytes_profiled(
        &self,
        source: &str,
        format: DocumentFormat,
        bytes: &[u8],
        mut profiler: PhaseProfiler,
    ) -> Result<ValidationReport> {
        let document_hash = profiler.measure(Phase::Fingerprint, || calculate_document_hash(bytes));
        let policy_hash = calculate_policy_hash(&self.config)?;

        let (verdict, checks) = match format {
            DocumentFormat::Latex => {
                let nodes = profiler.measure(Phase::Decode, || self.latex.decode(bytes))?;
                let verdict = profiler.measure(Phase::Check, || self.check_latex(&nodes));
                (verdict, None)
            }
            DocumentFormat::Pdf => {
                let pages = profiler.measure(Phase::Decode, || self.pdf.decode(bytes))?;
                let scanner = PdfStructuralScanner::new(&self.config);
                let verdict = scanner.scan_timed(&pages, |pass, elapsed| {
                    profiler.record(Phase::Check, Some(pass), elapsed)
                });
                (verdict, None)
            }
            DocumentFormat::Docx => {
                let doc = profiler.measure(Phase::Decode, || self.docx.decode(bytes))?;
                let outcome = profiler.measure(Phase::Check, || self.check_docx(&doc));
                (outcome.verdict, Some(outcome.checks.into_map()))
            }
        };

        tracing::info!(
            source,
            %format,
            errors = verdict.errors().len(),
            warnings = verdict.warnings().len(),
            "document validated"
        );

        Ok(ValidationReport {
            source: source.to_string(),
            format,
            document_hash,
            policy_hash,
            checked_at: chrono::Utc::now(),
            verdict,
            checks,
            timings: profiler.finish(),
        })
    }

    pub fn check_latex(&self, nodes: &[LatexNode]) -> Verdict {
        LatexRuleDispatcher::from_config(&self.config).dispatch(nodes)
    }

    pub fn check_docx(&self, doc: &DocxDocument) -> DocxCheckOutcome {
        DocModelChecker::new(&self.config).check(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ViolationKind;

    #[test]
    fn test_document_hash_is_stable() {
        let a = calculate_document_hash(b"\\documentclass{article}");
        let b = calculate_document_hash(b"\\documentclass{article}");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, calculate_document_hash(b"other"));
    }

    #[test]
    fn test_policy_hash_tracks_changes() {
        let default = calculate_policy_hash(&PolicyConfig::default()).unwrap();
        let mut changed = PolicyConfig::default();
        changed.font.max_size_pt = 16.0;
        assert_ne!(default, calculate_policy_hash(&changed).unwrap());
    }

    #[test]
    fn test_validate_latex_bytes() {
        let processor = DocumentProcessor::new(PolicyConfig::default());
        let report = processor
            .validate_bytes("thesis.tex", DocumentFormat::Latex, br"\documentclass[14pt]{report}")
            .unwrap();
        assert_eq!(report.format, DocumentFormat::Latex);
        assert!(!report.verdict.has_error(ViolationKind::InvalidFontSize));
        assert!(report.verdict.has_error(ViolationKind::InvalidPageMargins));
        assert!(!report.passed());
        assert!(report.checks.is_none());
    }

    #[test]
    fn test_latex_syntax_error_propagates() {
        let processor = DocumentProcessor::new(PolicyConfig::default());
        let result = processor.validate_bytes("bad.tex", DocumentFormat::Latex, b"{unclosed");
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DecodeError>(),
            Some(DecodeError::LatexSyntax { .. })
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let processor = DocumentProcessor::new(PolicyConfig::default());
        let err = processor.validate_file(Path::new("notes.odt")).unwrap_err();
        assert!(matches!(err.downcast_ref::<DecodeError>(), Some(DecodeError::Unsupported(_))));
        assert!(!processor.supports_file(Path::new("notes.odt")));
        assert!(processor.supports_file(Path::new("notes.docx")));
    }

    #[test]
    fn test_profiler_records_enabled_phases_only() {
        let mut profiler = PhaseProfiler::new(false);
        assert_eq!(profiler.measure(Phase::Check, || 2 + 2), 4);
        assert!(profiler.finish().is_none());

        let mut profiler = PhaseProfiler::new(true);
        profiler.measure(Phase::Decode, || ());
        profiler.record(Phase::Check, Some("FontPass"), Duration::from_millis(3));
        let timings = profiler.finish().unwrap();
        assert_eq!(timings.len(), 2);
        assert_eq!(timings[1].label(), "check / FontPass");
        assert!((timings[1].millis - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_pdf_timings_are_reported_per_pass() {
        let processor = DocumentProcessor::new(PolicyConfig::default()).with_profiling(true);
        let report = processor
            .validate_bytes("pages.json", DocumentFormat::Pdf, br#"{"pages": []}"#)
            .unwrap();
        let labels: Vec<String> = report.timings.unwrap().iter().map(PhaseTiming::label).collect();
        assert_eq!(
            labels,
            vec![
                "fingerprint",
                "decode",
                "check / FontPass",
                "check / LayoutPass",
                "check / HeadingOrderPass"
            ]
        );

        let plain = DocumentProcessor::new(PolicyConfig::default())
            .validate_bytes("pages.json", DocumentFormat::Pdf, br#"{"pages": []}"#)
            .unwrap();
        assert!(plain.timings.is_none());
    }
}
