use crate::types::{DocumentFormat, ViolationKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Error and warning ledger for one document.
///
/// Each mapping holds at most one message per [`ViolationKind`]; adding a kind
/// again replaces its message. Rules clear entries when later evidence rebuts
/// an earlier assumption, so the final state reflects the last applicable
/// evidence per rule, not a log of observations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    errors: BTreeMap<ViolationKind, String>,
    warnings: BTreeMap<ViolationKind, String>,
}

impl Verdict {
    /// No violations until one is observed. Used where the rendered document
    /// itself is inspected (PDF, DOCX).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Pre-seeded with the violations a LaTeX source commits unless it
    /// explicitly says otherwise. Rules clear these on compliant evidence.
    pub fn pessimistic() -> Self {
        let mut verdict = Self::empty();
        verdict.add_error(ViolationKind::InvalidPageMargins, "не установлены размеры полей");
        verdict.add_error(ViolationKind::InvalidParagraphIndent, "абзацный отступ не установлен");
        verdict.add_error(ViolationKind::InvalidFontSize, "не установлен корректный размер шрифта");
        verdict.add_warning(ViolationKind::InvalidFont, "не определен основной шрифт документа");
        verdict.add_warning(
            ViolationKind::InvalidLineSpacing,
            "не установлен полуторный межстрочный интервал",
        );
        verdict
    }

    pub fn add_error(&mut self, kind: ViolationKind, message: impl Into<String>) {
        self.errors.insert(kind, message.into());
    }

    pub fn add_warning(&mut self, kind: ViolationKind, message: impl Into<String>) {
        self.warnings.insert(kind, message.into());
    }

    pub fn clear_error(&mut self, kind: ViolationKind) {
        self.errors.remove(&kind);
    }

    pub fn clear_warning(&mut self, kind: ViolationKind) {
        self.warnings.remove(&kind);
    }

    /// Record a hard failure, dropping any soft one of the same kind first
    pub fn escalate(&mut self, kind: ViolationKind, message: impl Into<String>) {
        self.clear_warning(kind);
        self.add_error(kind, message);
    }

    pub fn has_error(&self, kind: ViolationKind) -> bool {
        self.errors.contains_key(&kind)
    }

    pub fn has_warning(&self, kind: ViolationKind) -> bool {
        self.warnings.contains_key(&kind)
    }

    pub fn has_any_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error(&self, kind: ViolationKind) -> Option<&str> {
        self.errors.get(&kind).map(String::as_str)
    }

    pub fn warning(&self, kind: ViolationKind) -> Option<&str> {
        self.warnings.get(&kind).map(String::as_str)
    }

    pub fn errors(&self) -> &BTreeMap<ViolationKind, String> {
        &self.errors
    }

    pub fn warnings(&self) -> &BTreeMap<ViolationKind, String> {
        &self.warnings
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Everything reported about one validated file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub source: String,
    pub format: DocumentFormat,
    /// SHA-256 of the file bytes
    pub document_hash: String,
    /// SHA-256 of the policy the document was checked against
    pub policy_hash: String,
    pub checked_at: DateTime<Utc>,
    pub verdict: Verdict,
    /// Per-check summary flags (DOCX only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<BTreeMap<String, bool>>,
    /// Phase timings, present when profiling was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timings: Option<Vec<PhaseTiming>>,
}

/// Stage of checking one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Read,
    Fingerprint,
    Decode,
    Check,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseTiming {
    pub phase: Phase,
    /// Finer step inside the phase, e.g. a PDF pass name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
    pub millis: f64,
}

impl PhaseTiming {
    pub fn label(&self) -> String {
        let phase = match self.phase {
            Phase::Read => "read",
            Phase::Fingerprint => "fingerprint",
            Phase::Decode => "decode",
            Phase::Check => "check",
        };
        match &self.step {
            Some(step) => format!("{phase} / {step}"),
            None => phase.to_string(),
        }
    }
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        !self.verdict.has_any_error()
    }
}
