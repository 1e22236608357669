//! Word-processor document checker
//!
//! Formatting is read through the style chain (see [`resolve`]), so a run
//! that sets nothing itself is judged by what it inherits. Values nobody
//! sets are not evidence. Alongside the verdict the checker reports one
//! pass/fail flag per check.

pub mod contents;
pub mod formatting;
pub mod numbering;
pub mod resolve;

use crate::config::PolicyConfig;
use crate::preprocessors::docx::DocxDocument;
use crate::verdict::Verdict;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use formatting::FormattingCheck;
pub use resolve::{effective_font, resolve_paragraph_property, resolve_run_property};

pub const CHECK_NAMES: [&str; 8] = [
    "font_check",
    "font_size_check",
    "color_check",
    "line_spacing_check",
    "alignment_check",
    "page_margins_check",
    "font_purity_check",
    "page_numbering_check",
];

/// Per-check summary flags, all passing until a check fails
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFlags(BTreeMap<String, bool>);

impl Default for CheckFlags {
    fn default() -> Self {
        Self(CHECK_NAMES.iter().map(|name| (name.to_string(), true)).collect())
    }
}

impl CheckFlags {
    pub fn fail(&mut self, name: &str) {
        self.0.insert(name.to_string(), false);
    }

    pub fn passed(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(true)
    }

    pub fn into_map(self) -> BTreeMap<String, bool> {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct DocxCheckOutcome {
    pub verdict: Verdict,
    pub checks: CheckFlags,
}

pub struct DocModelChecker<'a> {
    config: &'a PolicyConfig,
}

impl<'a> DocModelChecker<'a> {
    pub fn new(config: &'a PolicyConfig) -> Self {
        Self { config }
    }

    pub fn check(&self, doc: &DocxDocument) -> DocxCheckOutcome {
        let mut verdict = Verdict::empty();
        let mut checks = CheckFlags::default();

        FormattingCheck::new(self.config).apply(doc, &mut verdict, &mut checks);
        numbering::check_page_numbering(doc, &mut verdict, &mut checks);
        if self.config.docx.check_toc_headings {
            contents::check_contents(doc, &mut verdict);
        }

        tracing::debug!(
            errors = verdict.errors().len(),
            warnings = verdict.warnings().len(),
            "docx checks finished"
        );
        DocxCheckOutcome { verdict, checks }
    }
}
