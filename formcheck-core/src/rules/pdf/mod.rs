//! PDF structural scanner
//!
//! Three independent passes over the rendered page model, each reporting
//! into one verdict that starts empty:
//!
//! - [`FontPass`]: per block, the first span with a foreign font and the
//!   first span with an out-of-range size
//! - [`LayoutPass`]: text blocks crossing the page margins, and a centered
//!   page number at the bottom of every page
//! - [`HeadingOrderPass`]: the required sections open pages in order

pub mod fonts;
pub mod headings;
pub mod layout;

pub use fonts::FontPass;
pub use headings::HeadingOrderPass;
pub use layout::LayoutPass;

use crate::config::PolicyConfig;
use crate::preprocessors::pdf::PdfPage;
use crate::verdict::Verdict;
use std::time::{Duration, Instant};

/// One scan over all pages of a document
pub trait PagePass {
    fn name(&self) -> &'static str;
    fn apply(&self, pages: &[PdfPage], verdict: &mut Verdict);
}

pub struct PdfStructuralScanner<'a> {
    passes: Vec<Box<dyn PagePass + 'a>>,
}

impl<'a> PdfStructuralScanner<'a> {
    pub fn new(config: &'a PolicyConfig) -> Self {
        Self {
            passes: vec![
                Box::new(FontPass::new(config)),
                Box::new(LayoutPass::new(&config.pdf)),
                Box::new(HeadingOrderPass::new(&config.headings)),
            ],
        }
    }

    pub fn scan(&self, pages: &[PdfPage]) -> Verdict {
        self.scan_timed(pages, |_, _| {})
    }

    /// Like [`scan`](Self::scan), reporting how long each pass took
    pub fn scan_timed(
        &self,
        pages: &[PdfPage],
        mut on_pass: impl FnMut(&'static str, Duration),
    ) -> Verdict {
        let mut verdict = Verdict::empty();
        for pass in &self.passes {
            let start = Instant::now();
            pass.apply(pages, &mut verdict);
            on_pass(pass.name(), start.elapsed());
            tracing::debug!(
                pass = pass.name(),
                errors = verdict.errors().len(),
                "pdf pass finished"
            );
        }
        verdict
    }
}
