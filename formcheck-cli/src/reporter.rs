//! Console and JSON rendering of validation reports

use anyhow::Result;
use formcheck_core::{PhaseTiming, ValidationReport, ViolationKind};
use std::collections::BTreeMap;
use std::io::IsTerminal;

const RED: &str = "\u{1b}[31m";
const GREEN: &str = "\u{1b}[32m";
const YELLOW: &str = "\u{1b}[33m";
const BOLD: &str = "\u{1b}[1m";
const RESET: &str = "\u{1b}[0m";

const SEPARATOR_WIDTH: usize = 72;

/// Colour only when writing to a terminal and `NO_COLOR` is unset
pub fn use_colour() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

struct Palette {
    enabled: bool,
}

impl Palette {
    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

fn header(out: &mut String, source: &str, palette: &Palette) {
    out.push_str(&"─".repeat(SEPARATOR_WIDTH));
    out.push('\n');
    out.push_str(&format!("📄  {}\n", palette.paint(BOLD, source)));
}

fn section(
    out: &mut String,
    entries: &BTreeMap<ViolationKind, String>,
    title: &str,
    empty: &str,
    colour: &str,
    palette: &Palette,
) {
    if entries.is_empty() {
        out.push_str(&palette.paint(GREEN, empty));
        out.push('\n');
        return;
    }
    out.push_str(title);
    out.push('\n');
    for (index, (kind, message)) in entries.iter().enumerate() {
        let label = palette.paint(colour, &format!("{}. {}", index + 1, kind.title()));
        out.push_str(&format!("   {label}: {message}\n"));
    }
}

fn timings(out: &mut String, timings: &[PhaseTiming]) {
    out.push_str("⏱️  Timings:\n");
    for timing in timings {
        out.push_str(&format!("   {:.<35} {:.1}ms\n", timing.label(), timing.millis));
    }
    let total: f64 = timings.iter().map(|t| t.millis).sum();
    out.push_str(&format!("   {:.<35} {:.1}ms\n", "total", total));
}

/// Human-readable block for one document
pub fn render_text(report: &ValidationReport, colour: bool) -> String {
    let palette = Palette { enabled: colour };
    let mut out = String::new();
    header(&mut out, &report.source, &palette);
    section(
        &mut out,
        report.verdict.errors(),
        "✖  Errors:",
        "✔  Errors not found.",
        RED,
        &palette,
    );
    section(
        &mut out,
        report.verdict.warnings(),
        "⚠  Warnings:",
        "ℹ  Warnings not found.",
        YELLOW,
        &palette,
    );
    if let Some(recorded) = &report.timings {
        timings(&mut out, recorded);
    }
    out
}

/// Block for a document that could not be decoded
pub fn render_failure(source: &str, error: &anyhow::Error, colour: bool) -> String {
    let palette = Palette { enabled: colour };
    let mut out = String::new();
    header(&mut out, source, &palette);
    out.push_str(&palette.paint(RED, &format!("✖  Could not check document: {error:#}")));
    out.push('\n');
    out
}

pub fn render_json(reports: &[ValidationReport]) -> Result<String> {
    Ok(serde_json::to_string_pretty(reports)?)
}
