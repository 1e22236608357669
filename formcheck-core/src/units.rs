//! Length normalization.
//!
//! Everything geometric is compared in millimeters. Literals that cannot be
//! read normalize to `0.0`, which never equals a valid policy target, so a
//! garbled length always fails the comparison downstream.

use regex::Regex;
use std::sync::LazyLock;

static LENGTH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([0-9.]+)\s*([a-zA-Z]+)\s*$").unwrap());

pub const MM_PER_CM: f64 = 10.0;
pub const MM_PER_INCH: f64 = 25.4;
pub const MM_PER_POINT: f64 = 0.3514598;

const TWIPS_PER_INCH: f64 = 1440.0;

/// Convert a length literal such as `12.5mm`, `{1.25cm}` or `[0.5in]` to millimeters.
///
/// Surrounding braces and brackets are stripped. Recognized units are `mm`,
/// `cm`, `in` and `pt`; anything else yields `0.0`.
pub fn to_mm(literal: &str) -> f64 {
    let stripped = strip_delimiters(literal);
    let Some(caps) = LENGTH_REGEX.captures(stripped) else {
        return 0.0;
    };
    let Ok(number) = caps[1].parse::<f64>() else {
        return 0.0;
    };
    match caps[2].to_lowercase().as_str() {
        "mm" => number,
        "cm" => number * MM_PER_CM,
        "in" => number * MM_PER_INCH,
        "pt" => number * MM_PER_POINT,
        _ => 0.0,
    }
}

/// Strip any run of leading `{`/`[` and trailing `}`/`]`, plus whitespace
pub fn strip_delimiters(literal: &str) -> &str {
    literal
        .trim()
        .trim_start_matches(|c: char| c == '{' || c == '[' || c.is_whitespace())
        .trim_end_matches(|c: char| c == '}' || c == ']' || c.is_whitespace())
}

/// Word stores page margins in twentieths of a point
pub fn twips_to_mm(twips: f64) -> f64 {
    twips / TWIPS_PER_INCH * MM_PER_INCH
}

/// Word run sizes (`w:sz`) are half-points
pub fn half_points_to_pt(half_points: f64) -> f64 {
    half_points / 2.0
}
