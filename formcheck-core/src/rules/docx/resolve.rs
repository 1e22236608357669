//! Effective formatting through the style chain.
//!
//! Run properties: run → run style → paragraph style → its `basedOn`
//! ancestors → Normal. Paragraph properties: paragraph → paragraph style →
//! ancestors → Normal. The first level that sets the property wins; `None`
//! means nothing along the chain set it.

use crate::preprocessors::docx::{DocxDocument, Paragraph, ParagraphProperties, Run, RunProperties};

pub fn resolve_run_property<T>(
    doc: &DocxDocument,
    paragraph: &Paragraph,
    run: &Run,
    get: impl Fn(&RunProperties) -> Option<T>,
) -> Option<T> {
    if let Some(value) = get(&run.properties) {
        return Some(value);
    }
    if let Some(style) = run.style_id.as_deref().and_then(|id| doc.styles.get(id)) {
        if let Some(value) = get(&style.run) {
            return Some(value);
        }
    }
    let lineage = paragraph
        .style_id
        .as_deref()
        .map(|id| doc.styles.lineage(id))
        .unwrap_or_default();
    lineage
        .iter()
        .find_map(|style| get(&style.run))
        .or_else(|| doc.styles.normal().and_then(|normal| get(&normal.run)))
}

pub fn resolve_paragraph_property<T>(
    doc: &DocxDocument,
    paragraph: &Paragraph,
    get: impl Fn(&ParagraphProperties) -> Option<T>,
) -> Option<T> {
    if let Some(value) = get(&paragraph.properties) {
        return Some(value);
    }
    let lineage = paragraph
        .style_id
        .as_deref()
        .map(|id| doc.styles.lineage(id))
        .unwrap_or_default();
    lineage
        .iter()
        .find_map(|style| get(&style.paragraph))
        .or_else(|| doc.styles.normal().and_then(|normal| get(&normal.paragraph)))
}

pub fn effective_font(doc: &DocxDocument, paragraph: &Paragraph, run: &Run) -> Option<String> {
    resolve_run_property(doc, paragraph, run, |p| p.font.clone())
}
