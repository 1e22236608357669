//! DOCX container reader
//!
//! Streams the XML parts with quick-xml and keeps only the properties the
//! checker needs. Element and attribute names are matched by local name, so
//! namespace prefixes do not matter.

use super::model::{
    Alignment, DocxDocument, HeaderFooterSet, HeaderFooterType, LineSpacing, PageMargins,
    Paragraph, ParagraphProperties, Run, RunProperties, Section, Style, StyleKind, StyleSheet,
};
use crate::error::DecodeError;
use crate::units;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";
const RELS_PART: &str = "word/_rels/document.xml.rels";

/// Decode a DOCX container held in memory
pub fn read_docx(bytes: &[u8]) -> Result<DocxDocument, DecodeError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let document_xml =
        read_part(&mut archive, DOCUMENT_PART)?
            .ok_or_else(|| DecodeError::MissingPart(DOCUMENT_PART.to_string()))?;
    let styles = match read_part(&mut archive, STYLES_PART)? {
        Some(xml) => parse_styles(&xml)?,
        None => StyleSheet::default(),
    };
    let relationships = match read_part(&mut archive, RELS_PART)? {
        Some(xml) => parse_relationships(&xml)?,
        None => HashMap::new(),
    };

    let body = parse_body(&document_xml)?;

    let mut sections = Vec::with_capacity(body.sections.len());
    let mut previous = Section::default();
    for pending in body.sections {
        let mut section = Section {
            margins: pending.margins,
            ..Default::default()
        };
        for reference in &pending.references {
            let Some(target) = relationships.get(&reference.id) else {
                tracing::debug!(id = %reference.id, "header/footer relationship not found");
                continue;
            };
            let part_name = resolve_target(target);
            let Some(markup) = read_part(&mut archive, &part_name)? else {
                tracing::debug!(part = %part_name, "header/footer part missing from container");
                continue;
            };
            let set = if reference.is_header {
                &mut section.headers
            } else {
                &mut section.footers
            };
            set.set(reference.kind, markup);
        }
        section.headers.inherit_from(&previous.headers);
        section.footers.inherit_from(&previous.footers);
        previous = section.clone();
        sections.push(section);
    }

    tracing::debug!(
        paragraphs = body.paragraphs.len(),
        styles = styles.style_count(),
        sections = sections.len(),
        "decoded docx"
    );

    Ok(DocxDocument {
        paragraphs: body.paragraphs,
        styles,
        sections,
    })
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, DecodeError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(Some(content))
}

/// Relationship targets are relative to `word/` unless absolute
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("word/{target}"),
    }
}

// ===== SHARED HELPERS =====

fn attr(e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name.as_bytes())
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn local(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Walk every event of `xml`, handing element opens and closes to `handler`.
/// Empty elements produce an open immediately followed by a close.
fn walk<H: XmlHandler>(xml: &str, part: &str, handler: &mut H) -> Result<(), DecodeError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => handler.open(&local(&e), &e),
            Ok(Event::Empty(e)) => {
                let name = local(&e);
                handler.open(&name, &e);
                handler.close(&name);
            }
            Ok(Event::End(e)) => {
                handler.close(&String::from_utf8_lossy(e.local_name().as_ref()));
            }
            Ok(Event::Text(t)) => {
                if handler.wants_text() {
                    let text = t.unescape().map_err(|e| DecodeError::xml(part, e))?;
                    handler.text(&text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(DecodeError::xml(part, e)),
            _ => {}
        }
    }
    Ok(())
}

trait XmlHandler {
    fn open(&mut self, name: &str, e: &BytesStart<'_>);
    fn close(&mut self, name: &str);
    fn wants_text(&self) -> bool {
        false
    }
    fn text(&mut self, _text: &str) {}
}

fn apply_run_property(props: &mut RunProperties, name: &str, e: &BytesStart<'_>) {
    match name {
        "rFonts" => {
            if let Some(font) = attr(e, "ascii").or_else(|| attr(e, "hAnsi")) {
                props.font = Some(font);
            }
        }
        "sz" => {
            if let Some(size) = attr(e, "val").and_then(|v| v.parse::<f64>().ok()) {
                props.size_pt = Some(units::half_points_to_pt(size) as f32);
            }
        }
        "color" => {
            if let Some(color) = attr(e, "val") {
                props.color = (!color.eq_ignore_ascii_case("auto")).then(|| color.to_uppercase());
            }
        }
        _ => {}
    }
}

fn apply_paragraph_property(props: &mut ParagraphProperties, name: &str, e: &BytesStart<'_>) {
    match name {
        "jc" => {
            if let Some(value) = attr(e, "val") {
                props.alignment = Some(Alignment::from_jc(&value));
            }
        }
        "spacing" => {
            if let Some(line) = attr(e, "line").and_then(|v| v.parse::<f32>().ok()) {
                let rule = attr(e, "lineRule");
                props.line_spacing = Some(LineSpacing::from_spacing(line, rule.as_deref()));
            }
        }
        _ => {}
    }
}

// ===== RELATIONSHIPS =====

#[derive(Default)]
struct RelationshipHandler {
    targets: HashMap<String, String>,
}

impl XmlHandler for RelationshipHandler {
    fn open(&mut self, name: &str, e: &BytesStart<'_>) {
        if name == "Relationship" {
            if let (Some(id), Some(target)) = (attr(e, "Id"), attr(e, "Target")) {
                self.targets.insert(id, target);
            }
        }
    }

    fn close(&mut self, _name: &str) {}
}

fn parse_relationships(xml: &str) -> Result<HashMap<String, String>, DecodeError> {
    let mut handler = RelationshipHandler::default();
    walk(xml, RELS_PART, &mut handler)?;
    Ok(handler.targets)
}

// ===== STYLES =====

#[derive(Default)]
struct StyleHandler {
    sheet: StyleSheet,
    current: Option<Style>,
    in_run_props: bool,
    in_paragraph_props: bool,
    /// Conditional table formatting is not part of the style's own properties
    conditional_depth: usize,
}

impl XmlHandler for StyleHandler {
    fn open(&mut self, name: &str, e: &BytesStart<'_>) {
        if name == "style" {
            self.current = Some(Style {
                id: attr(e, "styleId").unwrap_or_default(),
                kind: attr(e, "type").map(|t| StyleKind::from_type(&t)).unwrap_or_default(),
                is_default: attr(e, "default").is_some_and(|d| d == "1" || d == "true"),
                ..Default::default()
            });
            return;
        }
        if name == "tblStylePr" {
            self.conditional_depth += 1;
        }
        if self.conditional_depth > 0 {
            return;
        }
        let Some(style) = self.current.as_mut() else {
            return;
        };
        match name {
            "name" => style.name = attr(e, "val"),
            "basedOn" => style.based_on = attr(e, "val"),
            "rPr" => self.in_run_props = true,
            "pPr" => self.in_paragraph_props = true,
            _ if self.in_run_props => apply_run_property(&mut style.run, name, e),
            _ if self.in_paragraph_props => apply_paragraph_property(&mut style.paragraph, name, e),
            _ => {}
        }
    }

    fn close(&mut self, name: &str) {
        match name {
            "tblStylePr" => self.conditional_depth = self.conditional_depth.saturating_sub(1),
            "rPr" => self.in_run_props = false,
            "pPr" => self.in_paragraph_props = false,
            "style" => {
                if let Some(style) = self.current.take() {
                    if !style.id.is_empty() {
                        self.sheet.insert(style);
                    }
                }
            }
            _ => {}
        }
    }
}

fn parse_styles(xml: &str) -> Result<StyleSheet, DecodeError> {
    let mut handler = StyleHandler::default();
    walk(xml, STYLES_PART, &mut handler)?;
    Ok(handler.sheet)
}

// ===== DOCUMENT BODY =====

struct PartReference {
    is_header: bool,
    kind: HeaderFooterType,
    id: String,
}

#[derive(Default)]
struct PendingSection {
    margins: PageMargins,
    references: Vec<PartReference>,
}

#[derive(Default)]
struct BodyHandler {
    paragraphs: Vec<Paragraph>,
    sections: Vec<PendingSection>,
    paragraph: Option<Paragraph>,
    run: Option<Run>,
    section: Option<PendingSection>,
    in_paragraph_props: bool,
    in_run_props: bool,
    in_text: bool,
    /// Depth inside tables and text boxes, whose paragraphs are skipped
    skip_depth: usize,
}

fn is_skipped_container(name: &str) -> bool {
    matches!(name, "tbl" | "txbxContent")
}

impl XmlHandler for BodyHandler {
    fn open(&mut self, name: &str, e: &BytesStart<'_>) {
        if is_skipped_container(name) {
            self.skip_depth += 1;
        }
        if self.skip_depth > 0 {
            return;
        }

        if let Some(section) = self.section.as_mut() {
            match name {
                "pgMar" => {
                    let twips = |key: &str| attr(e, key).and_then(|v| v.parse::<f64>().ok());
                    section.margins = PageMargins {
                        left: twips("left"),
                        right: twips("right"),
                        top: twips("top"),
                        bottom: twips("bottom"),
                    };
                }
                "headerReference" | "footerReference" => {
                    if let Some(id) = attr(e, "id") {
                        section.references.push(PartReference {
                            is_header: name == "headerReference",
                            kind: HeaderFooterType::from_attr(attr(e, "type").as_deref()),
                            id,
                        });
                    }
                }
                _ => {}
            }
            return;
        }

        match name {
            "sectPr" => self.section = Some(PendingSection::default()),
            "p" if self.paragraph.is_none() => self.paragraph = Some(Paragraph::default()),
            "pPr" if self.paragraph.is_some() && self.run.is_none() => {
                self.in_paragraph_props = true
            }
            "r" if self.paragraph.is_some() && !self.in_paragraph_props => {
                self.run = Some(Run::default())
            }
            _ => {}
        }

        if let Some(run) = self.run.as_mut() {
            match name {
                "rPr" => self.in_run_props = true,
                "rStyle" if self.in_run_props => run.style_id = attr(e, "val"),
                _ if self.in_run_props => apply_run_property(&mut run.properties, name, e),
                "t" => self.in_text = true,
                "tab" => run.text.push('\t'),
                "br" | "cr" => run.text.push('\n'),
                _ => {}
            }
        } else if self.in_paragraph_props {
            // rPr inside pPr formats the paragraph mark only
            if name == "rPr" {
                self.in_run_props = true;
            } else if !self.in_run_props {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    match name {
                        "pStyle" => paragraph.style_id = attr(e, "val"),
                        _ => apply_paragraph_property(&mut paragraph.properties, name, e),
                    }
                }
            }
        }
    }

    fn close(&mut self, name: &str) {
        if is_skipped_container(name) {
            self.skip_depth = self.skip_depth.saturating_sub(1);
            return;
        }
        if self.skip_depth > 0 {
            return;
        }
        match name {
            "sectPr" => {
                if let Some(section) = self.section.take() {
                    self.sections.push(section);
                }
            }
            _ if self.section.is_some() => {}
            "t" => self.in_text = false,
            "rPr" => self.in_run_props = false,
            "pPr" => self.in_paragraph_props = false,
            "r" => {
                if let (Some(run), Some(paragraph)) = (self.run.take(), self.paragraph.as_mut()) {
                    paragraph.runs.push(run);
                }
            }
            "p" => {
                if let Some(paragraph) = self.paragraph.take() {
                    self.paragraphs.push(paragraph);
                }
            }
            _ => {}
        }
    }

    fn wants_text(&self) -> bool {
        self.in_text && self.run.is_some() && self.skip_depth == 0
    }

    fn text(&mut self, text: &str) {
        if let Some(run) = self.run.as_mut() {
            run.text.push_str(text);
        }
    }
}

fn parse_body(xml: &str) -> Result<BodyHandler, DecodeError> {
    let mut handler = BodyHandler::default();
    walk(xml, DOCUMENT_PART, &mut handler)?;
    if handler.sections.is_empty() {
        handler.sections.push(PendingSection::default());
    }
    Ok(handler)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"
            xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <w:body>
    <w:p>
      <w:pPr><w:pStyle w:val="Heading1"/><w:jc w:val="center"/><w:rPr><w:sz w:val="40"/></w:rPr></w:pPr>
      <w:r><w:t>ВВЕДЕНИЕ</w:t></w:r>
    </w:p>
    <w:p>
      <w:pPr><w:jc w:val="both"/><w:spacing w:line="360" w:lineRule="auto"/>
        <w:sectPr><w:pgMar w:left="1701" w:right="850" w:top="1134" w:bottom="1134"/>
          <w:footerReference w:type="default" r:id="rId8"/></w:sectPr>
      </w:pPr>
      <w:r><w:rPr><w:rFonts w:ascii="Arial" w:hAnsi="Arial"/><w:sz w:val="28"/><w:color w:val="FF0000"/></w:rPr>
        <w:t xml:space="preserve">Текст &amp; </w:t><w:tab/><w:t>ещё</w:t></w:r>
    </w:p>
    <w:tbl><w:tr><w:tc><w:p><w:r><w:t>в таблице</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
    <w:sectPr><w:pgMar w:left="1134" w:right="850" w:top="1134" w:bottom="1134"/></w:sectPr>
  </w:body>
</w:document>"#;

    #[test]
    fn test_body_paragraphs_runs_and_sections() {
        let body = parse_body(BODY).unwrap();
        assert_eq!(body.paragraphs.len(), 2);

        let heading = &body.paragraphs[0];
        assert_eq!(heading.style_id.as_deref(), Some("Heading1"));
        assert_eq!(heading.properties.alignment, Some(Alignment::Center));
        // Paragraph-mark size is not a run size
        assert_eq!(heading.runs[0].properties.size_pt, None);

        let text = &body.paragraphs[1];
        assert_eq!(text.text(), "Текст & \tещё");
        assert_eq!(text.properties.line_spacing, Some(LineSpacing::Multiple(1.5)));
        let run = &text.runs[0].properties;
        assert_eq!(run.font.as_deref(), Some("Arial"));
        assert_eq!(run.size_pt, Some(14.0));
        assert_eq!(run.color.as_deref(), Some("FF0000"));

        assert_eq!(body.sections.len(), 2);
        assert_eq!(body.sections[0].margins.left, Some(1701.0));
        assert_eq!(body.sections[0].references.len(), 1);
        assert_eq!(body.sections[0].references[0].id, "rId8");
        assert_eq!(body.sections[1].margins.left, Some(1134.0));
    }

    #[test]
    fn test_styles() {
        let xml = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri"/></w:rPr></w:rPrDefault></w:docDefaults>
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal">
    <w:name w:val="Normal"/><w:rPr><w:rFonts w:ascii="Times New Roman"/><w:sz w:val="28"/></w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading1">
    <w:name w:val="heading 1"/><w:basedOn w:val="Normal"/>
    <w:pPr><w:jc w:val="center"/></w:pPr><w:rPr><w:color w:val="auto"/></w:rPr>
  </w:style>
  <w:style w:type="table" w:styleId="Grid">
    <w:name w:val="Table Grid"/>
    <w:tblStylePr w:type="firstRow"><w:rPr><w:rFonts w:ascii="Arial"/></w:rPr></w:tblStylePr>
  </w:style>
</w:styles>"#;
        let sheet = parse_styles(xml).unwrap();
        assert_eq!(sheet.style_count(), 3);
        let normal = sheet.normal().unwrap();
        assert_eq!(normal.run.font.as_deref(), Some("Times New Roman"));
        assert_eq!(normal.run.size_pt, Some(14.0));
        let heading = sheet.get("Heading1").unwrap();
        assert_eq!(heading.based_on.as_deref(), Some("Normal"));
        assert_eq!(heading.paragraph.alignment, Some(Alignment::Center));
        assert_eq!(heading.run.color, None);
        assert!(heading.name_starts_with(&["Heading"]));
        assert_eq!(sheet.get("Grid").unwrap().run.font, None);
    }

    #[test]
    fn test_relationship_targets() {
        let xml = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId8" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/>
</Relationships>"#;
        let rels = parse_relationships(xml).unwrap();
        assert_eq!(rels.get("rId8").map(String::as_str), Some("footer1.xml"));
        assert_eq!(resolve_target("footer1.xml"), "word/footer1.xml");
        assert_eq!(resolve_target("/word/footer2.xml"), "word/footer2.xml");
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(read_docx(b"plain text"), Err(DecodeError::Container(_))));
    }
}
