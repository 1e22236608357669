//! End-to-end compliance tests, one group per front-end.
//!
//! LaTeX and page-dump inputs live in `test_fixtures/`. DOCX containers are
//! assembled in memory so each test states exactly which XML it feeds in.

use formcheck_core::{
    DocumentFormat, DocumentProcessor, PolicyConfig, ValidationReport, ViolationKind,
};
use std::path::PathBuf;

// ============================================================================
// Fixture helpers
// ============================================================================

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_fixtures").join(name)
}

fn validate(name: &str) -> ValidationReport {
    DocumentProcessor::new(PolicyConfig::default())
        .validate_file(&fixture(name))
        .unwrap_or_else(|e| panic!("validation of {name} failed: {e:#}"))
}

// ============================================================================
// LaTeX source
// ============================================================================

mod latex {
    use super::*;

    #[test]
    fn compliant_thesis_is_clean() {
        let report = validate("thesis_compliant.tex");
        assert_eq!(report.format, DocumentFormat::Latex);
        assert!(report.verdict.is_clean(), "unexpected: {:?}", report.verdict);
        assert!(report.passed());
        assert_eq!(report.document_hash.len(), 64);
    }

    #[test]
    fn violations_are_reported() {
        let report = validate("thesis_violations.tex");
        let verdict = &report.verdict;

        assert!(verdict.has_error(ViolationKind::InvalidFontSize));
        assert!(verdict.has_error(ViolationKind::InvalidFontColor));
        assert_eq!(
            verdict.error(ViolationKind::InvalidParagraphIndent),
            Some("установлен абзацный отступ 0pt")
        );
        assert_eq!(
            verdict.error(ViolationKind::InvalidPageMargins),
            Some("некорректное правое поле; некорректное левое поле; ")
        );
        // \setmainfont{Times New Roman} is a hard error, not a warning
        assert!(verdict.has_error(ViolationKind::InvalidFont));
        assert!(!verdict.has_warning(ViolationKind::InvalidFont));
        // \setstretch{2} does not rebut the spacing default
        assert!(verdict.has_warning(ViolationKind::InvalidLineSpacing));
        assert_eq!(verdict.errors().len(), 5);
        assert!(!report.passed());
    }

    fn validate_source(body: &str) -> ValidationReport {
        let compliant = std::fs::read_to_string(fixture("thesis_compliant.tex")).unwrap();
        let source = compliant.replace("\\end{document}", &format!("{body}\n\\end{{document}}"));
        DocumentProcessor::new(PolicyConfig::default())
            .validate_bytes("thesis.tex", DocumentFormat::Latex, source.as_bytes())
            .unwrap_or_else(|e| panic!("validation failed: {e:#}"))
    }

    #[test]
    fn code_listings_and_environment_definitions_are_tolerated() {
        let report = validate_source(concat!(
            "\\newenvironment{note}{\\begin{center}}{\\end{center}}\n",
            "\\begin{verbatim}\nif (x) { \\color{red} }}\n\\end{verbatim}\n",
            "\\begin{lstlisting}\n\\setlength{\\parindent}{0pt} {\n\\end{lstlisting}\n",
            "\\begin{comment}\n\\geometry{left=1cm}\n\\end{comment}\n",
            "Пример: \\verb|{| и \\verb+\\color{red}+.\n",
        ));
        assert!(report.verdict.is_clean(), "unexpected: {:?}", report.verdict);
    }

    #[test]
    fn deeply_nested_groups_are_checked() {
        let depth = 100_000;
        let body = format!("{}\\color{{blue}}{}", "{".repeat(depth), "}".repeat(depth));
        let report = validate_source(&body);
        assert_eq!(
            report.verdict.error(ViolationKind::InvalidFontColor),
            Some("использован blue цвет для текста")
        );
    }

    #[test]
    fn unclosed_group_is_a_decode_error() {
        let compliant = std::fs::read_to_string(fixture("thesis_compliant.tex")).unwrap();
        let source = format!("{compliant}\n{{\\color{{black}}\n");
        let result = DocumentProcessor::new(PolicyConfig::default()).validate_bytes(
            "thesis.tex",
            DocumentFormat::Latex,
            source.as_bytes(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn setmainfont_matches_family_exactly() {
        let exact = validate_source("\\setmainfont{Times New Roman}");
        assert!(exact.verdict.has_error(ViolationKind::InvalidFont));

        // A different spelling is treated as an engine override
        let other = validate_source("\\setmainfont{times new roman}");
        assert!(!other.verdict.has_error(ViolationKind::InvalidFont));
        assert!(!other.verdict.has_warning(ViolationKind::InvalidFont));
    }

    #[test]
    fn report_serializes_to_json() {
        let report = validate("thesis_violations.tex");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["format"], "Latex");
        assert!(json["verdict"]["errors"]["InvalidFontColor"].is_string());
        assert!(json.get("checks").is_none());
    }
}

// ============================================================================
// PDF page dumps
// ============================================================================

mod pdf {
    use super::*;

    #[test]
    fn compliant_pages_are_clean() {
        let report = validate("pages_compliant.json");
        assert_eq!(report.format, DocumentFormat::Pdf);
        assert!(report.verdict.is_clean(), "unexpected: {:?}", report.verdict);
    }

    #[test]
    fn every_pass_reports_its_first_offender() {
        let verdict = validate("pages_violations.json").verdict;
        assert_eq!(
            verdict.error(ViolationKind::InvalidFont),
            Some("На странице 2 используется шрифт ArialMT")
        );
        assert_eq!(
            verdict.error(ViolationKind::InvalidFontSize),
            Some("На странице 2 размер шрифта 10pt вне диапазона 12-14pt.")
        );
        assert_eq!(
            verdict.error(ViolationKind::InvalidPageMargins),
            Some("некорректные поля на странице 3")
        );
        assert_eq!(
            verdict.error(ViolationKind::InvalidPageNumbering),
            Some("некорректная нумерация страниц")
        );
        assert_eq!(
            verdict.error(ViolationKind::InvalidSectionOrder),
            Some("секция 'ВВЕДЕНИЕ' расположена некорректно")
        );
        assert!(verdict.warnings().is_empty());
    }

    #[test]
    fn raw_pdf_without_extractor_fails_to_decode() {
        let processor = DocumentProcessor::new(PolicyConfig::default());
        let result =
            processor.validate_bytes("thesis.pdf", DocumentFormat::Pdf, b"%PDF-1.7\n%%EOF");
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<formcheck_core::DecodeError>(),
            Some(formcheck_core::DecodeError::BackendUnavailable)
        ));
    }
}

// ============================================================================
// DOCX containers
// ============================================================================

mod docx {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
    const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="a">
    <w:name w:val="Normal"/>
    <w:pPr><w:spacing w:after="0" w:line="360" w:lineRule="auto"/><w:jc w:val="both"/></w:pPr>
    <w:rPr><w:rFonts w:ascii="Times New Roman" w:hAnsi="Times New Roman"/><w:sz w:val="28"/></w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="1">
    <w:name w:val="heading 1"/><w:basedOn w:val="a"/>
    <w:pPr><w:jc w:val="center"/></w:pPr><w:rPr><w:b/></w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="TOC">
    <w:name w:val="TOC Heading"/><w:basedOn w:val="1"/>
  </w:style>
  <w:style w:type="paragraph" w:styleId="11">
    <w:name w:val="toc 1"/><w:basedOn w:val="a"/>
  </w:style>
</w:styles>"#;

    const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/>
</Relationships>"#;

    const FOOTER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:ftr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:p><w:pPr><w:jc w:val="center"/></w:pPr>
    <w:r><w:fldChar w:fldCharType="begin"/></w:r>
    <w:r><w:instrText xml:space="preserve"> PAGE   \* MERGEFORMAT </w:instrText></w:r>
    <w:r><w:fldChar w:fldCharType="separate"/></w:r>
    <w:r><w:t>2</w:t></w:r>
    <w:r><w:fldChar w:fldCharType="end"/></w:r>
  </w:p>
</w:ftr>"#;

    fn paragraph(style: Option<&str>, run_props: &str, text: &str) -> String {
        let ppr = style
            .map(|s| format!(r#"<w:pPr><w:pStyle w:val="{s}"/></w:pPr>"#))
            .unwrap_or_default();
        format!(r#"<w:p>{ppr}<w:r><w:rPr>{run_props}</w:rPr><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#)
    }

    fn document(paragraphs: &[String], left_margin_twips: u32) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}" xmlns:r="{R_NS}"><w:body>{}
<w:sectPr><w:footerReference w:type="default" r:id="rId7"/>
<w:pgSz w:w="11906" w:h="16838"/>
<w:pgMar w:top="1134" w:right="850" w:bottom="1134" w:left="{left_margin_twips}" w:header="708" w:footer="708" w:gutter="0"/>
</w:sectPr></w:body></w:document>"#,
            paragraphs.join("\n")
        )
    }

    fn build_docx(document_xml: &str, with_footer: bool) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();
        let mut parts = vec![
            ("word/document.xml", document_xml),
            ("word/styles.xml", STYLES),
            ("word/_rels/document.xml.rels", RELS),
        ];
        if with_footer {
            parts.push(("word/footer1.xml", FOOTER));
        }
        for (name, content) in parts {
            zip.start_file(name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn compliant_paragraphs() -> Vec<String> {
        vec![
            paragraph(Some("TOC"), "", "СОДЕРЖАНИЕ"),
            paragraph(Some("11"), "", "ВВЕДЕНИЕ ........................ 3"),
            paragraph(Some("11"), "", "1 Анализ предметной области ..... 5"),
            paragraph(Some("1"), "", "ВВЕДЕНИЕ"),
            paragraph(None, "", "Текст введения."),
            paragraph(Some("1"), "", "1 Анализ предметной области"),
            paragraph(None, "", "Текст главы."),
        ]
    }

    fn check(bytes: &[u8]) -> ValidationReport {
        DocumentProcessor::new(PolicyConfig::default())
            .validate_bytes("thesis.docx", DocumentFormat::Docx, bytes)
            .unwrap()
    }

    #[test]
    fn compliant_document_is_clean() {
        let bytes = build_docx(&document(&compliant_paragraphs(), 1701), true);
        let report = check(&bytes);
        assert!(report.verdict.is_clean(), "unexpected: {:?}", report.verdict);
        let checks = report.checks.expect("docx reports check flags");
        assert_eq!(checks.len(), 8);
        assert!(checks.values().all(|passed| *passed));
    }

    #[test]
    fn run_formatting_violations() {
        let mut paragraphs = compliant_paragraphs();
        paragraphs.push(paragraph(
            None,
            r#"<w:rFonts w:ascii="Arial" w:hAnsi="Arial"/><w:sz w:val="20"/><w:color w:val="0000FF"/>"#,
            "Выделенный фрагмент",
        ));
        let report = check(&build_docx(&document(&paragraphs, 1701), true));
        let verdict = &report.verdict;
        assert_eq!(verdict.error(ViolationKind::InvalidFont), Some("использован шрифт Arial"));
        assert_eq!(
            verdict.error(ViolationKind::InvalidFontSize),
            Some("размер шрифта 10pt вне диапазона 12-14pt")
        );
        assert_eq!(
            verdict.error(ViolationKind::InvalidFontColor),
            Some("использован цвет текста #0000FF")
        );
        let checks = report.checks.unwrap();
        assert_eq!(checks["font_check"], false);
        assert_eq!(checks["font_purity_check"], false);
        assert_eq!(checks["alignment_check"], true);
    }

    #[test]
    fn missing_footer_and_narrow_margin() {
        let bytes = build_docx(&document(&compliant_paragraphs(), 1134), false);
        let verdict = check(&bytes).verdict;
        assert_eq!(
            verdict.error(ViolationKind::InvalidPageNumbering),
            Some("нумерация страниц отсутствует в разделах: 1")
        );
        assert!(verdict
            .error(ViolationKind::InvalidPageMargins)
            .is_some_and(|m| m.contains("20.0 мм")));
    }

    #[test]
    fn contents_entry_without_heading_is_warning() {
        let mut paragraphs = compliant_paragraphs();
        paragraphs.insert(3, paragraph(Some("11"), "", "2 Проектирование системы ..... 9"));
        let report = check(&build_docx(&document(&paragraphs, 1701), true));
        assert!(!report.verdict.has_any_error());
        assert_eq!(
            report.verdict.warning(ViolationKind::InvalidSectionOrder),
            Some("заголовки из содержания не найдены в тексте: 2 Проектирование системы")
        );
    }

    #[test]
    fn corrupt_container_is_a_decode_error() {
        let processor = DocumentProcessor::new(PolicyConfig::default());
        let bytes = b"PK\x03\x04 not really";
        let result = processor.validate_bytes("broken.docx", DocumentFormat::Docx, bytes);
        assert!(result.is_err());
    }
}
