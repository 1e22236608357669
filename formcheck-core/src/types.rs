use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ===== VIOLATION KINDS =====
// The closed set of policy rules a document can break. Every front-end
// (LaTeX, PDF, DOCX) reports against the same kinds.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    /// Whole document must be set in Times New Roman
    InvalidFont,
    /// Text color must be black
    InvalidFontColor,
    /// Body text between 12pt and 14pt
    InvalidFontSize,
    /// Left 30mm, right 10mm or 15mm, top and bottom 20mm
    InvalidPageMargins,
    /// First-line indent of body paragraphs is 1.25cm
    InvalidParagraphIndent,
    /// One and a half line spacing
    InvalidLineSpacing,
    /// Justified body text
    InvalidTextAlignment,
    /// Centered arabic page numbers at the bottom of every page
    InvalidPageNumbering,
    /// Required sections present and in order
    InvalidSectionOrder,
}

impl ViolationKind {
    /// Human-readable title, e.g. "Invalid Font Size"
    pub fn title(&self) -> &'static str {
        match self {
            ViolationKind::InvalidFont => "Invalid Font",
            ViolationKind::InvalidFontColor => "Invalid Font Color",
            ViolationKind::InvalidFontSize => "Invalid Font Size",
            ViolationKind::InvalidPageMargins => "Invalid Page Margins",
            ViolationKind::InvalidParagraphIndent => "Invalid Paragraph Indent",
            ViolationKind::InvalidLineSpacing => "Invalid Line Spacing",
            ViolationKind::InvalidTextAlignment => "Invalid Text Alignment",
            ViolationKind::InvalidPageNumbering => "Invalid Page Numbering",
            ViolationKind::InvalidSectionOrder => "Invalid Section Order",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// ===== DOCUMENT FORMATS =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentFormat {
    /// LaTeX source (.tex)
    Latex,
    /// Rendered PDF, or a JSON page dump of one
    Pdf,
    /// Word-processor document (.docx)
    Docx,
}

impl DocumentFormat {
    /// Detect the format from a file extension. Page dumps are `.json`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "tex" | "ltx" => Some(DocumentFormat::Latex),
            "pdf" | "json" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentFormat::Latex => "latex",
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        };
        f.write_str(name)
    }
}

// ===== GEOMETRY =====

/// Page margins in millimeters, built up from `key=value` geometry options.
/// Keys that were never given stay at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Geometry {
    /// Set a margin by its option key. Returns false for keys that are not margins.
    pub fn set(&mut self, key: &str, millimeters: f64) -> bool {
        match key {
            "left" => self.left = millimeters,
            "right" => self.right = millimeters,
            "top" => self.top = millimeters,
            "bottom" => self.bottom = millimeters,
            _ => return false,
        }
        true
    }
}

/// Axis-aligned box in PDF points, origin at the top-left of the page.
/// Serialized as `[x0, y0, x1, y1]`, the layout page dumps use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BoundingBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from(raw: [f32; 4]) -> Self {
        Self::new(raw[0], raw[1], raw[2], raw[3])
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(bbox: BoundingBox) -> Self {
        [bbox.x0, bbox.y0, bbox.x1, bbox.y1]
    }
}

/// Region a page's content has to stay inside, derived from the page size
/// and the required margins (all in points).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometryBounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl PageGeometryBounds {
    /// True when `bbox` crosses any of the four bounds
    pub fn is_exceeded_by(&self, bbox: &BoundingBox) -> bool {
        bbox.x0 < self.left || bbox.x1 > self.right || bbox.y0 < self.top || bbox.y1 > self.bottom
    }
}
