//! Rendered-page content model
//!
//! Pages → blocks → lines → spans, each span carrying its text, font name
//! and size. The JSON layout is the block/line/span dictionary common PDF
//! extractors emit, so their output can be fed in unchanged:
//!
//! ```json
//! {"pages": [{"width": 595.0, "height": 842.0, "blocks": [
//!   {"type": 0, "bbox": [85.0, 60.0, 550.0, 90.0], "lines": [
//!     {"spans": [{"text": "ВВЕДЕНИЕ", "font": "TimesNewRomanPS-BoldMT", "size": 16.0}]}
//!   ]}
//! ]}]}
//! ```

use crate::types::BoundingBox;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDump {
    pub pages: Vec<PdfPage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfPage {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub blocks: Vec<PdfBlock>,
}

impl PdfPage {
    pub fn text_blocks(&self) -> impl Iterator<Item = &PdfBlock> {
        self.blocks.iter().filter(|block| block.is_text())
    }

    /// Text block with the smallest top edge
    pub fn topmost_text_block(&self) -> Option<&PdfBlock> {
        self.text_blocks().fold(None, |top: Option<&PdfBlock>, block| match top {
            Some(current) if current.bbox.y0 <= block.bbox.y0 => Some(current),
            _ => Some(block),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum BlockKind {
    #[default]
    Text,
    Image,
    Other(u8),
}

impl From<u8> for BlockKind {
    fn from(raw: u8) -> Self {
        match raw {
            0 => BlockKind::Text,
            1 => BlockKind::Image,
            other => BlockKind::Other(other),
        }
    }
}

impl From<BlockKind> for u8 {
    fn from(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Text => 0,
            BlockKind::Image => 1,
            BlockKind::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfBlock {
    #[serde(rename = "type", default)]
    pub kind: BlockKind,
    pub bbox: BoundingBox,
    #[serde(default)]
    pub lines: Vec<PdfLine>,
}

impl PdfBlock {
    pub fn is_text(&self) -> bool {
        self.kind == BlockKind::Text
    }

    pub fn spans(&self) -> impl Iterator<Item = &PdfSpan> {
        self.lines.iter().flat_map(|line| line.spans.iter())
    }

    /// Block text rebuilt from its lines, one line per row
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(PdfLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Trimmed text of the first line
    pub fn first_line_text(&self) -> String {
        self.lines
            .first()
            .map(|line| line.text().trim().to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdfLine {
    #[serde(default)]
    pub spans: Vec<PdfSpan>,
}

impl PdfLine {
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdfSpan {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub font: String,
    /// Font size in points
    #[serde(default)]
    pub size: f32,
}
