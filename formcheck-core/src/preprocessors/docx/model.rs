//! Word-processor document model
//!
//! Only what the compliance rules read survives decoding: paragraph and run
//! formatting, the style sheet with its `basedOn` links, and section
//! metadata with raw header/footer markup.

use crate::units;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocxDocument {
    /// Body paragraphs in reading order. Table cells and text boxes are excluded.
    pub paragraphs: Vec<Paragraph>,
    pub styles: StyleSheet,
    pub sections: Vec<Section>,
}

// ===== PARAGRAPHS AND RUNS =====

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paragraph {
    pub style_id: Option<String>,
    pub properties: ParagraphProperties,
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Run {
    pub style_id: Option<String>,
    pub properties: RunProperties,
    pub text: String,
}

/// Character formatting; `None` means "not set at this level"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunProperties {
    pub font: Option<String>,
    pub size_pt: Option<f32>,
    /// Uppercase RGB hex (`000000`). `auto` is stored as `None`.
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphProperties {
    pub alignment: Option<Alignment>,
    pub line_spacing: Option<LineSpacing>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
    Distribute,
    Other(String),
}

impl Alignment {
    /// Map a `w:jc` value
    pub fn from_jc(value: &str) -> Self {
        match value {
            "left" | "start" => Alignment::Left,
            "center" => Alignment::Center,
            "right" | "end" => Alignment::Right,
            "both" => Alignment::Justify,
            "distribute" => Alignment::Distribute,
            other => Alignment::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
            Alignment::Distribute => "distribute",
            Alignment::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LineSpacing {
    /// Multiple of single spacing (`lineRule="auto"`)
    Multiple(f32),
    /// Fixed line height in points
    Exact(f32),
    /// Minimum line height in points
    AtLeast(f32),
}

impl LineSpacing {
    /// Map `w:spacing` `line` (240ths of a line, or twips) and `lineRule`
    pub fn from_spacing(line: f32, rule: Option<&str>) -> Self {
        match rule {
            Some("exact") => LineSpacing::Exact(line / 20.0),
            Some("atLeast") => LineSpacing::AtLeast(line / 20.0),
            _ => LineSpacing::Multiple(line / 240.0),
        }
    }
}

// ===== STYLES =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StyleKind {
    #[default]
    Paragraph,
    Character,
    Table,
    Numbering,
}

impl StyleKind {
    pub fn from_type(value: &str) -> Self {
        match value {
            "character" => StyleKind::Character,
            "table" => StyleKind::Table,
            "numbering" => StyleKind::Numbering,
            _ => StyleKind::Paragraph,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Style {
    pub id: String,
    pub name: Option<String>,
    pub kind: StyleKind,
    pub based_on: Option<String>,
    pub is_default: bool,
    pub run: RunProperties,
    pub paragraph: ParagraphProperties,
}

impl Style {
    /// Case-insensitive prefix match on the display name
    pub fn name_starts_with(&self, prefixes: &[&str]) -> bool {
        let Some(name) = &self.name else {
            return false;
        };
        let name = name.trim().to_lowercase();
        prefixes.iter().any(|p| name.starts_with(&p.to_lowercase()))
    }
}

/// Styles in document order, indexed by id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleSheet {
    styles: Vec<Style>,
    index: HashMap<String, usize>,
}

impl StyleSheet {
    /// A repeated id replaces the earlier definition in place
    pub fn insert(&mut self, style: Style) {
        match self.index.get(&style.id) {
            Some(&position) => self.styles[position] = style,
            None => {
                self.index.insert(style.id.clone(), self.styles.len());
                self.styles.push(style);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Style> {
        self.index.get(id).and_then(|&position| self.styles.get(position))
    }

    pub fn style_count(&self) -> usize {
        self.styles.len()
    }

    /// The implicit base style: the first default paragraph style, else the
    /// first style named "Normal"
    pub fn normal(&self) -> Option<&Style> {
        self.styles
            .iter()
            .find(|s| s.kind == StyleKind::Paragraph && s.is_default)
            .or_else(|| {
                self.styles
                    .iter()
                    .find(|s| s.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case("normal")))
            })
    }

    /// The style followed by its `basedOn` ancestors, nearest first.
    /// Stops at a missing link or at the first repeated id.
    pub fn lineage(&self, id: &str) -> Vec<&Style> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(id);
        while let Some(current) = next {
            if !visited.insert(current) {
                tracing::debug!(style = current, "cycle in basedOn chain");
                break;
            }
            let Some(style) = self.get(current) else {
                break;
            };
            chain.push(style);
            next = style.based_on.as_deref();
        }
        chain
    }
}

// ===== SECTIONS =====

/// Page margins in twips, as stored in `w:pgMar`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMargins {
    pub left: Option<f64>,
    pub right: Option<f64>,
    pub top: Option<f64>,
    pub bottom: Option<f64>,
}

impl PageMargins {
    pub fn left_mm(&self) -> Option<f64> {
        self.left.map(units::twips_to_mm)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeaderFooterType {
    Default,
    First,
    Even,
}

impl HeaderFooterType {
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("first") => HeaderFooterType::First,
            Some("even") => HeaderFooterType::Even,
            _ => HeaderFooterType::Default,
        }
    }
}

/// Raw XML of a header or footer part per page variant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderFooterSet {
    pub default: Option<String>,
    pub first: Option<String>,
    pub even: Option<String>,
}

impl HeaderFooterSet {
    pub fn get(&self, kind: HeaderFooterType) -> Option<&str> {
        match kind {
            HeaderFooterType::Default => self.default.as_deref(),
            HeaderFooterType::First => self.first.as_deref(),
            HeaderFooterType::Even => self.even.as_deref(),
        }
    }

    pub fn set(&mut self, kind: HeaderFooterType, markup: String) {
        match kind {
            HeaderFooterType::Default => self.default = Some(markup),
            HeaderFooterType::First => self.first = Some(markup),
            HeaderFooterType::Even => self.even = Some(markup),
        }
    }

    /// Fill variants this set lacks from `previous`
    pub fn inherit_from(&mut self, previous: &HeaderFooterSet) {
        for kind in [HeaderFooterType::Default, HeaderFooterType::First, HeaderFooterType::Even] {
            if self.get(kind).is_none() {
                if let Some(markup) = previous.get(kind) {
                    self.set(kind, markup.to_string());
                }
            }
        }
    }

    pub fn parts(&self) -> impl Iterator<Item = &str> {
        [&self.default, &self.first, &self.even]
            .into_iter()
            .filter_map(|part| part.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub margins: PageMargins,
    pub headers: HeaderFooterSet,
    pub footers: HeaderFooterSet,
}

impl Section {
    /// Every header and footer variant this section shows
    pub fn header_footer_markup(&self) -> impl Iterator<Item = &str> {
        self.headers.parts().chain(self.footers.parts())
    }
}
