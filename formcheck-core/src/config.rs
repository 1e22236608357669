use anyhow::Result;
use serde::{Deserialize, Serialize};

// Default value functions for serde
fn default_true() -> bool {
    true
}

/// The formatting policy every document is checked against.
///
/// Defaults encode the institutional policy; a YAML file only needs to list
/// the values it wants to change.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PolicyConfig {
    pub font: FontPolicy,
    pub margins: MarginPolicy,
    pub paragraph: ParagraphPolicy,
    pub pdf: PdfLayoutPolicy,
    pub headings: HeadingPolicy,
    pub latex: LatexConfig,
    pub docx: DocxConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontPolicy {
    /// Required font family
    pub family: String,
    /// Smallest allowed body size in points (inclusive)
    pub min_size_pt: f32,
    /// Largest allowed body size in points (inclusive)
    pub max_size_pt: f32,
    /// Required text color as named in LaTeX
    pub color: String,
    /// LaTeX packages that switch the document to a Times-compatible font
    pub latex_packages: Vec<String>,
    /// `\documentclass` options that select a compliant base size
    pub latex_size_options: Vec<String>,
}

impl Default for FontPolicy {
    fn default() -> Self {
        Self {
            family: "Times New Roman".to_string(),
            min_size_pt: 12.0,
            max_size_pt: 14.0,
            color: "black".to_string(),
            latex_packages: vec![
                "times".to_string(),
                "mathptmx".to_string(),
                "tempora".to_string(),
            ],
            latex_size_options: vec!["12pt".to_string(), "14pt".to_string()],
        }
    }
}

impl FontPolicy {
    pub fn size_in_range(&self, size_pt: f32) -> bool {
        (self.min_size_pt..=self.max_size_pt).contains(&size_pt)
    }
}

/// Page margins in millimeters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginPolicy {
    pub left_mm: i64,
    /// Either value is accepted for the right margin
    pub right_mm: Vec<i64>,
    pub top_mm: i64,
    pub bottom_mm: i64,
    /// Allowed deviation when margins are read from a rendered document model
    pub tolerance_mm: f64,
}

impl Default for MarginPolicy {
    fn default() -> Self {
        Self {
            left_mm: 30,
            right_mm: vec![10, 15],
            top_mm: 20,
            bottom_mm: 20,
            tolerance_mm: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParagraphPolicy {
    /// First-line indent in millimeters
    pub indent_mm: f64,
    /// Line spacing as a multiple of single spacing
    pub line_spacing: f32,
    pub line_spacing_tolerance: f32,
    /// Literal `\setstretch` arguments accepted as one-and-a-half spacing
    pub stretch_values: Vec<String>,
    /// Compliant paragraph alignments ("justify", "center", ...)
    pub alignments: Vec<String>,
}

impl Default for ParagraphPolicy {
    fn default() -> Self {
        Self {
            indent_mm: 12.5,
            line_spacing: 1.5,
            line_spacing_tolerance: 0.1,
            stretch_values: vec!["1.5".to_string(), "1.50".to_string()],
            alignments: vec!["justify".to_string(), "center".to_string()],
        }
    }
}

/// Layout thresholds for rendered pages, in points
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfLayoutPolicy {
    /// 30mm left margin
    pub left_bound_pt: f32,
    /// Up to 15mm right margin, measured from the right edge
    pub right_bound_pt: f32,
    /// 20mm top margin
    pub top_bound_pt: f32,
    /// 20mm bottom margin, measured from the bottom edge
    pub bottom_bound_pt: f32,
    /// Only blocks with more text than this are checked against the margins
    pub margin_check_min_chars: usize,
    /// Blocks whose bottom edge is this close to the page bottom may hold the page number
    pub numbering_region_pt: f32,
    /// Maximum horizontal offset of the page number from the page center
    pub numbering_center_tolerance_pt: f32,
    /// External command turning PDF bytes (stdin) into a JSON page dump (stdout)
    pub extractor_command: Option<Vec<String>>,
}

impl Default for PdfLayoutPolicy {
    fn default() -> Self {
        Self {
            left_bound_pt: 85.0,
            right_bound_pt: 42.0,
            top_bound_pt: 57.0,
            bottom_bound_pt: 57.0,
            margin_check_min_chars: 150,
            numbering_region_pt: 50.0,
            numbering_center_tolerance_pt: 30.0,
            extractor_command: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingPolicy {
    /// Sections that must each open a page, in this relative order
    pub required: Vec<String>,
}

impl Default for HeadingPolicy {
    fn default() -> Self {
        Self {
            required: vec![
                "СОДЕРЖАНИЕ".to_string(),
                "ТЕРМИНЫ И ОПРЕДЕЛЕНИЯ".to_string(),
                "ВВЕДЕНИЕ".to_string(),
                "ЗАКЛЮЧЕНИЕ".to_string(),
                "СПИСОК ИСПОЛЬЗУЕМЫХ ИСТОЧНИКОВ".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LatexConfig {
    /// Rules applied to every macro, in order
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Name of the rule
    pub name: String,
    /// Whether this rule is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl RuleConfig {
    fn enabled(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
        }
    }
}

impl Default for LatexConfig {
    fn default() -> Self {
        Self {
            rules: vec![
                RuleConfig::enabled("FontUsage"),
                RuleConfig::enabled("FontColor"),
                RuleConfig::enabled("Geometry"),
                RuleConfig::enabled("ParagraphIndent"),
                RuleConfig::enabled("FontSize"),
                RuleConfig::enabled("LineSpacing"),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocxConfig {
    /// Cross-check table-of-contents entries against heading paragraphs
    pub check_toc_headings: bool,
}

impl Default for DocxConfig {
    fn default() -> Self {
        Self {
            check_toc_headings: true,
        }
    }
}

impl PolicyConfig {
    /// Load config from a YAML file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PolicyConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load config with fallback to the built-in policy
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        Self::load_reporting_source(path).0
    }

    /// Like [`load_with_fallback`](Self::load_with_fallback), also telling
    /// where the policy actually came from
    pub fn load_reporting_source(path: Option<&str>) -> (Self, PolicySource) {
        match path {
            Some(p) => match Self::load_from_file(p) {
                Ok(config) => (config, PolicySource::File(p.to_string())),
                Err(e) => {
                    tracing::warn!(
                        path = p,
                        error = %e,
                        "failed to load policy config, using defaults"
                    );
                    let source = PolicySource::Fallback {
                        path: p.to_string(),
                        error: format!("{e:#}"),
                    };
                    (Self::default(), source)
                }
            },
            None => (Self::default(), PolicySource::Default),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Where the effective policy was loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicySource {
    Default,
    File(String),
    /// The requested file could not be used; the built-in policy applies
    Fallback { path: String, error: String },
}

impl PolicySource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, PolicySource::Fallback { .. })
    }
}
