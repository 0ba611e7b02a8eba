//! Template and variable data model
//!
//! These are the records handed to and received from the persistence
//! adapter. Serialization is sparse: fields that do not apply to a
//! variable's kind are omitted rather than written as `null`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a variable, unique within its template
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableId(pub String);

impl VariableId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VariableId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// What a variable displays: a catalog field, or literal text that may
/// itself contain tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariableContent {
    #[serde(rename_all = "camelCase")]
    BoundField {
        data_source_id: String,
        field_id: String,
    },
    RawText { text: String },
}

impl VariableContent {
    pub fn bound(data_source_id: impl Into<String>, field_id: impl Into<String>) -> Self {
        VariableContent::BoundField {
            data_source_id: data_source_id.into(),
            field_id: field_id.into(),
        }
    }

    pub fn raw(text: impl Into<String>) -> Self {
        VariableContent::RawText { text: text.into() }
    }

    pub fn kind(&self) -> VariableKind {
        match self {
            VariableContent::BoundField { .. } => VariableKind::BoundField,
            VariableContent::RawText { .. } => VariableKind::RawText,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    BoundField,
    RawText,
}

/// Top-left origin of a variable in page space, plus its 1-indexed page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub page: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    pub font_family: String,
    pub font_size_pt: f32,
    #[serde(default)]
    pub bold: bool,
    /// Only meaningful for multi-line raw text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size_pt: 12.0,
            bold: false,
            line_height: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl std::str::FromStr for TextAlign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(TextAlign::Left),
            "center" => Ok(TextAlign::Center),
            "right" => Ok(TextAlign::Right),
            "justify" => Ok(TextAlign::Justify),
            other => Err(format!("unknown text alignment '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

impl std::str::FromStr for VerticalAlign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(VerticalAlign::Top),
            "middle" => Ok(VerticalAlign::Middle),
            "bottom" => Ok(VerticalAlign::Bottom),
            other => Err(format!("unknown vertical alignment '{}'", other)),
        }
    }
}

/// A positioned, sized, styled placeholder on a template page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub id: VariableId,
    #[serde(flatten)]
    pub content: VariableContent,
    pub position: Position,
    pub size: Size,
    pub typography: Typography,
    #[serde(default)]
    pub text_align: TextAlign,
    #[serde(default)]
    pub vertical_align: VerticalAlign,
}

impl Variable {
    pub fn kind(&self) -> VariableKind {
        self.content.kind()
    }

    pub fn page(&self) -> u32 {
        self.position.page
    }
}

/// A reusable layout bound to one source page document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub document_ref: String,
    #[serde(default)]
    pub variables: Vec<Variable>,
}

impl Template {
    /// A template starts empty when its source document is registered
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        document_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            document_ref: document_ref.into(),
            variables: Vec::new(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
}

/// Intrinsic size of one page in page-space units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub const fn a4() -> Self {
        Self::new(595.0, 842.0)
    }

    pub const fn letter() -> Self {
        Self::new(612.0, 792.0)
    }
}

/// Page count and per-page size of a source document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentGeometry {
    pub pages: Vec<PageSize>,
}

impl DocumentGeometry {
    pub fn new(pages: Vec<PageSize>) -> Self {
        Self { pages }
    }

    pub fn uniform(page_count: u32, size: PageSize) -> Self {
        Self {
            pages: vec![size; page_count as usize],
        }
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Size of a 1-indexed page
    pub fn page(&self, page: u32) -> Option<PageSize> {
        if page == 0 {
            return None;
        }
        self.pages.get(page as usize - 1).copied()
    }
}
