//! Document template and field schema models.

use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Closed set of input kinds a template field may declare.
///
/// The generator branches exhaustively on this enum, so adding a kind is a
/// compile-time checked change rather than a stringly-typed one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Single-line free text, rendered as a key/value row
    ShortText,

    /// ISO calendar date, validated at generation time
    Date,

    /// Multi-line free text, rendered as its own block
    LongText,
}

impl FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short_text" | "short" | "text" => Ok(FieldKind::ShortText),
            "date" => Ok(FieldKind::Date),
            "long_text" | "long" => Ok(FieldKind::LongText),
            _ => Err(format!("Invalid field kind: {s}")),
        }
    }
}

impl FieldKind {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::ShortText => "short_text",
            FieldKind::Date => "date",
            FieldKind::LongText => "long_text",
        }
    }
}

/// One typed, labeled, ordered input slot within a template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSchema {
    /// Label identifying the field (unique within its template)
    pub label: String,

    /// Input kind controlling validation and rendering
    pub kind: FieldKind,

    /// Presentation order (positive; ties broken by label)
    pub order: u32,
}

/// The configurable document schema attached to a step.
///
/// Holds the fixed boilerplate (title, intro text) and the ordered list of
/// dynamic fields an operator fills in at generation time. A step has at
/// most one template; redefining it replaces the previous definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateDefinition {
    /// Unique identifier for the template
    pub id: u64,

    /// ID of the owning step
    pub step_id: u64,

    /// Document title (non-empty)
    pub title: String,

    /// Fixed introductory body text (may be empty)
    pub intro_text: String,

    /// Dynamic input fields, sorted by (order, label)
    pub fields: Vec<FieldSchema>,

    /// Timestamp when the template was first defined (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the template was last redefined (UTC)
    pub updated_at: Timestamp,
}
