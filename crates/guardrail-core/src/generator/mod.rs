//! Document binding: turning a template plus operator answers into
//! structured content.
//!
//! The generator never concatenates document bodies as strings. It builds a
//! [`DocumentContent`], fixed header material plus an ordered list of typed
//! rows, and hands that structure to a [`render::DocumentRenderer`], which
//! owns all layout concerns. Binding is deterministic: the same template and
//! answers always produce the same content.

use std::collections::BTreeMap;

use jiff::{civil::Date, Timestamp};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, TrackerError},
    models::{FieldKind, Step, TemplateDefinition},
};

pub mod render;

pub use render::{DocumentRenderer, MarkdownRenderer};

/// One rendered row of a generated document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ContentRow {
    /// Single-line key/value pair (short text and date fields)
    Line { label: String, value: String },
    /// Multi-line labeled block (long text fields)
    Block { label: String, value: String },
}

/// The structured content handed to the renderer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentContent {
    /// Fixed document title from the template
    pub title: String,
    /// Fixed introductory text from the template (may be empty)
    pub intro_text: String,
    /// Dynamic rows in presentation order
    pub rows: Vec<ContentRow>,
}

/// Binds an answer set to a template, producing renderable content.
///
/// The answer map must carry exactly the labels the template declares:
/// a declared label without a non-empty value fails with
/// [`TrackerError::MissingField`], an undeclared label fails with
/// [`TrackerError::InvalidInput`], and a date field whose value is not an
/// ISO calendar date fails with [`TrackerError::InvalidFieldValue`]. Rows
/// come out sorted by (order, label); date values are normalized to their
/// canonical ISO form so rendered output does not depend on incidental
/// whitespace.
pub fn build_content(
    template: &TemplateDefinition,
    answers: &BTreeMap<String, String>,
) -> Result<DocumentContent> {
    for label in answers.keys() {
        if !template.fields.iter().any(|f| &f.label == label) {
            return Err(TrackerError::invalid_input(
                label.clone(),
                "Field is not declared by the template",
            ));
        }
    }

    let mut fields: Vec<_> = template.fields.iter().collect();
    fields.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.label.cmp(&b.label)));

    let mut rows = Vec::with_capacity(fields.len());
    for field in fields {
        let value = answers
            .get(&field.label)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| TrackerError::MissingField {
                label: field.label.clone(),
            })?;

        let row = match field.kind {
            FieldKind::ShortText => ContentRow::Line {
                label: field.label.clone(),
                value: value.to_string(),
            },
            FieldKind::Date => {
                let date =
                    value
                        .parse::<Date>()
                        .map_err(|_| TrackerError::InvalidFieldValue {
                            label: field.label.clone(),
                            reason: format!(
                                "'{value}' is not a calendar date (expected YYYY-MM-DD)"
                            ),
                        })?;
                ContentRow::Line {
                    label: field.label.clone(),
                    value: date.to_string(),
                }
            }
            FieldKind::LongText => ContentRow::Block {
                label: field.label.clone(),
                value: value.to_string(),
            },
        };
        rows.push(row);
    }

    Ok(DocumentContent {
        title: template.title.clone(),
        intro_text: template.intro_text.clone(),
        rows,
    })
}

/// Suggests a timestamp-qualified filename for a generated document.
///
/// Uniqueness per call comes from the millisecond timestamp; the blob
/// store additionally disambiguates on collision, so repeated generations
/// never overwrite earlier evidence.
pub fn document_filename(step: &Step) -> String {
    format!(
        "step-{:02}-{}-{}.md",
        step.number,
        slugify(&step.name),
        Timestamp::now().as_millisecond()
    )
}

/// Lowercases and collapses a name into a filesystem-friendly slug.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "document".to_string()
    } else {
        slug.to_string()
    }
}
