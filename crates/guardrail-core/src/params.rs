//! Parameter structures for Guardrail operations
//!
//! Shared parameter structures used across interfaces (CLI, MCP) without
//! framework-specific derives. Interface layers wrap these in their own
//! structs (clap `Args`, transparent serde containers) and convert with
//! `From`/`Into`, keeping the core free of UI framework dependencies:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │   MCP Params    │    │  Core Params    │
//! │  (clap derives) │───▶│ (serde derives) │───▶│ (minimal deps)  │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! Parameters that carry free-form user input expose a `validate()` method
//! returning the parsed, type-safe form; interface layers call the tracker
//! which validates before touching the database.

use std::collections::BTreeMap;
use std::str::FromStr;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, TrackerError},
    models::{FieldKind, FieldSchema, StepStatus},
};

/// Generic parameters for operations requiring just an ID.
///
/// Used for show_step, delete_step, reopen_step, show_template,
/// list_evidence, and remove_evidence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Id {
    /// The ID of the resource to operate on
    pub id: u64,
}

/// Parameters for registering a new compliance step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateStep {
    /// Ordinal number of the step (positive, unique across the registry)
    pub number: u32,
    /// Name of the requirement (required)
    pub name: String,
    /// Optional regulatory citation backing the requirement
    pub citation: Option<String>,
}

impl CreateStep {
    /// Validate the creation parameters.
    ///
    /// # Errors
    ///
    /// * `TrackerError::InvalidInput` - When the number is zero or the name
    ///   is blank
    pub fn validate(&self) -> Result<()> {
        if self.number == 0 {
            return Err(TrackerError::invalid_input(
                "number",
                "Step number must be 1 or greater",
            ));
        }
        if self.name.trim().is_empty() {
            return Err(TrackerError::invalid_input(
                "name",
                "Step name must not be blank",
            ));
        }
        Ok(())
    }
}

/// Parameters for renaming a step or updating its citation.
///
/// Status changes go through [`SetStepStatus`] instead; this operation
/// never touches the lifecycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpdateStep {
    /// Step ID to update (required)
    pub id: u64,
    /// Updated name of the requirement
    pub name: Option<String>,
    /// Updated regulatory citation
    pub citation: Option<String>,
}

impl UpdateStep {
    /// Validate the update parameters.
    ///
    /// # Errors
    ///
    /// * `TrackerError::InvalidInput` - When a provided name is blank
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(TrackerError::invalid_input(
                    "name",
                    "Step name must not be blank",
                ));
            }
        }
        Ok(())
    }
}

/// Parameters for transitioning a step's lifecycle status.
///
/// The optional comment is stored as the step's observation. Transitions
/// into 'done' additionally require at least one evidence record, checked
/// atomically at write time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct SetStepStatus {
    /// Step ID to transition (required)
    pub id: u64,
    /// Target status ('pending', 'inprogress', 'done', or 'cancelled')
    pub status: String,
    /// Optional observation recorded with the transition
    pub comment: Option<String>,
}

impl SetStepStatus {
    /// Parse and validate the target status.
    ///
    /// # Errors
    ///
    /// * `TrackerError::InvalidInput` - When the status string is not a
    ///   recognized status name
    pub fn validate(&self) -> Result<StepStatus> {
        StepStatus::from_str(&self.status).map_err(|_| {
            TrackerError::invalid_input(
                "status",
                format!(
                    "Invalid status: {}. Must be 'pending', 'inprogress', 'done', or 'cancelled'",
                    self.status
                ),
            )
        })
    }
}

/// One dynamic field in a template definition request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct FieldDef {
    /// Label of the field (unique within the template)
    pub label: String,
    /// Input kind ('short_text', 'date', or 'long_text')
    pub kind: String,
    /// Presentation order (positive; ties broken by label)
    pub order: u32,
}

/// Parameters for defining (or redefining) a step's document template.
///
/// Defining a template replaces any previous definition for the step in a
/// single transaction; it is never additive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct DefineTemplate {
    /// ID of the step the template belongs to
    pub step_id: u64,
    /// Document title (required, non-empty)
    pub title: String,
    /// Fixed introductory body text (may be empty)
    #[serde(default)]
    pub intro_text: String,
    /// Dynamic input fields (at least one required)
    pub fields: Vec<FieldDef>,
}

impl DefineTemplate {
    /// Validate the definition and return the parsed field schemas, sorted
    /// by (order, label).
    ///
    /// # Errors
    ///
    /// * `TrackerError::InvalidInput` - When the title is blank, the field
    ///   list is empty, a label is blank or duplicated, an order is zero,
    ///   or a kind string is not recognized
    pub fn validate(&self) -> Result<Vec<FieldSchema>> {
        if self.title.trim().is_empty() {
            return Err(TrackerError::invalid_input(
                "title",
                "Document title must not be blank",
            ));
        }
        if self.fields.is_empty() {
            return Err(TrackerError::invalid_input(
                "fields",
                "A template must declare at least one field",
            ));
        }

        let mut fields = Vec::with_capacity(self.fields.len());
        for def in &self.fields {
            let label = def.label.trim();
            if label.is_empty() {
                return Err(TrackerError::invalid_input(
                    "fields",
                    "Field labels must not be blank",
                ));
            }
            if def.order == 0 {
                return Err(TrackerError::invalid_input(
                    "fields",
                    format!("Field '{label}' has order 0; orders start at 1"),
                ));
            }
            let kind = FieldKind::from_str(&def.kind).map_err(|_| {
                TrackerError::invalid_input(
                    "fields",
                    format!(
                        "Field '{label}' has invalid kind '{}'. Must be 'short_text', 'date', or 'long_text'",
                        def.kind
                    ),
                )
            })?;
            if fields.iter().any(|f: &FieldSchema| f.label == label) {
                return Err(TrackerError::invalid_input(
                    "fields",
                    format!("Duplicate field label '{label}'"),
                ));
            }
            fields.push(FieldSchema {
                label: label.to_string(),
                kind,
                order: def.order,
            });
        }

        fields.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.label.cmp(&b.label)));
        Ok(fields)
    }
}

/// Parameters for generating a document from a step's template.
///
/// The answer map must contain exactly the labels the template declares,
/// each with a non-empty value; date fields must parse as ISO calendar
/// dates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct GenerateDocument {
    /// ID of the step whose template drives the generation
    pub step_id: u64,
    /// Operator answers keyed by field label
    pub answers: BTreeMap<String, String>,
    /// Identity of the operator, recorded on the evidence
    pub uploaded_by: Option<String>,
}

/// Parameters for manually attaching an evidence file to a step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct AttachEvidence {
    /// ID of the step the file belongs to
    pub step_id: u64,
    /// Original filename of the upload
    pub filename: String,
    /// Raw file contents
    pub contents: Vec<u8>,
    /// Identity of the uploader
    pub uploaded_by: Option<String>,
}

impl AttachEvidence {
    /// Validate the attachment parameters.
    ///
    /// # Errors
    ///
    /// * `TrackerError::InvalidInput` - When the filename is blank
    pub fn validate(&self) -> Result<()> {
        if self.filename.trim().is_empty() {
            return Err(TrackerError::invalid_input(
                "filename",
                "Evidence filename must not be blank",
            ));
        }
        Ok(())
    }
}

/// Parameters for replacing the content of an existing evidence record.
///
/// The evidence identity is preserved; only filename, storage path, and
/// timestamp change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ReplaceEvidence {
    /// ID of the evidence record to replace
    pub evidence_id: u64,
    /// Filename of the corrected upload
    pub filename: String,
    /// Raw file contents
    pub contents: Vec<u8>,
}

impl ReplaceEvidence {
    /// Validate the replacement parameters.
    ///
    /// # Errors
    ///
    /// * `TrackerError::InvalidInput` - When the filename is blank
    pub fn validate(&self) -> Result<()> {
        if self.filename.trim().is_empty() {
            return Err(TrackerError::invalid_input(
                "filename",
                "Evidence filename must not be blank",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldKind;

    fn fatigue_template() -> DefineTemplate {
        DefineTemplate {
            step_id: 25,
            title: "FATIGUE MANAGEMENT ACT".to_string(),
            intro_text: "Reviewed under the road safety program.".to_string(),
            fields: vec![
                FieldDef {
                    label: "Responsible".to_string(),
                    kind: "short_text".to_string(),
                    order: 1,
                },
                FieldDef {
                    label: "Review Date".to_string(),
                    kind: "date".to_string(),
                    order: 2,
                },
            ],
        }
    }

    #[test]
    fn test_define_template_validate_ok() {
        let fields = fatigue_template().validate().expect("should validate");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].label, "Responsible");
        assert_eq!(fields[0].kind, FieldKind::ShortText);
        assert_eq!(fields[1].kind, FieldKind::Date);
    }

    #[test]
    fn test_define_template_rejects_empty_fields() {
        let mut params = fatigue_template();
        params.fields.clear();
        let err = params.validate().unwrap_err();
        match err {
            TrackerError::InvalidInput { field, .. } => assert_eq!(field, "fields"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_define_template_rejects_blank_label() {
        let mut params = fatigue_template();
        params.fields[0].label = "   ".to_string();
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_define_template_rejects_duplicate_label() {
        let mut params = fatigue_template();
        params.fields[1].label = "Responsible".to_string();
        let err = params.validate().unwrap_err();
        match err {
            TrackerError::InvalidInput { reason, .. } => {
                assert!(reason.contains("Duplicate field label"));
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_define_template_rejects_zero_order() {
        let mut params = fatigue_template();
        params.fields[0].order = 0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_define_template_rejects_unknown_kind() {
        let mut params = fatigue_template();
        params.fields[0].kind = "checkbox".to_string();
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_define_template_rejects_blank_title() {
        let mut params = fatigue_template();
        params.title = String::new();
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_define_template_sorts_by_order_then_label() {
        let params = DefineTemplate {
            step_id: 1,
            title: "Doc".to_string(),
            intro_text: String::new(),
            fields: vec![
                FieldDef {
                    label: "Zeta".to_string(),
                    kind: "short_text".to_string(),
                    order: 2,
                },
                FieldDef {
                    label: "Beta".to_string(),
                    kind: "short_text".to_string(),
                    order: 2,
                },
                FieldDef {
                    label: "Alpha".to_string(),
                    kind: "short_text".to_string(),
                    order: 5,
                },
                FieldDef {
                    label: "First".to_string(),
                    kind: "short_text".to_string(),
                    order: 1,
                },
            ],
        };
        let fields = params.validate().expect("should validate");
        let labels: Vec<&str> = fields.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["First", "Beta", "Zeta", "Alpha"]);
    }

    #[test]
    fn test_set_step_status_validate() {
        let params = SetStepStatus {
            id: 1,
            status: "done".to_string(),
            comment: Some("All evidence on file".to_string()),
        };
        assert_eq!(params.validate().unwrap(), StepStatus::Done);

        let params = SetStepStatus {
            id: 1,
            status: "blocked".to_string(),
            comment: None,
        };
        match params.validate().unwrap_err() {
            TrackerError::InvalidInput { field, reason } => {
                assert_eq!(field, "status");
                assert!(reason.contains("Invalid status: blocked"));
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_create_step_validate() {
        let params = CreateStep {
            number: 25,
            name: "Fatigue plan".to_string(),
            citation: Some("Res. 40595 art. 12".to_string()),
        };
        assert!(params.validate().is_ok());

        let params = CreateStep {
            number: 0,
            name: "Fatigue plan".to_string(),
            citation: None,
        };
        assert!(params.validate().is_err());

        let params = CreateStep {
            number: 1,
            name: "  ".to_string(),
            citation: None,
        };
        assert!(params.validate().is_err());
    }
}
