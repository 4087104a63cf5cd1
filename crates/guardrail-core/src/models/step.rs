//! Step model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::StepStatus;

/// One mandatory compliance requirement in the program checklist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    /// Unique identifier for the step
    pub id: u64,

    /// Ordinal number defining display and execution order (unique)
    pub number: u32,

    /// Short name of the requirement
    pub name: String,

    /// Regulatory citation backing the requirement (free text)
    pub citation: Option<String>,

    /// Current lifecycle status
    pub status: StepStatus,

    /// Comment attached on the most recent status transition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,

    /// Number of evidence records attached to the step (derived)
    pub evidence_count: u32,

    /// Timestamp when the step was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the step was last updated (UTC)
    pub updated_at: Timestamp,
}
