//! Evidence metadata models.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{Provenance, Step};

/// Metadata for one file attached to a step.
///
/// The bytes themselves live behind the blob store; the engine only tracks
/// where they are and where they came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evidence {
    /// Unique identifier for the evidence record
    pub id: u64,

    /// ID of the step the file is attached to
    pub step_id: u64,

    /// Original filename as presented to users
    pub filename: String,

    /// Opaque storage path issued by the blob store
    pub storage_path: String,

    /// Identity of the uploader, when known
    pub uploaded_by: Option<String>,

    /// Whether the file was uploaded manually or generated
    pub provenance: Provenance,

    /// Timestamp of the upload or generation (UTC)
    pub uploaded_at: Timestamp,
}

/// Result of a successful document generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedDocument {
    /// The step the document belongs to, with its refreshed evidence count
    pub step: Step,

    /// The evidence record created for the generated file
    pub evidence: Evidence,
}
