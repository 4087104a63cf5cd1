//! Error types for the compliance tracker library.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::StepStatus;

/// Comprehensive error type for all tracker operations.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Step not found for the given ID
    #[error("Step with ID {id} not found")]
    StepNotFound { id: u64 },
    /// Evidence record not found for the given ID
    #[error("Evidence with ID {id} not found")]
    EvidenceNotFound { id: u64 },
    /// No document template has been defined for the step.
    ///
    /// This is an expected condition, not a defect: steps without a template
    /// are completed through manual evidence uploads instead.
    #[error("Step {step_id} has no document template configured")]
    TemplateNotConfigured { step_id: u64 },
    /// A declared template field received no value at generation time
    #[error("Missing value for field '{label}'")]
    MissingField { label: String },
    /// A field value does not match its declared kind
    #[error("Invalid value for field '{label}': {reason}")]
    InvalidFieldValue { label: String, reason: String },
    /// A step cannot be marked done without at least one evidence record
    #[error("Step {step_id} cannot be marked done: no evidence is attached")]
    EvidenceRequired { step_id: u64 },
    /// Disallowed status transition
    #[error("Cannot transition step from '{from}' to '{to}'")]
    InvalidTransition { from: StepStatus, to: StepStatus },
    /// Step deletion blocked while evidence references it
    #[error("Step {id} still has {count} evidence record(s) attached and cannot be deleted")]
    StepHasEvidence { id: u64, count: u32 },
    /// Document renderer collaborator failure
    #[error("Render error: {message}")]
    Render { message: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl TrackerError {
    /// Creates a database error with query-site context.
    pub fn database_error(message: &str, source: rusqlite::Error) -> Self {
        Self::Database {
            message: message.to_string(),
            source,
        }
    }

    /// Creates an input validation error for a named field.
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error describes defective caller input rather than an
    /// internal failure. Interface layers use this to pick the right
    /// protocol-level error class.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::StepNotFound { .. }
                | Self::EvidenceNotFound { .. }
                | Self::TemplateNotConfigured { .. }
                | Self::MissingField { .. }
                | Self::InvalidFieldValue { .. }
                | Self::EvidenceRequired { .. }
                | Self::InvalidTransition { .. }
                | Self::StepHasEvidence { .. }
                | Self::InvalidInput { .. }
        )
    }
}

/// Extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| TrackerError::database_error(message, e))
    }
}

/// Result type alias for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;
