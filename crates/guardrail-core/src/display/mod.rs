//! Display formatting functions and result types.
//!
//! Domain models implement `Display` directly (in [`models`]) and produce
//! markdown; the wrapper types here add context (collections with empty
//! states, operation results with confirmation headers) so the same data
//! can be formatted differently in lists, creation confirmations, and
//! status messages while staying consistent across the CLI and MCP
//! surfaces.
//!
//! ## Module Organization
//!
//! - [`collections`]: Collection wrapper types (Steps, EvidenceList)
//! - [`results`]: Operation result types (CreateResult, UpdateResult,
//!   DeleteResult, GenerateResult)
//! - [`models`]: Display implementations for domain models

use std::fmt;

use jiff::{tz::TimeZone, Timestamp};

pub mod collections;
pub mod models;
pub mod results;

// Re-export commonly used types for convenience
pub use collections::{EvidenceList, Steps};
pub use results::{CreateResult, DeleteResult, GenerateResult, UpdateResult};

/// A wrapper around `Timestamp` that formats in the system timezone via
/// the `Display` trait.
///
/// The display format follows the pattern `YYYY-MM-DD HH:MM:SS TZ`.
pub struct LocalDateTime<'a>(pub &'a Timestamp);

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .to_zoned(TimeZone::system())
                .strftime("%Y-%m-%d %H:%M:%S %Z")
        )
    }
}

/// Wrapper type for displaying operation confirmation messages.
pub struct OperationStatus {
    pub message: String,
    pub success: bool,
}

impl OperationStatus {
    /// Create a new success status.
    pub fn success(message: String) -> Self {
        Self {
            message,
            success: true,
        }
    }

    /// Create a new failure status.
    pub fn failure(message: String) -> Self {
        Self {
            message,
            success: false,
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {}",
            if self.success { "Success:" } else { "Error:" },
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_status_display() {
        let success = OperationStatus::success("Step registered".to_string());
        assert!(format!("{success}").contains("Success:"));

        let failure = OperationStatus::failure("Step missing".to_string());
        assert!(format!("{failure}").contains("Error:"));
    }
}
