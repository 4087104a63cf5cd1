//! Error handling utilities for MCP server

use guardrail_core::TrackerError;
use rmcp::ErrorData;

/// Convert tracker errors to MCP errors, classing caller input defects as
/// invalid-params so clients can distinguish them from server failures.
pub fn to_mcp_error(message: &str, error: &TrackerError) -> ErrorData {
    let text = format!("{}: {}", message, error);
    if error.is_input_error() {
        ErrorData::invalid_params(text, None)
    } else {
        ErrorData::internal_error(text, None)
    }
}
