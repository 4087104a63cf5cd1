//! Status and provenance enumerations for steps and evidence.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type-safe enumeration of compliance step statuses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Step has not been started
    #[default]
    Pending,

    /// Step is being worked on
    InProgress,

    /// Step has been completed with evidence attached
    Done,

    /// Step was abandoned and no longer counts toward compliance
    Cancelled,
}

impl FromStr for StepStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(StepStatus::Pending),
            "inprogress" | "in_progress" => Ok(StepStatus::InProgress),
            "done" => Ok(StepStatus::Done),
            "cancelled" | "canceled" => Ok(StepStatus::Cancelled),
            _ => Err(format!("Invalid step status: {s}")),
        }
    }
}

impl StepStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::InProgress => "inprogress",
            StepStatus::Done => "done",
            StepStatus::Cancelled => "cancelled",
        }
    }

    /// Whether the status ends the step's lifecycle. Terminal steps only
    /// leave their state through the privileged reopen operation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Done | StepStatus::Cancelled)
    }

    /// Whether the normal transition operation may move a step from `self`
    /// to `next`.
    ///
    /// `Pending` and `InProgress` may move freely between each other and
    /// into either terminal state. Terminal states admit no outgoing edge
    /// here, and a transition must actually change the status.
    ///
    /// The evidence precondition for entering [`StepStatus::Done`] is
    /// enforced separately, inside the status-update transaction.
    pub fn can_transition_to(self, next: StepStatus) -> bool {
        !self.is_terminal() && self != next
    }

    /// Get status with consistent icon formatting for display.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use guardrail_core::models::StepStatus;
    ///
    /// assert_eq!(StepStatus::Done.with_icon(), "✓ Done");
    /// assert_eq!(StepStatus::Pending.with_icon(), "○ Pending");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            StepStatus::Pending => "○ Pending",
            StepStatus::InProgress => "➤ In Progress",
            StepStatus::Done => "✓ Done",
            StepStatus::Cancelled => "✗ Cancelled",
        }
    }
}

/// How an evidence record came to exist.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Uploaded by an operator
    Manual,

    /// Produced by the document generator
    Generated,
}

impl FromStr for Provenance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(Provenance::Manual),
            "generated" => Ok(Provenance::Generated),
            _ => Err(format!("Invalid provenance: {s}")),
        }
    }
}

impl Provenance {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Manual => "manual",
            Provenance::Generated => "generated",
        }
    }
}
