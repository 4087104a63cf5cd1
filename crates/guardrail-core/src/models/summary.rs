//! Program-wide compliance summary.

use serde::{Deserialize, Serialize};

use super::{Step, StepStatus};

/// Step counts per status plus the derived compliance percentage.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComplianceSummary {
    /// Total number of registered steps
    pub total_steps: u32,
    /// Steps in `Pending` status
    pub pending_steps: u32,
    /// Steps in `InProgress` status
    pub in_progress_steps: u32,
    /// Steps in `Done` status
    pub done_steps: u32,
    /// Steps in `Cancelled` status
    pub cancelled_steps: u32,
}

impl ComplianceSummary {
    /// Tally a summary from a slice of steps.
    pub fn from_steps(steps: &[Step]) -> Self {
        let mut summary = Self {
            total_steps: steps.len() as u32,
            ..Self::default()
        };
        for step in steps {
            match step.status {
                StepStatus::Pending => summary.pending_steps += 1,
                StepStatus::InProgress => summary.in_progress_steps += 1,
                StepStatus::Done => summary.done_steps += 1,
                StepStatus::Cancelled => summary.cancelled_steps += 1,
            }
        }
        summary
    }

    /// Share of steps in `Done` status, rounded to the nearest integer
    /// percentage. An empty registry is 0 percent, not an error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use guardrail_core::models::ComplianceSummary;
    ///
    /// let summary = ComplianceSummary {
    ///     total_steps: 4,
    ///     done_steps: 3,
    ///     pending_steps: 1,
    ///     ..Default::default()
    /// };
    /// assert_eq!(summary.percent_complete(), 75);
    /// assert_eq!(ComplianceSummary::default().percent_complete(), 0);
    /// ```
    pub fn percent_complete(&self) -> u8 {
        if self.total_steps == 0 {
            return 0;
        }
        (f64::from(self.done_steps) * 100.0 / f64::from(self.total_steps)).round() as u8
    }
}
