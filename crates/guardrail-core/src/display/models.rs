//! Display implementations for domain models.
//!
//! All output is markdown for rich terminal display, with status icons and
//! structured sections kept consistent across contexts.

use std::fmt;

use super::LocalDateTime;
use crate::models::{
    ComplianceSummary, Evidence, FieldKind, Provenance, Step, StepStatus, TemplateDefinition,
};

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Manual => write!(f, "manual upload"),
            Provenance::Generated => write!(f, "generated"),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::ShortText => write!(f, "short text"),
            FieldKind::Date => write!(f, "date"),
            FieldKind::LongText => write!(f, "long text"),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "### {}. {} ({})",
            self.number,
            self.name,
            self.status.with_icon()
        )?;
        writeln!(f)?;

        if let Some(citation) = &self.citation {
            writeln!(f, "- Citation: {citation}")?;
        }
        writeln!(f, "- Evidence: {} file(s)", self.evidence_count)?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;

        if let Some(observation) = &self.observation {
            writeln!(f)?;
            writeln!(f, "> {observation}")?;
        }
        writeln!(f)?;

        Ok(())
    }
}

impl fmt::Display for TemplateDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## {}", self.title)?;
        writeln!(f)?;

        if !self.intro_text.is_empty() {
            writeln!(f, "{}", self.intro_text)?;
            writeln!(f)?;
        }

        writeln!(f, "### Fields")?;
        writeln!(f)?;
        for field in &self.fields {
            writeln!(f, "- {}. {} ({})", field.order, field.label, field.kind)?;
        }
        writeln!(f)?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;

        Ok(())
    }
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### {}. {} ({})", self.id, self.filename, self.provenance)?;
        writeln!(f)?;

        writeln!(f, "- Uploaded: {}", LocalDateTime(&self.uploaded_at))?;
        if let Some(uploader) = &self.uploaded_by {
            writeln!(f, "- By: {uploader}")?;
        }
        writeln!(f, "- Path: {}", self.storage_path)?;
        writeln!(f)?;

        Ok(())
    }
}

impl fmt::Display for ComplianceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Compliance Status")?;
        writeln!(f)?;
        writeln!(f, "- Steps: {}", self.total_steps)?;
        writeln!(f, "- {} {}", StepStatus::Pending.with_icon(), self.pending_steps)?;
        writeln!(
            f,
            "- {} {}",
            StepStatus::InProgress.with_icon(),
            self.in_progress_steps
        )?;
        writeln!(f, "- {} {}", StepStatus::Done.with_icon(), self.done_steps)?;
        writeln!(
            f,
            "- {} {}",
            StepStatus::Cancelled.with_icon(),
            self.cancelled_steps
        )?;
        writeln!(f)?;
        writeln!(f, "**Completion: {}%**", self.percent_complete())?;

        Ok(())
    }
}
