//! Collection wrapper types for displaying groups of domain objects.
//!
//! Newtype wrappers give collections a Display implementation with graceful
//! empty-state handling, so list output stays uniform across the CLI and
//! MCP surfaces.

use std::{fmt, ops::Index};

use crate::models::{Evidence, Step};

/// Newtype wrapper for displaying the step registry.
pub struct Steps(pub Vec<Step>);

impl Steps {
    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of steps in the collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Get a reference to the step at the given index.
    pub fn get(&self, index: usize) -> Option<&Step> {
        self.0.get(index)
    }

    /// Get an iterator over the steps.
    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.0.iter()
    }
}

impl Index<usize> for Steps {
    type Output = Step;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IntoIterator for Steps {
    type Item = Step;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Steps {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Steps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            writeln!(f, "No steps registered.")
        } else {
            for step in &self.0 {
                write!(f, "{}", step)?;
            }
            Ok(())
        }
    }
}

/// Newtype wrapper for displaying a step's evidence records.
#[derive(Debug)]
pub struct EvidenceList(pub Vec<Evidence>);

impl EvidenceList {
    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of evidence records in the collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Get a reference to the evidence record at the given index.
    pub fn get(&self, index: usize) -> Option<&Evidence> {
        self.0.get(index)
    }

    /// Get an iterator over the evidence records.
    pub fn iter(&self) -> std::slice::Iter<'_, Evidence> {
        self.0.iter()
    }
}

impl Index<usize> for EvidenceList {
    type Output = Evidence;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IntoIterator for EvidenceList {
    type Item = Evidence;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a EvidenceList {
    type Item = &'a Evidence;
    type IntoIter = std::slice::Iter<'a, Evidence>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for EvidenceList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            writeln!(f, "No evidence attached.")
        } else {
            for evidence in &self.0 {
                write!(f, "{}", evidence)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::models::{Provenance, StepStatus};

    fn create_test_step() -> Step {
        Step {
            id: 1,
            number: 25,
            name: "Fatigue plan".to_string(),
            citation: Some("Res. 40595 art. 12".to_string()),
            status: StepStatus::Pending,
            observation: None,
            evidence_count: 0,
            created_at: Timestamp::from_second(1_700_000_000).unwrap(),
            updated_at: Timestamp::from_second(1_700_000_000).unwrap(),
        }
    }

    fn create_test_evidence() -> Evidence {
        Evidence {
            id: 7,
            step_id: 1,
            filename: "inspection.pdf".to_string(),
            storage_path: "/var/evidence/inspection.pdf".to_string(),
            uploaded_by: Some("jperez".to_string()),
            provenance: Provenance::Manual,
            uploaded_at: Timestamp::from_second(1_700_000_000).unwrap(),
        }
    }

    #[test]
    fn test_steps_display_empty() {
        let steps = Steps(vec![]);
        assert_eq!(format!("{}", steps), "No steps registered.\n");
    }

    #[test]
    fn test_steps_display_with_entries() {
        let mut second = create_test_step();
        second.id = 2;
        second.number = 26;
        second.name = "Speed policy".to_string();
        second.status = StepStatus::Done;

        let steps = Steps(vec![create_test_step(), second]);
        let output = format!("{}", steps);

        assert!(output.contains("### 25. Fatigue plan"));
        assert!(output.contains("### 26. Speed policy"));
        assert!(output.contains("○ Pending"));
        assert!(output.contains("✓ Done"));
        assert!(output.contains("Res. 40595 art. 12"));
    }

    #[test]
    fn test_evidence_list_display_empty() {
        let evidence = EvidenceList(vec![]);
        assert_eq!(format!("{}", evidence), "No evidence attached.\n");
    }

    #[test]
    fn test_evidence_list_display_with_entries() {
        let evidence = EvidenceList(vec![create_test_evidence()]);
        let output = format!("{}", evidence);

        assert!(output.contains("inspection.pdf"));
        assert!(output.contains("manual upload"));
        assert!(output.contains("jperez"));
    }
}
