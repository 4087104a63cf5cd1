//! Unit tests for the domain models.

use std::str::FromStr;

use jiff::Timestamp;

use super::{ComplianceSummary, FieldKind, Provenance, Step, StepStatus};

fn step_with_status(id: u64, status: StepStatus) -> Step {
    Step {
        id,
        number: id as u32,
        name: format!("Step {id}"),
        citation: None,
        status,
        observation: None,
        evidence_count: 0,
        created_at: Timestamp::from_second(1_700_000_000).unwrap(),
        updated_at: Timestamp::from_second(1_700_000_000).unwrap(),
    }
}

#[test]
fn test_step_status_from_str() {
    assert_eq!(StepStatus::from_str("pending").unwrap(), StepStatus::Pending);
    assert_eq!(
        StepStatus::from_str("inprogress").unwrap(),
        StepStatus::InProgress
    );
    assert_eq!(
        StepStatus::from_str("in_progress").unwrap(),
        StepStatus::InProgress
    );
    assert_eq!(StepStatus::from_str("Done").unwrap(), StepStatus::Done);
    assert_eq!(
        StepStatus::from_str("cancelled").unwrap(),
        StepStatus::Cancelled
    );
    assert_eq!(
        StepStatus::from_str("canceled").unwrap(),
        StepStatus::Cancelled
    );
    assert!(StepStatus::from_str("archived").is_err());
}

#[test]
fn test_step_status_round_trip() {
    for status in [
        StepStatus::Pending,
        StepStatus::InProgress,
        StepStatus::Done,
        StepStatus::Cancelled,
    ] {
        assert_eq!(StepStatus::from_str(status.as_str()).unwrap(), status);
    }
}

#[test]
fn test_step_status_icons() {
    assert_eq!(StepStatus::Pending.with_icon(), "○ Pending");
    assert_eq!(StepStatus::InProgress.with_icon(), "➤ In Progress");
    assert_eq!(StepStatus::Done.with_icon(), "✓ Done");
    assert_eq!(StepStatus::Cancelled.with_icon(), "✗ Cancelled");
}

#[test]
fn test_transitions_from_active_states() {
    for from in [StepStatus::Pending, StepStatus::InProgress] {
        for to in [
            StepStatus::Pending,
            StepStatus::InProgress,
            StepStatus::Done,
            StepStatus::Cancelled,
        ] {
            if from == to {
                assert!(!from.can_transition_to(to), "{from:?} -> {to:?}");
            } else {
                assert!(from.can_transition_to(to), "{from:?} -> {to:?}");
            }
        }
    }
}

#[test]
fn test_no_transitions_out_of_terminal_states() {
    for from in [StepStatus::Done, StepStatus::Cancelled] {
        assert!(from.is_terminal());
        for to in [
            StepStatus::Pending,
            StepStatus::InProgress,
            StepStatus::Done,
            StepStatus::Cancelled,
        ] {
            assert!(!from.can_transition_to(to), "{from:?} -> {to:?}");
        }
    }
}

#[test]
fn test_provenance_round_trip() {
    assert_eq!(Provenance::from_str("manual").unwrap(), Provenance::Manual);
    assert_eq!(
        Provenance::from_str("generated").unwrap(),
        Provenance::Generated
    );
    assert!(Provenance::from_str("imported").is_err());
    assert_eq!(Provenance::Generated.as_str(), "generated");
}

#[test]
fn test_field_kind_from_str() {
    assert_eq!(
        FieldKind::from_str("short_text").unwrap(),
        FieldKind::ShortText
    );
    assert_eq!(FieldKind::from_str("short").unwrap(), FieldKind::ShortText);
    assert_eq!(FieldKind::from_str("date").unwrap(), FieldKind::Date);
    assert_eq!(
        FieldKind::from_str("long_text").unwrap(),
        FieldKind::LongText
    );
    assert!(FieldKind::from_str("number").is_err());
}

#[test]
fn test_compliance_summary_empty_registry() {
    let summary = ComplianceSummary::from_steps(&[]);
    assert_eq!(summary.total_steps, 0);
    assert_eq!(summary.percent_complete(), 0);
}

#[test]
fn test_compliance_summary_three_of_four_done() {
    let steps = vec![
        step_with_status(1, StepStatus::Done),
        step_with_status(2, StepStatus::Done),
        step_with_status(3, StepStatus::Done),
        step_with_status(4, StepStatus::InProgress),
    ];
    let summary = ComplianceSummary::from_steps(&steps);
    assert_eq!(summary.total_steps, 4);
    assert_eq!(summary.done_steps, 3);
    assert_eq!(summary.in_progress_steps, 1);
    assert_eq!(summary.percent_complete(), 75);
}

#[test]
fn test_compliance_summary_rounds_to_nearest() {
    let one_of_three = ComplianceSummary {
        total_steps: 3,
        done_steps: 1,
        pending_steps: 2,
        ..Default::default()
    };
    assert_eq!(one_of_three.percent_complete(), 33);

    let two_of_three = ComplianceSummary {
        total_steps: 3,
        done_steps: 2,
        pending_steps: 1,
        ..Default::default()
    };
    assert_eq!(two_of_three.percent_complete(), 67);
}

#[test]
fn test_compliance_summary_counts_all_statuses() {
    let steps = vec![
        step_with_status(1, StepStatus::Pending),
        step_with_status(2, StepStatus::InProgress),
        step_with_status(3, StepStatus::Done),
        step_with_status(4, StepStatus::Cancelled),
    ];
    let summary = ComplianceSummary::from_steps(&steps);
    assert_eq!(summary.pending_steps, 1);
    assert_eq!(summary.in_progress_steps, 1);
    assert_eq!(summary.done_steps, 1);
    assert_eq!(summary.cancelled_steps, 1);
    assert_eq!(summary.percent_complete(), 25);
}
