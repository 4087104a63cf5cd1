use guardrail_core::{
    Database, FieldKind, FieldSchema, Provenance, StepStatus, TrackerError,
};
use tempfile::TempDir;

/// Helper function to create a temporary database
fn create_test_database() -> (TempDir, Database) {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let db_path = temp_dir.path().join("test.db");
    let db = Database::new(&db_path).expect("Failed to create database");
    (temp_dir, db)
}

fn sample_fields() -> Vec<FieldSchema> {
    vec![
        FieldSchema {
            label: "Responsible".to_string(),
            kind: FieldKind::ShortText,
            order: 1,
        },
        FieldSchema {
            label: "Review Date".to_string(),
            kind: FieldKind::Date,
            order: 2,
        },
    ]
}

#[test]
fn test_create_and_list_steps_ordered_by_number() {
    let (_temp_dir, mut db) = create_test_database();

    db.create_step(3, "Driver training", None).unwrap();
    db.create_step(1, "Safety policy", Some("Res. 40595 item 1"))
        .unwrap();
    db.create_step(2, "Risk assessment", None).unwrap();

    let steps = db.list_steps().unwrap();
    let numbers: Vec<u32> = steps.iter().map(|s| s.number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert!(steps.iter().all(|s| s.status == StepStatus::Pending));
    assert_eq!(steps[0].citation.as_deref(), Some("Res. 40595 item 1"));
}

#[test]
fn test_duplicate_step_number_is_rejected() {
    let (_temp_dir, mut db) = create_test_database();

    db.create_step(1, "Safety policy", None).unwrap();
    let err = db.create_step(1, "Shadow copy", None).unwrap_err();
    assert!(matches!(err, TrackerError::InvalidInput { .. }));

    assert_eq!(db.list_steps().unwrap().len(), 1);
}

#[test]
fn test_replace_template_swaps_fields_wholesale() {
    let (_temp_dir, mut db) = create_test_database();

    let step = db.create_step(25, "Fatigue plan", None).unwrap();
    let first = db
        .replace_template(step.id, "FATIGUE MANAGEMENT ACT", "Intro.", &sample_fields())
        .unwrap();
    assert_eq!(first.fields.len(), 2);

    let replacement = vec![FieldSchema {
        label: "Auditor".to_string(),
        kind: FieldKind::ShortText,
        order: 1,
    }];
    let second = db
        .replace_template(step.id, "FATIGUE MANAGEMENT ACT v2", "", &replacement)
        .unwrap();

    // Replacement is wholesale, not additive, and the creation time is
    // carried over from the first definition.
    let stored = db.get_template(step.id).unwrap().expect("template exists");
    assert_eq!(stored.title, "FATIGUE MANAGEMENT ACT v2");
    assert_eq!(stored.fields.len(), 1);
    assert_eq!(stored.fields[0].label, "Auditor");
    assert_eq!(second.created_at, first.created_at);
}

#[test]
fn test_get_template_returns_none_when_not_configured() {
    let (_temp_dir, mut db) = create_test_database();

    let step = db.create_step(1, "Safety policy", None).unwrap();
    assert!(db.get_template(step.id).unwrap().is_none());
}

#[test]
fn test_template_fields_sorted_by_order_then_label() {
    let (_temp_dir, mut db) = create_test_database();

    let step = db.create_step(1, "Safety policy", None).unwrap();
    let fields = vec![
        FieldSchema {
            label: "Zeta".to_string(),
            kind: FieldKind::ShortText,
            order: 2,
        },
        FieldSchema {
            label: "Alpha".to_string(),
            kind: FieldKind::ShortText,
            order: 2,
        },
        FieldSchema {
            label: "Omega".to_string(),
            kind: FieldKind::LongText,
            order: 1,
        },
    ];
    db.replace_template(step.id, "Doc", "", &fields).unwrap();

    let stored = db.get_template(step.id).unwrap().unwrap();
    let labels: Vec<&str> = stored.fields.iter().map(|f| f.label.as_str()).collect();
    assert_eq!(labels, vec!["Omega", "Alpha", "Zeta"]);
}

#[test]
fn test_done_transition_enforces_evidence_in_transaction() {
    let (_temp_dir, mut db) = create_test_database();

    let step = db.create_step(1, "Safety policy", None).unwrap();

    let err = db
        .set_step_status(step.id, StepStatus::Done, None)
        .unwrap_err();
    assert!(matches!(err, TrackerError::EvidenceRequired { .. }));

    db.insert_evidence(
        step.id,
        "record.pdf",
        "/tmp/record.pdf",
        Some("admin"),
        Provenance::Manual,
    )
    .unwrap();

    let done = db
        .set_step_status(step.id, StepStatus::Done, Some("Verified"))
        .unwrap();
    assert_eq!(done.status, StepStatus::Done);
    assert_eq!(done.observation.as_deref(), Some("Verified"));
    assert_eq!(done.evidence_count, 1);
}

#[test]
fn test_evidence_listed_newest_first() {
    let (_temp_dir, mut db) = create_test_database();

    let step = db.create_step(1, "Safety policy", None).unwrap();
    let first = db
        .insert_evidence(step.id, "a.pdf", "/tmp/a.pdf", None, Provenance::Manual)
        .unwrap();
    let second = db
        .insert_evidence(step.id, "b.pdf", "/tmp/b.pdf", None, Provenance::Generated)
        .unwrap();

    let listed = db.list_evidence(step.id).unwrap();
    assert_eq!(listed.len(), 2);
    // Same-timestamp rows fall back to id descending
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);
}

#[test]
fn test_replace_evidence_keeps_row_identity() {
    let (_temp_dir, mut db) = create_test_database();

    let step = db.create_step(1, "Safety policy", None).unwrap();
    let original = db
        .insert_evidence(
            step.id,
            "v1.pdf",
            "/tmp/v1.pdf",
            Some("admin"),
            Provenance::Manual,
        )
        .unwrap();

    let (updated, old_path) = db
        .replace_evidence(original.id, "v2.pdf", "/tmp/v2.pdf")
        .unwrap();
    assert_eq!(updated.id, original.id);
    assert_eq!(updated.filename, "v2.pdf");
    assert_eq!(updated.provenance, Provenance::Manual);
    assert_eq!(updated.uploaded_by.as_deref(), Some("admin"));
    assert_eq!(old_path, "/tmp/v1.pdf");

    assert_eq!(db.list_evidence(step.id).unwrap().len(), 1);
}

#[test]
fn test_delete_step_cascades_template_but_not_evidence() {
    let (_temp_dir, mut db) = create_test_database();

    let step = db.create_step(1, "Safety policy", None).unwrap();
    db.replace_template(step.id, "Doc", "", &sample_fields())
        .unwrap();
    let evidence = db
        .insert_evidence(step.id, "a.pdf", "/tmp/a.pdf", None, Provenance::Manual)
        .unwrap();

    // Evidence blocks deletion outright
    let err = db.delete_step(step.id).unwrap_err();
    assert!(matches!(err, TrackerError::StepHasEvidence { .. }));

    db.delete_evidence(evidence.id).unwrap();
    db.delete_step(step.id).unwrap();

    assert!(db.get_step(step.id).unwrap().is_none());
    assert!(db.get_template(step.id).unwrap().is_none());
}

#[test]
fn test_reopen_returns_terminal_step_to_pending() {
    let (_temp_dir, mut db) = create_test_database();

    let step = db.create_step(1, "Safety policy", None).unwrap();
    db.set_step_status(step.id, StepStatus::Cancelled, Some("Repealed"))
        .unwrap();

    let reopened = db.reopen_step(step.id).unwrap();
    assert_eq!(reopened.status, StepStatus::Pending);

    let err = db.reopen_step(step.id).unwrap_err();
    assert!(matches!(err, TrackerError::InvalidTransition { .. }));
}

#[test]
fn test_status_counts_cover_all_statuses() {
    let (_temp_dir, mut db) = create_test_database();

    let a = db.create_step(1, "A", None).unwrap();
    let b = db.create_step(2, "B", None).unwrap();
    db.create_step(3, "C", None).unwrap();

    db.insert_evidence(a.id, "a.pdf", "/tmp/a.pdf", None, Provenance::Manual)
        .unwrap();
    db.set_step_status(a.id, StepStatus::Done, None).unwrap();
    db.set_step_status(b.id, StepStatus::InProgress, None)
        .unwrap();

    let summary = db.status_counts().unwrap();
    assert_eq!(summary.total_steps, 3);
    assert_eq!(summary.done_steps, 1);
    assert_eq!(summary.in_progress_steps, 1);
    assert_eq!(summary.pending_steps, 1);
    assert_eq!(summary.percent_complete(), 33);
}

#[test]
fn test_database_reopens_existing_file() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let db_path = temp_dir.path().join("test.db");

    {
        let mut db = Database::new(&db_path).unwrap();
        db.create_step(1, "Safety policy", None).unwrap();
    }

    let db = Database::new(&db_path).unwrap();
    assert_eq!(db.list_steps().unwrap().len(), 1);
}
