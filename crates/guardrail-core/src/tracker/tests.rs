//! Tests for tracker operations.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use crate::{
    error::TrackerError,
    generator::{DocumentContent, DocumentRenderer},
    params::{
        AttachEvidence, CreateStep, DefineTemplate, FieldDef, GenerateDocument, Id, ReplaceEvidence,
        SetStepStatus,
    },
    Tracker, TrackerBuilder,
};

async fn create_test_tracker() -> (TempDir, Tracker) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let tracker = TrackerBuilder::new()
        .with_database_path(Some(temp_dir.path().join("test.db")))
        .with_evidence_dir(Some(temp_dir.path().join("evidence")))
        .build()
        .await
        .expect("Failed to create tracker");
    (temp_dir, tracker)
}

async fn register_fatigue_step(tracker: &Tracker) -> u64 {
    let step = tracker
        .create_step(&CreateStep {
            number: 25,
            name: "Fatigue plan".to_string(),
            citation: Some("Res. 40595 art. 12".to_string()),
        })
        .await
        .expect("Failed to create step");
    step.id
}

fn fatigue_template(step_id: u64) -> DefineTemplate {
    DefineTemplate {
        step_id,
        title: "FATIGUE MANAGEMENT ACT".to_string(),
        intro_text: "Reviewed under the road safety program.".to_string(),
        fields: vec![
            FieldDef {
                label: "Responsible".to_string(),
                kind: "short_text".to_string(),
                order: 1,
            },
            FieldDef {
                label: "Review Date".to_string(),
                kind: "date".to_string(),
                order: 2,
            },
        ],
    }
}

fn fatigue_answers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Responsible".to_string(), "J. Perez".to_string()),
        ("Review Date".to_string(), "2025-03-01".to_string()),
    ])
}

#[tokio::test]
async fn test_generate_document_creates_one_evidence_record() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let step_id = register_fatigue_step(&tracker).await;

    tracker
        .define_template(&fatigue_template(step_id))
        .await
        .expect("Failed to define template");

    let document = tracker
        .generate_document(&GenerateDocument {
            step_id,
            answers: fatigue_answers(),
            uploaded_by: Some("jperez".to_string()),
        })
        .await
        .expect("Generation should succeed");

    assert_eq!(document.step.evidence_count, 1);
    assert!(!document.evidence.storage_path.is_empty());
    assert!(document.evidence.filename.starts_with("step-25-fatigue-plan-"));

    let (_evidence, bytes) = tracker
        .read_evidence(&Id {
            id: document.evidence.id,
        })
        .await
        .expect("Failed to read generated document");
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("# FATIGUE MANAGEMENT ACT"));
    assert!(text.contains("- **Responsible**: J. Perez"));
    assert!(text.contains("- **Review Date**: 2025-03-01"));
}

#[tokio::test]
async fn test_generate_document_missing_field_leaves_no_evidence() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let step_id = register_fatigue_step(&tracker).await;

    tracker
        .define_template(&fatigue_template(step_id))
        .await
        .expect("Failed to define template");

    let mut answers = fatigue_answers();
    answers.remove("Review Date");

    let err = tracker
        .generate_document(&GenerateDocument {
            step_id,
            answers,
            uploaded_by: None,
        })
        .await
        .unwrap_err();
    match err {
        TrackerError::MissingField { label } => assert_eq!(label, "Review Date"),
        other => panic!("Expected MissingField, got {other:?}"),
    }

    let evidence = tracker.list_evidence(&Id { id: step_id }).await.unwrap();
    assert!(evidence.is_empty());
}

#[tokio::test]
async fn test_generate_document_invalid_date() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let step_id = register_fatigue_step(&tracker).await;

    tracker
        .define_template(&fatigue_template(step_id))
        .await
        .expect("Failed to define template");

    let mut answers = fatigue_answers();
    answers.insert("Review Date".to_string(), "soon".to_string());

    let err = tracker
        .generate_document(&GenerateDocument {
            step_id,
            answers,
            uploaded_by: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::InvalidFieldValue { .. }));
}

#[tokio::test]
async fn test_generate_document_rejects_undeclared_answer() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let step_id = register_fatigue_step(&tracker).await;

    tracker
        .define_template(&fatigue_template(step_id))
        .await
        .expect("Failed to define template");

    let mut answers = fatigue_answers();
    answers.insert("Extra".to_string(), "value".to_string());

    let err = tracker
        .generate_document(&GenerateDocument {
            step_id,
            answers,
            uploaded_by: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::InvalidInput { .. }));
}

#[tokio::test]
async fn test_generate_document_without_template() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let step_id = register_fatigue_step(&tracker).await;

    let err = tracker
        .generate_document(&GenerateDocument {
            step_id,
            answers: fatigue_answers(),
            uploaded_by: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TrackerError::TemplateNotConfigured { step_id: id } if id == step_id
    ));
}

#[tokio::test]
async fn test_get_template_not_configured_is_none() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let step_id = register_fatigue_step(&tracker).await;

    let template = tracker.get_template(&Id { id: step_id }).await.unwrap();
    assert!(template.is_none());
}

#[tokio::test]
async fn test_done_requires_evidence() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let step_id = register_fatigue_step(&tracker).await;

    let err = tracker
        .set_step_status(&SetStepStatus {
            id: step_id,
            status: "done".to_string(),
            comment: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::EvidenceRequired { .. }));

    tracker
        .attach_evidence(&AttachEvidence {
            step_id,
            filename: "signed-plan.pdf".to_string(),
            contents: b"%PDF-1.4 fake".to_vec(),
            uploaded_by: Some("admin".to_string()),
        })
        .await
        .expect("Failed to attach evidence");

    let step = tracker
        .set_step_status(&SetStepStatus {
            id: step_id,
            status: "done".to_string(),
            comment: Some("Verified against the statutory checklist".to_string()),
        })
        .await
        .expect("Transition should succeed once evidence exists");
    assert_eq!(step.status.as_str(), "done");
    assert_eq!(
        step.observation.as_deref(),
        Some("Verified against the statutory checklist")
    );
}

#[tokio::test]
async fn test_generated_evidence_satisfies_done_precondition() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let step_id = register_fatigue_step(&tracker).await;

    tracker
        .define_template(&fatigue_template(step_id))
        .await
        .unwrap();
    tracker
        .generate_document(&GenerateDocument {
            step_id,
            answers: fatigue_answers(),
            uploaded_by: None,
        })
        .await
        .unwrap();

    let step = tracker
        .set_step_status(&SetStepStatus {
            id: step_id,
            status: "done".to_string(),
            comment: None,
        })
        .await
        .expect("Generated evidence should satisfy the precondition");
    assert_eq!(step.status.as_str(), "done");
}

#[tokio::test]
async fn test_replace_evidence_preserves_identity_and_count() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let step_id = register_fatigue_step(&tracker).await;

    let original = tracker
        .attach_evidence(&AttachEvidence {
            step_id,
            filename: "plan-v1.pdf".to_string(),
            contents: b"first draft".to_vec(),
            uploaded_by: Some("admin".to_string()),
        })
        .await
        .unwrap();

    let replaced = tracker
        .replace_evidence(&ReplaceEvidence {
            evidence_id: original.id,
            filename: "plan-v2.pdf".to_string(),
            contents: b"corrected".to_vec(),
        })
        .await
        .expect("Replace should succeed");

    assert_eq!(replaced.id, original.id);
    assert_eq!(replaced.filename, "plan-v2.pdf");
    assert_ne!(replaced.storage_path, original.storage_path);
    assert_eq!(replaced.uploaded_by, original.uploaded_by);

    let evidence = tracker.list_evidence(&Id { id: step_id }).await.unwrap();
    assert_eq!(evidence.len(), 1, "Replace must not add a record");

    let (_evidence, bytes) = tracker.read_evidence(&Id { id: original.id }).await.unwrap();
    assert_eq!(bytes, b"corrected");
}

#[tokio::test]
async fn test_redefining_template_keeps_prior_evidence() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let step_id = register_fatigue_step(&tracker).await;

    tracker
        .define_template(&fatigue_template(step_id))
        .await
        .unwrap();
    let first = tracker
        .generate_document(&GenerateDocument {
            step_id,
            answers: fatigue_answers(),
            uploaded_by: None,
        })
        .await
        .unwrap();

    // Redefine with a different schema; the earlier document is history.
    tracker
        .define_template(&DefineTemplate {
            step_id,
            title: "FATIGUE MANAGEMENT ACT v2".to_string(),
            intro_text: String::new(),
            fields: vec![FieldDef {
                label: "Auditor".to_string(),
                kind: "short_text".to_string(),
                order: 1,
            }],
        })
        .await
        .unwrap();

    let (_evidence, bytes) = tracker
        .read_evidence(&Id {
            id: first.evidence.id,
        })
        .await
        .expect("Prior evidence must survive redefinition");
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("# FATIGUE MANAGEMENT ACT"));
    assert!(text.contains("J. Perez"));

    let second = tracker
        .generate_document(&GenerateDocument {
            step_id,
            answers: BTreeMap::from([("Auditor".to_string(), "M. Gomez".to_string())]),
            uploaded_by: None,
        })
        .await
        .expect("Generation against the new schema should succeed");
    assert_eq!(second.step.evidence_count, 2);
}

#[tokio::test]
async fn test_delete_step_blocked_while_evidence_exists() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let step_id = register_fatigue_step(&tracker).await;

    let evidence = tracker
        .attach_evidence(&AttachEvidence {
            step_id,
            filename: "plan.pdf".to_string(),
            contents: b"bytes".to_vec(),
            uploaded_by: None,
        })
        .await
        .unwrap();

    let err = tracker.delete_step(&Id { id: step_id }).await.unwrap_err();
    assert!(matches!(
        err,
        TrackerError::StepHasEvidence { count: 1, .. }
    ));

    tracker
        .remove_evidence(&Id { id: evidence.id })
        .await
        .unwrap();
    tracker
        .delete_step(&Id { id: step_id })
        .await
        .expect("Deletion should succeed once evidence is gone");
    assert!(tracker.get_step(&Id { id: step_id }).await.unwrap().is_none());
}

#[tokio::test]
async fn test_reopen_step() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let step_id = register_fatigue_step(&tracker).await;

    // Reopening a non-terminal step is invalid.
    let err = tracker.reopen_step(&Id { id: step_id }).await.unwrap_err();
    assert!(matches!(err, TrackerError::InvalidTransition { .. }));

    tracker
        .attach_evidence(&AttachEvidence {
            step_id,
            filename: "plan.pdf".to_string(),
            contents: b"bytes".to_vec(),
            uploaded_by: None,
        })
        .await
        .unwrap();
    tracker
        .set_step_status(&SetStepStatus {
            id: step_id,
            status: "done".to_string(),
            comment: None,
        })
        .await
        .unwrap();

    let reopened = tracker
        .reopen_step(&Id { id: step_id })
        .await
        .expect("Reopen should succeed for a terminal step");
    assert_eq!(reopened.status.as_str(), "pending");
}

#[tokio::test]
async fn test_duplicate_step_number_rejected() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    register_fatigue_step(&tracker).await;

    let err = tracker
        .create_step(&CreateStep {
            number: 25,
            name: "Another plan".to_string(),
            citation: None,
        })
        .await
        .unwrap_err();
    match err {
        TrackerError::InvalidInput { field, reason } => {
            assert_eq!(field, "number");
            assert!(reason.contains("already in use"));
        }
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

struct FailingRenderer;

impl DocumentRenderer for FailingRenderer {
    fn render(&self, _content: &DocumentContent) -> crate::Result<Vec<u8>> {
        Err(TrackerError::Render {
            message: "engine unavailable".to_string(),
        })
    }
}

#[tokio::test]
async fn test_render_failure_leaves_no_evidence() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let tracker = TrackerBuilder::new()
        .with_database_path(Some(temp_dir.path().join("test.db")))
        .with_evidence_dir(Some(temp_dir.path().join("evidence")))
        .with_renderer(Arc::new(FailingRenderer))
        .build()
        .await
        .expect("Failed to create tracker");

    let step_id = register_fatigue_step(&tracker).await;
    tracker
        .define_template(&fatigue_template(step_id))
        .await
        .unwrap();

    let err = tracker
        .generate_document(&GenerateDocument {
            step_id,
            answers: fatigue_answers(),
            uploaded_by: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::Render { .. }));

    let evidence = tracker.list_evidence(&Id { id: step_id }).await.unwrap();
    assert!(evidence.is_empty());
}

struct SlowRenderer;

impl DocumentRenderer for SlowRenderer {
    fn render(&self, _content: &DocumentContent) -> crate::Result<Vec<u8>> {
        std::thread::sleep(Duration::from_millis(500));
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_render_timeout_leaves_no_evidence() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let tracker = TrackerBuilder::new()
        .with_database_path(Some(temp_dir.path().join("test.db")))
        .with_evidence_dir(Some(temp_dir.path().join("evidence")))
        .with_renderer(Arc::new(SlowRenderer))
        .with_render_timeout(Duration::from_millis(50))
        .build()
        .await
        .expect("Failed to create tracker");

    let step_id = register_fatigue_step(&tracker).await;
    tracker
        .define_template(&fatigue_template(step_id))
        .await
        .unwrap();

    let err = tracker
        .generate_document(&GenerateDocument {
            step_id,
            answers: fatigue_answers(),
            uploaded_by: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::Render { .. }));

    let evidence = tracker.list_evidence(&Id { id: step_id }).await.unwrap();
    assert!(evidence.is_empty());
}
