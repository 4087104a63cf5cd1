use guardrail_core::TrackerBuilder;
use tempfile::TempDir;

/// Helper function to create a test tracker backed by a temporary
/// database and evidence directory.
pub async fn create_test_tracker() -> (TempDir, guardrail_core::Tracker) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let tracker = TrackerBuilder::new()
        .with_database_path(Some(temp_dir.path().join("test.db")))
        .with_evidence_dir(Some(temp_dir.path().join("evidence")))
        .build()
        .await
        .expect("Failed to create tracker");
    (temp_dir, tracker)
}
