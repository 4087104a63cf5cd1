//! Evidence operations for the Tracker.
//!
//! The blob write and the metadata insert are treated as a unit: a failed
//! insert discards the bytes just written, so no evidence row ever points
//! at content that is not on disk and no orphan file survives a failed
//! attach.

use std::sync::Arc;

use log::{debug, warn};
use tokio::task;

use super::Tracker;
use crate::{
    db::Database,
    display::EvidenceList,
    error::{Result, TrackerError},
    models::{Evidence, Provenance},
    params::{AttachEvidence, Id, ReplaceEvidence},
};

impl Tracker {
    /// Manually attaches an evidence file to a step.
    pub async fn attach_evidence(&self, params: &AttachEvidence) -> Result<Evidence> {
        params.validate()?;
        debug!(
            "attach_evidence: step {} file '{}' ({} bytes)",
            params.step_id,
            params.filename,
            params.contents.len()
        );

        let db_path = self.db_path.clone();
        let store = Arc::clone(&self.store);
        let step_id = params.step_id;
        let filename = params.filename.clone();
        let contents = params.contents.clone();
        let uploaded_by = params.uploaded_by.clone();

        task::spawn_blocking(move || {
            let path = store.save(&contents, &filename)?;
            let mut db = Database::new(&db_path)?;
            match db.insert_evidence(
                step_id,
                &filename,
                &path,
                uploaded_by.as_deref(),
                Provenance::Manual,
            ) {
                Ok(evidence) => Ok(evidence),
                Err(e) => {
                    if let Err(cleanup) = store.delete(&path) {
                        warn!("Failed to discard orphaned evidence file: {cleanup}");
                    }
                    Err(e)
                }
            }
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Retrieves all evidence for a step, newest upload first.
    pub async fn list_evidence(&self, params: &Id) -> Result<EvidenceList> {
        let db_path = self.db_path.clone();
        let step_id = params.id;

        let evidence = task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.list_evidence(step_id)
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })??;

        Ok(EvidenceList(evidence))
    }

    /// Replaces the content of an existing evidence record while keeping
    /// its identity, so references held elsewhere stay valid.
    pub async fn replace_evidence(&self, params: &ReplaceEvidence) -> Result<Evidence> {
        params.validate()?;
        debug!(
            "replace_evidence: record {} with '{}'",
            params.evidence_id, params.filename
        );

        let db_path = self.db_path.clone();
        let store = Arc::clone(&self.store);
        let evidence_id = params.evidence_id;
        let filename = params.filename.clone();
        let contents = params.contents.clone();

        task::spawn_blocking(move || {
            let new_path = store.save(&contents, &filename)?;
            let mut db = Database::new(&db_path)?;
            match db.replace_evidence(evidence_id, &filename, &new_path) {
                Ok((evidence, old_path)) => {
                    if let Err(cleanup) = store.delete(&old_path) {
                        warn!("Failed to discard superseded evidence file: {cleanup}");
                    }
                    Ok(evidence)
                }
                Err(e) => {
                    if let Err(cleanup) = store.delete(&new_path) {
                        warn!("Failed to discard orphaned evidence file: {cleanup}");
                    }
                    Err(e)
                }
            }
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Removes an evidence record and its stored bytes.
    pub async fn remove_evidence(&self, params: &Id) -> Result<Evidence> {
        let db_path = self.db_path.clone();
        let store = Arc::clone(&self.store);
        let evidence_id = params.id;

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            let evidence = db.delete_evidence(evidence_id)?;
            if let Err(cleanup) = store.delete(&evidence.storage_path) {
                warn!("Failed to discard removed evidence file: {cleanup}");
            }
            Ok(evidence)
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Reads back the stored bytes of an evidence record, for export.
    pub async fn read_evidence(&self, params: &Id) -> Result<(Evidence, Vec<u8>)> {
        let db_path = self.db_path.clone();
        let store = Arc::clone(&self.store);
        let evidence_id = params.id;

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            let evidence = db
                .get_evidence(evidence_id)?
                .ok_or(TrackerError::EvidenceNotFound { id: evidence_id })?;
            let bytes = store.open(&evidence.storage_path)?;
            Ok((evidence, bytes))
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }
}
