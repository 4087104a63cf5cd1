//! Document generation for the Tracker.
//!
//! Generation runs in two phases. The first phase is read-only: it
//! snapshots the step and its template, binds the answers, and renders the
//! bytes, all under the render timeout, so a slow or hung renderer fails
//! the call with nothing written. The second phase persists the bytes and
//! the evidence metadata as a unit. A template redefinition committed
//! between the phases only affects later calls; this call completes
//! against the snapshot it already rendered from.

use std::sync::Arc;

use log::{debug, warn};
use tokio::{task, time::timeout};

use super::Tracker;
use crate::{
    db::Database,
    error::{Result, TrackerError},
    generator::{build_content, document_filename},
    models::{GeneratedDocument, Provenance},
    params::GenerateDocument,
};

impl Tracker {
    /// Generates a document from the step's template and the supplied
    /// answers, recording the result as generated evidence.
    ///
    /// Exactly one evidence record is created per successful call; any
    /// failure (unknown step, unconfigured template, missing or malformed
    /// answers, renderer failure or timeout) leaves no partial state.
    pub async fn generate_document(&self, params: &GenerateDocument) -> Result<GeneratedDocument> {
        debug!("generate_document: step {}", params.step_id);

        let db_path = self.db_path.clone();
        let renderer = Arc::clone(&self.renderer);
        let step_id = params.step_id;
        let answers = params.answers.clone();

        // Phase 1: snapshot, bind, render. No writes happen here.
        let render_phase = task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            let step = db
                .get_step(step_id)?
                .ok_or(TrackerError::StepNotFound { id: step_id })?;
            let template = db
                .get_template(step_id)?
                .ok_or(TrackerError::TemplateNotConfigured { step_id })?;
            let content = build_content(&template, &answers)?;
            let bytes = renderer.render(&content)?;
            let filename = document_filename(&step);
            Ok::<_, TrackerError>((bytes, filename))
        });

        let (bytes, filename) = match timeout(self.render_timeout, render_phase).await {
            Ok(joined) => joined.map_err(|e| TrackerError::Configuration {
                message: format!("Task join error: {e}"),
            })??,
            Err(_) => {
                return Err(TrackerError::Render {
                    message: format!(
                        "Rendering timed out after {} second(s)",
                        self.render_timeout.as_secs()
                    ),
                })
            }
        };

        // Phase 2: persist bytes and metadata as a unit.
        let db_path = self.db_path.clone();
        let store = Arc::clone(&self.store);
        let uploaded_by = params.uploaded_by.clone();

        task::spawn_blocking(move || {
            let path = store.save(&bytes, &filename)?;
            let mut db = Database::new(&db_path)?;
            let inserted = db.insert_evidence(
                step_id,
                &filename,
                &path,
                uploaded_by.as_deref(),
                Provenance::Generated,
            );
            match inserted {
                Ok(evidence) => {
                    let step = db
                        .get_step(step_id)?
                        .ok_or(TrackerError::StepNotFound { id: step_id })?;
                    Ok(GeneratedDocument { step, evidence })
                }
                Err(e) => {
                    if let Err(cleanup) = store.delete(&path) {
                        warn!("Failed to discard orphaned generated document: {cleanup}");
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
}
