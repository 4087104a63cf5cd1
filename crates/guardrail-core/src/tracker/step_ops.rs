//! Step registry and status operations for the Tracker.

use log::debug;
use tokio::task;

use super::Tracker;
use crate::{
    db::Database,
    display::Steps,
    error::{Result, TrackerError},
    models::{ComplianceSummary, Step},
    params::{CreateStep, Id, SetStepStatus, UpdateStep},
};

impl Tracker {
    /// Registers a new compliance step. New steps start `Pending`.
    pub async fn create_step(&self, params: &CreateStep) -> Result<Step> {
        params.validate()?;

        let db_path = self.db_path.clone();
        let number = params.number;
        let name = params.name.clone();
        let citation = params.citation.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.create_step(number, &name, citation.as_deref())
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Retrieves the full registry, ordered by step number.
    pub async fn list_steps(&self) -> Result<Steps> {
        let db_path = self.db_path.clone();

        let steps = task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.list_steps()
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })??;

        Ok(Steps(steps))
    }

    /// Retrieves a single step by its ID.
    pub async fn get_step(&self, params: &Id) -> Result<Option<Step>> {
        let db_path = self.db_path.clone();
        let step_id = params.id;

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.get_step(step_id)
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Updates a step's name and/or citation.
    pub async fn update_step(&self, params: &UpdateStep) -> Result<Step> {
        params.validate()?;

        let db_path = self.db_path.clone();
        let step_id = params.id;
        let name = params.name.clone();
        let citation = params.citation.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.update_step_details(step_id, name.as_deref(), citation.as_deref())
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Transitions a step's status with an optional observation.
    ///
    /// Transitions into `Done` require at least one evidence record; the
    /// check and the write commit atomically.
    pub async fn set_step_status(&self, params: &SetStepStatus) -> Result<Step> {
        let status = params.validate()?;
        debug!("set_step_status: step {} -> {}", params.id, status);

        let db_path = self.db_path.clone();
        let step_id = params.id;
        let comment = params.comment.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.set_step_status(step_id, status, comment.as_deref())
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Returns a completed or cancelled step to `Pending`.
    ///
    /// This is the privileged administrative reopen; the normal transition
    /// operation never leaves a terminal state.
    pub async fn reopen_step(&self, params: &Id) -> Result<Step> {
        let db_path = self.db_path.clone();
        let step_id = params.id;

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.reopen_step(step_id)
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Removes a step from the registry. Blocked while evidence exists.
    pub async fn delete_step(&self, params: &Id) -> Result<Step> {
        let db_path = self.db_path.clone();
        let step_id = params.id;

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.delete_step(step_id)
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Tallies the registry into per-status counts and the completion
    /// percentage.
    pub async fn compliance_summary(&self) -> Result<ComplianceSummary> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.status_counts()
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }
}
