//! Document template operations for the Tracker.

use log::debug;
use tokio::task;

use super::Tracker;
use crate::{
    db::Database,
    error::{Result, TrackerError},
    models::TemplateDefinition,
    params::{DefineTemplate, Id},
};

impl Tracker {
    /// Defines (or redefines) the document template for a step.
    ///
    /// The previous definition, if any, is replaced atomically; the
    /// operation is idempotent-by-replace, never additive. A generation
    /// already in flight keeps the snapshot it started with.
    pub async fn define_template(&self, params: &DefineTemplate) -> Result<TemplateDefinition> {
        let fields = params.validate()?;
        debug!(
            "define_template: step {} with {} field(s)",
            params.step_id,
            fields.len()
        );

        let db_path = self.db_path.clone();
        let step_id = params.step_id;
        let title = params.title.clone();
        let intro_text = params.intro_text.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.replace_template(step_id, &title, &intro_text, &fields)
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Retrieves the template configured for a step.
    ///
    /// `Ok(None)` means "not configured", a normal state, since steps can
    /// be completed through manual evidence uploads without ever defining
    /// a template.
    pub async fn get_template(&self, params: &Id) -> Result<Option<TemplateDefinition>> {
        let db_path = self.db_path.clone();
        let step_id = params.id;

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.get_template(step_id)
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }
}
