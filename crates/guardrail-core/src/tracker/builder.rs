//! Builder for creating and configuring Tracker instances.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::task;

use super::Tracker;
use crate::{
    db::Database,
    error::{Result, TrackerError},
    generator::{DocumentRenderer, MarkdownRenderer},
    storage::{BlobStore, FsBlobStore},
};

const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for creating and configuring Tracker instances.
pub struct TrackerBuilder {
    database_path: Option<PathBuf>,
    evidence_dir: Option<PathBuf>,
    renderer: Option<Arc<dyn DocumentRenderer>>,
    render_timeout: Duration,
}

impl TrackerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            database_path: None,
            evidence_dir: None,
            renderer: None,
            render_timeout: DEFAULT_RENDER_TIMEOUT,
        }
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/guardrail/guardrail.db` or
    /// `~/.local/share/guardrail/guardrail.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Sets a custom evidence directory for the built-in blob store.
    ///
    /// If not specified, uses `$XDG_DATA_HOME/guardrail/evidence`.
    pub fn with_evidence_dir<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.evidence_dir = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Replaces the built-in markdown renderer with another collaborator.
    pub fn with_renderer(mut self, renderer: Arc<dyn DocumentRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Bounds how long a single render call may take before the generation
    /// fails cleanly.
    pub fn with_render_timeout(mut self, timeout: Duration) -> Self {
        self.render_timeout = timeout;
        self
    }

    /// Builds the configured tracker instance.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::FileSystem` if the database path is invalid
    /// Returns `TrackerError::Database` if database initialization fails
    pub async fn build(self) -> Result<Tracker> {
        let db_path = if let Some(path) = self.database_path {
            path
        } else {
            Self::default_database_path()?
        };

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| TrackerError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let evidence_dir = if let Some(dir) = self.evidence_dir {
            dir
        } else {
            Self::default_evidence_dir()?
        };

        let db_path_clone = db_path.clone();
        task::spawn_blocking(move || {
            let _db = Database::new(&db_path_clone)?;
            Ok::<(), TrackerError>(())
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })??;

        let renderer = self
            .renderer
            .unwrap_or_else(|| Arc::new(MarkdownRenderer));
        let store: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(evidence_dir));

        Ok(Tracker::new(db_path, renderer, store, self.render_timeout))
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("guardrail")
            .place_data_file("guardrail.db")
            .map_err(|e| TrackerError::XdgDirectory(e.to_string()))
    }

    /// Returns the default evidence directory under the XDG data dir.
    fn default_evidence_dir() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("guardrail")
            .create_data_directory("evidence")
            .map_err(|e| TrackerError::XdgDirectory(e.to_string()))
    }
}

impl Default for TrackerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
