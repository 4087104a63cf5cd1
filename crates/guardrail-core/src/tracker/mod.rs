//! High-level tracker API for the compliance program.
//!
//! This module provides the main [`Tracker`] interface. The tracker is the
//! central coordinator between interface layers and the database, and it
//! owns the two external collaborators the engine depends on: the document
//! renderer and the blob store.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  CLI / MCP      │    │    Tracker      │    │    Database     │
//! │  (interfaces)   │───▶│ (step_ops,      │───▶│   (via db/)     │
//! │                 │    │  template_ops,  │    │                 │
//! │                 │    │  evidence_ops,  │    └─────────────────┘
//! │                 │    │  generate_ops)  │───▶ renderer + store
//! └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: Factory for creating [`Tracker`] instances
//! - [`step_ops`]: Step registry and status transitions
//! - [`template_ops`]: Document template definition and retrieval
//! - [`evidence_ops`]: Evidence attach/replace/list/remove
//! - [`generate_ops`]: Document generation
//!
//! All operations are async: parameters are cloned into the closure and the
//! blocking SQLite work runs on the runtime's blocking pool. Check-then-act
//! sequences commit in one transaction, so per-step ordering guarantees
//! hold without any cross-step locking.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::{generator::DocumentRenderer, storage::BlobStore};

// Module declarations
pub mod builder;
pub mod evidence_ops;
pub mod generate_ops;
pub mod step_ops;
pub mod template_ops;

#[cfg(test)]
mod tests;

// Re-export the main types
pub use builder::TrackerBuilder;

/// Main tracker interface for managing compliance steps, templates, and
/// evidence.
pub struct Tracker {
    pub(crate) db_path: PathBuf,
    pub(crate) renderer: Arc<dyn DocumentRenderer>,
    pub(crate) store: Arc<dyn BlobStore>,
    pub(crate) render_timeout: Duration,
}

impl Tracker {
    /// Creates a new tracker over the given database and collaborators.
    pub(crate) fn new(
        db_path: PathBuf,
        renderer: Arc<dyn DocumentRenderer>,
        store: Arc<dyn BlobStore>,
        render_timeout: Duration,
    ) -> Self {
        Self {
            db_path,
            renderer,
            store,
            render_timeout,
        }
    }
}
