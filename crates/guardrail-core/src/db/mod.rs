//! Database operations and SQLite management for the compliance tracker.
//!
//! This module provides low-level database operations for steps, document
//! templates, and evidence metadata. It handles SQLite connections, schema
//! management, and specialized query interfaces per table family. All
//! check-then-act sequences (evidence precondition before a 'done'
//! transition, template replacement, evidence replacement) run inside a
//! single transaction so no caller can observe a half-applied state.

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use crate::error::{DatabaseResultExt, Result};

pub mod evidence_queries;
pub mod migrations;
pub mod step_queries;
pub mod template_queries;

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;
        connection
            .busy_timeout(Duration::from_secs(5))
            .db_context("Failed to set busy timeout")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}
