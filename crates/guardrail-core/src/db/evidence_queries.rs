//! Evidence metadata queries.
//!
//! Only metadata lives here; the file bytes themselves are the blob
//! store's business. Replacement keeps the row's identity so references
//! held elsewhere stay valid.

use jiff::Timestamp;
use rusqlite::{params, types::Type, OptionalExtension};

use crate::{
    error::{DatabaseResultExt, Result, TrackerError},
    models::{Evidence, Provenance},
};

const CHECK_STEP_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM steps WHERE id = ?1)";
const INSERT_EVIDENCE_SQL: &str = "INSERT INTO evidence (step_id, filename, storage_path, uploaded_by, provenance, uploaded_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const SELECT_EVIDENCE_SQL: &str = "SELECT id, step_id, filename, storage_path, uploaded_by, provenance, uploaded_at FROM evidence WHERE id = ?1";
const SELECT_EVIDENCE_BY_STEP_SQL: &str = "SELECT id, step_id, filename, storage_path, uploaded_by, provenance, uploaded_at FROM evidence WHERE step_id = ?1 ORDER BY uploaded_at DESC, id DESC";
const UPDATE_EVIDENCE_SQL: &str =
    "UPDATE evidence SET filename = ?1, storage_path = ?2, uploaded_at = ?3 WHERE id = ?4";
const DELETE_EVIDENCE_SQL: &str = "DELETE FROM evidence WHERE id = ?1";

impl super::Database {
    /// Helper function to construct an Evidence record from a database row
    fn build_evidence_from_row(row: &rusqlite::Row) -> rusqlite::Result<Evidence> {
        let provenance_str: String = row.get(5)?;
        let provenance = provenance_str.parse::<Provenance>().map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                5,
                Type::Text,
                format!("Invalid provenance: {provenance_str}").into(),
            )
        })?;

        Ok(Evidence {
            id: row.get::<_, i64>(0)? as u64,
            step_id: row.get::<_, i64>(1)? as u64,
            filename: row.get(2)?,
            storage_path: row.get(3)?,
            uploaded_by: row.get(4)?,
            provenance,
            uploaded_at: row.get::<_, String>(6)?.parse::<Timestamp>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e))
            })?,
        })
    }

    /// Records a new evidence file for a step.
    pub fn insert_evidence(
        &mut self,
        step_id: u64,
        filename: &str,
        storage_path: &str,
        uploaded_by: Option<&str>,
        provenance: Provenance,
    ) -> Result<Evidence> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let step_exists: bool = tx
            .query_row(CHECK_STEP_EXISTS_SQL, params![step_id as i64], |row| {
                row.get(0)
            })
            .map_err(|e| TrackerError::database_error("Failed to check step existence", e))?;

        if !step_exists {
            return Err(TrackerError::StepNotFound { id: step_id });
        }

        let now = Timestamp::now();
        tx.execute(
            INSERT_EVIDENCE_SQL,
            params![
                step_id as i64,
                filename,
                storage_path,
                uploaded_by,
                provenance.as_str(),
                now.to_string()
            ],
        )
        .map_err(|e| TrackerError::database_error("Failed to insert evidence", e))?;

        let id = tx.last_insert_rowid() as u64;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(Evidence {
            id,
            step_id,
            filename: filename.into(),
            storage_path: storage_path.into(),
            uploaded_by: uploaded_by.map(String::from),
            provenance,
            uploaded_at: now,
        })
    }

    /// Retrieves a single evidence record by its ID.
    pub fn get_evidence(&self, evidence_id: u64) -> Result<Option<Evidence>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_EVIDENCE_SQL)
            .map_err(|e| TrackerError::database_error("Failed to prepare query", e))?;

        let evidence = stmt
            .query_row(params![evidence_id as i64], Self::build_evidence_from_row)
            .optional()
            .map_err(|e| TrackerError::database_error("Failed to get evidence", e))?;

        Ok(evidence)
    }

    /// Retrieves all evidence for a step, newest upload first.
    pub fn list_evidence(&self, step_id: u64) -> Result<Vec<Evidence>> {
        let step_exists: bool = self
            .connection
            .query_row(CHECK_STEP_EXISTS_SQL, params![step_id as i64], |row| {
                row.get(0)
            })
            .map_err(|e| TrackerError::database_error("Failed to check step existence", e))?;

        if !step_exists {
            return Err(TrackerError::StepNotFound { id: step_id });
        }

        let mut stmt = self
            .connection
            .prepare(SELECT_EVIDENCE_BY_STEP_SQL)
            .map_err(|e| TrackerError::database_error("Failed to prepare query", e))?;

        let evidence = stmt
            .query_map(params![step_id as i64], Self::build_evidence_from_row)
            .map_err(|e| TrackerError::database_error("Failed to query evidence", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| TrackerError::database_error("Failed to fetch evidence", e))?;

        Ok(evidence)
    }

    /// Points an existing evidence record at replacement content.
    ///
    /// The record keeps its ID, step, uploader, and provenance; filename,
    /// storage path, and timestamp are updated. Returns the updated record
    /// together with the superseded storage path so the caller can discard
    /// the old bytes.
    pub fn replace_evidence(
        &mut self,
        evidence_id: u64,
        filename: &str,
        storage_path: &str,
    ) -> Result<(Evidence, String)> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let previous = tx
            .query_row(
                SELECT_EVIDENCE_SQL,
                params![evidence_id as i64],
                Self::build_evidence_from_row,
            )
            .optional()
            .map_err(|e| TrackerError::database_error("Failed to query evidence", e))?
            .ok_or(TrackerError::EvidenceNotFound { id: evidence_id })?;

        let now = Timestamp::now();
        tx.execute(
            UPDATE_EVIDENCE_SQL,
            params![filename, storage_path, now.to_string(), evidence_id as i64],
        )
        .map_err(|e| TrackerError::database_error("Failed to update evidence", e))?;

        tx.commit().db_context("Failed to commit transaction")?;

        let old_path = previous.storage_path.clone();
        Ok((
            Evidence {
                filename: filename.into(),
                storage_path: storage_path.into(),
                uploaded_at: now,
                ..previous
            },
            old_path,
        ))
    }

    /// Removes an evidence record and returns it so the caller can discard
    /// the stored bytes.
    pub fn delete_evidence(&mut self, evidence_id: u64) -> Result<Evidence> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let evidence = tx
            .query_row(
                SELECT_EVIDENCE_SQL,
                params![evidence_id as i64],
                Self::build_evidence_from_row,
            )
            .optional()
            .map_err(|e| TrackerError::database_error("Failed to query evidence", e))?
            .ok_or(TrackerError::EvidenceNotFound { id: evidence_id })?;

        tx.execute(DELETE_EVIDENCE_SQL, params![evidence_id as i64])
            .map_err(|e| TrackerError::database_error("Failed to delete evidence", e))?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(evidence)
    }
}
