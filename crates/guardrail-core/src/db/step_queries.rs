//! Step registry queries and the status state machine.

use jiff::Timestamp;
use rusqlite::{params, types::Type, OptionalExtension};

use crate::{
    error::{DatabaseResultExt, Result, TrackerError},
    models::{ComplianceSummary, Step, StepStatus},
};

// SQL queries as const strings for compile-time optimization
const STEP_COLUMNS: &str = "id, number, name, citation, status, observation, created_at, updated_at, \
    (SELECT COUNT(*) FROM evidence e WHERE e.step_id = steps.id)";
const CHECK_NUMBER_TAKEN_SQL: &str = "SELECT EXISTS(SELECT 1 FROM steps WHERE number = ?1)";
const INSERT_STEP_SQL: &str = "INSERT INTO steps (number, name, citation, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const SELECT_STEP_STATUS_SQL: &str = "SELECT status FROM steps WHERE id = ?1";
const UPDATE_STEP_DETAILS_SQL: &str =
    "UPDATE steps SET name = ?1, citation = ?2, updated_at = ?3 WHERE id = ?4";
const UPDATE_STEP_STATUS_SQL: &str = "UPDATE steps SET status = ?1, observation = COALESCE(?2, observation), updated_at = ?3 WHERE id = ?4";
const COUNT_STEP_EVIDENCE_SQL: &str = "SELECT COUNT(*) FROM evidence WHERE step_id = ?1";
const DELETE_STEP_SQL: &str = "DELETE FROM steps WHERE id = ?1";
const STATUS_COUNTS_SQL: &str = "SELECT status, COUNT(*) FROM steps GROUP BY status";

impl super::Database {
    /// Helper function to construct a Step from a database row
    fn build_step_from_row(row: &rusqlite::Row) -> rusqlite::Result<Step> {
        let status_str: String = row.get(4)?;
        let status = status_str.parse::<StepStatus>().map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                Type::Text,
                format!("Invalid status: {status_str}").into(),
            )
        })?;

        Ok(Step {
            id: row.get::<_, i64>(0)? as u64,
            number: row.get::<_, i64>(1)? as u32,
            name: row.get(2)?,
            citation: row.get(3)?,
            status,
            observation: row.get(5)?,
            evidence_count: row.get::<_, i64>(8)? as u32,
            created_at: row.get::<_, String>(6)?.parse::<Timestamp>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e))
            })?,
            updated_at: row.get::<_, String>(7)?.parse::<Timestamp>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e))
            })?,
        })
    }

    /// Registers a new compliance step. Steps start in `Pending` status.
    pub fn create_step(
        &mut self,
        number: u32,
        name: &str,
        citation: Option<&str>,
    ) -> Result<Step> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let number_taken: bool = tx
            .query_row(CHECK_NUMBER_TAKEN_SQL, params![i64::from(number)], |row| {
                row.get(0)
            })
            .map_err(|e| TrackerError::database_error("Failed to check step number", e))?;

        if number_taken {
            return Err(TrackerError::invalid_input(
                "number",
                format!("Step number {number} is already in use"),
            ));
        }

        let now = Timestamp::now();
        let now_str = now.to_string();

        tx.execute(
            INSERT_STEP_SQL,
            params![
                i64::from(number),
                name,
                citation,
                StepStatus::Pending.as_str(),
                &now_str,
                &now_str
            ],
        )
        .map_err(|e| TrackerError::database_error("Failed to insert step", e))?;

        let id = tx.last_insert_rowid() as u64;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(Step {
            id,
            number,
            name: name.into(),
            citation: citation.map(String::from),
            status: StepStatus::Pending,
            observation: None,
            evidence_count: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Retrieves all steps ordered by their ordinal number.
    pub fn list_steps(&self) -> Result<Vec<Step>> {
        let sql = format!("SELECT {STEP_COLUMNS} FROM steps ORDER BY number");
        let mut stmt = self
            .connection
            .prepare(&sql)
            .map_err(|e| TrackerError::database_error("Failed to prepare query", e))?;

        let steps = stmt
            .query_map([], Self::build_step_from_row)
            .map_err(|e| TrackerError::database_error("Failed to query steps", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| TrackerError::database_error("Failed to fetch steps", e))?;

        Ok(steps)
    }

    /// Retrieves a single step by its ID.
    pub fn get_step(&self, step_id: u64) -> Result<Option<Step>> {
        let sql = format!("SELECT {STEP_COLUMNS} FROM steps WHERE id = ?1");
        let mut stmt = self
            .connection
            .prepare(&sql)
            .map_err(|e| TrackerError::database_error("Failed to prepare query", e))?;

        let step = stmt
            .query_row(params![step_id as i64], Self::build_step_from_row)
            .optional()
            .map_err(|e| TrackerError::database_error("Failed to get step", e))?;

        Ok(step)
    }

    /// Updates a step's name and/or citation without touching its status.
    pub fn update_step_details(
        &mut self,
        step_id: u64,
        name: Option<&str>,
        citation: Option<&str>,
    ) -> Result<Step> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let sql = format!("SELECT {STEP_COLUMNS} FROM steps WHERE id = ?1");
        let current = tx
            .query_row(&sql, params![step_id as i64], Self::build_step_from_row)
            .optional()
            .map_err(|e| TrackerError::database_error("Failed to get step", e))?
            .ok_or(TrackerError::StepNotFound { id: step_id })?;

        let new_name = name.unwrap_or(&current.name).to_string();
        let new_citation = citation
            .map(String::from)
            .or_else(|| current.citation.clone());
        let now_str = Timestamp::now().to_string();

        tx.execute(
            UPDATE_STEP_DETAILS_SQL,
            params![&new_name, &new_citation, &now_str, step_id as i64],
        )
        .map_err(|e| TrackerError::database_error("Failed to update step", e))?;

        let step = tx
            .query_row(&sql, params![step_id as i64], Self::build_step_from_row)
            .map_err(|e| TrackerError::database_error("Failed to query updated step", e))?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(step)
    }

    /// Transitions a step's status, enforcing the state machine and the
    /// evidence precondition for `Done` in one transaction.
    ///
    /// The evidence-exists check and the status write commit together, so
    /// two racing callers cannot both observe "no evidence yet" and still
    /// complete the step.
    pub fn set_step_status(
        &mut self,
        step_id: u64,
        status: StepStatus,
        comment: Option<&str>,
    ) -> Result<Step> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let current_str: String = tx
            .query_row(SELECT_STEP_STATUS_SQL, params![step_id as i64], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| TrackerError::database_error("Failed to query step status", e))?
            .ok_or(TrackerError::StepNotFound { id: step_id })?;

        let current = current_str
            .parse::<StepStatus>()
            .map_err(|reason| TrackerError::Configuration { message: reason })?;

        if !current.can_transition_to(status) {
            return Err(TrackerError::InvalidTransition {
                from: current,
                to: status,
            });
        }

        if status == StepStatus::Done {
            let evidence_count: i64 = tx
                .query_row(COUNT_STEP_EVIDENCE_SQL, params![step_id as i64], |row| {
                    row.get(0)
                })
                .map_err(|e| TrackerError::database_error("Failed to count evidence", e))?;

            if evidence_count == 0 {
                return Err(TrackerError::EvidenceRequired { step_id });
            }
        }

        let now_str = Timestamp::now().to_string();
        tx.execute(
            UPDATE_STEP_STATUS_SQL,
            params![status.as_str(), comment, &now_str, step_id as i64],
        )
        .map_err(|e| TrackerError::database_error("Failed to update step status", e))?;

        let sql = format!("SELECT {STEP_COLUMNS} FROM steps WHERE id = ?1");
        let step = tx
            .query_row(&sql, params![step_id as i64], Self::build_step_from_row)
            .map_err(|e| TrackerError::database_error("Failed to query updated step", e))?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(step)
    }

    /// Returns a terminal (`Done` or `Cancelled`) step to `Pending`.
    ///
    /// This is the privileged administrative escape hatch; the normal
    /// transition operation never leaves a terminal state.
    pub fn reopen_step(&mut self, step_id: u64) -> Result<Step> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let current_str: String = tx
            .query_row(SELECT_STEP_STATUS_SQL, params![step_id as i64], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| TrackerError::database_error("Failed to query step status", e))?
            .ok_or(TrackerError::StepNotFound { id: step_id })?;

        let current = current_str
            .parse::<StepStatus>()
            .map_err(|reason| TrackerError::Configuration { message: reason })?;

        if !current.is_terminal() {
            return Err(TrackerError::InvalidTransition {
                from: current,
                to: StepStatus::Pending,
            });
        }

        let now_str = Timestamp::now().to_string();
        tx.execute(
            UPDATE_STEP_STATUS_SQL,
            params![
                StepStatus::Pending.as_str(),
                None::<String>,
                &now_str,
                step_id as i64
            ],
        )
        .map_err(|e| TrackerError::database_error("Failed to reopen step", e))?;

        let sql = format!("SELECT {STEP_COLUMNS} FROM steps WHERE id = ?1");
        let step = tx
            .query_row(&sql, params![step_id as i64], Self::build_step_from_row)
            .map_err(|e| TrackerError::database_error("Failed to query reopened step", e))?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(step)
    }

    /// Removes a step from the registry.
    ///
    /// Deletion is blocked while evidence records reference the step; the
    /// step's template (if any) is removed by cascade.
    pub fn delete_step(&mut self, step_id: u64) -> Result<Step> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let step = {
            let sql = format!("SELECT {STEP_COLUMNS} FROM steps WHERE id = ?1");
            tx.query_row(&sql, params![step_id as i64], Self::build_step_from_row)
                .optional()
                .map_err(|e| TrackerError::database_error("Failed to query step", e))?
                .ok_or(TrackerError::StepNotFound { id: step_id })?
        };

        if step.evidence_count > 0 {
            return Err(TrackerError::StepHasEvidence {
                id: step_id,
                count: step.evidence_count,
            });
        }

        tx.execute(DELETE_STEP_SQL, params![step_id as i64])
            .map_err(|e| TrackerError::database_error("Failed to delete step", e))?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(step)
    }

    /// Tallies the registry into per-status counts.
    pub fn status_counts(&self) -> Result<ComplianceSummary> {
        let mut stmt = self
            .connection
            .prepare(STATUS_COUNTS_SQL)
            .map_err(|e| TrackerError::database_error("Failed to prepare query", e))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .map_err(|e| TrackerError::database_error("Failed to query status counts", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| TrackerError::database_error("Failed to fetch status counts", e))?;

        let mut summary = ComplianceSummary::default();
        for (status_str, count) in rows {
            let count = count as u32;
            summary.total_steps += count;
            match status_str.parse::<StepStatus>() {
                Ok(StepStatus::Pending) => summary.pending_steps += count,
                Ok(StepStatus::InProgress) => summary.in_progress_steps += count,
                Ok(StepStatus::Done) => summary.done_steps += count,
                Ok(StepStatus::Cancelled) => summary.cancelled_steps += count,
                Err(reason) => return Err(TrackerError::Configuration { message: reason }),
            }
        }

        Ok(summary)
    }
}
