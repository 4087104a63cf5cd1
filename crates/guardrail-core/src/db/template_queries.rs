//! Document template persistence.
//!
//! A step owns at most one template. Redefinition is replace-by-delete
//! inside a single transaction, never an append, so readers see either the
//! old definition or the new one in full.

use jiff::Timestamp;
use rusqlite::{params, types::Type, OptionalExtension};

use crate::{
    error::{DatabaseResultExt, Result, TrackerError},
    models::{FieldKind, FieldSchema, TemplateDefinition},
};

const CHECK_STEP_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM steps WHERE id = ?1)";
const DELETE_TEMPLATE_SQL: &str = "DELETE FROM templates WHERE step_id = ?1";
const SELECT_TEMPLATE_CREATED_SQL: &str = "SELECT created_at FROM templates WHERE step_id = ?1";
const INSERT_TEMPLATE_SQL: &str = "INSERT INTO templates (step_id, title, intro_text, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)";
const INSERT_FIELD_SQL: &str =
    "INSERT INTO template_fields (template_id, label, kind, field_order) VALUES (?1, ?2, ?3, ?4)";
const SELECT_TEMPLATE_SQL: &str =
    "SELECT id, step_id, title, intro_text, created_at, updated_at FROM templates WHERE step_id = ?1";
const SELECT_FIELDS_SQL: &str = "SELECT label, kind, field_order FROM template_fields WHERE template_id = ?1 ORDER BY field_order, label";

impl super::Database {
    fn build_field_from_row(row: &rusqlite::Row) -> rusqlite::Result<FieldSchema> {
        let kind_str: String = row.get(1)?;
        let kind = kind_str.parse::<FieldKind>().map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                1,
                Type::Text,
                format!("Invalid field kind: {kind_str}").into(),
            )
        })?;

        Ok(FieldSchema {
            label: row.get(0)?,
            kind,
            order: row.get::<_, i64>(2)? as u32,
        })
    }

    /// Replaces the step's template definition atomically.
    ///
    /// Any previous definition (and its fields) is removed in the same
    /// transaction that writes the new one. The original creation time is
    /// carried over so the template's age survives redefinition.
    pub fn replace_template(
        &mut self,
        step_id: u64,
        title: &str,
        intro_text: &str,
        fields: &[FieldSchema],
    ) -> Result<TemplateDefinition> {
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

        let previous_created_at: Option<String> = tx
            .query_row(
                SELECT_TEMPLATE_CREATED_SQL,
                params![step_id as i64],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| TrackerError::database_error("Failed to query previous template", e))?;

        tx.execute(DELETE_TEMPLATE_SQL, params![step_id as i64])
            .map_err(|e| TrackerError::database_error("Failed to remove previous template", e))?;

        let now = Timestamp::now();
        let created_at = match previous_created_at {
            Some(ts) => ts
                .parse::<Timestamp>()
                .map_err(|e| TrackerError::Configuration {
                    message: format!("Invalid template timestamp: {e}"),
                })?,
            None => now,
        };

        tx.execute(
            INSERT_TEMPLATE_SQL,
            params![
                step_id as i64,
                title,
                intro_text,
                created_at.to_string(),
                now.to_string()
            ],
        )
        .map_err(|e| TrackerError::database_error("Failed to insert template", e))?;

        let template_id = tx.last_insert_rowid() as u64;

        for field in fields {
            tx.execute(
                INSERT_FIELD_SQL,
                params![
                    template_id as i64,
                    &field.label,
                    field.kind.as_str(),
                    i64::from(field.order)
                ],
            )
            .map_err(|e| TrackerError::database_error("Failed to insert template field", e))?;
        }

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(TemplateDefinition {
            id: template_id,
            step_id,
            title: title.into(),
            intro_text: intro_text.into(),
            fields: fields.to_vec(),
            created_at,
            updated_at: now,
        })
    }

    /// Retrieves the step's template definition, fields sorted by
    /// (order, label). `None` means the step has no template configured,
    /// which is a normal state, not an error.
    pub fn get_template(&self, step_id: u64) -> Result<Option<TemplateDefinition>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_TEMPLATE_SQL)
            .map_err(|e| TrackerError::database_error("Failed to prepare query", e))?;

        let header = stmt
            .query_row(params![step_id as i64], |row| {
                Ok((
                    row.get::<_, i64>(0)? as u64,
                    row.get::<_, i64>(1)? as u64,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })
            .optional()
            .map_err(|e| TrackerError::database_error("Failed to get template", e))?;

        let Some((id, step_id, title, intro_text, created_str, updated_str)) = header else {
            return Ok(None);
        };

        let mut stmt = self
            .connection
            .prepare(SELECT_FIELDS_SQL)
            .map_err(|e| TrackerError::database_error("Failed to prepare query", e))?;

        let fields = stmt
            .query_map(params![id as i64], Self::build_field_from_row)
            .map_err(|e| TrackerError::database_error("Failed to query template fields", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| TrackerError::database_error("Failed to fetch template fields", e))?;

        let created_at = created_str
            .parse::<Timestamp>()
            .map_err(|e| TrackerError::Configuration {
                message: format!("Invalid template timestamp: {e}"),
            })?;
        let updated_at = updated_str
            .parse::<Timestamp>()
            .map_err(|e| TrackerError::Configuration {
                message: format!("Invalid template timestamp: {e}"),
            })?;

        Ok(Some(TemplateDefinition {
            id,
            step_id,
            title,
            intro_text,
            fields,
            created_at,
            updated_at,
        }))
    }
}
