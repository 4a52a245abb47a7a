//! Application repository: SQL for the `applications` table.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::applications::validate::CheckedFields;
use crate::applications::Application;

use super::DatabaseError;

const SELECT_COLUMNS: &str = "SELECT id, company, title, link, applied_on, salary_min,
     salary_max, status_id, last_step_id, modality_id, last_updated, notes
     FROM applications";

fn from_row(row: &Row<'_>) -> Result<Application, rusqlite::Error> {
    Ok(Application {
        id: row.get("id")?,
        company: row.get("company")?,
        title: row.get("title")?,
        link: row.get("link")?,
        applied_on: row.get("applied_on")?,
        salary_min: row.get("salary_min")?,
        salary_max: row.get("salary_max")?,
        status: row.get("status_id")?,
        last_step: row.get("last_step_id")?,
        modality: row.get("modality_id")?,
        last_updated: row.get("last_updated")?,
        notes: row.get("notes")?,
    })
}

/// Returns every application, oldest id first.
pub fn list(conn: &Connection) -> Result<Vec<Application>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY id ASC", SELECT_COLUMNS))?;
    let rows = stmt
        .query_map([], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Finds an application by its id.
pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Application>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("{} WHERE id = ?1", SELECT_COLUMNS),
            params![id],
            from_row,
        )
        .optional()?;
    Ok(row)
}

/// Whether an application with this id exists.
pub fn exists(conn: &Connection, id: i64) -> Result<bool, DatabaseError> {
    let found = conn
        .query_row(
            "SELECT 1 FROM applications WHERE id = ?1",
            params![id],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    Ok(found)
}

/// Inserts a validated application and returns its new id.
pub fn insert(
    conn: &Connection,
    fields: &CheckedFields,
    last_updated: &str,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO applications (company, title, link, applied_on, salary_min, salary_max,
         status_id, last_step_id, modality_id, last_updated, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            fields.company,
            fields.title,
            fields.link,
            fields.applied_on,
            fields.salary_min,
            fields.salary_max,
            fields.status,
            fields.last_step,
            fields.modality,
            last_updated,
            fields.notes,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Replaces every column of an application except its id.
/// Returns the number of rows affected.
pub fn update(
    conn: &Connection,
    id: i64,
    fields: &CheckedFields,
    last_updated: &str,
) -> Result<usize, DatabaseError> {
    let affected = conn.execute(
        "UPDATE applications SET company = ?2, title = ?3, link = ?4, applied_on = ?5,
         salary_min = ?6, salary_max = ?7, status_id = ?8, last_step_id = ?9,
         modality_id = ?10, last_updated = ?11, notes = ?12
         WHERE id = ?1",
        params![
            id,
            fields.company,
            fields.title,
            fields.link,
            fields.applied_on,
            fields.salary_min,
            fields.salary_max,
            fields.status,
            fields.last_step,
            fields.modality,
            last_updated,
            fields.notes,
        ],
    )?;
    Ok(affected)
}

/// Deletes an application. Returns the number of rows affected.
pub fn delete(conn: &Connection, id: i64) -> Result<usize, DatabaseError> {
    let affected = conn.execute("DELETE FROM applications WHERE id = ?1", params![id])?;
    Ok(affected)
}
