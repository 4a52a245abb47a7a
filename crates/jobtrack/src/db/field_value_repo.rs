//! Field value repository: SQL for the `field_values` table.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::values::{FieldType, FieldValue, PriorityGroup};

use super::DatabaseError;

/// Usage count for a value, depending on which application column its type
/// is referenced from.
const SELECT_WITH_USAGE: &str = "SELECT fv.id, fv.type, fv.key, fv.label, fv.color, fv.sort_order,
        fv.priority_group, fv.is_active, fv.created_at, fv.updated_at,
        (CASE fv.type
            WHEN 'status' THEN (SELECT COUNT(1) FROM applications a WHERE a.status_id = fv.id)
            WHEN 'last_step' THEN (SELECT COUNT(1) FROM applications a WHERE a.last_step_id = fv.id)
            WHEN 'modality' THEN (SELECT COUNT(1) FROM applications a WHERE a.modality_id = fv.id)
         END) AS usage_count
     FROM field_values fv";

/// Column values for a new row.
#[derive(Debug, Clone)]
pub struct NewFieldValueRow<'a> {
    pub field_type: FieldType,
    pub key: &'a str,
    pub label: &'a str,
    pub color: Option<&'a str>,
    pub sort_order: i64,
    pub priority_group: Option<PriorityGroup>,
    pub is_active: bool,
    pub created_at: &'a str,
}

fn from_row(row: &Row<'_>) -> Result<FieldValue, rusqlite::Error> {
    Ok(FieldValue {
        id: row.get("id")?,
        field_type: row.get("type")?,
        key: row.get("key")?,
        label: row.get("label")?,
        color: row.get("color")?,
        sort_order: row.get("sort_order")?,
        priority_group: row.get("priority_group")?,
        is_active: row.get("is_active")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        usage_count: row.get("usage_count")?,
    })
}

/// Lists values of one type ordered by `sort_order`, then `label`.
pub fn list_by_type(
    conn: &Connection,
    field_type: FieldType,
    active_only: bool,
) -> Result<Vec<FieldValue>, DatabaseError> {
    let sql = format!(
        "{} WHERE fv.type = ?1 {} ORDER BY fv.sort_order ASC, fv.label ASC",
        SELECT_WITH_USAGE,
        if active_only { "AND fv.is_active = 1" } else { "" }
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![field_type], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Finds a value by id, including its usage count.
pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<FieldValue>, DatabaseError> {
    let sql = format!("{} WHERE fv.id = ?1", SELECT_WITH_USAGE);
    let row = conn.query_row(&sql, params![id], from_row).optional()?;
    Ok(row)
}

/// Whether another value of `field_type` already uses `label` or `key`.
pub fn label_or_key_taken(
    conn: &Connection,
    field_type: FieldType,
    label: &str,
    key: &str,
) -> Result<bool, DatabaseError> {
    let taken = conn
        .query_row(
            "SELECT 1 FROM field_values WHERE type = ?1 AND (label = ?2 OR key = ?3) LIMIT 1",
            params![field_type, label, key],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    Ok(taken)
}

/// Whether a value other than `exclude_id` of `field_type` uses `label`.
pub fn label_taken_by_other(
    conn: &Connection,
    field_type: FieldType,
    label: &str,
    exclude_id: i64,
) -> Result<bool, DatabaseError> {
    let taken = conn
        .query_row(
            "SELECT 1 FROM field_values WHERE type = ?1 AND label = ?2 AND id <> ?3 LIMIT 1",
            params![field_type, label, exclude_id],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    Ok(taken)
}

/// Inserts a row and returns its new id.
pub fn insert(conn: &Connection, row: &NewFieldValueRow<'_>) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO field_values (type, key, label, color, sort_order, priority_group,
         is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            row.field_type,
            row.key,
            row.label,
            row.color,
            row.sort_order,
            row.priority_group,
            row.is_active,
            row.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Overwrites the mutable columns of a row. `type` and `key` never change.
/// Returns the number of rows affected.
pub fn update(conn: &Connection, value: &FieldValue) -> Result<usize, DatabaseError> {
    let affected = conn.execute(
        "UPDATE field_values SET label = ?2, color = ?3, sort_order = ?4,
         priority_group = ?5, is_active = ?6, updated_at = ?7
         WHERE id = ?1",
        params![
            value.id,
            value.label,
            value.color,
            value.sort_order,
            value.priority_group,
            value.is_active,
            value.updated_at,
        ],
    )?;
    Ok(affected)
}

/// Points every application referencing `from_id` at `to_id` instead.
/// Returns the number of applications remapped.
pub fn reassign_references(
    conn: &Connection,
    field_type: FieldType,
    from_id: i64,
    to_id: i64,
) -> Result<usize, DatabaseError> {
    let column = field_type.application_column();
    let affected = conn.execute(
        &format!(
            "UPDATE applications SET {column} = ?1 WHERE {column} = ?2",
            column = column
        ),
        params![to_id, from_id],
    )?;
    Ok(affected)
}

/// Deletes a row. Returns the number of rows affected.
pub fn delete(conn: &Connection, id: i64) -> Result<usize, DatabaseError> {
    let affected = conn.execute("DELETE FROM field_values WHERE id = ?1", params![id])?;
    Ok(affected)
}
