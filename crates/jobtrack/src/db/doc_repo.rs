//! Application document repository: SQL for the `application_docs` table.

use std::collections::BTreeSet;

use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::docs::ApplicationDoc;

use super::DatabaseError;

fn from_row(row: &Row<'_>) -> Result<ApplicationDoc, rusqlite::Error> {
    Ok(ApplicationDoc {
        id: row.get("id")?,
        application_id: row.get("application_id")?,
        filename: row.get("filename")?,
        mime_type: row.get("mime_type")?,
        stored_path: row.get("stored_path")?,
        uploaded_at: row.get("uploaded_at")?,
    })
}

/// Inserts a document record and returns its id.
pub fn insert(
    conn: &Connection,
    application_id: i64,
    filename: &str,
    mime_type: &str,
    stored_path: &str,
    uploaded_at: &str,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO application_docs (application_id, filename, mime_type, stored_path, uploaded_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![application_id, filename, mime_type, stored_path, uploaded_at],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Finds a document by id.
pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<ApplicationDoc>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, application_id, filename, mime_type, stored_path, uploaded_at
             FROM application_docs WHERE id = ?1",
            params![id],
            from_row,
        )
        .optional()?;
    Ok(row)
}

/// Ids bound per `IN (...)` query, well below SQLite's variable limit.
const IDS_PER_QUERY: usize = 500;

/// Returns the documents of the given applications, newest first.
///
/// Duplicate ids are ignored. Long id lists are split across several
/// queries so the number of bound variables stays bounded.
pub fn list_by_application_ids(
    conn: &Connection,
    application_ids: &[i64],
) -> Result<Vec<ApplicationDoc>, DatabaseError> {
    let unique: Vec<i64> = application_ids
        .iter()
        .copied()
        .collect::<BTreeSet<i64>>()
        .into_iter()
        .collect();

    let mut docs = Vec::new();
    for chunk in unique.chunks(IDS_PER_QUERY) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let sql = format!(
            "SELECT id, application_id, filename, mime_type, stored_path, uploaded_at
             FROM application_docs WHERE application_id IN ({})",
            placeholders
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(chunk.iter()), from_row)?;
        for row in rows {
            docs.push(row?);
        }
    }

    docs.sort_by(|a, b| {
        b.uploaded_at
            .cmp(&a.uploaded_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    Ok(docs)
}
