//! Document upload, listing and download.

use std::collections::BTreeMap;
use std::io::ErrorKind;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use jobtrack::{sanitize, ApplicationDoc, StoreError, UploadError};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{parse_id, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IdsQuery {
    pub ids: Option<String>,
}

struct IncomingFile {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// POST /api/application/:id/docs (multipart, field `file`)
pub async fn upload(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let application_id = parse_id(&id)?;
    // Refuse before writing anything to disk.
    state.applications.get(application_id)?;

    let file = read_file_field(multipart)
        .await?
        .ok_or(UploadError::MissingFile)?;

    let mime_type = state
        .policy
        .check(&file.filename, &file.content_type, file.bytes.len() as u64)?;
    let stored = state.uploads.store(&file.filename, &file.bytes)?;
    let recorded = state.docs.add_doc(
        application_id,
        &file.filename,
        &mime_type,
        &stored.to_string_lossy(),
    );
    let doc_id = match recorded {
        Ok(doc_id) => doc_id,
        Err(err) => {
            // No row points at the file, so it would never be served.
            if let Err(cleanup) = state.uploads.discard(&stored) {
                warn!(error = %cleanup, "failed to remove unrecorded upload");
            }
            return Err(err.into());
        }
    };

    info!(
        doc_id,
        application_id,
        size = file.bytes.len(),
        "document uploaded"
    );
    Ok((StatusCode::CREATED, Json(json!({ "id": doc_id }))))
}

/// Returns the first multipart field named `file` that carries a file name.
async fn read_file_field(mut multipart: Multipart) -> Result<Option<IncomingFile>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Status(e.status(), e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = match field.file_name() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => continue,
        };
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Status(e.status(), e.body_text()))?;
        return Ok(Some(IncomingFile {
            filename,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

/// GET /api/application/docs?ids=1,2,3
///
/// Non-numeric ids are skipped; without `ids` the result is empty.
pub async fn list_by_applications(
    State(state): State<AppState>,
    Query(query): Query<IdsQuery>,
) -> Result<Json<BTreeMap<i64, Vec<ApplicationDoc>>>, ApiError> {
    let Some(raw) = query.ids else {
        return Ok(Json(BTreeMap::new()));
    };
    let ids: Vec<i64> = raw
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();
    Ok(Json(state.docs.list_docs_by_application_ids(&ids)?))
}

/// GET /api/docs/:doc_id
pub async fn download(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let doc_id = parse_id(&doc_id)?;
    let doc = state.docs.get_doc(doc_id)?;

    let bytes = state
        .uploads
        .read(std::path::Path::new(&doc.stored_path))
        .map_err(|err| match err {
            UploadError::Io { ref source, .. } if source.kind() == ErrorKind::NotFound => {
                ApiError::from(StoreError::not_found(format!("document {} file", doc_id)))
            }
            other => ApiError::from(other),
        })?;

    let disposition = format!(
        "inline; filename=\"{}\"",
        sanitize::safe_filename(&doc.filename)
    );
    Ok((
        [
            (header::CONTENT_TYPE, doc.mime_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
