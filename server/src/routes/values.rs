//! `/api/values`: field value management.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use jobtrack::{DeleteOutcome, FieldType, FieldValue, FieldValuePatch, NewFieldValue, StoreError};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_id, parse_json, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TypeQuery {
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    /// `true` restricts the list to values offered for new entries.
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

/// PUT body: the id of the value plus the fields to change.
#[derive(Debug, Deserialize)]
struct UpdateRequest {
    id: Option<i64>,
    #[serde(flatten)]
    patch: FieldValuePatch,
}

/// GET /api/values?type=[&active=true]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<TypeQuery>,
) -> Result<Json<Vec<FieldValue>>, ApiError> {
    let field_type: FieldType = query
        .field_type
        .as_deref()
        .ok_or_else(|| StoreError::invalid("missing type"))?
        .parse()?;
    let values = if query.active.unwrap_or(false) {
        state.values.list_active(field_type)?
    } else {
        state.values.list(field_type)?
    };
    Ok(Json(values))
}

/// POST /api/values
pub async fn create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let input: NewFieldValue = parse_json(&body)?;
    let id = state.values.create(&input)?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// PUT /api/values
pub async fn update(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<FieldValue>, ApiError> {
    let request: UpdateRequest = parse_json(&body)?;
    let id = request.id.ok_or_else(|| StoreError::invalid("missing id"))?;
    Ok(Json(state.values.update(id, &request.patch)?))
}

/// DELETE /api/values?id=, optionally with `{"mergeIntoId": n}`.
pub async fn delete(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
    body: Bytes,
) -> Result<Json<DeleteOutcome>, ApiError> {
    let id = parse_id(query.id.as_deref().unwrap_or_default())?;
    let merge_into = merge_target(&body);
    Ok(Json(state.values.delete(id, merge_into)?))
}

/// Reads `mergeIntoId` from an optional JSON body. Anything that is not an
/// integer counts as absent.
fn merge_target(body: &[u8]) -> Option<i64> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice::<Value>(body)
        .ok()?
        .get("mergeIntoId")?
        .as_i64()
}
