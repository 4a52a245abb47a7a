//! `/api/application`: application records.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use jobtrack::{Application, ApplicationInput};
use serde_json::{json, Value};

use super::{parse_id, parse_json, ApiError};
use crate::state::AppState;

/// GET /api/application
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Application>>, ApiError> {
    Ok(Json(state.applications.list()?))
}

/// POST /api/application
pub async fn create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let input: ApplicationInput = parse_json(&body)?;
    let id = state.applications.create(&input)?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// GET /api/application/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Application>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.applications.get(id)?))
}

/// PUT /api/application/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Application>, ApiError> {
    let id = parse_id(&id)?;
    let input: ApplicationInput = parse_json(&body)?;
    Ok(Json(state.applications.update(id, &input)?))
}

/// DELETE /api/application/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    state.applications.delete(id)?;
    Ok(Json(json!({ "success": true })))
}
