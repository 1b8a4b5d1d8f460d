use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;

use crate::app_state::AppState;
use crate::error::WashError;
use crate::models::api::IssueCodeRequest;
use crate::models::garment::InventoryCode;
use crate::models::wash::WashHistoryEntry;

/// POST /api/v1/codes — issue a new inventory code against a catalog uniform.
pub async fn issue_code(
    State(state): State<AppState>,
    Json(req): Json<IssueCodeRequest>,
) -> Result<(StatusCode, Json<InventoryCode>), WashError> {
    req.validate()?;
    let code = state.lifecycle.issue_code(req).await?;
    Ok((StatusCode::CREATED, Json(code)))
}

/// GET /api/v1/codes — list all inventory codes.
pub async fn list_codes(
    State(state): State<AppState>,
) -> Result<Json<Vec<InventoryCode>>, WashError> {
    Ok(Json(state.lifecycle.list_codes().await?))
}

/// GET /api/v1/codes/{code}
pub async fn get_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<InventoryCode>, WashError> {
    Ok(Json(state.lifecycle.get_code(&code).await?))
}

/// DELETE /api/v1/codes/{code} — removes the record; wash history stays.
pub async fn delete_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode, WashError> {
    state.lifecycle.delete_code(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/codes/{code}/history — retest outcomes, oldest first.
pub async fn code_history(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Vec<WashHistoryEntry>>, WashError> {
    Ok(Json(state.lifecycle.code_history(&code).await?))
}
