use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::WashError;
use crate::models::api::{
    CreateWashJobRequest, EsdTestRequest, EsdTestResponse, ShiftDateRequest, WashJobResponse,
};
use crate::models::wash::EsdResult;

/// POST /api/v1/wash-jobs — send a garment for washing.
pub async fn create_wash_job(
    State(state): State<AppState>,
    Json(req): Json<CreateWashJobRequest>,
) -> Result<(StatusCode, Json<WashJobResponse>), WashError> {
    req.validate()?;
    let job = state.lifecycle.create_wash_job(req).await?;
    let phase = state.lifecycle.derive_status(&job);
    Ok((StatusCode::CREATED, Json(WashJobResponse::new(job, phase))))
}

/// GET /api/v1/wash-jobs — all active jobs with their effective phases.
pub async fn list_wash_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<WashJobResponse>>, WashError> {
    let jobs = state.lifecycle.list_wash_jobs().await?;
    let responses = jobs
        .into_iter()
        .map(|job| {
            let phase = state.lifecycle.derive_status(&job);
            WashJobResponse::new(job, phase)
        })
        .collect();
    Ok(Json(responses))
}

/// GET /api/v1/wash-jobs/{id}
pub async fn get_wash_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WashJobResponse>, WashError> {
    let job = state.lifecycle.get_wash_job(id).await?;
    let phase = state.lifecycle.derive_status(&job);
    Ok(Json(WashJobResponse::new(job, phase)))
}

/// DELETE /api/v1/wash-jobs/{id} — cancel a cycle. Idempotent: deleting
/// an unknown job is a no-op, not an error.
pub async fn delete_wash_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, WashError> {
    state.lifecycle.delete_wash_job(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/wash-jobs/{id}/esd — record a retest outcome.
pub async fn record_esd_test(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EsdTestRequest>,
) -> Result<Json<EsdTestResponse>, WashError> {
    req.validate()?;

    let response = match req.result {
        EsdResult::Pass => {
            let entry = state.lifecycle.record_esd_pass(id).await?;
            EsdTestResponse {
                job_id: id,
                code: entry.code,
                result: EsdResult::Pass,
                rewash_count: 0,
                scrapped: false,
                message: "Garment passed retest and was returned to stock".to_string(),
            }
        }
        EsdResult::Fail => {
            let (entry, outcome) = state.lifecycle.record_esd_fail(id).await?;
            let message = if outcome.scrapped {
                format!(
                    "Garment scrapped after {} failed retests",
                    outcome.rewash_count
                )
            } else {
                format!("Garment queued for rewash #{}", outcome.rewash_count)
            };
            EsdTestResponse {
                job_id: id,
                code: entry.code,
                result: EsdResult::Fail,
                rewash_count: outcome.rewash_count,
                scrapped: outcome.scrapped,
                message,
            }
        }
    };

    Ok(Json(response))
}

/// POST /api/v1/wash-jobs/{id}/shift-date — administrative date override.
pub async fn shift_wash_date(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ShiftDateRequest>,
) -> Result<Json<WashJobResponse>, WashError> {
    req.validate()?;
    let job = state.lifecycle.shift_wash_date(id, req.delta_days).await?;
    let phase = state.lifecycle.derive_status(&job);
    Ok(Json(WashJobResponse::new(job, phase)))
}
