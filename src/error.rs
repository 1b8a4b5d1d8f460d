use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Business and storage failures of the wash-cycle core.
///
/// Everything except `Store` is an expected condition surfaced to the
/// operator with a specific, actionable message. `Store` failures are
/// logged and surfaced generically with retry guidance; the core never
/// retries on its own.
#[derive(Debug, Error)]
pub enum WashError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("inventory code {0} already has an active wash job")]
    DuplicateActiveJob(String),

    #[error("inventory code {0} has been scrapped and can no longer be washed or assigned")]
    CodeScrapped(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<garde::Report> for WashError {
    fn from(report: garde::Report) -> Self {
        WashError::Validation(report.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for WashError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            WashError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            WashError::DuplicateActiveJob(_) => {
                (StatusCode::CONFLICT, "duplicate_active_job", self.to_string())
            }
            WashError::CodeScrapped(_) => (StatusCode::CONFLICT, "code_scrapped", self.to_string()),
            WashError::Validation(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", self.to_string())
            }
            WashError::Store(e) => {
                tracing::error!(error = %e, "storage operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "store_error",
                    "temporary storage failure, please retry".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: kind, message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_entity() {
        let err = WashError::CodeScrapped("UC-0001".to_string());
        assert!(err.to_string().contains("UC-0001"));

        let err = WashError::NotFound("wash job 42".to_string());
        assert_eq!(err.to_string(), "wash job 42 not found");
    }
}
