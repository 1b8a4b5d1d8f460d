use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::wash::{EsdResult, WashJob, WashPhase};

/// Request to issue a new inventory code against a catalog uniform.
#[derive(Debug, Deserialize, Validate)]
pub struct IssueCodeRequest {
    #[garde(length(min = 1, max = 64))]
    pub code: String,

    #[garde(length(min = 1, max = 100))]
    pub uniform_ref: String,
}

/// Request to send a garment for washing.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateWashJobRequest {
    #[garde(length(min = 1, max = 64))]
    pub code: String,

    #[garde(length(min = 1, max = 64))]
    pub employee_id: String,

    #[garde(length(min = 1, max = 20))]
    pub size: Option<String>,
}

/// Request to record an ESD retest outcome for a job.
#[derive(Debug, Deserialize, Validate)]
pub struct EsdTestRequest {
    #[garde(skip)]
    pub result: EsdResult,
}

/// Administrative override shifting a job's creation date.
#[derive(Debug, Deserialize, Validate)]
pub struct ShiftDateRequest {
    #[garde(range(min = -365, max = 365))]
    pub delta_days: i64,
}

/// A wash job together with its effective (time-derived) phase.
#[derive(Debug, Serialize)]
pub struct WashJobResponse {
    #[serde(flatten)]
    pub job: WashJob,
    pub effective_phase: WashPhase,
    /// Operator-facing label, e.g. "Waiting Rewash #2".
    pub effective_phase_display: String,
}

impl WashJobResponse {
    pub fn new(job: WashJob, effective_phase: WashPhase) -> Self {
        let effective_phase_display = effective_phase.to_string();
        Self {
            job,
            effective_phase,
            effective_phase_display,
        }
    }
}

/// Response after recording an ESD retest.
#[derive(Debug, Serialize)]
pub struct EsdTestResponse {
    pub job_id: Uuid,
    pub code: String,
    pub result: EsdResult,
    pub rewash_count: i32,
    pub scrapped: bool,
    pub message: String,
}
