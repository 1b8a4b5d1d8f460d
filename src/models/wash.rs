use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::models::garment::GarmentStatus;

/// Phase of a wash job.
///
/// The counter lives in the variant payload rather than being embedded in a
/// display string, so it never has to be parsed back out. `EsdPassed` and
/// `Scrap` are terminal and sticky: once stored, time-based inference must
/// never overwrite them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "phase", content = "count", rename_all = "snake_case")]
pub enum WashPhase {
    WaitingToSend,
    WaitingRewash(i32),
    Washing,
    Rewashing(i32),
    Completed,
    EsdPassed,
    Scrap,
}

impl WashPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WashPhase::EsdPassed | WashPhase::Scrap)
    }

    /// True while the garment has not yet entered the washer. Deleting a job
    /// in a waiting phase restores the garment's pre-wash usage status.
    pub fn is_waiting(&self) -> bool {
        matches!(self, WashPhase::WaitingToSend | WashPhase::WaitingRewash(_))
    }
}

impl std::fmt::Display for WashPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WashPhase::WaitingToSend => write!(f, "Waiting to Send"),
            WashPhase::WaitingRewash(n) => write!(f, "Waiting Rewash #{n}"),
            WashPhase::Washing => write!(f, "Washing"),
            WashPhase::Rewashing(n) => write!(f, "Re-Washing #{n}"),
            WashPhase::Completed => write!(f, "Completed"),
            WashPhase::EsdPassed => write!(f, "ESD Passed"),
            WashPhase::Scrap => write!(f, "Scrap"),
        }
    }
}

/// Outcome of an electrical-safety retest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EsdResult {
    Pass,
    Fail,
}

/// One active laundering cycle for a specific inventory code.
///
/// At most one active job exists per code; the job leaves the active set
/// when the cycle concludes (ESD outcome recorded or operator deletion).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WashJob {
    pub id: Uuid,
    pub code: String,
    pub employee_id: String,
    pub size: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Rewash count copied from the inventory code at creation.
    pub rewash_count: i32,
    pub phase: WashPhase,
    /// Usage status the garment held before being sent for washing.
    pub previous_status: GarmentStatus,
}

/// Append-only record of one completed ESD retest. Never mutated or
/// deleted, and survives deletion of the inventory code it references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WashHistoryEntry {
    pub id: Uuid,
    pub code: String,
    pub employee_id: String,
    pub job_created_at: DateTime<Utc>,
    /// The job's rewash-count snapshot at test time.
    pub rewash_count: i32,
    pub result: EsdResult,
    pub tested_at: DateTime<Utc>,
}

impl WashHistoryEntry {
    /// Capture a job's final state together with a retest outcome.
    pub fn from_job(job: &WashJob, result: EsdResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: job.code.clone(),
            employee_id: job.employee_id.clone(),
            job_created_at: job.created_at,
            rewash_count: job.rewash_count,
            result,
            tested_at: Utc::now(),
        }
    }
}
