//! Wash job lifecycle controller.
//!
//! Orchestrates the wash-cycle state machine over the store seam:
//! creation, time-based status derivation, ESD pass/fail handling,
//! cancellation, and the administrative date shift. The controller decides
//! transitions; the store owns atomicity of the multi-write commits.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::WashError;
use crate::models::api::{CreateWashJobRequest, IssueCodeRequest};
use crate::models::garment::{GarmentStatus, InventoryCode};
use crate::models::wash::{EsdResult, WashHistoryEntry, WashJob, WashPhase};
use crate::services::cache::CodeListCache;
use crate::services::scrap::ScrapPolicy;
use crate::services::status;
use crate::store::{EsdFailOutcome, WashStore};

/// Confirmation capability for destructive operations, decoupled from any
/// UI toolkit. The server binary installs [`AutoConfirm`]; tests install
/// denying guards to assert nothing is mutated.
pub trait ConfirmGuard: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// Confirms everything. Appropriate where the caller has already
/// confirmed (e.g. a browser dialog ahead of the HTTP request).
pub struct AutoConfirm;

impl ConfirmGuard for AutoConfirm {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}

pub struct WashLifecycle {
    store: Arc<dyn WashStore>,
    scrap_policy: ScrapPolicy,
    confirm: Arc<dyn ConfirmGuard>,
    cache: CodeListCache,
}

impl WashLifecycle {
    pub fn new(
        store: Arc<dyn WashStore>,
        scrap_policy: ScrapPolicy,
        confirm: Arc<dyn ConfirmGuard>,
    ) -> Self {
        Self {
            store,
            scrap_policy,
            confirm,
            cache: CodeListCache::new(),
        }
    }

    // ── Inventory codes ──────────────────────────────────────────────

    /// Issue a new inventory code against a catalog uniform. The duplicate
    /// guard is the store's conditional insert, not a separate read.
    pub async fn issue_code(&self, req: IssueCodeRequest) -> Result<InventoryCode, WashError> {
        let code = InventoryCode::new(req.code, req.uniform_ref);

        if !self.store.insert_code(&code).await? {
            return Err(WashError::Validation(format!(
                "inventory code {} is already in use",
                code.code
            )));
        }

        self.cache.invalidate().await;
        metrics::counter!("inventory_codes_issued_total").increment(1);
        tracing::info!(code = %code.code, uniform_ref = %code.uniform_ref, "Issued inventory code");
        Ok(code)
    }

    pub async fn get_code(&self, code: &str) -> Result<InventoryCode, WashError> {
        self.store
            .get_code(code)
            .await?
            .ok_or_else(|| WashError::NotFound(format!("inventory code {code}")))
    }

    pub async fn list_codes(&self) -> Result<Vec<InventoryCode>, WashError> {
        Ok(self.cache.get_or_load(self.store.as_ref()).await?)
    }

    /// Remove a code record. Wash history referencing the code is
    /// preserved.
    pub async fn delete_code(&self, code: &str) -> Result<(), WashError> {
        if !self.store.delete_code(code).await? {
            return Err(WashError::NotFound(format!("inventory code {code}")));
        }
        self.cache.invalidate().await;
        tracing::info!(code = %code, "Deleted inventory code");
        Ok(())
    }

    pub async fn code_history(&self, code: &str) -> Result<Vec<WashHistoryEntry>, WashError> {
        Ok(self.store.history_for_code(code).await?)
    }

    // ── Wash jobs ────────────────────────────────────────────────────

    /// Send a garment for washing.
    ///
    /// Snapshots the garment's rewash count and pre-wash usage status,
    /// marks the garment in use at the laundry, and persists the job with
    /// its initial derived phase. Nothing is mutated on any failure path.
    pub async fn create_wash_job(&self, req: CreateWashJobRequest) -> Result<WashJob, WashError> {
        let garment = self
            .store
            .get_code(&req.code)
            .await?
            .ok_or_else(|| WashError::NotFound(format!("inventory code {}", req.code)))?;

        if garment.is_scrapped() {
            return Err(WashError::CodeScrapped(garment.code));
        }

        let job = WashJob {
            id: Uuid::new_v4(),
            code: garment.code.clone(),
            employee_id: req.employee_id,
            size: req.size,
            created_at: Utc::now(),
            rewash_count: garment.rewash_count,
            phase: status::initial_phase(garment.rewash_count),
            previous_status: garment.status,
        };

        if !self.store.insert_job(&job, GarmentStatus::InUse).await? {
            return Err(WashError::DuplicateActiveJob(garment.code));
        }

        self.cache.invalidate().await;
        metrics::counter!("wash_jobs_created_total").increment(1);
        tracing::info!(
            job_id = %job.id,
            code = %job.code,
            employee_id = %job.employee_id,
            rewash_count = job.rewash_count,
            "Created wash job"
        );
        Ok(job)
    }

    pub async fn get_wash_job(&self, id: Uuid) -> Result<WashJob, WashError> {
        self.store
            .get_job(id)
            .await?
            .ok_or_else(|| WashError::NotFound(format!("wash job {id}")))
    }

    pub async fn list_wash_jobs(&self) -> Result<Vec<WashJob>, WashError> {
        Ok(self.store.list_jobs().await?)
    }

    /// Cancel a wash job. Idempotent: deleting an absent job is a no-op.
    ///
    /// If the garment never entered the washer (derived phase still a
    /// waiting sub-state), its pre-wash usage status is restored; the
    /// rewash count is untouched either way. Returns `false` when nothing
    /// was deleted (absent job or declined confirmation).
    pub async fn delete_wash_job(&self, id: Uuid) -> Result<bool, WashError> {
        let Some(job) = self.store.get_job(id).await? else {
            return Ok(false);
        };

        if !self
            .confirm
            .confirm(&format!("Delete wash job for garment {}?", job.code))
        {
            tracing::info!(job_id = %id, "Wash job deletion declined");
            return Ok(false);
        }

        let derived = status::derive_job_phase(&job, Utc::now());
        let restore = derived.is_waiting().then_some(job.previous_status);

        let deleted = self.store.delete_job(&job, restore).await?;
        if deleted {
            self.cache.invalidate().await;
            metrics::counter!("wash_jobs_deleted_total").increment(1);
            tracing::info!(
                job_id = %id,
                code = %job.code,
                restored = restore.is_some(),
                "Deleted wash job"
            );
        }
        Ok(deleted)
    }

    /// Record a passed ESD retest: one atomic commit appends the history
    /// entry, resets the garment's rewash count, returns it to stock, and
    /// closes the job.
    pub async fn record_esd_pass(&self, id: Uuid) -> Result<WashHistoryEntry, WashError> {
        let job = self.get_wash_job(id).await?;
        let entry = WashHistoryEntry::from_job(&job, EsdResult::Pass);

        self.store.commit_esd_pass(&job, &entry).await?;

        self.cache.invalidate().await;
        metrics::counter!("esd_tests_total", "result" => "pass").increment(1);
        tracing::info!(job_id = %id, code = %job.code, "ESD retest passed, garment returned to stock");
        Ok(entry)
    }

    /// Record a failed ESD retest: one atomic commit appends the history
    /// entry, closes the job, increments the garment's rewash count
    /// server-side, and retires the garment when the new count exceeds the
    /// scrap threshold. A surviving garment is immediately eligible for a
    /// new job whose initial phase reflects the incremented count.
    pub async fn record_esd_fail(
        &self,
        id: Uuid,
    ) -> Result<(WashHistoryEntry, EsdFailOutcome), WashError> {
        let job = self.get_wash_job(id).await?;
        let entry = WashHistoryEntry::from_job(&job, EsdResult::Fail);

        let outcome = self
            .store
            .commit_esd_fail(&job, &entry, self.scrap_policy.threshold())
            .await?;

        self.cache.invalidate().await;
        metrics::counter!("esd_tests_total", "result" => "fail").increment(1);
        if outcome.scrapped {
            metrics::counter!("garments_scrapped_total").increment(1);
            tracing::warn!(
                job_id = %id,
                code = %job.code,
                rewash_count = outcome.rewash_count,
                "ESD retest failed, garment scrapped"
            );
        } else {
            tracing::info!(
                job_id = %id,
                code = %job.code,
                rewash_count = outcome.rewash_count,
                "ESD retest failed, garment queued for rewash"
            );
        }
        Ok((entry, outcome))
    }

    /// Administrative override shifting a job's creation date, used to
    /// correct or simulate elapsed time. Returns the updated job; the
    /// caller re-derives the phase for display.
    pub async fn shift_wash_date(&self, id: Uuid, delta_days: i64) -> Result<WashJob, WashError> {
        let job = self
            .store
            .shift_job_date(id, delta_days)
            .await?
            .ok_or_else(|| WashError::NotFound(format!("wash job {id}")))?;

        tracing::info!(job_id = %id, delta_days, "Shifted wash job creation date");
        Ok(job)
    }

    /// Effective phase of a job as of now. Read-only, for rendering.
    pub fn derive_status(&self, job: &WashJob) -> WashPhase {
        status::derive_job_phase(job, Utc::now())
    }
}
