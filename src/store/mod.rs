//! Persistence seam for the wash-cycle lifecycle.
//!
//! The lifecycle controller talks to storage only through [`WashStore`],
//! so the same state machine runs against PostgreSQL in production
//! (`crate::db::store::PgStore`) and against [`memory::MemStore`] in tests.
//! Implementations own the uniqueness and atomicity guarantees: conditional
//! inserts for the duplicate guards, and single-transaction commits for the
//! multi-write ESD operations.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::garment::{GarmentStatus, InventoryCode};
use crate::models::wash::{WashHistoryEntry, WashJob};

pub mod memory;

/// Opaque failure from the persistence collaborator. Never retried by the
/// core; surfaced to the caller with retry guidance.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored document is malformed: {0}")]
    Corrupt(String),
}

/// Result of the atomic ESD-failure commit.
#[derive(Debug, Clone, Copy)]
pub struct EsdFailOutcome {
    /// Rewash count after the server-side increment.
    pub rewash_count: i32,
    /// Whether the commit crossed the scrap threshold and retired the garment.
    pub scrapped: bool,
}

#[async_trait]
pub trait WashStore: Send + Sync {
    /// Conditional insert. Returns `false` (and writes nothing) when the
    /// code already exists.
    async fn insert_code(&self, code: &InventoryCode) -> Result<bool, StoreError>;

    async fn get_code(&self, code: &str) -> Result<Option<InventoryCode>, StoreError>;

    async fn list_codes(&self) -> Result<Vec<InventoryCode>, StoreError>;

    /// Removes the code record only; wash history rows survive. Returns
    /// `false` when the code was absent.
    async fn delete_code(&self, code: &str) -> Result<bool, StoreError>;

    async fn get_job(&self, id: Uuid) -> Result<Option<WashJob>, StoreError>;

    async fn list_jobs(&self) -> Result<Vec<WashJob>, StoreError>;

    async fn find_active_job(&self, code: &str) -> Result<Option<WashJob>, StoreError>;

    /// Conditional insert of an active job plus the garment's status flip,
    /// in one atomic unit. Returns `false` (and writes nothing) when the
    /// code already has an active job.
    async fn insert_job(
        &self,
        job: &WashJob,
        code_status: GarmentStatus,
    ) -> Result<bool, StoreError>;

    /// Removes a job, optionally restoring the garment's usage status in
    /// the same atomic unit. Returns `false` when the job was absent.
    async fn delete_job(
        &self,
        job: &WashJob,
        restore_status: Option<GarmentStatus>,
    ) -> Result<bool, StoreError>;

    /// Shifts a job's creation timestamp by whole days. No other side
    /// effect. Returns the updated job, or `None` if the job is absent.
    async fn shift_job_date(
        &self,
        id: Uuid,
        delta_days: i64,
    ) -> Result<Option<WashJob>, StoreError>;

    /// Atomic ESD-pass commit: append the history entry, reset the
    /// garment's rewash count to zero, return it to stock (`available`,
    /// assignment cleared), and delete the job.
    async fn commit_esd_pass(
        &self,
        job: &WashJob,
        entry: &WashHistoryEntry,
    ) -> Result<(), StoreError>;

    /// Atomic ESD-fail commit: append the history entry, delete the job,
    /// increment the garment's rewash count by one server-side, and scrap
    /// the garment (status `scrap`, assignment cleared) in the same unit
    /// when the new count exceeds `scrap_threshold`.
    async fn commit_esd_fail(
        &self,
        job: &WashJob,
        entry: &WashHistoryEntry,
        scrap_threshold: i32,
    ) -> Result<EsdFailOutcome, StoreError>;

    /// Retest history for a code, oldest first.
    async fn history_for_code(&self, code: &str) -> Result<Vec<WashHistoryEntry>, StoreError>;
}
