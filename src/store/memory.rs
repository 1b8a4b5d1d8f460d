//! Mutex-guarded in-memory store with the same semantics as the
//! PostgreSQL store. Used by the lifecycle test suite; not wired into the
//! server binary.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::garment::{GarmentStatus, InventoryCode};
use crate::models::wash::{WashHistoryEntry, WashJob};
use crate::store::{EsdFailOutcome, StoreError, WashStore};

#[derive(Default)]
struct MemState {
    codes: HashMap<String, InventoryCode>,
    jobs: HashMap<Uuid, WashJob>,
    history: Vec<WashHistoryEntry>,
}

#[derive(Default)]
pub struct MemStore {
    state: Mutex<MemState>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WashStore for MemStore {
    async fn insert_code(&self, code: &InventoryCode) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        if state.codes.contains_key(&code.code) {
            return Ok(false);
        }
        state.codes.insert(code.code.clone(), code.clone());
        Ok(true)
    }

    async fn get_code(&self, code: &str) -> Result<Option<InventoryCode>, StoreError> {
        Ok(self.state.lock().await.codes.get(code).cloned())
    }

    async fn list_codes(&self) -> Result<Vec<InventoryCode>, StoreError> {
        let state = self.state.lock().await;
        let mut codes: Vec<_> = state.codes.values().cloned().collect();
        codes.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(codes)
    }

    async fn delete_code(&self, code: &str) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        // History entries are deliberately left in place.
        Ok(state.codes.remove(code).is_some())
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<WashJob>, StoreError> {
        Ok(self.state.lock().await.jobs.get(&id).cloned())
    }

    async fn list_jobs(&self) -> Result<Vec<WashJob>, StoreError> {
        let state = self.state.lock().await;
        let mut jobs: Vec<_> = state.jobs.values().cloned().collect();
        jobs.sort_by_key(|j| j.created_at);
        Ok(jobs)
    }

    async fn find_active_job(&self, code: &str) -> Result<Option<WashJob>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.jobs.values().find(|j| j.code == code).cloned())
    }

    async fn insert_job(
        &self,
        job: &WashJob,
        code_status: GarmentStatus,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        if state.jobs.values().any(|j| j.code == job.code) {
            return Ok(false);
        }
        if let Some(code) = state.codes.get_mut(&job.code) {
            code.status = code_status;
            code.updated_at = Utc::now();
        }
        state.jobs.insert(job.id, job.clone());
        Ok(true)
    }

    async fn delete_job(
        &self,
        job: &WashJob,
        restore_status: Option<GarmentStatus>,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        if state.jobs.remove(&job.id).is_none() {
            return Ok(false);
        }
        if let Some(status) = restore_status {
            if let Some(code) = state.codes.get_mut(&job.code) {
                code.status = status;
                code.updated_at = Utc::now();
            }
        }
        Ok(true)
    }

    async fn shift_job_date(
        &self,
        id: Uuid,
        delta_days: i64,
    ) -> Result<Option<WashJob>, StoreError> {
        let mut state = self.state.lock().await;
        Ok(state.jobs.get_mut(&id).map(|job| {
            job.created_at += Duration::days(delta_days);
            job.clone()
        }))
    }

    async fn commit_esd_pass(
        &self,
        job: &WashJob,
        entry: &WashHistoryEntry,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.history.push(entry.clone());
        state.jobs.remove(&job.id);
        if let Some(code) = state.codes.get_mut(&job.code) {
            code.rewash_count = 0;
            code.status = GarmentStatus::Available;
            code.assigned_employee = None;
            code.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn commit_esd_fail(
        &self,
        job: &WashJob,
        entry: &WashHistoryEntry,
        scrap_threshold: i32,
    ) -> Result<EsdFailOutcome, StoreError> {
        let mut state = self.state.lock().await;
        state.history.push(entry.clone());
        state.jobs.remove(&job.id);

        let Some(code) = state.codes.get_mut(&job.code) else {
            return Err(StoreError::Corrupt(format!(
                "wash job {} references missing code {}",
                job.id, job.code
            )));
        };

        code.rewash_count += 1;
        code.updated_at = Utc::now();
        let scrapped = code.rewash_count > scrap_threshold;
        if scrapped {
            code.status = GarmentStatus::Scrap;
            code.assigned_employee = None;
        }

        Ok(EsdFailOutcome {
            rewash_count: code.rewash_count,
            scrapped,
        })
    }

    async fn history_for_code(&self, code: &str) -> Result<Vec<WashHistoryEntry>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .history
            .iter()
            .filter(|e| e.code == code)
            .cloned()
            .collect())
    }
}
