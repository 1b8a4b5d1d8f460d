//! PostgreSQL implementation of the wash store.
//!
//! Multi-write operations each run in a single transaction, and the
//! rewash increment happens server-side, so concurrent ESD failures
//! cannot lose an increment and a half-applied commit is never visible.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::garment::{GarmentStatus, InventoryCode};
use crate::models::wash::{EsdResult, WashHistoryEntry, WashJob, WashPhase};
use crate::store::{EsdFailOutcome, StoreError, WashStore};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse_status(raw: &str) -> Result<GarmentStatus, StoreError> {
    GarmentStatus::from_str(raw)
        .map_err(|_| StoreError::Corrupt(format!("unknown garment status {raw:?}")))
}

fn code_from_row(row: &PgRow) -> Result<InventoryCode, StoreError> {
    let status: String = row.try_get("status").map_err(StoreError::Database)?;
    Ok(InventoryCode {
        code: row.try_get("code").map_err(StoreError::Database)?,
        uniform_ref: row.try_get("uniform_ref").map_err(StoreError::Database)?,
        status: parse_status(&status)?,
        assigned_employee: row
            .try_get("assigned_employee")
            .map_err(StoreError::Database)?,
        rewash_count: row.try_get("rewash_count").map_err(StoreError::Database)?,
        created_at: row.try_get("created_at").map_err(StoreError::Database)?,
        updated_at: row.try_get("updated_at").map_err(StoreError::Database)?,
    })
}

fn job_from_row(row: &PgRow) -> Result<WashJob, StoreError> {
    let phase: serde_json::Value = row.try_get("phase").map_err(StoreError::Database)?;
    let phase: WashPhase = serde_json::from_value(phase)
        .map_err(|e| StoreError::Corrupt(format!("unreadable wash phase: {e}")))?;
    let previous_status: String = row
        .try_get("previous_status")
        .map_err(StoreError::Database)?;

    Ok(WashJob {
        id: row.try_get("id").map_err(StoreError::Database)?,
        code: row.try_get("code").map_err(StoreError::Database)?,
        employee_id: row.try_get("employee_id").map_err(StoreError::Database)?,
        size: row.try_get("size").map_err(StoreError::Database)?,
        created_at: row.try_get("created_at").map_err(StoreError::Database)?,
        rewash_count: row.try_get("rewash_count").map_err(StoreError::Database)?,
        phase,
        previous_status: parse_status(&previous_status)?,
    })
}

fn history_from_row(row: &PgRow) -> Result<WashHistoryEntry, StoreError> {
    let result: String = row.try_get("result").map_err(StoreError::Database)?;
    let result = EsdResult::from_str(&result)
        .map_err(|_| StoreError::Corrupt(format!("unknown ESD result {result:?}")))?;

    Ok(WashHistoryEntry {
        id: row.try_get("id").map_err(StoreError::Database)?,
        code: row.try_get("code").map_err(StoreError::Database)?,
        employee_id: row.try_get("employee_id").map_err(StoreError::Database)?,
        job_created_at: row
            .try_get("job_created_at")
            .map_err(StoreError::Database)?,
        rewash_count: row.try_get("rewash_count").map_err(StoreError::Database)?,
        result,
        tested_at: row.try_get("tested_at").map_err(StoreError::Database)?,
    })
}

const CODE_COLUMNS: &str =
    "code, uniform_ref, status, assigned_employee, rewash_count, created_at, updated_at";

const JOB_COLUMNS: &str =
    "id, code, employee_id, size, created_at, rewash_count, phase, previous_status";

#[async_trait]
impl WashStore for PgStore {
    async fn insert_code(&self, code: &InventoryCode) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO inventory_codes
                (code, uniform_ref, status, assigned_employee, rewash_count, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(&code.code)
        .bind(&code.uniform_ref)
        .bind(code.status.to_string())
        .bind(&code.assigned_employee)
        .bind(code.rewash_count)
        .bind(code.created_at)
        .bind(code.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn get_code(&self, code: &str) -> Result<Option<InventoryCode>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {CODE_COLUMNS} FROM inventory_codes WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(code_from_row).transpose()
    }

    async fn list_codes(&self) -> Result<Vec<InventoryCode>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {CODE_COLUMNS} FROM inventory_codes ORDER BY code"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(code_from_row).collect()
    }

    async fn delete_code(&self, code: &str) -> Result<bool, StoreError> {
        // Active jobs cascade away with the code; history rows stay.
        let result = sqlx::query("DELETE FROM inventory_codes WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<WashJob>, StoreError> {
        let row = sqlx::query(&format!("SELECT {JOB_COLUMNS} FROM wash_jobs WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(job_from_row).transpose()
    }

    async fn list_jobs(&self) -> Result<Vec<WashJob>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {JOB_COLUMNS} FROM wash_jobs ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(job_from_row).collect()
    }

    async fn find_active_job(&self, code: &str) -> Result<Option<WashJob>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {JOB_COLUMNS} FROM wash_jobs WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(job_from_row).transpose()
    }

    async fn insert_job(
        &self,
        job: &WashJob,
        code_status: GarmentStatus,
    ) -> Result<bool, StoreError> {
        let phase = serde_json::to_value(job.phase)
            .map_err(|e| StoreError::Corrupt(format!("unserializable wash phase: {e}")))?;

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO wash_jobs
                (id, code, employee_id, size, created_at, rewash_count, phase, previous_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(job.id)
        .bind(&job.code)
        .bind(&job.employee_id)
        .bind(&job.size)
        .bind(job.created_at)
        .bind(job.rewash_count)
        .bind(phase)
        .bind(job.previous_status.to_string())
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            "UPDATE inventory_codes SET status = $1, updated_at = NOW() WHERE code = $2",
        )
        .bind(code_status.to_string())
        .bind(&job.code)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_job(
        &self,
        job: &WashJob,
        restore_status: Option<GarmentStatus>,
    ) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM wash_jobs WHERE id = $1")
            .bind(job.id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Ok(false);
        }

        if let Some(status) = restore_status {
            sqlx::query(
                "UPDATE inventory_codes SET status = $1, updated_at = NOW() WHERE code = $2",
            )
            .bind(status.to_string())
            .bind(&job.code)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn shift_job_date(
        &self,
        id: Uuid,
        delta_days: i64,
    ) -> Result<Option<WashJob>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE wash_jobs
            SET created_at = created_at + ($2 * INTERVAL '1 day')
            WHERE id = $1
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(delta_days as f64)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(job_from_row).transpose()
    }

    async fn commit_esd_pass(
        &self,
        job: &WashJob,
        entry: &WashHistoryEntry,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        insert_history(&mut tx, entry).await?;

        sqlx::query("DELETE FROM wash_jobs WHERE id = $1")
            .bind(job.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE inventory_codes
            SET rewash_count = 0,
                status = 'available',
                assigned_employee = NULL,
                updated_at = NOW()
            WHERE code = $1
            "#,
        )
        .bind(&job.code)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn commit_esd_fail(
        &self,
        job: &WashJob,
        entry: &WashHistoryEntry,
        scrap_threshold: i32,
    ) -> Result<EsdFailOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        insert_history(&mut tx, entry).await?;

        sqlx::query("DELETE FROM wash_jobs WHERE id = $1")
            .bind(job.id)
            .execute(&mut *tx)
            .await?;

        // Server-side increment: concurrent failures each add exactly one.
        let row = sqlx::query(
            r#"
            UPDATE inventory_codes
            SET rewash_count = rewash_count + 1,
                status = CASE WHEN rewash_count + 1 > $2 THEN 'scrap' ELSE status END,
                assigned_employee = CASE WHEN rewash_count + 1 > $2 THEN NULL
                                         ELSE assigned_employee END,
                updated_at = NOW()
            WHERE code = $1
            RETURNING rewash_count
            "#,
        )
        .bind(&job.code)
        .bind(scrap_threshold)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(StoreError::Corrupt(format!(
                "wash job {} references missing code {}",
                job.id, job.code
            )));
        };

        let rewash_count: i32 = row.try_get("rewash_count")?;
        tx.commit().await?;

        Ok(EsdFailOutcome {
            rewash_count,
            scrapped: rewash_count > scrap_threshold,
        })
    }

    async fn history_for_code(&self, code: &str) -> Result<Vec<WashHistoryEntry>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, code, employee_id, job_created_at, rewash_count, result, tested_at
            FROM wash_history
            WHERE code = $1
            ORDER BY tested_at
            "#,
        )
        .bind(code)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(history_from_row).collect()
    }
}

async fn insert_history(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    entry: &WashHistoryEntry,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO wash_history
            (id, code, employee_id, job_created_at, rewash_count, result, tested_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(entry.id)
    .bind(&entry.code)
    .bind(&entry.employee_id)
    .bind(entry.job_created_at)
    .bind(entry.rewash_count)
    .bind(entry.result.to_string())
    .bind(entry.tested_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
