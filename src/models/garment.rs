use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Usage status of a physical garment.
///
/// `Scrap` is terminal: a scrapped code accepts no further assignment
/// and no new wash jobs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GarmentStatus {
    Available,
    Assigned,
    InUse,
    Scrap,
}

/// One physical, uniquely coded garment instance, distinct from its
/// catalog (type/size/color) definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryCode {
    pub code: String,
    /// Opaque reference to the uniform catalog entry. Never interpreted here.
    pub uniform_ref: String,
    pub status: GarmentStatus,
    pub assigned_employee: Option<String>,
    /// Number of failed-retest cycles. Reset to zero only on an ESD pass.
    pub rewash_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryCode {
    pub fn new(code: impl Into<String>, uniform_ref: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            code: code.into(),
            uniform_ref: uniform_ref.into(),
            status: GarmentStatus::Available,
            assigned_employee: None,
            rewash_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_scrapped(&self) -> bool {
        self.status == GarmentStatus::Scrap
    }
}
