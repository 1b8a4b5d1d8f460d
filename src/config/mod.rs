use serde::Deserialize;

use crate::services::scrap::DEFAULT_SCRAP_THRESHOLD;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// PostgreSQL connection string
    pub database_url: String,

    /// Failed retests a garment survives before disposal.
    #[serde(default = "default_scrap_threshold")]
    pub scrap_threshold: i32,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_scrap_threshold() -> i32 {
    DEFAULT_SCRAP_THRESHOLD
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }
}
