use sqlx::PgPool;
use std::sync::Arc;

use crate::services::lifecycle::WashLifecycle;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub lifecycle: Arc<WashLifecycle>,
}

impl AppState {
    pub fn new(db: PgPool, lifecycle: WashLifecycle) -> Self {
        Self {
            db,
            lifecycle: Arc::new(lifecycle),
        }
    }
}
