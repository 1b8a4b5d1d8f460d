mod app_state;
mod config;
mod db;
mod error;
mod models;
mod routes;
mod services;
mod store;

use axum::{routing::get, routing::post, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use app_state::AppState;
use config::AppConfig;
use db::store::PgStore;
use services::lifecycle::{AutoConfirm, WashLifecycle};
use services::scrap::ScrapPolicy;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing uniform-wash-tracker server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!(
        "inventory_codes_issued_total",
        "Total inventory codes issued"
    );
    metrics::describe_counter!("wash_jobs_created_total", "Total wash jobs created");
    metrics::describe_counter!("wash_jobs_deleted_total", "Total wash jobs cancelled");
    metrics::describe_counter!(
        "esd_tests_total",
        "Total ESD retests recorded, labelled by result"
    );
    metrics::describe_counter!(
        "garments_scrapped_total",
        "Total garments retired after exceeding the rewash threshold"
    );

    // Initialize database connection pool
    tracing::info!("Connecting to PostgreSQL database");
    let db_pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run database migrations
    tracing::info!("Running database migrations");
    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");

    // Wire the lifecycle controller over the PostgreSQL store.
    // Destructive actions are confirmed client-side, so the server
    // installs the auto-confirming guard.
    let store = Arc::new(PgStore::new(db_pool.clone()));
    let lifecycle = WashLifecycle::new(
        store,
        ScrapPolicy::new(config.scrap_threshold),
        Arc::new(AutoConfirm),
    );

    let state = AppState::new(db_pool, lifecycle);

    // Build API routes
    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/api/v1/codes",
            post(routes::codes::issue_code).get(routes::codes::list_codes),
        )
        .route(
            "/api/v1/codes/{code}",
            get(routes::codes::get_code).delete(routes::codes::delete_code),
        )
        .route("/api/v1/codes/{code}/history", get(routes::codes::code_history))
        .route(
            "/api/v1/wash-jobs",
            post(routes::wash::create_wash_job).get(routes::wash::list_wash_jobs),
        )
        .route(
            "/api/v1/wash-jobs/{id}",
            get(routes::wash::get_wash_job).delete(routes::wash::delete_wash_job),
        )
        .route("/api/v1/wash-jobs/{id}/esd", post(routes::wash::record_esd_test))
        .route(
            "/api/v1/wash-jobs/{id}/shift-date",
            post(routes::wash::shift_wash_date),
        )
        .with_state(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(256 * 1024)); // 256 KB limit

    tracing::info!("Starting uniform-wash-tracker on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
