use axum::{routing::get, routing::post, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use lead_report::app_state::AppState;
use lead_report::config::AppConfig;
use lead_report::db;
use lead_report::routes;
use lead_report::services::{enrichment::ApolloClient, generation::OpenAiClient};

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

    tracing::info!("Initializing lead-report server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_histogram!(
        "report_processing_seconds",
        "Time to run the full report pipeline for one job"
    );
    metrics::describe_counter!("report_jobs_total", "Total report jobs submitted");
    metrics::describe_counter!("report_jobs_completed", "Total report jobs completed");
    metrics::describe_counter!("report_jobs_failed", "Total report jobs that failed");

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

    // Initialize provider clients
    tracing::info!("Initializing Apollo enrichment client");
    let enrichment = ApolloClient::new(config.apollo_api_key.clone());

    tracing::info!(model = %config.openai_model, "Initializing OpenAI generation client");
    let generator = OpenAiClient::new(config.openai_api_key.clone(), config.openai_model.clone());

    // Create shared application state
    let state = AppState::new(db_pool, enrichment, generator);

    // Build API routes
    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/api/v1/reports",
            post(routes::reports::submit_report).get(routes::reports::list_reports),
        )
        .route(
            "/api/v1/reports/{report_id}",
            get(routes::reports::get_report_status),
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
        .layer(RequestBodyLimitLayer::new(64 * 1024)); // 64 KB limit

    tracing::info!("Starting lead-report on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
