use metrics_exporter_prometheus::PrometheusBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use job_board::app_state::AppState;
use job_board::config::AppConfig;
use job_board::routes;
use job_board::services::backend::SupabaseClient;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment; an unconfigured backend is fatal
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing job-board server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");

    // Register application metrics
    metrics::describe_counter!(
        "job_listing_fetches_total",
        "Total job listing fetches applied to a view"
    );
    metrics::describe_counter!(
        "job_listing_fetch_failures_total",
        "Job listing fetches that failed and rendered an empty list"
    );
    metrics::describe_counter!(
        "applications_submitted_total",
        "Applications successfully submitted"
    );
    metrics::describe_histogram!(
        "backend_request_seconds",
        "Latency of row requests to the Supabase backend"
    );

    tracing::info!(url = %config.supabase_url, "Initializing Supabase client");
    let backend = SupabaseClient::new(
        &config.supabase_url,
        &config.supabase_anon_key,
        config.request_timeout(),
    )
    .expect("Failed to initialize Supabase client");

    let state = AppState::new(backend, Some(prometheus_handle));

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(64 * 1024)); // 64 KB limit

    tracing::info!("Starting job-board on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
