//! Vox Lux API server entry point.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use voxlux_api::config::ApiConfig;
use voxlux_api::error::AppError;
use voxlux_api::sessions;
use voxlux_api::state::{AppState, Backends};
use voxlux_api::telemetry;
use voxlux_content::registry::ContentRegistry;
use voxlux_core::clock::SystemClock;
use voxlux_core::flags::FlagService;
use voxlux_store::{FileFlagBackend, PgCourseStore, PgEventRepository, PgQuizStore};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = ApiConfig::from_env()?;
    let _telemetry = telemetry::init(config.otlp_endpoint.as_deref())?;

    tracing::info!("Starting Vox Lux API server");

    // Create database connection pool and bring the schema up to date.
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;

    let registry = Arc::new(ContentRegistry::builtin().map_err(AppError::Content)?);
    tracing::info!(version = registry.version_hash(), "content registry loaded");

    let flags = Arc::new(
        FlagService::init(Arc::new(FileFlagBackend::new(&config.flags_path))).await,
    );

    // Build application state.
    let backends = Backends {
        clock: Arc::new(SystemClock),
        events: Arc::new(PgEventRepository::new(pool.clone())),
        courses: Arc::new(PgCourseStore::new(pool.clone())),
        quizzes: Arc::new(PgQuizStore::new(pool)),
    };
    let app_state = AppState::new(
        backends,
        registry,
        config.track_map(),
        flags,
        config.view_config(),
    );

    let _sweeper = sessions::spawn_sweeper(
        app_state.sessions.clone(),
        config.session_idle_ttl,
        config.session_sweep_interval,
    );

    // TODO: Replace CorsLayer::permissive() with the presentation layer's origins.
    let app = voxlux_api::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server.
    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
