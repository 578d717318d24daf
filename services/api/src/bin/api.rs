//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, InMemoryCourseRepository, OpenAiCompletionAdapter},
    config::Config,
    error::ApiError,
    web::{build_router, rest::ApiDoc, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use course_forge_core::orchestrator::GenerationOrchestrator;
use course_forge_core::ports::CourseRepository;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Course Storage ---
    let courses: Arc<dyn CourseRepository> = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let db_adapter = DbAdapter::new(db_pool);
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(db_adapter)
        }
        None => {
            warn!("DATABASE_URL is not set; courses will be kept in memory only");
            Arc::new(InMemoryCourseRepository::new())
        }
    };

    // --- 3. Generation Provider ---
    let mut openai_config = OpenAIConfig::new().with_api_key(config.openai_api_key.as_str());
    if let Some(api_base) = &config.openai_api_base {
        openai_config = openai_config.with_api_base(api_base.as_str());
    }
    let completions = Arc::new(OpenAiCompletionAdapter::new(Client::with_config(openai_config)));

    let settings = config.generation_settings();
    info!(
        models = ?config.generation_models,
        timeout_secs = settings.attempt_timeout.as_secs(),
        "Generation chain configured"
    );
    let generator = Arc::new(GenerationOrchestrator::new(completions, settings));

    // --- 4. Build the Shared AppState and Router ---
    let app_state = Arc::new(AppState { courses, generator });

    // Merge the API router with the Swagger UI router for a complete application.
    let app = build_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
