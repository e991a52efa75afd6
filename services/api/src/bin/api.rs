//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        db::DbAdapter, forum_search::RedditSearchAdapter, news_search::NewsApiAdapter,
        summary_llm::OpenAiSummaryAdapter, web_search::GoogleSearchAdapter,
    },
    config::Config,
    error::ApiError,
    pipeline::{CitationPipeline, PipelineSettings},
    web::{check_citations_handler, list_citations_handler, rest::ApiDoc, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};
use seogenix_core::ports::{CitationStore, SearchSurface, TextGenerationService};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool.clone()));
    info!("Running database migrations...");
    db_adapter
        .run_migrations()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    info!("Database migrations complete.");
    let store: Arc<dyn CitationStore> = db_adapter;

    // --- 3. Initialize the Search Surfaces ---
    // A missing credential leaves that surface permanently disabled; the
    // pipeline degrades to fewer (or zero) live surfaces.
    let surfaces: Vec<Arc<dyn SearchSurface>> = vec![
        Arc::new(GoogleSearchAdapter::new(config.web_search.clone())),
        Arc::new(NewsApiAdapter::new(config.news_api_key.clone())),
        Arc::new(RedditSearchAdapter::new(config.forum_search.clone())),
    ];
    for surface in &surfaces {
        info!("Registered search surface: {}", surface.surface().platform_name());
    }

    // --- 4. Initialize the Text-Generation Adapter (optional) ---
    let generator: Option<Arc<dyn TextGenerationService>> = match &config.openai_api_key {
        Some(api_key) => {
            let openai_config = OpenAIConfig::new().with_api_key(api_key);
            Some(Arc::new(OpenAiSummaryAdapter::new(
                Client::with_config(openai_config),
                config.summary_model.clone(),
            )))
        }
        None => {
            info!("No text-generation credential configured; assistant responses will use the fallback template.");
            None
        }
    };

    // --- 5. Build the Pipeline and Shared AppState ---
    let settings = PipelineSettings {
        max_citations_per_run: config.max_citations_per_run,
        query_delay: config.query_delay,
    };
    let pipeline = Arc::new(CitationPipeline::new(
        surfaces,
        store.clone(),
        generator,
        settings,
    ));
    let app_state = Arc::new(AppState {
        pipeline,
        store,
        config: config.clone(),
    });

    let cors = CorsLayer::new()
        .allow_origin("http://localhost:3000".parse::<HeaderValue>().map_err(|e| {
            ApiError::Internal(format!("Invalid CORS origin: {}", e))
        })?)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 6. Create the Web Router ---
    let api_router = Router::new()
        .route("/citations/check", post(check_citations_handler))
        .route("/sites/{site_id}/citations", get(list_citations_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
