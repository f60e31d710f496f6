use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use husky_api::{build_router, config::Config, state::AppState};
use husky_engine::HuskyEngine;
use husky_llm::{ClientFactory, OpenAIConfig};
use husky_persist::PersistClientBuilder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config =
        Config::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Husky API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    // Initialize LLM client
    let mut llm_config = OpenAIConfig::new(config.openai_api_key.clone());
    if let Some(base_url) = &config.llm.base_url {
        llm_config = llm_config.with_base_url(base_url.clone());
    }
    let llm_client = ClientFactory::create_client(llm_config)?;

    // Initialize storage
    tracing::info!("Connecting to MongoDB and Qdrant");
    let mut persist_builder = PersistClientBuilder::new()
        .collections(config.husky.collections.clone())
        .mongodb_uri(&config.mongodb_uri)
        .database(&config.mongodb.database)
        .qdrant_url(&config.qdrant.url)
        .qdrant_api_key(config.qdrant_api_key.clone());
    if let Some(directory_db) = &config.mongodb.directory_database {
        persist_builder = persist_builder.directory_database(directory_db);
    }
    let persist = persist_builder.build().await?;

    // Build the engine
    let engine = HuskyEngine::builder()
        .llm_client(llm_client)
        .persist(persist.clone())
        .config(config.husky.clone())
        .build()?;

    let state = Arc::new(AppState::new(config.clone(), persist, engine));
    let app = build_router(state.clone());

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("API docs: http://{}/api/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let in-flight turns, summaries and titles land
    let pending = state.engine.pending_background_tasks();
    if pending > 0 {
        tracing::info!(pending, "Waiting for background persistence");
        let grace = Duration::from_secs(config.server.shutdown_grace_secs);
        if tokio::time::timeout(grace, state.engine.drain_background_tasks())
            .await
            .is_err()
        {
            tracing::warn!(
                pending = state.engine.pending_background_tasks(),
                "Shutdown grace period elapsed with background tasks still running"
            );
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
