//! QuestionSpark Engine - Main entry point.

use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use questionspark_engine::api;
use questionspark_engine::app::App;
use questionspark_engine::infrastructure::{
    config::EngineConfig, ollama::OllamaClient, sqlite, sqlite::SqliteRepositories,
    story_generator::LlmStoryGenerator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine may be started from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "questionspark_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting QuestionSpark Engine");

    let config = EngineConfig::from_env();

    tracing::info!(database_url = %config.database_url, "Opening story store");
    let pool = sqlite::connect(&config.database_url).await?;
    let repos = SqliteRepositories::new(pool);

    let llm = Arc::new(OllamaClient::from_config(&config.llm));
    tracing::info!(
        base_url = %config.llm.base_url,
        model = %llm.model(),
        timeout_secs = config.llm.timeout_secs,
        "Story generator configured"
    );
    let generator = Arc::new(LlmStoryGenerator::from_config(llm, &config.llm));

    let app = Arc::new(App::new(repos, generator));

    let mut router = api::http::routes()
        .with_state(app)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer(config.cors_allowed_origins.as_deref()) {
        router = router.layer(cors);
    }

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind_target()).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer(allowed_origins: Option<&str>) -> Option<CorsLayer> {
    let allowed_origins = allowed_origins?;

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        return Some(cors.allow_origin(Any));
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!(
            allowed_origins,
            "CORS_ALLOWED_ORIGINS has no usable origins, CORS disabled"
        );
        return None;
    }

    Some(cors.allow_origin(origins))
}
