use axum::{routing::get, Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use promptbattle::{config::AppConfig, imagegen::FalProvider, state::AppState, ws};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "promptbattle=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting promptbattle...");

    // Misconfiguration is fatal; never serve a half-configured game
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let provider = Arc::new(FalProvider::new(
        config.fal_key.clone(),
        config.model.clone(),
    ));
    let state = Arc::new(AppState::new(config.game.clone(), provider));

    // Clients ask this endpoint where to open their WebSocket
    let socket_url = config.socket_url();
    let client_config =
        get(move || async move { Json(serde_json::json!({ "socketUrl": socket_url })) });

    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/config", client_config)
        .fallback_service(ServeDir::new("static"))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::new(config.bind, config.port);
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Image model: {}", config.model);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
