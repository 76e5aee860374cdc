mod api;
mod config;
mod error;
mod models;
mod services;

use crate::api::radio::AppState;
use crate::config::Config;
use crate::services::{GeminiClient, RadioDj, SheetsClient, TtsClient};
use axum::http::{header, HeaderValue, Method};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ai_radio=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Initialize services
    let sheets = Arc::new(SheetsClient::new(
        config.sheets_api_key.clone(),
        config.spreadsheet_id.clone(),
    ));
    let gemini = Arc::new(GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
    ));
    let tts = config.tts_api_key.clone().map(|key| {
        Arc::new(TtsClient::new(
            key,
            config.tts_voice.clone(),
            config.tts_language_code.clone(),
        ))
    });
    if tts.is_some() {
        tracing::info!("Speech synthesis enabled (voice: {})", config.tts_voice);
    } else {
        tracing::info!("TTS_API_KEY not set, responses will be text-only");
    }

    let dj = Arc::new(RadioDj::new(sheets, gemini, tts));
    let app_state = Arc::new(AppState { dj });

    // CORS: explicit origins from config, or fully open with "*"
    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
    };

    // Build router
    let app = api::radio_routes()
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
