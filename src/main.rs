use crate::config::settings::AppConfig;
use crate::infrastructure::ai::gemini::GeminiService;
use crate::infrastructure::chat::slack::SlackService;
use crate::infrastructure::media::ffmpeg::FfmpegTranscoder;
use crate::infrastructure::speech::azure::AzureSpeechService;
use crate::state::AppState;
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::info;

mod app;
mod common;
mod config;
mod docs;
mod infrastructure;
mod modules;
mod routes;
mod state;
mod workers;

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting server...");

    let config = AppConfig::new();

    let state = AppState::new(
        config.clone(),
        Arc::new(FfmpegTranscoder),
        Arc::new(AzureSpeechService::new(
            &config.speech_api_key,
            &config.speech_region,
        )),
        Arc::new(GeminiService::new(
            &config.gemini_api_key,
            &config.gemini_model,
        )),
        Arc::new(SlackService::new(&config.slack_bot_token)),
    );

    let app = app::create_app(state).await;

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await.unwrap();
}
