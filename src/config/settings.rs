use crate::config::env::{self, EnvKey};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub staging_root: PathBuf,
    pub speech_api_key: String,
    pub speech_region: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub slack_bot_token: String,
}

impl AppConfig {
    /// Collaborator credentials are not validated here. A missing key leaves
    /// the value empty and the corresponding provider call fails on its own.
    pub fn new() -> Self {
        Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            staging_root: PathBuf::from(env::get_or(EnvKey::StagingRoot, "./storage")),
            speech_api_key: env::get_or(EnvKey::SpeechApiKey, ""),
            speech_region: env::get_or(EnvKey::SpeechRegion, "japaneast"),
            gemini_api_key: env::get_or(EnvKey::GeminiApiKey, ""),
            gemini_model: env::get_or(EnvKey::GeminiModel, "gemini-2.0-flash"),
            slack_bot_token: env::get_or(EnvKey::SlackBotToken, ""),
        }
    }
}
