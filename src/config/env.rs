use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    StagingRoot,
    SpeechApiKey,
    SpeechRegion,
    GeminiApiKey,
    GeminiModel,
    SlackBotToken,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::StagingRoot => "STAGING_ROOT",
            EnvKey::SpeechApiKey => "SPEECH_API_KEY",
            EnvKey::SpeechRegion => "SPEECH_REGION",
            EnvKey::GeminiApiKey => "GEMINI_API_KEY",
            EnvKey::GeminiModel => "GEMINI_MODEL",
            EnvKey::SlackBotToken => "SLACK_BOT_TOKEN",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
