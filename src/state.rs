use crate::config::settings::AppConfig;
use crate::infrastructure::ai::TextGenerator;
use crate::infrastructure::chat::ChatDelivery;
use crate::infrastructure::media::AudioTranscoder;
use crate::infrastructure::speech::SpeechToText;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub media: Arc<dyn AudioTranscoder>,
    pub speech: Arc<dyn SpeechToText>,
    pub ai: Arc<dyn TextGenerator>,
    pub chat: Arc<dyn ChatDelivery>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        media: Arc<dyn AudioTranscoder>,
        speech: Arc<dyn SpeechToText>,
        ai: Arc<dyn TextGenerator>,
        chat: Arc<dyn ChatDelivery>,
    ) -> Self {
        Self {
            config,
            media,
            speech,
            ai,
            chat,
        }
    }
}
