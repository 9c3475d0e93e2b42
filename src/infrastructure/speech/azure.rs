use crate::common::error::PipelineError;
use crate::infrastructure::speech::SpeechToText;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Azure AI Speech fast-transcription REST client. Audio goes out as a
/// multipart POST against the regional endpoint, keyed by a subscription key.
#[derive(Clone)]
pub struct AzureSpeechService {
    api_key: String,
    region: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    #[serde(default)]
    phrases: Vec<Phrase>,
}

#[derive(Debug, Deserialize)]
struct Phrase {
    text: String,
}

impl AzureSpeechService {
    pub fn new(api_key: &str, region: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            region: region.to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "https://{}.api.cognitive.microsoft.com/speechtotext/transcriptions:transcribe?api-version=2024-11-15",
            self.region
        )
    }

    fn segments(response: TranscribeResponse) -> Vec<String> {
        response.phrases.into_iter().map(|p| p.text).collect()
    }
}

#[async_trait]
impl SpeechToText for AzureSpeechService {
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        locale: &str,
    ) -> Result<Vec<String>, PipelineError> {
        let definition = serde_json::json!({ "locales": [locale] }).to_string();
        let form = reqwest::multipart::Form::new()
            .part(
                "audio",
                reqwest::multipart::Part::bytes(audio).file_name("audio.wav"),
            )
            .text("definition", definition);

        debug!("sending audio to speech endpoint in region {}", self.region);

        let response = self
            .http
            .post(self.endpoint())
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PipelineError::Transcription(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Transcription(format!(
                "speech endpoint returned {}: {}",
                status, body
            )));
        }

        let parsed: TranscribeResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Transcription(e.to_string()))?;

        Ok(Self::segments(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phrases_become_ordered_segments() {
        let parsed: TranscribeResponse = serde_json::from_str(
            r#"{
                "durationMilliseconds": 4100,
                "combinedPhrases": [{"text": "おはようございます 始めましょう"}],
                "phrases": [
                    {"text": "おはようございます", "offsetMilliseconds": 80},
                    {"text": "始めましょう", "offsetMilliseconds": 2260}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(
            AzureSpeechService::segments(parsed),
            vec!["おはようございます", "始めましょう"]
        );
    }

    #[test]
    fn missing_phrases_yield_no_segments() {
        let parsed: TranscribeResponse = serde_json::from_str("{}").unwrap();
        assert!(AzureSpeechService::segments(parsed).is_empty());
    }
}
