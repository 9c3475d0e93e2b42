use crate::common::error::PipelineError;
use crate::infrastructure::ai::TextGenerator;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiService {
    api_key: String,
    model: String,
    http: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct GenerateRequest {
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GeminiService {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            http: reqwest::Client::new(),
            base_url: GEMINI_API_URL.to_string(),
        }
    }

    /// First candidate's first text part. Zero candidates or blank text is a
    /// generation failure, never a valid empty document.
    fn extract_text(response: GenerateResponse) -> Result<String, PipelineError> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::Generation("provider returned no candidates".to_string()))?;

        let text = candidate
            .content
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(PipelineError::Generation(
                "provider returned an empty response".to_string(),
            ));
        }
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiService {
    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        document: &str,
    ) -> Result<String, PipelineError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let request = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: system.to_string() }],
            },
            contents: vec![
                Content {
                    role: Some("user".to_string()),
                    parts: vec![Part { text: prompt.to_string() }],
                },
                Content {
                    role: Some("user".to_string()),
                    parts: vec![Part { text: document.to_string() }],
                },
            ],
        };

        debug!(model = %self.model, "gemini generateContent request");

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::Generation(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Generation(format!(
                "gemini api returned {}: {}",
                status, body
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Generation(e.to_string()))?;

        Self::extract_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_candidate_text() {
        let parsed: GenerateResponse = serde_json::from_str(
            r##"{
                "candidates": [
                    {"content": {"role": "model", "parts": [{"text": "# 議事録\n本文"}]}},
                    {"content": {"role": "model", "parts": [{"text": "ignored"}]}}
                ]
            }"##,
        )
        .unwrap();
        assert_eq!(GeminiService::extract_text(parsed).unwrap(), "# 議事録\n本文");
    }

    #[test]
    fn zero_candidates_is_a_generation_failure() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        let err = GeminiService::extract_text(parsed).unwrap_err();
        assert!(matches!(err, PipelineError::Generation(_)));
    }

    #[test]
    fn empty_text_is_a_generation_failure() {
        let parsed: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"role": "model", "parts": [{"text": "  "}]}}]}"#,
        )
        .unwrap();
        let err = GeminiService::extract_text(parsed).unwrap_err();
        assert!(matches!(err, PipelineError::Generation(_)));
    }

    #[test]
    fn candidate_without_parts_is_a_generation_failure() {
        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"candidates": [{"content": {"parts": []}}]}"#).unwrap();
        assert!(GeminiService::extract_text(parsed).is_err());
    }
}
