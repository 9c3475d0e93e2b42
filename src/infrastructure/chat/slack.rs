use crate::common::error::PipelineError;
use crate::infrastructure::chat::ChatDelivery;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

const SLACK_API_URL: &str = "https://slack.com/api";

/// Slack Web API client (`conversations.open` + `chat.postMessage`),
/// authenticated with a bot token.
#[derive(Clone)]
pub struct SlackService {
    bot_token: String,
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ConversationsOpenResponse {
    ok: bool,
    error: Option<String>,
    channel: Option<Channel>,
}

#[derive(Deserialize)]
struct Channel {
    id: String,
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
}

impl SlackService {
    pub fn new(bot_token: &str) -> Self {
        Self {
            bot_token: bot_token.to_string(),
            http: reqwest::Client::new(),
            base_url: SLACK_API_URL.to_string(),
        }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        payload: serde_json::Value,
    ) -> Result<T, PipelineError> {
        debug!("slack api call: {}", method);
        let response = self
            .http
            .post(format!("{}/{}", self.base_url, method))
            .bearer_auth(&self.bot_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| PipelineError::Delivery(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::Delivery(format!(
                "slack {} returned {}",
                method,
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| PipelineError::Delivery(e.to_string()))
    }
}

#[async_trait]
impl ChatDelivery for SlackService {
    async fn open_conversation(&self, user_id: &str) -> Result<String, PipelineError> {
        let response: ConversationsOpenResponse = self
            .call(
                "conversations.open",
                serde_json::json!({ "users": user_id }),
            )
            .await?;

        if !response.ok {
            return Err(PipelineError::Delivery(format!(
                "conversations.open failed: {}",
                response.error.unwrap_or_else(|| "unknown error".to_string())
            )));
        }

        response
            .channel
            .map(|c| c.id)
            .ok_or_else(|| PipelineError::Delivery("conversations.open returned no channel".to_string()))
    }

    async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), PipelineError> {
        let response: PostMessageResponse = self
            .call(
                "chat.postMessage",
                serde_json::json!({ "channel": channel_id, "text": text }),
            )
            .await?;

        if !response.ok {
            return Err(PipelineError::Delivery(format!(
                "chat.postMessage failed: {}",
                response.error.unwrap_or_else(|| "unknown error".to_string())
            )));
        }
        Ok(())
    }
}
