use crate::common::error::PipelineError;
use async_trait::async_trait;

pub mod slack;

/// Chat-delivery collaborator: resolve a direct-message channel for a user,
/// then post messages into it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatDelivery: Send + Sync {
    async fn open_conversation(&self, user_id: &str) -> Result<String, PipelineError>;

    /// Posts one message. Overlong text is the platform's problem; no
    /// chunking or truncation happens here.
    async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), PipelineError>;
}
