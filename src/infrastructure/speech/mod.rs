use crate::common::error::PipelineError;
use async_trait::async_trait;

pub mod azure;

/// Speech-to-text collaborator. One call covers one audio file (or one split
/// part) and yields the recognized phrases in chronological order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        locale: &str,
    ) -> Result<Vec<String>, PipelineError>;
}
