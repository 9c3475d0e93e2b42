use crate::common::error::PipelineError;
use async_trait::async_trait;

pub mod gemini;

/// Generative-text collaborator. `system` is the process-wide assistant
/// instruction; `prompt` and `document` go out as two ordered user turns.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        document: &str,
    ) -> Result<String, PipelineError>;
}
