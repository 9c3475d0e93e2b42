use thiserror::Error;

/// Failure taxonomy for the minutes pipeline. Each variant is fatal to the
/// stage that raised it; the worker maps any of them to the Failed state and
/// notifies the recipient over chat.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("staging area failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("no artifact found in staging directory '{0}'")]
    MissingArtifact(String),

    #[error("audio extraction failed: {0}")]
    Transcode(String),

    #[error("transcription failed: {0}")]
    Transcription(String),

    #[error("text generation failed: {0}")]
    Generation(String),

    #[error("chat delivery failed: {0}")]
    Delivery(String),
}

impl PipelineError {
    /// Message shown to the recipient when a job fails. Falls back to a
    /// generic line when the underlying failure carries no detail.
    pub fn user_message(&self) -> String {
        let msg = self.to_string();
        if msg.trim().is_empty() {
            "an unexpected error occurred".to_string()
        } else {
            msg
        }
    }
}
