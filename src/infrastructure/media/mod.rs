use crate::common::error::PipelineError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub mod ffmpeg;

/// Transcoding collaborator. Turns the uploaded video into speech-ready
/// audio and, when the audio exceeds the transcription provider's payload
/// limit, cuts it into time-ordered parts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioTranscoder: Send + Sync {
    /// Extracts a mono 16 kHz PCM track from the video into `out_dir`.
    async fn extract_audio(&self, video: &Path, out_dir: &Path)
        -> Result<PathBuf, PipelineError>;

    /// Splits the audio file into parts of at most `max_part_bytes` each,
    /// returned in ascending time order. A file within the limit comes back
    /// as a single part.
    async fn split_audio(
        &self,
        audio: &Path,
        max_part_bytes: u64,
    ) -> Result<Vec<PathBuf>, PipelineError>;
}

/// Number of parts needed so no part exceeds `max_part_bytes`.
pub fn num_parts(file_size: u64, max_part_bytes: u64) -> u64 {
    file_size.div_ceil(max_part_bytes)
}

/// Cut windows `(start_secs, length_secs)` covering `[0, duration)` with no
/// overlap and no gap. Part length is the ceiling of `duration / parts`, so
/// the final window may come up short rather than run past the end.
pub fn plan_windows(duration_secs: f64, parts: u64) -> Vec<(f64, f64)> {
    let part_secs = (duration_secs / parts as f64).ceil();
    let mut windows = Vec::with_capacity(parts as usize);
    for i in 0..parts {
        let start = i as f64 * part_secs;
        if start >= duration_secs {
            break;
        }
        let end = (start + part_secs).min(duration_secs);
        windows.push((start, end - start));
    }
    windows
}
