use crate::common::error::PipelineError;
use crate::infrastructure::media::{num_parts, plan_windows, AudioTranscoder};
use async_trait::async_trait;
use futures_util::future::try_join_all;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Transcoding via the ffmpeg / ffprobe binaries on PATH.
#[derive(Clone, Default)]
pub struct FfmpegTranscoder;

impl FfmpegTranscoder {
    async fn run_ffmpeg(args: &[&str]) -> Result<(), PipelineError> {
        debug!("ffmpeg {}", args.join(" "));
        let output = Command::new("ffmpeg")
            .args(args)
            .output()
            .await
            .map_err(|e| PipelineError::Transcode(format!("failed to spawn ffmpeg: {}", e)))?;

        if !output.status.success() {
            return Err(PipelineError::Transcode(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }

    /// Total duration in seconds. An unreadable or missing duration is a
    /// hard failure for the split stage.
    async fn probe_duration(path: &Path) -> Result<f64, PipelineError> {
        let output = Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .output()
            .await
            .map_err(|e| PipelineError::Transcode(format!("failed to spawn ffprobe: {}", e)))?;

        if !output.status.success() {
            return Err(PipelineError::Transcode(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        String::from_utf8_lossy(&output.stdout)
            .trim()
            .parse::<f64>()
            .map_err(|_| PipelineError::Transcode("audio duration unavailable".to_string()))
    }

    async fn cut_part(
        audio: &Path,
        out: PathBuf,
        start_secs: f64,
        length_secs: f64,
    ) -> Result<PathBuf, PipelineError> {
        let start = format!("{:.3}", start_secs);
        let length = format!("{:.3}", length_secs);
        let input = audio.to_string_lossy().to_string();
        let output = out.to_string_lossy().to_string();
        Self::run_ffmpeg(&[
            "-ss", &start, "-t", &length, "-i", &input, "-acodec", "copy", "-y", &output,
        ])
        .await?;
        Ok(out)
    }
}

#[async_trait]
impl AudioTranscoder for FfmpegTranscoder {
    async fn extract_audio(
        &self,
        video: &Path,
        out_dir: &Path,
    ) -> Result<PathBuf, PipelineError> {
        let stem = video
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio".to_string());
        let out = out_dir.join(format!("{}.wav", stem));

        let input = video.to_string_lossy().to_string();
        let output = out.to_string_lossy().to_string();
        Self::run_ffmpeg(&[
            "-i", &input, "-vn", "-ac", "1", "-ar", "16000", "-acodec", "pcm_s16le", "-y",
            &output,
        ])
        .await?;

        info!("extracted audio track to {}", out.display());
        Ok(out)
    }

    async fn split_audio(
        &self,
        audio: &Path,
        max_part_bytes: u64,
    ) -> Result<Vec<PathBuf>, PipelineError> {
        let size = tokio::fs::metadata(audio).await?.len();
        let parts = num_parts(size, max_part_bytes);
        if parts <= 1 {
            return Ok(vec![audio.to_path_buf()]);
        }

        let duration = Self::probe_duration(audio).await?;
        let windows = plan_windows(duration, parts);
        info!(
            "splitting {} ({} bytes, {:.1}s) into {} parts",
            audio.display(),
            size,
            duration,
            windows.len()
        );

        let stem = audio
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio".to_string());
        let dir = audio.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();

        // Disjoint time windows and output files, so parts cut in parallel;
        // any single failure fails the whole split.
        let cuts = windows.into_iter().enumerate().map(|(i, (start, length))| {
            let out = dir.join(format!("{}.part{:03}.wav", stem, i));
            Self::cut_part(audio, out, start, length)
        });

        try_join_all(cuts).await
    }
}
