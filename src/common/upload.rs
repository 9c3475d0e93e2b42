use anyhow::{anyhow, Result};
use axum::{body::Bytes, extract::multipart::Field};
use futures_util::StreamExt;
use mime::Mime;
use tracing::error;

/// The only media type the upload endpoint accepts.
pub const ACCEPTED_VIDEO_MIME: &str = "video/mp4";

/// A video payload pulled out of a multipart field, held in memory until the
/// recipient identifier has been validated. Nothing touches the staging area
/// before validation passes, so the payload cannot be spooled to disk yet.
pub struct VideoUpload {
    pub filename: String,
    pub data: Bytes,
}

pub async fn read_video_field(mut field: Field<'_>) -> Result<VideoUpload> {
    let declared = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let parsed = declared.parse::<Mime>().ok();

    if parsed.as_ref().map(|m| m.essence_str()) != Some(ACCEPTED_VIDEO_MIME) {
        return Err(anyhow!(
            "invalid content type '{}': only {} is accepted",
            declared,
            ACCEPTED_VIDEO_MIME
        ));
    }

    let filename = field
        .file_name()
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow!("upload is missing a filename"))?;

    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| {
            error!("upload stream error: {}", e);
            anyhow!("upload stream interrupted")
        })?;
        data.extend_from_slice(&chunk);
    }

    Ok(VideoUpload {
        filename,
        data: Bytes::from(data),
    })
}
